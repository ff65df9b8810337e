/// Story selection across every library.
///
/// Stories are numbered globally: all stories of the first library, then
/// all of the second, and so on.

use rand::rngs::StdRng;
use rand::Rng;

use crate::schema::story::StoryLocation;

/// Total number of stories across all libraries.
pub fn total_stories(counts: &[u32]) -> u64 {
    counts.iter().map(|&c| u64::from(c)).sum()
}

/// Resolve a global story index to its library file and local index.
///
/// Returns `None` when `global` is past the last story.
pub fn locate(counts: &[u32], global: u32) -> Option<StoryLocation> {
    let global = u64::from(global);
    let mut before: u64 = 0;
    for (file_index, &count) in counts.iter().enumerate() {
        if global < before + u64::from(count) {
            return Some(StoryLocation {
                file_index,
                story_index: (global - before) as usize,
            });
        }
        before += u64::from(count);
    }
    None
}

/// Pick a global story index uniformly at random.
///
/// Returns `None` when there are no stories at all.
pub fn pick_random(counts: &[u32], rng: &mut StdRng) -> Option<u32> {
    let total = total_stories(counts);
    if total == 0 {
        return None;
    }
    let total = u32::try_from(total).unwrap_or(u32::MAX);
    Some(rng.gen_range(0..total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn locate_skips_empty_files() {
        let counts = [3, 0, 2];
        assert_eq!(
            locate(&counts, 4),
            Some(StoryLocation {
                file_index: 2,
                story_index: 1
            })
        );
        assert_eq!(
            locate(&counts, 3),
            Some(StoryLocation {
                file_index: 2,
                story_index: 0
            })
        );
        assert_eq!(
            locate(&counts, 0),
            Some(StoryLocation {
                file_index: 0,
                story_index: 0
            })
        );
    }

    #[test]
    fn locate_out_of_range() {
        assert_eq!(locate(&[3, 0, 2], 5), None);
        assert_eq!(locate(&[], 0), None);
        assert_eq!(locate(&[0, 0], 0), None);
    }

    #[test]
    fn pick_random_in_range_and_deterministic() {
        let counts = [3, 0, 2];
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let a = pick_random(&counts, &mut rng1).unwrap();
            let b = pick_random(&counts, &mut rng2).unwrap();
            assert_eq!(a, b);
            assert!(a < 5);
            assert!(locate(&counts, a).is_some());
        }
    }

    #[test]
    fn pick_random_covers_every_story() {
        let counts = [2, 1];
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = [false; 3];
        for _ in 0..200 {
            seen[pick_random(&counts, &mut rng).unwrap() as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn pick_random_no_stories() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pick_random(&[0, 0], &mut rng), None);
        assert_eq!(pick_random(&[], &mut rng), None);
    }
}
