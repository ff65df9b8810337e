use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// One parsed story from a story library.
///
/// Rendering interleaves `fragments` with the words chosen for each
/// occurrence in `placeholder_refs`, so there is always exactly one more
/// fragment than there are blanks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Story {
    /// First line of the story, with every blank shown as `?` and literal
    /// parentheses left out.
    pub title: String,
    /// Literal text between blanks. `fragments[0]` begins with the title line.
    pub fragments: Vec<String>,
    /// Unique blank descriptors in first-occurrence order, e.g. `"noun3"`.
    pub placeholders: Vec<String>,
    /// One index into `placeholders` per blank in the text.
    pub placeholder_refs: Vec<usize>,
}

impl Story {
    /// Number of blanks in the story text, counting repeats.
    pub fn blank_count(&self) -> usize {
        self.placeholder_refs.len()
    }

    /// Check the structural invariants every sealed story upholds: one more
    /// fragment than blanks, refs in range, unique descriptors, and a
    /// single-line title with no `(` in it.
    pub fn is_well_formed(&self) -> bool {
        if self.fragments.len() != self.placeholder_refs.len() + 1 {
            return false;
        }
        if self
            .placeholder_refs
            .iter()
            .any(|&r| r >= self.placeholders.len())
        {
            return false;
        }
        let unique: FxHashSet<&str> = self.placeholders.iter().map(String::as_str).collect();
        if unique.len() != self.placeholders.len() {
            return false;
        }
        !self.title.contains(|c: char| c == '(' || c == '\n')
    }
}

/// Where a story lives: which library file, and which story within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoryLocation {
    pub file_index: usize,
    pub story_index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Story {
        Story {
            title: "A ? Day".to_string(),
            fragments: vec![
                "A ".to_string(),
                " Day\n\nIt was ".to_string(),
                ".".to_string(),
            ],
            placeholders: vec!["adjective".to_string()],
            placeholder_refs: vec![0, 0],
        }
    }

    #[test]
    fn sample_is_well_formed() {
        let story = sample();
        assert!(story.is_well_formed());
        assert_eq!(story.blank_count(), 2);
    }

    #[test]
    fn fragment_count_mismatch_detected() {
        let mut story = sample();
        story.fragments.pop();
        assert!(!story.is_well_formed());
    }

    #[test]
    fn dangling_ref_detected() {
        let mut story = sample();
        story.placeholder_refs[1] = 5;
        assert!(!story.is_well_formed());
    }

    #[test]
    fn duplicate_placeholder_detected() {
        let mut story = sample();
        story.placeholders.push("adjective".to_string());
        assert!(!story.is_well_formed());
    }

    #[test]
    fn title_with_markup_detected() {
        let mut story = sample();
        story.title = "A (adjective) Day".to_string();
        assert!(!story.is_well_formed());

        story.title = "A ? Day\nIt was".to_string();
        assert!(!story.is_well_formed());
    }

    #[test]
    fn empty_story_is_well_formed() {
        let story = Story {
            fragments: vec![String::new()],
            ..Story::default()
        };
        assert!(story.is_well_formed());
        assert_eq!(story.blank_count(), 0);
    }

    #[test]
    fn ron_round_trip() {
        let story = sample();
        let serialized = ron::to_string(&story).unwrap();
        let deserialized: Story = ron::from_str(&serialized).unwrap();
        assert_eq!(deserialized, story);
    }
}
