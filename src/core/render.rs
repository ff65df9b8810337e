/// Story rendering: interleaves fragments with the player's words.

use std::io::{self, Write};
use thiserror::Error;

use crate::schema::story::Story;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("story has {expected} blanks to fill but {found} words were given")]
    WordCountMismatch { expected: usize, found: usize },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Render `story` with `words`, which must be parallel to `story.placeholders`.
pub fn render(story: &Story, words: &[String]) -> Result<String, RenderError> {
    check_word_count(story, words)?;

    let capacity = story.fragments.iter().map(String::len).sum::<usize>()
        + story
            .placeholder_refs
            .iter()
            .map(|&r| words[r].len())
            .sum::<usize>();
    let mut out = String::with_capacity(capacity);

    for (fragment, &word_ref) in story.fragments.iter().zip(&story.placeholder_refs) {
        out.push_str(fragment);
        out.push_str(&words[word_ref]);
    }
    if let Some(last) = story.fragments.last() {
        out.push_str(last);
    }
    Ok(out)
}

/// Write the finished story framed by blank lines, the way the game shows it.
pub fn write_story<W: Write + ?Sized>(
    out: &mut W,
    story: &Story,
    words: &[String],
) -> Result<(), RenderError> {
    let text = render(story, words)?;
    writeln!(out)?;
    writeln!(out, "{}", text)?;
    out.flush()?;
    Ok(())
}

fn check_word_count(story: &Story, words: &[String]) -> Result<(), RenderError> {
    if words.len() != story.placeholders.len() {
        return Err(RenderError::WordCountMismatch {
            expected: story.placeholders.len(),
            found: words.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::parse_library;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn render_interleaves_and_reuses_words() {
        let stories =
            parse_library("Title\n\n(noun1) sat on (verb1). (noun1) left.\n\nEND STORY");
        let text = render(&stories[0], &words(&["Rex", "napped"])).unwrap();
        assert_eq!(text, "Title\n\nRex sat on napped. Rex left.");
    }

    #[test]
    fn render_story_without_blanks() {
        let stories = parse_library("Plain\n\nNothing to fill.\n\nEND STORY");
        let text = render(&stories[0], &[]).unwrap();
        assert_eq!(text, "Plain\n\nNothing to fill.");
    }

    #[test]
    fn render_rejects_wrong_word_count() {
        let stories = parse_library("T\n\n(noun) (verb)\n\nEND STORY");
        let err = render(&stories[0], &words(&["one"])).unwrap_err();
        assert!(matches!(
            err,
            RenderError::WordCountMismatch {
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn write_story_frames_output() {
        let stories = parse_library("T\n\nA (noun).\n\nEND STORY");
        let mut out = Vec::new();
        write_story(&mut out, &stories[0], &words(&["duck"])).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\nT\n\nA duck.\n");
    }
}
