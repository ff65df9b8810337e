/// Story library parser: splits `.mlb` text into stories, fragments and blanks.

use rustc_hash::FxHashMap;
use std::fmt;
use tracing::{debug, warn};

use crate::schema::story::Story;

/// Marks the end of a story. A line feed after it starts the next story.
pub const END_TAG: &str = "\n\nEND STORY";

/// Stands in for a blank inside a story title.
pub const TITLE_MARKER: char = '?';

/// A recoverable problem found while parsing. Never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// A `(` with no `)` before the next end tag or the end of the file.
    /// The `(` is kept as literal text.
    UnterminatedPlaceholder { offset: usize },
    /// `()` with nothing inside. Kept as literal text rather than read as a
    /// blank with an empty descriptor, which could only ever prompt
    /// "Type a : ".
    EmptyPlaceholder { offset: usize },
    /// An end tag followed by something other than a line feed. Parsing
    /// stops there and the rest of the file is ignored.
    MalformedEndTag { offset: usize },
}

impl Diagnostic {
    /// Byte offset into the library text where the problem starts.
    pub fn offset(&self) -> usize {
        match *self {
            Self::UnterminatedPlaceholder { offset }
            | Self::EmptyPlaceholder { offset }
            | Self::MalformedEndTag { offset } => offset,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedPlaceholder { offset } => {
                write!(f, "unterminated blank at byte {}", offset)
            }
            Self::EmptyPlaceholder { offset } => write!(f, "empty blank '()' at byte {}", offset),
            Self::MalformedEndTag { offset } => write!(
                f,
                "END STORY tag not followed by a line break at byte {}; rest of file ignored",
                offset
            ),
        }
    }
}

/// Stories parsed from one library, plus whatever the parser had to recover from.
#[derive(Debug, Clone, Default)]
pub struct ParsedLibrary {
    pub stories: Vec<Story>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a story library, discarding diagnostics.
pub fn parse_library(text: &str) -> Vec<Story> {
    parse_library_with_diagnostics(text).stories
}

/// Parse a story library.
///
/// Syntax:
/// - `(descriptor)` → a blank; repeated descriptors share one word
/// - `((` → literal `(`, `))` → literal `)`
/// - first line of each story → its title
/// - a blank line then `END STORY` → end of the story
///
/// `text` must already use `\n` line endings. Parsing never fails: problems
/// are recorded as [`Diagnostic`]s and the parser carries on as best it can.
pub fn parse_library_with_diagnostics(text: &str) -> ParsedLibrary {
    let mut parsed = ParsedLibrary::default();
    let mut start = 0;

    loop {
        let (builder, end) = scan_story(text, start, &mut parsed.diagnostics);
        match end {
            StoryEnd::Next(next) => {
                parsed.stories.push(builder.seal());
                start = next;
            }
            StoryEnd::Stop => {
                parsed.stories.push(builder.seal());
                break;
            }
            StoryEnd::Exhausted => {
                if builder.has_body() {
                    parsed.stories.push(builder.seal());
                } else {
                    debug!(offset = start, "dropping trailing text with no story body");
                }
                break;
            }
        }
    }

    for diagnostic in &parsed.diagnostics {
        warn!(offset = diagnostic.offset(), "{}", diagnostic);
    }
    debug!(stories = parsed.stories.len(), "parsed story library");
    parsed
}

/// How a single story's scan ended.
enum StoryEnd {
    /// End tag followed by a line feed; the next story starts at this offset.
    Next(usize),
    /// End tag at the end of the file, or a malformed tail.
    Stop,
    /// Ran out of text without an end tag.
    Exhausted,
}

fn scan_story(
    text: &str,
    start: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> (StoryBuilder, StoryEnd) {
    let bytes = text.as_bytes();
    let mut story = StoryBuilder::default();
    let mut i = start;

    // Every markup byte is ASCII, so slicing at them never splits a char.
    while i < bytes.len() {
        match bytes[i] {
            b'\n' if text[i..].starts_with(END_TAG) => {
                let after = i + END_TAG.len();
                let end = match bytes.get(after) {
                    None => StoryEnd::Stop,
                    Some(b'\n') => {
                        let mut next = after + 1;
                        // Skip the blank separator line
                        if bytes.get(next) == Some(&b'\n') {
                            next += 1;
                        }
                        StoryEnd::Next(next)
                    }
                    Some(_) => {
                        diagnostics.push(Diagnostic::MalformedEndTag { offset: after });
                        StoryEnd::Stop
                    }
                };
                return (story, end);
            }
            b'\n' => {
                story.end_title();
                story.push_text("\n");
                i += 1;
            }
            b'(' => {
                let run = run_length(bytes, i, b'(');
                if run > 1 {
                    story.push_escaped('(', run);
                    i += run;
                    continue;
                }
                match find_close(text, i + 1) {
                    Some(close) if close == i + 1 => {
                        diagnostics.push(Diagnostic::EmptyPlaceholder { offset: i });
                        story.push_parens("()");
                        i = close + 1;
                    }
                    Some(close) => {
                        story.push_placeholder(&text[i + 1..close]);
                        i = close + 1;
                    }
                    None => {
                        diagnostics.push(Diagnostic::UnterminatedPlaceholder { offset: i });
                        story.push_parens("(");
                        i += 1;
                    }
                }
            }
            b')' => {
                let run = run_length(bytes, i, b')');
                story.push_escaped(')', run);
                i += run;
            }
            _ => {
                let end = bytes[i..]
                    .iter()
                    .position(|b| matches!(b, b'\n' | b'(' | b')'))
                    .map_or(bytes.len(), |p| i + p);
                story.push_text(&text[i..end]);
                i = end;
            }
        }
    }

    (story, StoryEnd::Exhausted)
}

/// Number of consecutive `byte`s starting at `from`.
fn run_length(bytes: &[u8], from: usize, byte: u8) -> usize {
    bytes[from..].iter().take_while(|&&b| b == byte).count()
}

/// Find the `)` closing a blank whose descriptor starts at `from`.
/// A blank may not run past the end of its story.
fn find_close(text: &str, from: usize) -> Option<usize> {
    let rest = &text[from..];
    let close = rest.find(')')?;
    if rest[..close].contains(END_TAG) {
        return None;
    }
    Some(from + close)
}

/// Accumulates one story while it is being scanned.
#[derive(Debug, Default)]
struct StoryBuilder {
    title: String,
    body_started: bool,
    fragment: String,
    fragments: Vec<String>,
    placeholders: Vec<String>,
    placeholder_index: FxHashMap<String, usize>,
    placeholder_refs: Vec<usize>,
}

impl StoryBuilder {
    fn has_body(&self) -> bool {
        self.body_started
    }

    fn end_title(&mut self) {
        self.body_started = true;
    }

    fn push_text(&mut self, text: &str) {
        if !self.body_started {
            self.title.push_str(text);
        }
        self.fragment.push_str(text);
    }

    /// A run of doubled parentheses: each pair is one literal, an odd
    /// leftover stays as itself.
    fn push_escaped(&mut self, paren: char, run: usize) {
        let literal: String = std::iter::repeat(paren).take(run / 2 + run % 2).collect();
        self.push_parens(&literal);
    }

    /// Literal parentheses belong to the story text only. Titles never
    /// carry them, so a title can't be mistaken for markup.
    fn push_parens(&mut self, parens: &str) {
        self.fragment.push_str(parens);
    }

    fn push_placeholder(&mut self, descriptor: &str) {
        if !self.body_started {
            self.title.push(TITLE_MARKER);
        }

        let index = match self.placeholder_index.get(descriptor) {
            Some(&index) => index,
            None => {
                let index = self.placeholders.len();
                self.placeholders.push(descriptor.to_string());
                self.placeholder_index.insert(descriptor.to_string(), index);
                index
            }
        };
        self.placeholder_refs.push(index);
        self.fragments.push(std::mem::take(&mut self.fragment));
    }

    fn seal(mut self) -> Story {
        self.fragments.push(self.fragment);
        let story = Story {
            title: self.title,
            fragments: self.fragments,
            placeholders: self.placeholders,
            placeholder_refs: self.placeholder_refs,
        };
        debug_assert!(story.is_well_formed());
        story
    }
}
