/// Word collection: turns blank descriptors into questions and gathers answers.

use std::fmt;
use std::io::{self, BufRead, Write};
use thiserror::Error;

use crate::schema::story::Story;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("input ended before every blank was filled")]
    EndOfInput,
}

/// How a question introduces the word it asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Article {
    A,
    An,
    /// Same kind of word as the previous question.
    Another,
}

impl Article {
    /// "an" before a, e, i, o or u (lowercase ASCII only), "a" otherwise.
    pub fn for_descriptor(descriptor: &str) -> Article {
        match descriptor.as_bytes().first() {
            Some(b'a' | b'e' | b'i' | b'o' | b'u') => Article::An,
            _ => Article::A,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "a",
            Self::An => "an",
            Self::Another => "another",
        }
    }
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drop the numeric suffix that keeps descriptors apart, e.g. `"noun3"` → `"noun"`.
///
/// The first character is always kept, so an all-digit descriptor still
/// shows something.
pub fn strip_numeric_suffix(descriptor: &str) -> &str {
    let Some(first) = descriptor.chars().next() else {
        return descriptor;
    };
    let rest = &descriptor[first.len_utf8()..];
    let kept = rest.trim_end_matches(|c: char| c.is_ascii_digit());
    &descriptor[..first.len_utf8() + kept.len()]
}

/// One prompt shown to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub article: Article,
    /// Descriptor with its numeric suffix removed.
    pub descriptor: String,
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type {} {}: ", self.article, self.descriptor)
    }
}

/// Build one question per unique blank, in `placeholders` order.
///
/// Consecutive blanks of the same kind ask for "another" one.
pub fn questions(story: &Story) -> Vec<Question> {
    let mut questions: Vec<Question> = Vec::with_capacity(story.placeholders.len());
    for placeholder in &story.placeholders {
        let descriptor = strip_numeric_suffix(placeholder);
        let same_as_previous = questions
            .last()
            .is_some_and(|prev| prev.descriptor == descriptor);
        let article = if same_as_previous {
            Article::Another
        } else {
            Article::for_descriptor(descriptor)
        };
        questions.push(Question {
            article,
            descriptor: descriptor.to_string(),
        });
    }
    questions
}

/// Anything that can answer a question with a word.
pub trait WordSource {
    fn answer(&mut self, question: &Question) -> Result<String, PromptError>;
}

/// Ask every question for `story` and return the answers, parallel to
/// `story.placeholders`.
pub fn collect_words<S: WordSource + ?Sized>(
    story: &Story,
    source: &mut S,
) -> Result<Vec<String>, PromptError> {
    questions(story)
        .iter()
        .map(|question| source.answer(question))
        .collect()
}

/// Reads answers line by line, printing each question first.
pub struct ConsoleWords<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleWords<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl ConsoleWords<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on stdout, read from stdin.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> WordSource for ConsoleWords<R, W> {
    fn answer(&mut self, question: &Question) -> Result<String, PromptError> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::EndOfInput);
        }
        let answer = line.strip_suffix('\n').unwrap_or(&line);
        let answer = answer.strip_suffix('\r').unwrap_or(answer);
        Ok(answer.to_string())
    }
}

/// Answers from a fixed list, in order. Useful for demos and tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedWords {
    answers: std::collections::VecDeque<String>,
}

impl ScriptedWords {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }
}

impl WordSource for ScriptedWords {
    fn answer(&mut self, _question: &Question) -> Result<String, PromptError> {
        self.answers.pop_front().ok_or(PromptError::EndOfInput)
    }
}
