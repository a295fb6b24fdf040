use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::QuestionError;

/// One of the four answer slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    pub const ALL: [OptionLetter; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Parse the letter used in question banks. Case-insensitive, surrounding
    /// whitespace ignored.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "A" | "a" => Some(Self::A),
            "B" | "b" => Some(Self::B),
            "C" | "c" => Some(Self::C),
            "D" | "d" => Some(Self::D),
            _ => None,
        }
    }

    /// Map an answer key (`a`-`d` or `1`-`4`) to a letter
    pub fn from_key(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'a' | '1' => Some(Self::A),
            'b' | '2' => Some(Self::B),
            'c' | '3' => Some(Self::C),
            'd' | '4' => Some(Self::D),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
}

impl Options {
    pub fn get(&self, letter: OptionLetter) -> &str {
        match letter {
            OptionLetter::A => &self.a,
            OptionLetter::B => &self.b,
            OptionLetter::C => &self.c,
            OptionLetter::D => &self.d,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (OptionLetter, &str)> {
        OptionLetter::ALL.into_iter().map(move |l| (l, self.get(l)))
    }
}

/// A validated question. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    pub prompt: String,
    pub options: Options,
    pub correct_option: OptionLetter,
}

/// Question bank document as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionBank {
    #[serde(rename = "QuestionsData", default)]
    pub questions: Vec<RawQuestion>,
}

/// A question exactly as it appears in the bank; every field may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawQuestion {
    #[serde(rename = "Question", default)]
    pub question: Option<String>,
    #[serde(rename = "Options", default)]
    pub options: Option<RawOptions>,
    #[serde(rename = "Answer", default)]
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawOptions {
    #[serde(rename = "A", default)]
    pub a: Option<String>,
    #[serde(rename = "B", default)]
    pub b: Option<String>,
    #[serde(rename = "C", default)]
    pub c: Option<String>,
    #[serde(rename = "D", default)]
    pub d: Option<String>,
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl RawQuestion {
    /// Validate into a playable record. `index` is only used for the error.
    pub fn validate(&self, index: usize) -> Result<QuestionRecord, QuestionError> {
        let malformed = |reason: String| QuestionError::Malformed { index, reason };

        let prompt = present(&self.question).ok_or_else(|| malformed("prompt is missing".into()))?;

        let raw = self
            .options
            .as_ref()
            .ok_or_else(|| malformed("options are missing".into()))?;
        let slots = [
            (OptionLetter::A, present(&raw.a)),
            (OptionLetter::B, present(&raw.b)),
            (OptionLetter::C, present(&raw.c)),
            (OptionLetter::D, present(&raw.d)),
        ];
        let missing = slots
            .iter()
            .filter(|(_, text)| text.is_none())
            .map(|(letter, _)| letter)
            .join(", ");
        if !missing.is_empty() {
            return Err(malformed(format!("missing option(s) {missing}")));
        }

        let answer = self
            .answer
            .as_deref()
            .ok_or_else(|| malformed("answer is missing".into()))?;
        let correct_option = OptionLetter::parse(answer)
            .ok_or_else(|| malformed(format!("answer '{answer}' is not one of A, B, C, D")))?;

        let text = |i: usize| slots[i].1.unwrap_or_default().to_string();
        Ok(QuestionRecord {
            prompt: prompt.to_string(),
            options: Options {
                a: text(0),
                b: text(1),
                c: text(2),
                d: text(3),
            },
            correct_option,
        })
    }
}

impl QuestionBank {
    /// Validate every record. One bad record rejects the whole bank so a
    /// session never silently plays fewer rounds than configured.
    pub fn into_records(self) -> Result<Vec<QuestionRecord>, QuestionError> {
        self.questions
            .iter()
            .enumerate()
            .map(|(i, q)| q.validate(i))
            .collect()
    }
}

impl From<&QuestionRecord> for RawQuestion {
    fn from(q: &QuestionRecord) -> Self {
        RawQuestion {
            question: Some(q.prompt.clone()),
            options: Some(RawOptions {
                a: Some(q.options.a.clone()),
                b: Some(q.options.b.clone()),
                c: Some(q.options.c.clone()),
                d: Some(q.options.d.clone()),
            }),
            answer: Some(q.correct_option.to_string()),
        }
    }
}
