use derive_new::new;
use serde::{Deserialize, Serialize};

/// Span scoring over start/end logits
pub mod scoring;

/// Sliding windows and cross-window answer merging
pub mod windows;

pub use scoring::{best_span, null_score, ranked_spans, ScoredSpan};
pub use windows::{merge_candidates, windows, Candidate, WindowError};

/// An answer span over token indices, inclusive on both ends as emitted by a QA head
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
pub struct TokenSpan {
    /// Index of the first answer token
    pub start: usize,

    /// Index of the last answer token
    pub end: usize,
}

/// A half-open `[start, end)` range of character offsets in the original text
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, new)]
pub struct CharSpan {
    /// First character of the span
    pub start: usize,

    /// One past the last character of the span
    pub end: usize,
}

impl CharSpan {
    /// Number of characters covered, zero for an inverted span
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True when the span covers no characters
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True when the two half-open ranges share at least one character, or are the same range
    pub fn overlaps(&self, other: &CharSpan) -> bool {
        self == other || (self.start < other.end && other.start < self.end)
    }

    /// The slice of `text` covered by this span, if it lies within the text
    pub fn extract<'a>(&self, text: &'a str) -> Option<&'a str> {
        let byte_offset = |char_index: usize| {
            text.char_indices()
                .map(|(i, _)| i)
                .chain(std::iter::once(text.len()))
                .nth(char_index)
        };

        let start = byte_offset(self.start)?;
        let end = byte_offset(self.end)?;

        text.get(start..end)
    }
}

/// The result of decoding a QA head's output
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Answer {
    /// The model pointed at the no-answer position
    NoAnswer,

    /// The character range of the answer
    Span(CharSpan),
}

impl Answer {
    /// The character span, if there is one
    pub fn span(&self) -> Option<CharSpan> {
        match self {
            Answer::NoAnswer => None,
            Answer::Span(span) => Some(*span),
        }
    }
}

/// Invalid Span Error
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum InvalidSpanError {
    /// The start index comes after the end index
    #[error("span start {start} is after span end {end}")]
    Inverted {
        /// The start token
        start: usize,
        /// The end token
        end: usize,
    },

    /// A span index is past the end of the offsets
    #[error("token {index} is out of range for {len} offsets")]
    OutOfRange {
        /// The offending token
        index: usize,
        /// The number of offsets
        len: usize,
    },

    /// A span boundary lands on a token without a character range
    #[error("token {0} has no character offsets in the text")]
    Unmapped(usize),

    /// The character offsets of the boundary tokens are out of order
    #[error("character range {start}..{end} is inverted")]
    InvertedOffsets {
        /// The start character
        start: usize,
        /// The end character
        end: usize,
    },
}

/// Decode a token span into a character span, or [`Answer::NoAnswer`] when both ends point at
/// `no_answer_index`
pub fn decode(
    span: TokenSpan,
    offsets: &[Option<(usize, usize)>],
    no_answer_index: usize,
) -> Result<Answer, InvalidSpanError> {
    let TokenSpan { start, end } = span;

    if start == no_answer_index && end == no_answer_index {
        return Ok(Answer::NoAnswer);
    }

    if start > end {
        return Err(InvalidSpanError::Inverted { start, end });
    }

    let offset = |index: usize| -> Result<(usize, usize), InvalidSpanError> {
        offsets
            .get(index)
            .ok_or(InvalidSpanError::OutOfRange {
                index,
                len: offsets.len(),
            })?
            .ok_or(InvalidSpanError::Unmapped(index))
    };

    let (char_start, _) = offset(start)?;
    let (_, char_end) = offset(end)?;

    if char_start > char_end {
        return Err(InvalidSpanError::InvertedOffsets {
            start: char_start,
            end: char_end,
        });
    }

    Ok(Answer::Span(CharSpan::new(char_start, char_end)))
}
