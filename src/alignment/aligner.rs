use serde::{Deserialize, Serialize};
use tokenizers::Encoding;

use crate::spans::{self, Answer, InvalidSpanError, TokenSpan};

use super::{Config, LabelPolicy};

/// A per-token label: either a real label or the ignore marker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenLabel<L> {
    /// Excluded from loss and metric computation
    Ignore,

    /// A label from the label vocabulary
    Label(L),
}

impl<L> TokenLabel<L> {
    /// Returns the label, if the token is not ignored
    pub fn label(&self) -> Option<&L> {
        match self {
            TokenLabel::Ignore => None,
            TokenLabel::Label(label) => Some(label),
        }
    }

    /// Returns true for the ignore marker
    pub fn is_ignored(&self) -> bool {
        matches!(self, TokenLabel::Ignore)
    }

    /// Map the inner label, keeping the ignore marker as-is
    pub fn map<M, F: FnOnce(L) -> M>(self, f: F) -> TokenLabel<M> {
        match self {
            TokenLabel::Ignore => TokenLabel::Ignore,
            TokenLabel::Label(label) => TokenLabel::Label(f(label)),
        }
    }
}

impl TokenLabel<usize> {
    /// Convert to a training target id, writing `ignore_index` for the ignore marker
    pub fn to_id(self, ignore_index: i64) -> i64 {
        match self {
            TokenLabel::Ignore => ignore_index,
            TokenLabel::Label(id) => id as i64,
        }
    }
}

/// Alignment Error
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AlignmentError {
    /// A token points at a word the label sequence doesn't have
    #[error("token {token} maps to word {word}, but only {len} word labels were given")]
    OutOfRange {
        /// The token position
        token: usize,
        /// The word index it maps to
        word: usize,
        /// The number of word labels
        len: usize,
    },

    /// A word's sub-word run was interrupted by another word or a special token
    #[error("token {token} resumes word {word} after its sub-word run ended")]
    NonContiguous {
        /// The token position
        token: usize,
        /// The word index it maps to
        word: usize,
    },
}

/// Maps word-level labels onto sub-word tokens, and token-level answer spans back onto text
#[derive(Clone, Debug)]
pub struct TokenLabelAligner {
    config: Config,
}

impl TokenLabelAligner {
    /// Creates a new aligner
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// The aligner's configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Produce one label per token from one label per word.
    ///
    /// `word_ids` holds the originating word of each token, or `None` for special tokens. Special
    /// tokens always receive [`TokenLabel::Ignore`]. The first token of a word receives the word's
    /// label, and the remaining tokens of the run follow the configured [`LabelPolicy`].
    ///
    /// A token continues a word when the *previous token* maps to the same word index. Two
    /// neighbouring words sharing a label value are still two words. Sub-word runs are expected to
    /// be contiguous, and a word that reappears after its run ended is rejected.
    pub fn align_labels<L: Clone>(
        &self,
        word_ids: &[Option<usize>],
        labels: &[L],
    ) -> Result<Vec<TokenLabel<L>>, AlignmentError> {
        let mut aligned = Vec::with_capacity(word_ids.len());
        let mut seen = vec![false; labels.len()];
        let mut previous: Option<usize> = None;

        for (token, word_id) in word_ids.iter().enumerate() {
            let label = match *word_id {
                None => TokenLabel::Ignore,
                Some(word) => {
                    let label = labels.get(word).ok_or(AlignmentError::OutOfRange {
                        token,
                        word,
                        len: labels.len(),
                    })?;

                    if previous == Some(word) {
                        match self.config.label_policy {
                            LabelPolicy::FirstSubToken => TokenLabel::Ignore,
                            LabelPolicy::AllSubTokens => TokenLabel::Label(label.clone()),
                        }
                    } else if seen[word] {
                        return Err(AlignmentError::NonContiguous { token, word });
                    } else {
                        seen[word] = true;

                        TokenLabel::Label(label.clone())
                    }
                }
            };

            previous = *word_id;
            aligned.push(label);
        }

        Ok(aligned)
    }

    /// Align label ids and convert them to training targets, using the configured ignore index
    pub fn align_label_ids(
        &self,
        word_ids: &[Option<usize>],
        label_ids: &[usize],
    ) -> Result<Vec<i64>, AlignmentError> {
        let ignore_index = self.config.ignore_index;

        Ok(self
            .align_labels(word_ids, label_ids)?
            .into_iter()
            .map(|label| label.to_id(ignore_index))
            .collect())
    }

    /// Map an answer's token indices (inclusive on both ends, as emitted by a QA head) back to a
    /// character range of the original text.
    ///
    /// `offsets` holds the character range of each token, or `None` for tokens outside the text
    /// (special tokens, question tokens). Pointing both ends at the configured no-answer index
    /// yields [`Answer::NoAnswer`].
    pub fn decode_span(
        &self,
        start: usize,
        end: usize,
        offsets: &[Option<(usize, usize)>],
    ) -> Result<Answer, InvalidSpanError> {
        spans::decode(
            TokenSpan::new(start, end),
            offsets,
            self.config.no_answer_index,
        )
    }
}

impl Default for TokenLabelAligner {
    fn default() -> Self {
        Self::new(Config::new())
    }
}

/// Word indices for each token of an encoding, `None` for special tokens
pub fn word_ids_from_encoding(encoding: &Encoding) -> Vec<Option<usize>> {
    encoding
        .get_word_ids()
        .iter()
        .map(|word| word.map(|w| w as usize))
        .collect()
}
