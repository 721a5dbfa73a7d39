use std::ops::Range;

use tokenizers::Tokenizer;

use crate::{
    alignment::TokenLabelAligner,
    spans,
    utils::hugging_face::special_token_id,
};

use super::{extract_answers, Config, Prediction, ScoredWindow, SpanLogits};

/// One `[CLS] question [SEP] context-window [SEP]` model input
#[derive(Clone, Debug, PartialEq)]
pub struct Window {
    /// Token ids
    pub input_ids: Vec<u32>,

    /// Token strings
    pub tokens: Vec<String>,

    /// Character range of each token in the context, `None` outside the context
    pub offsets: Vec<Option<(usize, usize)>>,

    /// Positions of the context tokens within the window
    pub context: Range<usize>,
}

impl Window {
    /// Number of tokens in the window
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    /// True if the window has no tokens
    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

/// A question answering model head, producing start and end logits for every token of a window
pub trait SpanScorer {
    /// Score one window
    fn score(&self, window: &Window) -> anyhow::Result<SpanLogits>;
}

/// Extractive question answering reader: windows the context, scores each window with the
/// injected model, and decodes and merges the answers
pub struct Reader<S: SpanScorer> {
    tokenizer: Tokenizer,
    scorer: S,
    aligner: TokenLabelAligner,
    config: Config,
}

impl<S: SpanScorer> Reader<S> {
    /// Creates a new reader
    pub fn new(tokenizer: Tokenizer, scorer: S, aligner: TokenLabelAligner, config: Config) -> Self {
        Self {
            tokenizer,
            scorer,
            aligner,
            config,
        }
    }

    /// The reader's configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Split the context into overlapping windows, each prefixed with the question
    pub fn windows(&self, question: &str, context: &str) -> anyhow::Result<Vec<Window>> {
        let cls = special_token_id(&self.tokenizer, &self.config.cls_token)?;
        let sep = special_token_id(&self.tokenizer, &self.config.sep_token)?;

        let question = self
            .tokenizer
            .encode_char_offsets(question, false)
            .map_err(|e| anyhow!("Unable to encode question: {}", e))?;
        let context = self
            .tokenizer
            .encode_char_offsets(context, false)
            .map_err(|e| anyhow!("Unable to encode context: {}", e))?;

        // [CLS] and two [SEP]s
        let prefix_length = question.len() + 2;
        let budget = self
            .config
            .max_length
            .checked_sub(prefix_length + 1)
            .filter(|budget| *budget > 0)
            .ok_or_else(|| {
                anyhow!(
                    "Question of {} tokens leaves no room for context in {} tokens",
                    question.len(),
                    self.config.max_length
                )
            })?;

        let ranges = spans::windows(context.len(), budget, self.config.stride)?;

        log::debug!(
            "Split {} context tokens into {} windows",
            context.len(),
            ranges.len()
        );

        let windows = ranges
            .into_iter()
            .map(|range| {
                let mut input_ids = Vec::with_capacity(prefix_length + range.len() + 1);
                let mut tokens = Vec::with_capacity(input_ids.capacity());
                let mut offsets = Vec::with_capacity(input_ids.capacity());

                input_ids.push(cls);
                tokens.push(self.config.cls_token.clone());

                input_ids.extend_from_slice(question.get_ids());
                tokens.extend_from_slice(question.get_tokens());

                input_ids.push(sep);
                tokens.push(self.config.sep_token.clone());

                offsets.resize(prefix_length, None);

                input_ids.extend_from_slice(&context.get_ids()[range.clone()]);
                tokens.extend_from_slice(&context.get_tokens()[range.clone()]);
                offsets.extend(context.get_offsets()[range.clone()].iter().copied().map(Some));

                input_ids.push(sep);
                tokens.push(self.config.sep_token.clone());
                offsets.push(None);

                Window {
                    input_ids,
                    tokens,
                    offsets,
                    context: prefix_length..prefix_length + range.len(),
                }
            })
            .collect();

        Ok(windows)
    }

    /// Answer a question from a single context
    pub fn answer(&self, question: &str, context: &str) -> anyhow::Result<Vec<Prediction>> {
        let mut scored = Vec::new();

        for window in self.windows(question, context)? {
            let logits = self.scorer.score(&window)?;

            scored.push(ScoredWindow::new(window.offsets, logits));
        }

        extract_answers(context, &scored, &self.aligner, &self.config)
    }
}
