use std::fmt::Debug;

use burn::{
    data::dataloader,
    nn::attention::generate_padding_mask,
    tensor::{backend::Backend, Bool, Int, Tensor},
};
use derive_new::new;
use tokenizers::Tokenizer;

use crate::{
    alignment::{word_ids_from_encoding, AlignmentError, TokenLabelAligner},
    utils::{
        classes::{LabelError, Labels},
        tensors,
    },
};

use super::Item;

/// An inference batch for token classification
#[derive(Debug, Clone, new)]
pub struct Infer<B: Backend> {
    /// Tokenized text as 2D tensor: [batch_size, max_seq_length]
    pub tokens: Tensor<B, 2, Int>,

    /// Padding mask for the tokenized text containing booleans for padding locations
    pub mask_pad: Tensor<B, 2, Bool>,
}

/// A training batch for token classification
#[derive(Clone, Debug, new)]
pub struct Train<B: Backend> {
    /// Model input
    pub input: Infer<B>,

    /// Aligned class ids for each token, with the ignore index on special and continuation tokens
    pub targets: Tensor<B, 2, Int>,
}

/// Batch Error
#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    /// The tokenizer failed to encode an item
    #[error("unable to encode: {0}")]
    Encoding(String),

    /// An item has a different number of words and labels
    #[error("item has {words} words but {labels} labels")]
    Mismatch {
        /// The number of words
        words: usize,
        /// The number of labels
        labels: usize,
    },

    /// An item uses a label outside the vocabulary
    #[error(transparent)]
    Label(#[from] LabelError),

    /// Word labels couldn't be aligned with the tokens
    #[error(transparent)]
    Alignment(#[from] AlignmentError),
}

/// Struct for batching token classification items.
///
/// Targets are padded with the aligner's ignore index. When training with Burn's cross entropy
/// loss, which masks pad tokens rather than a separate ignore value, configure the aligner with
/// `ignore_index` set to the pad token id.
#[derive(Clone)]
pub struct Batcher<B: Backend> {
    /// Tokenizer for converting text to token IDs
    tokenizer: Tokenizer,

    /// Aligns word labels with the tokens
    aligner: TokenLabelAligner,

    /// The label vocabulary
    labels: Labels,

    /// Maximum sequence length for tokenized text
    max_seq_length: usize,

    /// ID of the padding token
    pad_token_id: usize,

    /// Device on which to perform computation (e.g., CPU or CUDA device)
    device: B::Device,
}

impl<B: Backend> Batcher<B> {
    /// Creates a new batcher
    pub fn new(
        tokenizer: Tokenizer,
        aligner: TokenLabelAligner,
        labels: Labels,
        max_seq_length: usize,
        pad_token_id: usize,
        device: B::Device,
    ) -> Self {
        Self {
            tokenizer,
            aligner,
            labels,
            max_seq_length,
            pad_token_id,
            device,
        }
    }

    /// Collects token classification items into a training batch, reporting any item that can't
    /// be tokenized or aligned
    pub fn try_batch<I: Item>(&self, items: Vec<I>) -> Result<Train<B>, BatchError> {
        let batch_size = items.len();

        let mut token_ids_list = Vec::with_capacity(batch_size);
        let mut targets_list = Vec::with_capacity(batch_size);

        for item in items {
            let words = item.words();
            let class_labels = item.class_labels();

            if words.len() != class_labels.len() {
                return Err(BatchError::Mismatch {
                    words: words.len(),
                    labels: class_labels.len(),
                });
            }

            let label_ids = self.labels.ids(&class_labels)?;

            let encoding = self
                .tokenizer
                .encode(words, true)
                .map_err(|e| BatchError::Encoding(e.to_string()))?;

            let word_ids = word_ids_from_encoding(&encoding);

            let mut targets = self.aligner.align_label_ids(&word_ids, &label_ids)?;
            let mut token_ids: Vec<usize> =
                encoding.get_ids().iter().map(|t| *t as usize).collect();

            if token_ids.len() > self.max_seq_length {
                log::warn!(
                    "Truncating {} tokens to {}, dropping the labels of trailing words",
                    token_ids.len(),
                    self.max_seq_length
                );

                token_ids.truncate(self.max_seq_length);
                targets.truncate(self.max_seq_length);
            }

            token_ids_list.push(token_ids);
            targets_list.push(targets);
        }

        let padding = generate_padding_mask(
            self.pad_token_id,
            token_ids_list,
            Some(self.max_seq_length),
            &self.device,
        );

        let seq_length = padding.tensor.dims()[1];

        // Pad the aligned labels to match the tokenized sequence length
        let targets = tensors::pad_to::<B>(
            self.aligner.config().ignore_index,
            targets_list,
            seq_length,
            &self.device,
        );

        Ok(Train {
            input: Infer {
                tokens: padding.tensor,
                mask_pad: padding.mask,
            },
            targets,
        })
    }
}

/// Implement Batcher trait for Batcher struct for inference
impl<B: Backend> dataloader::batcher::Batcher<String, Infer<B>> for Batcher<B> {
    /// Collects a vector of raw texts into an inference batch
    fn batch(&self, items: Vec<String>) -> Infer<B> {
        let mut token_ids_list = Vec::with_capacity(items.len());

        for input in items {
            let tokens = self
                .tokenizer
                .encode(input, true)
                .expect("unable to encode");

            let token_ids: Vec<_> = tokens.get_ids().iter().map(|t| *t as usize).collect();

            token_ids_list.push(token_ids);
        }

        let padding = generate_padding_mask(
            self.pad_token_id,
            token_ids_list,
            Some(self.max_seq_length),
            &self.device,
        );

        Infer {
            tokens: padding.tensor,
            mask_pad: padding.mask,
        }
    }
}

/// Implement Batcher trait for Batcher struct for training
impl<B: Backend, I: Item> dataloader::batcher::Batcher<I, Train<B>> for Batcher<B> {
    /// Collects a vector of token classification items into a training batch
    fn batch(&self, items: Vec<I>) -> Train<B> {
        // The trait can't return a Result, and a misaligned batch must not be trained on
        self.try_batch(items)
            .unwrap_or_else(|e| panic!("unable to batch items: {}", e))
    }
}
