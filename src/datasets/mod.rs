use async_trait::async_trait;

/// The PAN-X multilingual NER dataset
pub mod panx;

/// A dataset which can be loaded
#[async_trait]
pub trait LoadableDataset<I>: burn::data::dataset::Dataset<I> {
    /// Load one subset (e.g., a language) and split (e.g., "train") of the dataset
    async fn load(data_dir: &str, subset: &str, split: &str) -> Result<Self, DatasetError>
    where
        Self: std::marker::Sized;
}

/// Dataset Error
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// No language found for the given string
    #[error("no language found for {0}")]
    UnknownLanguage(String),

    /// A row has a different number of words and tags
    #[error("row {row} has {words} words but {tags} tags")]
    Mismatch {
        /// The row index
        row: usize,
        /// The number of words
        words: usize,
        /// The number of tags
        tags: usize,
    },

    /// The dataset files couldn't be read
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
