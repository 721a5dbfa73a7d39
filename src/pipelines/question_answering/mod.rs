/// Reader configuration
pub mod config;

/// Answer decoding and merging across windows
pub mod extraction;

/// Context windowing and model scoring
pub mod reader;

/// Retriever-reader pipeline
pub mod pipeline;

pub use config::Config;
pub use extraction::{extract_answers, Prediction, ScoredWindow, SpanLogits};
pub use pipeline::{Document, Pipeline, Retriever};
pub use reader::{Reader, SpanScorer, Window};
