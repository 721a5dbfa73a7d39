/// Token Classification
pub mod token_classification;

/// Extractive Question Answering
pub mod question_answering;
