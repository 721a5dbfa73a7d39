//! # Token Aligner
//!
//! Maps word-level labels onto sub-word tokens for token classification, and maps the token spans
//! predicted by extractive question answering models back onto the original text.
#![forbid(unsafe_code)]

/// Label alignment
pub mod alignment;

/// Answer spans, scoring and sliding windows
pub mod spans;

/// Pipelines
pub mod pipelines;

/// Datasets
pub mod datasets;

/// Entity-level evaluation and error analysis
pub mod evaluation;

/// Utilities
pub mod utils;

/// Error macros
#[macro_use]
extern crate anyhow;

pub use alignment::{AlignmentError, LabelPolicy, TokenLabel, TokenLabelAligner};
pub use spans::{Answer, CharSpan, InvalidSpanError, TokenSpan};
