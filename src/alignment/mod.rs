/// The token label aligner
pub mod aligner;

/// Aligner configuration
pub mod config;

pub use aligner::{word_ids_from_encoding, AlignmentError, TokenLabel, TokenLabelAligner};
pub use config::{Config, LabelPolicy, PolicyError};
