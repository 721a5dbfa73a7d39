/// File utilities
pub mod files;

/// Hugging Face utilities
pub mod hugging_face;

/// Tensor Utilities
pub mod tensors;

/// Utilities for classification labels
pub mod classes;

/// Shared test fixtures
#[cfg(test)]
pub(crate) mod testing;
