use std::fmt::Debug;

/// A trait for items that can be used for token classification
pub trait Item: Send + Sync + Clone + Debug {
    /// Returns the input text, already split into words
    fn words(&self) -> Vec<&str>;

    /// Returns one class label per word
    fn class_labels(&self) -> Vec<&str>;
}
