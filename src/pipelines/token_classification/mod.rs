/// Batcher
pub mod batcher;

/// Token Classification Items
pub mod item;

pub use batcher::{BatchError, Batcher, Infer, Train};
pub use item::Item;

/// Collapse token predictions back to one prediction per word, taking the first sub-token of each
/// word. Special tokens are skipped.
pub fn predictions_to_words<P: Clone>(word_ids: &[Option<usize>], predicted: &[P]) -> Vec<P> {
    let mut words = Vec::new();
    let mut previous: Option<usize> = None;

    for (word_id, prediction) in word_ids.iter().zip(predicted) {
        if let Some(word) = word_id {
            if previous != Some(*word) {
                words.push(prediction.clone());
            }
        }

        previous = *word_id;
    }

    words
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_predictions_to_words() {
        let word_ids = [None, Some(0), Some(1), Some(1), Some(2), None];
        let predicted = ["O", "B-PER", "I-PER", "B-LOC", "O", "I-ORG"];

        assert_eq!(
            predictions_to_words(&word_ids, &predicted),
            vec!["B-PER", "I-PER", "O"]
        );
    }
}
