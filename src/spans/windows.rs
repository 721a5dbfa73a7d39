use std::ops::Range;

use derive_new::new;
use serde::{Deserialize, Serialize};

use super::CharSpan;

/// Window Error
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum WindowError {
    /// Windows can't hold any tokens
    #[error("window length must be greater than zero")]
    EmptyWindow,

    /// The overlap would stop the windows from advancing
    #[error("stride {stride} must be smaller than the window length {max_length}")]
    StrideTooLarge {
        /// Tokens shared by consecutive windows
        stride: usize,
        /// Tokens per window
        max_length: usize,
    },
}

/// Split `n_tokens` tokens into windows of at most `max_length` tokens, where consecutive windows
/// share `stride` tokens. The last window always ends at `n_tokens`.
///
/// With 250 tokens, a length of 100 and a stride of 25 this yields `0..100`, `75..175` and
/// `150..250`.
pub fn windows(
    n_tokens: usize,
    max_length: usize,
    stride: usize,
) -> Result<Vec<Range<usize>>, WindowError> {
    if max_length == 0 {
        return Err(WindowError::EmptyWindow);
    }

    if stride >= max_length {
        return Err(WindowError::StrideTooLarge { stride, max_length });
    }

    let step = max_length - stride;
    let mut ranges = Vec::new();
    let mut start = 0;

    while start < n_tokens {
        let end = (start + max_length).min(n_tokens);

        ranges.push(start..end);

        if end == n_tokens {
            break;
        }

        start += step;
    }

    Ok(ranges)
}

/// An answer found in one window of a longer text
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, new)]
pub struct Candidate {
    /// Character range of the answer in the full text
    pub span: CharSpan,

    /// The model's score for the answer
    pub score: f32,

    /// Index of the window the answer was found in
    pub window: usize,
}

/// Deduplicate answers found in overlapping windows.
///
/// Candidates whose character ranges overlap are reported once, keeping the highest score. Equal
/// scores keep the earliest start. The result is ordered best first.
pub fn merge_candidates(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.span.start.cmp(&b.span.start))
            .then_with(|| a.span.end.cmp(&b.span.end))
    });

    let mut merged: Vec<Candidate> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        if !merged.iter().any(|kept| kept.span.overlaps(&candidate.span)) {
            merged.push(candidate);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_strided_windows() {
        assert_eq!(
            windows(250, 100, 25).unwrap(),
            vec![0..100, 75..175, 150..250]
        );
    }

    #[test]
    fn test_short_text_is_one_window() {
        assert_eq!(windows(40, 100, 25).unwrap(), vec![0..40]);
        assert_eq!(windows(100, 100, 25).unwrap(), vec![0..100]);
    }

    #[test]
    fn test_last_window_is_clamped() {
        assert_eq!(windows(10, 4, 1).unwrap(), vec![0..4, 3..7, 6..10]);
        assert_eq!(windows(11, 4, 1).unwrap(), vec![0..4, 3..7, 6..10, 9..11]);
    }

    #[test]
    fn test_no_tokens() {
        assert!(windows(0, 100, 25).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_windows() {
        assert_eq!(windows(10, 0, 0), Err(WindowError::EmptyWindow));
        assert_eq!(
            windows(10, 4, 4),
            Err(WindowError::StrideTooLarge {
                stride: 4,
                max_length: 4
            })
        );
    }

    #[test]
    fn test_merge_keeps_highest_score() {
        let merged = merge_candidates(vec![
            Candidate::new(CharSpan::new(400, 412), 3.5, 0),
            Candidate::new(CharSpan::new(405, 420), 7.25, 1),
            Candidate::new(CharSpan::new(10, 15), 1.0, 0),
        ]);

        assert_eq!(
            merged,
            vec![
                Candidate::new(CharSpan::new(405, 420), 7.25, 1),
                Candidate::new(CharSpan::new(10, 15), 1.0, 0),
            ]
        );
    }

    #[test]
    fn test_merge_ties_keep_earliest() {
        let merged = merge_candidates(vec![
            Candidate::new(CharSpan::new(20, 30), 2.0, 1),
            Candidate::new(CharSpan::new(18, 25), 2.0, 0),
        ]);

        assert_eq!(merged, vec![Candidate::new(CharSpan::new(18, 25), 2.0, 0)]);
    }

    #[test]
    fn test_merge_identical_spans() {
        let merged = merge_candidates(vec![
            Candidate::new(CharSpan::new(5, 12), 1.0, 0),
            Candidate::new(CharSpan::new(5, 12), 1.5, 1),
        ]);

        assert_eq!(merged, vec![Candidate::new(CharSpan::new(5, 12), 1.5, 1)]);
    }
}
