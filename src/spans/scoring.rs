use derive_new::new;
use serde::{Deserialize, Serialize};

use super::TokenSpan;

/// A candidate token span with its score, the sum of its start and end logits
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, new)]
pub struct ScoredSpan {
    /// The token span
    pub span: TokenSpan,

    /// The span's score
    pub score: f32,
}

/// The score of the no-answer position, if the logits reach it
pub fn null_score(start_logits: &[f32], end_logits: &[f32], no_answer_index: usize) -> Option<f32> {
    Some(start_logits.get(no_answer_index)? + end_logits.get(no_answer_index)?)
}

/// The highest scoring span whose both ends are `allowed`, no longer than `max_answer_length`
/// tokens. Ties go to the earliest span: lowest start, then lowest end.
pub fn best_span(
    start_logits: &[f32],
    end_logits: &[f32],
    allowed: &[bool],
    max_answer_length: usize,
) -> Option<ScoredSpan> {
    let mut best: Option<ScoredSpan> = None;

    for_each_span(
        start_logits,
        end_logits,
        allowed,
        max_answer_length,
        |candidate| {
            // Strictly greater, so an equal score found later never replaces an earlier span
            if best.map_or(true, |b| candidate.score > b.score) {
                best = Some(candidate);
            }
        },
    );

    best
}

/// The `top_k` highest scoring spans, best first. Equal scores keep the earliest span first.
pub fn ranked_spans(
    start_logits: &[f32],
    end_logits: &[f32],
    allowed: &[bool],
    max_answer_length: usize,
    top_k: usize,
) -> Vec<ScoredSpan> {
    let mut spans = Vec::new();

    for_each_span(
        start_logits,
        end_logits,
        allowed,
        max_answer_length,
        |candidate| spans.push(candidate),
    );

    // Stable sort over spans generated in (start, end) order
    spans.sort_by(|a, b| b.score.total_cmp(&a.score));
    spans.truncate(top_k);

    spans
}

fn for_each_span<F: FnMut(ScoredSpan)>(
    start_logits: &[f32],
    end_logits: &[f32],
    allowed: &[bool],
    max_answer_length: usize,
    mut f: F,
) {
    let len = start_logits.len().min(end_logits.len()).min(allowed.len());

    for start in (0..len).filter(|&s| allowed[s]) {
        let last = start.saturating_add(max_answer_length).min(len);

        for end in (start..last).filter(|&e| allowed[e]) {
            let score = start_logits[start] + end_logits[end];

            if score.is_nan() {
                continue;
            }

            f(ScoredSpan::new(TokenSpan::new(start, end), score));
        }
    }
}
