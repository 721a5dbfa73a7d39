use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::{
    alignment::TokenLabelAligner,
    spans::{self, Answer, Candidate, TokenSpan},
};

use super::Config;

/// Start and end logits produced by a QA head for one window
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, new)]
pub struct SpanLogits {
    /// Logit of each token starting the answer
    pub start: Vec<f32>,

    /// Logit of each token ending the answer
    pub end: Vec<f32>,
}

/// A window's character offsets together with the model's logits for it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, new)]
pub struct ScoredWindow {
    /// Character range of each token in the context, `None` outside the context
    pub offsets: Vec<Option<(usize, usize)>>,

    /// The model output for the window
    pub logits: SpanLogits,
}

/// An answer reported to the caller
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, new)]
pub struct Prediction {
    /// The answer's score
    pub score: f32,

    /// The decoded answer
    pub answer: Answer,

    /// The answer text, empty for no answer
    pub text: String,

    /// The document the answer came from, when read through a retriever pipeline
    pub document: Option<String>,
}

/// Decode the best answers of every window of a context and merge them across windows.
///
/// Each window contributes its `top_k` best spans over context tokens. Spans repeated by
/// overlapping windows are merged, keeping the best score. With `handle_impossible_answer`, a
/// no-answer prediction scored by the lowest no-answer logit over the windows competes with the
/// spans.
pub fn extract_answers(
    context: &str,
    windows: &[ScoredWindow],
    aligner: &TokenLabelAligner,
    config: &Config,
) -> anyhow::Result<Vec<Prediction>> {
    let no_answer_index = aligner.config().no_answer_index;
    let no_answer = TokenSpan::new(no_answer_index, no_answer_index);

    let mut candidates = Vec::new();
    let mut min_null_score: Option<f32> = None;

    for (index, window) in windows.iter().enumerate() {
        let ScoredWindow { offsets, logits } = window;

        if logits.start.len() != offsets.len() || logits.end.len() != offsets.len() {
            return Err(anyhow!(
                "Window {} has {} tokens but {} start and {} end logits",
                index,
                offsets.len(),
                logits.start.len(),
                logits.end.len()
            ));
        }

        if let Some(score) = spans::null_score(&logits.start, &logits.end, no_answer_index) {
            min_null_score = Some(min_null_score.map_or(score, |min| min.min(score)));
        }

        let allowed: Vec<bool> = offsets.iter().map(Option::is_some).collect();

        // The no-answer span is scored through the null score, so it must not take a slot here
        let ranked = spans::ranked_spans(
            &logits.start,
            &logits.end,
            &allowed,
            config.max_answer_length,
            config.top_k.saturating_add(1),
        );

        for scored in ranked
            .into_iter()
            .filter(|scored| scored.span != no_answer)
            .take(config.top_k)
        {
            let answer = aligner.decode_span(scored.span.start, scored.span.end, offsets)?;

            if let Answer::Span(span) = answer {
                candidates.push(Candidate::new(span, scored.score, index));
            }
        }
    }

    let merged = spans::merge_candidates(candidates);

    log::debug!(
        "Merged answers from {} windows into {} candidates",
        windows.len(),
        merged.len()
    );

    let mut predictions = Vec::with_capacity(merged.len() + 1);

    for candidate in merged {
        let text = candidate.span.extract(context).ok_or_else(|| {
            anyhow!(
                "Answer {}..{} is outside the context",
                candidate.span.start,
                candidate.span.end
            )
        })?;

        predictions.push(Prediction::new(
            candidate.score,
            Answer::Span(candidate.span),
            text.to_string(),
            None,
        ));
    }

    if config.handle_impossible_answer {
        if let Some(score) = min_null_score {
            predictions.push(Prediction::new(score, Answer::NoAnswer, String::new(), None));
        }
    }

    // Stable, so an equal scoring no-answer stays behind the spans
    predictions.sort_by(|a, b| b.score.total_cmp(&a.score));
    predictions.truncate(config.top_k);

    Ok(predictions)
}
