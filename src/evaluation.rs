use std::collections::{BTreeMap, HashSet};

use rusev::{Average, ClassMetrics, DivByZeroStrat, SchemeType};
use serde::{Deserialize, Serialize};

use crate::utils::classes::{LabelError, Labels};

/// Entities are chunked in strict IOB2 mode: an entity opens on a `B-` tag only
const SCHEME: SchemeType = SchemeType::IOB2;

/// Evaluation Error
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum EvaluationError {
    /// The gold and predicted sequences don't line up
    #[error("{gold} gold tags but {predicted} predicted tags in sequence {row}")]
    Mismatch {
        /// The sequence index
        row: usize,
        /// Tags in the gold sequence
        gold: usize,
        /// Tags in the predicted sequence
        predicted: usize,
    },

    /// There are more gold sequences than predicted ones, or fewer
    #[error("{gold} gold sequences but {predicted} predicted sequences")]
    Count {
        /// Number of gold sequences
        gold: usize,
        /// Number of predicted sequences
        predicted: usize,
    },

    /// There is nothing to score
    #[error("no sequences to evaluate")]
    Empty,

    /// The metrics couldn't be computed, e.g. when neither side has any entity
    #[error("unable to compute entity metrics: {0}")]
    Metrics(String),
}

/// Precision, recall and F1 over entities
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    /// Share of predicted entities that are correct
    pub precision: f32,
    /// Share of gold entities that were found
    pub recall: f32,
    /// Harmonic mean of precision and recall
    pub f1: f32,
}

/// Scores for one entity type
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// The scores
    pub scores: Scores,
    /// Number of gold entities of this type
    pub support: usize,
}

impl From<&ClassMetrics> for Report {
    fn from(metrics: &ClassMetrics) -> Self {
        Self {
            scores: Scores {
                precision: metrics.precision,
                recall: metrics.recall,
                f1: metrics.fscore,
            },
            support: metrics.support,
        }
    }
}

/// Borrow the tag sequences in the shape the metrics expect, checking that they line up
fn as_tags<'a, S: AsRef<str>>(
    gold: &'a [Vec<S>],
    predicted: &'a [Vec<S>],
) -> Result<(Vec<Vec<&'a str>>, Vec<Vec<&'a str>>), EvaluationError> {
    if gold.len() != predicted.len() {
        return Err(EvaluationError::Count {
            gold: gold.len(),
            predicted: predicted.len(),
        });
    }

    if gold.iter().all(Vec::is_empty) {
        return Err(EvaluationError::Empty);
    }

    for (row, (g, p)) in gold.iter().zip(predicted).enumerate() {
        if g.len() != p.len() {
            return Err(EvaluationError::Mismatch {
                row,
                gold: g.len(),
                predicted: p.len(),
            });
        }
    }

    let borrow = |seqs: &'a [Vec<S>]| -> Vec<Vec<&'a str>> {
        seqs.iter()
            .map(|tags| tags.iter().map(|tag| tag.as_ref()).collect())
            .collect()
    };

    Ok((borrow(gold), borrow(predicted)))
}

/// Micro-averaged entity-level scores. An entity counts as correct only when its type and both
/// boundaries match.
pub fn f1_score<S: AsRef<str>>(
    gold: &[Vec<S>],
    predicted: &[Vec<S>],
) -> Result<Scores, EvaluationError> {
    let (gold, predicted) = as_tags(gold, predicted)?;

    let (precision, recall, f1, _) = rusev::precision_recall_fscore_support(
        gold,
        predicted,
        1.0_f32,
        Average::Micro,
        None,
        DivByZeroStrat::ReplaceBy0,
        Some(SCHEME),
        false,
        false,
    )
    .map_err(|e| EvaluationError::Metrics(e.to_string()))?;

    // Micro averages come back as single-element arrays
    Ok(Scores {
        precision: precision.iter().next().copied().unwrap_or(0.0),
        recall: recall.iter().next().copied().unwrap_or(0.0),
        f1: f1.iter().next().copied().unwrap_or(0.0),
    })
}

/// Entity-level scores per entity type
pub fn classification_report<S: AsRef<str>>(
    gold: &[Vec<S>],
    predicted: &[Vec<S>],
) -> Result<BTreeMap<String, Report>, EvaluationError> {
    let (gold, predicted) = as_tags(gold, predicted)?;

    let reporter = rusev::classification_report(
        gold,
        predicted,
        None,
        DivByZeroStrat::ReplaceBy0,
        Some(SCHEME),
        false,
        false,
    )
    .map_err(|e| EvaluationError::Metrics(e.to_string()))?;

    log::debug!("Entity report:\n{}", reporter);

    let classes: HashSet<ClassMetrics> = reporter.into();

    Ok(classes
        .iter()
        .filter(|metrics| metrics.average == Average::None)
        .map(|metrics| (metrics.class.clone(), Report::from(metrics)))
        .collect())
}

/// Turn padded token-level predictions and aligned targets back into word-level tag sequences,
/// skipping every position whose target is `ignore_index`
pub fn align_predictions(
    predicted: &[Vec<usize>],
    targets: &[Vec<i64>],
    ignore_index: i64,
    labels: &Labels,
) -> Result<(Vec<Vec<String>>, Vec<Vec<String>>), LabelError> {
    let mut gold_tags = Vec::with_capacity(targets.len());
    let mut predicted_tags = Vec::with_capacity(targets.len());

    for (row_predictions, row_targets) in predicted.iter().zip(targets) {
        let mut gold_row = Vec::new();
        let mut predicted_row = Vec::new();

        for (prediction, target) in row_predictions.iter().zip(row_targets) {
            if *target == ignore_index {
                continue;
            }

            let target = usize::try_from(*target).map_err(|_| LabelError::InvalidTarget(*target))?;

            gold_row.push(name(labels, target)?);
            predicted_row.push(name(labels, *prediction)?);
        }

        gold_tags.push(gold_row);
        predicted_tags.push(predicted_row);
    }

    Ok((gold_tags, predicted_tags))
}

fn name(labels: &Labels, id: usize) -> Result<String, LabelError> {
    labels
        .name(id)
        .map(str::to_string)
        .ok_or(LabelError::UnknownId(id))
}

/// Counts of (gold, predicted) tag pairs, for error analysis
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: BTreeMap<(String, String), usize>,
}

impl ConfusionMatrix {
    /// Count every aligned pair of gold and predicted tags
    pub fn from_sequences<S: AsRef<str>>(gold: &[Vec<S>], predicted: &[Vec<S>]) -> Self {
        let mut counts = BTreeMap::new();

        for (gold_row, predicted_row) in gold.iter().zip(predicted) {
            for (g, p) in gold_row.iter().zip(predicted_row) {
                *counts
                    .entry((g.as_ref().to_string(), p.as_ref().to_string()))
                    .or_insert(0) += 1;
            }
        }

        Self { counts }
    }

    /// How often `gold` was predicted as `predicted`
    pub fn get(&self, gold: &str, predicted: &str) -> usize {
        self.counts
            .get(&(gold.to_string(), predicted.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Tag accuracy over all counted words
    pub fn accuracy(&self) -> f64 {
        let total: usize = self.counts.values().sum();
        let correct: usize = self
            .counts
            .iter()
            .filter(|((g, p), _)| g == p)
            .map(|(_, n)| n)
            .sum();

        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        }
    }

    /// The confusions, most frequent first
    pub fn errors(&self) -> Vec<(&str, &str, usize)> {
        let mut errors: Vec<_> = self
            .counts
            .iter()
            .filter(|((g, p), _)| g != p)
            .map(|((g, p), n)| (g.as_str(), p.as_str(), *n))
            .collect();

        errors.sort_by(|a, b| b.2.cmp(&a.2));

        errors
    }
}
