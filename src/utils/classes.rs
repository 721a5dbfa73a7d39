use std::{collections::BTreeMap, hash::Hash};

use serde::{Deserialize, Serialize};

/// Invert a map by swapping keys and values
pub fn invert_map<K, V, MK, MV>(original: MK) -> MV
where
    K: Ord + Hash + Eq,
    V: Ord + Hash + Eq + Clone,
    MK: IntoIterator<Item = (K, V)>,
    MV: FromIterator<(V, K)>,
{
    original
        .into_iter()
        .map(|(key, value)| (value, key))
        .collect()
}

/// An ordered label vocabulary, with lookups in both directions
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    /// A mapping from class ids to class name labels
    id2label: BTreeMap<usize, String>,

    /// A mapping from class name labels to class ids
    label2id: BTreeMap<String, usize>,
}

impl Labels {
    /// Build a vocabulary where each name's id is its position
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        let id2label: BTreeMap<usize, String> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (i, name.as_ref().trim().to_string()))
            .collect();

        let label2id = invert_map(id2label.clone());

        Self { id2label, label2id }
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.id2label.len()
    }

    /// True if there are no labels
    pub fn is_empty(&self) -> bool {
        self.id2label.is_empty()
    }

    /// The id of a label name
    pub fn id(&self, name: &str) -> Option<usize> {
        self.label2id.get(name).copied()
    }

    /// The name of a label id
    pub fn name(&self, id: usize) -> Option<&str> {
        self.id2label.get(&id).map(String::as_str)
    }

    /// Look up the ids for a sequence of label names
    pub fn ids<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>, LabelError> {
        names
            .iter()
            .map(|name| {
                self.id(name.as_ref())
                    .ok_or_else(|| LabelError::UnknownLabel(name.as_ref().to_string()))
            })
            .collect()
    }

    /// Look up the names for a sequence of label ids
    pub fn names(&self, ids: &[usize]) -> Result<Vec<String>, LabelError> {
        ids.iter()
            .map(|id| {
                self.name(*id)
                    .map(str::to_string)
                    .ok_or(LabelError::UnknownId(*id))
            })
            .collect()
    }

    /// Label names in id order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.id2label.values().map(String::as_str)
    }
}

/// Label Error
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LabelError {
    /// The label name is not part of the vocabulary
    #[error("unknown label {0}")]
    UnknownLabel(String),

    /// The label id is not part of the vocabulary
    #[error("unknown label id {0}")]
    UnknownId(usize),

    /// A training target that is neither a label id nor the ignore index
    #[error("invalid target id {0}")]
    InvalidTarget(i64),
}
