use serde::{Deserialize, Serialize};

/// How a word's label is spread over the sub-word tokens it was split into
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPolicy {
    /// Only the first sub-token carries the label; continuation tokens are ignored
    #[default]
    FirstSubToken,

    /// Every sub-token of a word carries the word's label
    AllSubTokens,
}

impl TryFrom<&str> for LabelPolicy {
    type Error = PolicyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "first" | "first_sub_token" => Ok(LabelPolicy::FirstSubToken),
            "all" | "all_sub_tokens" => Ok(LabelPolicy::AllSubTokens),
            _ => Err(PolicyError::Unknown(value.to_string())),
        }
    }
}

/// Policy Error
#[derive(thiserror::Error, Debug)]
pub enum PolicyError {
    /// No policy found for the given string
    #[error("no label policy found for {0}")]
    Unknown(String),
}

/// Configuration for the token label aligner
#[derive(burn::config::Config, Debug)]
pub struct Config {
    /// Which sub-tokens of a word receive the word's label
    #[config(default = "LabelPolicy::FirstSubToken")]
    pub label_policy: LabelPolicy,

    /// The id written for ignored tokens when producing training targets
    #[config(default = "-100")]
    pub ignore_index: i64,

    /// The token position a QA head points at to signal "no answer" (usually `[CLS]`)
    #[config(default = 0)]
    pub no_answer_index: usize,
}
