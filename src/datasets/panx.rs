use std::fmt::Display;

use async_trait::async_trait;
use burn::data::dataset::{self, Dataset as _, InMemDataset};
use derive_new::new;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{pipelines::token_classification, utils::classes::Labels};

use super::{DatasetError, LoadableDataset};

/// The name of the PAN-X dataset
pub static DATASET: &str = "panx";

/// The PAN-X tag set, in IOB2 format
pub const TAGS: [&str; 7] = ["O", "B-PER", "I-PER", "B-ORG", "I-ORG", "B-LOC", "I-LOC"];

/// The PAN-X label vocabulary
pub fn labels() -> Labels {
    Labels::new(&TAGS)
}

/// The languages of the Swiss corpus
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Language {
    /// German
    De,
    /// French
    Fr,
    /// Italian
    It,
    /// English
    En,
}

impl Language {
    /// All supported languages
    pub const ALL: [Language; 4] = [Language::De, Language::Fr, Language::It, Language::En];

    /// The language code used for the dataset subset
    pub fn code(&self) -> &'static str {
        match self {
            Language::De => "de",
            Language::Fr => "fr",
            Language::It => "it",
            Language::En => "en",
        }
    }

    /// The share of the corpus taken from this language, following the spoken proportions in
    /// Switzerland
    pub fn fraction(&self) -> f64 {
        match self {
            Language::De => 0.629,
            Language::Fr => 0.229,
            Language::It => 0.084,
            Language::En => 0.059,
        }
    }
}

impl TryFrom<&str> for Language {
    type Error = DatasetError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.to_lowercase();
        let code = value.strip_prefix("panx.").unwrap_or(&value);

        Language::ALL
            .into_iter()
            .find(|language| language.code() == code)
            .ok_or_else(|| DatasetError::UnknownLanguage(value.to_string()))
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A PAN-X item: a sentence pre-split into words, with one tag per word
#[derive(Clone, Debug, Serialize, Deserialize, new)]
pub struct Item {
    /// Whitespace separated words
    pub tokens: String,

    /// Whitespace separated IOB2 tags, one per word
    pub ner_tags: String,

    /// The language code of the sentence
    pub lang: String,
}

impl token_classification::Item for Item {
    fn words(&self) -> Vec<&str> {
        self.tokens.split_whitespace().collect()
    }

    fn class_labels(&self) -> Vec<&str> {
        self.ner_tags.split_whitespace().collect()
    }
}

/// Struct for the PAN-X dataset
pub struct Dataset {
    /// Underlying In-Memory dataset
    dataset: InMemDataset<Item>,
}

/// Implement the Dataset trait for the PAN-X dataset
impl dataset::Dataset<Item> for Dataset {
    /// Returns a specific item from the dataset
    fn get(&self, index: usize) -> Option<Item> {
        self.dataset.get(index)
    }

    /// Returns the length of the dataset
    fn len(&self) -> usize {
        self.dataset.len()
    }
}

#[async_trait]
impl LoadableDataset<Item> for Dataset {
    /// Loads `{data_dir}/datasets/panx/{lang}/{split}.csv`
    async fn load(data_dir: &str, subset: &str, split: &str) -> Result<Self, DatasetError> {
        let language = Language::try_from(subset)?;
        let path = format!("{}/datasets/{}/{}/{}.csv", data_dir, DATASET, language, split);
        let reader = csv::ReaderBuilder::new();

        let dataset: InMemDataset<Item> = InMemDataset::from_csv(&path, &reader)?;

        let dataset = Self { dataset };
        dataset.validate()?;

        log::debug!("Loaded {} {} items from {}", dataset.len(), language, path);

        Ok(dataset)
    }
}

// Implement methods for constructing and sampling the PAN-X dataset
impl Dataset {
    /// Constructs the dataset from items already in memory
    pub fn from_items(items: Vec<Item>) -> Result<Self, DatasetError> {
        let dataset = Self {
            dataset: InMemDataset::new(items),
        };
        dataset.validate()?;

        Ok(dataset)
    }

    /// Loads every language for a split, keeping each language's `fraction` of its items
    pub async fn load_corpus(
        data_dir: &str,
        split: &str,
        fractions: &[(Language, f64)],
        seed: u64,
    ) -> Result<Self, DatasetError> {
        let mut items = Vec::new();

        for (language, fraction) in fractions {
            let dataset = Self::load(data_dir, language.code(), split)
                .await?
                .downsample(*fraction, seed);

            log::debug!("Keeping {} {} items for {}", dataset.len(), language, split);

            items.extend(dataset.dataset.iter());
        }

        Self::from_items(items)
    }

    /// Shuffle with a seeded RNG and keep `floor(len * fraction)` items
    pub fn downsample(self, fraction: f64, seed: u64) -> Self {
        let mut items: Vec<Item> = self.dataset.iter().collect();
        let mut rng = StdRng::seed_from_u64(seed);

        items.shuffle(&mut rng);
        items.truncate((items.len() as f64 * fraction.clamp(0.0, 1.0)).floor() as usize);

        Self {
            dataset: InMemDataset::new(items),
        }
    }

    /// Number of items per language code
    pub fn language_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();

        for item in self.dataset.iter() {
            match counts.iter_mut().find(|(lang, _)| *lang == item.lang) {
                Some((_, count)) => *count += 1,
                None => counts.push((item.lang.clone(), 1)),
            }
        }

        counts
    }

    fn validate(&self) -> Result<(), DatasetError> {
        for (row, item) in self.dataset.iter().enumerate() {
            let words = item.tokens.split_whitespace().count();
            let tags = item.ner_tags.split_whitespace().count();

            if words != tags {
                return Err(DatasetError::Mismatch { row, words, tags });
            }
        }

        Ok(())
    }
}
