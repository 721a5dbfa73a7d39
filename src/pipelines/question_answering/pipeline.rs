use derive_new::new;
use serde::{Deserialize, Serialize};

use super::{Prediction, Reader, SpanScorer};

/// A document returned by a retriever
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, new)]
pub struct Document {
    /// The document id in the store
    pub id: String,

    /// The document text
    pub content: String,
}

/// A document store that finds the documents most relevant to a query
pub trait Retriever {
    /// Return up to `top_k` documents for the query, most relevant first
    fn retrieve(&self, query: &str, top_k: usize) -> anyhow::Result<Vec<Document>>;
}

/// Retriever-reader pipeline: retrieve documents for a question, then read answers from each
#[derive(new)]
pub struct Pipeline<R: Retriever, S: SpanScorer> {
    retriever: R,
    reader: Reader<S>,
}

impl<R: Retriever, S: SpanScorer> Pipeline<R, S> {
    /// Answer a question over the `retriever_top_k` best documents. Answers from all documents
    /// are ranked together, keeping the reader's `top_k`.
    pub fn run(&self, query: &str, retriever_top_k: usize) -> anyhow::Result<Vec<Prediction>> {
        let documents = self.retriever.retrieve(query, retriever_top_k)?;

        log::debug!("Reading {} documents for {:?}", documents.len(), query);

        let mut predictions = Vec::new();

        for document in documents {
            for mut prediction in self.reader.answer(query, &document.content)? {
                prediction.document = Some(document.id.clone());
                predictions.push(prediction);
            }
        }

        predictions.sort_by(|a, b| b.score.total_cmp(&a.score));
        predictions.truncate(self.reader.config().top_k);

        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        alignment::TokenLabelAligner,
        pipelines::question_answering::{reader::tests::TokenScorer, Config},
        utils::testing,
    };

    /// Returns documents containing a query word, in insertion order
    struct KeywordRetriever(Vec<Document>);

    impl Retriever for KeywordRetriever {
        fn retrieve(&self, query: &str, top_k: usize) -> anyhow::Result<Vec<Document>> {
            Ok(self
                .0
                .iter()
                .filter(|doc| query.split_whitespace().any(|w| doc.content.contains(w)))
                .take(top_k)
                .cloned()
                .collect())
        }
    }

    #[test]
    fn test_run() {
        let retriever = KeywordRetriever(vec![
            Document::new("a".into(), "Angela Merkel visited Rome".into()),
            Document::new("b".into(), "Jeff Dean works at Google".into()),
            Document::new("c".into(), "He lives in Paris".into()),
        ]);

        let reader = Reader::new(
            testing::tokenizer(),
            TokenScorer("Google"),
            TokenLabelAligner::default(),
            Config::new().with_top_k(1),
        );

        let pipeline = Pipeline::new(retriever, reader);
        let predictions = pipeline.run("Where does Jeff Dean work ?", 3).unwrap();

        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].text, "Google");
        assert_eq!(predictions[0].document.as_deref(), Some("b"));
    }
}
