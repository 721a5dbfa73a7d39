use std::str::FromStr;

use serde_json::{json, Map, Value};
use tokenizers::Tokenizer;

const SPECIAL_TOKENS: [&str; 4] = ["[PAD]", "[UNK]", "[CLS]", "[SEP]"];

const VOCAB: [&str; 33] = [
    "Jeff", "De", "##an", "works", "at", "Google", "Ger", "##many", "Where", "does", "work", "?",
    "in", "Mountain", "View", ".", "Who", "is", "the", "founder", "of", "Berlin", "lives", "Paris",
    "and", "Rome", "He", "She", "visited", "Angela", "Merkel", "Zurich", "Europe",
];

/// A small BERT-style WordPiece tokenizer definition, as found in a `tokenizer.json`
pub fn tokenizer_json() -> String {
    let mut vocab = Map::new();

    for (id, token) in SPECIAL_TOKENS.iter().chain(VOCAB.iter()).enumerate() {
        vocab.insert(token.to_string(), json!(id));
    }

    let added_tokens: Vec<Value> = SPECIAL_TOKENS
        .iter()
        .enumerate()
        .map(|(id, token)| {
            json!({
                "id": id,
                "content": token,
                "single_word": false,
                "lstrip": false,
                "rstrip": false,
                "normalized": false,
                "special": true,
            })
        })
        .collect();

    json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": added_tokens,
        "normalizer": null,
        "pre_tokenizer": { "type": "BertPreTokenizer" },
        "post_processor": {
            "type": "BertProcessing",
            "sep": ["[SEP]", 3],
            "cls": ["[CLS]", 2],
        },
        "decoder": null,
        "model": {
            "type": "WordPiece",
            "unk_token": "[UNK]",
            "continuing_subword_prefix": "##",
            "max_input_chars_per_word": 100,
            "vocab": vocab,
        },
    })
    .to_string()
}

/// The test tokenizer, built in memory
pub fn tokenizer() -> Tokenizer {
    Tokenizer::from_str(&tokenizer_json()).expect("valid tokenizer definition")
}
