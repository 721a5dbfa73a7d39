use std::path::Path;

use tokenizers::Tokenizer;

/// Load a tokenizer from a local `tokenizer.json`, or from the Hugging Face Hub by model name.
/// Hub downloads are cached, so the file is only fetched once.
pub fn load_tokenizer(name_or_path: &str) -> anyhow::Result<Tokenizer> {
    if Path::new(name_or_path).is_file() {
        return Tokenizer::from_file(name_or_path)
            .map_err(|e| anyhow!("Unable to load tokenizer from {}: {}", name_or_path, e));
    }

    log::debug!("Fetching tokenizer for {} from the Hugging Face Hub", name_or_path);

    Tokenizer::from_pretrained(name_or_path, None)
        .map_err(|e| anyhow!("Unable to download tokenizer for {}: {}", name_or_path, e))
}

/// Look up the id of a special token such as `[CLS]`
pub fn special_token_id(tokenizer: &Tokenizer, token: &str) -> anyhow::Result<u32> {
    tokenizer
        .token_to_id(token)
        .ok_or_else(|| anyhow!("Tokenizer has no {} token", token))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::utils::testing;

    #[test]
    fn test_load_tokenizer_from_file() {
        let dir = std::env::temp_dir().join(format!("token-aligner-hf-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let path = dir.join("tokenizer.json");
        std::fs::write(&path, testing::tokenizer_json()).unwrap();

        let tokenizer = load_tokenizer(path.to_str().unwrap()).unwrap();

        assert_eq!(special_token_id(&tokenizer, "[CLS]").unwrap(), 2);
        assert!(special_token_id(&tokenizer, "<s>").is_err());
    }
}
