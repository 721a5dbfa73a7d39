use serde::de::DeserializeOwned;
use tokio::{
    fs::{self, File},
    io::{self, AsyncBufReadExt, Lines},
};

/// Read a file from the given path into a list of strings
pub async fn read_file(path: &str) -> io::Result<Vec<String>> {
    let mut r = file_reader(path).await?;
    let mut lines = Vec::new();

    while let Some(line) = r.next_line().await? {
        lines.push(line);
    }

    Ok(lines)
}

/// Read a YAML file into a config or any other deserializable value
pub async fn read_yaml<T: DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let contents = fs::read_to_string(path)
        .await
        .map_err(|e| anyhow!("Unable to read {}: {}", path, e))?;

    serde_yaml::from_str(&contents).map_err(|e| anyhow!("Unable to parse {}: {}", path, e))
}

async fn file_reader(path: &str) -> io::Result<Lines<io::BufReader<File>>> {
    let f = File::open(path).await?;

    Ok(io::BufReader::new(f).lines())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::alignment::{Config, LabelPolicy};

    #[tokio::test]
    async fn test_read_yaml_config() {
        let dir = std::env::temp_dir().join(format!("token-aligner-yaml-{}", std::process::id()));
        fs::create_dir_all(&dir).await.unwrap();

        let path = dir.join("aligner.yaml");
        fs::write(
            &path,
            "label_policy: all_sub_tokens\nignore_index: 0\nno_answer_index: 0\n",
        )
        .await
        .unwrap();

        let config: Config = read_yaml(path.to_str().unwrap()).await.unwrap();

        assert_eq!(config.label_policy, LabelPolicy::AllSubTokens);
        assert_eq!(config.ignore_index, 0);

        let lines = read_file(path.to_str().unwrap()).await.unwrap();

        assert_eq!(lines.len(), 3);
    }
}
