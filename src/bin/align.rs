//! Command line tool to align PAN-X word labels with a tokenizer's sub-word tokens

use anyhow::anyhow;
use burn::data::dataset::Dataset as _;
use pico_args::Arguments;
use serde_json::json;
use token_aligner::{
    alignment::{self, word_ids_from_encoding, LabelPolicy, TokenLabelAligner},
    datasets::{
        panx::{self, Language},
        LoadableDataset,
    },
    pipelines::token_classification::Item as _,
    utils::{files::read_yaml, hugging_face::load_tokenizer},
};

const HELP: &str = "\
Usage: align TOKENIZER LANGUAGE [OPTIONS]

Arguments:
  TOKENIZER            A tokenizer.json path or a Hugging Face model name (e.g., 'xlm-roberta-base')
  LANGUAGE             The PAN-X language to align (e.g., 'de')

Options:
  -h, --help           Print help
  -d, --data-dir       The path to the top-level data directory (defaults to 'data')
  -s, --split          The split to align (defaults to 'validation')
  -p, --policy         Label policy for sub-word tokens: 'first' or 'all'
  -c, --config         An aligner config file in YAML
  -n, --limit          Only align the first N items
";

#[derive(Debug)]
struct Args {
    tokenizer: String,
    language: String,
    data_dir: Option<String>,
    split: Option<String>,
    policy: Option<String>,
    config: Option<String>,
    limit: Option<usize>,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            data_dir: pargs.opt_value_from_str(["-d", "--data-dir"])?,
            split: pargs.opt_value_from_str(["-s", "--split"])?,
            policy: pargs.opt_value_from_str(["-p", "--policy"])?,
            config: pargs.opt_value_from_str(["-c", "--config"])?,
            limit: pargs.opt_value_from_str(["-n", "--limit"])?,
            tokenizer: pargs.free_from_str().map_err(|e| match e {
                pico_args::Error::MissingArgument => anyhow!("Missing required argument: TOKENIZER"),
                _ => anyhow!("{}", e),
            })?,
            language: pargs.free_from_str().map_err(|e| match e {
                pico_args::Error::MissingArgument => anyhow!("Missing required argument: LANGUAGE"),
                _ => anyhow!("{}", e),
            })?,
        };

        Ok(Some(args))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    let language = Language::try_from(args.language.as_str())?;

    let mut config = match &args.config {
        Some(path) => read_yaml::<alignment::Config>(path).await?,
        None => alignment::Config::new(),
    };

    if let Some(policy) = &args.policy {
        config.label_policy = LabelPolicy::try_from(policy.as_str())?;
    }

    let aligner = TokenLabelAligner::new(config);
    let tokenizer = load_tokenizer(&args.tokenizer)?;
    let labels = panx::labels();

    let data_dir = args.data_dir.as_deref().unwrap_or("data");
    let split = args.split.as_deref().unwrap_or("validation");

    let dataset = panx::Dataset::load(data_dir, language.code(), split).await?;
    let limit = args.limit.unwrap_or(dataset.len()).min(dataset.len());

    log::info!("Aligning {} {} items from {}", limit, language, split);

    for item in dataset.iter().take(limit) {
        let encoding = tokenizer
            .encode(item.words(), true)
            .map_err(|e| anyhow!("Unable to encode {:?}: {}", item.tokens, e))?;

        let word_ids = word_ids_from_encoding(&encoding);
        let label_ids = labels.ids(&item.class_labels())?;

        let aligned: Vec<Option<&str>> = aligner
            .align_labels(&word_ids, &label_ids)?
            .into_iter()
            .map(|label| label.label().and_then(|id| labels.name(*id)))
            .collect();

        let targets = aligner.align_label_ids(&word_ids, &label_ids)?;

        println!(
            "{}",
            json!({
                "tokens": encoding.get_tokens(),
                "word_ids": word_ids,
                "labels": aligned,
                "targets": targets,
            })
        );
    }

    Ok(())
}
