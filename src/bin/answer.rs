//! Command line tool to decode and merge extractive QA predictions over sliding windows

use anyhow::anyhow;
use pico_args::Arguments;
use serde::Deserialize;
use token_aligner::{
    alignment::{self, TokenLabelAligner},
    pipelines::question_answering::{self, extract_answers, ScoredWindow},
    utils::files::{read_file, read_yaml},
};

const HELP: &str = "\
Usage: answer PREDICTIONS [OPTIONS]

Arguments:
  PREDICTIONS          A JSON lines file with one scored window per line:
                       {\"context\": ..., \"offsets\": [[start, end] | null, ...],
                        \"logits\": {\"start\": [...], \"end\": [...]}}

Options:
  -h, --help           Print help
  -k, --top-k          Number of answers to print
  -m, --max-answer     Longest answer considered, in tokens
  -c, --config         A reader config file in YAML
  -a, --aligner        An aligner config file in YAML (e.g., to move the no-answer index)
  --allow-no-answer    Report no answer when it outscores every span
";

#[derive(Debug)]
struct Args {
    predictions: String,
    top_k: Option<usize>,
    max_answer_length: Option<usize>,
    config: Option<String>,
    aligner: Option<String>,
    allow_no_answer: bool,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            top_k: pargs.opt_value_from_str(["-k", "--top-k"])?,
            max_answer_length: pargs.opt_value_from_str(["-m", "--max-answer"])?,
            config: pargs.opt_value_from_str(["-c", "--config"])?,
            aligner: pargs.opt_value_from_str(["-a", "--aligner"])?,
            allow_no_answer: pargs.contains("--allow-no-answer"),
            predictions: pargs.free_from_str().map_err(|e| match e {
                pico_args::Error::MissingArgument => {
                    anyhow!("Missing required argument: PREDICTIONS")
                }
                _ => anyhow!("{}", e),
            })?,
        };

        Ok(Some(args))
    }
}

/// One line of the predictions file
#[derive(Debug, Deserialize)]
struct Line {
    context: String,

    #[serde(flatten)]
    window: ScoredWindow,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    let mut config = match &args.config {
        Some(path) => read_yaml::<question_answering::Config>(path).await?,
        None => question_answering::Config::new(),
    };

    if let Some(top_k) = args.top_k {
        config.top_k = top_k;
    }

    if let Some(max_answer_length) = args.max_answer_length {
        config.max_answer_length = max_answer_length;
    }

    if args.allow_no_answer {
        config.handle_impossible_answer = true;
    }

    let mut context: Option<String> = None;
    let mut windows = Vec::new();

    for (number, line) in read_file(&args.predictions).await?.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let line: Line = serde_json::from_str(line)
            .map_err(|e| anyhow!("Invalid prediction on line {}: {}", number + 1, e))?;

        match &context {
            Some(existing) if *existing != line.context => {
                return Err(anyhow!(
                    "Line {} scores a different context than the lines before it",
                    number + 1
                ));
            }
            Some(_) => {}
            None => context = Some(line.context),
        }

        windows.push(line.window);
    }

    let context = context.ok_or_else(|| anyhow!("No predictions in {}", args.predictions))?;

    let aligner = match &args.aligner {
        Some(path) => TokenLabelAligner::new(read_yaml::<alignment::Config>(path).await?),
        None => TokenLabelAligner::default(),
    };

    let predictions = extract_answers(&context, &windows, &aligner, &config)?;

    for prediction in predictions {
        println!("{}", serde_json::to_string(&prediction)?);
    }

    Ok(())
}
