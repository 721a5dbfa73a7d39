/// Configuration for the extractive question answering reader
#[derive(burn::config::Config, Debug)]
pub struct Config {
    /// Maximum tokens per window, including the question and special tokens
    #[config(default = 384)]
    pub max_length: usize,

    /// Context tokens shared by consecutive windows
    #[config(default = 128)]
    pub stride: usize,

    /// Longest answer considered, in tokens
    #[config(default = 15)]
    pub max_answer_length: usize,

    /// Report "no answer" when the no-answer position outscores every span
    #[config(default = false)]
    pub handle_impossible_answer: bool,

    /// Number of answers to return
    #[config(default = 1)]
    pub top_k: usize,

    /// The classifier token that starts each window
    #[config(default = "\"[CLS]\".to_string()")]
    pub cls_token: String,

    /// The separator token after the question and the context
    #[config(default = "\"[SEP]\".to_string()")]
    pub sep_token: String,
}
