use crate::config::NerBackend;
use crate::domain::model::ExtractionStrategy;
use clap::Parser;
use std::path::PathBuf;

/// Command-line overrides. Anything left unset falls back to the config
/// file, then to the built-in defaults.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "card-ocr")]
#[command(about = "Business card OCR service returning structured contact records")]
pub struct CliArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Directory for uploaded images while they are processed
    #[arg(long)]
    pub upload_dir: Option<PathBuf>,

    #[arg(long)]
    pub max_file_size_bytes: Option<u64>,

    #[arg(long)]
    pub ocr_language: Option<String>,

    /// OCR executable, invoked as `<cmd> <image> stdout -l <language>`
    #[arg(long)]
    pub ocr_command: Option<String>,

    #[arg(long)]
    pub ocr_timeout_secs: Option<u64>,

    /// `heuristic` or `ner`
    #[arg(long)]
    pub strategy: Option<ExtractionStrategy>,

    /// `process` or `http`
    #[arg(long)]
    pub ner_backend: Option<NerBackend>,

    #[arg(long)]
    pub ner_command: Option<String>,

    /// Argument passed to the NER command; repeat for several
    #[arg(long = "ner-arg", allow_hyphen_values = true)]
    pub ner_args: Vec<String>,

    #[arg(long)]
    pub ner_endpoint: Option<String>,

    #[arg(long)]
    pub ner_timeout_secs: Option<u64>,

    /// Include error source chains in 500 responses
    #[arg(long)]
    pub development: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}
