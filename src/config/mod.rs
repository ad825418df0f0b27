pub mod cli;
pub mod toml_config;

pub use cli::CliArgs;
pub use toml_config::TomlConfig;

use crate::domain::model::ExtractionStrategy;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";
pub const DEFAULT_OCR_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_NER_TIMEOUT_SECS: u64 = 10;

/// Which [`TextAnnotator`](crate::domain::ports::TextAnnotator) backs the
/// `ner` strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NerBackend {
    #[default]
    Process,
    Http,
}

impl std::str::FromStr for NerBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "process" => Ok(NerBackend::Process),
            "http" => Ok(NerBackend::Http),
            other => Err(format!(
                "unknown NER backend `{}` (expected `process` or `http`)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NerConfig {
    pub backend: NerBackend,
    pub command: String,
    pub args: Vec<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl NerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            backend: NerBackend::Process,
            command: "python3".to_string(),
            args: vec!["ner.py".to_string()],
            endpoint: None,
            timeout_secs: DEFAULT_NER_TIMEOUT_SECS,
        }
    }
}

/// Resolved service configuration, handed to the pipeline at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_file_size_bytes: u64,
    pub ocr_language: String,
    pub ocr_command: String,
    pub ocr_timeout_secs: u64,
    pub extraction_strategy: ExtractionStrategy,
    pub ner: NerConfig,
    pub development: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            upload_dir: std::env::temp_dir(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            ocr_language: DEFAULT_OCR_LANGUAGE.to_string(),
            ocr_command: "tesseract".to_string(),
            ocr_timeout_secs: DEFAULT_OCR_TIMEOUT_SECS,
            extraction_strategy: ExtractionStrategy::Heuristic,
            ner: NerConfig::default(),
            development: false,
        }
    }
}

impl AppConfig {
    /// Defaults, then the `--config` file, then `APP_ENV`, then CLI flags.
    pub fn resolve(args: &CliArgs) -> Result<Self> {
        let mut config = AppConfig::default();

        if let Some(path) = &args.config {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            TomlConfig::from_file(path)?.apply_to(&mut config);
        }

        if std::env::var("APP_ENV").is_ok_and(|env| env.eq_ignore_ascii_case("development")) {
            config.development = true;
        }

        config.apply_cli(args);
        Ok(config)
    }

    fn apply_cli(&mut self, args: &CliArgs) {
        if let Some(host) = &args.host {
            self.host = host.clone();
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(dir) = &args.upload_dir {
            self.upload_dir = dir.clone();
        }
        if let Some(max) = args.max_file_size_bytes {
            self.max_file_size_bytes = max;
        }
        if let Some(language) = &args.ocr_language {
            self.ocr_language = language.clone();
        }
        if let Some(command) = &args.ocr_command {
            self.ocr_command = command.clone();
        }
        if let Some(timeout) = args.ocr_timeout_secs {
            self.ocr_timeout_secs = timeout;
        }
        if let Some(strategy) = args.strategy {
            self.extraction_strategy = strategy;
        }
        if let Some(backend) = args.ner_backend {
            self.ner.backend = backend;
        }
        if let Some(command) = &args.ner_command {
            self.ner.command = command.clone();
        }
        if !args.ner_args.is_empty() {
            self.ner.args = args.ner_args.clone();
        }
        if let Some(endpoint) = &args.ner_endpoint {
            self.ner.endpoint = Some(endpoint.clone());
        }
        if let Some(timeout) = args.ner_timeout_secs {
            self.ner.timeout_secs = timeout;
        }
        if args.development {
            self.development = true;
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_secs)
    }
}

impl ConfigProvider for AppConfig {
    fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_bytes
    }

    fn ocr_language(&self) -> &str {
        &self.ocr_language
    }

    fn extraction_strategy(&self) -> ExtractionStrategy {
        self.extraction_strategy
    }

    fn development(&self) -> bool {
        self.development
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("host", &self.host)?;
        validation::validate_positive_number("port", u64::from(self.port), 1)?;
        validation::validate_path("upload_dir", &self.upload_dir.to_string_lossy())?;
        validation::validate_positive_number("max_file_size_bytes", self.max_file_size_bytes, 1)?;
        validation::validate_non_empty_string("ocr_language", &self.ocr_language)?;
        validation::validate_non_empty_string("ocr_command", &self.ocr_command)?;
        validation::validate_range("ocr_timeout_secs", self.ocr_timeout_secs, 1, 3600)?;

        if self.extraction_strategy == ExtractionStrategy::Ner {
            validation::validate_range("ner.timeout_secs", self.ner.timeout_secs, 1, 600)?;
            match self.ner.backend {
                NerBackend::Process => {
                    validation::validate_non_empty_string("ner.command", &self.ner.command)?;
                }
                NerBackend::Http => {
                    let endpoint = validation::validate_required_field("ner.endpoint", &self.ner.endpoint)?;
                    validation::validate_url("ner.endpoint", endpoint)?;
                }
            }
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}
