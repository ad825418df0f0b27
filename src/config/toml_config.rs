use crate::config::{AppConfig, NerBackend};
use crate::domain::model::ExtractionStrategy;
use crate::utils::error::{CardError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk service configuration. Every key is optional; missing keys keep
/// the built-in defaults of [`AppConfig`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub server: Option<ServerSection>,
    pub upload: Option<UploadSection>,
    pub ocr: Option<OcrSection>,
    pub extraction: Option<ExtractionSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub development: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadSection {
    pub dir: Option<PathBuf>,
    pub max_file_size_bytes: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrSection {
    pub language: Option<String>,
    pub command: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionSection {
    pub strategy: Option<ExtractionStrategy>,
    pub ner: Option<NerSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NerSection {
    pub backend: Option<NerBackend>,
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CardError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| CardError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${NER_ENDPOINT})
    fn substitute_env_vars(content: &str) -> String {
        use once_cell::sync::Lazy;
        use regex::Regex;
        static VAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

        VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// Layers the keys present in this file over `config`.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(server) = &self.server {
            if let Some(host) = &server.host {
                config.host = host.clone();
            }
            if let Some(port) = server.port {
                config.port = port;
            }
            if let Some(development) = server.development {
                config.development = development;
            }
        }

        if let Some(upload) = &self.upload {
            if let Some(dir) = &upload.dir {
                config.upload_dir = dir.clone();
            }
            if let Some(max) = upload.max_file_size_bytes {
                config.max_file_size_bytes = max;
            }
        }

        if let Some(ocr) = &self.ocr {
            if let Some(language) = &ocr.language {
                config.ocr_language = language.clone();
            }
            if let Some(command) = &ocr.command {
                config.ocr_command = command.clone();
            }
            if let Some(timeout) = ocr.timeout_seconds {
                config.ocr_timeout_secs = timeout;
            }
        }

        if let Some(extraction) = &self.extraction {
            if let Some(strategy) = extraction.strategy {
                config.extraction_strategy = strategy;
            }
            if let Some(ner) = &extraction.ner {
                if let Some(backend) = ner.backend {
                    config.ner.backend = backend;
                }
                if let Some(command) = &ner.command {
                    config.ner.command = command.clone();
                }
                if let Some(args) = &ner.args {
                    config.ner.args = args.clone();
                }
                if let Some(endpoint) = &ner.endpoint {
                    config.ner.endpoint = Some(endpoint.clone());
                }
                if let Some(timeout) = ner.timeout_seconds {
                    config.ner.timeout_secs = timeout;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::Validate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8080
development = true

[upload]
dir = "/var/tmp/cards"
max_file_size_bytes = 2048

[ocr]
language = "eng"
timeout_seconds = 30

[extraction]
strategy = "ner"

[extraction.ner]
backend = "process"
command = "python3"
args = ["ner.py", "--model", "en_core_web_sm"]
timeout_seconds = 5
"#;

        let file_config = TomlConfig::from_toml_str(toml_content).unwrap();
        let mut config = AppConfig::default();
        file_config.apply_to(&mut config);

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(config.development);
        assert_eq!(config.upload_dir, PathBuf::from("/var/tmp/cards"));
        assert_eq!(config.max_file_size_bytes, 2048);
        assert_eq!(config.ocr_timeout_secs, 30);
        assert_eq!(config.extraction_strategy, ExtractionStrategy::Ner);
        assert_eq!(config.ner.args, vec!["ner.py", "--model", "en_core_web_sm"]);
        assert_eq!(config.ner.timeout_secs, 5);
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        let file_config = TomlConfig::from_toml_str("").unwrap();
        let mut config = AppConfig::default();
        file_config.apply_to(&mut config);

        assert_eq!(config.port, 3001);
        assert_eq!(config.max_file_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.ocr_language, "eng");
        assert_eq!(config.extraction_strategy, ExtractionStrategy::Heuristic);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CARD_OCR_TEST_NER_ENDPOINT", "http://ner.internal:9000/annotate");

        let toml_content = r#"
[extraction]
strategy = "ner"

[extraction.ner]
backend = "http"
endpoint = "${CARD_OCR_TEST_NER_ENDPOINT}"
"#;

        let file_config = TomlConfig::from_toml_str(toml_content).unwrap();
        let mut config = AppConfig::default();
        file_config.apply_to(&mut config);

        assert_eq!(
            config.ner.endpoint.as_deref(),
            Some("http://ner.internal:9000/annotate")
        );
        assert!(config.validate().is_ok());

        std::env::remove_var("CARD_OCR_TEST_NER_ENDPOINT");
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let toml_content = r#"
[extraction]
strategy = "merge"
"#;
        assert!(matches!(
            TomlConfig::from_toml_str(toml_content),
            Err(CardError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[upload]
max_file_size_bytes = 0
"#;
        let file_config = TomlConfig::from_toml_str(toml_content).unwrap();
        let mut config = AppConfig::default();
        file_config.apply_to(&mut config);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nport = 4000\n")
            .unwrap();

        let file_config = TomlConfig::from_file(temp_file.path()).unwrap();
        let mut config = AppConfig::default();
        file_config.apply_to(&mut config);
        assert_eq!(config.port, 4000);
    }
}
