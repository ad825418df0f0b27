// Adapters layer: concrete implementations for external systems (OCR engine, NER backends, uploads).

pub mod ner_http;
pub mod ner_process;
pub mod ocr;
pub mod process;
pub mod upload;

pub use ner_http::HttpAnnotator;
pub use ner_process::ProcessAnnotator;
pub use ocr::TesseractCli;
pub use upload::TempImage;

use crate::config::{NerBackend, NerConfig};
use crate::domain::ports::TextAnnotator;
use crate::utils::error::Result;
use crate::utils::validation::validate_required_field;
use std::sync::Arc;

pub fn annotator_from_config(config: &NerConfig) -> Result<Arc<dyn TextAnnotator>> {
    match config.backend {
        NerBackend::Process => {
            tracing::info!(
                "NER backend: process `{} {}` (timeout {:?})",
                config.command,
                config.args.join(" "),
                config.timeout()
            );
            Ok(Arc::new(ProcessAnnotator::from_config(config)))
        }
        NerBackend::Http => {
            let endpoint = validate_required_field("ner.endpoint", &config.endpoint)?;
            tracing::info!("NER backend: http {} (timeout {:?})", endpoint, config.timeout());
            Ok(Arc::new(HttpAnnotator::new(endpoint.clone(), config.timeout())?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::CardError;

    #[test]
    fn test_http_backend_without_endpoint() {
        let config = NerConfig {
            backend: NerBackend::Http,
            ..Default::default()
        };
        assert!(matches!(
            annotator_from_config(&config),
            Err(CardError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_builds_both_backends() {
        assert!(annotator_from_config(&NerConfig::default()).is_ok());

        let config = NerConfig {
            backend: NerBackend::Http,
            endpoint: Some("http://localhost:9000/annotate".to_string()),
            ..Default::default()
        };
        assert!(annotator_from_config(&config).is_ok());
    }
}
