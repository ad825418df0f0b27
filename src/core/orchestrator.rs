use crate::core::extractor;
use crate::domain::model::{ContactRecord, ExtractionStrategy};
use crate::domain::ports::TextAnnotator;
use crate::utils::error::{CardError, Result};
use std::sync::Arc;

enum Mode {
    Heuristic,
    Ner(Arc<dyn TextAnnotator>),
}

/// Turns OCR text into a [`ContactRecord`] using one fixed strategy.
///
/// There is no fallback between strategies: in `ner` mode an annotator
/// failure fails the whole record.
pub struct ExtractionOrchestrator {
    mode: Mode,
}

impl ExtractionOrchestrator {
    pub fn heuristic() -> Self {
        Self {
            mode: Mode::Heuristic,
        }
    }

    pub fn ner(annotator: Arc<dyn TextAnnotator>) -> Self {
        Self {
            mode: Mode::Ner(annotator),
        }
    }

    pub fn new(strategy: ExtractionStrategy, annotator: Option<Arc<dyn TextAnnotator>>) -> Result<Self> {
        match (strategy, annotator) {
            (ExtractionStrategy::Heuristic, _) => Ok(Self::heuristic()),
            (ExtractionStrategy::Ner, Some(annotator)) => Ok(Self::ner(annotator)),
            (ExtractionStrategy::Ner, None) => Err(CardError::ConfigError {
                message: "the `ner` extraction strategy needs an annotator".to_string(),
            }),
        }
    }

    pub fn strategy(&self) -> ExtractionStrategy {
        match self.mode {
            Mode::Heuristic => ExtractionStrategy::Heuristic,
            Mode::Ner(_) => ExtractionStrategy::Ner,
        }
    }

    pub async fn build_record(&self, ocr_text: String) -> Result<ContactRecord> {
        let fields = match &self.mode {
            Mode::Heuristic => extractor::extract(&ocr_text),
            Mode::Ner(annotator) => annotator.annotate(&ocr_text).await.map_err(|e| {
                tracing::error!("NER extraction failed: {}", e);
                CardError::extraction_failed(e)
            })?,
        };

        if fields.is_empty() {
            tracing::info!("No contact fields detected ({} strategy)", self.strategy());
        }
        tracing::debug!(
            "Built record with {} detected fields ({} strategy)",
            fields.detected_count(),
            self.strategy()
        );
        Ok(ContactRecord::new(ocr_text, fields))
    }
}
