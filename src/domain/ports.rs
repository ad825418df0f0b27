use crate::domain::model::{ContactFields, ExtractionStrategy, OcrOutput};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

pub trait ConfigProvider: Send + Sync {
    fn upload_dir(&self) -> &Path;
    fn max_file_size_bytes(&self) -> u64;
    fn ocr_language(&self) -> &str;
    fn extraction_strategy(&self) -> ExtractionStrategy;
    fn development(&self) -> bool;
}

/// Named-entity recognition capability. One call per OCR request.
#[async_trait]
pub trait TextAnnotator: Send + Sync {
    async fn annotate(&self, text: &str) -> Result<ContactFields>;
}

#[async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &'static str;

    async fn recognize(&self, path: &Path, language: &str) -> Result<OcrOutput>;
}
