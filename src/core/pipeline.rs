use crate::adapters::upload::TempImage;
use crate::core::orchestrator::ExtractionOrchestrator;
use crate::domain::model::ContactRecord;
use crate::domain::ports::{ConfigProvider, OcrEngine, TextAnnotator};
use crate::utils::error::Result;
use std::path::Path;
use std::sync::Arc;

/// Per-request flow: OCR the uploaded image, extract fields, delete the image.
pub struct RequestPipeline<C: ConfigProvider> {
    config: C,
    ocr: Arc<dyn OcrEngine>,
    orchestrator: ExtractionOrchestrator,
}

impl<C: ConfigProvider> RequestPipeline<C> {
    pub fn new(
        config: C,
        ocr: Arc<dyn OcrEngine>,
        annotator: Option<Arc<dyn TextAnnotator>>,
    ) -> Result<Self> {
        let orchestrator = ExtractionOrchestrator::new(config.extraction_strategy(), annotator)?;
        tracing::info!(
            "Pipeline ready: OCR engine {} ({}), {} extraction",
            ocr.name(),
            config.ocr_language(),
            orchestrator.strategy()
        );
        Ok(Self {
            config,
            ocr,
            orchestrator,
        })
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// Consumes the image; it is deleted whether or not processing succeeds.
    pub async fn process(&self, image: TempImage) -> Result<ContactRecord> {
        let result = self.run(image.path()).await;
        image.cleanup().await;
        result
    }

    async fn run(&self, path: &Path) -> Result<ContactRecord> {
        tracing::info!("Processing image: {}", path.display());

        let output = self.ocr.recognize(path, self.config.ocr_language()).await?;
        tracing::debug!("OCR text: {:?}", output.text);

        self.orchestrator.build_record(output.text).await
    }
}
