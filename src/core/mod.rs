pub mod extractor;
pub mod orchestrator;
pub mod pipeline;

pub use crate::domain::model::{ContactFields, ContactRecord, ExtractionStrategy};
pub use crate::domain::ports::{ConfigProvider, OcrEngine, TextAnnotator};
pub use crate::utils::error::Result;
