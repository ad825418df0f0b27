pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{HttpAnnotator, ProcessAnnotator, TempImage, TesseractCli};
pub use app::{build_router, AppState};
pub use config::{AppConfig, CliArgs, NerBackend, TomlConfig};
pub use core::{
    extractor::extract, orchestrator::ExtractionOrchestrator, pipeline::RequestPipeline,
};
pub use domain::model::{ContactFields, ContactRecord, ExtractionStrategy};
pub use utils::error::{CardError, Result};
