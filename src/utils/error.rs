use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardError {
    #[error("No image file uploaded")]
    NoFileUploaded,

    #[error("Uploaded file exceeds the {limit} byte limit")]
    FileTooLarge { limit: u64 },

    #[error("Multipart request error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("OCR engine failure: {message}")]
    OcrEngineFailure { message: String },

    #[error("Failed to start external process `{program}`: {source}")]
    ExternalProcessSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("External process exited with status {exit_code}")]
    ExternalProcessError { exit_code: i32 },

    #[error("External process did not finish within {timeout:?}")]
    ExternalProcessTimeout { timeout: Duration },

    #[error("NER output could not be parsed: {source}")]
    MalformedNerOutput {
        #[source]
        source: serde_json::Error,
    },

    #[error("Annotator endpoint responded with HTTP {status}")]
    AnnotatorHttpError { status: u16 },

    #[error("HTTP request failed: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Entity extraction failed: {cause}")]
    ExtractionFailed {
        #[source]
        cause: Box<CardError>,
    },

    #[error("Could not delete temporary file {}: {source}", .path.display())]
    CleanupFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value `{value}` for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Client,
    Ocr,
    Extraction,
    Cleanup,
    System,
    Configuration,
}

impl CardError {
    pub fn extraction_failed(cause: CardError) -> Self {
        CardError::ExtractionFailed {
            cause: Box::new(cause),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CardError::NoFileUploaded | CardError::FileTooLarge { .. } | CardError::Multipart(_) => {
                ErrorCategory::Client
            }
            CardError::OcrEngineFailure { .. } => ErrorCategory::Ocr,
            CardError::ExternalProcessSpawn { .. }
            | CardError::ExternalProcessError { .. }
            | CardError::ExternalProcessTimeout { .. }
            | CardError::MalformedNerOutput { .. }
            | CardError::AnnotatorHttpError { .. }
            | CardError::HttpClient(_)
            | CardError::ExtractionFailed { .. } => ErrorCategory::Extraction,
            CardError::CleanupFailure { .. } => ErrorCategory::Cleanup,
            CardError::IoError(_) => ErrorCategory::System,
            CardError::ConfigError { .. }
            | CardError::ConfigValidationError { .. }
            | CardError::InvalidConfigValueError { .. }
            | CardError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    /// HTTP status used when this error ends a request.
    pub fn status_code(&self) -> u16 {
        match self {
            CardError::NoFileUploaded => 400,
            CardError::FileTooLarge { .. } => 413,
            // 413 when the body limit was hit, 400 for a malformed stream.
            CardError::Multipart(e) => e.status().as_u16(),
            _ => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.category() == ErrorCategory::Client
    }

    /// Walks the `source()` chain, outermost first.
    pub fn source_chain(&self) -> String {
        let mut lines = vec![self.to_string()];
        let mut current = std::error::Error::source(self);
        while let Some(err) = current {
            lines.push(format!("caused by: {}", err));
            current = err.source();
        }
        lines.join("\n")
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Client => self.to_string(),
            ErrorCategory::Ocr => format!("The image could not be read: {}", self),
            ErrorCategory::Extraction => format!("Contact fields could not be extracted: {}", self),
            ErrorCategory::Cleanup => format!("Temporary file was left behind: {}", self),
            ErrorCategory::System => format!("Internal error: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, CardError>;
