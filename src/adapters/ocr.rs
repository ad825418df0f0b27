use crate::adapters::process;
use crate::domain::model::OcrOutput;
use crate::domain::ports::OcrEngine;
use crate::utils::error::{CardError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Tesseract driven through its command-line interface:
/// `tesseract <image> stdout -l <language>`.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: String,
    timeout: Duration,
}

impl TesseractCli {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    fn args(path: &Path, language: &str) -> Vec<String> {
        vec![
            path.to_string_lossy().into_owned(),
            "stdout".to_string(),
            "-l".to_string(),
            language.to_string(),
        ]
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn recognize(&self, path: &Path, language: &str) -> Result<OcrOutput> {
        let args = Self::args(path, language);
        let output = process::run_once(&self.command, &args, None, self.timeout, "ocr")
            .await
            .map_err(|e| CardError::OcrEngineFailure {
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = output.stderr.trim();
            let message = if stderr.is_empty() {
                format!("{} exited with status {}", self.command, output.exit_code())
            } else {
                stderr.to_string()
            };
            return Err(CardError::OcrEngineFailure { message });
        }

        // Taken as-is; only invalid UTF-8 is replaced.
        let text = match String::from_utf8(output.stdout) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };
        Ok(OcrOutput { text })
    }
}
