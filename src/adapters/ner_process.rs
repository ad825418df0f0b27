use crate::adapters::process;
use crate::config::NerConfig;
use crate::domain::model::ContactFields;
use crate::domain::ports::TextAnnotator;
use crate::utils::error::{CardError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Runs an external NER program once per call.
///
/// The program receives the OCR text on stdin and must print one JSON
/// object with any of `name`, `title`, `tel`, `company`, `email`,
/// `address`, `web` before exiting with status 0.
#[derive(Debug, Clone)]
pub struct ProcessAnnotator {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ProcessAnnotator {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &NerConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone(), config.timeout())
    }
}

#[async_trait]
impl TextAnnotator for ProcessAnnotator {
    async fn annotate(&self, text: &str) -> Result<ContactFields> {
        tracing::debug!("Sending {} bytes to NER process `{}`", text.len(), self.program);

        let output =
            process::run_once(&self.program, &self.args, Some(text.as_bytes()), self.timeout, "ner")
                .await?;

        if !output.status.success() {
            let exit_code = output.exit_code();
            tracing::error!(
                "NER process exited with code {}: {}",
                exit_code,
                output.stderr.trim()
            );
            return Err(CardError::ExternalProcessError { exit_code });
        }

        let fields = parse_fields(&output.stdout)?;
        tracing::debug!("NER process detected {} fields", fields.detected_count());
        Ok(fields)
    }
}

/// Parses an annotator response body into contact fields.
///
/// Only a JSON object is accepted. Arrays are refused even though the derived
/// `Deserialize` would map them onto the fields by position.
pub(crate) fn parse_fields(body: &[u8]) -> Result<ContactFields> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|source| CardError::MalformedNerOutput { source })?;
    if !value.is_object() {
        return Err(CardError::MalformedNerOutput {
            source: serde::de::Error::custom(format!(
                "expected a JSON object, found {}",
                json_kind(&value)
            )),
        });
    }
    serde_json::from_value(value).map_err(|source| CardError::MalformedNerOutput { source })
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
