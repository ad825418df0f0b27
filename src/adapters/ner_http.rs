use crate::adapters::ner_process::parse_fields;
use crate::domain::model::ContactFields;
use crate::domain::ports::TextAnnotator;
use crate::utils::error::{CardError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Annotator backed by an NER service reachable over HTTP.
///
/// Sends `POST <endpoint>` with `{"text": ...}` and expects the same JSON
/// object shape the process annotator prints.
pub struct HttpAnnotator {
    endpoint: String,
    client: Client,
    timeout: Duration,
}

impl HttpAnnotator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
            timeout,
        })
    }
}

#[async_trait]
impl TextAnnotator for HttpAnnotator {
    async fn annotate(&self, text: &str) -> Result<ContactFields> {
        tracing::debug!("Making NER request to: {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        tracing::debug!("NER response status: {}", response.status());

        if !response.status().is_success() {
            return Err(CardError::AnnotatorHttpError {
                status: response.status().as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        parse_fields(&body)
    }
}

impl HttpAnnotator {
    fn map_transport_error(&self, err: reqwest::Error) -> CardError {
        if err.is_timeout() {
            CardError::ExternalProcessTimeout {
                timeout: self.timeout,
            }
        } else {
            CardError::HttpClient(err)
        }
    }
}
