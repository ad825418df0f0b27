use serde::{Deserialize, Serialize};

/// Contact fields detected on a card. `None` means "not detected".
///
/// Every key is serialized, absent ones as `null`. Deserialization accepts
/// any subset of keys and ignores unknown ones, which is what NER backends
/// emit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactFields {
    pub name: Option<String>,
    pub title: Option<String>,
    pub tel: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub web: Option<String>,
}

impl ContactFields {
    pub fn is_empty(&self) -> bool {
        self == &ContactFields::default()
    }

    pub fn detected_count(&self) -> usize {
        [
            &self.name,
            &self.title,
            &self.tel,
            &self.company,
            &self.email,
            &self.address,
            &self.web,
        ]
        .iter()
        .filter(|field| field.is_some())
        .count()
    }
}

/// Structured result for one business card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    full_text: String,
    #[serde(flatten)]
    fields: ContactFields,
}

impl ContactRecord {
    pub fn new(full_text: String, fields: ContactFields) -> Self {
        Self { full_text, fields }
    }

    /// OCR output exactly as the engine produced it.
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    pub fn fields(&self) -> &ContactFields {
        &self.fields
    }
}

/// Text produced by an OCR engine for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrOutput {
    pub text: String,
}

/// How the orchestrator turns OCR text into contact fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStrategy {
    /// Regex rules only; never fails.
    #[default]
    Heuristic,
    /// External annotator only; its failure fails the request.
    Ner,
}

impl std::str::FromStr for ExtractionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" | "heuristic-only" => Ok(ExtractionStrategy::Heuristic),
            "ner" | "ner-only" => Ok(ExtractionStrategy::Ner),
            other => Err(format!(
                "unknown extraction strategy `{}` (expected `heuristic` or `ner`)",
                other
            )),
        }
    }
}

impl std::fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionStrategy::Heuristic => write!(f, "heuristic"),
            ExtractionStrategy::Ner => write!(f, "ner"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_absent_fields_as_null() {
        let record = ContactRecord::new(
            "Jane Doe\n".to_string(),
            ContactFields {
                name: Some("Jane Doe".to_string()),
                ..Default::default()
            },
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "full_text": "Jane Doe\n",
                "name": "Jane Doe",
                "title": null,
                "tel": null,
                "company": null,
                "email": null,
                "address": null,
                "web": null
            })
        );
    }

    #[test]
    fn test_fields_accept_partial_objects() {
        let fields: ContactFields =
            serde_json::from_str(r#"{"name":"Jane Doe","confidence":0.9}"#).unwrap();
        assert_eq!(fields.name.as_deref(), Some("Jane Doe"));
        assert_eq!(fields.detected_count(), 1);
        assert!(fields.email.is_none());
    }

    #[test]
    fn test_fields_accept_explicit_nulls() {
        let fields: ContactFields =
            serde_json::from_str(r#"{"name":null,"company":"Acme"}"#).unwrap();
        assert!(fields.name.is_none());
        assert_eq!(fields.company.as_deref(), Some("Acme"));
        assert!(!fields.is_empty());
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            "heuristic".parse::<ExtractionStrategy>().unwrap(),
            ExtractionStrategy::Heuristic
        );
        assert_eq!(
            "NER-only".parse::<ExtractionStrategy>().unwrap(),
            ExtractionStrategy::Ner
        );
        assert!("merge".parse::<ExtractionStrategy>().is_err());
        assert_eq!(ExtractionStrategy::Ner.to_string(), "ner");
    }
}
