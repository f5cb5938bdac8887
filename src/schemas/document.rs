use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::AsRefStr;

/// Placeholder returned for any drug label field missing from a document's metadata.
pub const UNKNOWN: &str = "Unknown";

/// Drug label metadata keys written by the ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum DrugField {
    DrugName,
    Form,
    SponsorName,
    ActiveIngredient,
    MarketingStatus,
}

/// A chunk of drug label text together with its label metadata.
///
/// Two documents are the same document when their `page_content` is equal,
/// whatever their metadata says.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub page_content: String,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl Document {
    pub fn new<S: Into<String>>(page_content: S) -> Self {
        Document {
            page_content: page_content.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set a single metadata entry.
    pub fn with_field<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Read a metadata value as text, `"Unknown"` when absent or null.
    pub fn metadata_or_unknown(&self, key: &str) -> String {
        match self.metadata.get(key) {
            None | Some(Value::Null) => UNKNOWN.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn field(&self, field: DrugField) -> String {
        self.metadata_or_unknown(field.as_ref())
    }

    pub fn drug_info(&self) -> DrugInfo {
        DrugInfo {
            drug_name: self.field(DrugField::DrugName),
            form: self.field(DrugField::Form),
            sponsor_name: self.field(DrugField::SponsorName),
            active_ingredient: self.field(DrugField::ActiveIngredient),
            marketing_status: self.field(DrugField::MarketingStatus),
        }
    }
}

/// Resolved drug label fields of a document, with `"Unknown"` filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugInfo {
    pub drug_name: String,
    pub form: String,
    pub sponsor_name: String,
    pub active_ingredient: String,
    pub marketing_status: String,
}

impl fmt::Display for DrugInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) - {}",
            self.drug_name, self.active_ingredient, self.form
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_form_reads_unknown() {
        let doc = Document::new("Take one tablet daily.").with_field("drug_name", "Amoxil");
        assert_eq!(doc.field(DrugField::Form), "Unknown");
        assert_eq!(doc.field(DrugField::DrugName), "Amoxil");
    }

    #[test]
    fn test_null_and_non_string_metadata() {
        let doc = Document::new("text")
            .with_field("form", Value::Null)
            .with_field("marketing_status", 1);
        assert_eq!(doc.metadata_or_unknown("form"), "Unknown");
        assert_eq!(doc.metadata_or_unknown("marketing_status"), "1");
    }

    #[test]
    fn test_field_keys() {
        assert_eq!(DrugField::DrugName.as_ref(), "drug_name");
        assert_eq!(DrugField::ActiveIngredient.as_ref(), "active_ingredient");
        assert_eq!(DrugField::MarketingStatus.as_ref(), "marketing_status");
    }

    #[test]
    fn test_drug_info_display() {
        let doc = Document::new("label text")
            .with_field("drug_name", "Glucophage")
            .with_field("active_ingredient", "metformin")
            .with_field("form", "TABLET");
        assert_eq!(doc.drug_info().to_string(), "Glucophage (metformin) - TABLET");
        assert_eq!(doc.drug_info().sponsor_name, "Unknown");
    }

    #[test]
    fn test_metadata_defaults_when_deserialized_without_it() {
        let doc: Document = serde_json::from_str(r#"{"page_content": "abc"}"#).unwrap();
        assert!(doc.metadata.is_empty());
    }
}
