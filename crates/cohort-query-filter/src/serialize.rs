//! Filter document serialization
//!
//! JSON is the only wire format the engine accepts; the trait keeps the
//! CLI and callers independent of the concrete serializer.

use std::io::Write;

use crate::model::FilterDocument;

/// Errors that can occur during serialization
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for filter document serializers
pub trait DocumentSerializer {
    /// Serialize a document to a string
    fn serialize(&self, document: &FilterDocument) -> Result<String, SerializeError>;

    /// Serialize a document to a writer
    fn serialize_to_writer<W: Write>(
        &self,
        document: &FilterDocument,
        writer: W,
    ) -> Result<(), SerializeError>;

    /// Deserialize a document from a string
    fn deserialize(&self, input: &str) -> Result<FilterDocument, SerializeError>;
}

/// JSON serializer for filter documents
#[derive(Debug, Default, Clone)]
pub struct JsonSerializer {
    /// Whether to produce pretty-printed output
    pub pretty: bool,
}

impl JsonSerializer {
    /// Create a new JSON serializer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new JSON serializer with pretty-printing enabled
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl DocumentSerializer for JsonSerializer {
    fn serialize(&self, document: &FilterDocument) -> Result<String, SerializeError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(document)?
        } else {
            serde_json::to_string(document)?
        };
        Ok(json)
    }

    fn serialize_to_writer<W: Write>(
        &self,
        document: &FilterDocument,
        mut writer: W,
    ) -> Result<(), SerializeError> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, document)?;
        } else {
            serde_json::to_writer(&mut writer, document)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn deserialize(&self, input: &str) -> Result<FilterDocument, SerializeError> {
        Ok(serde_json::from_str(input)?)
    }
}
