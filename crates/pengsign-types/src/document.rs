//! Document descriptors and signature field placement

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of a document handed to the sealing pipeline.
///
/// The pipeline only reads display metadata and field placement from this;
/// the PDF bytes themselves are fetched through the `DocumentSource`
/// collaborator using `storage_key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub file_name: Option<String>,
    /// Opaque key into the object storage holding the original PDF.
    pub storage_key: String,
    #[serde(default)]
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub signed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub recipient: Option<Recipient>,
    #[serde(default)]
    pub fields: Vec<SignatureField>,
}

impl DocumentDescriptor {
    /// Short display form of the document id (last 8 characters, uppercased).
    pub fn short_id(&self) -> String {
        let tail = self.id.len().saturating_sub(8);
        self.id[tail..].to_uppercase()
    }

    /// Recipient display name, if known.
    pub fn recipient_name(&self) -> Option<&str> {
        self.recipient.as_ref().map(|r| r.name.as_str())
    }

    /// Recipient email, if known.
    pub fn recipient_email(&self) -> Option<&str> {
        self.recipient.as_ref().map(|r| r.email.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub email: String,
}

/// Lifecycle status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Draft,
    Sent,
    Viewed,
    #[default]
    Signed,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl DocumentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "Draft",
            DocumentStatus::Sent => "Sent",
            DocumentStatus::Viewed => "Viewed",
            DocumentStatus::Signed => "Signed",
            DocumentStatus::Completed => "Completed",
            DocumentStatus::Cancelled => "Cancelled",
            DocumentStatus::Unknown => "Unknown",
        }
    }
}

/// A positioned placeholder on a document page, to be filled with signer input.
///
/// Coordinates are in viewer space: the browser widget renders every page at
/// a fixed 800 px width with the origin at the top-left corner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureField {
    pub id: String,
    pub field_type: FieldType,
    /// 1-indexed page the field sits on.
    pub page_number: u32,
    pub x_position: f64,
    pub y_position: f64,
    pub width: f64,
    pub height: f64,
}

/// Kind of input a signature field accepts.
///
/// Unrecognized tags deserialize to `Unknown` and render as generic text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    Signature,
    Fullname,
    Initials,
    Title,
    Date,
    Email,
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn field_type_wire_format() {
        assert_eq!(
            serde_json::to_string(&FieldType::Fullname).unwrap(),
            "\"FULLNAME\""
        );
        assert_eq!(
            serde_json::from_str::<FieldType>("\"SIGNATURE\"").unwrap(),
            FieldType::Signature
        );
    }

    #[test]
    fn unrecognized_field_type_maps_to_unknown() {
        let parsed: FieldType = serde_json::from_str("\"CHECKBOX\"").unwrap();
        assert_eq!(parsed, FieldType::Unknown);
    }

    #[test]
    fn short_id_uses_last_eight_chars() {
        let doc = DocumentDescriptor {
            id: "clx81hw2b0001abcdwxyz".to_string(),
            name: "Contract.pdf".to_string(),
            file_name: None,
            storage_key: "k".to_string(),
            status: DocumentStatus::Signed,
            created_at: Utc::now(),
            signed_at: None,
            recipient: None,
            fields: vec![],
        };
        assert_eq!(doc.short_id(), "ABCDWXYZ");
    }

    #[test]
    fn short_id_handles_short_ids() {
        let doc = DocumentDescriptor {
            id: "ab1".to_string(),
            name: "n".to_string(),
            file_name: None,
            storage_key: "k".to_string(),
            status: DocumentStatus::default(),
            created_at: Utc::now(),
            signed_at: None,
            recipient: None,
            fields: vec![],
        };
        assert_eq!(doc.short_id(), "AB1");
    }

    #[test]
    fn status_wire_format_and_default() {
        assert_eq!(
            serde_json::to_string(&DocumentStatus::Completed).unwrap(),
            "\"COMPLETED\""
        );
        assert_eq!(
            serde_json::from_str::<DocumentStatus>("\"ARCHIVED\"").unwrap(),
            DocumentStatus::Unknown
        );
        assert_eq!(DocumentStatus::default(), DocumentStatus::Signed);
    }

    #[test]
    fn descriptor_deserializes_with_optional_fields_absent() {
        let json = r#"{
            "id": "doc-1",
            "name": "Lease.pdf",
            "storage_key": "uploads/abc",
            "created_at": "2024-01-15T10:30:00Z"
        }"#;
        let doc: DocumentDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(doc.status, DocumentStatus::Signed);
        assert!(doc.fields.is_empty());
        assert!(doc.recipient.is_none());
    }
}
