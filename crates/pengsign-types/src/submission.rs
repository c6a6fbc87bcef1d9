//! Signer-submitted field values

use serde::{Deserialize, Serialize};

/// The content a signer provided for one field.
///
/// `value` is either a data-URL-encoded raster image (hand-drawn signature)
/// or plain text (typed signature or text field). Multi-recipient documents
/// fill fields incrementally, so a field without a submission is expected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedValue {
    /// Joins to `SignatureField::id`.
    pub field_id: String,
    pub value: String,
    #[serde(default)]
    pub font: Option<SignatureFont>,
}

impl SubmittedValue {
    /// Whether the value carries a drawn-signature image rather than text.
    pub fn is_drawn_image(&self) -> bool {
        self.value.starts_with("data:image/")
    }

    /// Whether there is anything to render at all.
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}

/// Rendering style tag for typed signatures, chosen in the signing UI.
///
/// The tags name increasing levels of stylization; unknown tags fall back to
/// the default style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureFont {
    /// Plain, professional style (body sans).
    Signature,
    /// Semi-decorative cursive style.
    Signatura,
    /// Fully decorative script style.
    Signaturia,
    /// Tag the UI sends alongside canvas signatures.
    Drawn,
    #[serde(other)]
    Unknown,
}
