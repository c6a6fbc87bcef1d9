use thiserror::Error;

/// Fatal failures of the sealing pipeline.
///
/// Only conditions that make the output PDF impossible surface as errors;
/// degraded paths (missing fonts, unrenderable fields, audit composition
/// failures) are logged and recovered internally.
#[derive(Error, Debug)]
pub enum SealError {
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    #[error("failed to save PDF: {0}")]
    Save(String),

    #[error("malformed page tree: {0}")]
    PageTree(String),

    #[error("source document unavailable: {0}")]
    Source(String),

    #[error("activity history unavailable: {0}")]
    History(String),

    #[error("invalid signature image: {0}")]
    SignatureImage(String),
}
