//! PDF sealing engine for PenginSign
//!
//! Takes a document snapshot, the values signers submitted for its fields,
//! and the recorded activity history, and produces the final signed PDF:
//! every field drawn at its converted position, plus a trailing audit-trail
//! page. The pipeline is stateless per invocation and degrades gracefully —
//! missing fonts, unrenderable fields, and audit failures lower output
//! quality instead of failing the signing flow.

pub mod assemble;
pub mod audit;
pub mod content;
pub mod coords;
pub mod error;
pub mod fonts;
pub mod parser;
pub mod pipeline;
pub mod raster;
pub mod render;

pub use assemble::embed_fields;
pub use audit::append_audit_page;
pub use coords::{viewer_to_pdf, PdfRect, VIEWER_WIDTH};
pub use error::SealError;
pub use fonts::{BuiltinFont, FontConfig, FontLibrary};
pub use parser::PdfDocument;
pub use pipeline::{synthetic_timeline, ActivityLog, DocumentSource, SealPipeline};
