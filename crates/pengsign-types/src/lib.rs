//! Shared data model for the PenginSign sealing engine
//!
//! These types describe the inputs to the PDF sealing pipeline: the document
//! descriptor with its placed signature fields, the values signers submitted
//! for those fields, and the activity history rendered on the audit page.
//! The types are serde-compatible with the persistence layer's wire forms.

pub mod activity;
pub mod document;
pub mod submission;

pub use activity::{ActivityAction, ActivityRecord};
pub use document::{DocumentDescriptor, DocumentStatus, FieldType, Recipient, SignatureField};
pub use submission::{SignatureFont, SubmittedValue};
