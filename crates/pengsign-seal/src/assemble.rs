//! Embedding all submitted field values into a loaded document
//!
//! Walks the document's fields in array order, resolves each to its
//! submitted value, converts coordinates per page, and dispatches to the
//! renderer. Each field runs inside its own error boundary: a field that
//! cannot be rendered is logged and skipped so documents with one malformed
//! value still produce a best-effort PDF.

use std::collections::HashMap;

use pengsign_types::{SignatureField, SubmittedValue};

use crate::coords::viewer_to_pdf;
use crate::error::SealError;
use crate::fonts::{EmbeddedBuiltins, FontLibrary};
use crate::parser::PdfDocument;
use crate::render::render_field;

/// Draw every resolvable field onto the document.
///
/// Skips (without error) fields lacking a submission and fields whose page
/// number is out of range; per-field render failures are logged and
/// isolated.
pub fn embed_fields(
    pdf: &mut PdfDocument,
    fields: &[SignatureField],
    submissions: &[SubmittedValue],
    fonts: &FontLibrary,
) -> Result<(), SealError> {
    let by_field: HashMap<&str, &SubmittedValue> = submissions
        .iter()
        .map(|s| (s.field_id.as_str(), s))
        .collect();

    let builtins = EmbeddedBuiltins::embed(pdf);
    let pages = pdf.page_ids();

    for field in fields {
        let submission = match by_field.get(field.id.as_str()) {
            Some(submission) => *submission,
            None => {
                tracing::debug!("no submitted value for field {}; skipping", field.id);
                continue;
            }
        };

        let page_id = match pages.get(&field.page_number) {
            Some(page_id) => *page_id,
            None => {
                tracing::warn!(
                    "field {} references page {} of a {}-page document; skipping",
                    field.id,
                    field.page_number,
                    pages.len()
                );
                continue;
            }
        };

        let (page_width, page_height) = match pdf.page_size(page_id) {
            Ok(size) => size,
            Err(err) => {
                tracing::warn!("cannot size page {}: {}; skipping field {}", field.page_number, err, field.id);
                continue;
            }
        };

        let rect = viewer_to_pdf(field, page_width, page_height);
        tracing::debug!(
            "field {} (page {}): viewer ({}, {}) -> pdf ({:.2}, {:.2})",
            field.id,
            field.page_number,
            field.x_position,
            field.y_position,
            rect.x,
            rect.y
        );

        if let Err(err) = render_field(pdf, page_id, field, submission, rect, fonts, &builtins) {
            tracing::warn!("field {} render failed: {}; continuing", field.id, err);
        }
    }

    Ok(())
}
