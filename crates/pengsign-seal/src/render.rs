//! Drawing one field's submitted value onto its page
//!
//! Dispatches on the field type: drawn-image signatures are embedded as
//! centered image XObjects, typed signatures pick a style tier from the
//! submission's font tag, and every other field type renders as plain text.
//! The renderer is best-effort; callers wrap it in a per-field error
//! boundary so one malformed value never affects the rest of the document.

use lopdf::ObjectId;
use pengsign_types::{FieldType, SignatureField, SubmittedValue};

use crate::content::{ContentBuilder, Rgb, BLACK};
use crate::coords::PdfRect;
use crate::error::SealError;
use crate::fonts::{BuiltinFont, EmbeddedBuiltins, FontLibrary, SignatureStyle};
use crate::parser::PdfDocument;
use crate::raster::{self, SignatureImage};

/// Dark navy ink used for signature content.
pub const SIGNATURE_INK: Rgb = (0.0, 0.0, 0.8);

/// Fixed left bias applied when centering typed signatures.
const CENTER_BIAS: f64 = 20.0;

/// Fields shorter than this still render legible text.
const MIN_FONT_SIZE: f64 = 8.0;

/// Uniform scale that fits an image into a box without upscaling.
pub fn fit_scale(image_width: f64, image_height: f64, box_width: f64, box_height: f64) -> f64 {
    (box_width / image_width)
        .min(box_height / image_height)
        .min(1.0)
}

/// Draw a field's submitted value at its converted position.
///
/// Blank values draw nothing. Errors are returned for the caller's boundary
/// to log; they never indicate partial page corruption.
pub fn render_field(
    pdf: &mut PdfDocument,
    page_id: ObjectId,
    field: &SignatureField,
    submission: &SubmittedValue,
    rect: PdfRect,
    fonts: &FontLibrary,
    builtins: &EmbeddedBuiltins,
) -> Result<(), SealError> {
    if submission.is_blank() {
        tracing::debug!("field {} has a blank value; skipping", field.id);
        return Ok(());
    }

    match field.field_type {
        FieldType::Signature => {
            if submission.is_drawn_image() {
                render_drawn_signature(pdf, page_id, submission, rect, builtins)
            } else {
                render_typed_signature(pdf, page_id, submission, rect, fonts, builtins)
            }
        }
        _ => render_text_field(pdf, page_id, field.field_type, &submission.value, rect, builtins),
    }
}

/// Decode and center a hand-drawn signature image within the field box.
///
/// A payload that cannot be decoded degrades to a textual placeholder
/// rather than failing the field.
fn render_drawn_signature(
    pdf: &mut PdfDocument,
    page_id: ObjectId,
    submission: &SubmittedValue,
    rect: PdfRect,
    builtins: &EmbeddedBuiltins,
) -> Result<(), SealError> {
    match SignatureImage::from_data_url(&submission.value) {
        Ok(img) => {
            let scale = fit_scale(
                img.width() as f64,
                img.height() as f64,
                rect.width,
                rect.height,
            );
            let width = img.width() as f64 * scale;
            let height = img.height() as f64 * scale;

            let xobject_id = img.embed(pdf.doc_mut())?;
            let name = format!("DrSig{}", xobject_id.0);
            pdf.add_page_resource(page_id, "XObject", &name, xobject_id)?;

            let x = rect.x + (rect.width - width) / 2.0;
            let y = rect.y + (rect.height - height) / 2.0;
            let mut content = ContentBuilder::new();
            content.image(&name, x, y, width, height);
            pdf.append_content(page_id, content.build())
        }
        Err(err) => {
            tracing::warn!("drawn signature embed failed: {}; drawing placeholder", err);
            let size = 12.0_f64.min(rect.height * 0.4).max(MIN_FONT_SIZE);
            draw_text(
                pdf,
                page_id,
                "[Drawn signature]",
                BuiltinFont::HelveticaBold,
                size,
                rect.x,
                rect.y + rect.height * 0.3,
                SIGNATURE_INK,
                builtins,
            )
        }
    }
}

/// Typed signature in the style tier selected by the submission's font tag.
///
/// Each tier prefers its fetched font (rendered to a bitmap, since the
/// script faces cannot be expressed with built-in fonts) and falls back to
/// a built-in at a slightly larger size to approximate the flow of the
/// missing face.
fn render_typed_signature(
    pdf: &mut PdfDocument,
    page_id: ObjectId,
    submission: &SubmittedValue,
    rect: PdfRect,
    fonts: &FontLibrary,
    builtins: &EmbeddedBuiltins,
) -> Result<(), SealError> {
    let style = SignatureStyle::from_tag(submission.font);
    let h = rect.height;

    let (custom_size, fallback, fallback_size) = match style {
        SignatureStyle::Plain => (16.0_f64.min(h * 0.7), BuiltinFont::Helvetica, 16.0_f64.min(h * 0.7)),
        SignatureStyle::Cursive => (
            18.0_f64.min(h * 0.8),
            BuiltinFont::TimesRoman,
            20.0_f64.min(h * 0.85),
        ),
        SignatureStyle::Script => (
            22.0_f64.min(h * 0.9),
            BuiltinFont::TimesRoman,
            24.0_f64.min(h * 0.95),
        ),
        SignatureStyle::Bold => (0.0, BuiltinFont::HelveticaBold, 16.0_f64.min(h * 0.7)),
    };

    if let Some(font) = fonts.style_font(style) {
        let size = custom_size.max(MIN_FONT_SIZE);
        if let Some((canvas, width_pt, height_pt)) =
            raster::rasterize_text(font, &submission.value, size)
        {
            let xobject_id = raster::embed_rgba(pdf.doc_mut(), &canvas)?;
            let name = format!("TxSig{}", xobject_id.0);
            pdf.add_page_resource(page_id, "XObject", &name, xobject_id)?;

            let x = rect.x + (rect.width - width_pt) / 2.0 - CENTER_BIAS;
            let y = rect.y + size * 0.2;
            let mut content = ContentBuilder::new();
            content.image(&name, x, y, width_pt, height_pt);
            return pdf.append_content(page_id, content.build());
        }
        tracing::warn!("typed signature produced no glyphs; using built-in font");
    }

    let size = fallback_size.max(MIN_FONT_SIZE);
    let text_width = fallback.text_width(&submission.value, size);
    let x = rect.x + (rect.width - text_width) / 2.0 - CENTER_BIAS;
    let y = rect.y + size * 0.2;
    draw_text(
        pdf,
        page_id,
        &submission.value,
        fallback,
        size,
        x,
        y,
        SIGNATURE_INK,
        builtins,
    )
}

/// Plain left-aligned text for name/date/email style fields.
fn render_text_field(
    pdf: &mut PdfDocument,
    page_id: ObjectId,
    field_type: FieldType,
    value: &str,
    rect: PdfRect,
    builtins: &EmbeddedBuiltins,
) -> Result<(), SealError> {
    let size = 12.0_f64.min(rect.height * 0.6).max(MIN_FONT_SIZE);
    let font = match field_type {
        FieldType::Title | FieldType::Initials => BuiltinFont::HelveticaBold,
        _ => BuiltinFont::Helvetica,
    };
    let x = rect.x + 5.0;
    let y = rect.y + rect.height - size;
    draw_text(pdf, page_id, value, font, size, x, y, BLACK, builtins)
}

#[allow(clippy::too_many_arguments)]
fn draw_text(
    pdf: &mut PdfDocument,
    page_id: ObjectId,
    text: &str,
    font: BuiltinFont,
    size: f64,
    x: f64,
    y: f64,
    color: Rgb,
    builtins: &EmbeddedBuiltins,
) -> Result<(), SealError> {
    pdf.add_page_resource(page_id, "Font", font.resource_name(), builtins.object_id(font))?;
    let mut content = ContentBuilder::new();
    content.text(text, font, size, x, y, color);
    pdf.append_content(page_id, content.build())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: the fitted image never exceeds the field box and never
        /// grows beyond its native size.
        #[test]
        fn fitted_image_stays_in_box(
            img_w in 1.0f64..2000.0,
            img_h in 1.0f64..2000.0,
            box_w in 1.0f64..600.0,
            box_h in 1.0f64..300.0,
        ) {
            let scale = fit_scale(img_w, img_h, box_w, box_h);
            prop_assert!(scale <= 1.0);
            prop_assert!(scale > 0.0);
            prop_assert!(img_w * scale <= box_w + 1e-9);
            prop_assert!(img_h * scale <= box_h + 1e-9);
        }

        /// Property: an image already smaller than the box keeps its size.
        #[test]
        fn small_images_keep_native_size(
            img_w in 1.0f64..100.0,
            img_h in 1.0f64..100.0,
            extra in 0.0f64..500.0,
        ) {
            let scale = fit_scale(img_w, img_h, img_w + extra, img_h + extra);
            prop_assert_eq!(scale, 1.0);
        }
    }
}
