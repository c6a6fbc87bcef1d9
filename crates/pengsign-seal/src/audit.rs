//! Audit-trail page composition
//!
//! Appends one trailing page summarizing the document's lifecycle: an info
//! block, the chronological activity timeline with per-action markers, a
//! signature inventory, and a verification checklist. Composition is fully
//! best-effort — any failure returns the input bytes untouched, because a
//! missing audit page must never block document delivery.

use chrono::{DateTime, Utc};
use pengsign_types::{ActivityAction, ActivityRecord, DocumentDescriptor, SignatureFont, SubmittedValue};
use sha2::{Digest, Sha256};

use crate::content::{ContentBuilder, Rgb, WHITE};
use crate::error::SealError;
use crate::fonts::{BuiltinFont, EmbeddedBuiltins};
use crate::parser::PdfDocument;

const MARGIN: f64 = 50.0;

/// The audit page is at least this tall regardless of the document's page
/// size, so the fixed sections always fit.
const MIN_PAGE_HEIGHT: f64 = 800.0;

const PRIMARY_BLUE: Rgb = (0.18, 0.36, 0.61);
const BAND_BORDER: Rgb = (0.12, 0.25, 0.45);
const DARK_GRAY: Rgb = (0.2, 0.2, 0.2);
const MEDIUM_GRAY: Rgb = (0.5, 0.5, 0.5);
const LIGHT_GRAY: Rgb = (0.88, 0.88, 0.88);
const FAINT_GRAY: Rgb = (0.6, 0.6, 0.6);
const PANEL_FILL: Rgb = (0.97, 0.97, 0.97);
const SUCCESS_GREEN: Rgb = (0.2, 0.6, 0.2);
const SENT_BLUE: Rgb = (0.2, 0.5, 0.8);
const VIEWED_AMBER: Rgb = (0.9, 0.6, 0.1);
const DOWNLOAD_GREEN: Rgb = (0.4, 0.7, 0.4);
const CANCEL_RED: Rgb = (0.8, 0.2, 0.2);

/// Append the audit-trail page, returning the grown document.
///
/// On any composition failure — or a result that did not actually grow,
/// which would indicate a silent mutation bug — the original bytes come
/// back unchanged.
pub fn append_audit_page(
    pdf_bytes: &[u8],
    document: &DocumentDescriptor,
    activities: &[ActivityRecord],
    submissions: &[SubmittedValue],
) -> Vec<u8> {
    match compose(pdf_bytes, document, activities, submissions) {
        Ok(bytes) => {
            if bytes.len() <= pdf_bytes.len() {
                tracing::warn!(
                    "audit page did not grow document {} ({} -> {} bytes); delivering original",
                    document.id,
                    pdf_bytes.len(),
                    bytes.len()
                );
                return pdf_bytes.to_vec();
            }
            tracing::debug!(
                "audit page added to document {} (+{} bytes)",
                document.id,
                bytes.len() - pdf_bytes.len()
            );
            bytes
        }
        Err(err) => {
            tracing::error!(
                "audit page composition failed for document {}: {}; delivering unaudited document",
                document.id,
                err
            );
            pdf_bytes.to_vec()
        }
    }
}

fn compose(
    pdf_bytes: &[u8],
    document: &DocumentDescriptor,
    activities: &[ActivityRecord],
    submissions: &[SubmittedValue],
) -> Result<Vec<u8>, SealError> {
    let mut pdf = PdfDocument::from_bytes(pdf_bytes)?;
    let page_count = pdf.page_count();

    let first_page = pdf
        .page_ids()
        .into_values()
        .next()
        .ok_or_else(|| SealError::PageTree("document has no pages".to_string()))?;
    let (original_width, original_height) = pdf.page_size(first_page)?;
    let width = original_width;
    let height = original_height.max(MIN_PAGE_HEIGHT);

    let builtins = EmbeddedBuiltins::embed(&mut pdf);
    let fingerprint = hex::encode(Sha256::digest(pdf_bytes));
    let content = compose_content(width, height, document, activities, submissions, &fingerprint);
    pdf.append_page(width, height, content, &builtins)?;

    if pdf.page_count() != page_count + 1 {
        return Err(SealError::PageTree(
            "page count did not increase".to_string(),
        ));
    }

    pdf.save_to_bytes()
}

/// Draw the full audit page into one content stream.
fn compose_content(
    width: f64,
    height: f64,
    document: &DocumentDescriptor,
    activities: &[ActivityRecord],
    submissions: &[SubmittedValue],
    fingerprint: &str,
) -> Vec<u8> {
    let mut c = ContentBuilder::new();

    // Title band
    c.panel(
        20.0,
        height - 100.0,
        width - 40.0,
        80.0,
        PRIMARY_BLUE,
        BAND_BORDER,
        1.0,
    );
    c.text(
        "AUDIT TRAIL",
        BuiltinFont::HelveticaBold,
        32.0,
        50.0,
        height - 70.0,
        WHITE,
    );
    c.text(
        &format!("Document: {}", document.name),
        BuiltinFont::HelveticaBold,
        16.0,
        50.0,
        height - 140.0,
        DARK_GRAY,
    );
    let dated = document.signed_at.unwrap_or(document.created_at);
    c.text(
        &format!("Date: {}", timestamp(dated)),
        BuiltinFont::HelveticaBold,
        14.0,
        50.0,
        height - 170.0,
        DARK_GRAY,
    );

    let mut y = height - 200.0;

    // Document information panel
    c.panel(
        MARGIN,
        y - 120.0,
        width - MARGIN * 2.0,
        110.0,
        PANEL_FILL,
        LIGHT_GRAY,
        1.0,
    );
    c.text(
        "Document Information",
        BuiltinFont::HelveticaBold,
        14.0,
        MARGIN + 15.0,
        y,
        PRIMARY_BLUE,
    );
    let rows = [
        ("Created:", timestamp(document.created_at)),
        ("Document ID:", document.short_id()),
        ("Status:", document.status.label().to_string()),
        (
            "By:",
            document.recipient_name().unwrap_or("Unknown").to_string(),
        ),
    ];
    for (i, (label, value)) in rows.iter().enumerate() {
        let row_y = y - 45.0 - i as f64 * 18.0;
        c.text(label, BuiltinFont::HelveticaBold, 10.0, MARGIN + 15.0, row_y, DARK_GRAY);
        c.text(value, BuiltinFont::Helvetica, 10.0, MARGIN + 100.0, row_y, DARK_GRAY);
    }
    y -= 150.0;

    // Activity timeline, in input order (pre-sorted by the caller)
    c.text(
        "Document History",
        BuiltinFont::HelveticaBold,
        16.0,
        MARGIN,
        y,
        PRIMARY_BLUE,
    );
    y -= 30.0;
    for (i, record) in activities.iter().enumerate() {
        let entry_y = y - i as f64 * 40.0;
        let (label, marker, detail) = action_style(record, document);

        c.filled_circle(MARGIN + 10.0, entry_y + 8.0, 5.0, marker);
        if i < activities.len() - 1 {
            c.line(
                MARGIN + 10.0,
                entry_y - 15.0,
                MARGIN + 10.0,
                entry_y - 30.0,
                2.0,
                LIGHT_GRAY,
            );
        }
        c.text(&label, BuiltinFont::HelveticaBold, 11.0, MARGIN + 25.0, entry_y + 10.0, DARK_GRAY);
        c.text(
            &timestamp(record.created_at),
            BuiltinFont::Helvetica,
            9.0,
            MARGIN + 25.0,
            entry_y - 5.0,
            MEDIUM_GRAY,
        );
        if let Some(detail) = detail {
            c.text(&detail, BuiltinFont::Helvetica, 8.0, MARGIN + 25.0, entry_y - 18.0, FAINT_GRAY);
        }
    }
    y -= activities.len() as f64 * 40.0 + 40.0;

    // Signature inventory
    if !submissions.is_empty() {
        c.text(
            "Signature Analysis",
            BuiltinFont::HelveticaBold,
            16.0,
            MARGIN,
            y,
            PRIMARY_BLUE,
        );
        y -= 25.0;
        for (i, submission) in submissions.iter().enumerate() {
            let row_y = y - i as f64 * 30.0;
            let kind = if submission.is_drawn_image() {
                "Drawn signature"
            } else {
                "Typed signature"
            };
            c.text(
                &format!("Signature {}: {}", i + 1, kind),
                BuiltinFont::HelveticaBold,
                11.0,
                MARGIN + 10.0,
                row_y,
                DARK_GRAY,
            );
            if submission.is_drawn_image() {
                c.text(
                    "Type: Hand-drawn signature",
                    BuiltinFont::Helvetica,
                    9.0,
                    MARGIN + 20.0,
                    row_y - 15.0,
                    MEDIUM_GRAY,
                );
                c.text(
                    "Format: Digital image (Base64 encoded)",
                    BuiltinFont::Helvetica,
                    9.0,
                    MARGIN + 20.0,
                    row_y - 25.0,
                    MEDIUM_GRAY,
                );
            } else {
                c.text(
                    &format!("Content: \"{}\"", submission.value),
                    BuiltinFont::Helvetica,
                    9.0,
                    MARGIN + 20.0,
                    row_y - 15.0,
                    MEDIUM_GRAY,
                );
                if let Some(font) = submission.font {
                    c.text(
                        &format!("Font: {}", font_tag(font)),
                        BuiltinFont::Helvetica,
                        9.0,
                        MARGIN + 20.0,
                        row_y - 25.0,
                        MEDIUM_GRAY,
                    );
                }
            }
        }
        y -= submissions.len() as f64 * 30.0 + 30.0;
    }

    // Verification checklist
    c.text(
        "Security & Verification",
        BuiltinFont::HelveticaBold,
        16.0,
        MARGIN,
        y,
        PRIMARY_BLUE,
    );
    y -= 25.0;
    let items = [
        "Document integrity verified",
        "Timestamp server: PenginSign Internal",
        "Email notifications sent",
        "Secure PDF generation completed",
    ];
    for (i, item) in items.iter().enumerate() {
        let row_y = y - i as f64 * 20.0;
        c.filled_circle(MARGIN + 10.0, row_y + 4.0, 3.0, SUCCESS_GREEN);
        c.text(item, BuiltinFont::Helvetica, 10.0, MARGIN + 25.0, row_y, DARK_GRAY);
        c.text(
            "VERIFIED",
            BuiltinFont::HelveticaBold,
            9.0,
            width - MARGIN - 60.0,
            row_y,
            SUCCESS_GREEN,
        );
    }
    y -= items.len() as f64 * 20.0 + 15.0;
    c.text(
        &format!("Content fingerprint (SHA-256): {}", &fingerprint[..16]),
        BuiltinFont::Helvetica,
        8.0,
        MARGIN + 10.0,
        y,
        FAINT_GRAY,
    );
    y -= 25.0;

    // Footer
    c.line(MARGIN, y, width - MARGIN, y, 1.0, LIGHT_GRAY);
    c.text(
        "Powered by PenginSign",
        BuiltinFont::Helvetica,
        10.0,
        MARGIN,
        y - 20.0,
        MEDIUM_GRAY,
    );
    let generated = format!("Generated: {}", timestamp(Utc::now()));
    let generated_x = width - MARGIN - BuiltinFont::Helvetica.text_width(&generated, 10.0);
    c.text(
        &generated,
        BuiltinFont::Helvetica,
        10.0,
        generated_x,
        y - 20.0,
        MEDIUM_GRAY,
    );

    c.build()
}

/// Human label, marker color, and optional detail line for one activity.
fn action_style(
    record: &ActivityRecord,
    document: &DocumentDescriptor,
) -> (String, Rgb, Option<String>) {
    match record.action {
        ActivityAction::Created => (
            "Document created".to_string(),
            PRIMARY_BLUE,
            record
                .detail_str("createdBy")
                .map(|v| format!("Created by {}", v))
                .or_else(|| record.detail_str("fileName").map(|v| format!("File: {}", v))),
        ),
        ActivityAction::Sent => {
            let recipient = record
                .detail_str("recipientEmail")
                .or_else(|| document.recipient_email())
                .unwrap_or("recipient")
                .to_string();
            let detail = record
                .detail_str("sentBy")
                .map(|v| format!("Sent by {}", v))
                .or_else(|| {
                    record
                        .detail_u64("fieldsCount")
                        .map(|n| format!("{} signature field(s)", n))
                });
            (format!("Document sent to {}", recipient), SENT_BLUE, detail)
        }
        ActivityAction::Viewed => {
            let detail = record
                .detail_str("device")
                .map(|v| format!("Viewed using {}", v))
                .or_else(|| {
                    Some(format!(
                        "Viewed by {}",
                        record
                            .detail_str("viewedBy")
                            .or_else(|| document.recipient_email())
                            .unwrap_or("recipient")
                    ))
                });
            (
                "Document viewed by recipient".to_string(),
                VIEWED_AMBER,
                detail,
            )
        }
        ActivityAction::Signed => (
            "Document signed by recipient".to_string(),
            SUCCESS_GREEN,
            record
                .detail_u64("signatureCount")
                .map(|n| format!("{} signature(s) applied", n))
                .or_else(|| {
                    record
                        .detail_u64("fieldsCount")
                        .map(|n| format!("{} field(s) signed", n))
                }),
        ),
        ActivityAction::Completed => (
            "Document signing completed".to_string(),
            SUCCESS_GREEN,
            record
                .detail_str("finalStatus")
                .map(str::to_string)
                .or_else(|| {
                    (record.detail_str("action") == Some("signing_process_completed"))
                        .then(|| "All signatures applied successfully".to_string())
                }),
        ),
        ActivityAction::Downloaded => (
            "Signed PDF downloaded".to_string(),
            DOWNLOAD_GREEN,
            record
                .detail_str("downloadedBy")
                .map(|v| format!("Downloaded by {}", v)),
        ),
        ActivityAction::Cancelled => (
            "Document cancelled".to_string(),
            CANCEL_RED,
            record
                .detail_str("reason")
                .map(|v| format!("Reason: {}", v)),
        ),
        ActivityAction::Unknown => ("Document updated".to_string(), MEDIUM_GRAY, None),
    }
}

fn font_tag(font: SignatureFont) -> &'static str {
    match font {
        SignatureFont::Signature => "signature",
        SignatureFont::Signatura => "signatura",
        SignatureFont::Signaturia => "signaturia",
        SignatureFont::Drawn => "drawn",
        SignatureFont::Unknown => "custom",
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%m/%d/%Y %H:%M").to_string()
}
