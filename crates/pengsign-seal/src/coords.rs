//! Coordinate translation between the signing viewer and PDF page space
//!
//! The browser widget renders every page at a fixed 800 px width with a
//! top-left origin; PDF pages have arbitrary dimensions and a bottom-left
//! origin. The scale factor is derived per page, so unusual page sizes
//! translate correctly.

use pengsign_types::SignatureField;

/// Fixed rendering width of the frontend PDF viewer, in pixels.
pub const VIEWER_WIDTH: f64 = 800.0;

/// A field's placement in PDF page space (bottom-left origin, page units).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Convert a field's viewer-space placement to PDF page coordinates.
///
/// All four values are scaled by `page_width / 800`, then the vertical axis
/// is flipped and offset by the scaled height so `y` addresses the bottom
/// edge of the box. Coordinates stay fractional; rounding would cost
/// placement precision.
pub fn viewer_to_pdf(field: &SignatureField, page_width: f64, page_height: f64) -> PdfRect {
    let scale = page_width / VIEWER_WIDTH;

    let width = field.width * scale;
    let height = field.height * scale;
    let x = field.x_position * scale;
    let y = page_height - (field.y_position * scale + height);

    PdfRect {
        x,
        y,
        width,
        height,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use pengsign_types::FieldType;
    use proptest::prelude::*;

    fn any_field() -> impl Strategy<Value = SignatureField> {
        (
            0.0f64..800.0,
            0.0f64..1100.0,
            1.0f64..400.0,
            1.0f64..200.0,
        )
            .prop_map(|(x, y, w, h)| SignatureField {
                id: "p".to_string(),
                field_type: FieldType::Signature,
                page_number: 1,
                x_position: x,
                y_position: y,
                width: w,
                height: h,
            })
    }

    proptest! {
        /// Property: converted y plus scaled height equals the flipped
        /// scaled y, for any page geometry.
        #[test]
        fn y_flip_round_trip(
            field in any_field(),
            page_w in 100.0f64..2000.0,
            page_h in 100.0f64..2000.0,
        ) {
            let rect = viewer_to_pdf(&field, page_w, page_h);
            let scale = page_w / VIEWER_WIDTH;
            let scaled_y = field.y_position * scale;
            prop_assert!((rect.y + rect.height - (page_h - scaled_y)).abs() < 1e-9);
        }

        /// Property: scaling is linear in the page width.
        #[test]
        fn scale_is_per_page(
            field in any_field(),
            page_h in 100.0f64..2000.0,
        ) {
            let narrow = viewer_to_pdf(&field, 400.0, page_h);
            let wide = viewer_to_pdf(&field, 800.0, page_h);
            prop_assert!((wide.x - narrow.x * 2.0).abs() < 1e-9);
            prop_assert!((wide.width - narrow.width * 2.0).abs() < 1e-9);
        }

        /// Property: the box never ends up with negative dimensions.
        #[test]
        fn dimensions_stay_positive(
            field in any_field(),
            page_w in 100.0f64..2000.0,
            page_h in 100.0f64..2000.0,
        ) {
            let rect = viewer_to_pdf(&field, page_w, page_h);
            prop_assert!(rect.width > 0.0);
            prop_assert!(rect.height > 0.0);
        }
    }
}
