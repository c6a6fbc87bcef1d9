//! PDF content stream construction
//!
//! Drawing is done with raw PDF operators collected into a content stream
//! that gets appended to a page. Only the handful of operators the sealing
//! engine needs are covered: filled/bordered rectangles, lines, circles,
//! text runs in the built-in fonts, and image XObject placement.

use crate::fonts::BuiltinFont;

/// RGB color with components in `0.0..=1.0`.
pub type Rgb = (f64, f64, f64);

pub const BLACK: Rgb = (0.0, 0.0, 0.0);
pub const WHITE: Rgb = (1.0, 1.0, 1.0);

/// Circle approximation constant for cubic Bezier arcs.
const BEZIER_K: f64 = 0.552_284_749_831;

/// Escape special characters for PDF string literals.
///
/// Non-ASCII input is replaced with `?` since the built-in fonts are drawn
/// with a single-byte encoding.
pub fn escape_pdf_string(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '(' => "\\(".to_string(),
            ')' => "\\)".to_string(),
            '\\' => "\\\\".to_string(),
            _ if c.is_ascii() => c.to_string(),
            _ => "?".to_string(),
        })
        .collect()
}

/// Accumulates drawing operators for one content stream.
#[derive(Debug, Default)]
pub struct ContentBuilder {
    ops: String,
}

impl ContentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn filled_rect(&mut self, x: f64, y: f64, width: f64, height: f64, fill: Rgb) -> &mut Self {
        self.ops.push_str(&format!(
            "q\n{} {} {} rg\n{:.2} {:.2} {:.2} {:.2} re f\nQ\n",
            fill.0, fill.1, fill.2, x, y, width, height
        ));
        self
    }

    /// Filled rectangle with a stroked border, the audit page's panel shape.
    #[allow(clippy::too_many_arguments)]
    pub fn panel(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Rgb,
        border: Rgb,
        border_width: f64,
    ) -> &mut Self {
        self.ops.push_str(&format!(
            "q\n{} {} {} rg\n{:.2} {:.2} {:.2} {:.2} re f\n{} {} {} RG\n{:.2} w\n{:.2} {:.2} {:.2} {:.2} re S\nQ\n",
            fill.0, fill.1, fill.2, x, y, width, height,
            border.0, border.1, border.2, border_width, x, y, width, height
        ));
        self
    }

    pub fn line(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        color: Rgb,
    ) -> &mut Self {
        self.ops.push_str(&format!(
            "q\n{} {} {} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
            color.0, color.1, color.2, width, x1, y1, x2, y2
        ));
        self
    }

    /// Filled circle built from four cubic Bezier arcs.
    pub fn filled_circle(&mut self, cx: f64, cy: f64, radius: f64, fill: Rgb) -> &mut Self {
        let r = radius;
        let k = BEZIER_K * r;
        self.ops.push_str(&format!(
            "q\n{} {} {} rg\n{:.2} {:.2} m\n\
             {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n\
             {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n\
             {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n\
             {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\nf\nQ\n",
            fill.0,
            fill.1,
            fill.2,
            cx + r,
            cy,
            cx + r,
            cy + k,
            cx + k,
            cy + r,
            cx,
            cy + r,
            cx - k,
            cy + r,
            cx - r,
            cy + k,
            cx - r,
            cy,
            cx - r,
            cy - k,
            cx - k,
            cy - r,
            cx,
            cy - r,
            cx + k,
            cy - r,
            cx + r,
            cy - k,
            cx + r,
            cy,
        ));
        self
    }

    /// Single text run in one of the built-in fonts.
    pub fn text(
        &mut self,
        text: &str,
        font: BuiltinFont,
        size: f64,
        x: f64,
        y: f64,
        color: Rgb,
    ) -> &mut Self {
        self.ops.push_str(&format!(
            "q\nBT\n/{} {:.2} Tf\n{} {} {} rg\n{:.2} {:.2} Td\n({}) Tj\nET\nQ\n",
            font.resource_name(),
            size,
            color.0,
            color.1,
            color.2,
            x,
            y,
            escape_pdf_string(text)
        ));
        self
    }

    /// Place a previously registered image XObject.
    pub fn image(&mut self, name: &str, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.ops.push_str(&format!(
            "q\n{:.2} 0 0 {:.2} {:.2} {:.2} cm\n/{} Do\nQ\n",
            width, height, x, y, name
        ));
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.ops.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn escape_pdf_string_basic() {
        assert_eq!(escape_pdf_string("Hello"), "Hello");
        assert_eq!(escape_pdf_string("(test)"), "\\(test\\)");
        assert_eq!(escape_pdf_string("back\\slash"), "back\\\\slash");
        assert_eq!(escape_pdf_string("café"), "caf?");
    }

    #[test]
    fn text_run_uses_font_resource_and_escapes() {
        let mut content = ContentBuilder::new();
        content.text("a (b)", BuiltinFont::Helvetica, 12.0, 10.0, 20.0, BLACK);
        let ops = String::from_utf8(content.build()).unwrap();
        assert!(ops.contains("/F1 12.00 Tf"));
        assert!(ops.contains("(a \\(b\\)) Tj"));
    }

    #[test]
    fn image_op_scales_via_matrix() {
        let mut content = ContentBuilder::new();
        content.image("Im7", 5.0, 6.0, 100.0, 40.0);
        let ops = String::from_utf8(content.build()).unwrap();
        assert_eq!(ops, "q\n100.00 0 0 40.00 5.00 6.00 cm\n/Im7 Do\nQ\n");
    }

    #[test]
    fn circle_is_closed_and_filled() {
        let mut content = ContentBuilder::new();
        content.filled_circle(50.0, 50.0, 5.0, (0.2, 0.6, 0.2));
        let ops = String::from_utf8(content.build()).unwrap();
        assert_eq!(ops.matches(" c\n").count(), 4);
        assert!(ops.contains("f\nQ\n"));
    }

    #[test]
    fn builder_accumulates_in_order() {
        let mut content = ContentBuilder::new();
        content
            .filled_rect(0.0, 0.0, 10.0, 10.0, WHITE)
            .line(0.0, 0.0, 5.0, 5.0, 1.0, BLACK);
        let ops = String::from_utf8(content.build()).unwrap();
        let rect_at = ops.find("re f").unwrap();
        let line_at = ops.find(" l\nS").unwrap();
        assert!(rect_at < line_at);
    }
}
