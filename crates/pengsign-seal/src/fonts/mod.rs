//! Font resources for field rendering and the audit page
//!
//! Two tiers of fonts are involved. The PDF built-ins (Helvetica,
//! Helvetica-Bold, Times-Roman) are always available and get embedded into
//! every output document as Type1 resources; their AFM width tables live in
//! [`metrics`] so text can be measured without the font program. On top of
//! that, up to three Google font programs (a body sans plus two
//! script-style faces for typed signatures) are fetched at startup by
//! [`loader`]; a slot that cannot be fetched stays empty and rendering
//! degrades to the built-ins.

pub mod loader;
pub mod metrics;

pub use loader::FontConfig;

use lopdf::{Dictionary, Object, ObjectId};
use pengsign_types::SignatureFont;
use rusttype::Font;

use crate::parser::PdfDocument;

/// The three PDF base-14 fonts the engine relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
    TimesRoman,
}

impl BuiltinFont {
    pub const ALL: [BuiltinFont; 3] = [
        BuiltinFont::Helvetica,
        BuiltinFont::HelveticaBold,
        BuiltinFont::TimesRoman,
    ];

    /// PostScript name used as the font's `BaseFont` entry.
    pub fn base_font(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
            BuiltinFont::TimesRoman => "Times-Roman",
        }
    }

    /// Resource name the content streams reference the font under.
    pub fn resource_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "F1",
            BuiltinFont::HelveticaBold => "F2",
            BuiltinFont::TimesRoman => "F3",
        }
    }

    /// Width of `text` at `size` points, from the AFM tables.
    pub fn text_width(&self, text: &str, size: f64) -> f64 {
        metrics::text_width(*self, text, size)
    }
}

/// The built-in fonts embedded into one output document.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedBuiltins {
    helvetica: ObjectId,
    helvetica_bold: ObjectId,
    times_roman: ObjectId,
}

impl EmbeddedBuiltins {
    /// Add the three Type1 font dictionaries to the document.
    pub fn embed(pdf: &mut PdfDocument) -> Self {
        let mut add = |font: BuiltinFont| {
            let mut dict = Dictionary::new();
            dict.set("Type", Object::Name(b"Font".to_vec()));
            dict.set("Subtype", Object::Name(b"Type1".to_vec()));
            dict.set(
                "BaseFont",
                Object::Name(font.base_font().as_bytes().to_vec()),
            );
            dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
            pdf.doc_mut().add_object(Object::Dictionary(dict))
        };
        Self {
            helvetica: add(BuiltinFont::Helvetica),
            helvetica_bold: add(BuiltinFont::HelveticaBold),
            times_roman: add(BuiltinFont::TimesRoman),
        }
    }

    pub fn object_id(&self, font: BuiltinFont) -> ObjectId {
        match font {
            BuiltinFont::Helvetica => self.helvetica,
            BuiltinFont::HelveticaBold => self.helvetica_bold,
            BuiltinFont::TimesRoman => self.times_roman,
        }
    }
}

/// Style tier a typed signature renders in, resolved from the UI's font tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureStyle {
    /// Clean, professional: body sans or Helvetica.
    Plain,
    /// Semi-decorative cursive.
    Cursive,
    /// Fully decorative script.
    Script,
    /// Bold indicator style, sent alongside canvas signatures.
    Bold,
}

impl SignatureStyle {
    /// Absent or unrecognized tags resolve to the default plain style.
    pub fn from_tag(tag: Option<SignatureFont>) -> Self {
        match tag {
            Some(SignatureFont::Signatura) => SignatureStyle::Cursive,
            Some(SignatureFont::Signaturia) => SignatureStyle::Script,
            Some(SignatureFont::Drawn) => SignatureStyle::Bold,
            Some(SignatureFont::Signature) | Some(SignatureFont::Unknown) | None => {
                SignatureStyle::Plain
            }
        }
    }
}

/// Fetched font programs, loaded once per process and shared by reference.
///
/// Every slot is optional; an empty library is fully functional and renders
/// everything with the built-in fonts.
#[derive(Default)]
pub struct FontLibrary {
    body: Option<Font<'static>>,
    cursive: Option<Font<'static>>,
    script: Option<Font<'static>>,
}

impl FontLibrary {
    /// Library with no fetched fonts; built-ins only.
    pub fn builtin_only() -> Self {
        Self::default()
    }

    /// Build a library from raw font program bytes, dropping any slot whose
    /// data does not parse as a font.
    pub fn from_bytes(
        body: Option<Vec<u8>>,
        cursive: Option<Vec<u8>>,
        script: Option<Vec<u8>>,
    ) -> Self {
        let parse = |label: &str, data: Option<Vec<u8>>| -> Option<Font<'static>> {
            let data = data?;
            match Font::try_from_vec(data) {
                Some(font) => Some(font),
                None => {
                    tracing::warn!("{} font data is not a parseable font program", label);
                    None
                }
            }
        };
        Self {
            body: parse("body", body),
            cursive: parse("cursive", cursive),
            script: parse("script", script),
        }
    }

    pub fn body(&self) -> Option<&Font<'static>> {
        self.body.as_ref()
    }

    pub fn cursive(&self) -> Option<&Font<'static>> {
        self.cursive.as_ref()
    }

    pub fn script(&self) -> Option<&Font<'static>> {
        self.script.as_ref()
    }

    /// The fetched font backing a signature style, if any.
    pub fn style_font(&self, style: SignatureStyle) -> Option<&Font<'static>> {
        match style {
            SignatureStyle::Plain => self.body(),
            SignatureStyle::Cursive => self.cursive(),
            SignatureStyle::Script => self.script(),
            SignatureStyle::Bold => None,
        }
    }
}

impl std::fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontLibrary")
            .field("body", &self.body.is_some())
            .field("cursive", &self.cursive.is_some())
            .field("script", &self.script.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn style_resolution_covers_all_tags() {
        assert_eq!(
            SignatureStyle::from_tag(Some(SignatureFont::Signature)),
            SignatureStyle::Plain
        );
        assert_eq!(
            SignatureStyle::from_tag(Some(SignatureFont::Signatura)),
            SignatureStyle::Cursive
        );
        assert_eq!(
            SignatureStyle::from_tag(Some(SignatureFont::Signaturia)),
            SignatureStyle::Script
        );
        assert_eq!(
            SignatureStyle::from_tag(Some(SignatureFont::Drawn)),
            SignatureStyle::Bold
        );
        assert_eq!(
            SignatureStyle::from_tag(Some(SignatureFont::Unknown)),
            SignatureStyle::Plain
        );
        assert_eq!(SignatureStyle::from_tag(None), SignatureStyle::Plain);
    }

    #[test]
    fn garbage_font_bytes_leave_slot_empty() {
        let library = FontLibrary::from_bytes(Some(vec![0u8; 64]), None, None);
        assert!(library.body().is_none());
        assert!(library.cursive().is_none());
    }

    #[test]
    fn builtin_only_library_has_no_style_fonts() {
        let library = FontLibrary::builtin_only();
        for style in [
            SignatureStyle::Plain,
            SignatureStyle::Cursive,
            SignatureStyle::Script,
            SignatureStyle::Bold,
        ] {
            assert!(library.style_font(style).is_none());
        }
    }

    #[test]
    fn builtins_embed_as_distinct_objects() {
        let mut pdf = PdfDocument::empty();
        let builtins = EmbeddedBuiltins::embed(&mut pdf);
        let ids = [
            builtins.object_id(BuiltinFont::Helvetica),
            builtins.object_id(BuiltinFont::HelveticaBold),
            builtins.object_id(BuiltinFont::TimesRoman),
        ];
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
    }
}
