//! Raster image handling: drawn-signature decoding and typed-signature
//! rasterization
//!
//! Both kinds of artwork end up as an RGB image XObject with an SMask alpha
//! channel, placed on the page with a `cm`/`Do` pair. Drawn signatures
//! arrive as base64 data URLs from the signing canvas; typed signatures in
//! a fetched script font are rendered to a transparent bitmap first, since
//! the built-in PDF fonts cannot reproduce those faces.

use std::io::Write;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use rusttype::{point, Font, Scale};

use crate::error::SealError;

/// Oversampling factor for rasterized typed signatures: pixels per point.
const RASTER_SCALE: f64 = 4.0;

/// Signature ink color, matching the dark navy used for text signatures.
const INK: Rgba<u8> = Rgba([0, 0, 204, 255]);

/// MIME type declared by a signature data URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredFormat {
    Png,
    Jpeg,
}

/// A decoded drawn-signature image.
#[derive(Debug)]
pub struct SignatureImage {
    pixels: RgbaImage,
    declared: DeclaredFormat,
}

impl SignatureImage {
    /// Decode a `data:image/...;base64,` URL into pixels.
    ///
    /// The declared MIME type is recorded for diagnostics; the actual pixel
    /// decode sniffs the real container. Unknown MIME types are treated as
    /// PNG.
    pub fn from_data_url(value: &str) -> Result<Self, SealError> {
        let declared = if value.starts_with("data:image/png") {
            DeclaredFormat::Png
        } else if value.starts_with("data:image/jpeg") || value.starts_with("data:image/jpg") {
            DeclaredFormat::Jpeg
        } else {
            tracing::debug!("unrecognized signature image MIME, assuming PNG");
            DeclaredFormat::Png
        };

        let payload = value
            .split_once("base64,")
            .ok_or_else(|| SealError::SignatureImage("missing base64 payload".to_string()))?
            .1;
        let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        let raw = BASE64
            .decode(cleaned.as_bytes())
            .map_err(|e| SealError::SignatureImage(format!("base64 decode failed: {}", e)))?;

        let pixels = image::load_from_memory(&raw)
            .map_err(|e| {
                SealError::SignatureImage(format!("{:?} decode failed: {}", declared, e))
            })?
            .to_rgba8();

        Ok(Self { pixels, declared })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn declared_format(&self) -> DeclaredFormat {
        self.declared
    }

    /// Embed the pixels as an image XObject.
    pub fn embed(&self, doc: &mut Document) -> Result<ObjectId, SealError> {
        embed_rgba(doc, &self.pixels)
    }
}

/// Embed an RGBA image as a FlateDecode RGB XObject, with an SMask carrying
/// the alpha channel when the image is not fully opaque.
pub fn embed_rgba(doc: &mut Document, img: &RgbaImage) -> Result<ObjectId, SealError> {
    // PDF image space has its origin at the bottom-left; flip the scanlines.
    let mut flipped = img.clone();
    image::imageops::flip_vertical_in_place(&mut flipped);
    let (width, height) = flipped.dimensions();

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    let mut translucent = false;
    for pixel in flipped.pixels() {
        let [r, g, b, a] = pixel.0;
        rgb.extend_from_slice(&[r, g, b]);
        alpha.push(a);
        if a < 255 {
            translucent = true;
        }
    }

    let compressed_rgb = deflate(&rgb)?;

    let smask_id = if translucent {
        let compressed_alpha = deflate(&alpha)?;
        Some(doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            compressed_alpha,
        )))
    } else {
        None
    };

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };
    if let Some(smask_id) = smask_id {
        dict.set("SMask", Object::Reference(smask_id));
    }

    Ok(doc.add_object(Stream::new(dict, compressed_rgb)))
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, SealError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| SealError::SignatureImage(format!("compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| SealError::SignatureImage(format!("compression failed: {}", e)))
}

/// Render `text` in `font` onto a transparent canvas.
///
/// Returns the canvas and its dimensions in points at the requested size,
/// or `None` when the text produces no visible glyphs.
pub fn rasterize_text(
    font: &Font<'static>,
    text: &str,
    size_pt: f64,
) -> Option<(RgbaImage, f64, f64)> {
    let scale = Scale::uniform((size_pt * RASTER_SCALE) as f32);
    let v_metrics = font.v_metrics(scale);

    let width_px = font
        .layout(text, scale, point(0.0, v_metrics.ascent))
        .last()
        .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
        .ceil();
    let height_px = (v_metrics.ascent - v_metrics.descent).ceil();
    if width_px <= 0.0 || height_px <= 0.0 {
        return None;
    }

    let mut canvas: RgbaImage =
        ImageBuffer::from_pixel(width_px as u32, height_px as u32, Rgba([0, 0, 0, 0]));
    draw_text_mut(&mut canvas, INK, 0, 0, scale, font, text);

    Some((
        canvas,
        width_px as f64 / RASTER_SCALE,
        height_px as f64 / RASTER_SCALE,
    ))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::BASE64;
    use base64::Engine as _;
    use image::{Rgba, RgbaImage};
    use std::io::Cursor;

    /// Solid-color PNG wrapped in a signature data URL.
    pub fn png_data_url(width: u32, height: u32) -> String {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 120, 255]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, image::ImageOutputFormat::Png)
            .unwrap();
        format!("data:image/png;base64,{}", BASE64.encode(buf.into_inner()))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::png_data_url;
    use super::*;

    #[test]
    fn decodes_png_data_url() {
        let img = SignatureImage::from_data_url(&png_data_url(40, 20)).unwrap();
        assert_eq!(img.width(), 40);
        assert_eq!(img.height(), 20);
        assert_eq!(img.declared_format(), DeclaredFormat::Png);
    }

    #[test]
    fn rejects_missing_payload() {
        let err = SignatureImage::from_data_url("data:image/png;base64").unwrap_err();
        assert!(err.to_string().contains("base64 payload"));
    }

    #[test]
    fn rejects_invalid_base64() {
        let err = SignatureImage::from_data_url("data:image/png;base64,!!!not-base64!!!")
            .unwrap_err();
        assert!(err.to_string().contains("base64 decode failed"));
    }

    #[test]
    fn rejects_non_image_payload() {
        let url = format!("data:image/png;base64,{}", BASE64.encode(b"hello world"));
        assert!(SignatureImage::from_data_url(&url).is_err());
    }

    #[test]
    fn unknown_mime_defaults_to_png() {
        // Real payload is PNG; the declared MIME is bogus.
        let png = png_data_url(8, 8);
        let payload = png.split_once("base64,").unwrap().1;
        let url = format!("data:image/webp;base64,{}", payload);
        let img = SignatureImage::from_data_url(&url).unwrap();
        assert_eq!(img.declared_format(), DeclaredFormat::Png);
        assert_eq!(img.width(), 8);
    }

    #[test]
    fn tolerates_whitespace_in_payload() {
        let png = png_data_url(8, 8);
        let (prefix, payload) = png.split_once("base64,").unwrap();
        let wrapped: String = payload
            .chars()
            .enumerate()
            .flat_map(|(i, c)| {
                if i > 0 && i % 20 == 0 {
                    vec!['\n', c]
                } else {
                    vec![c]
                }
            })
            .collect();
        let url = format!("{}base64,{}", prefix, wrapped);
        assert!(SignatureImage::from_data_url(&url).is_ok());
    }

    #[test]
    fn opaque_image_embeds_without_smask() {
        let mut doc = Document::new();
        let img = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let id = embed_rgba(&mut doc, &img).unwrap();
        let stream = doc.get_object(id).unwrap().as_stream().unwrap();
        assert!(stream.dict.get(b"SMask").is_err());
    }

    #[test]
    fn translucent_image_embeds_with_smask() {
        let mut doc = Document::new();
        let img = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 128]));
        let id = embed_rgba(&mut doc, &img).unwrap();
        let stream = doc.get_object(id).unwrap().as_stream().unwrap();
        assert!(stream.dict.get(b"SMask").is_ok());
    }
}
