//! Raster containers with a single free-text comment slot.
//!
//! PNG stores the comment in a `tEXt` chunk keyed [`COMMENT_KEYWORD`] ahead
//! of the image data. JPEG stores it in `COM` segments ahead of the frame
//! header, following `SOI` and any JFIF `APP0` segment.
//! Pixel encoding is left to the `png` and `image` crates; the comment never
//! alters the pixel buffer.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, RgbImage, RgbaImage};

use crate::error::{RasterError, RasterResult};

pub const COMMENT_KEYWORD: &str = "Comment";

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const JPEG_APP0: u8 = 0xE0;
const JPEG_COM: u8 = 0xFE;
const JPEG_SOS: u8 = 0xDA;
const JPEG_EOI: u8 = 0xD9;
// Segment length field covers itself.
const JPEG_MAX_SEGMENT_PAYLOAD: usize = u16::MAX as usize - 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
}

impl RasterFormat {
    pub fn name(&self) -> &'static str {
        match self {
            RasterFormat::Png => "PNG",
            RasterFormat::Jpeg => "JPEG",
        }
    }

    /// Encodes `image` and, if given, stores `comment` in the metadata slot.
    pub fn encode(
        &self,
        image: &RgbaImage,
        comment: Option<&str>,
        jpeg_quality: u8,
    ) -> RasterResult<Vec<u8>> {
        match self {
            RasterFormat::Png => encode_png(image, comment),
            RasterFormat::Jpeg => encode_jpeg(image, comment, jpeg_quality),
        }
    }

    /// Reads the comment slot without decoding pixel data.
    pub fn read_comment(&self, bytes: &[u8]) -> RasterResult<Option<String>> {
        match self {
            RasterFormat::Png => read_png_comment(bytes),
            RasterFormat::Jpeg => read_jpeg_comment(bytes),
        }
    }
}

/// Decodes pixel data of any supported container.
pub fn decode_pixels(bytes: &[u8]) -> RasterResult<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

fn encode_png(image: &RgbaImage, comment: Option<&str>) -> RasterResult<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        if let Some(comment) = comment {
            encoder.add_text_chunk(COMMENT_KEYWORD.to_string(), comment.to_string())?;
        }
        let mut writer = encoder.write_header()?;
        writer.write_image_data(image.as_raw())?;
        writer.finish()?;
    }
    Ok(out)
}

// Only chunks before the first IDAT are inspected, which is where
// `encode_png` puts the comment.
fn read_png_comment(bytes: &[u8]) -> RasterResult<Option<String>> {
    let reader = png::Decoder::new(Cursor::new(bytes)).read_info()?;
    let info = reader.info();

    if let Some(chunk) = info
        .uncompressed_latin1_text
        .iter()
        .find(|chunk| chunk.keyword == COMMENT_KEYWORD)
    {
        return Ok(Some(chunk.text.clone()));
    }
    if let Some(chunk) = info
        .compressed_latin1_text
        .iter()
        .find(|chunk| chunk.keyword == COMMENT_KEYWORD)
    {
        return Ok(Some(chunk.get_text()?));
    }
    if let Some(chunk) = info
        .utf8_text
        .iter()
        .find(|chunk| chunk.keyword == COMMENT_KEYWORD)
    {
        return Ok(Some(chunk.get_text()?));
    }

    Ok(None)
}

fn encode_jpeg(image: &RgbaImage, comment: Option<&str>, quality: u8) -> RasterResult<Vec<u8>> {
    let rgb = flatten_on_white(image);
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, quality.clamp(1, 100)).encode(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ExtendedColorType::Rgb8,
    )?;

    let Some(comment) = comment else {
        return Ok(encoded);
    };
    if !encoded.starts_with(&JPEG_SOI) {
        return Err(RasterError::MalformedJpeg("encoder output lacks SOI".to_string()));
    }
    let insert_at = comment_insertion_offset(&encoded);

    let payload = comment.as_bytes();
    let segments = payload.len().div_ceil(JPEG_MAX_SEGMENT_PAYLOAD).max(1);
    let mut out = Vec::with_capacity(encoded.len() + payload.len() + segments * 4);
    out.extend_from_slice(&encoded[..insert_at]);
    for chunk in payload.chunks(JPEG_MAX_SEGMENT_PAYLOAD) {
        write_com_segment(&mut out, chunk);
    }
    if payload.is_empty() {
        write_com_segment(&mut out, &[]);
    }
    out.extend_from_slice(&encoded[insert_at..]);
    Ok(out)
}

/// Offset just past SOI, or past the JFIF `APP0` header when the encoder
/// wrote one, since that header must come first.
fn comment_insertion_offset(encoded: &[u8]) -> usize {
    let after_soi = JPEG_SOI.len();
    if encoded.get(after_soi..after_soi + 2) != Some(&[0xFF, JPEG_APP0][..]) {
        return after_soi;
    }
    match encoded.get(after_soi + 2..after_soi + 4) {
        Some(&[hi, lo]) => {
            let end = after_soi + 2 + u16::from_be_bytes([hi, lo]) as usize;
            if end <= encoded.len() { end } else { after_soi }
        }
        _ => after_soi,
    }
}

fn write_com_segment(out: &mut Vec<u8>, chunk: &[u8]) {
    // `chunk` is at most JPEG_MAX_SEGMENT_PAYLOAD long, so this fits.
    let length = (chunk.len() + 2) as u16;
    out.extend_from_slice(&[0xFF, JPEG_COM]);
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(chunk);
}

/// Concatenates every `COM` segment found before the scan data.
fn read_jpeg_comment(bytes: &[u8]) -> RasterResult<Option<String>> {
    if !bytes.starts_with(&JPEG_SOI) {
        return Err(RasterError::MalformedJpeg("missing SOI marker".to_string()));
    }

    let mut comment: Option<Vec<u8>> = None;
    let mut pos = JPEG_SOI.len();
    loop {
        if pos >= bytes.len() {
            return Err(RasterError::MalformedJpeg(
                "unexpected end before scan data".to_string(),
            ));
        }
        if bytes[pos] != 0xFF {
            return Err(RasterError::MalformedJpeg(format!(
                "expected marker at offset {pos}"
            )));
        }
        while pos < bytes.len() && bytes[pos] == 0xFF {
            pos += 1;
        }
        let Some(&marker) = bytes.get(pos) else {
            return Err(RasterError::MalformedJpeg("truncated marker".to_string()));
        };
        pos += 1;

        match marker {
            JPEG_SOS | JPEG_EOI => break,
            // Markers without a length field.
            0x01 | 0xD0..=0xD7 => continue,
            _ => {}
        }

        let Some(length_bytes) = bytes.get(pos..pos + 2) else {
            return Err(RasterError::MalformedJpeg("truncated segment length".to_string()));
        };
        let length = u16::from_be_bytes([length_bytes[0], length_bytes[1]]) as usize;
        let end = pos + length;
        if length < 2 || end > bytes.len() {
            return Err(RasterError::MalformedJpeg(format!(
                "segment {marker:#04x} at offset {pos} overruns the file"
            )));
        }
        if marker == JPEG_COM {
            comment
                .get_or_insert_with(Vec::new)
                .extend_from_slice(&bytes[pos + 2..end]);
        }
        pos = end;
    }

    Ok(comment.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
}

/// Composites `image` over white, dropping alpha.
pub fn flatten_on_white(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let blend = |c: u8| -> u8 {
            let alpha = a as u16;
            ((c as u16 * alpha + 255 * (255 - alpha) + 127) / 255) as u8
        };
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard() -> RgbaImage {
        RgbaImage::from_fn(8, 6, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 255, 128])
            }
        })
    }

    #[test]
    fn test_png_comment_roundtrip() {
        let image = checkerboard();
        let bytes = RasterFormat::Png.encode(&image, Some("PNPS1:aGk="), 95).unwrap();

        assert_eq!(
            RasterFormat::Png.read_comment(&bytes).unwrap().as_deref(),
            Some("PNPS1:aGk=")
        );
        assert_eq!(decode_pixels(&bytes).unwrap(), image);
    }

    #[test]
    fn test_png_without_comment() {
        let bytes = RasterFormat::Png.encode(&checkerboard(), None, 95).unwrap();
        assert_eq!(RasterFormat::Png.read_comment(&bytes).unwrap(), None);
    }

    #[test]
    fn test_jpeg_comment_roundtrip() {
        let bytes = RasterFormat::Jpeg
            .encode(&checkerboard(), Some("PNPS1:aGk="), 90)
            .unwrap();

        assert_eq!(
            RasterFormat::Jpeg.read_comment(&bytes).unwrap().as_deref(),
            Some("PNPS1:aGk=")
        );
        let decoded = decode_pixels(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (8, 6));
    }

    #[test]
    fn test_jpeg_long_comment_spans_segments() {
        let comment = "A".repeat(JPEG_MAX_SEGMENT_PAYLOAD * 2 + 10);
        let bytes = RasterFormat::Jpeg
            .encode(&checkerboard(), Some(&comment), 90)
            .unwrap();

        assert_eq!(RasterFormat::Jpeg.read_comment(&bytes).unwrap(), Some(comment));
        assert!(decode_pixels(&bytes).is_ok());
    }

    #[test]
    fn test_jpeg_without_comment() {
        let bytes = RasterFormat::Jpeg.encode(&checkerboard(), None, 90).unwrap();
        assert_eq!(RasterFormat::Jpeg.read_comment(&bytes).unwrap(), None);
    }

    #[test]
    fn test_jpeg_truncated_segment() {
        let bytes = [0xFF, 0xD8, 0xFF, JPEG_COM, 0x00, 0x10, b'P'];
        assert!(matches!(
            RasterFormat::Jpeg.read_comment(&bytes),
            Err(RasterError::MalformedJpeg(_))
        ));
        assert!(RasterFormat::Jpeg.read_comment(b"not a jpeg").is_err());
    }

    #[test]
    fn test_flatten_on_white() {
        let image = RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 0]));
        assert_eq!(flatten_on_white(&image).get_pixel(0, 0).0, [255, 255, 255]);

        let image = RgbaImage::from_pixel(1, 1, image::Rgba([10, 20, 30, 255]));
        assert_eq!(flatten_on_white(&image).get_pixel(0, 0).0, [10, 20, 30]);
    }
}
