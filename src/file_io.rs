//! Saving, exporting and opening drawings, dispatched on file extension.

use std::fs;
use std::path::Path;

use image::RgbaImage;

use crate::codec;
use crate::envelope;
use crate::error::{FileError, FileResult};
use crate::raster::{self, RasterFormat};
use crate::render;
use crate::settings::Settings;
use crate::stroke::{Rgba, Stroke};

/// How a file is stored, decided by its extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    /// `.isf`: the file is exactly the binary stroke payload.
    Project,
    /// `.png`, `.jpg`, `.jpeg`: flattened pixels, maybe with embedded history.
    Raster(RasterFormat),
}

impl FileKind {
    pub fn from_path(path: &Path) -> FileResult<Self> {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "isf" => Ok(FileKind::Project),
            "png" => Ok(FileKind::Raster(RasterFormat::Png)),
            "jpg" | "jpeg" => Ok(FileKind::Raster(RasterFormat::Jpeg)),
            _ => Err(FileError::UnsupportedExtension(ext)),
        }
    }
}

/// A file that has been read but whose embedded history, if any, is still
/// undecoded.
#[derive(Debug)]
pub enum Opened {
    Project(Vec<Stroke>),
    Raster {
        format: RasterFormat,
        image: RgbaImage,
        comment: Option<String>,
    },
}

impl Opened {
    /// Whether the raster carries a history envelope. Cheap: only the tag is
    /// checked.
    pub fn has_history(&self) -> bool {
        match self {
            Opened::Project(_) => false,
            Opened::Raster { comment, .. } => comment.as_deref().is_some_and(envelope::detect),
        }
    }

    /// Decodes the embedded history of a raster file.
    pub fn history(&self) -> FileResult<Option<Vec<Stroke>>> {
        match self {
            Opened::Project(_) => Ok(None),
            Opened::Raster { comment, .. } => history_from_comment(comment.as_deref()),
        }
    }
}

pub fn save_project(path: &Path, strokes: &[Stroke]) -> FileResult<()> {
    let bytes = codec::encode(strokes)?;
    fs::write(path, &bytes)?;
    log::info!(
        "Saved {} strokes ({} bytes) to {}",
        strokes.len(),
        bytes.len(),
        path.display()
    );
    Ok(())
}

pub fn load_project(path: &Path) -> FileResult<Vec<Stroke>> {
    let bytes = fs::read(path)?;
    let strokes = codec::decode(&bytes)?;
    log::info!("Loaded {} strokes from {}", strokes.len(), path.display());
    Ok(strokes)
}

/// Flattens `strokes` into `format`, embedding the stroke history when asked.
pub fn export_image_bytes(
    format: RasterFormat,
    strokes: &[Stroke],
    embed_history: bool,
    jpeg_quality: u8,
) -> FileResult<Vec<u8>> {
    let comment = if embed_history {
        Some(envelope::embed(&codec::encode(strokes)?))
    } else {
        None
    };
    let image = render::rasterize(strokes, Rgba::WHITE).ok_or(FileError::EmptyCanvas)?;
    Ok(format.encode(&image, comment.as_deref(), jpeg_quality)?)
}

/// Writes a flattened image. History is embedded only when the settings
/// allow the experimental export.
pub fn export_image(path: &Path, strokes: &[Stroke], settings: &Settings) -> FileResult<()> {
    let FileKind::Raster(format) = FileKind::from_path(path)? else {
        return Err(FileError::UnsupportedExtension("isf".to_string()));
    };
    let embed = settings.history_export_available();
    let bytes = export_image_bytes(format, strokes, embed, settings.jpeg_quality)?;
    fs::write(path, &bytes)?;
    log::info!(
        "Exported {} to {} (history embedded: {})",
        format.name(),
        path.display(),
        embed
    );
    Ok(())
}

/// Decodes an envelope found in a metadata comment. `Ok(None)` when the
/// comment is missing or is not an envelope.
pub fn history_from_comment(comment: Option<&str>) -> FileResult<Option<Vec<Stroke>>> {
    let Some(payload) = comment.map(envelope::extract).transpose()?.flatten() else {
        return Ok(None);
    };
    Ok(Some(codec::decode(&payload)?))
}

/// Probes an image for embedded history without decoding pixels or strokes.
pub fn has_embedded_history(path: &Path) -> FileResult<bool> {
    let FileKind::Raster(format) = FileKind::from_path(path)? else {
        return Ok(false);
    };
    let bytes = fs::read(path)?;
    let comment = format.read_comment(&bytes)?;
    Ok(comment.as_deref().is_some_and(envelope::detect))
}

pub fn load_history_from_image(path: &Path) -> FileResult<Option<Vec<Stroke>>> {
    let FileKind::Raster(format) = FileKind::from_path(path)? else {
        return Ok(None);
    };
    let bytes = fs::read(path)?;
    let comment = format.read_comment(&bytes)?;
    let strokes = history_from_comment(comment.as_deref())?;
    if let Some(strokes) = &strokes {
        log::info!(
            "Restored {} strokes embedded in {}",
            strokes.len(),
            path.display()
        );
    }
    Ok(strokes)
}

/// Reads a project or image. For images the history stays undecoded so the
/// caller can ask before restoring it.
pub fn open(path: &Path) -> FileResult<Opened> {
    match FileKind::from_path(path)? {
        FileKind::Project => Ok(Opened::Project(load_project(path)?)),
        FileKind::Raster(format) => {
            let bytes = fs::read(path)?;
            let comment = format.read_comment(&bytes)?;
            let image = raster::decode_pixels(&bytes)?;
            log::info!(
                "Opened {} image {}x{} from {}",
                format.name(),
                image.width(),
                image.height(),
                path.display()
            );
            Ok(Opened::Raster {
                format,
                image,
                comment,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    #[test]
    fn test_extension_dispatch() {
        assert_eq!(FileKind::from_path(Path::new("a.isf")).unwrap(), FileKind::Project);
        assert_eq!(
            FileKind::from_path(Path::new("a.PNG")).unwrap(),
            FileKind::Raster(RasterFormat::Png)
        );
        assert_eq!(
            FileKind::from_path(Path::new("dir/a.jpeg")).unwrap(),
            FileKind::Raster(RasterFormat::Jpeg)
        );
        assert_eq!(
            FileKind::from_path(Path::new("a.JPG")).unwrap(),
            FileKind::Raster(RasterFormat::Jpeg)
        );
        assert!(matches!(
            FileKind::from_path(Path::new("a.bmp")),
            Err(FileError::UnsupportedExtension(ext)) if ext == "bmp"
        ));
        assert!(FileKind::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_history_from_comment() {
        assert!(history_from_comment(None).unwrap().is_none());
        assert!(history_from_comment(Some("holiday photo")).unwrap().is_none());
        assert!(history_from_comment(Some(&envelope::embed(&codec::encode(&[]).unwrap())))
            .unwrap()
            .unwrap()
            .is_empty());
        assert!(matches!(
            history_from_comment(Some("PNPS1:")),
            Err(FileError::Decode(DecodeError::Empty))
        ));
    }

    #[test]
    fn test_export_empty_canvas_fails() {
        assert!(matches!(
            export_image_bytes(RasterFormat::Png, &[], true, 95),
            Err(FileError::EmptyCanvas)
        ));
    }
}
