use thiserror::Error;

/// Errors raised while reading a stroke payload or history envelope.
///
/// A missing envelope is not a decode error; lookups report it as `None`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("stroke data is empty")]
    Empty,

    #[error("unsupported stroke format version {0}")]
    UnsupportedVersion(u8),

    #[error("stroke data truncated: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("{0} unexpected bytes after the last stroke")]
    TrailingBytes(usize),

    #[error("stroke {index} has no points")]
    EmptyStroke { index: usize },

    #[error("stroke {index} uses unknown point channels {channels:#04x}")]
    UnknownChannels { index: usize, channels: u8 },

    #[error("malformed history envelope: {0}")]
    InvalidEnvelope(String),
}

/// Errors raised while serializing strokes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("stroke {index} has no points")]
    InvalidStroke { index: usize },

    #[error("stroke {index} has too many points to encode")]
    TooManyPoints { index: usize },

    #[error("too many strokes to encode: {0}")]
    TooManyStrokes(usize),
}

/// Errors from the raster container layer.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PNG encoding failed: {0}")]
    PngEncoding(#[from] png::EncodingError),

    #[error("PNG decoding failed: {0}")]
    PngDecoding(#[from] png::DecodingError),

    #[error("malformed JPEG: {0}")]
    MalformedJpeg(String),
}

/// Errors from saving, exporting and opening documents.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("unsupported file extension: {0:?}")]
    UnsupportedExtension(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error("canvas is empty, draw something first")]
    EmptyCanvas,
}

/// Errors from writing the settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to write settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize settings: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DecodeResult<T> = Result<T, DecodeError>;
pub type EncodeResult<T> = Result<T, EncodeError>;
pub type RasterResult<T> = Result<T, RasterError>;
pub type FileResult<T> = Result<T, FileError>;
