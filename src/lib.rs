#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod codec;
pub mod command;
pub mod document;
pub mod envelope;
pub mod eraser;
pub mod error;
pub mod file_io;
pub mod geometry;
pub mod raster;
pub mod render;
pub mod settings;
pub mod snap;
pub mod stroke;

pub use app::PaintApp;
pub use command::{Command, CommandHistory};
pub use document::Document;
pub use eraser::Eraser;
pub use error::{DecodeError, EncodeError, FileError, RasterError, SettingsError};
pub use file_io::{FileKind, Opened};
pub use raster::RasterFormat;
pub use settings::Settings;
pub use snap::{SnapEngine, SnapOutcome};
pub use stroke::{MutableStroke, Point, Rgba, Stroke};
