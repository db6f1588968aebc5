use serde::{Deserialize, Serialize};

/// Pressure recorded for input devices that do not report any.
pub const DEFAULT_PRESSURE: f64 = 0.5;

/// 8-bit RGBA color used for stroke rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);
    pub const BLUE: Rgba = Rgba::opaque(0, 0, 255);
    pub const GREEN: Rgba = Rgba::opaque(0, 128, 0);
    pub const RED: Rgba = Rgba::opaque(255, 0, 0);
    pub const ORANGE: Rgba = Rgba::opaque(255, 165, 0);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_array([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// A sampled pen position.
///
/// Pressure and tilt are carried through serialization untouched; nothing in
/// this crate interprets them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub pressure: f64,
    pub tilt_x: f64,
    pub tilt_y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            pressure: DEFAULT_PRESSURE,
            tilt_x: 0.0,
            tilt_y: 0.0,
        }
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = pressure;
        self
    }

    pub fn with_tilt(mut self, tilt_x: f64, tilt_y: f64) -> Self {
        self.tilt_x = tilt_x;
        self.tilt_y = tilt_y;
        self
    }

    pub fn xy(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    // Bitwise, so -0.0 and NaN payloads still count as recorded values.
    pub(crate) fn has_pressure(&self) -> bool {
        self.pressure.to_bits() != DEFAULT_PRESSURE.to_bits()
    }

    pub(crate) fn has_tilt(&self) -> bool {
        self.tilt_x.to_bits() != 0.0f64.to_bits() || self.tilt_y.to_bits() != 0.0f64.to_bits()
    }
}

// Finished stroke. The point order is the drawing path.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    points: Vec<Point>,
    color: Rgba,
    width: f64,
}

impl Stroke {
    pub fn new(color: Rgba, width: f64, points: Vec<Point>) -> Self {
        Self {
            points,
            color,
            width,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn start(&self) -> Option<&Point> {
        self.points.first()
    }

    pub fn end(&self) -> Option<&Point> {
        self.points.last()
    }

    /// Moves the first point to `(x, y)`, keeping its ancillary channels.
    pub fn set_start(&mut self, x: f64, y: f64) {
        if let Some(point) = self.points.first_mut() {
            point.x = x;
            point.y = y;
        }
    }

    /// Moves the last point to `(x, y)`, keeping its ancillary channels.
    pub fn set_end(&mut self, x: f64, y: f64) {
        if let Some(point) = self.points.last_mut() {
            point.x = x;
            point.y = y;
        }
    }
}

// Stroke still being drawn
pub struct MutableStroke {
    points: Vec<Point>,
    color: Rgba,
    width: f64,
}

impl MutableStroke {
    pub fn new(color: Rgba, width: f64) -> Self {
        Self {
            points: Vec::new(),
            color,
            width,
        }
    }

    pub fn add_point(&mut self, point: Point) {
        // Pointer events often repeat the last position; skip those.
        if self.points.last() != Some(&point) {
            self.points.push(point);
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Finishes the stroke. Returns `None` if no point was ever added.
    pub fn finish(self) -> Option<Stroke> {
        if self.points.is_empty() {
            None
        } else {
            Some(Stroke::new(self.color, self.width, self.points))
        }
    }
}
