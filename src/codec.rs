//! Binary stroke history format.
//!
//! All integers and floats are little-endian.
//!
//! ```text
//! collection := version:u8 stroke_count:u32 stroke*
//! stroke     := rgba:[u8; 4] width:f64 channels:u8 point_count:u32 point*
//! point      := x:f64 y:f64 [pressure:f64] [tilt_x:f64 tilt_y:f64]
//! ```
//!
//! `channels` is a bit set: [`CHANNEL_PRESSURE`] and [`CHANNEL_TILT`]. A
//! channel is written only when some point in the stroke differs from the
//! default value, and omitted channels decode to their defaults, so encoding
//! a decoded buffer reproduces it byte for byte.

use crate::error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
use crate::stroke::{DEFAULT_PRESSURE, Point, Rgba, Stroke};

/// Current format version.
pub const FORMAT_VERSION: u8 = 1;

pub const CHANNEL_PRESSURE: u8 = 0b01;
pub const CHANNEL_TILT: u8 = 0b10;
const KNOWN_CHANNELS: u8 = CHANNEL_PRESSURE | CHANNEL_TILT;

const HEADER_LEN: usize = 1 + 4;
const STROKE_HEADER_LEN: usize = 4 + 8 + 1 + 4;
const COORD_LEN: usize = 2 * 8;

/// Serializes `strokes` in draw order.
///
/// Fails with [`EncodeError::InvalidStroke`] on a stroke without points;
/// nothing is produced in that case.
pub fn encode(strokes: &[Stroke]) -> EncodeResult<Vec<u8>> {
    let stroke_count =
        u32::try_from(strokes.len()).map_err(|_| EncodeError::TooManyStrokes(strokes.len()))?;

    let mut out = Vec::with_capacity(HEADER_LEN + encoded_body_hint(strokes));
    out.push(FORMAT_VERSION);
    out.extend_from_slice(&stroke_count.to_le_bytes());

    for (index, stroke) in strokes.iter().enumerate() {
        encode_stroke(&mut out, index, stroke)?;
    }

    Ok(out)
}

/// Parses a buffer produced by [`encode`].
///
/// Either the whole collection is returned or an error; a corrupt buffer
/// never yields a partial collection.
pub fn decode(bytes: &[u8]) -> DecodeResult<Vec<Stroke>> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let mut reader = Reader::new(bytes);
    let version = reader.u8()?;
    if version != FORMAT_VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }

    let stroke_count = reader.u32()? as usize;
    // Every stroke needs at least a header and one point.
    reader.require(stroke_count.saturating_mul(STROKE_HEADER_LEN + COORD_LEN))?;

    let mut strokes = Vec::with_capacity(stroke_count);
    for index in 0..stroke_count {
        strokes.push(decode_stroke(&mut reader, index)?);
    }

    if reader.remaining() > 0 {
        return Err(DecodeError::TrailingBytes(reader.remaining()));
    }

    Ok(strokes)
}

fn channels_for(points: &[Point]) -> u8 {
    let mut channels = 0;
    if points.iter().any(Point::has_pressure) {
        channels |= CHANNEL_PRESSURE;
    }
    if points.iter().any(Point::has_tilt) {
        channels |= CHANNEL_TILT;
    }
    channels
}

fn point_len(channels: u8) -> usize {
    let mut len = COORD_LEN;
    if channels & CHANNEL_PRESSURE != 0 {
        len += 8;
    }
    if channels & CHANNEL_TILT != 0 {
        len += 16;
    }
    len
}

fn encoded_body_hint(strokes: &[Stroke]) -> usize {
    strokes
        .iter()
        .map(|s| STROKE_HEADER_LEN + s.points().len() * point_len(KNOWN_CHANNELS))
        .sum()
}

fn encode_stroke(out: &mut Vec<u8>, index: usize, stroke: &Stroke) -> EncodeResult<()> {
    let points = stroke.points();
    if points.is_empty() {
        return Err(EncodeError::InvalidStroke { index });
    }
    let point_count =
        u32::try_from(points.len()).map_err(|_| EncodeError::TooManyPoints { index })?;
    let channels = channels_for(points);

    out.extend_from_slice(&stroke.color().to_array());
    out.extend_from_slice(&stroke.width().to_le_bytes());
    out.push(channels);
    out.extend_from_slice(&point_count.to_le_bytes());

    for point in points {
        out.extend_from_slice(&point.x.to_le_bytes());
        out.extend_from_slice(&point.y.to_le_bytes());
        if channels & CHANNEL_PRESSURE != 0 {
            out.extend_from_slice(&point.pressure.to_le_bytes());
        }
        if channels & CHANNEL_TILT != 0 {
            out.extend_from_slice(&point.tilt_x.to_le_bytes());
            out.extend_from_slice(&point.tilt_y.to_le_bytes());
        }
    }

    Ok(())
}

fn decode_stroke(reader: &mut Reader<'_>, index: usize) -> DecodeResult<Stroke> {
    let color = Rgba::from_array(reader.array::<4>()?);
    let width = reader.f64()?;
    let channels = reader.u8()?;
    if channels & !KNOWN_CHANNELS != 0 {
        return Err(DecodeError::UnknownChannels { index, channels });
    }

    let point_count = reader.u32()? as usize;
    if point_count == 0 {
        return Err(DecodeError::EmptyStroke { index });
    }
    reader.require(point_count.saturating_mul(point_len(channels)))?;

    let mut points = Vec::with_capacity(point_count);
    for _ in 0..point_count {
        let mut point = Point::new(reader.f64()?, reader.f64()?);
        point.pressure = if channels & CHANNEL_PRESSURE != 0 {
            reader.f64()?
        } else {
            DEFAULT_PRESSURE
        };
        if channels & CHANNEL_TILT != 0 {
            point.tilt_x = reader.f64()?;
            point.tilt_y = reader.f64()?;
        }
        points.push(point);
    }

    Ok(Stroke::new(color, width, points))
}

/// Bounds-checked cursor over the input buffer.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn require(&self, needed: usize) -> DecodeResult<()> {
        if needed > self.remaining() {
            Err(DecodeError::Truncated {
                needed,
                available: self.remaining(),
            })
        } else {
            Ok(())
        }
    }

    fn array<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        self.require(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    fn u8(&mut self) -> DecodeResult<u8> {
        Ok(self.array::<1>()?[0])
    }

    fn u32(&mut self) -> DecodeResult<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn f64(&mut self) -> DecodeResult<f64> {
        Ok(f64::from_le_bytes(self.array()?))
    }
}
