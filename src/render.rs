//! Flattens strokes into a raster image for export.

use image::RgbaImage;

use crate::geometry::{self, Bounds, distance_to_segment};
use crate::stroke::{Point, Rgba, Stroke};

/// Largest edge of an exported canvas, in pixels.
pub const MAX_CANVAS_EDGE: u32 = 16_384;

/// Renders `strokes` in draw order onto a `background` canvas. The canvas
/// starts at the origin, or further up and left when strokes reach into
/// negative coordinates, and ends at the far edge of the drawing.
///
/// Returns `None` when there is nothing to draw.
pub fn rasterize(strokes: &[Stroke], background: Rgba) -> Option<RgbaImage> {
    let bounds = geometry::collection_bounds(strokes)?;
    let canvas_bounds = Bounds {
        min_x: bounds.min_x.min(0.0).floor(),
        min_y: bounds.min_y.min(0.0).floor(),
        ..bounds
    };
    let origin = (canvas_bounds.min_x, canvas_bounds.min_y);

    let width = canvas_edge(canvas_bounds.width());
    let height = canvas_edge(canvas_bounds.height());
    let mut canvas = RgbaImage::from_pixel(width, height, image::Rgba(background.to_array()));

    let mut mask = vec![false; width as usize * height as usize];
    for stroke in strokes {
        mask.fill(false);
        cover_stroke(&mut mask, width, height, origin, stroke);
        for (index, covered) in mask.iter().enumerate() {
            if *covered {
                let x = (index % width as usize) as u32;
                let y = (index / width as usize) as u32;
                blend(canvas.get_pixel_mut(x, y), stroke.color());
            }
        }
    }

    Some(canvas)
}

fn canvas_edge(extent: f64) -> u32 {
    (extent.ceil() as u32).clamp(1, MAX_CANVAS_EDGE)
}

// Marks every pixel whose center lies within half the stroke width of the
// path. Pixel (0, 0) sits at `origin` in canvas units.
fn cover_stroke(mask: &mut [bool], width: u32, height: u32, origin: (f64, f64), stroke: &Stroke) {
    let radius = (stroke.width() / 2.0).max(0.5);
    let points = stroke.points();
    let segments: Vec<(&Point, &Point)> = match points {
        [] => return,
        [only] => vec![(only, only)],
        _ => points.windows(2).map(|w| (&w[0], &w[1])).collect(),
    };

    for (start, end) in segments {
        let x0 = pixel_floor(start.x.min(end.x) - radius - origin.0, width);
        let x1 = pixel_floor(start.x.max(end.x) + radius - origin.0, width);
        let y0 = pixel_floor(start.y.min(end.y) - radius - origin.1, height);
        let y1 = pixel_floor(start.y.max(end.y) + radius - origin.1, height);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let center = (x as f64 + 0.5 + origin.0, y as f64 + 0.5 + origin.1);
                if distance_to_segment(center, start, end) <= radius {
                    mask[y as usize * width as usize + x as usize] = true;
                }
            }
        }
    }
}

fn pixel_floor(value: f64, limit: u32) -> u32 {
    if value <= 0.0 {
        0
    } else {
        (value.floor() as u32).min(limit - 1)
    }
}

fn blend(pixel: &mut image::Rgba<u8>, color: Rgba) {
    let alpha = color.a as u32;
    let src = [color.r, color.g, color.b];
    for (channel, src) in pixel.0.iter_mut().zip(src) {
        *channel = ((src as u32 * alpha + *channel as u32 * (255 - alpha) + 127) / 255) as u8;
    }
    let dst_alpha = pixel.0[3] as u32;
    pixel.0[3] = (alpha + dst_alpha * (255 - alpha) / 255) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_collection() {
        assert!(rasterize(&[], Rgba::WHITE).is_none());
    }

    #[test]
    fn test_horizontal_line() {
        let strokes = vec![Stroke::new(
            Rgba::RED,
            2.0,
            vec![Point::new(2.0, 5.0), Point::new(18.0, 5.0)],
        )];

        let canvas = rasterize(&strokes, Rgba::WHITE).unwrap();

        assert_eq!(canvas.dimensions(), (19, 6));
        assert_eq!(canvas.get_pixel(10, 4).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(10, 0).0, [255, 255, 255, 255]);
        assert_eq!(canvas.get_pixel(0, 4).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_negative_coordinates_shift_canvas() {
        let strokes = vec![Stroke::new(
            Rgba::RED,
            2.0,
            vec![Point::new(-20.0, -5.0), Point::new(-3.0, -2.0)],
        )];

        let canvas = rasterize(&strokes, Rgba::WHITE).unwrap();

        // Canvas spans x -21..-2 and y -6..-1.
        assert_eq!(canvas.dimensions(), (19, 5));
        // (-20, -5) lands at pixel (1, 1).
        assert_eq!(canvas.get_pixel(1, 1).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(18, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_partly_negative_stroke_not_clipped() {
        let strokes = vec![Stroke::new(
            Rgba::BLUE,
            2.0,
            vec![Point::new(-10.0, 5.0), Point::new(10.0, 5.0)],
        )];

        let canvas = rasterize(&strokes, Rgba::WHITE).unwrap();

        assert_eq!(canvas.dimensions(), (22, 6));
        assert_eq!(canvas.get_pixel(0, 4).0, [0, 0, 255, 255]);
        assert_eq!(canvas.get_pixel(21, 4).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_later_strokes_paint_over_earlier() {
        let strokes = vec![
            Stroke::new(Rgba::RED, 4.0, vec![Point::new(5.0, 5.0)]),
            Stroke::new(Rgba::BLUE, 4.0, vec![Point::new(5.0, 5.0)]),
        ];

        let canvas = rasterize(&strokes, Rgba::WHITE).unwrap();
        assert_eq!(canvas.get_pixel(4, 4).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_translucent_stroke_blends_once() {
        let half_red = Rgba { r: 255, g: 0, b: 0, a: 128 };
        // Overlapping segments must not darken the shared pixels twice.
        let strokes = vec![Stroke::new(
            half_red,
            4.0,
            vec![Point::new(2.0, 4.0), Point::new(8.0, 4.0), Point::new(2.0, 4.0)],
        )];

        let canvas = rasterize(&strokes, Rgba::WHITE).unwrap();
        assert_eq!(canvas.get_pixel(5, 3).0, [255, 127, 127, 255]);
    }
}
