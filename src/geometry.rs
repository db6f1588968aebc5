use crate::stroke::{Point, Stroke};

/// Axis-aligned bounding box in canvas units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// Distance from `point` to the segment `start..end`.
pub(crate) fn distance_to_segment(point: (f64, f64), start: &Point, end: &Point) -> f64 {
    let (dx, dy) = (end.x - start.x, end.y - start.y);
    let (px, py) = (point.0 - start.x, point.1 - start.y);

    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return px.hypot(py);
    }

    let t = ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0);
    (px - dx * t).hypot(py - dy * t)
}

/// Bounding box of the points, grown by `padding` on every side.
pub(crate) fn calculate_bounds(points: &[Point], padding: f64) -> Option<Bounds> {
    let first = points.first()?;
    let mut bounds = Bounds {
        min_x: first.x,
        min_y: first.y,
        max_x: first.x,
        max_y: first.y,
    };

    for point in &points[1..] {
        bounds.min_x = bounds.min_x.min(point.x);
        bounds.min_y = bounds.min_y.min(point.y);
        bounds.max_x = bounds.max_x.max(point.x);
        bounds.max_y = bounds.max_y.max(point.y);
    }

    bounds.min_x -= padding;
    bounds.min_y -= padding;
    bounds.max_x += padding;
    bounds.max_y += padding;
    Some(bounds)
}

/// Painted extent of a stroke, including half its width.
pub fn stroke_bounds(stroke: &Stroke) -> Option<Bounds> {
    calculate_bounds(stroke.points(), stroke.width() / 2.0)
}

/// Painted extent of a whole collection.
pub fn collection_bounds(strokes: &[Stroke]) -> Option<Bounds> {
    strokes
        .iter()
        .filter_map(stroke_bounds)
        .reduce(Bounds::union)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::Rgba;

    #[test]
    fn test_distance_to_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);

        assert_eq!(distance_to_segment((5.0, 3.0), &a, &b), 3.0);
        assert_eq!(distance_to_segment((-3.0, 4.0), &a, &b), 5.0);
        assert_eq!(distance_to_segment((13.0, 4.0), &a, &b), 5.0);
        assert_eq!(distance_to_segment((3.0, 4.0), &a, &a), 5.0);
    }

    #[test]
    fn test_collection_bounds() {
        let strokes = vec![
            Stroke::new(Rgba::BLACK, 2.0, vec![Point::new(1.0, 2.0), Point::new(5.0, 3.0)]),
            Stroke::new(Rgba::BLACK, 4.0, vec![Point::new(10.0, 10.0)]),
            Stroke::new(Rgba::BLACK, 4.0, Vec::new()),
        ];

        let bounds = collection_bounds(&strokes).unwrap();
        assert_eq!(bounds.min_x, 0.0);
        assert_eq!(bounds.min_y, 1.0);
        assert_eq!(bounds.max_x, 12.0);
        assert_eq!(bounds.max_y, 12.0);
        assert!(collection_bounds(&[]).is_none());
    }
}
