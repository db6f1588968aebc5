//! Point eraser: cuts strokes wherever the eraser touches them.

use crate::geometry::distance_to_segment;
use crate::stroke::{Point, Stroke};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Eraser {
    radius: f64,
}

impl Eraser {
    pub fn new(radius: f64) -> Self {
        Self {
            radius: radius.max(0.0),
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    // Painted stroke width counts, so touching the ink is enough.
    fn reach(&self, stroke: &Stroke) -> f64 {
        self.radius + stroke.width() / 2.0
    }

    /// Whether the eraser at `center` touches any part of `stroke`.
    pub fn hits(&self, stroke: &Stroke, center: (f64, f64)) -> bool {
        let reach = self.reach(stroke);
        match stroke.points() {
            [] => false,
            [only] => distance_to_segment(center, only, only) <= reach,
            points => points
                .windows(2)
                .any(|w| distance_to_segment(center, &w[0], &w[1]) <= reach),
        }
    }

    /// What remains of `stroke` after erasing at `center`, or `None` if the
    /// eraser misses it. Points under the eraser are dropped and segments
    /// crossing it are cut; each surviving run becomes its own stroke.
    pub fn split(&self, stroke: &Stroke, center: (f64, f64)) -> Option<Vec<Stroke>> {
        if !self.hits(stroke, center) {
            return None;
        }
        let reach = self.reach(stroke);

        let mut pieces = Vec::new();
        let mut run: Vec<Point> = Vec::new();
        for point in stroke.points() {
            if distance_to_segment(center, point, point) <= reach {
                flush(&mut pieces, &mut run, stroke);
                continue;
            }
            if let Some(previous) = run.last() {
                if distance_to_segment(center, previous, point) <= reach {
                    flush(&mut pieces, &mut run, stroke);
                }
            }
            run.push(*point);
        }
        flush(&mut pieces, &mut run, stroke);

        Some(pieces)
    }

    /// Erases at `center` across a whole collection, keeping draw order.
    /// Returns `None` when no stroke is touched.
    pub fn erase(&self, strokes: &[Stroke], center: (f64, f64)) -> Option<Vec<Stroke>> {
        let mut changed = false;
        let mut result = Vec::with_capacity(strokes.len());
        for stroke in strokes {
            match self.split(stroke, center) {
                Some(pieces) => {
                    changed = true;
                    result.extend(pieces);
                }
                None => result.push(stroke.clone()),
            }
        }
        changed.then_some(result)
    }
}

fn flush(pieces: &mut Vec<Stroke>, run: &mut Vec<Point>, source: &Stroke) {
    if !run.is_empty() {
        pieces.push(Stroke::new(source.color(), source.width(), std::mem::take(run)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::Rgba;

    fn line(points: &[(f64, f64)]) -> Stroke {
        Stroke::new(
            Rgba::GREEN,
            2.0,
            points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        )
    }

    fn coords(stroke: &Stroke) -> Vec<(f64, f64)> {
        stroke.points().iter().map(|p| (p.x, p.y)).collect()
    }

    #[test]
    fn test_miss_leaves_stroke() {
        let stroke = line(&[(0.0, 0.0), (10.0, 0.0)]);
        let eraser = Eraser::new(2.0);

        assert!(!eraser.hits(&stroke, (5.0, 10.0)));
        assert_eq!(eraser.split(&stroke, (5.0, 10.0)), None);
    }

    #[test]
    fn test_erasing_middle_point_splits() {
        let stroke = line(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0), (40.0, 0.0)]);

        let pieces = Eraser::new(2.0).split(&stroke, (20.0, 0.0)).unwrap();

        assert_eq!(pieces.len(), 2);
        assert_eq!(coords(&pieces[0]), vec![(0.0, 0.0), (10.0, 0.0)]);
        assert_eq!(coords(&pieces[1]), vec![(30.0, 0.0), (40.0, 0.0)]);
        assert!(pieces.iter().all(|p| p.color() == Rgba::GREEN && p.width() == 2.0));
    }

    #[test]
    fn test_crossing_segment_is_cut() {
        // Neither point is under the eraser, only the segment between them.
        let stroke = line(&[(0.0, 0.0), (100.0, 0.0)]);

        let pieces = Eraser::new(2.0).split(&stroke, (50.0, 1.0)).unwrap();

        assert_eq!(pieces.len(), 2);
        assert_eq!(coords(&pieces[0]), vec![(0.0, 0.0)]);
        assert_eq!(coords(&pieces[1]), vec![(100.0, 0.0)]);
    }

    #[test]
    fn test_fully_erased_stroke_disappears() {
        let stroke = line(&[(0.0, 0.0), (1.0, 0.0)]);
        assert_eq!(Eraser::new(5.0).split(&stroke, (0.5, 0.0)), Some(Vec::new()));

        let dot = line(&[(3.0, 3.0)]);
        assert_eq!(Eraser::new(1.0).split(&dot, (3.5, 3.0)), Some(Vec::new()));
    }

    #[test]
    fn test_erase_collection_keeps_order() {
        let strokes = vec![
            line(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]),
            line(&[(0.0, 50.0), (20.0, 50.0)]),
        ];
        let eraser = Eraser::new(1.0);

        let erased = eraser.erase(&strokes, (10.0, 0.0)).unwrap();

        assert_eq!(erased.len(), 3);
        assert_eq!(coords(&erased[0]), vec![(0.0, 0.0)]);
        assert_eq!(coords(&erased[1]), vec![(20.0, 0.0)]);
        assert_eq!(erased[2], strokes[1]);
        assert_eq!(eraser.erase(&strokes, (10.0, 25.0)), None);
    }
}
