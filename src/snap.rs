//! Endpoint snapping for freshly completed strokes.

use crate::stroke::{Point, Stroke};

/// Coordinates an endpoint was moved to, if any.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SnapOutcome {
    pub start: Option<(f64, f64)>,
    pub end: Option<(f64, f64)>,
}

impl SnapOutcome {
    pub fn is_snapped(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}

/// Aligns the endpoints of a new stroke to nearby endpoints of earlier ones.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapEngine {
    threshold: f64,
}

impl SnapEngine {
    /// A candidate must be strictly closer than `threshold`, so zero disables
    /// snapping.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Moves the first and last point of `stroke` onto the closest endpoint
    /// among `prior`, each independently. Interior points never change.
    ///
    /// Only two points per prior stroke are examined.
    pub fn snap(&self, stroke: &mut Stroke, prior: &[Stroke]) -> SnapOutcome {
        let (Some(start), Some(end)) = (stroke.start().copied(), stroke.end().copied()) else {
            return SnapOutcome::default();
        };

        // Both lookups use the original positions.
        let outcome = SnapOutcome {
            start: self.nearest_endpoint(&start, prior),
            end: self.nearest_endpoint(&end, prior),
        };

        if let Some((x, y)) = outcome.start {
            stroke.set_start(x, y);
        }
        if let Some((x, y)) = outcome.end {
            stroke.set_end(x, y);
        }

        if outcome.is_snapped() {
            log::debug!("Snapped stroke endpoints: {:?}", outcome);
        }
        outcome
    }

    /// Closest endpoint of `prior` strictly within the threshold.
    pub fn nearest_endpoint(&self, target: &Point, prior: &[Stroke]) -> Option<(f64, f64)> {
        let mut best_distance = self.threshold;
        let mut best = None;

        for other in prior {
            let (Some(first), Some(last)) = (other.start(), other.end()) else {
                continue;
            };
            for candidate in [first, last] {
                let distance = target.distance(candidate);
                if distance < best_distance {
                    best_distance = distance;
                    best = Some((candidate.x, candidate.y));
                }
            }
        }

        best
    }
}
