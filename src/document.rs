use crate::eraser::Eraser;
use crate::snap::{SnapEngine, SnapOutcome};
use crate::stroke::Stroke;

/// The stroke collection of one open drawing, in draw order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    strokes: Vec<Stroke>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            strokes: Vec::new(),
        }
    }

    pub fn from_strokes(strokes: Vec<Stroke>) -> Self {
        Self { strokes }
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn last_stroke(&self) -> Option<&Stroke> {
        self.strokes.last()
    }

    /// Appends a freshly drawn stroke and snaps its endpoints to the strokes
    /// drawn before it.
    pub fn commit_stroke(&mut self, stroke: Stroke, snap: &SnapEngine) -> SnapOutcome {
        self.strokes.push(stroke);
        match self.strokes.split_last_mut() {
            Some((newest, prior)) => snap.snap(newest, prior),
            None => SnapOutcome::default(),
        }
    }

    /// Appends a stroke as-is.
    pub fn add_stroke(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    pub fn remove_last_stroke(&mut self) -> Option<Stroke> {
        self.strokes.pop()
    }

    /// Empties the document, returning what was there.
    pub fn clear(&mut self) -> Vec<Stroke> {
        std::mem::take(&mut self.strokes)
    }

    /// Erases at `center`. Returns whether any stroke was touched.
    pub fn erase(&mut self, eraser: &Eraser, center: (f64, f64)) -> bool {
        match eraser.erase(&self.strokes, center) {
            Some(strokes) => {
                self.strokes = strokes;
                true
            }
            None => false,
        }
    }

    /// Swaps in a whole new collection, returning the previous one.
    pub fn replace(&mut self, strokes: Vec<Stroke>) -> Vec<Stroke> {
        std::mem::replace(&mut self.strokes, strokes)
    }
}
