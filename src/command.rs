use crate::document::Document;
use crate::snap::{SnapEngine, SnapOutcome};
use crate::stroke::Stroke;

/// Undoable edits of a [`Document`].
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Appends a stroke whose endpoints have already been snapped.
    AddStroke(Stroke),
    /// Removes every stroke; keeps them for undo.
    Clear { removed: Vec<Stroke> },
    /// One eraser gesture: the strokes before and after it.
    Erase {
        before: Vec<Stroke>,
        after: Vec<Stroke>,
    },
}

impl Command {
    pub fn execute(&self, document: &mut Document) {
        match self {
            Command::AddStroke(stroke) => document.add_stroke(stroke.clone()),
            Command::Clear { .. } => {
                document.clear();
            }
            Command::Erase { after, .. } => {
                document.replace(after.clone());
            }
        }
    }

    pub fn undo(&self, document: &mut Document) {
        match self {
            Command::AddStroke(_) => {
                document.remove_last_stroke();
            }
            Command::Clear { removed } => {
                document.replace(removed.clone());
            }
            Command::Erase { before, .. } => {
                document.replace(before.clone());
            }
        }
    }
}

/// Manages the history of executed commands for undo/redo functionality
#[derive(Debug, Default)]
pub struct CommandHistory {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    pub fn execute(&mut self, command: Command, document: &mut Document) {
        command.execute(document);
        self.push(command);
    }

    /// Adds a finished stroke, snapping it against the existing strokes.
    pub fn commit_stroke(
        &mut self,
        stroke: Stroke,
        snap: &SnapEngine,
        document: &mut Document,
    ) -> SnapOutcome {
        let outcome = document.commit_stroke(stroke, snap);
        if let Some(stroke) = document.last_stroke() {
            self.push(Command::AddStroke(stroke.clone()));
        }
        outcome
    }

    /// Clears the document as one undoable step.
    pub fn clear(&mut self, document: &mut Document) {
        if document.is_empty() {
            return;
        }
        let removed = document.strokes().to_vec();
        self.execute(Command::Clear { removed }, document);
    }

    /// Records an eraser gesture that already ran on `document`, given the
    /// strokes from before it started. Returns false if nothing was erased.
    pub fn record_erase(&mut self, before: Vec<Stroke>, document: &Document) -> bool {
        if before.as_slice() == document.strokes() {
            return false;
        }
        let after = document.strokes().to_vec();
        self.push(Command::Erase { before, after });
        true
    }

    /// Undoes the last command. Strokes that predate the history (e.g. loaded
    /// from a file) are removed from the tail one at a time.
    pub fn undo(&mut self, document: &mut Document) -> bool {
        if let Some(command) = self.undo_stack.pop() {
            command.undo(document);
            self.redo_stack.push(command);
            return true;
        }
        match document.remove_last_stroke() {
            Some(stroke) => {
                self.redo_stack.push(Command::AddStroke(stroke));
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self, document: &mut Document) -> bool {
        match self.redo_stack.pop() {
            Some(command) => {
                command.execute(document);
                self.undo_stack.push(command);
                true
            }
            None => false,
        }
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Forgets all history, e.g. after a file is opened.
    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn push(&mut self, command: Command) {
        self.undo_stack.push(command);
        self.redo_stack.clear();
    }
}
