//! Undoable command history.
//!
//! Every mutation is wrapped in a reversible `Command`: a forward
//! `EditMutation` and its inverse, computed from live state *before* the
//! forward mutation runs. The history is a single vector plus a cursor
//! marking the boundary between done and undone — executing a fresh
//! command truncates the redoable suffix (linear undo, not a tree).
//!
//! Commands store mutations, never whole-document snapshots, so memory
//! is bounded by edit count rather than document size.

use crate::canvas::{Canvas, EditMutation};
use crate::scene::SceneBackend;
use anno_core::error::EditError;

/// A forward mutation paired with its exact inverse.
#[derive(Debug, Clone)]
pub struct Command {
    forward: EditMutation,
    inverse: EditMutation,
    description: String,
}

impl Command {
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Linear undo/redo history over `Command`s.
pub struct CommandHistory {
    entries: Vec<Command>,
    /// Number of done commands; entries at `cursor..` are the redoable
    /// suffix.
    cursor: usize,
    /// Maximum undo depth; the oldest entry is dropped beyond it.
    max_depth: usize,
}

impl CommandHistory {
    pub fn new(max_depth: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            max_depth,
        }
    }

    /// Run `mutation` through the canvas and record it. The inverse is
    /// captured first; if either step fails the history is untouched.
    pub fn execute(
        &mut self,
        canvas: &mut Canvas,
        backend: &mut dyn SceneBackend,
        mutation: EditMutation,
        description: &str,
    ) -> Result<(), EditError> {
        let inverse = canvas.invert(&mutation)?;
        canvas.apply(backend, mutation.clone())?;
        log::debug!("execute: {description}");

        // Discard the redoable suffix, then append.
        self.entries.truncate(self.cursor);
        self.entries.push(Command {
            forward: mutation,
            inverse,
            description: description.to_string(),
        });
        if self.entries.len() > self.max_depth {
            self.entries.remove(0);
        }
        self.cursor = self.entries.len();
        Ok(())
    }

    /// Undo the most recent done command. `None` when there is nothing
    /// to undo — an expected no-op, not an error.
    pub fn undo(
        &mut self,
        canvas: &mut Canvas,
        backend: &mut dyn SceneBackend,
    ) -> Option<String> {
        if self.cursor == 0 {
            return None;
        }
        let cmd = &self.entries[self.cursor - 1];
        // Inverses are computed against the state they undo, so this
        // cannot fail unless the two representations already diverged.
        // Leave the cursor where it is in that case — it must keep
        // agreeing with what was actually applied.
        if let Err(err) = canvas.apply(backend, cmd.inverse.clone()) {
            log::error!("undo '{}' failed: {err}", cmd.description);
            return None;
        }
        self.cursor -= 1;
        Some(cmd.description.clone())
    }

    /// Redo the next undone command. `None` when the cursor is already
    /// at the end.
    pub fn redo(
        &mut self,
        canvas: &mut Canvas,
        backend: &mut dyn SceneBackend,
    ) -> Option<String> {
        if self.cursor == self.entries.len() {
            return None;
        }
        let cmd = &self.entries[self.cursor];
        if let Err(err) = canvas.apply(backend, cmd.forward.clone()) {
            log::error!("redo '{}' failed: {err}", cmd.description);
            return None;
        }
        self.cursor += 1;
        Some(cmd.description.clone())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Empty the history. Used only on full document reset or load,
    /// never during normal editing.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::RecordingBackend;
    use anno_core::id::LayerId;
    use anno_core::model::{Layer, LayerPatch};

    fn insert(name: &str, index: usize) -> EditMutation {
        EditMutation::InsertLayer {
            index,
            layer: Box::new(Layer::new_text(LayerId::intern(name), 0)),
        }
    }

    #[test]
    fn undo_redo_roundtrip() {
        let mut canvas = Canvas::new();
        let mut backend = RecordingBackend::new();
        let mut history = CommandHistory::new(100);

        history
            .execute(&mut canvas, &mut backend, insert("h_a", 0), "Add text")
            .unwrap();
        assert_eq!(canvas.registry.len(), 1);
        assert!(history.can_undo());
        assert!(!history.can_redo());

        let desc = history.undo(&mut canvas, &mut backend);
        assert_eq!(desc.as_deref(), Some("Add text"));
        assert!(canvas.registry.is_empty());
        assert!(history.can_redo());

        let desc = history.redo(&mut canvas, &mut backend);
        assert_eq!(desc.as_deref(), Some("Add text"));
        assert_eq!(canvas.registry.len(), 1);
    }

    #[test]
    fn new_command_discards_redo_suffix() {
        let mut canvas = Canvas::new();
        let mut backend = RecordingBackend::new();
        let mut history = CommandHistory::new(100);

        history
            .execute(&mut canvas, &mut backend, insert("h_b", 0), "add b")
            .unwrap();
        history
            .execute(&mut canvas, &mut backend, insert("h_c", 1), "add c")
            .unwrap();
        history.undo(&mut canvas, &mut backend);
        history.undo(&mut canvas, &mut backend);
        assert!(history.can_redo());

        history
            .execute(&mut canvas, &mut backend, insert("h_d", 0), "add d")
            .unwrap();
        assert!(!history.can_redo());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn boundary_predicates_track_cursor() {
        let mut canvas = Canvas::new();
        let mut backend = RecordingBackend::new();
        let mut history = CommandHistory::new(100);

        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo(&mut canvas, &mut backend), None);
        assert_eq!(history.redo(&mut canvas, &mut backend), None);

        history
            .execute(&mut canvas, &mut backend, insert("h_e", 0), "add")
            .unwrap();
        assert!(history.can_undo());
        assert!(!history.can_redo());

        history.undo(&mut canvas, &mut backend);
        assert!(!history.can_undo());
        assert!(history.can_redo());
    }

    #[test]
    fn max_depth_trims_oldest() {
        let mut canvas = Canvas::new();
        let mut backend = RecordingBackend::new();
        let mut history = CommandHistory::new(3);

        for i in 0..5 {
            history
                .execute(
                    &mut canvas,
                    &mut backend,
                    EditMutation::UpdateLayer {
                        id: LayerId::intern("h_f"),
                        patch: LayerPatch {
                            x: Some(i as f32),
                            ..Default::default()
                        },
                    },
                    "nudge",
                )
                .unwrap_err(); // no such layer: validated, not recorded
        }
        assert!(history.is_empty());

        history
            .execute(&mut canvas, &mut backend, insert("h_f", 0), "add")
            .unwrap();
        for i in 0..5 {
            history
                .execute(
                    &mut canvas,
                    &mut backend,
                    EditMutation::UpdateLayer {
                        id: LayerId::intern("h_f"),
                        patch: LayerPatch {
                            x: Some(i as f32),
                            ..Default::default()
                        },
                    },
                    "nudge",
                )
                .unwrap();
        }

        let mut undo_count = 0;
        while history.undo(&mut canvas, &mut backend).is_some() {
            undo_count += 1;
        }
        assert_eq!(undo_count, 3);
    }

    #[test]
    fn failed_inverse_leaves_cursor_in_place() {
        let mut canvas = Canvas::new();
        let mut backend = RecordingBackend::new();
        let mut history = CommandHistory::new(100);

        history
            .execute(&mut canvas, &mut backend, insert("h_g", 0), "add")
            .unwrap();
        // Force a divergence: drop the layer behind the history's back,
        // so the recorded inverse (remove) has nothing to remove.
        canvas.registry.remove(LayerId::intern("h_g")).unwrap();

        assert_eq!(history.undo(&mut canvas, &mut backend), None);
        // The cursor still agrees with what was actually applied
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn failed_forward_leaves_cursor_in_place() {
        let mut canvas = Canvas::new();
        let mut backend = RecordingBackend::new();
        let mut history = CommandHistory::new(100);

        history
            .execute(&mut canvas, &mut backend, insert("h_h", 0), "add")
            .unwrap();
        history.undo(&mut canvas, &mut backend).unwrap();
        // Re-insert the layer directly, so redoing the add collides.
        canvas
            .registry
            .add(Layer::new_text(LayerId::intern("h_h"), 0))
            .unwrap();

        assert_eq!(history.redo(&mut canvas, &mut backend), None);
        assert!(history.can_redo());
        assert!(!history.can_undo());
    }

    #[test]
    fn failed_execute_leaves_history_untouched() {
        let mut canvas = Canvas::new();
        let mut backend = RecordingBackend::new();
        let mut history = CommandHistory::new(100);

        let err = history
            .execute(
                &mut canvas,
                &mut backend,
                EditMutation::RemoveLayer {
                    id: LayerId::intern("h_ghost"),
                },
                "delete",
            )
            .unwrap_err();
        assert_eq!(err, EditError::NotFound(LayerId::intern("h_ghost")));
        assert!(!history.can_undo());
        assert!(backend.mutations().is_empty());
    }
}
