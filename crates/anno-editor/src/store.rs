//! The editor store: the single per-session state container.
//!
//! Composes the registry (via `Canvas`), command history, selection
//! tracker and persistence gateway, and exposes one intention per
//! user-facing action. Every mutating intention validates its inputs,
//! builds a reversible command, executes it through the history (which
//! mutates the registry and the scene backend in the same synchronous
//! step), then restarts the debounced autosave window.
//!
//! The store is an explicit context object — constructed empty, injected
//! into consumers, torn down by `reset` — not an ambient singleton.

use crate::canvas::{Canvas, EditMutation};
use crate::commands::CommandHistory;
use crate::debounce::Debounce;
use crate::events::SceneEvent;
use crate::persist::{PersistenceGateway, SnapshotStore};
use crate::scene::SceneBackend;
use crate::selection::SelectionTracker;
use anno_core::error::EditError;
use anno_core::id::LayerId;
use anno_core::model::{BackgroundImage, CanvasState, Layer, LayerPatch};
use std::time::{Duration, Instant};

/// Autosave debounce window.
pub const AUTOSAVE_WINDOW: Duration = Duration::from_millis(800);

/// Maximum undo depth.
pub const HISTORY_DEPTH: usize = 100;

pub struct EditorStore<B: SceneBackend> {
    canvas: Canvas,
    history: CommandHistory,
    selection: SelectionTracker,
    gateway: PersistenceGateway,
    autosave: Debounce,
    backend: B,
    /// Feeds default layer names (`Text 1`, `Text 2`, ...).
    next_ordinal: usize,
}

impl<B: SceneBackend> EditorStore<B> {
    /// An empty document over the given backend and durable store.
    pub fn new(backend: B, store: Box<dyn SnapshotStore>) -> Self {
        Self::with_config(backend, store, AUTOSAVE_WINDOW, HISTORY_DEPTH)
    }

    pub fn with_config(
        backend: B,
        store: Box<dyn SnapshotStore>,
        autosave_window: Duration,
        history_depth: usize,
    ) -> Self {
        Self {
            canvas: Canvas::new(),
            history: CommandHistory::new(history_depth),
            selection: SelectionTracker::new(),
            gateway: PersistenceGateway::new(store),
            autosave: Debounce::new(autosave_window),
            backend,
            next_ordinal: 0,
        }
    }

    // ─── Mutating intentions ─────────────────────────────────────────────

    /// Add a default text layer at the top of the stack and select it.
    pub fn add_text(&mut self) -> Result<LayerId, EditError> {
        let id = LayerId::generate();
        let layer = Layer::new_text(id, self.next_ordinal + 1);
        let index = self.canvas.registry.len();
        self.execute(
            EditMutation::InsertLayer {
                index,
                layer: Box::new(layer),
            },
            "Add text",
        )?;
        self.next_ordinal += 1;
        // New layers become the edit target. Selection itself is cursor
        // state and is not part of the command.
        self.selection.select(&self.canvas.registry, Some(id))?;
        Ok(id)
    }

    pub fn delete_layer(&mut self, id: LayerId) -> Result<(), EditError> {
        if !self.canvas.registry.contains(id) {
            return Err(EditError::NotFound(id));
        }
        self.execute(EditMutation::RemoveLayer { id }, "Delete layer")?;
        self.selection.prune(&self.canvas.registry);
        Ok(())
    }

    /// Shallow-merge a property edit. An empty patch is a no-op and
    /// records nothing.
    pub fn update_layer(&mut self, id: LayerId, patch: LayerPatch) -> Result<(), EditError> {
        if !self.canvas.registry.contains(id) {
            return Err(EditError::NotFound(id));
        }
        if patch.is_empty() {
            return Ok(());
        }
        self.execute(EditMutation::UpdateLayer { id, patch }, "Edit layer")
    }

    /// Move the layer at z-order `from` to `to`.
    pub fn move_layer(&mut self, from: usize, to: usize) -> Result<(), EditError> {
        let len = self.canvas.registry.len();
        if from >= len {
            return Err(EditError::IndexOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(EditError::IndexOutOfRange { index: to, len });
        }
        self.execute(EditMutation::ReorderLayer { from, to }, "Reorder layer")
    }

    /// Replace the background image, committing the displayed canvas
    /// dimensions in the same step. The image arrives already decoded —
    /// decoding is the embedding's job, so layer-adding intentions are
    /// always valid against the currently committed dimensions.
    pub fn set_background(
        &mut self,
        image: BackgroundImage,
        canvas_width: u32,
        canvas_height: u32,
    ) -> Result<(), EditError> {
        self.execute(
            EditMutation::SetBackground {
                image: Some(Box::new(image)),
                canvas_width,
                canvas_height,
            },
            "Set background",
        )
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Set or clear the active layer. Not undoable.
    pub fn select_layer(&mut self, id: Option<LayerId>) -> Result<(), EditError> {
        self.selection.select(&self.canvas.registry, id)
    }

    pub fn selected_layer_id(&self) -> Option<LayerId> {
        self.selection.selected_id()
    }

    /// Resolve the selection to its layer, or `None`.
    pub fn selected_layer(&self) -> Option<&Layer> {
        self.selection
            .selected_id()
            .and_then(|id| self.canvas.registry.get(id))
    }

    // ─── Undo / redo ─────────────────────────────────────────────────────

    /// Undo the last command; returns its description, or `None` when
    /// there is nothing to undo.
    pub fn undo(&mut self) -> Option<String> {
        let desc = self.history.undo(&mut self.canvas, &mut self.backend)?;
        self.selection.prune(&self.canvas.registry);
        self.autosave.schedule(Instant::now());
        Some(desc)
    }

    pub fn redo(&mut self) -> Option<String> {
        let desc = self.history.redo(&mut self.canvas, &mut self.backend)?;
        self.selection.prune(&self.canvas.registry);
        self.autosave.schedule(Instant::now());
        Some(desc)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Collaborator events ─────────────────────────────────────────────

    /// Route a direct-manipulation event through the same command path
    /// as explicit intentions. Gestures on locked layers are dropped.
    pub fn apply_scene_event(&mut self, event: &SceneEvent) -> Result<(), EditError> {
        match event {
            SceneEvent::SelectionSet { id } => self.select_layer(Some(*id)),
            SceneEvent::SelectionCleared => self.select_layer(None),
            _ => {
                let Some((id, patch, description)) = event.to_patch() else {
                    return Ok(());
                };
                let layer = self.canvas.registry.get(id).ok_or(EditError::NotFound(id))?;
                if layer.locked {
                    log::debug!("ignoring gesture on locked layer {id}");
                    return Ok(());
                }
                self.execute(EditMutation::UpdateLayer { id, patch }, description)
            }
        }
    }

    // ─── Document lifecycle ──────────────────────────────────────────────

    /// Irreversible full teardown: clears the canvas, the backend scene,
    /// the history, the selection and the persisted snapshot. Cannot be
    /// undone — callers must confirm with the user first.
    pub fn reset(&mut self) {
        self.canvas.reset(&mut self.backend);
        self.history.clear();
        self.selection.clear();
        self.gateway.clear();
        self.autosave.cancel();
        self.next_ordinal = 0;
    }

    /// Restore the persisted snapshot, if any. A loaded document starts
    /// with an empty undo stack — history is never persisted. Returns
    /// false when no readable snapshot exists.
    pub fn load(&mut self) -> bool {
        let Some(state) = self.gateway.load() else {
            return false;
        };
        self.canvas.restore(&mut self.backend, &state);
        self.history.clear();
        self.autosave.cancel();
        // Restore the selection only if the id still resolves.
        self.selection.clear();
        if let Some(id) = state.selected {
            let _ = self.selection.select(&self.canvas.registry, Some(id));
        }
        self.next_ordinal = self.canvas.registry.len();
        true
    }

    // ─── Autosave ────────────────────────────────────────────────────────

    pub fn set_autosave(&mut self, enabled: bool) {
        self.gateway.set_enabled(enabled);
        if !enabled {
            self.autosave.cancel();
        }
    }

    pub fn autosave_enabled(&self) -> bool {
        self.gateway.is_enabled()
    }

    /// Drive the debounced save. Called from the host's event loop; the
    /// aggregate is read at fire time, never captured at schedule time.
    pub fn tick(&mut self, now: Instant) {
        if self.autosave.fire_due(now) {
            let state = self.canvas.to_state(self.selection.selected_id());
            self.gateway.save(&state);
        }
    }

    pub fn save_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Layers ascending by z-order.
    pub fn layers(&self) -> &[Layer] {
        self.canvas.registry.layers()
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.canvas.registry.get(id)
    }

    pub fn background(&self) -> Option<&BackgroundImage> {
        self.canvas.background.as_ref()
    }

    /// The full persistable aggregate.
    pub fn canvas_state(&self) -> CanvasState {
        self.canvas.to_state(self.selection.selected_id())
    }

    /// Raster snapshot of the scene at export scale (PNG bytes).
    pub fn export_png(&mut self) -> Vec<u8> {
        let scale = self.canvas_state().export_scale();
        self.backend.rasterize(scale)
    }

    /// The scene backend, for embeddings that need direct access (and
    /// for test inspection).
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn execute(&mut self, mutation: EditMutation, description: &str) -> Result<(), EditError> {
        self.history
            .execute(&mut self.canvas, &mut self.backend, mutation, description)?;
        self.autosave.schedule(Instant::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStore;
    use crate::scene::RecordingBackend;
    use pretty_assertions::assert_eq;

    fn store() -> EditorStore<RecordingBackend> {
        EditorStore::new(RecordingBackend::new(), Box::new(MemoryStore::new()))
    }

    #[test]
    fn add_text_selects_new_layer() {
        let mut s = store();
        let id = s.add_text().unwrap();

        assert_eq!(s.layers().len(), 1);
        assert_eq!(s.selected_layer_id(), Some(id));
        assert_eq!(s.layers()[0].name, "Text 1");
        assert!(s.can_undo());
    }

    #[test]
    fn delete_drops_dangling_selection() {
        let mut s = store();
        let id = s.add_text().unwrap();
        s.delete_layer(id).unwrap();

        assert_eq!(s.selected_layer_id(), None);
        assert!(s.layers().is_empty());
    }

    #[test]
    fn delete_missing_layer_is_rejected_before_mutation() {
        let mut s = store();
        s.add_text().unwrap();

        let ghost = LayerId::intern("st_ghost");
        assert_eq!(s.delete_layer(ghost), Err(EditError::NotFound(ghost)));
        assert_eq!(s.layers().len(), 1);
    }

    #[test]
    fn empty_patch_records_no_command() {
        let mut s = store();
        let id = s.add_text().unwrap();
        s.undo();
        s.redo();
        assert!(!s.can_redo());

        s.update_layer(id, LayerPatch::default()).unwrap();
        // Still exactly one undoable command (the add)
        s.undo();
        assert!(!s.can_undo());
    }

    #[test]
    fn reset_clears_everything() {
        let mut s = store();
        s.add_text().unwrap();
        s.tick(Instant::now() + AUTOSAVE_WINDOW);

        s.reset();
        assert!(s.layers().is_empty());
        assert!(!s.can_undo());
        assert_eq!(s.selected_layer_id(), None);
        assert!(!s.load(), "persisted snapshot should be gone");
    }

    #[test]
    fn locked_layer_ignores_gestures() {
        let mut s = store();
        let id = s.add_text().unwrap();
        s.update_layer(
            id,
            LayerPatch {
                locked: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        let x_before = s.layer(id).unwrap().x;

        s.apply_scene_event(&SceneEvent::ObjectMoved {
            id,
            x: 500.0,
            y: 500.0,
        })
        .unwrap();
        assert_eq!(s.layer(id).unwrap().x, x_before);
    }

    #[test]
    fn export_scale_reaches_backend() {
        let mut s = store();
        s.set_background(
            BackgroundImage {
                source: "data:image/png;base64,AA".into(),
                original_width: 2000,
                original_height: 1000,
            },
            1000,
            500,
        )
        .unwrap();

        s.export_png();
        assert!(
            s.backend().calls.iter().any(|c| c == "rasterize x2"),
            "calls: {:?}",
            s.backend().calls
        );
    }
}
