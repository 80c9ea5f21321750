//! The live editable canvas: registry + background + dimensions.
//!
//! All mutation sources — explicit UI intentions, undo/redo, and
//! direct-manipulation events from the collaborator — funnel through
//! `Canvas::apply`, which mutates the registry and mirrors the same
//! change into the scene backend in one synchronous step.

use crate::scene::SceneBackend;
use anno_core::error::EditError;
use anno_core::id::LayerId;
use anno_core::model::{BackgroundImage, CanvasState, Layer, LayerPatch};
use anno_core::registry::LayerRegistry;

/// A reversible unit of change over the canvas.
#[derive(Debug, Clone)]
pub enum EditMutation {
    /// Insert a layer at a z-order slot (append for "add text", original
    /// slot for delete-undo).
    InsertLayer { index: usize, layer: Box<Layer> },
    RemoveLayer {
        id: LayerId,
    },
    UpdateLayer {
        id: LayerId,
        patch: LayerPatch,
    },
    ReorderLayer {
        from: usize,
        to: usize,
    },
    /// Replace the background and both dimension pairs atomically.
    SetBackground {
        image: Option<Box<BackgroundImage>>,
        canvas_width: u32,
        canvas_height: u32,
    },
}

/// Live editable state, kept in lockstep with the scene backend.
#[derive(Debug, Default)]
pub struct Canvas {
    pub registry: LayerRegistry,
    pub background: Option<BackgroundImage>,
    /// Displayed canvas dimensions.
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the inverse of `mutation` against the *current* state.
    /// Must run before `apply` — the inverse closes over the values the
    /// forward mutation is about to overwrite.
    pub fn invert(&self, mutation: &EditMutation) -> Result<EditMutation, EditError> {
        match mutation {
            EditMutation::InsertLayer { layer, .. } => Ok(EditMutation::RemoveLayer {
                id: layer.id,
            }),
            EditMutation::RemoveLayer { id } => {
                let index = self.registry.index_of(*id).ok_or(EditError::NotFound(*id))?;
                let layer = self.registry.get(*id).ok_or(EditError::NotFound(*id))?;
                Ok(EditMutation::InsertLayer {
                    index,
                    layer: Box::new(layer.clone()),
                })
            }
            EditMutation::UpdateLayer { id, patch } => {
                let layer = self.registry.get(*id).ok_or(EditError::NotFound(*id))?;
                Ok(EditMutation::UpdateLayer {
                    id: *id,
                    patch: patch.reverse_of(layer),
                })
            }
            EditMutation::ReorderLayer { from, to } => Ok(EditMutation::ReorderLayer {
                from: *to,
                to: *from,
            }),
            EditMutation::SetBackground { .. } => Ok(EditMutation::SetBackground {
                image: self.background.clone().map(Box::new),
                canvas_width: self.canvas_width,
                canvas_height: self.canvas_height,
            }),
        }
    }

    /// Apply a mutation to the registry and mirror it into `backend`.
    ///
    /// Callers validate before constructing the mutation; a failure here
    /// aborts before any mutation (registry operations validate first),
    /// so partial application cannot happen.
    pub fn apply(
        &mut self,
        backend: &mut dyn SceneBackend,
        mutation: EditMutation,
    ) -> Result<(), EditError> {
        match mutation {
            EditMutation::InsertLayer { index, layer } => {
                self.registry.insert(index, (*layer).clone())?;
                backend.insert_text(index, &layer);
            }
            EditMutation::RemoveLayer { id } => {
                self.registry.remove(id)?;
                backend.remove_text(id);
            }
            EditMutation::UpdateLayer { id, patch } => {
                self.registry.update(id, &patch)?;
                backend.update_text(id, &patch);
            }
            EditMutation::ReorderLayer { from, to } => {
                self.registry.reorder(from, to)?;
                backend.reorder(from, to);
            }
            EditMutation::SetBackground {
                image,
                canvas_width,
                canvas_height,
            } => {
                self.background = image.map(|b| *b);
                self.canvas_width = canvas_width;
                self.canvas_height = canvas_height;
                backend.set_background(self.background.as_ref());
                backend.resize_canvas(canvas_width, canvas_height);
            }
        }
        backend.request_render();
        Ok(())
    }

    /// Assemble the persistable aggregate. `selected` is owned by the
    /// selection tracker, so the orchestrator passes it in.
    pub fn to_state(&self, selected: Option<LayerId>) -> CanvasState {
        CanvasState {
            background: self.background.clone(),
            layers: self.registry.layers().to_vec(),
            selected,
            canvas_width: self.canvas_width,
            canvas_height: self.canvas_height,
            original_width: self
                .background
                .as_ref()
                .map(|b| b.original_width)
                .unwrap_or(self.canvas_width),
            original_height: self
                .background
                .as_ref()
                .map(|b| b.original_height)
                .unwrap_or(self.canvas_height),
        }
    }

    /// Replace the whole canvas from a persisted aggregate, rebuilding
    /// the backend scene object by object.
    pub fn restore(&mut self, backend: &mut dyn SceneBackend, state: &CanvasState) {
        backend.clear();
        self.registry.replace_all(state.layers.clone());
        self.background = state.background.clone();
        self.canvas_width = state.canvas_width;
        self.canvas_height = state.canvas_height;

        backend.set_background(self.background.as_ref());
        backend.resize_canvas(self.canvas_width, self.canvas_height);
        for (index, layer) in self.registry.layers().iter().enumerate() {
            backend.insert_text(index, layer);
        }
        backend.request_render();
    }

    /// Drop everything: layers, background, dimensions.
    pub fn reset(&mut self, backend: &mut dyn SceneBackend) {
        self.registry.clear();
        self.background = None;
        self.canvas_width = 0;
        self.canvas_height = 0;
        backend.clear();
        backend.request_render();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::RecordingBackend;
    use pretty_assertions::assert_eq;

    fn text_layer(name: &str) -> Layer {
        Layer::new_text(LayerId::intern(name), 0)
    }

    #[test]
    fn apply_mirrors_into_backend() {
        let mut canvas = Canvas::new();
        let mut backend = RecordingBackend::new();

        canvas
            .apply(
                &mut backend,
                EditMutation::InsertLayer {
                    index: 0,
                    layer: Box::new(text_layer("cv_a")),
                },
            )
            .unwrap();
        canvas
            .apply(
                &mut backend,
                EditMutation::RemoveLayer {
                    id: LayerId::intern("cv_a"),
                },
            )
            .unwrap();

        assert_eq!(backend.mutations(), vec!["insert cv_a @0", "remove cv_a"]);
        assert!(canvas.registry.is_empty());
    }

    #[test]
    fn invert_remove_captures_slot_and_layer() {
        let mut canvas = Canvas::new();
        let mut backend = RecordingBackend::new();
        canvas.registry.add(text_layer("cv_b")).unwrap();
        canvas.registry.add(text_layer("cv_c")).unwrap();

        let forward = EditMutation::RemoveLayer {
            id: LayerId::intern("cv_b"),
        };
        let inverse = canvas.invert(&forward).unwrap();
        canvas.apply(&mut backend, forward).unwrap();
        assert_eq!(canvas.registry.len(), 1);

        canvas.apply(&mut backend, inverse).unwrap();
        assert_eq!(canvas.registry.index_of(LayerId::intern("cv_b")), Some(0));
        assert_eq!(canvas.registry.index_of(LayerId::intern("cv_c")), Some(1));
    }

    #[test]
    fn invert_missing_layer_is_rejected() {
        let canvas = Canvas::new();
        let err = canvas
            .invert(&EditMutation::RemoveLayer {
                id: LayerId::intern("cv_ghost"),
            })
            .unwrap_err();
        assert_eq!(err, EditError::NotFound(LayerId::intern("cv_ghost")));
    }

    #[test]
    fn set_background_commits_dimensions_atomically() {
        let mut canvas = Canvas::new();
        let mut backend = RecordingBackend::new();

        canvas
            .apply(
                &mut backend,
                EditMutation::SetBackground {
                    image: Some(Box::new(BackgroundImage {
                        source: "data:image/png;base64,AA".into(),
                        original_width: 1600,
                        original_height: 900,
                    })),
                    canvas_width: 800,
                    canvas_height: 450,
                },
            )
            .unwrap();

        assert_eq!(canvas.canvas_width, 800);
        let state = canvas.to_state(None);
        assert_eq!(state.original_width, 1600);
        assert_eq!(state.export_scale(), 2.0);
    }
}
