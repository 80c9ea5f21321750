//! Adapter for the rendering collaborator's change-event stream.
//!
//! Direct-manipulation gestures (drag, resize, inline text edit) arrive
//! from the canvas library as object-level events *after* the visual
//! change already happened. The adapter turns each event into the same
//! command path used by explicit intentions, so history, persistence and
//! the z-order invariant hold regardless of mutation source.

use anno_core::id::LayerId;
use anno_core::model::LayerPatch;

/// Object-level change events emitted by the rendering collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// A drag gesture finished at the given position.
    ObjectMoved { id: LayerId, x: f32, y: f32 },
    /// A resize gesture changed the text-box wrap width.
    ObjectResized { id: LayerId, width: f32 },
    /// Inline text editing committed new content.
    TextEdited { id: LayerId, content: String },
    /// Selection created or switched to another object.
    SelectionSet { id: LayerId },
    SelectionCleared,
}

impl SceneEvent {
    /// The property patch a mutation event translates to, with a
    /// history description. Selection events carry no patch — they are
    /// cursor state, not edits.
    pub(crate) fn to_patch(&self) -> Option<(LayerId, LayerPatch, &'static str)> {
        match self {
            SceneEvent::ObjectMoved { id, x, y } => Some((
                *id,
                LayerPatch {
                    x: Some(*x),
                    y: Some(*y),
                    ..Default::default()
                },
                "Move layer",
            )),
            SceneEvent::ObjectResized { id, width } => Some((
                *id,
                LayerPatch {
                    width: Some(*width),
                    ..Default::default()
                },
                "Resize layer",
            )),
            SceneEvent::TextEdited { id, content } => Some((
                *id,
                LayerPatch {
                    content: Some(content.clone()),
                    ..Default::default()
                },
                "Edit text",
            )),
            SceneEvent::SelectionSet { .. } | SceneEvent::SelectionCleared => None,
        }
    }
}
