//! Annotate editor core: undoable command history over a layer scene,
//! selection tracking, and debounced persistence.
//!
//! The UI layer talks only to [`store::EditorStore`]; the rendering
//! collaborator sits behind [`scene::SceneBackend`]; durable storage
//! sits behind [`persist::SnapshotStore`].

pub mod canvas;
pub mod commands;
pub mod debounce;
pub mod events;
pub mod persist;
pub mod scene;
pub mod selection;
pub mod store;

pub use canvas::{Canvas, EditMutation};
pub use commands::CommandHistory;
pub use events::SceneEvent;
pub use persist::{MemoryStore, PersistenceGateway, SnapshotStore};
pub use scene::{RecordingBackend, SceneBackend};
pub use selection::SelectionTracker;
pub use store::EditorStore;
