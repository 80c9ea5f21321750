//! Typed errors for registry and editing operations.
//!
//! Validation errors are raised synchronously, before any mutation —
//! a failed operation never leaves the registry partially applied.

use crate::id::LayerId;
use thiserror::Error;

/// Errors from layer-editing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EditError {
    /// The operation referenced a layer id that does not exist.
    #[error("layer {0} not found")]
    NotFound(LayerId),

    /// An `add` collided with an existing id. Structurally impossible
    /// while ids come from `LayerId::generate` (restored snapshot ids
    /// are reserved), but checked regardless.
    #[error("duplicate layer id {0}")]
    DuplicateId(LayerId),

    /// A reorder referenced a position outside the current stack.
    #[error("index {index} out of range for {len} layers")]
    IndexOutOfRange { index: usize, len: usize },
}
