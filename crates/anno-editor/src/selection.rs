//! Selection tracker: which single layer is the target of property edits.
//!
//! Selection is UI cursor state — never recorded in the command history.
//! Selecting an id that does not exist is a caller bug and is rejected,
//! not silently downgraded to "nothing selected".

use anno_core::error::EditError;
use anno_core::id::LayerId;
use anno_core::registry::LayerRegistry;

#[derive(Debug, Default)]
pub struct SelectionTracker {
    selected: Option<LayerId>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the active layer (`None` clears). Non-null ids are validated
    /// against the registry; on rejection the selection is unchanged.
    pub fn select(
        &mut self,
        registry: &LayerRegistry,
        id: Option<LayerId>,
    ) -> Result<(), EditError> {
        if let Some(id) = id
            && !registry.contains(id)
        {
            return Err(EditError::NotFound(id));
        }
        self.selected = id;
        Ok(())
    }

    pub fn selected_id(&self) -> Option<LayerId> {
        self.selected
    }

    /// Drop the selection if its layer no longer exists (after deletes,
    /// undo of an add, or a load).
    pub fn prune(&mut self, registry: &LayerRegistry) {
        if let Some(id) = self.selected
            && !registry.contains(id)
        {
            self.selected = None;
        }
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}
