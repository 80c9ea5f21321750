//! The layer registry: the authoritative ordered list of text layers.
//!
//! Layers are stored in a flat `Vec` whose index IS the z-order, so the
//! "dense permutation of `0..N-1`" invariant holds by construction —
//! insertions, removals and reorders renumber siblings implicitly.
//!
//! The registry is pure data. Mirroring mutations into the live scene
//! backend and triggering persistence is the orchestrator's job.

use crate::error::EditError;
use crate::id::LayerId;
use crate::model::{Layer, LayerPatch};

#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    layers: Vec<Layer>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Append a layer at the top of the stack (z-order = current max + 1).
    pub fn add(&mut self, layer: Layer) -> Result<(), EditError> {
        let index = self.layers.len();
        self.insert(index, layer)
    }

    /// Insert a layer at a specific z-order, shifting layers above it up
    /// by one slot. Used by `add` and by delete-undo, which must restore
    /// a layer at its original position.
    pub fn insert(&mut self, index: usize, layer: Layer) -> Result<(), EditError> {
        if self.contains(layer.id) {
            return Err(EditError::DuplicateId(layer.id));
        }
        if index > self.layers.len() {
            return Err(EditError::IndexOutOfRange {
                index,
                len: self.layers.len(),
            });
        }
        self.layers.insert(index, layer);
        Ok(())
    }

    /// Remove a layer, renumbering the rest. Returns the removed layer
    /// and the z-order it occupied, which together form the inverse.
    pub fn remove(&mut self, id: LayerId) -> Result<(Layer, usize), EditError> {
        let index = self.index_of(id).ok_or(EditError::NotFound(id))?;
        Ok((self.layers.remove(index), index))
    }

    /// Shallow-merge a partial edit into a layer. Returns the reverse
    /// patch (the prior values of every changed field).
    pub fn update(&mut self, id: LayerId, patch: &LayerPatch) -> Result<LayerPatch, EditError> {
        let index = self.index_of(id).ok_or(EditError::NotFound(id))?;
        let layer = &mut self.layers[index];
        let reverse = patch.reverse_of(layer);
        patch.apply_to(layer);
        Ok(reverse)
    }

    /// Move the layer at `from` to position `to`, shifting everything
    /// between by one slot: `[A,B,C].reorder(0, 2)` yields `[B,C,A]`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), EditError> {
        let len = self.layers.len();
        if from >= len {
            return Err(EditError::IndexOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(EditError::IndexOutOfRange { index: to, len });
        }
        if from != to {
            let layer = self.layers.remove(from);
            self.layers.insert(to, layer);
        }
        Ok(())
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// All layers, ascending by z-order — the contract the renderer and
    /// the layer panel depend on.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// The z-order of a layer, if present.
    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Drop every layer. Used by reset and load.
    pub fn clear(&mut self) {
        self.layers.clear();
    }

    /// Replace the whole stack from a persisted snapshot, keeping the
    /// first occurrence of any duplicated id. Every kept id is reserved
    /// so the id generator cannot re-issue it later in this session.
    pub fn replace_all(&mut self, layers: Vec<Layer>) {
        self.layers.clear();
        for layer in layers {
            if self.contains(layer.id) {
                log::warn!("dropping duplicate layer id {} from snapshot", layer.id);
                continue;
            }
            layer.id.reserve();
            self.layers.push(layer);
        }
    }
}
