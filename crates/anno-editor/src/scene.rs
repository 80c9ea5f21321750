//! Scene backend: the seam to the external rendering collaborator.
//!
//! The registry and the live rendered scene are two representations of
//! one logical state. Every mutation the editor applies to the registry
//! is mirrored through this trait in the same synchronous step, so the
//! visual canvas can never drift from the logical model.

use anno_core::id::LayerId;
use anno_core::model::{BackgroundImage, Layer, LayerPatch};

/// Operations the editor core consumes from the rendering collaborator.
///
/// Implementations wrap the real canvas library (object creation,
/// property sets, render triggers). The core never talks to the canvas
/// any other way.
pub trait SceneBackend {
    /// Create the live text object for `layer` at z-order `index`.
    fn insert_text(&mut self, index: usize, layer: &Layer);

    /// Destroy the live object for `id`.
    fn remove_text(&mut self, id: LayerId);

    /// Apply a property patch to the live object for `id`.
    fn update_text(&mut self, id: LayerId, patch: &LayerPatch);

    /// Move the object at z-order `from` to `to`, shifting the rest.
    fn reorder(&mut self, from: usize, to: usize);

    /// Replace (or clear) the background image.
    fn set_background(&mut self, image: Option<&BackgroundImage>);

    /// Resize the displayed canvas.
    fn resize_canvas(&mut self, width: u32, height: u32);

    /// Remove every object and the background.
    fn clear(&mut self);

    /// Request a repaint after a batch of property sets.
    fn request_render(&mut self);

    /// One-shot raster snapshot at `scale` (PNG bytes). Not part of the
    /// editing state — used only by the export boundary.
    fn rasterize(&mut self, scale: f32) -> Vec<u8>;
}

/// Test double that records every call as a readable line.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<String>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls recorded so far, excluding render requests.
    pub fn mutations(&self) -> Vec<&str> {
        self.calls
            .iter()
            .map(String::as_str)
            .filter(|c| *c != "render")
            .collect()
    }
}

impl SceneBackend for RecordingBackend {
    fn insert_text(&mut self, index: usize, layer: &Layer) {
        self.calls.push(format!("insert {} @{index}", layer.id));
    }

    fn remove_text(&mut self, id: LayerId) {
        self.calls.push(format!("remove {id}"));
    }

    fn update_text(&mut self, id: LayerId, _patch: &LayerPatch) {
        self.calls.push(format!("update {id}"));
    }

    fn reorder(&mut self, from: usize, to: usize) {
        self.calls.push(format!("reorder {from}->{to}"));
    }

    fn set_background(&mut self, image: Option<&BackgroundImage>) {
        match image {
            Some(img) => self.calls.push(format!(
                "background {}x{}",
                img.original_width, img.original_height
            )),
            None => self.calls.push("background none".into()),
        }
    }

    fn resize_canvas(&mut self, width: u32, height: u32) {
        self.calls.push(format!("resize {width}x{height}"));
    }

    fn clear(&mut self) {
        self.calls.push("clear".into());
    }

    fn request_render(&mut self) {
        self.calls.push("render".into());
    }

    fn rasterize(&mut self, scale: f32) -> Vec<u8> {
        self.calls.push(format!("rasterize x{scale}"));
        Vec::new()
    }
}
