//! Core data model for annotation documents.
//!
//! A document is a background image plus an ordered stack of text layers.
//! The stack order IS the z-order: index 0 renders at the back, the last
//! layer at the front. Styles live on each layer as a concrete property
//! bundle; `LayerPatch` is the all-`Option` record used for partial edits
//! and for capturing the reverse of an edit.

use crate::id::LayerId;
use serde::{Deserialize, Serialize};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 | 4 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                let a = if bytes.len() == 4 {
                    hex_val(bytes[3])?
                } else {
                    15
                };
                Some(Self::rgba(
                    (r * 17) as f32 / 255.0,
                    (g * 17) as f32 / 255.0,
                    (b * 17) as f32 / 255.0,
                    (a * 17) as f32 / 255.0,
                ))
            }
            6 | 8 => {
                let r = hex_val(bytes[0])? << 4 | hex_val(bytes[1])?;
                let g = hex_val(bytes[2])? << 4 | hex_val(bytes[3])?;
                let b = hex_val(bytes[4])? << 4 | hex_val(bytes[5])?;
                let a = if bytes.len() == 8 {
                    hex_val(bytes[6])? << 4 | hex_val(bytes[7])?
                } else {
                    255
                };
                Some(Self::rgba(
                    r as f32 / 255.0,
                    g as f32 / 255.0,
                    b as f32 / 255.0,
                    a as f32 / 255.0,
                ))
            }
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let r = (self.r * 255.0).round() as u8;
        let g = (self.g * 255.0).round() as u8;
        let b = (self.b * 255.0).round() as u8;
        let a = (self.a * 255.0).round() as u8;

        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

// ─── Text styling ────────────────────────────────────────────────────────

/// Drop shadow behind the text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: Color,
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// The full text-property bundle carried by every layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f32,
    pub font_weight: u16, // 100..900
    pub fill: Color,
    pub opacity: f32, // 0.0 .. 1.0
    pub align: TextAlign,
    pub line_height: f32,
    pub char_spacing: f32,
    pub shadow: Option<Shadow>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Inter".into(),
            font_size: 24.0,
            font_weight: 400,
            fill: Color::BLACK,
            opacity: 1.0,
            align: TextAlign::Left,
            line_height: 1.2,
            char_spacing: 0.0,
            shadow: None,
        }
    }
}

// ─── Layers ──────────────────────────────────────────────────────────────

/// One text overlay. The z-order index is not stored here — it is the
/// layer's position in the registry's ordered list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Stable unique id, generated at creation, never reused.
    pub id: LayerId,
    /// Display name shown in the layer panel.
    pub name: String,
    /// The text content.
    pub content: String,
    /// Position on the canvas (top-left of the text box).
    pub x: f32,
    pub y: f32,
    /// Wrap width of the text box.
    pub width: f32,
    pub visible: bool,
    pub locked: bool,
    pub style: TextStyle,
}

impl Layer {
    /// Build the "add text" default: placeholder content, default style.
    /// `ordinal` feeds the display name (`Text 3`).
    pub fn new_text(id: LayerId, ordinal: usize) -> Self {
        Self {
            id,
            name: format!("Text {ordinal}"),
            content: "Double-click to edit".into(),
            x: 40.0,
            y: 40.0,
            width: 240.0,
            visible: true,
            locked: false,
            style: TextStyle::default(),
        }
    }
}

/// Partial layer edit: every field optional, applied as a shallow merge.
/// `shadow` uses a nested `Option` so a patch can explicitly clear it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerPatch {
    pub name: Option<String>,
    pub content: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    pub font_weight: Option<u16>,
    pub fill: Option<Color>,
    pub opacity: Option<f32>,
    pub align: Option<TextAlign>,
    pub line_height: Option<f32>,
    pub char_spacing: Option<f32>,
    pub shadow: Option<Option<Shadow>>,
}

impl LayerPatch {
    /// Apply the patch to `layer`, overwriting only `Some` fields.
    pub fn apply_to(&self, layer: &mut Layer) {
        if let Some(v) = &self.name {
            layer.name = v.clone();
        }
        if let Some(v) = &self.content {
            layer.content = v.clone();
        }
        if let Some(v) = self.x {
            layer.x = v;
        }
        if let Some(v) = self.y {
            layer.y = v;
        }
        if let Some(v) = self.width {
            layer.width = v;
        }
        if let Some(v) = self.visible {
            layer.visible = v;
        }
        if let Some(v) = self.locked {
            layer.locked = v;
        }
        if let Some(v) = &self.font_family {
            layer.style.font_family = v.clone();
        }
        if let Some(v) = self.font_size {
            layer.style.font_size = v;
        }
        if let Some(v) = self.font_weight {
            layer.style.font_weight = v;
        }
        if let Some(v) = self.fill {
            layer.style.fill = v;
        }
        if let Some(v) = self.opacity {
            layer.style.opacity = v;
        }
        if let Some(v) = self.align {
            layer.style.align = v;
        }
        if let Some(v) = self.line_height {
            layer.style.line_height = v;
        }
        if let Some(v) = self.char_spacing {
            layer.style.char_spacing = v;
        }
        if let Some(v) = self.shadow {
            layer.style.shadow = v;
        }
    }

    /// Capture the current values of every field this patch would change —
    /// the exact inverse patch for undo.
    pub fn reverse_of(&self, layer: &Layer) -> LayerPatch {
        LayerPatch {
            name: self.name.as_ref().map(|_| layer.name.clone()),
            content: self.content.as_ref().map(|_| layer.content.clone()),
            x: self.x.map(|_| layer.x),
            y: self.y.map(|_| layer.y),
            width: self.width.map(|_| layer.width),
            visible: self.visible.map(|_| layer.visible),
            locked: self.locked.map(|_| layer.locked),
            font_family: self
                .font_family
                .as_ref()
                .map(|_| layer.style.font_family.clone()),
            font_size: self.font_size.map(|_| layer.style.font_size),
            font_weight: self.font_weight.map(|_| layer.style.font_weight),
            fill: self.fill.map(|_| layer.style.fill),
            opacity: self.opacity.map(|_| layer.style.opacity),
            align: self.align.map(|_| layer.style.align),
            line_height: self.line_height.map(|_| layer.style.line_height),
            char_spacing: self.char_spacing.map(|_| layer.style.char_spacing),
            shadow: self.shadow.map(|_| layer.style.shadow),
        }
    }

    /// True if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == LayerPatch::default()
    }
}

// ─── Background & aggregate ──────────────────────────────────────────────

/// The background image: at most one per document, always beneath all
/// layers, no z-order of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundImage {
    /// Decoded bitmap reference as a data URL.
    pub source: String,
    /// Original pixel dimensions (used for export scaling).
    pub original_width: u32,
    pub original_height: u32,
}

/// The aggregate root: exactly what the persistence gateway serializes
/// and what a `load` intention restores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasState {
    pub background: Option<BackgroundImage>,
    /// Layers in ascending z-order.
    pub layers: Vec<Layer>,
    pub selected: Option<LayerId>,
    /// Displayed canvas dimensions (on-screen fit).
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Original image dimensions (export scaling).
    pub original_width: u32,
    pub original_height: u32,
}

impl CanvasState {
    /// Uniform scale factor for export: the canvas is rasterized at the
    /// larger of the two axis ratios so the output covers the original
    /// pixel dimensions.
    pub fn export_scale(&self) -> f32 {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return 1.0;
        }
        let sx = self.original_width as f32 / self.canvas_width as f32;
        let sy = self.original_height as f32 / self.canvas_height as f32;
        sx.max(sy)
    }
}
