//! RGBA colours in the `[0, 1]` channel convention used by the point overlay.
//!
//! Colours are kept as floats so that classification palettes can be written
//! to YAML exactly as the researcher typed them, and are converted to
//! [`Color32`] only at render time.

use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba(pub [f32; 4]);

impl Rgba {
    pub const BLACK: Rgba = Rgba([0.0, 0.0, 0.0, 1.0]);
    pub const RED: Rgba = Rgba([1.0, 0.0, 0.0, 1.0]);
    pub const GREEN: Rgba = Rgba([0.0, 1.0, 0.0, 1.0]);
    pub const BLUE: Rgba = Rgba([0.0, 0.0, 1.0, 1.0]);
    pub const YELLOW: Rgba = Rgba([1.0, 1.0, 0.0, 1.0]);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self([r, g, b, a])
    }

    pub fn r(&self) -> f32 {
        self.0[0]
    }

    pub fn g(&self) -> f32 {
        self.0[1]
    }

    pub fn b(&self) -> f32 {
        self.0[2]
    }

    pub fn a(&self) -> f32 {
        self.0[3]
    }

    /// Same colour with a replaced alpha channel.
    pub fn with_alpha(self, a: f32) -> Self {
        Self([self.0[0], self.0[1], self.0[2], a])
    }

    /// Convert to egui's 8-bit colour. Channels outside `[0, 1]` are clamped.
    pub fn to_color32(self) -> Color32 {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color32::from_rgba_unmultiplied(c(self.0[0]), c(self.0[1]), c(self.0[2]), c(self.0[3]))
    }
}

impl From<[f32; 4]> for Rgba {
    fn from(v: [f32; 4]) -> Self {
        Rgba(v)
    }
}

impl From<Rgba> for Color32 {
    fn from(c: Rgba) -> Self {
        c.to_color32()
    }
}

/// Colours used while classifying fibres. Defaults follow the usual
/// red/blue convention for deficient/positive at low alpha, so
/// that dense clouds stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassPalette {
    pub base: Rgba,
    pub deficient: Rgba,
    pub positive: Rgba,
    pub contour: Rgba,
    pub alpha: f32,
}

impl Default for ClassPalette {
    fn default() -> Self {
        Self {
            base: Rgba::BLACK,
            deficient: Rgba::RED,
            positive: Rgba::BLUE,
            contour: Rgba::YELLOW,
            alpha: 0.2,
        }
    }
}

impl ClassPalette {
    pub fn base(&self) -> Rgba {
        self.base.with_alpha(self.alpha)
    }

    pub fn deficient(&self) -> Rgba {
        self.deficient.with_alpha(self.alpha)
    }

    pub fn positive(&self) -> Rgba {
        self.positive.with_alpha(self.alpha)
    }
}
