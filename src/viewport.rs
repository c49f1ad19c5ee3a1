//! Responsive display sizing.

use glam::{vec2, Vec2};
use serde::{Deserialize, Serialize};

/// The on-screen (CSS) size of the render surface.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewportState {
    pub display_width: f32,
    pub display_height: f32,
}

impl ViewportState {
    pub fn new(display_width: f32, display_height: f32) -> Self {
        Self {
            display_width,
            display_height,
        }
    }

    pub fn size(&self) -> Vec2 {
        vec2(self.display_width, self.display_height)
    }

    pub fn device_class(&self, mobile_breakpoint: f32) -> DeviceClass {
        if self.display_width < mobile_breakpoint {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }
}

/// Coarse device class used to nudge text placement.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

/// Maps a window size to a display size.
///
/// The display width is the largest width that fits in the given
/// fractions of the window, clamped to `[min_width, max_width]`. The height
/// always follows from the fixed aspect ratio.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportPolicy {
    pub min_width: f32,
    pub max_width: f32,
    /// Width divided by height
    pub aspect_ratio: f32,
    /// Share of the window width the surface may take
    pub width_fraction: f32,
    /// Share of the window height the surface may take
    pub height_fraction: f32,
}

impl Default for ViewportPolicy {
    fn default() -> Self {
        Self {
            min_width: 280.,
            max_width: 800.,
            aspect_ratio: 4.,
            width_fraction: 0.9,
            height_fraction: 0.6,
        }
    }
}

impl ViewportPolicy {
    /// Computes the display size for a window of the given size.
    ///
    /// Degenerate window sizes (zero, negative, NaN) yield the minimum size.
    pub fn fit(&self, window: Vec2) -> ViewportState {
        let available_width = sanitize(window.x) * self.width_fraction;
        let available_height = sanitize(window.y) * self.height_fraction;

        let width = available_width
            .min(available_height * self.aspect_ratio)
            .clamp(self.min_width, self.max_width);
        ViewportState::new(width, width / self.aspect_ratio)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        let positive = |v: f32| v.is_finite() && v > 0.;
        if !positive(self.min_width) || !positive(self.max_width) {
            return Err("viewport widths must be positive".into());
        }
        if self.min_width > self.max_width {
            return Err(format!(
                "viewport min_width {} exceeds max_width {}",
                self.min_width, self.max_width
            ));
        }
        if !positive(self.aspect_ratio) {
            return Err("viewport aspect_ratio must be positive".into());
        }
        if !positive(self.width_fraction) || !positive(self.height_fraction) {
            return Err("viewport fractions must be positive".into());
        }
        Ok(())
    }
}

fn sanitize(length: f32) -> f32 {
    if length.is_finite() {
        length.max(0.)
    } else {
        0.
    }
}
