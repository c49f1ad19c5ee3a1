use glam::{uvec2, vec2, UVec2, Vec2};

use crate::error::SurfaceError;

slotmap::new_key_type! {
    /// ID of a render surface owned by a backend.
    pub struct LayerId;
}

/// Describes a render surface.
///
/// A layer has two independent sizes. The _physical_ size is the
/// pixel buffer that is drawn to and exported. The _display_ size is how
/// large the layer appears on screen (the CSS size), which follows the
/// viewport and never affects pixel data.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInfo {
    physical_width: u32,
    physical_height: u32,
    hidpi_factor: f32,
    display_size: Vec2,
}

impl LayerInfo {
    pub fn new(
        physical_width: u32,
        physical_height: u32,
        hidpi_factor: f32,
    ) -> Result<Self, SurfaceError> {
        if physical_width == 0 || physical_height == 0 {
            return Err(SurfaceError::EmptyDimensions {
                width: physical_width,
                height: physical_height,
            });
        }
        if !hidpi_factor.is_finite() || hidpi_factor <= 0. {
            return Err(SurfaceError::InvalidScaleFactor(hidpi_factor));
        }
        let mut info = Self {
            physical_width,
            physical_height,
            hidpi_factor,
            display_size: Vec2::ZERO,
        };
        info.display_size = info.logical_size();
        Ok(info)
    }

    pub fn physical_width(&self) -> u32 {
        self.physical_width
    }

    pub fn physical_height(&self) -> u32 {
        self.physical_height
    }

    pub fn physical_size(&self) -> UVec2 {
        uvec2(self.physical_width(), self.physical_height())
    }

    pub fn logical_width(&self) -> f32 {
        self.physical_width() as f32 / self.hidpi_factor
    }

    pub fn logical_height(&self) -> f32 {
        self.physical_height() as f32 / self.hidpi_factor
    }

    pub fn logical_size(&self) -> Vec2 {
        vec2(self.logical_width(), self.logical_height())
    }

    pub fn hidpi_factor(&self) -> f32 {
        self.hidpi_factor
    }

    /// The on-screen size of the layer.
    ///
    /// Defaults to the logical size until set.
    pub fn display_size(&self) -> Vec2 {
        self.display_size
    }

    pub fn set_display_size(&mut self, size: Vec2) {
        self.display_size = size;
    }

    /// Whether a layer with `other`'s pixel buffer could be reused
    /// in place of this one.
    pub(crate) fn same_buffer(&self, other: &LayerInfo) -> bool {
        self.physical_size() == other.physical_size() && self.hidpi_factor == other.hidpi_factor
    }
}
