//! Font sizing and text placement.
//!
//! Every length here is derived from the surface size, so a layout
//! renders the same way at any output resolution.

use glam::{vec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::{
    text::ShapedText,
    viewport::{DeviceClass, ViewportState},
};

/// Which surface dimension the font size is proportional to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeBasis {
    Width,
    Height,
}

/// A point given as fractions of the surface width and height.
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Fraction {
    pub x: f32,
    pub y: f32,
}

impl Fraction {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn of(&self, size: Vec2) -> Vec2 {
        vec2(self.x, self.y) * size
    }
}

/// Policy for sizing and placing the text.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextLayout {
    pub size_basis: SizeBasis,
    /// Font size as a fraction of the basis dimension
    pub size_fraction: f32,
    pub min_font_size: f32,
    pub max_font_size: f32,
    /// Widest the text may be, as a fraction of the surface width
    pub max_width_fraction: f32,
    /// Center of the text
    pub anchor: Fraction,
    /// Added to `anchor` on mobile viewports
    pub mobile_nudge: Fraction,
    /// Display widths below this are considered mobile
    pub mobile_breakpoint: f32,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            size_basis: SizeBasis::Height,
            size_fraction: 0.2,
            min_font_size: 12.,
            max_font_size: 96.,
            max_width_fraction: 0.6,
            anchor: Fraction::new(0.5, 0.5),
            mobile_nudge: Fraction::default(),
            mobile_breakpoint: 768.,
        }
    }
}

/// The result of laying out a run of text on a surface.
#[derive(Debug, Clone)]
pub struct TextPlacement {
    /// The text at its final font size
    pub text: ShapedText,
    /// Center point of the text in logical pixels
    pub anchor: Vec2,
    /// Start of the baseline in logical pixels
    pub origin: Vec2,
}

impl TextLayout {
    /// The font size before fitting to the available width.
    pub fn base_font_size(&self, surface: Vec2) -> f32 {
        let basis = match self.size_basis {
            SizeBasis::Width => surface.x,
            SizeBasis::Height => surface.y,
        };
        (basis * self.size_fraction).clamp(self.min_font_size, self.max_font_size)
    }

    /// Shrinks `font_size` so text measuring `text_width` at that size
    /// stays within `max_width_fraction` of the surface width.
    ///
    /// The result may be smaller than `min_font_size`; overflowing the
    /// surface is worse than small text.
    pub fn fit_font_size(&self, font_size: f32, text_width: f32, surface: Vec2) -> f32 {
        let max_width = surface.x * self.max_width_fraction;
        if text_width > max_width && text_width > 0. {
            font_size * (max_width / text_width)
        } else {
            font_size
        }
    }

    /// The text's center point in logical pixels.
    pub fn anchor(&self, surface: Vec2, device: DeviceClass) -> Vec2 {
        let mut anchor = self.anchor.of(surface);
        if device == DeviceClass::Mobile {
            anchor += self.mobile_nudge.of(surface);
        }
        anchor
    }

    /// Sizes and positions `text` on a surface of the given logical size.
    pub fn place(
        &self,
        text: &ShapedText,
        surface: Vec2,
        viewport: &ViewportState,
    ) -> TextPlacement {
        let base = text.with_font_size(self.base_font_size(surface));
        let font_size = self.fit_font_size(base.font_size(), base.width(), surface);
        let text = base.with_font_size(font_size);

        let anchor = self.anchor(surface, viewport.device_class(self.mobile_breakpoint));
        TextPlacement {
            origin: text.origin_centered_at(anchor),
            anchor,
            text,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if !(self.min_font_size > 0. && self.min_font_size <= self.max_font_size) {
            return Err(format!(
                "font size bounds [{}, {}] are invalid",
                self.min_font_size, self.max_font_size
            ));
        }
        if !(self.size_fraction > 0. && self.max_width_fraction > 0.) {
            return Err("size fractions must be positive".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Font;

    const BANNER: Vec2 = Vec2::new(800., 200.);

    #[test]
    fn font_size_follows_basis_and_clamps() {
        let layout = TextLayout::default();
        assert_eq!(layout.base_font_size(BANNER), 40.);
        assert_eq!(layout.base_font_size(vec2(800., 20.)), 12.);
        assert_eq!(layout.base_font_size(vec2(800., 2000.)), 96.);

        let layout = TextLayout {
            size_basis: SizeBasis::Width,
            size_fraction: 0.05,
            ..Default::default()
        };
        assert_eq!(layout.base_font_size(BANNER), 40.);
    }

    #[test]
    fn wide_text_shrinks_to_fit() {
        let layout = TextLayout::default();
        assert_eq!(layout.fit_font_size(40., 300., BANNER), 40.);
        assert!((layout.fit_font_size(40., 960., BANNER) - 20.).abs() < 1e-3);
    }

    #[test]
    fn anchor_is_fractional_and_nudged_on_mobile() {
        let layout = TextLayout {
            anchor: Fraction::new(0.25, 0.5),
            mobile_nudge: Fraction::new(0.0, 0.1),
            ..Default::default()
        };
        assert_eq!(layout.anchor(BANNER, DeviceClass::Desktop), vec2(200., 100.));
        assert_eq!(layout.anchor(BANNER, DeviceClass::Mobile), vec2(200., 120.));
        assert_eq!(
            layout.anchor(BANNER * 2., DeviceClass::Desktop),
            vec2(400., 200.)
        );
    }

    #[test]
    fn long_names_fit_within_the_limit() {
        let layout = TextLayout::default();
        let text = ShapedText::shape(&Font::bundled(), "BARTHOLOMEW MONTGOMERY", 1.);
        let placement = layout.place(&text, BANNER, &ViewportState::new(800., 200.));
        assert!(placement.text.width() <= BANNER.x * 0.6 + 1e-3);
        assert!(placement.text.font_size() < 40.);
        assert!((placement.origin.x + placement.text.width() / 2. - 400.).abs() < 1e-3);
    }
}
