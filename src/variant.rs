//! Variants describe one customizable image: its background, output size,
//! and how the name is laid out on it.
//!
//! Variants are plain data and can be loaded from TOML:
//!
//! ```toml
//! name = "team-banner"
//! background = "assets/team.jpg"
//! export_filename = "team-banner.png"
//!
//! [surface]
//! kind = "fixed"
//! width = 800
//! height = 200
//! scale_factor = 2.0
//!
//! [layout]
//! anchor = { x = 0.3, y = 0.5 }
//!
//! [effect]
//! foreground = "#ffffff"
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    effect::{ShadowStyle, TextEffect},
    error::{SurfaceError, VariantError},
    layout::{Fraction, SizeBasis, TextLayout},
    viewport::ViewportPolicy,
    Color, LayerInfo,
};

/// How the render surface's pixel size is chosen.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SurfaceSizing {
    /// Match the background image's resolution.
    Native,
    /// A fixed logical size rendered at `scale_factor` pixels per logical pixel.
    Fixed {
        width: u32,
        height: u32,
        scale_factor: f32,
    },
}

impl SurfaceSizing {
    /// Describes the surface for a background of the given size.
    pub fn layer_info(&self, image_width: u32, image_height: u32) -> Result<LayerInfo, SurfaceError> {
        match *self {
            SurfaceSizing::Native => LayerInfo::new(image_width, image_height, 1.),
            SurfaceSizing::Fixed {
                width,
                height,
                scale_factor,
            } => {
                if !scale_factor.is_finite() || scale_factor <= 0. {
                    return Err(SurfaceError::InvalidScaleFactor(scale_factor));
                }
                LayerInfo::new(
                    (width as f32 * scale_factor).round() as u32,
                    (height as f32 * scale_factor).round() as u32,
                    scale_factor,
                )
            }
        }
    }
}

/// A customizable image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Variant {
    pub name: String,
    /// Background image path, relative to the asset root
    pub background: PathBuf,
    pub surface: SurfaceSizing,
    pub viewport: ViewportPolicy,
    pub layout: TextLayout,
    pub effect: TextEffect,
    /// Preferred font family; the bundled font is used if it is unset or unavailable
    #[serde(default)]
    pub font_family: Option<String>,
    /// Name of the downloaded file
    pub export_filename: String,
}

impl Default for Variant {
    fn default() -> Self {
        Self::jersey_banner()
    }
}

impl Variant {
    /// A wide team banner with the name set left of center in gold.
    pub fn jersey_banner() -> Self {
        Self {
            name: "jersey-banner".into(),
            background: PathBuf::from("assets/falcons.jpg"),
            surface: SurfaceSizing::Fixed {
                width: 800,
                height: 200,
                scale_factor: 2.,
            },
            viewport: ViewportPolicy::default(),
            layout: TextLayout {
                size_basis: SizeBasis::Height,
                size_fraction: 0.2,
                min_font_size: 12.,
                max_font_size: 72.,
                max_width_fraction: 0.6,
                anchor: Fraction::new(0.5 - 170. / 800., 0.5),
                mobile_nudge: Fraction::default(),
                mobile_breakpoint: 768.,
            },
            effect: TextEffect::default(),
            font_family: Some("Amiri".into()),
            export_filename: "falcon-header.png".into(),
        }
    }

    /// A greeting card rendered at the card image's own resolution,
    /// with the name centered below the middle in white.
    pub fn holiday_card() -> Self {
        Self {
            name: "holiday-card".into(),
            background: PathBuf::from("assets/greeting-card.jpg"),
            surface: SurfaceSizing::Native,
            viewport: ViewportPolicy {
                min_width: 260.,
                max_width: 700.,
                aspect_ratio: 1.4,
                width_fraction: 0.9,
                height_fraction: 0.75,
            },
            layout: TextLayout {
                size_basis: SizeBasis::Width,
                size_fraction: 0.07,
                min_font_size: 14.,
                max_font_size: 160.,
                max_width_fraction: 0.6,
                anchor: Fraction::new(0.5, 0.62),
                mobile_nudge: Fraction::new(0., 0.03),
                mobile_breakpoint: 768.,
            },
            effect: TextEffect {
                foreground: Color::WHITE,
                shadow: ShadowStyle::default(),
            },
            font_family: None,
            export_filename: "greeting-card.png".into(),
        }
    }

    /// Looks up a built-in variant by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "jersey" | "jersey-banner" => Some(Self::jersey_banner()),
            "holiday" | "holiday-card" => Some(Self::holiday_card()),
            _ => None,
        }
    }

    /// Parses a variant from TOML. Missing fields take the jersey banner's
    /// values, except `font_family`, which defaults to the bundled font.
    pub fn from_toml_str(source: &str) -> Result<Self, VariantError> {
        let variant: Variant = toml::from_str(source)?;
        variant.validate()?;
        Ok(variant)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, VariantError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| VariantError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), VariantError> {
        if self.export_filename.is_empty()
            || self.export_filename.contains(['/', '\\'])
        {
            return Err(VariantError::Invalid(format!(
                "export filename '{}' must be a plain file name",
                self.export_filename
            )));
        }
        if let SurfaceSizing::Fixed {
            width,
            height,
            scale_factor,
        } = self.surface
        {
            if width == 0 || height == 0 || !(scale_factor > 0. && scale_factor.is_finite()) {
                return Err(VariantError::Invalid(format!(
                    "fixed surface {}x{}@{} is invalid",
                    width, height, scale_factor
                )));
            }
        }
        self.viewport.validate().map_err(VariantError::Invalid)?;
        self.layout.validate().map_err(VariantError::Invalid)?;
        Ok(())
    }
}
