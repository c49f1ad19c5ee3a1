use std::sync::Arc;

use fontdb::{Family, Stretch, Style, Weight};
use rustc_hash::FxHashMap;

use crate::error::MalformedFont;

/// DejaVu Sans Bold. Covers Latin and Arabic, which is what names
/// entered on the banner are written in.
static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

/// A parsed font face. Cheap to clone.
#[derive(Clone)]
pub struct Font {
    data: Arc<[u8]>,
    index: u32,
}

impl Font {
    /// Parses a TTF/OTF font from its file contents.
    pub fn from_data(data: impl Into<Arc<[u8]>>) -> Result<Self, MalformedFont> {
        Self::from_data_and_index(data.into(), 0)
    }

    fn from_data_and_index(data: Arc<[u8]>, index: u32) -> Result<Self, MalformedFont> {
        let face = rustybuzz::Face::from_slice(&data, index).ok_or(MalformedFont)?;
        if face.units_per_em() == 0 {
            return Err(MalformedFont);
        }
        Ok(Self { data, index })
    }

    /// The font compiled into the crate.
    pub fn bundled() -> Self {
        Self::from_data(BUNDLED_FONT).expect("bundled font is malformed")
    }

    /// The main entrypoint to access font data through `rustybuzz`.
    pub(crate) fn face(&self) -> rustybuzz::Face<'_> {
        rustybuzz::Face::from_slice(&self.data, self.index)
            .expect("font was validated when it was loaded")
    }
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font")
            .field("len", &self.data.len())
            .field("index", &self.index)
            .finish()
    }
}

/// Stores all fonts available for drawing text.
///
/// Families are looked up by name with `fontdb`. A query that
/// matches nothing falls back to the bundled font.
pub struct FontStore {
    db: fontdb::Database,
    fallback: Font,
    resolved: FxHashMap<String, Font>,
}

impl Default for FontStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FontStore {
    pub fn new() -> Self {
        Self {
            db: fontdb::Database::new(),
            fallback: Font::bundled(),
            resolved: FxHashMap::default(),
        }
    }

    pub fn load_system_fonts(&mut self) {
        self.db.load_system_fonts();
        self.resolved.clear();
    }

    /// Registers a font file so its family can be selected by name.
    pub fn load_font_data(&mut self, data: Vec<u8>) -> Result<(), MalformedFont> {
        Font::from_data(data.clone())?;
        self.db.load_font_data(data);
        self.resolved.clear();
        Ok(())
    }

    /// Replaces the font used when no family is requested or found.
    pub fn set_fallback(&mut self, font: Font) {
        self.fallback = font;
    }

    pub fn fallback(&self) -> &Font {
        &self.fallback
    }

    /// Finds the boldest available face of `family`, or the fallback.
    pub fn resolve(&mut self, family: Option<&str>) -> Font {
        let Some(family) = family else {
            return self.fallback.clone();
        };
        if let Some(font) = self.resolved.get(family) {
            return font.clone();
        }

        let font = match self.query(family) {
            Some(font) => font,
            None => {
                log::warn!(
                    "Font family '{}' is not available; using the fallback font",
                    family
                );
                self.fallback.clone()
            }
        };
        self.resolved.insert(family.to_owned(), font.clone());
        font
    }

    fn query(&self, family: &str) -> Option<Font> {
        let families = [Family::Name(family)];
        [Weight::BOLD, Weight::NORMAL].into_iter().find_map(|weight| {
            let id = self.db.query(&fontdb::Query {
                families: &families,
                weight,
                stretch: Stretch::Normal,
                style: Style::Normal,
            })?;
            self.db
                .with_face_data(id, |data, index| {
                    Font::from_data_and_index(Arc::from(data), index)
                })?
                .map_err(|e| log::warn!("Skipping font for '{}': {}", family, e))
                .ok()
        })
    }
}
