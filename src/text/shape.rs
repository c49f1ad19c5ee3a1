use glam::{vec2, Vec2};
use rustybuzz::Direction;
use ttf_parser::{GlyphId, OutlineBuilder};
use unicode_bidi::{BidiInfo, Level};

use crate::{
    path::{PathBuilder, PathSegment},
    Path,
};

use super::font::Font;

/// A run of text that has been shaped with a font.
///
/// Glyph positions are kept in font units, so changing the font size
/// with [`with_font_size`](ShapedText::with_font_size) does not reshape.
/// Right-to-left text is stored in visual order, left to right.
#[derive(Debug, Clone)]
pub struct ShapedText {
    font: Font,
    font_size: f32,
    units_per_em: f32,
    ascender: f32,
    descender: f32,
    glyphs: Vec<ShapedGlyph>,
    advance: f32,
}

#[derive(Copy, Clone, Debug)]
struct ShapedGlyph {
    id: GlyphId,
    /// Pen position along the baseline
    pen: f32,
    /// Offset from the pen position to draw at
    offset: Vec2,
}

impl ShapedText {
    /// Shapes `text` at the given font size in pixels.
    pub fn shape(font: &Font, text: &str, font_size: f32) -> Self {
        let face = font.face();

        let mut glyphs = Vec::with_capacity(text.len());
        let mut pen = 0.;
        let bidi_info = BidiInfo::new(text, None);
        for paragraph in &bidi_info.paragraphs {
            let (levels, runs) = bidi_info.visual_runs(paragraph, paragraph.range.clone());
            for run in runs {
                let level = levels[run.start];
                pen = shape_run(&face, &text[run], level, pen, &mut glyphs);
            }
        }

        Self {
            font: font.clone(),
            font_size,
            units_per_em: face.units_per_em() as f32,
            ascender: face.ascender() as f32,
            descender: face.descender() as f32,
            glyphs,
            advance: pen,
        }
    }

    /// Returns the same run at a different font size.
    pub fn with_font_size(&self, font_size: f32) -> Self {
        Self {
            font_size,
            ..self.clone()
        }
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// The advance width of the run in pixels.
    pub fn width(&self) -> f32 {
        self.advance * self.scale()
    }

    /// Distance from the baseline up to the top of the em box.
    pub fn ascent(&self) -> f32 {
        self.ascender * self.scale()
    }

    /// Distance from the baseline down to the bottom of the em box
    /// (a positive number).
    pub fn descent(&self) -> f32 {
        -self.descender * self.scale()
    }

    /// Offset from a vertically centered anchor down to the baseline,
    /// matching canvas `textBaseline = "middle"`.
    pub fn middle_to_baseline(&self) -> f32 {
        (self.ascent() - self.descent()) / 2.
    }

    /// Where the run's baseline starts when it is centered on `anchor`.
    pub fn origin_centered_at(&self, anchor: Vec2) -> Vec2 {
        vec2(anchor.x - self.width() / 2., anchor.y + self.middle_to_baseline())
    }

    /// Converts the glyph outlines to a single path with
    /// its baseline starting at `origin`.
    pub fn to_path(&self, origin: Vec2) -> Path {
        let face = self.font.face();
        let scale = self.scale();

        let mut outliner = Outliner {
            builder: PathBuilder::new(),
            origin,
            scale,
        };
        for glyph in &self.glyphs {
            outliner.origin = origin + vec2(glyph.pen + glyph.offset.x, -glyph.offset.y) * scale;
            face.outline_glyph(glyph.id, &mut outliner);
        }
        outliner.builder.build()
    }

    fn scale(&self) -> f32 {
        self.font_size / self.units_per_em
    }
}

/// Shapes one directional run, appending its glyphs after `pen`.
/// Returns the pen position after the run.
fn shape_run(
    face: &rustybuzz::Face,
    run: &str,
    level: Level,
    mut pen: f32,
    glyphs: &mut Vec<ShapedGlyph>,
) -> f32 {
    let mut buffer = rustybuzz::UnicodeBuffer::new();
    buffer.push_str(run);
    buffer.guess_segment_properties();
    buffer.set_direction(if level.is_rtl() {
        Direction::RightToLeft
    } else {
        Direction::LeftToRight
    });
    let glyph_buffer = rustybuzz::shape(face, &[], buffer);

    for (info, pos) in glyph_buffer
        .glyph_infos()
        .iter()
        .zip(glyph_buffer.glyph_positions())
    {
        glyphs.push(ShapedGlyph {
            id: GlyphId(info.glyph_id as u16),
            pen,
            offset: vec2(pos.x_offset as f32, pos.y_offset as f32),
        });
        pen += pos.x_advance as f32;
    }
    pen
}

/// Receives glyph outlines in font units (Y up) and
/// writes them to a path in pixels (Y down).
struct Outliner {
    builder: PathBuilder,
    origin: Vec2,
    scale: f32,
}

impl Outliner {
    fn point(&self, x: f32, y: f32) -> Vec2 {
        self.origin + vec2(x, -y) * self.scale
    }
}

impl OutlineBuilder for Outliner {
    fn move_to(&mut self, x: f32, y: f32) {
        let point = self.point(x, y);
        self.builder.push_segment(PathSegment::MoveTo(point));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let point = self.point(x, y);
        self.builder.push_segment(PathSegment::LineTo(point));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let segment = PathSegment::QuadTo {
            control: self.point(x1, y1),
            end: self.point(x, y),
        };
        self.builder.push_segment(segment);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let segment = PathSegment::CubicTo {
            control1: self.point(x1, y1),
            control2: self.point(x2, y2),
            end: self.point(x, y),
        };
        self.builder.push_segment(segment);
    }

    fn close(&mut self) {
        self.builder.push_segment(PathSegment::Close);
    }
}
