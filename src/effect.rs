//! Text coloring and the stacked drop shadow.

use glam::{vec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::{Canvas, Color, Path};

/// A soft shadow made of progressively more opaque copies of the text,
/// each shifted a little further down and to the right.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowStyle {
    pub color: Color,
    pub layers: u32,
    /// Offset between consecutive layers, in logical pixels
    pub step: f32,
    pub base_alpha: f32,
    pub alpha_step: f32,
}

impl Default for ShadowStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            layers: 5,
            step: 1.,
            base_alpha: 0.1,
            alpha_step: 0.1,
        }
    }
}

impl ShadowStyle {
    /// The offset and color of each shadow layer, drawn in order.
    pub fn layers(&self) -> impl Iterator<Item = (Vec2, Color)> + '_ {
        (0..self.layers).map(move |i| {
            let i = i as f32;
            (
                vec2(i * self.step, i * self.step),
                self.color
                    .with_opacity(self.base_alpha + i * self.alpha_step),
            )
        })
    }
}

/// How the text is painted.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextEffect {
    pub foreground: Color,
    pub shadow: ShadowStyle,
}

impl Default for TextEffect {
    fn default() -> Self {
        Self {
            foreground: Color::rgb(0xf1, 0xe3, 0xb3),
            shadow: ShadowStyle::default(),
        }
    }
}

impl TextEffect {
    /// Draws the shadow layers and then the foreground text on top.
    ///
    /// `path` is the text outline at its final position.
    pub fn draw(&self, canvas: &mut Canvas, path: &Path) {
        for (offset, color) in self.shadow.layers() {
            canvas.with_save(|canvas| {
                canvas.translate(offset);
                canvas.fill_path(path).solid_color(color).draw();
            });
        }
        canvas.fill_path(path).solid_color(self.foreground).draw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::command::Command;

    #[test]
    fn shadow_layers_grow_more_opaque() {
        let layers: Vec<_> = ShadowStyle::default().layers().collect();
        assert_eq!(layers.len(), 5);
        assert_eq!(layers[0], (Vec2::ZERO, Color::rgba(0, 0, 0, 26)));
        assert_eq!(layers[4], (vec2(4., 4.), Color::rgba(0, 0, 0, 128)));
        assert!(layers.windows(2).all(|w| w[0].1.alpha() < w[1].1.alpha()));
    }

    #[test]
    fn foreground_is_drawn_last_without_offset() {
        let path = Path::builder()
            .move_to(vec2(0., 0.))
            .line_to(vec2(1., 0.))
            .close();
        let mut canvas = Canvas::new();
        TextEffect::default().draw(&mut canvas, &path);

        let commands = canvas.take_commands();
        let paints: Vec<Color> = commands
            .iter()
            .filter_map(|c| match c {
                Command::UseSolidPaint(color) => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(paints.len(), 6);
        assert_eq!(paints[5], Color::rgb(0xf1, 0xe3, 0xb3));

        let last_transform = commands
            .iter()
            .rev()
            .find_map(|c| match c {
                Command::SetObjectTransform(t) => Some(*t),
                _ => None,
            })
            .unwrap();
        assert_eq!(last_transform, glam::Affine2::IDENTITY);
    }
}
