//! A software rendering backend that uses [`tiny-skia`](https://docs.rs/tiny-skia).

use std::mem;

use glam::Affine2;
use slotmap::SlotMap;
use tiny_skia::{
    ColorU8, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Shader, Transform,
};

use crate::{
    asset::DecodedImage,
    backend::{
        command::{Command, CommandStream},
        Backend, ImageId,
    },
    error::{ExportError, SurfaceError},
    path::PathSegment,
    rect::Rectangle,
    types::FillRule,
    Color, LayerId, LayerInfo,
};

/// A `tiny-skia` rendering backend.
#[derive(Default)]
pub struct SoftwareBackend {
    renderer: Renderer,
    layers: SlotMap<LayerId, Layer>,
    images: SlotMap<ImageId, Pixmap>,
}

impl SoftwareBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for SoftwareBackend {
    fn create_layer(&mut self, info: LayerInfo) -> Result<LayerId, SurfaceError> {
        let pixmap = new_pixmap(info.physical_width(), info.physical_height())?;
        Ok(self.layers.insert(Layer { pixmap, info }))
    }

    fn remove_layer(&mut self, id: LayerId) {
        self.layers.remove(id);
    }

    fn layer_info(&self, id: LayerId) -> Option<&LayerInfo> {
        self.layers.get(id).map(|layer| &layer.info)
    }

    fn layer_info_mut(&mut self, id: LayerId) -> Option<&mut LayerInfo> {
        self.layers.get_mut(id).map(|layer| &mut layer.info)
    }

    fn add_image(&mut self, image: &DecodedImage) -> Result<ImageId, SurfaceError> {
        let mut pixmap = new_pixmap(image.width(), image.height())?;
        for (dst, src) in pixmap
            .pixels_mut()
            .iter_mut()
            .zip(image.rgba().chunks_exact(4))
        {
            *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }
        Ok(self.images.insert(pixmap))
    }

    fn remove_image(&mut self, id: ImageId) {
        self.images.remove(id);
    }

    fn render_to_layer(&mut self, layer: LayerId, commands: CommandStream) {
        match self.layers.get_mut(layer) {
            Some(layer) => self.renderer.render_to_layer(layer, &self.images, commands),
            None => log::warn!("Rendering to a layer that does not exist"),
        }
    }

    fn read_pixels(&self, layer: LayerId) -> Option<Vec<u8>> {
        let layer = self.layers.get(layer)?;
        let mut data = Vec::with_capacity(layer.pixmap.data().len());
        for pixel in layer.pixmap.pixels() {
            let color = pixel.demultiply();
            data.extend([color.red(), color.green(), color.blue(), color.alpha()]);
        }
        Some(data)
    }

    fn encode_png(&self, layer: LayerId) -> Result<Option<Vec<u8>>, ExportError> {
        match self.layers.get(layer) {
            Some(layer) => layer
                .pixmap
                .encode_png()
                .map(Some)
                .map_err(|e| ExportError::Encode(e.to_string())),
            None => Ok(None),
        }
    }
}

fn new_pixmap(width: u32, height: u32) -> Result<Pixmap, SurfaceError> {
    if width == 0 || height == 0 {
        return Err(SurfaceError::EmptyDimensions { width, height });
    }
    Pixmap::new(width, height).ok_or(SurfaceError::TooLarge { width, height })
}

struct Layer {
    pixmap: Pixmap,
    info: LayerInfo,
}

struct Renderer {
    color: tiny_skia::Color,
    object_transform: Transform,
    path_builder: PathBuilder,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            color: tiny_skia::Color::WHITE,
            object_transform: Transform::identity(),
            path_builder: PathBuilder::new(),
        }
    }
}

impl Renderer {
    fn render_to_layer(
        &mut self,
        layer: &mut Layer,
        images: &SlotMap<ImageId, Pixmap>,
        commands: CommandStream,
    ) {
        for command in commands {
            self.execute_command(layer, images, command);
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.path_builder.clear();
        self.object_transform = Transform::identity();
        self.color = tiny_skia::Color::WHITE;
    }

    fn paint(&self) -> Paint {
        Paint {
            anti_alias: true,
            shader: Shader::SolidColor(self.color),
            ..Default::default()
        }
    }

    /// The object transform followed by the logical-to-physical scale.
    fn device_transform(&self, hidpi_factor: f32) -> Transform {
        self.object_transform.post_scale(hidpi_factor, hidpi_factor)
    }

    fn execute_command(
        &mut self,
        layer: &mut Layer,
        images: &SlotMap<ImageId, Pixmap>,
        command: Command,
    ) {
        match command {
            Command::Clear(color) => layer.pixmap.fill(convert_color(color)),
            Command::UseSolidPaint(color) => self.color = convert_color(color),
            Command::SetObjectTransform(trans) => self.object_transform = convert_transform(trans),
            Command::ClearPath => self.path_builder.clear(),
            Command::PushPathSegment(segment) => match segment {
                PathSegment::MoveTo(pos) => self.path_builder.move_to(pos.x, pos.y),
                PathSegment::LineTo(pos) => self.path_builder.line_to(pos.x, pos.y),
                PathSegment::QuadTo { control, end } => self
                    .path_builder
                    .quad_to(control.x, control.y, end.x, end.y),
                PathSegment::CubicTo {
                    control1,
                    control2,
                    end,
                } => self
                    .path_builder
                    .cubic_to(control1.x, control1.y, control2.x, control2.y, end.x, end.y),
                PathSegment::Close => self.path_builder.close(),
            },
            Command::FillPath { fill_rule } => self.fill_path(layer, fill_rule),
            Command::DrawImage { image, rect } => match images.get(image) {
                Some(image) => self.draw_image(layer, image, rect),
                None => log::warn!("Drawing an image that was removed"),
            },
        }
    }

    fn fill_path(&mut self, layer: &mut Layer, fill_rule: FillRule) {
        let builder = mem::take(&mut self.path_builder);
        // Whitespace glyphs produce empty paths; there is nothing to fill.
        let Some(path) = builder.finish() else {
            return;
        };

        layer.pixmap.fill_path(
            &path,
            &self.paint(),
            convert_fill_rule(fill_rule),
            self.device_transform(layer.info.hidpi_factor()),
            None,
        );

        // Reuse the path builder's allocated space.
        self.path_builder = path.clear();
    }

    fn draw_image(&self, layer: &mut Layer, image: &Pixmap, rect: Rectangle) {
        let scale_x = rect.width() / image.width() as f32;
        let scale_y = rect.height() / image.height() as f32;
        let transform = self
            .device_transform(layer.info.hidpi_factor())
            .pre_translate(rect.position().x, rect.position().y)
            .pre_scale(scale_x, scale_y);

        layer.pixmap.draw_pixmap(
            0,
            0,
            image.as_ref(),
            &PixmapPaint {
                quality: FilterQuality::Bicubic,
                ..Default::default()
            },
            transform,
            None,
        );
    }
}

fn convert_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.red(), color.green(), color.blue(), color.alpha())
}

fn convert_transform(transform: Affine2) -> Transform {
    let cols = transform.to_cols_array();
    Transform::from_row(cols[0], cols[1], cols[2], cols[3], cols[4], cols[5])
}

fn convert_fill_rule(rule: FillRule) -> tiny_skia::FillRule {
    match rule {
        FillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
        FillRule::NonZero => tiny_skia::FillRule::Winding,
    }
}
