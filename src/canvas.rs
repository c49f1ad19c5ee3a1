use glam::{Affine2, Vec2};

use crate::{
    backend::{
        command::{Command, CommandBuffer},
        ImageId,
    },
    rect::Rectangle,
    Backend, Color, Context, FillRule, LayerId, Path,
};

/// A canvas to draw to.
///
/// Records a sequence of draw commands, then passes those
/// commands to the backend. Coordinates are in logical pixels;
/// the backend scales them by the layer's DPI factor.
///
/// The canvas maintains a _current transform_, which makes it stateful.
/// A function that draws to a canvas should not affect any functions that
/// come after it, so use [`save`](Canvas::save) and
/// [`restore`](Canvas::restore) (or [`with_save`](Canvas::with_save)) around
/// transform changes.
///
/// Many methods return `self` to enable method chaining.
#[derive(Debug, Default)]
pub struct Canvas {
    commands: CommandBuffer,

    state_stack: Vec<State>,
    state: State,
}

impl Canvas {
    /// Creates a new canvas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Translates the canvas.
    pub fn translate(&mut self, translation: Vec2) -> &mut Self {
        self.state.transform = self.state.transform * Affine2::from_translation(translation);
        self.emit_transform();
        self
    }

    /// Pushes the current transform onto the transform stack,
    /// allowing it to be restored later.
    pub fn save(&mut self) -> &mut Self {
        self.state_stack.push(self.state);
        self
    }

    /// Restores the next saved transform in the canvas's state stack.
    ///
    /// # Panics
    /// Panics if there is no state to pop. This happens only when
    /// `restore()` is called more times than `save()`.
    pub fn restore(&mut self) -> &mut Self {
        self.state = self
            .state_stack
            .pop()
            .expect("called Canvas::restore() at the top of the state stack");
        self.emit_transform();
        self
    }

    /// Calls `save()`, executes the closure, and then calls `restore()`.
    pub fn with_save(&mut self, f: impl FnOnce(&mut Self)) {
        self.save();
        f(self);
        self.restore();
    }

    /// Replaces the whole layer with a color, ignoring the transform.
    pub fn clear(&mut self, color: Color) -> &mut Self {
        self.cmd(Command::Clear(color))
    }

    /// Draws an image stretched to fill `rect`.
    pub fn draw_image(&mut self, image: ImageId, rect: Rectangle) -> &mut Self {
        self.cmd(Command::DrawImage { image, rect })
    }

    /// Creates a builder to fill the given path.
    pub fn fill_path(&mut self, path: &Path) -> Fill {
        self.set_path(path);
        Fill::new(self)
    }

    /// Renders the canvas to the given layer, flushing
    /// the draw command buffer.
    ///
    /// The canvas can be reused after this call.
    pub fn render_to_layer<B: Backend>(&mut self, context: &mut Context<B>, layer: LayerId) {
        context
            .backend_mut()
            .render_to_layer(layer, self.commands.to_stream());
        self.commands.clear();
        self.reset();
    }

    fn reset(&mut self) {
        self.state_stack.clear();
        self.state = State::default();
    }

    fn set_path(&mut self, path: &Path) {
        self.cmd(Command::ClearPath);
        for segment in path.segments() {
            self.cmd(Command::PushPathSegment(segment));
        }
    }

    fn set_solid_paint(&mut self, color: Color) {
        self.cmd(Command::UseSolidPaint(color));
    }

    fn emit_transform(&mut self) {
        let transform = self.state.transform;
        self.cmd(Command::SetObjectTransform(transform));
    }

    fn cmd(&mut self, command: Command) -> &mut Self {
        self.commands.push(command);
        self
    }

    #[cfg(test)]
    pub(crate) fn take_commands(&mut self) -> Vec<Command> {
        let commands = self.commands.to_stream().collect();
        self.commands.clear();
        commands
    }
}

/// Builder-like API to fill a shape.
///
/// The paint defaults to solid white. Paths are filled with the
/// [`FillRule::NonZero`] rule.
///
/// Call `draw()` to finish the draw operation.
#[must_use = "call Fill::draw() to finish the builder"]
pub struct Fill<'cv> {
    canvas: &'cv mut Canvas,
    set_paint: bool,
}

impl<'cv> Fill<'cv> {
    fn new(canvas: &'cv mut Canvas) -> Self {
        Self {
            canvas,
            set_paint: false,
        }
    }

    /// Uses a solid color for the fill.
    pub fn solid_color(self, color: impl Into<Color>) -> Self {
        self.canvas.set_solid_paint(color.into());
        Self {
            set_paint: true,
            ..self
        }
    }

    /// Draws the path.
    ///
    /// (Or rather, emits the command that causes the path to be drawn
    /// when `Canvas::render_to_layer()` is called.)
    pub fn draw(mut self) {
        if !self.set_paint {
            self = self.solid_color(Color::WHITE);
        }

        // glyph outlines are wound for the nonzero rule
        self.canvas.cmd(Command::FillPath {
            fill_rule: FillRule::NonZero,
        });
    }
}

/// The state of the canvas.
#[derive(Debug, Default, Copy, Clone)]
pub(crate) struct State {
    transform: Affine2,
}
