//! The compositor: draws a background image and a line of text onto a
//! render surface and exports the result.
//!
//! # Rendering model
//! [`Compositor::render`] returns immediately. The background image is
//! loaded and decoded on a [`ThreadPool`], and the finished load is applied
//! on the thread that owns the compositor by [`Compositor::poll`] or
//! [`Compositor::wait`]. Drawing only happens once the image is available,
//! so the text is never drawn onto a half-loaded surface.
//!
//! Each render is tagged with a generation number. When renders overlap,
//! only the latest one is applied; loads belonging to superseded renders
//! still finish, but their results are dropped.

use std::sync::Arc;

use flume::{Receiver, Sender};
use glam::Vec2;

use crate::{
    asset::{self, AssetLoader, DecodedImage, FsAssets},
    backend::{software::SoftwareBackend, ImageId},
    error::{AssetError, ExportError, SurfaceError, VariantError},
    export::{DownloadSink, PngExport},
    rect::Rectangle,
    text::{self, Font, FontStore, ShapedText},
    thread_pool::{BasicThreadPool, ThreadPool},
    variant::Variant,
    viewport::ViewportState,
    Backend, Canvas, Color, Context, LayerId, LayerInfo,
};

const DEFAULT_WINDOW_SIZE: Vec2 = Vec2::new(1280., 800.);

/// Where the compositor is in the render cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderState {
    /// Nothing has been rendered yet.
    Idle,
    /// Waiting for the background of the given render to load.
    Loading { generation: u64 },
    /// The surface holds a completed render.
    Rendered,
}

/// Identifies a call to [`Compositor::render`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderTicket(u64);

impl RenderTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// How the latest render ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered(RenderTicket),
    /// The background could not be loaded. The surface was left unchanged.
    Failed(RenderTicket),
}

/// A finished background load, sent back from a worker.
struct Completion {
    generation: u64,
    result: Result<DecodedImage, AssetError>,
}

/// The render that is currently waiting on its background.
struct PendingRender {
    generation: u64,
    text: String,
    viewport: ViewportState,
    /// Set when the window was resized while the background loaded.
    resized: bool,
}

/// Builder for a [`Compositor`].
pub struct CompositorBuilder<B> {
    variant: Variant,
    backend: B,
    fonts: FontStore,
    loader: Option<Arc<dyn AssetLoader>>,
    pool: Option<Arc<dyn ThreadPool>>,
    window_size: Vec2,
}

impl<B> CompositorBuilder<B>
where
    B: Backend,
{
    /// Uses a different rendering backend.
    pub fn backend<B2: Backend>(self, backend: B2) -> CompositorBuilder<B2> {
        CompositorBuilder {
            variant: self.variant,
            backend,
            fonts: self.fonts,
            loader: self.loader,
            pool: self.pool,
            window_size: self.window_size,
        }
    }

    /// Sets where background images are loaded from.
    ///
    /// The default reads from the current directory.
    pub fn loader(mut self, loader: impl AssetLoader) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    pub fn shared_loader(mut self, loader: Arc<dyn AssetLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Sets the pool that background loads run on.
    ///
    /// The default is a single worker thread.
    pub fn thread_pool(mut self, pool: impl ThreadPool) -> Self {
        self.pool = Some(Arc::new(pool));
        self
    }

    /// Sets the fonts text is drawn with. The variant's font family is
    /// resolved against this store.
    pub fn fonts(mut self, fonts: FontStore) -> Self {
        self.fonts = fonts;
        self
    }

    /// Sets the initial window size the viewport is derived from.
    pub fn window_size(mut self, window_size: Vec2) -> Self {
        self.window_size = window_size;
        self
    }

    /// Builds the compositor.
    pub fn build(mut self) -> Result<Compositor<B>, VariantError> {
        self.variant.validate()?;

        let font = self.fonts.resolve(self.variant.font_family.as_deref());
        let loader: Arc<dyn AssetLoader> = match self.loader {
            Some(loader) => loader,
            None => Arc::new(FsAssets::new(".")),
        };
        let pool: Arc<dyn ThreadPool> = match self.pool {
            Some(pool) => pool,
            None => Arc::new(BasicThreadPool::new(1)),
        };
        let viewport = self.variant.viewport.fit(self.window_size);
        let (sender, receiver) = flume::unbounded();

        Ok(Compositor {
            context: Context::new(self.backend),
            font,
            loader,
            pool,
            canvas: Canvas::new(),
            sender,
            receiver,
            generation: 0,
            pending: None,
            state: RenderState::Idle,
            viewport,
            surface: None,
            background: None,
            stale_completions: 0,
            variant: self.variant,
        })
    }
}

/// Composites text onto a variant's background image.
pub struct Compositor<B = SoftwareBackend> {
    context: Context<B>,
    variant: Variant,
    font: Font,
    loader: Arc<dyn AssetLoader>,
    pool: Arc<dyn ThreadPool>,
    canvas: Canvas,

    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
    generation: u64,
    pending: Option<PendingRender>,
    state: RenderState,

    viewport: ViewportState,
    surface: Option<LayerId>,
    background: Option<ImageId>,
    stale_completions: u64,
}

impl Compositor<SoftwareBackend> {
    pub fn builder(variant: Variant) -> CompositorBuilder<SoftwareBackend> {
        CompositorBuilder {
            variant,
            backend: SoftwareBackend::new(),
            fonts: FontStore::new(),
            loader: None,
            pool: None,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl<B> Compositor<B>
where
    B: Backend,
{
    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    /// The current display size.
    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    /// Number of loads whose results were dropped because a newer
    /// render had started.
    pub fn stale_completions(&self) -> u64 {
        self.stale_completions
    }

    pub fn context(&self) -> &Context<B> {
        &self.context
    }

    /// Describes the render surface, if one exists.
    pub fn surface_info(&self) -> Option<&LayerInfo> {
        self.context.backend().layer_info(self.surface?)
    }

    /// The surface contents as RGBA8, if anything has been rendered.
    pub fn pixels(&self) -> Option<Vec<u8>> {
        self.context.backend().read_pixels(self.surface?)
    }

    /// Recomputes the viewport for a new window size.
    ///
    /// Only the display size of the surface changes; its pixels are not redrawn.
    pub fn resize(&mut self, window_size: Vec2) -> ViewportState {
        self.viewport = self.variant.viewport.fit(window_size);
        if let Some(info) = self
            .surface
            .and_then(|layer| self.context.backend_mut().layer_info_mut(layer))
        {
            info.set_display_size(self.viewport.size());
        }
        if let Some(pending) = &mut self.pending {
            pending.resized = true;
        }
        self.viewport
    }

    /// Starts rendering `text` over the background at the given viewport.
    ///
    /// The render completes once its background has loaded and
    /// [`poll`](Self::poll) or [`wait`](Self::wait) has been called.
    /// Starting another render before then supersedes this one.
    pub fn render(&mut self, text: &str, viewport: ViewportState) -> RenderTicket {
        self.generation += 1;
        let generation = self.generation;
        if let Some(pending) = self.pending.take() {
            log::debug!(
                "Render {} superseded by render {}",
                pending.generation,
                generation
            );
        }
        self.pending = Some(PendingRender {
            generation,
            text: text.to_owned(),
            viewport,
            resized: false,
        });
        self.state = RenderState::Loading { generation };

        let loader = Arc::clone(&self.loader);
        let path = self.variant.background.clone();
        let sender = self.sender.clone();
        self.pool.spawn(Box::new(move || {
            let result = asset::load_image(&*loader, &path);
            if sender.send(Completion { generation, result }).is_err() {
                log::debug!("Compositor dropped before render {} finished", generation);
            }
        }));

        RenderTicket(generation)
    }

    /// Renders `text` at the current viewport.
    pub fn render_text(&mut self, text: &str) -> RenderTicket {
        self.render(text, self.viewport)
    }

    /// Applies any finished loads without blocking.
    ///
    /// Returns the outcome of the current render if it finished.
    pub fn poll(&mut self) -> Option<RenderOutcome> {
        let mut outcome = None;
        while let Ok(completion) = self.receiver.try_recv() {
            if let Some(o) = self.apply(completion) {
                outcome = Some(o);
            }
        }
        outcome
    }

    /// Blocks until the current render finishes.
    ///
    /// Returns `None` if no render is in progress.
    pub fn wait(&mut self) -> Option<RenderOutcome> {
        if let Some(outcome) = self.poll() {
            return Some(outcome);
        }
        while matches!(self.state, RenderState::Loading { .. }) {
            let completion = self.receiver.recv().ok()?;
            if let Some(outcome) = self.apply(completion) {
                return Some(outcome);
            }
        }
        None
    }

    /// Encodes the surface as PNG.
    ///
    /// Returns `Ok(None)` if nothing has been rendered.
    pub fn export_png(&self) -> Result<Option<PngExport>, ExportError> {
        let Some(layer) = self.surface else {
            return Ok(None);
        };
        let bytes = self.context.backend().encode_png(layer)?;
        Ok(bytes.map(|bytes| PngExport::new(self.variant.export_filename.clone(), bytes)))
    }

    /// Exports the surface to `sink`.
    ///
    /// Returns `Ok(false)` without touching the sink if nothing has been rendered.
    pub fn download(&self, sink: &mut dyn DownloadSink) -> Result<bool, ExportError> {
        match self.export_png()? {
            Some(export) => {
                sink.deliver(&export)?;
                Ok(true)
            }
            None => {
                log::debug!("Nothing to download yet");
                Ok(false)
            }
        }
    }

    fn apply(&mut self, completion: Completion) -> Option<RenderOutcome> {
        let pending = match self.pending.take() {
            Some(pending) if pending.generation == completion.generation => pending,
            other => {
                self.pending = other;
                self.stale_completions += 1;
                log::debug!("Discarding stale render {}", completion.generation);
                return None;
            }
        };
        let ticket = RenderTicket(pending.generation);

        let drawn = match completion.result {
            Ok(image) => self.draw(&pending, &image).map_err(|e| {
                log::error!("Cannot create render surface: {:#}", anyhow::Error::new(e));
            }),
            Err(e) => {
                log::error!("Background image failed to load: {:#}", anyhow::Error::new(e));
                Err(())
            }
        };

        match drawn {
            Ok(()) => {
                self.state = RenderState::Rendered;
                Some(RenderOutcome::Rendered(ticket))
            }
            Err(()) => {
                self.state = if self.surface.is_some() {
                    RenderState::Rendered
                } else {
                    RenderState::Idle
                };
                Some(RenderOutcome::Failed(ticket))
            }
        }
    }

    fn draw(&mut self, pending: &PendingRender, image: &DecodedImage) -> Result<(), SurfaceError> {
        let info = self.variant.surface.layer_info(image.width(), image.height())?;
        let background = self.context.backend_mut().add_image(image)?;
        let layer = match self.ensure_surface(info) {
            Ok(layer) => layer,
            Err(e) => {
                self.context.backend_mut().remove_image(background);
                return Err(e);
            }
        };
        if let Some(old) = self.background.replace(background) {
            self.context.backend_mut().remove_image(old);
        }

        let viewport = if pending.resized {
            self.viewport
        } else {
            pending.viewport
        };
        let logical_size = match self.context.backend_mut().layer_info_mut(layer) {
            Some(info) => {
                info.set_display_size(viewport.size());
                info.logical_size()
            }
            None => return Err(SurfaceError::MissingLayer),
        };

        self.canvas
            .clear(Color::TRANSPARENT)
            .draw_image(background, Rectangle::from_size(logical_size));
        self.draw_text(&pending.text, logical_size, &viewport);
        self.canvas.render_to_layer(&mut self.context, layer);

        self.viewport = viewport;
        log::debug!(
            "Rendered {}x{} surface for render {}",
            logical_size.x,
            logical_size.y,
            pending.generation
        );
        Ok(())
    }

    fn draw_text(&mut self, text: &str, surface: Vec2, viewport: &ViewportState) {
        let text = text::normalize(text);
        let shaped = ShapedText::shape(&self.font, &text, 1.);
        if shaped.is_empty() {
            return;
        }

        let placement = self.variant.layout.place(&shaped, surface, viewport);
        let path = placement.text.to_path(placement.origin);
        self.variant.effect.draw(&mut self.canvas, &path);
    }

    /// Reuses the current surface if it has the right pixel size,
    /// otherwise replaces it.
    fn ensure_surface(&mut self, info: LayerInfo) -> Result<LayerId, SurfaceError> {
        if let Some(layer) = self.surface {
            match self.context.backend().layer_info(layer) {
                Some(current) if current.same_buffer(&info) => return Ok(layer),
                _ => {}
            }
        }

        let layer = self.context.create_layer(info)?;
        if let Some(old) = self.surface.replace(layer) {
            self.context.backend_mut().remove_layer(old);
        }
        Ok(layer)
    }
}

#[cfg(test)]
mod tests {
    use glam::vec2;

    use super::*;
    use crate::{
        asset::MemoryAssets,
        backend::command::{Command, CommandBuffer, CommandStream},
        thread_pool::InlinePool,
    };

    /// Records every command stream before rasterizing it.
    #[derive(Default)]
    struct RecordingBackend {
        inner: SoftwareBackend,
        rendered: Vec<Vec<Command>>,
    }

    impl Backend for RecordingBackend {
        fn create_layer(&mut self, info: LayerInfo) -> Result<LayerId, SurfaceError> {
            self.inner.create_layer(info)
        }

        fn remove_layer(&mut self, id: LayerId) {
            self.inner.remove_layer(id)
        }

        fn layer_info(&self, id: LayerId) -> Option<&LayerInfo> {
            self.inner.layer_info(id)
        }

        fn layer_info_mut(&mut self, id: LayerId) -> Option<&mut LayerInfo> {
            self.inner.layer_info_mut(id)
        }

        fn add_image(&mut self, image: &DecodedImage) -> Result<ImageId, SurfaceError> {
            self.inner.add_image(image)
        }

        fn remove_image(&mut self, id: ImageId) {
            self.inner.remove_image(id)
        }

        fn render_to_layer(&mut self, layer: LayerId, commands: CommandStream) {
            let mut buffer = CommandBuffer::new();
            let commands: Vec<Command> = commands.collect();
            for &command in &commands {
                buffer.push(command);
            }
            self.inner.render_to_layer(layer, buffer.to_stream());
            self.rendered.push(commands);
        }

        fn read_pixels(&self, layer: LayerId) -> Option<Vec<u8>> {
            self.inner.read_pixels(layer)
        }

        fn encode_png(&self, layer: LayerId) -> Result<Option<Vec<u8>>, ExportError> {
            self.inner.encode_png(layer)
        }
    }

    fn background_png(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbImage::from_pixel(width, height, image::Rgb([20, 90, 40]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(image)
            .write_to(&mut bytes, image::ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    fn compositor(variant: Variant) -> Compositor {
        let assets = MemoryAssets::new();
        assets.insert(variant.background.clone(), background_png(40, 10));
        Compositor::builder(variant)
            .loader(assets)
            .thread_pool(InlinePool)
            .build()
            .unwrap()
    }

    #[test]
    fn starts_idle_with_fitted_viewport() {
        let compositor = compositor(Variant::jersey_banner());
        assert_eq!(compositor.state(), RenderState::Idle);
        assert_eq!(compositor.viewport(), ViewportState::new(800., 200.));
        assert!(compositor.surface_info().is_none());
    }

    #[test]
    fn render_sizes_surface_and_display_independently() {
        let mut compositor = compositor(Variant::jersey_banner());
        let ticket = compositor.render("sara", ViewportState::new(360., 90.));
        assert_eq!(compositor.wait(), Some(RenderOutcome::Rendered(ticket)));
        assert_eq!(compositor.state(), RenderState::Rendered);

        let info = compositor.surface_info().unwrap();
        assert_eq!(info.physical_size(), glam::uvec2(1600, 400));
        assert_eq!(info.display_size(), vec2(360., 90.));
    }

    #[test]
    fn native_surface_follows_image() {
        let mut compositor = compositor(Variant::holiday_card());
        compositor.render_text("Noor");
        compositor.wait();
        assert_eq!(
            compositor.surface_info().unwrap().physical_size(),
            glam::uvec2(40, 10)
        );
    }

    #[test]
    fn resize_only_changes_display_size() {
        let mut compositor = compositor(Variant::jersey_banner());
        compositor.render_text("sara");
        compositor.wait();
        let before = compositor.pixels().unwrap();

        let viewport = compositor.resize(vec2(400., 800.));
        assert!(viewport.display_width < 800.);
        let info = compositor.surface_info().unwrap();
        assert_eq!(info.display_size(), viewport.size());
        assert_eq!(info.physical_size(), glam::uvec2(1600, 400));
        assert_eq!(compositor.pixels().unwrap(), before);
    }

    #[test]
    fn draws_background_then_shadows_then_foreground() {
        let variant = Variant::jersey_banner();
        let assets = MemoryAssets::new();
        assets.insert(variant.background.clone(), background_png(40, 10));
        let mut compositor = Compositor::builder(variant)
            .backend(RecordingBackend::default())
            .loader(assets)
            .thread_pool(InlinePool)
            .build()
            .unwrap();
        compositor.render_text("sara");
        compositor.wait();

        let rendered = &compositor.context().backend().rendered;
        assert_eq!(rendered.len(), 1);
        let commands = &rendered[0];
        assert_eq!(commands[0], Command::Clear(Color::TRANSPARENT));
        assert!(matches!(
            commands[1],
            Command::DrawImage { rect, .. } if rect == Rectangle::from_size(vec2(800., 200.))
        ));

        let paints: Vec<Color> = commands
            .iter()
            .filter_map(|c| match c {
                Command::UseSolidPaint(color) => Some(*color),
                _ => None,
            })
            .collect();
        let alphas: Vec<u8> = paints[..5].iter().map(Color::alpha).collect();
        assert_eq!(alphas, [26, 51, 77, 102, 128]);
        assert_eq!(paints[5], Color::rgb(0xf1, 0xe3, 0xb3));
        assert_eq!(paints.len(), 6);
        assert_eq!(commands.last(), Some(&Command::FillPath { fill_rule: Default::default() }));
    }

    #[test]
    fn wait_without_render_returns_none() {
        let mut compositor = compositor(Variant::jersey_banner());
        assert_eq!(compositor.wait(), None);
        assert_eq!(compositor.poll(), None);
    }

    #[test]
    fn failed_first_render_returns_to_idle() {
        let mut compositor = Compositor::builder(Variant::jersey_banner())
            .loader(MemoryAssets::new())
            .thread_pool(InlinePool)
            .build()
            .unwrap();
        let ticket = compositor.render_text("sara");
        assert_eq!(compositor.wait(), Some(RenderOutcome::Failed(ticket)));
        assert_eq!(compositor.state(), RenderState::Idle);
        assert!(compositor.export_png().unwrap().is_none());
    }

    #[test]
    fn invalid_variant_is_rejected() {
        let variant = Variant {
            export_filename: String::new(),
            ..Variant::jersey_banner()
        };
        assert!(Compositor::builder(variant).build().is_err());
    }
}
