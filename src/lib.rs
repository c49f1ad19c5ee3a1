//! Composites a line of text over a background image and exports the
//! result as a PNG.
//!
//! A [`Compositor`] is configured with a [`Variant`], which names the
//! background, the render surface size, and how the text is laid out and
//! painted. Drawing goes through a [`Canvas`] that records commands for a
//! [`Backend`]; the bundled [`SoftwareBackend`] rasterizes on the CPU.

pub mod asset;
pub mod backend;
mod canvas;
mod color;
pub mod compositor;
mod context;
pub mod effect;
pub mod error;
pub mod export;
mod layer;
pub mod layout;
mod path;
mod rect;
pub mod text;
pub mod thread_pool;
mod types;
pub mod variant;
pub mod viewport;

pub use asset::{AssetLoader, DecodedImage, FsAssets, MemoryAssets};
pub use backend::{
    command::{Command, CommandStream},
    software::SoftwareBackend,
    Backend, ImageId,
};
pub use canvas::{Canvas, Fill};
pub use color::{Color, InvalidColor};
pub use compositor::{Compositor, CompositorBuilder, RenderOutcome, RenderState, RenderTicket};
pub use context::Context;
pub use effect::{ShadowStyle, TextEffect};
pub use export::{DirectorySink, DownloadSink, MemorySink, PngExport};
pub use glam::Vec2;
pub use layer::{LayerId, LayerInfo};
pub use layout::{Fraction, SizeBasis, TextLayout};
pub use path::{Path, PathBuilder, PathSegment};
pub use rect::Rectangle;
pub use text::{Font, FontStore, ShapedText};
pub use thread_pool::{BasicThreadPool, InlinePool, ThreadPool};
pub use types::FillRule;
pub use variant::{SurfaceSizing, Variant};
pub use viewport::{DeviceClass, ViewportPolicy, ViewportState};

pub extern crate glam;
