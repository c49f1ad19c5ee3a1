use crate::{
    asset::DecodedImage,
    error::{ExportError, SurfaceError},
    LayerId, LayerInfo,
};

use self::command::CommandStream;

pub mod command;
pub mod software;

slotmap::new_key_type! {
    /// ID of an image uploaded to a backend.
    pub struct ImageId;
}

/// A drawing backend that executes canvas command streams.
///
/// A backend owns its render surfaces ("layers") and the images
/// drawn onto them. Both are referred to by ID.
pub trait Backend: 'static {
    fn create_layer(&mut self, info: LayerInfo) -> Result<LayerId, SurfaceError>;

    fn remove_layer(&mut self, id: LayerId);

    fn layer_info(&self, id: LayerId) -> Option<&LayerInfo>;

    fn layer_info_mut(&mut self, id: LayerId) -> Option<&mut LayerInfo>;

    /// Uploads a decoded image so it can be referenced by `Command::DrawImage`.
    fn add_image(&mut self, image: &DecodedImage) -> Result<ImageId, SurfaceError>;

    fn remove_image(&mut self, id: ImageId);

    fn render_to_layer(&mut self, layer: LayerId, commands: CommandStream);

    /// Returns the layer contents as unpremultiplied RGBA8, row-major.
    fn read_pixels(&self, layer: LayerId) -> Option<Vec<u8>>;

    /// Encodes the layer contents as a PNG.
    ///
    /// Returns `Ok(None)` if the layer does not exist.
    fn encode_png(&self, layer: LayerId) -> Result<Option<Vec<u8>>, ExportError>;
}
