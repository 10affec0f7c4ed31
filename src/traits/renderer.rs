use crate::camera::PerspectiveCamera;
use crate::scene::{ColorSpace, Scene};

/// Draws the display scene, opaque to the viewer core
pub trait Renderer {
    /// Draw one frame of the scene from the camera
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera);

    /// Resize the render surface in pixels
    fn set_size(&mut self, width: u32, height: u32);

    /// Colour space pixels are encoded in
    fn set_output_color_space(&mut self, _space: ColorSpace) {}

    /// Release the render surface; no further calls follow
    fn dispose(&mut self);
}
