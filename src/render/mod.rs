//! Software rendering into a shared RGBA canvas.

mod canvas;
mod wireframe;

pub use crate::traits::Renderer;
pub use canvas::{Canvas, DrawOp, Rgba};
pub use wireframe::{SharedCanvas, WireframeRenderer};
