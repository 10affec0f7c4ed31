//! Built-in plugins, resolved by their dotted names.

mod axes;
mod background;
mod grid;
mod lighter;
mod outline;
mod skeleton;
mod view_cube;

pub use axes::AxesHelper;
pub use background::BackgroundShader;
pub use grid::GridHelper;
pub use lighter::Lighter;
pub use outline::SelectedOutline;
pub use skeleton::SkeletonHelper;
pub use view_cube::{AxisHandle, ViewCube};

use crate::config::ViewerOptions;
use crate::plugin::Plugin;
use crate::scene::{NodeId, Scene};

/// Names `create` understands, in default install order
pub const BUILTIN_PLUGINS: &[&str] = &[
    Lighter::NAME,
    BackgroundShader::NAME,
    GridHelper::NAME,
    AxesHelper::NAME,
    SkeletonHelper::NAME,
    ViewCube::NAME,
    SelectedOutline::NAME,
];

/// Build a built-in plugin configured from the viewer options
pub fn create(name: &str, options: &ViewerOptions) -> Option<Box<dyn Plugin>> {
    let plugin: Box<dyn Plugin> = match name {
        Lighter::NAME => Box::new(Lighter::new(options.lights.clone())),
        BackgroundShader::NAME => Box::new(BackgroundShader::new(options.background.unwrap_or_default())),
        GridHelper::NAME => Box::new(GridHelper::default()),
        AxesHelper::NAME => Box::new(AxesHelper::new()),
        SkeletonHelper::NAME => Box::new(SkeletonHelper::new()),
        ViewCube::NAME => Box::new(ViewCube::default()),
        SelectedOutline::NAME => Box::new(SelectedOutline::new()),
        _ => return None,
    };
    Some(plugin)
}

/// Drop an overlay subtree the plugin owns
fn remove_overlay(scene: &mut Scene, slot: &mut Option<NodeId>) {
    if let Some(id) = slot.take() {
        scene.remove_overlay(id);
    }
}
