pub mod animation;
pub mod camera;
pub mod cli;
pub mod config;
pub mod controls;
pub mod core;
pub mod error;
pub mod events;
pub mod loader;
pub mod math;
pub mod plugin;
pub mod plugins;
pub mod render;
pub mod scene;
pub mod shell;
pub mod traits;
pub mod viewer;

pub use config::ViewerOptions;
pub use error::{LoadError, LoadErrorKind, Result, ViewerError};
pub use events::{EventKind, ViewerEvent};
pub use viewer::Viewer;
