//! Desktop host: a winit window presenting the software canvas through wgpu,
//! with an egui panel on top.

mod app;
mod gpu;
mod input;
mod panel;
mod scheduler;

pub use app::{run, App, Startup, UserEvent};
pub use input::{key_to_button, mouse_to_pointer, scroll_steps};
pub use panel::{FpsCounter, PanelAction};
pub use scheduler::{FrameSlot, WindowScheduler};
