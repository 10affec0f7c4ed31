pub mod clock;
pub mod loader;
pub mod renderer;
pub mod scheduler;

pub use clock::*;
pub use loader::*;
pub use renderer::*;
pub use scheduler::*;
