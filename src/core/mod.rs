pub mod activity;
pub mod clock;
pub mod input;
pub mod scheduler;
pub mod timer;

pub use activity::{ActivityGovernor, Transition};
pub use clock::{Clock, ManualClock};
pub use input::{to_ndc, Button, Drag, PointerButton, PointerTracker};
pub use scheduler::ManualScheduler;
pub use timer::Countdown;
