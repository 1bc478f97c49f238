pub mod clock;
pub mod controller;
pub mod events;
pub mod state;

pub use clock::{CountdownClock, TickStep};
pub use controller::FocusController;
pub use events::{FocusEvent, FocusSnapshot};
pub use state::{format_clock, CompletionSummary, FocusState, FocusView, Persistence};
