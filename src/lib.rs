pub mod audio;
pub mod config;
pub mod models;
pub mod store;
pub mod timer;
mod utils;

pub use audio::AmbientAudioHandle;
pub use config::{AppConfig, ConfigStore};
pub use store::{HttpSessionStore, MockSessionStore, SessionStore, StoreError};
pub use timer::{
    CompletionSummary, CountdownClock, FocusController, FocusEvent, FocusSnapshot, FocusView,
};
