pub mod session;
pub mod task;

pub use session::{NewSession, SessionPatch, SessionRecord, StatsSummary};
pub use task::{Period, TaskPatch, TaskRecord};
