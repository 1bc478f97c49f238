//! The persistence collaborator: a REST-like resource API the controller
//! writes session transitions to. Only the controller has persistence side
//! effects; everything here is a thin client with no invariants of its own.

pub mod http;
pub mod mock;

use async_trait::async_trait;

use crate::models::{NewSession, SessionPatch, SessionRecord, StatsSummary, TaskPatch, TaskRecord};

pub use http::{HttpSessionStore, StoreError};
pub use mock::MockSessionStore;

pub type Result<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, session: &NewSession) -> Result<SessionRecord>;

    async fn update_session(&self, id: &str, patch: &SessionPatch) -> Result<SessionRecord>;

    async fn delete_session(&self, id: &str) -> Result<()>;

    /// Used only to cascade session completion onto its source task.
    async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<TaskRecord>;

    /// Consumed by the stats view, not the controller.
    async fn fetch_sessions(&self) -> Result<Vec<SessionRecord>>;

    /// Consumed by the stats view, not the controller.
    async fn fetch_stats(&self) -> Result<StatsSummary>;
}
