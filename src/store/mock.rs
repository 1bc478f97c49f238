//! In-memory store backed by HashMaps, for tests and hosts running without a
//! backend.

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, RwLock,
};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::{NewSession, SessionPatch, SessionRecord, StatsSummary, TaskPatch, TaskRecord};

use super::{Result, SessionStore, StoreError};

const POMODORO_MINUTES: u64 = 25;

/// Mock session store.
///
/// Clones share state, so a test can hold one handle and hand another to the
/// controller. `with_failures` / `set_failing` make every call return a 500,
/// and `with_create_delay` holds `create_session` responses back to exercise
/// in-flight races.
#[derive(Clone, Default)]
pub struct MockSessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
    tasks: Arc<RwLock<HashMap<String, TaskRecord>>>,
    update_calls: Arc<RwLock<Vec<(String, SessionPatch)>>>,
    deleted_ids: Arc<RwLock<Vec<String>>>,
    failing: Arc<AtomicBool>,
    create_delay: Arc<RwLock<Option<Duration>>>,
}

impl MockSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a task so completion can cascade onto it.
    pub fn with_task(self, task: TaskRecord) -> Self {
        self.tasks.write().unwrap().insert(task.id.clone(), task);
        self
    }

    /// Every subsequent call fails with a 500.
    pub fn with_failures(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    /// Hold `create_session` responses back by `delay`.
    pub fn with_create_delay(self, delay: Duration) -> Self {
        *self.create_delay.write().unwrap() = Some(delay);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All stored sessions, newest first (the order the API serves them in).
    pub fn sessions(&self) -> Vec<SessionRecord> {
        let mut sessions: Vec<SessionRecord> =
            self.sessions.read().unwrap().values().cloned().collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sessions
    }

    pub fn session(&self, id: &str) -> Option<SessionRecord> {
        self.sessions.read().unwrap().get(id).cloned()
    }

    pub fn task(&self, id: &str) -> Option<TaskRecord> {
        self.tasks.read().unwrap().get(id).cloned()
    }

    /// Recorded `update_session` calls, in order.
    pub fn update_calls(&self) -> Vec<(String, SessionPatch)> {
        self.update_calls.read().unwrap().clone()
    }

    /// Ids of successfully deleted sessions, in order.
    pub fn deleted_ids(&self) -> Vec<String> {
        self.deleted_ids.read().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().unwrap().is_empty()
    }

    fn check_failing(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Status(500, "store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn create_session(&self, session: &NewSession) -> Result<SessionRecord> {
        let delay = *self.create_delay.read().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_failing()?;

        let now = Utc::now();
        let record = SessionRecord {
            id: Uuid::new_v4().to_string(),
            task_id: session.task_id.clone(),
            duration: session.duration,
            completed: session.completed,
            created_at: now,
            updated_at: now,
        };
        self.sessions
            .write()
            .unwrap()
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update_session(&self, id: &str, patch: &SessionPatch) -> Result<SessionRecord> {
        self.check_failing()?;
        self.update_calls
            .write()
            .unwrap()
            .push((id.to_string(), patch.clone()));

        let mut sessions = self.sessions.write().unwrap();
        let record = sessions.get_mut(id).ok_or(StoreError::NotFound)?;
        if let Some(duration) = patch.duration {
            record.duration = duration;
        }
        if let Some(completed) = patch.completed {
            record.completed = completed;
        }
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete_session(&self, id: &str) -> Result<()> {
        self.check_failing()?;
        let removed = self.sessions.write().unwrap().remove(id);
        if removed.is_none() {
            return Err(StoreError::NotFound);
        }
        self.deleted_ids.write().unwrap().push(id.to_string());
        Ok(())
    }

    async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<TaskRecord> {
        self.check_failing()?;
        let mut tasks = self.tasks.write().unwrap();
        let task = tasks.get_mut(id).ok_or(StoreError::NotFound)?;
        if let Some(ref text) = patch.text {
            task.text = text.clone();
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn fetch_sessions(&self) -> Result<Vec<SessionRecord>> {
        self.check_failing()?;
        Ok(self.sessions())
    }

    async fn fetch_stats(&self) -> Result<StatsSummary> {
        self.check_failing()?;
        let sessions = self.sessions.read().unwrap();
        let today = Utc::now().date_naive();

        let completed: Vec<&SessionRecord> =
            sessions.values().filter(|s| s.completed).collect();
        let sessions_today = completed
            .iter()
            .filter(|s| s.created_at.date_naive() == today)
            .count() as u64;
        let total_seconds: u64 = completed.iter().map(|s| s.duration).sum();
        let total_minutes = total_seconds / 60;

        Ok(StatsSummary {
            sessions_today,
            total_sessions: completed.len() as u64,
            total_minutes,
            pomodoros: total_minutes / POMODORO_MINUTES,
        })
    }
}
