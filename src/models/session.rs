//! Wire types for the session resource and its stats summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Create payload for `POST /sessions`. Duration is whole seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub task_id: Option<String>,
    pub duration: u64,
    pub completed: bool,
}

/// Partial update for `PUT /sessions/{id}`. `None` fields are left out of the
/// request body so the store keeps their current values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// A session as the store returns it. The store assigns `id` and timestamps;
/// document-store backends key records under `_id`, which is accepted too.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub task_id: Option<String>,
    pub duration: u64,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shape of `GET /sessions/stats/summary`, consumed by the stats view only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub sessions_today: u64,
    pub total_sessions: u64,
    pub total_minutes: u64,
    pub pomodoros: u64,
}
