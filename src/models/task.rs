//! Wire types for the task resource. The controller only ever patches a
//! task's `completed` flag; everything else is carried for hosts that render
//! the task list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse time-of-day bucket used for task grouping, not the timer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Period {
    Morning,
    Afternoon,
    Evening,
    Anytime,
}

impl Default for Period {
    fn default() -> Self {
        Period::Anytime
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub period: Period,
    /// Suggested focus length in minutes, when the task carries one.
    #[serde(default)]
    pub duration: Option<u64>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for `PUT /tasks/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}
