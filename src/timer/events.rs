use serde::Serialize;

use super::state::{CompletionSummary, FocusView};

/// Render-ready view of the focus surface, emitted on every state change and
/// returned by every controller operation.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FocusSnapshot {
    pub view: FocusView,
    pub task_id: Option<String>,
    pub planned_secs: u64,
    pub remaining_secs: u64,
    pub elapsed_secs: u64,
    pub is_playing: bool,
    pub session_id: Option<String>,
    pub remaining_clock: String,
    pub remaining_percent: f64,
    pub last_completion: Option<CompletionSummary>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "event", content = "payload")]
pub enum FocusEvent {
    StateChanged(FocusSnapshot),
    SessionCompleted(CompletionSummary),
}
