use serde::{Deserialize, Serialize};

use super::clock::TickStep;
use super::events::FocusSnapshot;

pub const FOCUS_DURATION_DEFAULT_MINUTES: u64 = 25;
pub const FOCUS_DURATION_MIN_MINUTES: u64 = 1;
pub const FOCUS_DURATION_MAX_MINUTES: u64 = 120;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FocusView {
    /// Idle: the duration picker is showing, no session exists.
    DurationSelect,
    /// A session is on screen, playing or paused.
    SessionActive,
}

impl Default for FocusView {
    fn default() -> Self {
        FocusView::DurationSelect
    }
}

/// Whether the current session has a remote record yet. Sessions are saved
/// lazily: nothing is written until the user first starts playback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Persistence {
    Unsaved,
    Saved(String),
}

/// What the host shows after a session finishes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSummary {
    pub task_id: Option<String>,
    pub planned_secs: u64,
    pub elapsed_secs: u64,
    pub formatted_elapsed: String,
}

/// Authoritative state of the focus surface. Owned exclusively by the
/// controller behind a mutex; the clock and audio engine only ever receive
/// commands and emit callbacks.
#[derive(Debug, Clone)]
pub struct FocusState {
    pub view: FocusView,
    pub task_id: Option<String>,
    pub planned_secs: u64,
    pub remaining_secs: u64,
    pub is_playing: bool,
    pub persistence: Persistence,
    /// Generation counter bumped on every reset. In-flight store responses
    /// compare their captured epoch before touching newer state.
    pub epoch: u64,
    pub last_completion: Option<CompletionSummary>,
}

impl Default for FocusState {
    fn default() -> Self {
        Self {
            view: FocusView::DurationSelect,
            task_id: None,
            planned_secs: FOCUS_DURATION_DEFAULT_MINUTES * 60,
            remaining_secs: FOCUS_DURATION_DEFAULT_MINUTES * 60,
            is_playing: false,
            persistence: Persistence::Unsaved,
            epoch: 0,
            last_completion: None,
        }
    }
}

impl FocusState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.planned_secs.saturating_sub(self.remaining_secs)
    }

    /// Durations inside the supported range pass through; anything else
    /// silently falls back to the default.
    pub fn sanitize_minutes(minutes: u64) -> u64 {
        if (FOCUS_DURATION_MIN_MINUTES..=FOCUS_DURATION_MAX_MINUTES).contains(&minutes) {
            minutes
        } else {
            FOCUS_DURATION_DEFAULT_MINUTES
        }
    }

    /// Puts a fresh paused session on screen, replacing whatever was there.
    pub fn begin_session(&mut self, task_id: Option<String>, planned_minutes: u64) {
        let minutes = Self::sanitize_minutes(planned_minutes);
        self.epoch = self.epoch.wrapping_add(1);
        self.view = FocusView::SessionActive;
        self.task_id = task_id;
        self.planned_secs = minutes * 60;
        self.remaining_secs = self.planned_secs;
        self.is_playing = false;
        self.persistence = Persistence::Unsaved;
        self.last_completion = None;
    }

    /// One scheduler tick. Decrements only while playing with time left, so a
    /// tick racing a state change can never push remaining below zero or past
    /// a pause.
    pub fn tick(&mut self) -> TickStep {
        if !self.is_playing || self.remaining_secs == 0 {
            return TickStep::Held;
        }
        self.remaining_secs -= 1;
        if self.remaining_secs == 0 {
            TickStep::Reached
        } else {
            TickStep::Advanced(self.remaining_secs)
        }
    }

    /// Scrub to a position on the progress bar. Percent is remaining percent:
    /// 0 empties the countdown, 100 rewinds it fully.
    pub fn seek_to_percent(&mut self, percent: f64) {
        let percent = percent.clamp(0.0, 100.0);
        let remaining = (percent / 100.0 * self.planned_secs as f64).round() as u64;
        self.remaining_secs = remaining.min(self.planned_secs);
    }

    pub fn remaining_percent(&self) -> f64 {
        if self.planned_secs == 0 {
            return 0.0;
        }
        self.remaining_secs as f64 / self.planned_secs as f64 * 100.0
    }

    /// Back to the duration picker. Bumps the epoch so anything still in
    /// flight for the old session lands as a no-op.
    pub fn reset_idle(&mut self) {
        *self = Self {
            epoch: self.epoch.wrapping_add(1),
            ..Self::default()
        };
    }

    pub fn snapshot(&self) -> FocusSnapshot {
        FocusSnapshot {
            view: self.view,
            task_id: self.task_id.clone(),
            planned_secs: self.planned_secs,
            remaining_secs: self.remaining_secs,
            elapsed_secs: self.elapsed_secs(),
            is_playing: self.is_playing,
            session_id: match &self.persistence {
                Persistence::Saved(id) => Some(id.clone()),
                Persistence::Unsaved => None,
            },
            remaining_clock: format_clock(self.remaining_secs),
            remaining_percent: self.remaining_percent(),
            last_completion: self.last_completion.clone(),
        }
    }
}

/// Formats whole seconds as `M:SS`, the countdown display format.
pub fn format_clock(total_secs: u64) -> String {
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{}:{:02}", minutes, seconds)
}
