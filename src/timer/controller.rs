use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{error, warn};
use tokio::sync::broadcast;

use crate::{
    audio::{AmbientAudioHandle, TRACK_DURATION},
    models::{NewSession, SessionPatch, TaskPatch},
    store::SessionStore,
};

use super::{
    clock::{CountdownClock, TickStep},
    events::{FocusEvent, FocusSnapshot},
    state::{format_clock, CompletionSummary, FocusState, FocusView, Persistence},
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

struct PlayContext {
    needs_create: bool,
    auto_loop: bool,
    complete_now: bool,
    epoch: u64,
    task_id: Option<String>,
    planned_secs: u64,
}

/// The orchestrating state machine for one focus surface: owns the session
/// lifecycle, drives the countdown clock and the ambient audio engine, and is
/// the only component with persistence side effects.
///
/// Cheap to clone; construct one per active UI surface. Every store failure
/// is logged and swallowed: local state stays the source of truth, and the
/// worst degraded mode is a working timer that persists nothing.
#[derive(Clone)]
pub struct FocusController {
    state: Arc<Mutex<FocusState>>,
    clock: CountdownClock,
    audio: AmbientAudioHandle,
    store: Arc<dyn SessionStore>,
    events: broadcast::Sender<FocusEvent>,
}

impl FocusController {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self::with_clock(store, CountdownClock::new())
    }

    /// Variant taking a custom clock, for tests and fast demo runs.
    pub fn with_clock(store: Arc<dyn SessionStore>, clock: CountdownClock) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(FocusState::new())),
            clock,
            audio: AmbientAudioHandle::new(),
            store,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FocusEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> FocusSnapshot {
        self.state.lock().unwrap().snapshot()
    }

    pub fn audio(&self) -> &AmbientAudioHandle {
        &self.audio
    }

    /// Puts a fresh paused session on screen, either for a specific task or a
    /// general focus block. Replaces whatever was active. Nothing is
    /// persisted until the first play.
    pub async fn start_session(
        &self,
        task_id: Option<String>,
        planned_minutes: u64,
    ) -> FocusSnapshot {
        self.clock.stop();
        if let Err(err) = self.audio.stop() {
            warn!("Failed to stop ambient audio: {err}");
        }

        let snapshot = {
            let mut state = self.state.lock().unwrap();
            state.begin_session(task_id, planned_minutes);
            state.snapshot()
        };

        self.emit_state_changed(&snapshot);
        snapshot
    }

    /// Flips play/pause. The first play starts the clock and audio and lazily
    /// creates the remote record; pausing stops both and writes nothing.
    pub async fn toggle_play(&self) -> FocusSnapshot {
        let (context, snapshot) = {
            let mut state = self.state.lock().unwrap();
            if state.view != FocusView::SessionActive {
                return state.snapshot();
            }
            state.is_playing = !state.is_playing;
            let context = if state.is_playing {
                Some(PlayContext {
                    needs_create: state.persistence == Persistence::Unsaved,
                    auto_loop: Duration::from_secs(state.planned_secs) > TRACK_DURATION,
                    complete_now: state.remaining_secs == 0,
                    epoch: state.epoch,
                    task_id: state.task_id.clone(),
                    planned_secs: state.planned_secs,
                })
            } else {
                None
            };
            (context, state.snapshot())
        };

        match context {
            Some(context) => {
                // Resuming a countdown already scrubbed to zero finalizes it
                // instead of ticking in place.
                if context.complete_now {
                    self.complete_session().await;
                    return self.snapshot();
                }
                self.spawn_ticker();
                if let Err(err) = self.audio.start(context.auto_loop) {
                    warn!("Failed to start ambient audio: {err}");
                }
                if context.needs_create {
                    self.spawn_create(context.task_id, context.planned_secs, context.epoch);
                }
            }
            None => {
                self.clock.stop();
                if let Err(err) = self.audio.stop() {
                    warn!("Failed to stop ambient audio: {err}");
                }
            }
        }

        self.emit_state_changed(&snapshot);
        snapshot
    }

    /// Scrubs the progress bar. Percent is remaining percent: seeking to 0
    /// while playing completes the session, seeking to 100 rewinds it fully.
    /// Local-only: nothing is persisted until completion or explicit stop.
    pub async fn seek_to_percent(&self, percent: f64) -> FocusSnapshot {
        self.adjust_remaining(|state| state.seek_to_percent(percent))
            .await
    }

    /// Skip back: rewind the countdown to the full planned duration.
    pub async fn skip_to_start(&self) -> FocusSnapshot {
        self.adjust_remaining(|state| state.remaining_secs = state.planned_secs)
            .await
    }

    /// Skip forward: drain the countdown. Completes immediately when playing.
    pub async fn skip_to_end(&self) -> FocusSnapshot {
        self.adjust_remaining(|state| state.remaining_secs = 0)
            .await
    }

    /// Explicit cancel. Local state clears and the view returns to the
    /// duration picker no matter what the remote delete says.
    pub async fn cancel_session(&self) -> FocusSnapshot {
        self.clock.stop();
        if let Err(err) = self.audio.stop() {
            warn!("Failed to stop ambient audio: {err}");
        }

        let (persistence, snapshot) = {
            let mut state = self.state.lock().unwrap();
            let persistence = state.persistence.clone();
            state.reset_idle();
            (persistence, state.snapshot())
        };
        self.emit_state_changed(&snapshot);

        if let Persistence::Saved(id) = persistence {
            if let Err(err) = self.store.delete_session(&id).await {
                warn!("Failed to delete focus session {id}: {err}");
            }
        }
        snapshot
    }

    /// Navigation-away notification from the host. A paused, never-finalized
    /// session is silently discarded without persisting anything; a playing
    /// session keeps running.
    pub async fn on_leave_focus_page(&self) {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            if state.view != FocusView::SessionActive || state.is_playing {
                return;
            }
            state.reset_idle();
            state.snapshot()
        };

        self.clock.stop();
        if let Err(err) = self.audio.stop() {
            warn!("Failed to stop ambient audio: {err}");
        }
        self.emit_state_changed(&snapshot);
    }

    /// Clamped to `0..=100` and applied live, independent of play state.
    /// Returns the applied value.
    pub fn set_volume(&self, percent: f32) -> f32 {
        self.audio.set_volume(percent)
    }

    pub fn volume(&self) -> f32 {
        self.audio.volume()
    }

    async fn adjust_remaining(&self, mutate: impl FnOnce(&mut FocusState)) -> FocusSnapshot {
        let (reached_zero, snapshot) = {
            let mut state = self.state.lock().unwrap();
            if state.view != FocusView::SessionActive {
                return state.snapshot();
            }
            mutate(&mut state);
            (
                state.is_playing && state.remaining_secs == 0,
                state.snapshot(),
            )
        };

        if reached_zero {
            self.complete_session().await;
            return self.snapshot();
        }

        self.emit_state_changed(&snapshot);
        snapshot
    }

    fn spawn_ticker(&self) {
        let tick_state = Arc::clone(&self.state);
        let tick_events = self.events.clone();
        let completer = self.clone();

        self.clock.start(
            move || {
                let mut state = tick_state.lock().unwrap();
                let step = state.tick();
                if let TickStep::Advanced(_) = step {
                    let _ = tick_events.send(FocusEvent::StateChanged(state.snapshot()));
                }
                step
            },
            move || async move {
                completer.complete_session().await;
            },
        );
    }

    fn spawn_create(&self, task_id: Option<String>, planned_secs: u64, epoch: u64) {
        let controller = self.clone();
        tokio::spawn(async move {
            let payload = NewSession {
                task_id,
                duration: planned_secs,
                completed: false,
            };
            match controller.store.create_session(&payload).await {
                Ok(record) => {
                    let mut state = controller.state.lock().unwrap();
                    // A session that was reset or completed while the call
                    // was in flight keeps its newer state; the late id is
                    // dropped.
                    if state.epoch == epoch && state.persistence == Persistence::Unsaved {
                        state.persistence = Persistence::Saved(record.id);
                    }
                }
                Err(err) => warn!("Failed to create focus session: {err}"),
            }
        });
    }

    /// The one-way completion transition: local state settles first, then the
    /// record is finalized remotely and the source task marked done.
    async fn complete_session(&self) {
        let (summary, persistence) = {
            let mut state = self.state.lock().unwrap();
            if state.view != FocusView::SessionActive {
                // Already finalized by a concurrent path.
                return;
            }
            state.is_playing = false;
            let elapsed = state.elapsed_secs();
            let summary = CompletionSummary {
                task_id: state.task_id.clone(),
                planned_secs: state.planned_secs,
                elapsed_secs: elapsed,
                formatted_elapsed: format_clock(elapsed),
            };
            let persistence = state.persistence.clone();
            state.reset_idle();
            state.last_completion = Some(summary.clone());
            (summary, persistence)
        };

        self.clock.stop();
        if let Err(err) = self.audio.stop() {
            warn!("Failed to stop ambient audio: {err}");
        }

        let outcome = match persistence {
            Persistence::Saved(id) => self
                .store
                .update_session(
                    &id,
                    &SessionPatch {
                        duration: Some(summary.elapsed_secs),
                        completed: Some(true),
                    },
                )
                .await
                .map(|_| ()),
            Persistence::Unsaved => self
                .store
                .create_session(&NewSession {
                    task_id: summary.task_id.clone(),
                    duration: summary.elapsed_secs,
                    completed: true,
                })
                .await
                .map(|_| ()),
        };
        if let Err(err) = outcome {
            error!("Failed to record completed session: {err}");
        }

        if let Some(task_id) = summary.task_id.clone() {
            let patch = TaskPatch {
                completed: Some(true),
                ..TaskPatch::default()
            };
            if let Err(err) = self.store.update_task(&task_id, &patch).await {
                error!("Failed to mark task {task_id} completed: {err}");
            }
        }

        self.emit_state_changed(&self.snapshot());
        let _ = self.events.send(FocusEvent::SessionCompleted(summary));
    }

    fn emit_state_changed(&self, snapshot: &FocusSnapshot) {
        let _ = self
            .events
            .send(FocusEvent::StateChanged(snapshot.clone()));
    }
}
