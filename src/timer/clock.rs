use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::{task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use crate::log_info;

const ENABLE_LOGS: bool = false;

/// Outcome of one clock tick, decided by the owner of the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStep {
    /// Decremented; carries the new remaining value.
    Advanced(u64),
    /// The guard refused the decrement (paused, or already at zero).
    Held,
    /// This decrement drove remaining to zero.
    Reached,
}

struct RunningClock {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// One-tick-per-period scheduler. Owns no session state: the tick closure
/// applies the decrement and reports what happened, and the zero future runs
/// exactly once when a tick reaches zero.
#[derive(Clone)]
pub struct CountdownClock {
    running: Arc<Mutex<Option<RunningClock>>>,
    period: Duration,
}

impl CountdownClock {
    pub fn new() -> Self {
        Self::with_period(Duration::from_secs(1))
    }

    /// A clock ticking at something other than wall seconds, for tests and
    /// fast demo runs.
    pub fn with_period(period: Duration) -> Self {
        Self {
            running: Arc::new(Mutex::new(None)),
            period,
        }
    }

    /// Begins ticking. A clock that is already running is halted first, so
    /// two tickers never run at once.
    pub fn start<T, Z, F>(&self, mut on_tick: T, on_zero: Z)
    where
        T: FnMut() -> TickStep + Send + 'static,
        Z: FnOnce() -> F + Send + 'static,
        F: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let ticker_token = token.clone();
        let period = self.period;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(period);
            // The first interval tick completes immediately; consume it so
            // the first decrement lands one full period after start.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = ticker_token.cancelled() => break,
                    _ = interval.tick() => match on_tick() {
                        TickStep::Advanced(_) | TickStep::Held => {}
                        TickStep::Reached => {
                            log_info!("Countdown reached zero");
                            on_zero().await;
                            break;
                        }
                    },
                }
            }
        });

        let mut guard = self.running.lock().unwrap();
        if let Some(previous) = guard.replace(RunningClock { token, handle }) {
            previous.token.cancel();
            previous.handle.abort();
        }
    }

    /// Halts ticking. Idempotent, and safe to call from inside the zero
    /// callback: cancellation is a flag the ticker observes, not an abort.
    pub fn stop(&self) {
        if let Some(running) = self.running.lock().unwrap().take() {
            running.token.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap()
            .as_ref()
            .map_or(false, |running| !running.handle.is_finished())
    }
}

impl Default for CountdownClock {
    fn default() -> Self {
        Self::new()
    }
}
