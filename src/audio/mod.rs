pub mod white_noise;

use white_noise::WhiteNoise;

use rodio::{OutputStream, Sink, Source};
use std::sync::{
    atomic::{AtomicBool, AtomicU32, Ordering},
    mpsc::{self, RecvTimeoutError, Sender},
    Arc, Mutex,
};
use std::thread;
use std::time::Duration;

use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

/// Length of one pass of the synthesized ambient track.
pub const TRACK_DURATION: Duration = Duration::from_secs(3600);

pub const DEFAULT_VOLUME_PERCENT: f32 = 70.0;

/// How often the engine thread wakes between commands to check for
/// end-of-track.
const DRAIN_POLL: Duration = Duration::from_millis(250);

enum AudioCommand {
    Start { auto_loop: bool },
    Stop,
    SetGain(f32),
}

/// Handle to the ambient audio engine. Playback runs on a dedicated thread
/// holding the non-`Send` output objects; every operation here is a
/// best-effort command send. Audio failures never propagate past this module.
#[derive(Clone)]
pub struct AmbientAudioHandle {
    tx: Arc<Mutex<Option<Sender<AudioCommand>>>>,
    is_playing: Arc<AtomicBool>,
    loop_count: Arc<AtomicU32>,
    volume_percent: Arc<Mutex<f32>>,
}

impl AmbientAudioHandle {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
            is_playing: Arc::new(AtomicBool::new(false)),
            loop_count: Arc::new(AtomicU32::new(0)),
            volume_percent: Arc::new(Mutex::new(DEFAULT_VOLUME_PERCENT)),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>, String> {
        if let Some(tx) = self.tx.lock().map_err(|e| e.to_string())?.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();
        let is_playing = Arc::clone(&self.is_playing);
        let loop_count = Arc::clone(&self.loop_count);
        let initial_gain = *self.volume_percent.lock().map_err(|e| e.to_string())? / 100.0;

        // Spawn dedicated audio thread holding non-Send audio objects
        thread::Builder::new()
            .name("audio-engine".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;
                let mut gain = initial_gain;
                let mut auto_loop = false;

                fn ensure_sink(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                ) -> Result<(), String> {
                    if sink.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .map_err(|e| format!("Failed to create audio output stream: {}", e))?;
                        let new_sink = Sink::try_new(&handle)
                            .map_err(|e| format!("Failed to create audio sink: {}", e))?;
                        *stream = Some(s);
                        *sink = Some(new_sink);
                    }
                    Ok(())
                }

                loop {
                    match rx.recv_timeout(DRAIN_POLL) {
                        Ok(AudioCommand::Start { auto_loop: requested }) => {
                            // Stop any existing playback and restart from
                            // position zero.
                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            _stream = None;
                            match ensure_sink(&mut _stream, &mut sink) {
                                Ok(()) => {
                                    if let Some(ref s) = sink {
                                        s.set_volume(gain);
                                        s.append(WhiteNoise::new().take_duration(TRACK_DURATION));
                                        s.play();
                                    }
                                    auto_loop = requested;
                                    is_playing.store(true, Ordering::SeqCst);
                                }
                                Err(err) => {
                                    log_warn!("Ambient audio unavailable: {err}");
                                    is_playing.store(false, Ordering::SeqCst);
                                }
                            }
                        }
                        Ok(AudioCommand::Stop) => {
                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            _stream = None;
                            is_playing.store(false, Ordering::SeqCst);
                        }
                        Ok(AudioCommand::SetGain(g)) => {
                            gain = g.clamp(0.0, 1.0);
                            if let Some(ref s) = sink {
                                s.set_volume(gain);
                            }
                        }
                        Err(RecvTimeoutError::Timeout) => {
                            // End-of-track: restart from zero while playback
                            // is still wanted on a long session.
                            let drained = sink.as_ref().map_or(false, |s| s.empty());
                            if drained && auto_loop && is_playing.load(Ordering::SeqCst) {
                                if let Some(ref s) = sink {
                                    s.append(WhiteNoise::new().take_duration(TRACK_DURATION));
                                    s.play();
                                    let loops = loop_count.fetch_add(1, Ordering::SeqCst) + 1;
                                    log_info!("Ambient track looped ({loops} loops)");
                                }
                            }
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        let tx_clone = tx.clone();
        *self.tx.lock().map_err(|e| e.to_string())? = Some(tx);
        Ok(tx_clone)
    }

    /// Rewinds to position zero and begins playback at the stored volume.
    /// With `auto_loop` set, the engine restarts the track from zero whenever
    /// it drains while playback is still active; sessions at or under the
    /// track length play a single pass.
    pub fn start(&self, auto_loop: bool) -> Result<(), String> {
        let tx = self.ensure_thread()?;
        self.loop_count.store(0, Ordering::SeqCst);
        tx.send(AudioCommand::Start { auto_loop })
            .map_err(|e| e.to_string())
    }

    /// Pauses and rewinds to position zero. Idempotent.
    pub fn stop(&self) -> Result<(), String> {
        if let Ok(Some(tx)) = self.tx.lock().map(|g| g.clone()) {
            let _ = tx.send(AudioCommand::Stop);
        }
        Ok(())
    }

    /// Clamps to `0..=100`, applies to live output immediately, and keeps the
    /// value for future starts. Returns the clamped percent.
    pub fn set_volume(&self, percent: f32) -> f32 {
        let clamped = percent.clamp(0.0, 100.0);
        if let Ok(mut volume) = self.volume_percent.lock() {
            *volume = clamped;
        }
        match self.ensure_thread() {
            Ok(tx) => {
                let _ = tx.send(AudioCommand::SetGain(clamped / 100.0));
            }
            Err(err) => log_warn!("Audio engine unavailable: {err}"),
        }
        clamped
    }

    pub fn volume(&self) -> f32 {
        self.volume_percent
            .lock()
            .map(|v| *v)
            .unwrap_or(DEFAULT_VOLUME_PERCENT)
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing.load(Ordering::SeqCst)
    }

    /// How many times the track restarted during the current playback.
    pub fn loop_count(&self) -> u32 {
        self.loop_count.load(Ordering::SeqCst)
    }
}

impl Default for AmbientAudioHandle {
    fn default() -> Self {
        Self::new()
    }
}
