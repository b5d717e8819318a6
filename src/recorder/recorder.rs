//! Recorder state machine.
//!
//! `Idle → Recording → Stopped → {Playing ⇄ Paused}`, with `clear` as
//! the single path back to Idle from anywhere. Every transition is
//! gated; an out-of-state request is a [`DataflowError::RecorderState`]
//! error, never a silent no-op.

use crate::error::{DataflowError, Result};
use crate::program::id::NodeId;
use crate::recorder::player::PlaybackCursor;
use crate::recorder::types::{RecordedFrame, Recording, RecordingState};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Shown to the user before a recording is discarded.
pub const CLEAR_WARNING: &str = "This action is not undoable";

pub const DEFAULT_SAMPLING_INTERVAL: Duration = Duration::from_millis(100);

/// Handle held by a consumer of the current recording. `clear` bumps
/// the recorder's generation, so stale views can be detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingView {
    generation: u64,
}

impl RecordingView {
    pub fn is_current(&self, recorder: &ProgramRecorder) -> bool {
        self.generation == recorder.generation
    }
}

#[derive(Debug)]
pub struct ProgramRecorder {
    state: RecordingState,
    sampling_interval: Duration,
    /// Capture in progress, present only while Recording.
    active: Option<Recording>,
    /// Finished capture, shared so it outlives graph edits.
    finished: Option<Arc<Recording>>,
    channels: Vec<NodeId>,
    started_at: Option<Duration>,
    last_sample: Option<Duration>,
    cursor: Option<PlaybackCursor>,
    generation: u64,
}

impl Default for ProgramRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramRecorder {
    pub fn new() -> Self {
        Self {
            state: RecordingState::Idle,
            sampling_interval: DEFAULT_SAMPLING_INTERVAL,
            active: None,
            finished: None,
            channels: Vec::new(),
            started_at: None,
            last_sample: None,
            cursor: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn sampling_interval(&self) -> Duration {
        self.sampling_interval
    }

    pub fn channels(&self) -> &[NodeId] {
        &self.channels
    }

    /// The finished recording, if one exists.
    pub fn recording(&self) -> Option<Arc<Recording>> {
        self.finished.clone()
    }

    /// Frames captured so far, whether or not the capture has finished.
    pub fn frame_count(&self) -> usize {
        self.active
            .as_ref()
            .map(|recording| recording.len())
            .or_else(|| self.finished.as_ref().map(|recording| recording.len()))
            .unwrap_or(0)
    }

    pub fn view(&self) -> RecordingView {
        RecordingView {
            generation: self.generation,
        }
    }

    fn reject(&self, action: &'static str) -> DataflowError {
        DataflowError::RecorderState {
            action,
            state: self.state,
        }
    }

    /// Begin capturing the given channels. Idle only: a previous
    /// recording must be cleared before a new one can start.
    pub fn start(
        &mut self,
        name: impl Into<String>,
        interval: Duration,
        duration_limit: Option<Duration>,
        channels: Vec<NodeId>,
    ) -> Result<()> {
        if self.state != RecordingState::Idle {
            return Err(self.reject("start"));
        }
        self.sampling_interval = interval;
        self.active = Some(Recording::new(name, interval, duration_limit));
        self.channels = channels;
        self.started_at = None;
        self.last_sample = None;
        self.state = RecordingState::Recording;
        info!(interval_ms = interval.as_millis() as u64, "recording started");
        Ok(())
    }

    /// Offer this tick's channel values. A frame is appended when the
    /// sampling interval has elapsed; hitting the duration limit stops
    /// the recording. Harmless to call in any state.
    pub fn sample(&mut self, now: Duration, values: &HashMap<NodeId, f64>) {
        if self.state != RecordingState::Recording {
            return;
        }
        let started_at = *self.started_at.get_or_insert(now);
        let timestamp = now.saturating_sub(started_at);

        if let Some(active) = &self.active {
            if let Some(limit) = active.metadata.duration_limit {
                if timestamp >= limit {
                    debug!("duration limit reached");
                    self.finalize();
                    return;
                }
            }
        }

        let due = match self.last_sample {
            Some(last) => now.saturating_sub(last) >= self.sampling_interval,
            None => true,
        };
        if !due {
            return;
        }
        self.last_sample = Some(now);

        if let Some(active) = &mut self.active {
            let values = self
                .channels
                .iter()
                .filter_map(|id| values.get(id).map(|&v| (*id, v)))
                .collect();
            active.frames.push(RecordedFrame { timestamp, values });
        }
    }

    /// Recording → Stopped. Frames are immutable from here on.
    pub fn stop(&mut self) -> Result<()> {
        if self.state != RecordingState::Recording {
            return Err(self.reject("stop"));
        }
        self.finalize();
        Ok(())
    }

    fn finalize(&mut self) {
        if let Some(active) = self.active.take() {
            info!(frames = active.len(), "recording stopped");
            self.finished = Some(Arc::new(active));
        }
        self.state = RecordingState::Stopped;
    }

    /// Stopped|Paused → Playing.
    pub fn play(&mut self) -> Result<()> {
        match self.state {
            RecordingState::Stopped => {
                let recording = self.finished.clone().ok_or(self.reject("play"))?;
                let mut cursor = PlaybackCursor::new(recording);
                cursor.resume();
                self.cursor = Some(cursor);
                self.state = RecordingState::Playing;
                Ok(())
            }
            RecordingState::Paused => {
                if let Some(cursor) = &mut self.cursor {
                    cursor.resume();
                }
                self.state = RecordingState::Playing;
                Ok(())
            }
            _ => Err(self.reject("play")),
        }
    }

    /// Playing → Paused.
    pub fn pause(&mut self) -> Result<()> {
        if self.state != RecordingState::Playing {
            return Err(self.reject("pause"));
        }
        if let Some(cursor) = &mut self.cursor {
            cursor.pause();
        }
        self.state = RecordingState::Paused;
        Ok(())
    }

    /// Current playback frame, if playing or paused. Reaching the end
    /// of the recording drops back to Stopped.
    pub fn playback_frame(&mut self) -> Option<RecordedFrame> {
        let cursor = self.cursor.as_ref()?;
        if self.state == RecordingState::Playing && cursor.is_finished() {
            self.cursor = None;
            self.state = RecordingState::Stopped;
            return None;
        }
        cursor.current_frame().cloned()
    }

    /// Discard the recording and return to Idle, from any state.
    /// Refused without explicit confirmation.
    pub fn clear(&mut self, confirmed: bool) -> Result<()> {
        if !confirmed {
            return Err(DataflowError::ConfirmationRequired(CLEAR_WARNING));
        }
        self.active = None;
        self.finished = None;
        self.cursor = None;
        self.channels.clear();
        self.started_at = None;
        self.last_sample = None;
        self.generation += 1;
        self.state = RecordingState::Idle;
        info!("recording cleared");
        Ok(())
    }

    /// Adjust the interval used by the next recording. Refused while a
    /// capture or playback is underway.
    pub fn set_sampling_interval(&mut self, interval: Duration) -> Result<()> {
        match self.state {
            RecordingState::Idle | RecordingState::Stopped => {
                self.sampling_interval = interval;
                Ok(())
            }
            _ => Err(self.reject("set sampling interval")),
        }
    }
}
