//! Playback cursor over a finished recording.
//!
//! The cursor advances on wall-clock time rather than the live tick
//! loop, so playback runs at the recorded rate even if the program's
//! data rate has since changed. Pausing banks the elapsed offset;
//! resuming restarts the clock from there.

use crate::recorder::types::{RecordedFrame, Recording};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct PlaybackCursor {
    recording: Arc<Recording>,
    /// Position banked while paused.
    offset: Duration,
    /// Wall-clock start of the current playing stretch, None while paused.
    resumed_at: Option<Instant>,
}

impl PlaybackCursor {
    pub fn new(recording: Arc<Recording>) -> Self {
        Self {
            recording,
            offset: Duration::ZERO,
            resumed_at: None,
        }
    }

    pub fn recording(&self) -> &Arc<Recording> {
        &self.recording
    }

    pub fn resume(&mut self) {
        if self.resumed_at.is_none() {
            self.resumed_at = Some(Instant::now());
        }
    }

    pub fn pause(&mut self) {
        if let Some(resumed_at) = self.resumed_at.take() {
            self.offset += resumed_at.elapsed();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.resumed_at.is_some()
    }

    /// Current position within the recording.
    pub fn position(&self) -> Duration {
        match self.resumed_at {
            Some(resumed_at) => self.offset + resumed_at.elapsed(),
            None => self.offset,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.position() >= self.recording.duration()
    }

    /// Frame under the cursor right now.
    pub fn current_frame(&self) -> Option<&RecordedFrame> {
        self.recording.find_frame_at(self.position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::id::NodeId;
    use std::collections::HashMap;

    fn recording() -> Arc<Recording> {
        let mut rec = Recording::new("test", Duration::from_millis(100), None);
        for i in 0..3u64 {
            let mut values = HashMap::new();
            values.insert(NodeId(0), i as f64);
            rec.frames.push(RecordedFrame {
                timestamp: Duration::from_millis(i * 100),
                values,
            });
        }
        Arc::new(rec)
    }

    #[test]
    fn test_paused_cursor_holds_position() {
        let cursor = PlaybackCursor::new(recording());
        assert!(!cursor.is_playing());
        assert_eq!(cursor.position(), Duration::ZERO);
        assert_eq!(
            cursor.current_frame().map(|f| f.values[&NodeId(0)]),
            Some(0.0)
        );
    }

    #[test]
    fn test_resume_pause_banks_offset() {
        let mut cursor = PlaybackCursor::new(recording());
        cursor.resume();
        assert!(cursor.is_playing());
        cursor.pause();
        assert!(!cursor.is_playing());
        // position is frozen once paused
        let here = cursor.position();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cursor.position(), here);
    }

    #[test]
    fn test_finished_at_end() {
        let mut cursor = PlaybackCursor::new(recording());
        cursor.offset = Duration::from_millis(200);
        assert!(cursor.is_finished());
        assert_eq!(
            cursor.current_frame().map(|f| f.values[&NodeId(0)]),
            Some(2.0)
        );
    }
}
