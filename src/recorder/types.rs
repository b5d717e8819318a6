//! Recording data model and on-disk format.

use crate::error::{DataflowError, Result};
use crate::program::id::NodeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Duration;

/// Recorder lifecycle. Transitions are one-directional except for the
/// Playing/Paused pair; `clear` is the only way back to Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
    Stopped,
    Playing,
    Paused,
}

/// One sampled instant: the value of every recorded channel.
/// Timestamps are relative to the start of the recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub timestamp: Duration,
    pub values: HashMap<NodeId, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub name: String,
    pub recorded_at: DateTime<Utc>,
    pub sampling_interval: Duration,
    pub duration_limit: Option<Duration>,
}

/// A finished (or in-progress) capture of program output over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub metadata: RecordingMetadata,
    pub frames: Vec<RecordedFrame>,
}

impl Recording {
    pub fn new(
        name: impl Into<String>,
        sampling_interval: Duration,
        duration_limit: Option<Duration>,
    ) -> Self {
        Self {
            metadata: RecordingMetadata {
                name: name.into(),
                recorded_at: Utc::now(),
                sampling_interval,
                duration_limit,
            },
            frames: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Timestamp of the last frame, or zero for an empty recording.
    pub fn duration(&self) -> Duration {
        self.frames
            .last()
            .map(|frame| frame.timestamp)
            .unwrap_or(Duration::ZERO)
    }

    /// Latest frame at or before `timestamp`. Frames are appended in
    /// time order, so this is a binary search.
    pub fn find_frame_at(&self, timestamp: Duration) -> Option<&RecordedFrame> {
        let index = self
            .frames
            .partition_point(|frame| frame.timestamp <= timestamp);
        if index == 0 {
            None
        } else {
            self.frames.get(index - 1)
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .map_err(|e| DataflowError::Serialization(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| DataflowError::Serialization(e.to_string()))
    }
}
