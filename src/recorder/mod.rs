//! Capture and playback of program output.
//!
//! The recorder samples selected node channels on its own cadence,
//! independent of the evaluator's data rate, and plays finished
//! recordings back at the recorded rate.

pub mod player;
#[allow(clippy::module_inception)]
pub mod recorder;
pub mod types;

pub use player::PlaybackCursor;
pub use recorder::{ProgramRecorder, RecordingView, CLEAR_WARNING, DEFAULT_SAMPLING_INTERVAL};
pub use types::{RecordedFrame, Recording, RecordingMetadata, RecordingState};
