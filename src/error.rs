use thiserror::Error;

use crate::audio_api::OutputState;
use crate::shared::{MAX_BARS, STEPS_PER_BAR};

/// Transport and audio output failures. All of these are caller errors:
/// nothing inside the engine retries them.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("audio output is not running (state: {0:?})")]
    OutputNotRunning(OutputState),

    #[error("audio output has been closed")]
    OutputClosed,

    #[error("cannot play an empty pattern")]
    EmptyPattern,

    #[error("audio device error: {0}")]
    Device(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern already has the maximum of {MAX_BARS} bars")]
    Full,

    #[error("a pattern needs at least one bar")]
    LastBar,

    #[error("bar {index} out of range (pattern has {len} bars)")]
    BarOutOfRange { index: usize, len: usize },

    #[error("step {0} out of range (bars have {STEPS_PER_BAR} steps)")]
    StepOutOfRange(usize),
}
