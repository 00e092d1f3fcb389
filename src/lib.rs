//! stepkit: a 16-step drum machine engine.
//!
//! A song's pattern is played by a [`DrumMachine`]: a look-ahead scheduler
//! commits steps against the audio clock, each active drum becomes a one-shot
//! [`NoteGraph`] built from its kit's recipe, and an [`AudioOutput`] plays it.

pub mod audio;
pub mod audio_api;
pub mod config;
pub mod error;
pub mod middle;
pub mod pipeline;
pub mod sequencer;
pub mod shared;
pub mod synth;

pub use audio::{AudioHandle, OfflineOutput};
pub use audio_api::{AudioOutput, OutputState};
pub use config::EngineConfig;
pub use error::{EngineError, PatternError};
pub use pipeline::{Bar, DistortionSettings, Groove, Pattern, Song};
pub use sequencer::{DrumMachine, PatternSource};
pub use shared::{DrumKit, DrumType, PlaybackState, Position};
pub use synth::{NoteGraph, Synthesizer};
