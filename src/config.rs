// Engine tuning knobs. Everything has a default so a config file only needs
// the fields it wants to change.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const MIN_BPM: f32 = 60.0;
pub const MAX_BPM: f32 = 200.0;
pub const MAX_SWING: f32 = 75.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Wall-clock interval between scheduler polls.
    pub look_ahead_ms: u64,
    /// How far past the audio clock each poll commits notes.
    pub schedule_ahead_secs: f64,
    /// Gap between pressing play and the first note.
    pub start_offset_secs: f64,
    pub master_gain: f32,
    pub accent_velocity: f32,
    pub distortion_amount: f32,
    /// Sample rate used by the offline renderer (live output follows the device).
    pub render_sample_rate: u32,
    pub command_queue: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            look_ahead_ms: 100,
            schedule_ahead_secs: 0.2,
            start_offset_secs: 0.005,
            master_gain: 0.7,
            accent_velocity: 1.7,
            distortion_amount: 400.0,
            render_sample_rate: 44100,
            command_queue: 1024,
        }
    }
}

impl EngineConfig {
    pub fn look_ahead(&self) -> Duration {
        Duration::from_millis(self.look_ahead_ms.max(1))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Each poll must commit notes far enough ahead to cover the gap until
    /// the next poll, or onsets land in the past.
    pub fn validate(&self) -> anyhow::Result<()> {
        let poll = self.look_ahead().as_secs_f64();
        anyhow::ensure!(
            self.schedule_ahead_secs.is_finite() && self.schedule_ahead_secs > poll,
            "schedule_ahead_secs ({}) must be longer than the poll interval ({poll}s)",
            self.schedule_ahead_secs
        );
        anyhow::ensure!(
            self.start_offset_secs.is_finite() && self.start_offset_secs >= 0.0,
            "start_offset_secs ({}) can't be negative",
            self.start_offset_secs
        );
        anyhow::ensure!(
            self.master_gain.is_finite() && self.master_gain >= 0.0,
            "master_gain ({}) can't be negative",
            self.master_gain
        );
        Ok(())
    }
}

pub fn clamp_bpm(bpm: f32) -> f32 {
    bpm.clamp(MIN_BPM, MAX_BPM)
}

pub fn clamp_swing(swing: f32) -> f32 {
    swing.clamp(0.0, MAX_SWING)
}
