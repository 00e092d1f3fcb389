//! The song document: the pattern plus the groove settings the engine reads live.
//!
//! Field names follow the exported pattern files (`songName`, `bpm`, `kit`,
//! `bars`, `swing`, `distortion`) so those files load unchanged.
use serde::{Deserialize, Serialize};

use crate::config::{clamp_bpm, clamp_swing};
use crate::shared::{DrumKit, DrumType};

use super::pattern::Pattern;

pub const DEFAULT_BPM: f32 = 80.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    #[serde(default, rename = "songName")]
    pub name: String,
    pub bpm: f32,
    pub kit: DrumKit,
    #[serde(default)]
    pub swing: f32,
    #[serde(default)]
    pub distortion: DistortionSettings,
    pub bars: Pattern,
}

impl Default for Song {
    fn default() -> Self {
        Self {
            name: String::new(),
            bpm: DEFAULT_BPM,
            kit: DrumKit::default(),
            swing: 0.0,
            distortion: DistortionSettings::default(),
            bars: Pattern::backbeat(),
        }
    }
}

impl Song {
    pub fn set_bpm(&mut self, bpm: f32) {
        self.bpm = clamp_bpm(bpm);
    }

    pub fn set_swing(&mut self, swing: f32) {
        self.swing = clamp_swing(swing);
    }

    /// Snapshot of the values the scheduler reads on each poll.
    pub fn groove(&self) -> Groove {
        Groove {
            bpm: clamp_bpm(self.bpm),
            swing: clamp_swing(self.swing),
            kit: self.kit,
        }
    }
}

/// Tempo and feel for one scheduler poll.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Groove {
    pub bpm: f32,   // quarter notes per minute
    pub swing: f32, // 0..=75, percent
    pub kit: DrumKit,
}

impl Default for Groove {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            swing: 0.0,
            kit: DrumKit::default(),
        }
    }
}

impl Groove {
    pub fn seconds_per_sixteenth(&self) -> f64 {
        60.0 / self.bpm as f64 / 4.0
    }

    /// Delay added to odd steps. Never reaches a full step, so onsets stay ordered.
    pub fn swing_offset(&self, beat: usize) -> f64 {
        if beat % 2 == 1 && self.swing > 0.0 {
            self.seconds_per_sixteenth() * (self.swing as f64 / 100.0) * 0.5
        } else {
            0.0
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistortionSettings {
    pub kick: bool,
    pub snare: bool,
    pub clap: bool,
}

impl DistortionSettings {
    pub fn get(&self, drum: DrumType) -> bool {
        match drum {
            DrumType::Kick => self.kick,
            DrumType::Snare => self.snare,
            DrumType::Clap => self.clap,
            _ => false,
        }
    }

    /// Ignored for drums without a waveshaper.
    pub fn set(&mut self, drum: DrumType, enabled: bool) {
        match drum {
            DrumType::Kick => self.kick = enabled,
            DrumType::Snare => self.snare = enabled,
            DrumType::Clap => self.clap = enabled,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteenth_length_follows_bpm() {
        let g = Groove { bpm: 120.0, ..Groove::default() };
        assert!((g.seconds_per_sixteenth() - 0.125).abs() < 1e-12);
        let g = Groove { bpm: 60.0, ..Groove::default() };
        assert!((g.seconds_per_sixteenth() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn swing_only_delays_odd_steps() {
        let g = Groove { bpm: 120.0, swing: 50.0, kit: DrumKit::Tr808 };
        assert_eq!(g.swing_offset(0), 0.0);
        assert!((g.swing_offset(1) - 0.03125).abs() < 1e-12);
        assert_eq!(g.swing_offset(2), 0.0);
        assert!((g.swing_offset(15) - 0.03125).abs() < 1e-12);
    }

    #[test]
    fn swing_never_reaches_the_next_step() {
        let g = Groove { bpm: 200.0, swing: 75.0, kit: DrumKit::Rock };
        assert!(g.swing_offset(1) < g.seconds_per_sixteenth());
    }

    #[test]
    fn groove_snapshot_is_clamped() {
        let song = Song { bpm: 999.0, swing: 120.0, ..Song::default() };
        let g = song.groove();
        assert_eq!(g.bpm, 200.0);
        assert_eq!(g.swing, 75.0);
    }

    #[test]
    fn distortion_only_tracks_shaped_drums() {
        let mut d = DistortionSettings::default();
        d.set(DrumType::Snare, true);
        d.set(DrumType::Hihat, true);
        assert!(d.get(DrumType::Snare));
        assert!(!d.get(DrumType::Hihat));
        assert!(!d.get(DrumType::Kick));
    }

    #[test]
    fn exported_file_shape_loads() {
        let json = r#"{
            "songName": "Groove",
            "bpm": 95,
            "kit": "808",
            "bars": [{
                "kick":    [true,false,false,false,false,false,false,false,true,false,false,false,false,false,false,false],
                "snare":   [false,false,false,false,true,false,false,false,false,false,false,false,true,false,false,false],
                "hihat":   [true,false,true,false,true,false,true,false,true,false,true,false,true,false,true,false],
                "openhat": [false,false,false,false,false,false,false,false,false,false,false,false,false,false,false,false],
                "clap":    [false,false,false,false,false,false,false,false,false,false,false,false,false,false,false,false],
                "tom":     [false,false,false,false,false,false,false,false,false,false,false,false,false,false,false,false],
                "rim":     [false,false,false,false,false,false,false,false,false,false,false,false,false,false,false,false],
                "cowbell": [false,false,false,false,false,false,false,false,false,false,false,false,false,false,false,false]
            }],
            "exportedAt": "2025-10-26T19:02:25.620Z",
            "version": "1.1"
        }"#;
        let song: Song = serde_json::from_str(json).unwrap();
        assert_eq!(song.name, "Groove");
        assert_eq!(song.kit, DrumKit::Tr808);
        assert_eq!(song.swing, 0.0);
        assert_eq!(song.distortion, DistortionSettings::default());
        assert_eq!(song.bars.len(), 1);
        assert!(song.bars.bar(0).unwrap().snare[12]);
    }
}
