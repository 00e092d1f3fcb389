//! One-shot note graphs.
//!
//! A `NoteGraph` is the complete, self-contained description of a single drum
//! hit: its sources (oscillators or noise, each optionally filtered), one gain
//! envelope they all feed, and the route from that gain to the master bus.
//! Every node carries absolute start/stop times on the audio clock, so once a
//! graph is submitted it plays out and ends on its own.

use std::sync::Arc;

use crate::audio::note_id::NoteId;
use crate::audio::param::Automation;
use crate::audio::ShapingCurve;
use crate::shared::{DrumKit, DrumType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
}

impl Waveform {
    /// `phase` in cycles, [0, 1).
    #[inline]
    pub fn sample(self, phase: f64) -> f32 {
        match self {
            Waveform::Sine => (std::f64::consts::TAU * phase).sin() as f32,
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => {
                let p = phase as f32;
                if p < 0.25 {
                    4.0 * p
                } else if p < 0.75 {
                    2.0 - 4.0 * p
                } else {
                    4.0 * p - 4.0
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    Highpass,
    Bandpass,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FilterNode {
    pub kind: FilterKind,
    pub frequency: Automation,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SourceKind {
    Oscillator { waveform: Waveform, frequency: Automation },
    Noise { seed: u64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SourceNode {
    pub kind: SourceKind,
    pub filter: Option<FilterNode>, // between the source and the note gain
    pub start: f64,
    pub stop: f64,
}

impl SourceNode {
    pub fn is_noise(&self) -> bool {
        matches!(self.kind, SourceKind::Noise { .. })
    }
}

/// Where the note gain goes.
#[derive(Clone, Debug)]
pub enum Route {
    Master,
    Shaped(Arc<ShapingCurve>),
    Filtered(FilterNode),
}

impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Route::Master, Route::Master) => true,
            (Route::Shaped(a), Route::Shaped(b)) => Arc::ptr_eq(a, b),
            (Route::Filtered(a), Route::Filtered(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NoteGraph {
    pub id: NoteId,
    pub drum: DrumType,
    pub kit: DrumKit,
    pub onset: f64,
    pub velocity: f32,
    pub sources: Vec<SourceNode>,
    pub gain: Automation,
    pub route: Route,
}

impl NoteGraph {
    /// After this the graph is silent and can be torn down.
    pub fn end_time(&self) -> f64 {
        let stop = self.sources.iter().map(|s| s.stop).fold(self.onset, f64::max);
        self.gain.last_event_time().map_or(stop, |t| stop.max(t))
    }

    pub fn is_shaped(&self) -> bool {
        matches!(self.route, Route::Shaped(_))
    }

    /// Gain the envelope starts from at the onset.
    pub fn initial_gain(&self) -> f32 {
        self.gain.initial_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waveforms_stay_in_range() {
        for wave in [Waveform::Sine, Waveform::Square, Waveform::Triangle] {
            for i in 0..100 {
                let s = wave.sample(i as f64 / 100.0);
                assert!((-1.0..=1.0).contains(&s), "{wave:?} gave {s}");
            }
        }
        assert_eq!(Waveform::Triangle.sample(0.0), 0.0);
        assert_eq!(Waveform::Triangle.sample(0.25), 1.0);
        assert_eq!(Waveform::Square.sample(0.75), -1.0);
    }
}
