//! Drum synthesis: turns a (drum, kit, time, velocity) request into a
//! `NoteGraph` the audio side can play.

mod graph;
pub mod recipes;
mod shaping;

pub use graph::{FilterKind, FilterNode, NoteGraph, Route, SourceKind, SourceNode, Waveform};
pub use shaping::SignalShaping;

use crate::audio::note_id::{next_note_id, NoteId};
use crate::audio::param::Automation;
use crate::shared::{DrumKit, DrumType};

use recipes::{Envelope, NoiseFilter, Output, Recipe, SourceSpec};

// what an unautomated Web Audio biquad starts at
const FILTER_DEFAULT_HZ: f32 = 350.0;

/// Owns the signal shaping unit and builds note graphs against it.
#[derive(Clone, Debug)]
pub struct Synthesizer {
    shaping: SignalShaping,
}

impl Synthesizer {
    pub fn new(distortion_amount: f32) -> Self {
        Self { shaping: SignalShaping::new(distortion_amount) }
    }

    pub fn shaping(&self) -> &SignalShaping {
        &self.shaping
    }

    pub fn shaping_mut(&mut self) -> &mut SignalShaping {
        &mut self.shaping
    }

    pub fn note(&self, drum: DrumType, kit: DrumKit, onset: f64, velocity: f32) -> NoteGraph {
        build_note(next_note_id(), drum, kit, onset, velocity, &self.shaping)
    }
}

/// Pure apart from reading the current distortion flags.
pub fn build_note(
    id: NoteId,
    drum: DrumType,
    kit: DrumKit,
    onset: f64,
    velocity: f32,
    shaping: &SignalShaping,
) -> NoteGraph {
    let recipe: &Recipe = recipes::recipe(kit, drum);

    let sources = recipe
        .sources
        .iter()
        .map(|spec| instantiate(spec, id, onset))
        .collect();

    let route = match recipe.output {
        Output::Master => Route::Master,
        Output::Distortable => match shaping.active_curve(drum) {
            Some(curve) => Route::Shaped(curve),
            None => Route::Master,
        },
        Output::Bandpass(hz) => Route::Filtered(FilterNode {
            kind: FilterKind::Bandpass,
            frequency: Automation::constant(hz as f32),
        }),
    };

    NoteGraph {
        id,
        drum,
        kit,
        onset,
        velocity,
        sources,
        gain: envelope(&recipe.envelope, onset, velocity),
        route,
    }
}

fn at(onset: f64, secs: f32) -> f64 {
    onset + secs as f64
}

fn instantiate(spec: &SourceSpec, id: NoteId, t: f64) -> SourceNode {
    match *spec {
        SourceSpec::Tone { wave, freq, len } => SourceNode {
            kind: SourceKind::Oscillator { waveform: wave, frequency: Automation::constant(freq) },
            filter: None,
            start: t,
            stop: at(t, len),
        },
        SourceSpec::Sweep { wave, from, to, len } => SourceNode {
            kind: SourceKind::Oscillator {
                waveform: wave,
                frequency: Automation::constant(from)
                    .set_value_at(from, t)
                    .exponential_ramp_to(to, at(t, len)),
            },
            filter: None,
            start: t,
            stop: at(t, len),
        },
        SourceSpec::Noise { filter, len } => SourceNode {
            kind: SourceKind::Noise { seed: id.0 },
            filter: filter.map(|f| match f {
                NoiseFilter::Fixed { kind, freq } => FilterNode {
                    kind,
                    frequency: Automation::constant(freq),
                },
                NoiseFilter::Sweep { kind, from, to, len } => FilterNode {
                    kind,
                    frequency: Automation::constant(FILTER_DEFAULT_HZ)
                        .set_value_at(from, t)
                        .linear_ramp_to(to, at(t, len)),
                },
            }),
            start: t,
            stop: at(t, len),
        },
    }
}

fn envelope(env: &Envelope, t: f64, velocity: f32) -> Automation {
    let start = if env.velocity { env.level * velocity } else { env.level };
    let mut gain = Automation::constant(1.0).set_value_at(start, t);
    if let Some((value, secs)) = env.peak {
        gain = gain.exponential_ramp_to(value, at(t, secs));
    }
    if let Some((value, secs)) = env.knee {
        gain = gain.exponential_ramp_to(value, at(t, secs));
    }
    gain.exponential_ramp_to(env.floor, at(t, env.len))
}
