//! Per-kit drum recipes.
//!
//! Each kit is a fixed table, one recipe per drum type in `DrumType::ALL`
//! order. Drums a kit doesn't voice specifically point at the kit's fallback
//! tone, so every (kit, drum) pair resolves to something playable.
//!
//! Kits are not uniform: a few route every drum through the
//! distortion stage while most send toms, rims and cowbells straight to the
//! master bus, and only some honor velocity on the snare.

use crate::shared::{DrumKit, DrumType, NUM_DRUMS};

use super::graph::Waveform::{Sine, Square, Triangle};
use super::graph::{FilterKind, Waveform};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SourceSpec {
    /// Fixed-pitch oscillator, stops `len` seconds after the onset.
    Tone { wave: Waveform, freq: f32, len: f32 },
    /// Oscillator whose pitch falls exponentially from `from` to `to` over `len`.
    Sweep { wave: Waveform, from: f32, to: f32, len: f32 },
    /// Burst from a fresh white-noise buffer.
    Noise { filter: Option<NoiseFilter>, len: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NoiseFilter {
    Fixed { kind: FilterKind, freq: f32 },
    /// Cutoff moves linearly from `from` to `to` over `len`.
    Sweep { kind: FilterKind, from: f32, to: f32, len: f32 },
}

/// Gain envelope. Starts at `level` (times velocity if `velocity`), then
/// ramps exponentially through the optional `peak` and `knee` stages and
/// lands on `floor` at `len`. Stage times are seconds after the onset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    pub level: f32,
    pub velocity: bool,
    pub peak: Option<(f32, f32)>,
    pub knee: Option<(f32, f32)>,
    pub floor: f32,
    pub len: f32,
}

impl Envelope {
    const fn decay(level: f32, floor: f32, len: f32) -> Self {
        Self { level, velocity: false, peak: None, knee: None, floor, len }
    }

    const fn with_velocity(self) -> Self {
        Self { velocity: true, ..self }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Output {
    Master,
    /// Through the drum's waveshaper when it has one and it's enabled.
    Distortable,
    /// Through a fixed band-pass at this center frequency.
    Bandpass(u32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Recipe {
    pub sources: &'static [SourceSpec],
    pub envelope: Envelope,
    pub output: Output,
}

pub type KitTable = [Recipe; NUM_DRUMS];

pub fn recipe(kit: DrumKit, drum: DrumType) -> &'static Recipe {
    &kit_table(kit)[drum.index()]
}

pub fn kit_table(kit: DrumKit) -> &'static KitTable {
    match kit {
        DrumKit::Tr808 => &TR808,
        DrumKit::Rock => &ROCK,
        DrumKit::Jazz => &JAZZ,
        DrumKit::Trap => &TRAP,
        DrumKit::Lofi => &LOFI,
        DrumKit::Electro => &ELECTRO,
        DrumKit::Vintage => &VINTAGE,
        DrumKit::House => &HOUSE,
        DrumKit::Dnb => &DNB,
        DrumKit::Techno => &TECHNO,
    }
}

// shorthands for the tables below

const fn tone(wave: Waveform, freq: f32, len: f32) -> SourceSpec {
    SourceSpec::Tone { wave, freq, len }
}

const fn sweep(wave: Waveform, from: f32, to: f32, len: f32) -> SourceSpec {
    SourceSpec::Sweep { wave, from, to, len }
}

const fn highpass(freq: f32, len: f32) -> SourceSpec {
    SourceSpec::Noise { filter: Some(NoiseFilter::Fixed { kind: FilterKind::Highpass, freq }), len }
}

const fn bandpass(freq: f32, len: f32) -> SourceSpec {
    SourceSpec::Noise { filter: Some(NoiseFilter::Fixed { kind: FilterKind::Bandpass, freq }), len }
}

const fn noise(len: f32) -> SourceSpec {
    SourceSpec::Noise { filter: None, len }
}

// metallic hat: six detuned squares over a 40 Hz fundamental
const HAT_ROOT: f32 = 40.0;

const fn metal(len: f32) -> [SourceSpec; 6] {
    [
        tone(Square, HAT_ROOT * 2.0, len),
        tone(Square, HAT_ROOT * 3.0, len),
        tone(Square, HAT_ROOT * 4.16, len),
        tone(Square, HAT_ROOT * 5.43, len),
        tone(Square, HAT_ROOT * 6.79, len),
        tone(Square, HAT_ROOT * 8.21, len),
    ]
}

const METAL_CLOSED: [SourceSpec; 6] = metal(0.05);
const METAL_OPEN: [SourceSpec; 6] = metal(0.3);

static TR808: KitTable = [
    // kick
    Recipe {
        sources: &[sweep(Sine, 150.0, 0.001, 0.5)],
        envelope: Envelope::decay(1.0, 0.001, 0.5).with_velocity(),
        output: Output::Distortable,
    },
    // snare
    Recipe {
        sources: &[highpass(1000.0, 0.2)],
        envelope: Envelope::decay(0.7, 0.01, 0.2).with_velocity(),
        output: Output::Distortable,
    },
    // hihat
    Recipe {
        sources: &[highpass(7000.0, 0.05)],
        envelope: Envelope::decay(0.5, 0.01, 0.05),
        output: Output::Distortable,
    },
    // openhat
    Recipe {
        sources: &[highpass(7000.0, 0.3)],
        envelope: Envelope::decay(0.5, 0.01, 0.3),
        output: Output::Distortable,
    },
    // clap
    Recipe {
        sources: &[noise(0.1)],
        envelope: Envelope::decay(0.7, 0.01, 0.1),
        output: Output::Distortable,
    },
    // tom
    Recipe {
        sources: &[sweep(Sine, 220.0, 60.0, 0.3)],
        envelope: Envelope::decay(0.8, 0.01, 0.3),
        output: Output::Distortable,
    },
    // rim
    Recipe {
        sources: &[tone(Square, 400.0, 0.03)],
        envelope: Envelope::decay(0.5, 0.01, 0.03),
        output: Output::Distortable,
    },
    // cowbell
    Recipe {
        sources: &[tone(Sine, 540.0, 0.2)],
        envelope: Envelope::decay(0.6, 0.01, 0.2),
        output: Output::Distortable,
    },
];

static ROCK: KitTable = [
    Recipe {
        sources: &[sweep(Triangle, 120.0, 0.001, 0.5), tone(Sine, 80.0, 0.5)],
        envelope: Envelope::decay(1.0, 0.001, 0.5).with_velocity(),
        output: Output::Distortable,
    },
    Recipe {
        sources: &[
            SourceSpec::Noise {
                filter: Some(NoiseFilter::Sweep {
                    kind: FilterKind::Highpass,
                    from: 100.0,
                    to: 1000.0,
                    len: 0.2,
                }),
                len: 0.2,
            },
            tone(Triangle, 100.0, 0.1),
        ],
        envelope: Envelope::decay(0.7, 0.01, 0.1).with_velocity(),
        output: Output::Distortable,
    },
    Recipe {
        sources: &METAL_CLOSED,
        envelope: Envelope {
            level: 0.00001,
            velocity: false,
            peak: Some((1.0, 0.02)),
            knee: None,
            floor: 0.01,
            len: 0.05,
        },
        output: Output::Bandpass(10000),
    },
    Recipe {
        sources: &METAL_OPEN,
        envelope: Envelope {
            level: 0.00001,
            velocity: false,
            peak: Some((1.0, 0.02)),
            knee: Some((0.3, 0.1)),
            floor: 0.01,
            len: 0.3,
        },
        output: Output::Bandpass(10000),
    },
    Recipe {
        sources: &[noise(0.1)],
        envelope: Envelope::decay(0.7, 0.01, 0.1),
        output: Output::Distortable,
    },
    Recipe {
        sources: &[sweep(Sine, 220.0, 50.0, 0.4)],
        envelope: Envelope::decay(0.8, 0.01, 0.4),
        output: Output::Distortable,
    },
    Recipe {
        sources: &[tone(Square, 400.0, 0.03)],
        envelope: Envelope::decay(0.5, 0.01, 0.03),
        output: Output::Distortable,
    },
    Recipe {
        sources: &[tone(Sine, 540.0, 0.2), tone(Sine, 800.0, 0.2)],
        envelope: Envelope::decay(0.6, 0.01, 0.2),
        output: Output::Distortable,
    },
];

static JAZZ: KitTable = [
    Recipe {
        sources: &[sweep(Sine, 100.0, 0.001, 0.3)],
        envelope: Envelope::decay(0.7, 0.001, 0.3),
        output: Output::Master,
    },
    Recipe {
        sources: &[highpass(1000.0, 0.15)],
        envelope: Envelope::decay(0.5, 0.01, 0.15).with_velocity(),
        output: Output::Distortable,
    },
    Recipe {
        sources: &[highpass(9000.0, 0.08)],
        envelope: Envelope::decay(0.3, 0.01, 0.08),
        output: Output::Distortable,
    },
    Recipe {
        sources: &[highpass(9000.0, 0.4)],
        envelope: Envelope::decay(0.3, 0.01, 0.4),
        output: Output::Distortable,
    },
    Recipe {
        sources: &[noise(0.1)],
        envelope: Envelope::decay(0.5, 0.01, 0.1),
        output: Output::Distortable,
    },
    Recipe {
        sources: &[sweep(Sine, 180.0, 60.0, 0.35)],
        envelope: Envelope::decay(0.6, 0.01, 0.35),
        output: Output::Master,
    },
    Recipe {
        sources: &[tone(Square, 320.0, 0.04)],
        envelope: Envelope::decay(0.4, 0.01, 0.04),
        output: Output::Master,
    },
    Recipe {
        sources: &[tone(Sine, 480.0, 0.25)],
        envelope: Envelope::decay(0.5, 0.01, 0.25),
        output: Output::Master,
    },
];

static TRAP: KitTable = [
    Recipe {
        sources: &[sweep(Sine, 160.0, 20.0, 0.6)],
        envelope: Envelope::decay(1.2, 0.001, 0.6),
        output: Output::Master,
    },
    Recipe {
        sources: &[highpass(2000.0, 0.15)],
        envelope: Envelope::decay(0.8, 0.01, 0.15).with_velocity(),
        output: Output::Distortable,
    },
    Recipe {
        sources: &[highpass(10000.0, 0.04)],
        envelope: Envelope::decay(0.6, 0.01, 0.04),
        output: Output::Distortable,
    },
    Recipe {
        sources: &[highpass(10000.0, 0.35)],
        envelope: Envelope::decay(0.6, 0.01, 0.35),
        output: Output::Distortable,
    },
    Recipe {
        sources: &[noise(0.08)],
        envelope: Envelope::decay(0.8, 0.01, 0.08),
        output: Output::Distortable,
    },
    Recipe {
        sources: &[sweep(Sine, 240.0, 70.0, 0.25)],
        envelope: Envelope::decay(0.9, 0.01, 0.25),
        output: Output::Master,
    },
    Recipe {
        sources: &[tone(Square, 450.0, 0.02)],
        envelope: Envelope::decay(0.5, 0.01, 0.02),
        output: Output::Master,
    },
    Recipe {
        sources: &[tone(Sine, 600.0, 0.18)],
        envelope: Envelope::decay(0.7, 0.01, 0.18),
        output: Output::Master,
    },
];

static LOFI: KitTable = [
    Recipe {
        sources: &[sweep(Sine, 110.0, 30.0, 0.45)],
        envelope: Envelope::decay(0.8, 0.001, 0.45),
        output: Output::Master,
    },
    Recipe {
        sources: &[highpass(800.0, 0.2)],
        envelope: Envelope::decay(0.5, 0.01, 0.2).with_velocity(),
        output: Output::Distortable,
    },
    Recipe {
        sources: &[highpass(6000.0, 0.06)],
        envelope: Envelope::decay(0.4, 0.01, 0.06),
        output: Output::Distortable,
    },
    Recipe {
        sources: &[highpass(6000.0, 0.35)],
        envelope: Envelope::decay(0.4, 0.01, 0.35),
        output: Output::Distortable,
    },
    Recipe {
        sources: &[noise(0.12)],
        envelope: Envelope::decay(0.6, 0.01, 0.12),
        output: Output::Distortable,
    },
    Recipe {
        sources: &[sweep(Sine, 190.0, 65.0, 0.35)],
        envelope: Envelope::decay(0.7, 0.01, 0.35),
        output: Output::Master,
    },
    Recipe {
        sources: &[tone(Square, 350.0, 0.04)],
        envelope: Envelope::decay(0.4, 0.01, 0.04),
        output: Output::Master,
    },
    Recipe {
        sources: &[tone(Sine, 500.0, 0.2)],
        envelope: Envelope::decay(0.5, 0.01, 0.2),
        output: Output::Master,
    },
];

const ELECTRO_FALLBACK: Recipe = Recipe {
    sources: &[tone(Square, 300.0, 0.1)],
    envelope: Envelope::decay(0.6, 0.01, 0.1),
    output: Output::Master,
};

static ELECTRO: KitTable = [
    Recipe {
        sources: &[sweep(Sine, 150.0, 40.0, 0.4)],
        envelope: Envelope::decay(1.2, 0.001, 0.4),
        output: Output::Master,
    },
    Recipe {
        sources: &[bandpass(2000.0, 0.15)],
        envelope: Envelope::decay(0.8, 0.01, 0.15).with_velocity(),
        output: Output::Distortable,
    },
    Recipe {
        sources: &[highpass(11000.0, 0.04)],
        envelope: Envelope::decay(0.4, 0.01, 0.04),
        output: Output::Distortable,
    },
    Recipe {
        sources: &[highpass(11000.0, 0.25)],
        envelope: Envelope::decay(0.5, 0.01, 0.25),
        output: Output::Distortable,
    },
    Recipe {
        sources: &[noise(0.12)],
        envelope: Envelope::decay(1.0, 0.01, 0.12),
        output: Output::Distortable,
    },
    ELECTRO_FALLBACK,
    ELECTRO_FALLBACK,
    ELECTRO_FALLBACK,
];

const VINTAGE_FALLBACK: Recipe = Recipe {
    sources: &[tone(Sine, 200.0, 0.1)],
    envelope: Envelope::decay(0.5, 0.01, 0.1),
    output: Output::Master,
};

static VINTAGE: KitTable = [
    Recipe {
        sources: &[sweep(Sine, 90.0, 30.0, 0.5)],
        envelope: Envelope::decay(1.0, 0.001, 0.5),
        output: Output::Master,
    },
    Recipe {
        sources: &[highpass(1500.0, 0.18), tone(Triangle, 180.0, 0.18)],
        envelope: Envelope::decay(0.7, 0.01, 0.18).with_velocity(),
        output: Output::Distortable,
    },
    VINTAGE_FALLBACK,
    VINTAGE_FALLBACK,
    VINTAGE_FALLBACK,
    VINTAGE_FALLBACK,
    VINTAGE_FALLBACK,
    VINTAGE_FALLBACK,
];

const HOUSE_FALLBACK: Recipe = Recipe {
    sources: &[tone(Sine, 250.0, 0.1)],
    envelope: Envelope::decay(0.6, 0.01, 0.1),
    output: Output::Master,
};

static HOUSE: KitTable = [
    Recipe {
        sources: &[sweep(Sine, 160.0, 50.0, 0.35)],
        envelope: Envelope::decay(1.1, 0.001, 0.35),
        output: Output::Master,
    },
    HOUSE_FALLBACK,
    Recipe {
        sources: &[highpass(12000.0, 0.03)],
        envelope: Envelope::decay(0.35, 0.01, 0.03),
        output: Output::Distortable,
    },
    HOUSE_FALLBACK,
    Recipe {
        sources: &[noise(0.1)],
        envelope: Envelope::decay(0.9, 0.01, 0.1),
        output: Output::Distortable,
    },
    HOUSE_FALLBACK,
    HOUSE_FALLBACK,
    HOUSE_FALLBACK,
];

const DNB_FALLBACK: Recipe = Recipe {
    sources: &[tone(Triangle, 280.0, 0.08)],
    envelope: Envelope::decay(0.7, 0.01, 0.08),
    output: Output::Master,
};

static DNB: KitTable = [
    Recipe {
        sources: &[sweep(Sine, 140.0, 35.0, 0.25)],
        envelope: Envelope::decay(1.3, 0.001, 0.25),
        output: Output::Master,
    },
    Recipe {
        sources: &[bandpass(2500.0, 0.12)],
        envelope: Envelope::decay(1.0, 0.01, 0.12).with_velocity(),
        output: Output::Distortable,
    },
    Recipe {
        sources: &[highpass(13000.0, 0.02)],
        envelope: Envelope::decay(0.45, 0.01, 0.02),
        output: Output::Distortable,
    },
    DNB_FALLBACK,
    DNB_FALLBACK,
    DNB_FALLBACK,
    DNB_FALLBACK,
    DNB_FALLBACK,
];

const TECHNO_FALLBACK: Recipe = Recipe {
    sources: &[tone(Square, 320.0, 0.09)],
    envelope: Envelope::decay(0.65, 0.01, 0.09),
    output: Output::Master,
};

static TECHNO: KitTable = [
    Recipe {
        sources: &[sweep(Sine, 170.0, 45.0, 0.3)],
        envelope: Envelope::decay(1.2, 0.001, 0.3),
        output: Output::Master,
    },
    TECHNO_FALLBACK,
    Recipe {
        sources: &[highpass(12500.0, 0.025)],
        envelope: Envelope::decay(0.4, 0.01, 0.025),
        output: Output::Distortable,
    },
    TECHNO_FALLBACK,
    Recipe {
        sources: &[noise(0.11)],
        envelope: Envelope::decay(0.95, 0.01, 0.11),
        output: Output::Distortable,
    },
    TECHNO_FALLBACK,
    TECHNO_FALLBACK,
    TECHNO_FALLBACK,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pair_has_a_recipe_with_sources() {
        for kit in DrumKit::ALL {
            for drum in DrumType::ALL {
                let r = recipe(kit, drum);
                assert!(!r.sources.is_empty(), "{kit:?}/{drum:?}");
                assert!(r.envelope.len > 0.0);
            }
        }
    }

    #[test]
    fn fallbacks_fill_the_gaps() {
        assert_eq!(recipe(DrumKit::House, DrumType::Snare), &HOUSE_FALLBACK);
        assert_eq!(recipe(DrumKit::Electro, DrumType::Cowbell), &ELECTRO_FALLBACK);
        assert_eq!(recipe(DrumKit::Vintage, DrumType::Hihat), &VINTAGE_FALLBACK);
        assert_ne!(recipe(DrumKit::Electro, DrumType::Clap), &ELECTRO_FALLBACK);
    }

    #[test]
    fn rock_hats_are_six_squares_through_a_bandpass() {
        let r = recipe(DrumKit::Rock, DrumType::Openhat);
        assert_eq!(r.sources.len(), 6);
        assert_eq!(r.output, Output::Bandpass(10000));
        assert_eq!(r.envelope.knee, Some((0.3, 0.1)));
        match r.sources[2] {
            SourceSpec::Tone { wave, freq, len } => {
                assert_eq!(wave, Square);
                assert!((freq - 166.4).abs() < 1e-3);
                assert_eq!(len, 0.3);
            }
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn kit_routing_differs() {
        assert_eq!(recipe(DrumKit::Tr808, DrumType::Tom).output, Output::Distortable);
        assert_eq!(recipe(DrumKit::Jazz, DrumType::Tom).output, Output::Master);
        assert_eq!(recipe(DrumKit::Jazz, DrumType::Kick).output, Output::Master);
        assert!(recipe(DrumKit::Tr808, DrumType::Kick).envelope.velocity);
        assert!(!recipe(DrumKit::Trap, DrumType::Kick).envelope.velocity);
        assert!(!recipe(DrumKit::House, DrumType::Snare).envelope.velocity);
    }
}
