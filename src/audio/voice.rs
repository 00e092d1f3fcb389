use std::sync::Arc;

use super::effect::ShapingCurve;
use super::filter::Biquad;
use super::noise::NoiseBuffer;
use super::note_id::NoteId;
use super::param::Automation;
use crate::synth::{FilterNode, NoteGraph, Route, SourceKind, Waveform};

// filters keep ringing a little after their input stops
const TAIL_SECS: f64 = 0.05;

#[derive(Clone, Debug)]
enum Signal {
    Osc { waveform: Waveform, frequency: Automation, phase: f64 },
    Noise { buffer: NoiseBuffer, pos: usize },
}

#[derive(Clone, Debug)]
struct Filter {
    biquad: Biquad,
    frequency: Automation,
}

impl Filter {
    fn new(node: FilterNode) -> Self {
        Self { biquad: Biquad::new(node.kind), frequency: node.frequency }
    }

    #[inline]
    fn process(&mut self, x: f32, t: f64, sample_rate: u32) -> f32 {
        self.biquad.set_frequency(self.frequency.value_at(t), sample_rate);
        self.biquad.process(x)
    }
}

#[derive(Clone, Debug)]
struct Source {
    signal: Signal,
    filter: Option<Filter>,
    start: f64,
    stop: f64,
}

#[derive(Clone, Debug)]
enum Output {
    Master,
    Shaped(Arc<ShapingCurve>),
    Filtered(Filter),
}

/// A note graph made playable: oscillator phases, noise buffers and filter
/// state all live here. Built on the control side, then moved to the engine.
#[derive(Clone, Debug)]
pub struct Voice {
    pub id: NoteId,
    pub onset: f64,
    end: f64,
    sample_rate: u32,
    sources: Vec<Source>,
    gain: Automation,
    output: Output,
}

impl Voice {
    pub fn prepare(graph: NoteGraph, sample_rate: u32) -> Self {
        let end = graph.end_time();
        let sources = graph
            .sources
            .into_iter()
            .map(|node| Source {
                signal: match node.kind {
                    SourceKind::Oscillator { waveform, frequency } => Signal::Osc {
                        waveform,
                        frequency,
                        phase: 0.0,
                    },
                    SourceKind::Noise { seed } => Signal::Noise {
                        buffer: NoiseBuffer::white(sample_rate, seed),
                        pos: 0,
                    },
                },
                filter: node.filter.map(Filter::new),
                start: node.start,
                stop: node.stop,
            })
            .collect();

        let output = match graph.route {
            Route::Master => Output::Master,
            Route::Shaped(curve) => Output::Shaped(curve),
            Route::Filtered(node) => Output::Filtered(Filter::new(node)),
        };

        Self {
            id: graph.id,
            onset: graph.onset,
            end,
            sample_rate,
            sources,
            gain: graph.gain,
            output,
        }
    }

    /// When the last node stops, not counting the filter tail.
    pub fn end_time(&self) -> f64 {
        self.end
    }

    pub fn is_finished(&self, t: f64) -> bool {
        t >= self.end + TAIL_SECS
    }

    /// Mono sample at clock time `t`. Call once per frame, in order.
    pub fn render_sample(&mut self, t: f64) -> f32 {
        if t < self.onset {
            return 0.0;
        }
        let sr = self.sample_rate;

        let mut sum = 0.0f32;
        for src in &mut self.sources {
            if t < src.start {
                continue;
            }
            let x = if t < src.stop {
                match &mut src.signal {
                    Signal::Osc { waveform, frequency, phase } => {
                        let s = waveform.sample(*phase);
                        *phase += frequency.value_at(t) as f64 / sr as f64;
                        *phase -= phase.floor();
                        s
                    }
                    Signal::Noise { buffer, pos } => {
                        let s = buffer.sample(*pos);
                        *pos += 1;
                        s
                    }
                }
            } else {
                0.0
            };
            sum += match &mut src.filter {
                Some(f) => f.process(x, t, sr),
                None => x,
            };
        }

        let y = sum * self.gain.value_at(t);
        match &mut self.output {
            Output::Master => y,
            Output::Shaped(curve) => curve.shape(y),
            Output::Filtered(f) => f.process(y, t, sr),
        }
    }
}
