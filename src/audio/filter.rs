// Biquad filters (Audio EQ Cookbook), with the Q conventions Web Audio uses:
// high-pass reads Q in dB, band-pass reads it as a plain ratio. Q is fixed at 1.
use std::f64::consts::PI;

use crate::synth::FilterKind;

const Q: f64 = 1.0;

#[derive(Clone, Debug)]
pub struct Biquad {
    kind: FilterKind,
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
    freq: f32, // last frequency the coefficients were computed for
}

impl Biquad {
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
            freq: f32::NAN,
        }
    }

    /// Cheap to call every sample: coefficients are only recomputed on change.
    pub fn set_frequency(&mut self, freq: f32, sample_rate: u32) {
        if freq == self.freq {
            return;
        }
        self.freq = freq;

        let nyquist = sample_rate as f64 / 2.0;
        let f0 = (freq as f64).clamp(10.0, nyquist * 0.999);
        let w0 = 2.0 * PI * f0 / sample_rate as f64;
        let (sin_w0, cos_w0) = w0.sin_cos();

        let (b0, b1, b2, a0, a1, a2) = match self.kind {
            FilterKind::Highpass => {
                let alpha = sin_w0 / (2.0 * 10f64.powf(Q / 20.0));
                (
                    (1.0 + cos_w0) / 2.0,
                    -(1.0 + cos_w0),
                    (1.0 + cos_w0) / 2.0,
                    1.0 + alpha,
                    -2.0 * cos_w0,
                    1.0 - alpha,
                )
            }
            FilterKind::Bandpass => {
                let alpha = sin_w0 / (2.0 * Q);
                (alpha, 0.0, -alpha, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
            }
        };

        self.b0 = (b0 / a0) as f32;
        self.b1 = (b1 / a0) as f32;
        self.b2 = (b2 / a0) as f32;
        self.a1 = (a1 / a0) as f32;
        self.a2 = (a2 / a0) as f32;
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}
