// Waveshaping distortion: a transfer curve sampled over [-1, 1], applied by
// table lookup with linear interpolation (the Web Audio WaveShaper rule).
use std::f32::consts::PI;

pub const CURVE_LEN: usize = 44100;

#[derive(Debug, PartialEq)]
pub struct ShapingCurve {
    amount: f32,
    table: Vec<f32>,
}

impl ShapingCurve {
    /// The classic soft-clip curve `(3 + k) * x * 20deg / (pi + k * |x|)`.
    pub fn distortion(amount: f32) -> Self {
        let deg = PI / 180.0;
        let table = (0..CURVE_LEN)
            .map(|i| {
                let x = (i as f32 * 2.0) / CURVE_LEN as f32 - 1.0;
                ((3.0 + amount) * x * 20.0 * deg) / (PI + amount * x.abs())
            })
            .collect();
        Self { amount, table }
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn table(&self) -> &[f32] {
        &self.table
    }

    #[inline]
    pub fn shape(&self, x: f32) -> f32 {
        let last = self.table.len() - 1;
        let v = last as f32 * 0.5 * (x + 1.0);
        if v <= 0.0 {
            return self.table[0];
        }
        if v >= last as f32 {
            return self.table[last];
        }
        let k = v as usize;
        let frac = v - k as f32;
        self.table[k] * (1.0 - frac) + self.table[k + 1] * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_is_deterministic() {
        assert_eq!(ShapingCurve::distortion(400.0), ShapingCurve::distortion(400.0));
        assert_eq!(ShapingCurve::distortion(400.0).table().len(), CURVE_LEN);
    }

    #[test]
    fn curve_is_odd_and_saturating() {
        let c = ShapingCurve::distortion(400.0);
        // an even-length table has no center point; zero falls between the middle pair
        let mid = (c.table()[CURVE_LEN / 2 - 1] + c.table()[CURVE_LEN / 2]) / 2.0;
        assert!((c.shape(0.0) - mid).abs() < 1e-6);
        assert!(c.shape(0.0).abs() < 2.5e-3);
        assert!((c.shape(0.5) + c.shape(-0.5)).abs() < 1e-3);
        // small inputs get pushed up hard
        assert!(c.shape(0.05) > 0.05 * 3.0);
        // and everything stays bounded
        assert!(c.shape(5.0) <= c.shape(1.0) + 1e-6);
        assert!(c.shape(1.0) < 0.4);
    }
}
