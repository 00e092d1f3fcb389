// White-noise buffers for the noise-burst recipes (snares, hats, claps).
// Each note gets its own buffer from its own seed, so two hits never share
// a waveform but a given note always renders the same way.

pub const NOISE_SECONDS: f32 = 0.5;

#[derive(Clone, Debug)]
pub struct NoiseBuffer {
    pub data: Vec<f32>, // mono samples in [-1, 1)
}

impl NoiseBuffer {
    pub fn white(sample_rate: u32, seed: u64) -> Self {
        let len = (sample_rate as f32 * NOISE_SECONDS) as usize;
        let mut rng = XorShift::new(seed);
        Self {
            data: (0..len).map(|_| rng.next_f32() * 2.0 - 1.0).collect(),
        }
    }

    /// Silence past the end of the buffer.
    #[inline]
    pub fn sample(&self, idx: usize) -> f32 {
        self.data.get(idx).copied().unwrap_or(0.0)
    }
}

// xorshift64, plenty for audio noise
struct XorShift {
    state: u64,
}

impl XorShift {
    fn new(seed: u64) -> Self {
        // scramble so small sequential seeds don't start out correlated
        Self { state: seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1 }
    }

    fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_second_of_bounded_noise() {
        let n = NoiseBuffer::white(48000, 7);
        assert_eq!(n.data.len(), 24000);
        assert!(n.data.iter().all(|s| (-1.0..1.0).contains(s)));
        let mean = n.data.iter().sum::<f32>() / n.data.len() as f32;
        assert!(mean.abs() < 0.05);
        assert_eq!(n.sample(24000), 0.0);
    }

    #[test]
    fn seeds_are_reproducible_and_distinct() {
        let a = NoiseBuffer::white(8000, 1);
        let b = NoiseBuffer::white(8000, 1);
        let c = NoiseBuffer::white(8000, 2);
        assert_eq!(a.data, b.data);
        assert_ne!(a.data, c.data);
    }
}
