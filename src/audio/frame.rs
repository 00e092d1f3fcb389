// The smallest unit of output audio; one stereo frame
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

impl StereoFrame {
    pub fn zero() -> Self {
        Self::default()
    }

    // every voice is mono, both channels get the same signal
    pub fn mono(x: f32) -> Self {
        Self { left: x, right: x }
    }

    pub fn peak(&self) -> f32 {
        self.left.abs().max(self.right.abs())
    }
}
