use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;

use super::frame::StereoFrame;
use super::voice::Voice;
use crate::audio_api::AudioCommand;

pub const MAX_VOICES: usize = 64; // hard cap so we never grow the pool in the audio callback

/// Frames rendered so far. Written by the render side, read by the scheduler.
#[derive(Debug)]
pub struct AudioClock {
    frames: AtomicU64,
    sample_rate: u32,
}

impl AudioClock {
    pub fn new(sample_rate: u32) -> Self {
        Self { frames: AtomicU64::new(0), sample_rate }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    pub fn seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    fn publish(&self, frames: u64) {
        self.frames.store(frames, Ordering::Release);
    }
}

pub struct Engine {
    sample_rate: u32,
    master_gain: f32,
    frame: u64,
    clock: Arc<AudioClock>,
    voices: Vec<Box<Voice>>, // capacity MAX_VOICES, allocated up front
    retired: Option<Sender<Box<Voice>>>,
}

impl Engine {
    pub fn new(clock: Arc<AudioClock>, master_gain: f32) -> Self {
        Self {
            sample_rate: clock.sample_rate(),
            master_gain,
            frame: clock.frames(),
            clock,
            voices: Vec::with_capacity(MAX_VOICES),
            retired: None,
        }
    }

    /// Finished and stolen voices go back over `tx` so their buffers are
    /// freed off the render thread. Without it they are dropped in place.
    pub fn with_retired(mut self, tx: Sender<Box<Voice>>) -> Self {
        self.retired = Some(tx);
        self
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::Play(voice) => self.start_voice(voice),
        }
    }

    fn start_voice(&mut self, voice: Box<Voice>) {
        if self.voices.len() < MAX_VOICES {
            self.voices.push(voice);
            return;
        }
        // pool is full: steal whichever voice ends first
        let slot = self
            .voices
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.end_time().total_cmp(&b.end_time()))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let stolen = std::mem::replace(&mut self.voices[slot], voice);
        self.retire(stolen);
    }

    fn retire(&self, voice: Box<Voice>) {
        if let Some(tx) = &self.retired {
            // a full channel hands the voice back and it drops here
            let _ = tx.try_send(voice);
        }
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn now(&self) -> f64 {
        self.frame as f64 / self.sample_rate as f64
    }

    pub fn next_sample(&mut self) -> f32 {
        let t = self.now();
        let mut out = 0.0f32;
        for v in &mut self.voices {
            out += v.render_sample(t);
        }
        let mut i = 0;
        while i < self.voices.len() {
            if self.voices[i].is_finished(t) {
                let done = self.voices.swap_remove(i);
                self.retire(done);
            } else {
                i += 1;
            }
        }
        self.frame += 1;
        out * self.master_gain
    }

    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        for frame in out.iter_mut() {
            *frame = StereoFrame::mono(self.next_sample());
        }
        self.clock.publish(self.frame);
    }

    /// Fills an interleaved device buffer; every channel gets the same signal.
    pub fn render_interleaved(&mut self, data: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        for chunk in data.chunks_mut(channels) {
            chunk.fill(self.next_sample());
        }
        self.clock.publish(self.frame);
    }
}
