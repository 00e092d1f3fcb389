// Renders to memory instead of a device. The clock only moves when the caller
// advances it, which makes playback deterministic: handy for bouncing a song
// to WAV and for driving the transport in tests.
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use super::engine::{AudioClock, Engine};
use super::frame::StereoFrame;
use super::voice::Voice;
use crate::audio_api::{AudioCommand, AudioOutput, OutputState};
use crate::error::EngineError;
use crate::synth::NoteGraph;

pub struct OfflineOutput {
    engine: Engine,
    clock: Arc<AudioClock>,
    state: OutputState,
    rendered: Vec<StereoFrame>,
}

impl OfflineOutput {
    pub fn new(sample_rate: u32, master_gain: f32) -> Self {
        let clock = Arc::new(AudioClock::new(sample_rate));
        Self {
            engine: Engine::new(clock.clone(), master_gain),
            clock,
            state: OutputState::Suspended,
            rendered: Vec::new(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.clock.sample_rate()
    }

    /// Renders `secs` of audio. Does nothing unless running.
    pub fn advance(&mut self, secs: f64) {
        if self.state != OutputState::Running || secs <= 0.0 {
            return;
        }
        let target = ((self.clock.seconds() + secs) * self.sample_rate() as f64).round() as u64;
        let n = target.saturating_sub(self.clock.frames()) as usize;
        let start = self.rendered.len();
        self.rendered.resize(start + n, StereoFrame::zero());
        self.engine.render_block(&mut self.rendered[start..]);
    }

    pub fn rendered(&self) -> &[StereoFrame] {
        &self.rendered
    }

    pub fn active_voices(&self) -> usize {
        self.engine.active_voices()
    }

    /// 16-bit stereo, clipped to full scale.
    pub fn write_wav(&self, path: &Path) -> anyhow::Result<()> {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: self.sample_rate(),
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec)
            .with_context(|| format!("creating {}", path.display()))?;
        for frame in &self.rendered {
            writer.write_sample(to_pcm(frame.left))?;
            writer.write_sample(to_pcm(frame.right))?;
        }
        writer.finalize().context("finalizing wav")?;
        log::info!("wrote {} frames to {}", self.rendered.len(), path.display());
        Ok(())
    }
}

fn to_pcm(x: f32) -> i16 {
    (x.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

impl AudioOutput for OfflineOutput {
    fn current_time(&self) -> f64 {
        self.clock.seconds()
    }

    fn state(&self) -> OutputState {
        self.state
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        if self.state == OutputState::Closed {
            return Err(EngineError::OutputClosed);
        }
        self.state = OutputState::Running;
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), EngineError> {
        if self.state == OutputState::Closed {
            return Err(EngineError::OutputClosed);
        }
        self.state = OutputState::Suspended;
        Ok(())
    }

    fn close(&mut self) {
        self.state = OutputState::Closed;
    }

    fn submit(&mut self, graph: NoteGraph) {
        if self.state == OutputState::Closed {
            return;
        }
        let voice = Voice::prepare(graph, self.sample_rate());
        self.engine.handle_cmd(AudioCommand::Play(Box::new(voice)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::note_id::NoteId;
    use crate::shared::{DrumKit, DrumType};
    use crate::synth::{build_note, SignalShaping};

    #[test]
    fn clock_only_moves_while_running() {
        let mut out = OfflineOutput::new(8000, 0.7);
        out.advance(1.0);
        assert_eq!(out.current_time(), 0.0);

        out.resume().unwrap();
        out.advance(0.25);
        assert!((out.current_time() - 0.25).abs() < 1e-9);
        assert_eq!(out.rendered().len(), 2000);

        out.suspend().unwrap();
        out.advance(0.25);
        assert!((out.current_time() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn closed_output_refuses_to_resume() {
        let mut out = OfflineOutput::new(8000, 0.7);
        out.close();
        assert!(matches!(out.resume(), Err(EngineError::OutputClosed)));
        assert_eq!(out.state(), OutputState::Closed);
    }

    #[test]
    fn bounces_a_note_to_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hit.wav");

        let mut out = OfflineOutput::new(8000, 0.7);
        out.resume().unwrap();
        let shaping = SignalShaping::new(400.0);
        let graph = build_note(NoteId(1), DrumType::Kick, DrumKit::Trap, 0.01, 1.0, &shaping);
        out.submit(graph);
        out.advance(0.5);
        out.write_wav(&path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 8000);
        assert_eq!(reader.duration(), 4000);
    }
}
