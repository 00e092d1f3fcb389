use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::audio_api::{AudioCommand, AudioOutput, OutputState};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::synth::NoteGraph;

mod effect;
mod engine;
mod filter;
mod frame;
mod noise;
pub mod note_id;
mod offline;
pub mod param;
mod voice;

pub use effect::{ShapingCurve, CURVE_LEN};
pub use engine::{AudioClock, Engine, MAX_VOICES};
pub use frame::StereoFrame;
pub use noise::{NoiseBuffer, NOISE_SECONDS};
pub use offline::OfflineOutput;
pub use voice::Voice;

/// The live output: a cpal stream plus the queue feeding it.
pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    retired_rx: Receiver<Box<Voice>>, // finished voices, dropped on this side
    clock: Arc<AudioClock>,
    running: Arc<AtomicBool>, // callback renders silence and holds the clock while false
    state: OutputState,
    stream: Option<cpal::Stream>,
}

impl AudioHandle {
    pub fn sample_rate(&self) -> u32 {
        self.clock.sample_rate()
    }

    /// Frees voices the render thread has finished with.
    pub fn drop_retired(&self) -> usize {
        self.retired_rx.try_iter().count()
    }
}

impl AudioOutput for AudioHandle {
    fn current_time(&self) -> f64 {
        self.clock.seconds()
    }

    fn state(&self) -> OutputState {
        self.state
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        let stream = self.stream.as_ref().ok_or(EngineError::OutputClosed)?;
        stream.play().map_err(|e| EngineError::Device(e.to_string()))?;
        self.running.store(true, Ordering::Release);
        self.state = OutputState::Running;
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), EngineError> {
        let stream = self.stream.as_ref().ok_or(EngineError::OutputClosed)?;
        self.running.store(false, Ordering::Release);
        self.state = OutputState::Suspended;
        // some backends can't pause; the running flag already silences them
        if let Err(e) = stream.pause() {
            log::debug!("stream pause unsupported: {e}");
        }
        Ok(())
    }

    fn close(&mut self) {
        self.running.store(false, Ordering::Release);
        self.state = OutputState::Closed;
        if self.stream.take().is_some() {
            log::info!("audio output closed");
        }
    }

    fn submit(&mut self, graph: NoteGraph) {
        if self.state == OutputState::Closed {
            return;
        }
        self.drop_retired();
        let voice = Voice::prepare(graph, self.sample_rate());
        match self.tx.try_send(AudioCommand::Play(Box::new(voice))) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => log::warn!("audio command queue full, note dropped"),
            Err(TrySendError::Disconnected(_)) => log::warn!("audio thread gone, note dropped"),
        }
    }
}

impl Drop for AudioHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// Opens the default output device. The stream starts suspended.
pub fn open_output(config: &EngineConfig) -> anyhow::Result<AudioHandle> {
    let queue = config.command_queue.max(1);
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(queue);
    // room for every live voice plus everything still queued
    let (retired_tx, retired_rx) = crossbeam_channel::bounded::<Box<Voice>>(MAX_VOICES + queue);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let supported = device.default_output_config().context("no default output config")?;

    let sample_rate = supported.sample_rate();
    let channels = supported.channels() as usize;
    log::info!("audio output: {sample_rate} Hz, {channels} channels");

    let clock = Arc::new(AudioClock::new(sample_rate));
    let running = Arc::new(AtomicBool::new(false));

    match supported.sample_format() {
        cpal::SampleFormat::F32 => {
            let engine = Engine::new(clock.clone(), config.master_gain).with_retired(retired_tx);
            let stream_config: cpal::StreamConfig = supported.into();
            let stream = build_output_stream_f32(
                &device,
                &stream_config,
                rx,
                engine,
                running.clone(),
                channels,
            )?;
            if let Err(e) = stream.pause() {
                log::debug!("could not pause fresh stream: {e}");
            }
            Ok(AudioHandle {
                tx,
                retired_rx,
                clock,
                running,
                state: OutputState::Suspended,
                stream: Some(stream),
            })
        }
        _ => anyhow::bail!("unsupported sample format (only f32 supported for now)"),
    }
}

// ── Output stream ─────────────────────────────────────────────────

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    mut engine: Engine,
    running: Arc<AtomicBool>,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let err_fn = |err| log::error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }
            if !running.load(Ordering::Acquire) {
                data.fill(0.0);
                return;
            }
            engine.render_interleaved(data, channels);
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
