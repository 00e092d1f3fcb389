use std::time::{Duration, Instant};

use super::scheduler::{LookAheadScheduler, ScheduledStep, Ticker};
use super::transport::{Transition, Transport};
use super::PatternSource;
use crate::audio_api::{AudioOutput, OutputState};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::pipeline::{DistortionSettings, Groove};
use crate::shared::{DrumKit, DrumType, PlaybackState, Position};
use crate::synth::Synthesizer;

/// The playback engine: owns the audio output, the synthesizer and the
/// scheduling state. The caller owns the pattern and groove and passes them
/// in on every call, so edits are picked up on the next poll.
///
/// Driven from one thread: call [`DrumMachine::tick`] from the app loop
/// (often enough to hit the look-ahead interval) and the machine decides
/// whether a poll is due.
pub struct DrumMachine<O: AudioOutput> {
    output: O,
    config: EngineConfig,
    synth: Synthesizer,
    scheduler: LookAheadScheduler,
    ticker: Ticker,
    transport: Transport,
}

impl<O: AudioOutput> DrumMachine<O> {
    pub fn new(output: O, config: EngineConfig) -> Self {
        Self {
            synth: Synthesizer::new(config.distortion_amount),
            scheduler: LookAheadScheduler::from_config(&config),
            ticker: Ticker::new(config.look_ahead()),
            transport: Transport::default(),
            output,
            config,
        }
    }

    /// Starts or resumes playback. The output is resumed first and must
    /// report running before anything is scheduled. The first poll runs
    /// before this returns.
    pub fn start<P: PatternSource + ?Sized>(
        &mut self,
        pattern: &P,
        groove: &Groove,
        now: Instant,
    ) -> Result<(), EngineError> {
        if self.transport.is_playing() {
            return Ok(());
        }
        if pattern.bar_count() == 0 {
            log::warn!("refusing to play an empty pattern");
            return Err(EngineError::EmptyPattern);
        }
        match self.output.state() {
            OutputState::Closed => return Err(EngineError::OutputClosed),
            OutputState::Suspended => self.output.resume()?,
            OutputState::Running => {}
        }
        let state = self.output.state();
        if state != OutputState::Running {
            log::warn!("output did not come up ({state:?}), not starting");
            return Err(EngineError::OutputNotRunning(state));
        }

        if let Transition::Started { from_top } = self.transport.play() {
            if from_top {
                self.scheduler.reset_cursor();
            }
            self.scheduler.seed(self.output.current_time());
            self.ticker.arm(now);
            let at = self.scheduler.cursor();
            log::info!("playing from bar {} step {} at {} bpm", at.bar, at.beat, groove.bpm);
        }
        self.tick(pattern, groove, now);
        Ok(())
    }

    /// Stops polling and keeps the cursor. Notes already handed to the
    /// output still play.
    pub fn pause(&mut self) {
        if self.transport.pause() == Transition::Paused {
            self.ticker.cancel();
            let at = self.scheduler.cursor();
            log::info!("paused at bar {} step {}", at.bar, at.beat);
        }
    }

    pub fn stop(&mut self) {
        let was = self.transport.state();
        self.transport.stop();
        self.ticker.cancel();
        self.scheduler.reset_cursor();
        if was != PlaybackState::Stopped {
            log::info!("stopped");
        }
    }

    /// Polls the scheduler if the look-ahead interval has elapsed. Returns
    /// the number of notes handed to the output.
    pub fn tick<P: PatternSource + ?Sized>(
        &mut self,
        pattern: &P,
        groove: &Groove,
        now: Instant,
    ) -> usize {
        if !self.transport.is_playing() || !self.ticker.due(now) {
            return 0;
        }
        let audio_now = self.output.current_time();
        let steps = self.scheduler.poll(audio_now, pattern.bar_count(), groove);
        steps.into_iter().map(|step| self.trigger_step(pattern, groove.kit, step)).sum()
    }

    fn trigger_step<P: PatternSource + ?Sized>(
        &mut self,
        pattern: &P,
        kit: DrumKit,
        step: ScheduledStep,
    ) -> usize {
        let Position { bar, beat } = step.position;
        self.transport.publish(step.position);

        let Some(bar) = pattern.bar_at(bar) else {
            return 0;
        };
        let mut count = 0;
        for drum in bar.active_drums(beat) {
            let velocity = if drum == DrumType::Snare && bar.is_accented(beat) {
                self.config.accent_velocity
            } else {
                1.0
            };
            let graph = self.synth.note(drum, kit, step.time, velocity);
            self.output.submit(graph);
            count += 1;
        }
        if count > 0 {
            log::debug!(
                "step {}:{} -> {count} notes at {:.3}s",
                step.position.bar,
                beat,
                step.time
            );
        }
        count
    }

    /// Where playback is, for display. Trails the audio by up to one poll.
    pub fn current_position(&self) -> Position {
        self.transport.position()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.transport.state()
    }

    /// Only notes triggered after this call are affected. Returns false for
    /// drums that can't be distorted.
    pub fn set_distortion(&mut self, drum: DrumType, enabled: bool) -> bool {
        self.synth.shaping_mut().set_enabled(drum, enabled)
    }

    pub fn apply_distortion(&mut self, settings: &DistortionSettings) {
        self.synth.shaping_mut().apply(settings);
    }

    pub fn distortion(&self) -> DistortionSettings {
        self.synth.shaping().settings()
    }

    /// How long the app loop may sleep before the next poll is due.
    pub fn next_tick_in(&self, now: Instant) -> Option<Duration> {
        self.ticker.time_until_due(now)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Stops playback and releases the output.
    pub fn shutdown(&mut self) {
        self.stop();
        self.output.close();
    }
}

impl<O: AudioOutput> Drop for DrumMachine<O> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
