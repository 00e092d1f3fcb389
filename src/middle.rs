// The layer between the TUI and the engine: owns the song being edited and
// the drum machine playing it, applies InputEvents to both, and builds the
// DisplayState the TUI renders.
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::audio_api::AudioOutput;
use crate::config::EngineConfig;
use crate::pipeline::{persistence, Bar, Song};
use crate::sequencer::DrumMachine;
use crate::shared::{DisplayState, DrumType, InputEvent, PlaybackState, NUM_DRUMS, STEPS_PER_BAR};

pub struct Middle<O: AudioOutput> {
    pub song: Song,
    machine: DrumMachine<O>,
    song_path: Option<PathBuf>,
    shown_bar: usize,
    cursor: (usize, usize), // (grid row, step)
    clipboard: Option<Bar>,
    status: String,
}

impl<O: AudioOutput> Middle<O> {
    pub fn new(song: Song, output: O, config: EngineConfig) -> Self {
        let mut machine = DrumMachine::new(output, config);
        machine.apply_distortion(&song.distortion);
        Self {
            song,
            machine,
            song_path: None,
            shown_bar: 0,
            cursor: (0, 0),
            clipboard: None,
            status: String::new(),
        }
    }

    pub fn with_song_path(mut self, path: PathBuf) -> Self {
        self.song_path = Some(path);
        self
    }

    pub fn machine(&self) -> &DrumMachine<O> {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut DrumMachine<O> {
        &mut self.machine
    }

    pub fn shown_bar(&self) -> usize {
        self.shown_bar
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn handle_input(&mut self, event: InputEvent, now: Instant) {
        match event {
            InputEvent::PlayPause => self.play_pause(now),
            InputEvent::Stop => self.machine.stop(),

            InputEvent::CursorUp => self.cursor.0 = self.cursor.0.saturating_sub(1),
            InputEvent::CursorDown => self.cursor.0 = (self.cursor.0 + 1).min(NUM_DRUMS - 1),
            InputEvent::CursorLeft => self.cursor.1 = self.cursor.1.saturating_sub(1),
            InputEvent::CursorRight => self.cursor.1 = (self.cursor.1 + 1).min(STEPS_PER_BAR - 1),
            InputEvent::ToggleStep => {
                let drum = DrumType::GRID_ORDER[self.cursor.0];
                let result = self.song.bars.toggle_step(self.shown_bar, drum, self.cursor.1);
                self.report(result);
            }
            InputEvent::ToggleAccent => {
                let result = self.song.bars.toggle_accent(self.shown_bar, self.cursor.1);
                self.report(result);
            }

            InputEvent::PrevBar => self.shown_bar = self.shown_bar.saturating_sub(1),
            InputEvent::NextBar => {
                self.shown_bar = (self.shown_bar + 1).min(self.song.bars.len() - 1)
            }
            InputEvent::AddBar => match self.song.bars.add_bar() {
                Ok(i) => self.shown_bar = i,
                Err(e) => self.status = e.to_string(),
            },
            InputEvent::DeleteBar => match self.song.bars.delete_bar(self.shown_bar) {
                Ok(_) => self.shown_bar = self.shown_bar.min(self.song.bars.len() - 1),
                Err(e) => self.status = e.to_string(),
            },
            InputEvent::DuplicateBar => match self.song.bars.duplicate_bar(self.shown_bar) {
                Ok(i) => self.shown_bar = i,
                Err(e) => self.status = e.to_string(),
            },
            InputEvent::ClearBar => {
                let result = self.song.bars.clear_bar(self.shown_bar);
                self.report(result);
            }
            InputEvent::CopyBar => {
                self.clipboard = self.song.bars.bar(self.shown_bar).cloned();
                self.status = format!("copied bar {}", self.shown_bar + 1);
            }
            InputEvent::PasteBar => self.paste_bar(),
            InputEvent::MoveBar(delta) => self.move_bar(delta),
            InputEvent::ResetAll => self.reset_all(),

            InputEvent::AdjustBpm(delta) => self.song.set_bpm(self.song.bpm + delta),
            InputEvent::AdjustSwing(delta) => self.song.set_swing(self.song.swing + delta),
            InputEvent::NextKit => self.song.kit = self.song.kit.next(),
            InputEvent::ToggleDistortion(drum) => {
                let enabled = !self.song.distortion.get(drum);
                if self.machine.set_distortion(drum, enabled) {
                    self.song.distortion.set(drum, enabled);
                }
            }

            InputEvent::Save => match self.save() {
                Ok(path) => {
                    let msg = format!("saved {}", path.display());
                    self.status = msg;
                }
                Err(e) => {
                    log::error!("save failed: {e:#}");
                    self.status = format!("save failed: {e}");
                }
            },
            InputEvent::Quit => self.machine.stop(),
        }
    }

    fn play_pause(&mut self, now: Instant) {
        if self.machine.playback_state() == PlaybackState::Playing {
            self.machine.pause();
            return;
        }
        let groove = self.song.groove();
        if let Err(e) = self.machine.start(&self.song.bars, &groove, now) {
            log::error!("could not start playback: {e}");
            self.status = e.to_string();
        }
    }

    fn paste_bar(&mut self) {
        let Some(bar) = self.clipboard.clone() else {
            self.status = "nothing copied".into();
            return;
        };
        match self.song.bars.insert_bar_after(self.shown_bar, bar) {
            Ok(i) => self.shown_bar = i,
            Err(e) => self.status = e.to_string(),
        }
    }

    // the view follows the bar being moved
    fn move_bar(&mut self, delta: isize) {
        let last = self.song.bars.len() - 1;
        let to = self.shown_bar.saturating_add_signed(delta).min(last);
        if to == self.shown_bar {
            return;
        }
        match self.song.bars.move_bar(self.shown_bar, to) {
            Ok(()) => self.shown_bar = to,
            Err(e) => self.status = e.to_string(),
        }
    }

    fn reset_all(&mut self) {
        self.machine.stop();
        self.song = Song::default();
        self.machine.apply_distortion(&self.song.distortion);
        self.shown_bar = 0;
        self.status = "reset to the default beat".into();
        log::info!("song reset");
    }

    fn report<E: std::fmt::Display>(&mut self, result: Result<(), E>) {
        if let Err(e) = result {
            self.status = e.to_string();
        }
    }

    /// Runs a scheduler poll when one is due.
    pub fn tick(&mut self, now: Instant) -> usize {
        let groove = self.song.groove();
        self.machine.tick(&self.song.bars, &groove, now)
    }

    pub fn next_tick_in(&self, now: Instant) -> Option<Duration> {
        self.machine.next_tick_in(now)
    }

    pub fn save(&self) -> anyhow::Result<&Path> {
        let path = self
            .song_path
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("no song file to save to"))?;
        persistence::save_song(path, &self.song)?;
        Ok(path)
    }

    pub fn display_state(&self) -> DisplayState {
        let empty = Bar::default();
        let bar = self.song.bars.bar(self.shown_bar).unwrap_or(&empty);

        let mut grid = [[false; STEPS_PER_BAR]; NUM_DRUMS];
        for (row, drum) in DrumType::GRID_ORDER.iter().enumerate() {
            grid[row] = *bar.steps(*drum);
        }

        let playback = self.machine.playback_state();
        let position = self.machine.current_position();
        let playhead = (playback != PlaybackState::Stopped && position.bar == self.shown_bar)
            .then_some(position.beat);
        let distortion = self.song.distortion;

        DisplayState {
            grid,
            accents: bar.snare_accent,
            shown_bar: self.shown_bar,
            bar_count: self.song.bars.len(),
            playhead,
            cursor: self.cursor,
            playback,
            position,
            bpm: self.song.bpm,
            swing: self.song.swing,
            kit: self.song.kit,
            distortion: [distortion.kick, distortion.snare, distortion.clap],
            song_name: self.song.name.clone(),
            status: self.status.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::OfflineOutput;
    use crate::shared::{DrumKit, Position};

    fn middle() -> Middle<OfflineOutput> {
        let song = Song { bars: crate::pipeline::Pattern::new(), ..Song::default() };
        Middle::new(song, OfflineOutput::new(8000, 0.7), EngineConfig::default())
    }

    #[test]
    fn cursor_edits_the_shown_bar() {
        let mut m = middle();
        let now = Instant::now();
        // row 2 is the kick
        m.handle_input(InputEvent::CursorDown, now);
        m.handle_input(InputEvent::CursorDown, now);
        m.handle_input(InputEvent::CursorRight, now);
        m.handle_input(InputEvent::ToggleStep, now);
        assert!(m.song.bars.bar(0).unwrap().is_active(DrumType::Kick, 1));

        let ds = m.display_state();
        assert!(ds.grid[2][1]);
        assert_eq!(ds.cursor, (2, 1));

        m.handle_input(InputEvent::ToggleStep, now);
        assert!(m.song.bars.bar(0).unwrap().is_empty());
    }

    #[test]
    fn bar_list_edits_move_the_view() {
        let mut m = middle();
        let now = Instant::now();
        m.handle_input(InputEvent::AddBar, now);
        assert_eq!(m.shown_bar(), 1);
        m.handle_input(InputEvent::DuplicateBar, now);
        assert_eq!(m.shown_bar(), 2);
        assert_eq!(m.song.bars.len(), 3);

        m.handle_input(InputEvent::DeleteBar, now);
        assert_eq!(m.shown_bar(), 1);
        m.handle_input(InputEvent::PrevBar, now);
        m.handle_input(InputEvent::DeleteBar, now);
        m.handle_input(InputEvent::DeleteBar, now);
        assert_eq!(m.song.bars.len(), 1);
        assert!(!m.status().is_empty());
    }

    #[test]
    fn groove_keys_clamp_and_cycle() {
        let mut m = middle();
        let now = Instant::now();
        for _ in 0..50 {
            m.handle_input(InputEvent::AdjustBpm(5.0), now);
        }
        assert_eq!(m.song.bpm, 200.0);
        m.handle_input(InputEvent::AdjustSwing(-5.0), now);
        assert_eq!(m.song.swing, 0.0);
        m.handle_input(InputEvent::NextKit, now);
        assert_eq!(m.song.kit, DrumKit::Trap);
    }

    #[test]
    fn distortion_toggles_reach_the_machine() {
        let mut m = middle();
        let now = Instant::now();
        m.handle_input(InputEvent::ToggleDistortion(DrumType::Snare), now);
        assert!(m.song.distortion.snare);
        assert!(m.machine().distortion().snare);
        m.handle_input(InputEvent::ToggleDistortion(DrumType::Hihat), now);
        assert_eq!(m.display_state().distortion, [false, true, false]);
    }

    #[test]
    fn play_pause_and_stop() {
        let mut m = middle();
        let now = Instant::now();
        m.handle_input(InputEvent::PlayPause, now);
        assert_eq!(m.machine().playback_state(), PlaybackState::Playing);
        assert_eq!(m.display_state().playhead, Some(1));

        m.handle_input(InputEvent::PlayPause, now);
        assert_eq!(m.machine().playback_state(), PlaybackState::Paused);

        m.handle_input(InputEvent::Stop, now);
        let ds = m.display_state();
        assert_eq!(ds.position, Position::default());
        assert_eq!(ds.playhead, None);
    }

    #[test]
    fn copy_then_paste_inserts_after_the_shown_bar() {
        let mut m = middle();
        let now = Instant::now();
        m.handle_input(InputEvent::PasteBar, now);
        assert_eq!(m.song.bars.len(), 1);
        assert_eq!(m.status(), "nothing copied");

        m.handle_input(InputEvent::ToggleStep, now); // hihat, step 0
        m.handle_input(InputEvent::CopyBar, now);
        m.handle_input(InputEvent::AddBar, now);
        m.handle_input(InputEvent::PrevBar, now);
        m.handle_input(InputEvent::PasteBar, now);
        assert_eq!(m.song.bars.len(), 3);
        assert_eq!(m.shown_bar(), 1);
        assert!(m.song.bars.bar(1).unwrap().is_active(DrumType::Hihat, 0));
        assert!(m.song.bars.bar(2).unwrap().is_empty());

        // later edits don't reach the copy
        m.handle_input(InputEvent::ClearBar, now);
        m.handle_input(InputEvent::PasteBar, now);
        assert!(m.song.bars.bar(2).unwrap().is_active(DrumType::Hihat, 0));
    }

    #[test]
    fn moving_a_bar_keeps_it_in_view() {
        let mut m = middle();
        let now = Instant::now();
        m.handle_input(InputEvent::AddBar, now);
        m.handle_input(InputEvent::AddBar, now);
        m.handle_input(InputEvent::PrevBar, now);
        m.handle_input(InputEvent::PrevBar, now);
        m.handle_input(InputEvent::ToggleStep, now);

        m.handle_input(InputEvent::MoveBar(1), now);
        assert_eq!(m.shown_bar(), 1);
        assert!(m.song.bars.bar(1).unwrap().is_active(DrumType::Hihat, 0));
        assert!(m.song.bars.bar(0).unwrap().is_empty());

        m.handle_input(InputEvent::MoveBar(5), now);
        assert_eq!(m.shown_bar(), 2);
        assert!(m.song.bars.bar(2).unwrap().is_active(DrumType::Hihat, 0));

        m.handle_input(InputEvent::MoveBar(-3), now);
        assert_eq!(m.shown_bar(), 0);
        assert!(m.song.bars.bar(0).unwrap().is_active(DrumType::Hihat, 0));

        // nowhere to go
        m.handle_input(InputEvent::MoveBar(-1), now);
        assert_eq!(m.shown_bar(), 0);
    }

    #[test]
    fn reset_all_restores_the_default_song_and_stops() {
        let mut m = middle();
        let now = Instant::now();
        m.song.name = "scratch".into();
        m.handle_input(InputEvent::AddBar, now);
        m.handle_input(InputEvent::AdjustBpm(40.0), now);
        m.handle_input(InputEvent::AdjustSwing(30.0), now);
        m.handle_input(InputEvent::NextKit, now);
        m.handle_input(InputEvent::ToggleDistortion(DrumType::Kick), now);
        m.handle_input(InputEvent::PlayPause, now);
        assert_eq!(m.machine().playback_state(), PlaybackState::Playing);

        m.handle_input(InputEvent::ResetAll, now);
        assert_eq!(m.song, Song::default());
        assert_eq!(m.song.bpm, 80.0);
        assert_eq!(m.song.kit, DrumKit::Jazz);
        assert_eq!(m.song.swing, 0.0);
        assert!(m.song.name.is_empty());
        assert_eq!(m.shown_bar(), 0);
        assert!(!m.machine().distortion().kick);
        assert_eq!(m.machine().playback_state(), PlaybackState::Stopped);
        assert_eq!(m.machine().current_position(), Position::default());
    }

    #[test]
    fn save_without_a_path_reports() {
        let mut m = middle();
        m.handle_input(InputEvent::Save, Instant::now());
        assert!(m.status().starts_with("save failed"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.json");
        let mut m = middle().with_song_path(path.clone());
        m.song.name = "saved".into();
        m.handle_input(InputEvent::Save, Instant::now());
        assert_eq!(persistence::load_song(&path).unwrap().name, "saved");
    }
}
