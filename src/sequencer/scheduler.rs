// Look-ahead scheduling: every poll commits the notes that fall inside a short
// window past the audio clock, so timing rides on the audio clock and not on
// when the poll happens to run.
use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::pipeline::Groove;
use crate::shared::{Position, STEPS_PER_BAR};

/// One step committed to the audio clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledStep {
    pub position: Position,
    pub time: f64, // onset, swing included
}

#[derive(Clone, Debug)]
pub struct LookAheadScheduler {
    next_note_time: f64, // nominal grid time of `cursor`, no swing
    cursor: Position,
    schedule_ahead: f64,
    start_offset: f64,
}

impl LookAheadScheduler {
    pub fn new(schedule_ahead: f64, start_offset: f64) -> Self {
        Self {
            next_note_time: 0.0,
            cursor: Position::default(),
            schedule_ahead,
            start_offset,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.schedule_ahead_secs, config.start_offset_secs)
    }

    /// Re-anchors the grid on the audio clock. Called on every start, so a
    /// resume never replays a backlog.
    pub fn seed(&mut self, audio_now: f64) {
        self.next_note_time = audio_now + self.start_offset;
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = Position::default();
    }

    /// The next step that will be scheduled.
    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn next_note_time(&self) -> f64 {
        self.next_note_time
    }

    /// Commits every step whose nominal time falls before
    /// `audio_now + schedule_ahead`. `bar_count` and `groove` are read fresh
    /// each call, so edits only affect steps not yet committed.
    pub fn poll(
        &mut self,
        audio_now: f64,
        bar_count: usize,
        groove: &Groove,
    ) -> Vec<ScheduledStep> {
        let horizon = audio_now + self.schedule_ahead;
        let sps = groove.seconds_per_sixteenth();
        let mut due = Vec::new();

        while self.next_note_time < horizon {
            let swing = groove.swing_offset(self.cursor.beat);
            due.push(ScheduledStep { position: self.cursor, time: self.next_note_time + swing });
            self.next_note_time += sps;
            self.advance(bar_count);
        }
        due
    }

    fn advance(&mut self, bar_count: usize) {
        self.cursor.beat += 1;
        if self.cursor.beat == STEPS_PER_BAR {
            self.cursor.beat = 0;
            // also catches a cursor left past the end of a pattern that shrank
            self.cursor.bar = if self.cursor.bar + 1 >= bar_count {
                0
            } else {
                self.cursor.bar + 1
            };
        }
    }
}

/// A repeating wall-clock timer. Armed, it reports `due` once per interval;
/// cancelled, it never fires until armed again.
#[derive(Clone, Debug)]
pub struct Ticker {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self { interval, next_due: None }
    }

    /// The first tick is due right away.
    pub fn arm(&mut self, now: Instant) {
        self.next_due = Some(now);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// True if a tick is due; re-arms for one interval after `now`.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(at) if at <= now => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|at| at.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::DrumKit;

    fn groove(bpm: f32, swing: f32) -> Groove {
        Groove { bpm, swing, kit: DrumKit::Tr808 }
    }

    fn one_bar(bpm: f32, swing: f32) -> Vec<ScheduledStep> {
        let g = groove(bpm, swing);
        let mut s = LookAheadScheduler::new(0.2, 0.0);
        s.seed(0.0);
        // a window just short of one bar commits exactly 16 steps
        let window = 16.0 * g.seconds_per_sixteenth() - 0.2 - 1e-9;
        s.poll(window, 1, &g)
    }

    #[test]
    fn commits_only_inside_the_window() {
        let g = groove(120.0, 0.0);
        let mut s = LookAheadScheduler::new(0.2, 0.005);
        s.seed(1.0);
        let due = s.poll(1.0, 1, &g);
        // 0.125 s per step: 1.005 and 1.130 fall before 1.2
        assert_eq!(due.len(), 2);
        assert!((due[0].time - 1.005).abs() < 1e-9);
        assert!((due[1].time - 1.130).abs() < 1e-9);
        assert_eq!(s.cursor(), Position::new(0, 2));

        // nothing new until the clock moves
        assert!(s.poll(1.0, 1, &g).is_empty());
        assert_eq!(s.poll(1.1, 1, &g).len(), 1);
    }

    #[test]
    fn bar_onsets_are_monotonic_across_the_groove_range() {
        for bpm in [60.0, 97.0, 120.0, 200.0] {
            for swing in [0.0, 25.0, 50.0, 75.0] {
                let steps = one_bar(bpm, swing);
                assert_eq!(steps.len(), 16, "bpm {bpm} swing {swing}");
                for pair in steps.windows(2) {
                    assert!(pair[1].time > pair[0].time);
                }
                let sps = groove(bpm, swing).seconds_per_sixteenth();
                let span = steps[15].time - steps[0].time;
                let swing_max = sps * 0.375;
                assert!(span >= 15.0 * sps - 1e-9 && span <= 15.0 * sps + swing_max + 1e-9);
            }
        }
    }

    #[test]
    fn swing_delays_odd_steps_only() {
        let steps = one_bar(120.0, 50.0);
        assert!(steps[0].time.abs() < 1e-12);
        assert!((steps[1].time - (0.125 + 0.03125)).abs() < 1e-9);
        assert!((steps[2].time - 0.25).abs() < 1e-9);
    }

    #[test]
    fn cursor_loops_through_bars() {
        let g = groove(120.0, 0.0);
        let mut s = LookAheadScheduler::new(0.2, 0.0);
        s.seed(0.0);
        // three bars is 6 s
        let due = s.poll(6.0 - 0.2 - 1e-9, 2, &g);
        assert_eq!(due.len(), 48);
        assert_eq!(due[16].position, Position::new(1, 0));
        assert_eq!(due[32].position, Position::new(0, 0));
        assert_eq!(s.cursor(), Position::new(1, 0));
    }

    #[test]
    fn cursor_past_a_shrunk_pattern_wraps_to_the_top() {
        let g = groove(120.0, 0.0);
        let mut s = LookAheadScheduler::new(0.2, 0.0);
        s.seed(0.0);
        s.poll(4.0 - 0.2 - 1e-9, 3, &g); // now at bar 2
        assert_eq!(s.cursor(), Position::new(2, 0));

        let due = s.poll(6.0 - 0.2 - 1e-9, 1, &g);
        assert_eq!(due[0].position, Position::new(2, 0));
        assert_eq!(s.cursor(), Position::new(0, 0));
    }

    #[test]
    fn tempo_changes_only_move_uncommitted_steps() {
        let mut s = LookAheadScheduler::new(0.2, 0.0);
        s.seed(0.0);
        let first = s.poll(0.0, 1, &groove(120.0, 0.0));
        assert_eq!(first.len(), 2);
        let later = s.poll(0.1, 1, &groove(60.0, 0.0));
        // step 2 sits where 120 bpm put it; step 3 uses the new spacing
        assert!((later[0].time - 0.25).abs() < 1e-9);
        assert!((s.next_note_time() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn ticker_fires_once_per_interval() {
        let t0 = Instant::now();
        let mut t = Ticker::new(Duration::from_millis(100));
        assert!(!t.due(t0));

        t.arm(t0);
        assert!(t.due(t0));
        assert!(!t.due(t0 + Duration::from_millis(50)));
        assert_eq!(
            t.time_until_due(t0 + Duration::from_millis(50)),
            Some(Duration::from_millis(50))
        );
        assert!(t.due(t0 + Duration::from_millis(100)));

        t.cancel();
        assert!(!t.is_armed());
        assert!(!t.due(t0 + Duration::from_secs(10)));
    }
}
