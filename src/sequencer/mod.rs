//! Turning a pattern into timed notes: the look-ahead scheduler, the
//! transport state machine and the drum machine that drives both.

mod machine;
mod scheduler;
mod transport;

pub use machine::DrumMachine;
pub use scheduler::{LookAheadScheduler, ScheduledStep, Ticker};
pub use transport::{Transition, Transport};

use crate::pipeline::{Bar, Pattern};

/// Read access to the bars being played. Looked up fresh for every step.
pub trait PatternSource {
    fn bar_count(&self) -> usize;
    fn bar_at(&self, index: usize) -> Option<&Bar>;
}

impl PatternSource for Pattern {
    fn bar_count(&self) -> usize {
        self.len()
    }

    fn bar_at(&self, index: usize) -> Option<&Bar> {
        self.bar(index)
    }
}

impl PatternSource for [Bar] {
    fn bar_count(&self) -> usize {
        self.len()
    }

    fn bar_at(&self, index: usize) -> Option<&Bar> {
        self.get(index)
    }
}
