use crate::shared::{PlaybackState, Position};

/// What a transport call actually did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// `from_top` is set when playback starts from stopped and the cursor
    /// has to go back to (0, 0).
    Started { from_top: bool },
    Paused,
    Stopped,
    Unchanged,
}

/// The stopped / playing / paused state machine, plus the position shown
/// to the user. The position is display only; scheduling never reads it.
#[derive(Clone, Debug, Default)]
pub struct Transport {
    state: PlaybackState,
    position: Position,
}

impl Transport {
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn play(&mut self) -> Transition {
        match self.state {
            PlaybackState::Playing => Transition::Unchanged,
            PlaybackState::Paused => {
                self.state = PlaybackState::Playing;
                Transition::Started { from_top: false }
            }
            PlaybackState::Stopped => {
                self.state = PlaybackState::Playing;
                self.position = Position::default();
                Transition::Started { from_top: true }
            }
        }
    }

    pub fn pause(&mut self) -> Transition {
        if self.state != PlaybackState::Playing {
            return Transition::Unchanged;
        }
        self.state = PlaybackState::Paused;
        Transition::Paused
    }

    /// Always lands on (0, 0), whatever the prior state.
    pub fn stop(&mut self) -> Transition {
        self.state = PlaybackState::Stopped;
        self.position = Position::default();
        Transition::Stopped
    }

    pub fn publish(&mut self, position: Position) {
        self.position = position;
    }
}
