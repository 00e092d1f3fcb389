// Types shared by every layer: the pattern model, the engine and the TUI.
//
// The TUI never touches the engine directly. It turns keys into `InputEvent`s,
// the app loop applies them to the song / drum machine, and every frame the
// TUI just renders a `DisplayState` snapshot.

use serde::{Deserialize, Serialize};

pub const STEPS_PER_BAR: usize = 16;
pub const MAX_BARS: usize = 30;
pub const NUM_DRUMS: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrumType {
    Kick,
    Snare,
    Hihat,
    Openhat,
    Clap,
    Tom,
    Rim,
    Cowbell,
}

impl DrumType {
    pub const ALL: [DrumType; NUM_DRUMS] = [
        DrumType::Kick,
        DrumType::Snare,
        DrumType::Hihat,
        DrumType::Openhat,
        DrumType::Clap,
        DrumType::Tom,
        DrumType::Rim,
        DrumType::Cowbell,
    ];

    /// Grid row order, top to bottom. Drums sharing a step are triggered in this order.
    pub const GRID_ORDER: [DrumType; NUM_DRUMS] = [
        DrumType::Hihat,
        DrumType::Snare,
        DrumType::Kick,
        DrumType::Openhat,
        DrumType::Clap,
        DrumType::Tom,
        DrumType::Rim,
        DrumType::Cowbell,
    ];

    /// Drums that own a waveshaper in the signal shaping unit.
    pub const DISTORTABLE: [DrumType; 3] = [DrumType::Kick, DrumType::Snare, DrumType::Clap];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            DrumType::Kick => "Kick",
            DrumType::Snare => "Snare",
            DrumType::Hihat => "Hi-Hat",
            DrumType::Openhat => "Open Hat",
            DrumType::Clap => "Clap",
            DrumType::Tom => "Tom",
            DrumType::Rim => "Rim",
            DrumType::Cowbell => "Cowbell",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrumKit {
    #[serde(rename = "808")]
    Tr808,
    Rock,
    #[default]
    Jazz,
    Trap,
    Lofi,
    Electro,
    Vintage,
    House,
    Dnb,
    Techno,
}

impl DrumKit {
    pub const ALL: [DrumKit; 10] = [
        DrumKit::Tr808,
        DrumKit::Rock,
        DrumKit::Jazz,
        DrumKit::Trap,
        DrumKit::Lofi,
        DrumKit::Electro,
        DrumKit::Vintage,
        DrumKit::House,
        DrumKit::Dnb,
        DrumKit::Techno,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DrumKit::Tr808 => "808",
            DrumKit::Rock => "Rock",
            DrumKit::Jazz => "Jazz",
            DrumKit::Trap => "Trap",
            DrumKit::Lofi => "Lo-Fi",
            DrumKit::Electro => "Electro",
            DrumKit::Vintage => "Vintage",
            DrumKit::House => "House",
            DrumKit::Dnb => "DnB",
            DrumKit::Techno => "Techno",
        }
    }

    pub fn next(self) -> Self {
        let i = DrumKit::ALL.iter().position(|k| *k == self).unwrap_or(0);
        DrumKit::ALL[(i + 1) % DrumKit::ALL.len()]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Paused,
    Playing,
}

/// A song position: bar index into the pattern and sixteenth step within the bar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub bar: usize,
    pub beat: usize,
}

impl Position {
    pub fn new(bar: usize, beat: usize) -> Self {
        Self { bar, beat }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    // transport
    PlayPause,
    Stop,

    // edit cursor on the visible bar
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
    ToggleStep,
    ToggleAccent,

    // bar list
    PrevBar,
    NextBar,
    AddBar,
    DeleteBar,
    DuplicateBar,
    ClearBar,
    CopyBar,
    PasteBar,
    MoveBar(isize), // shift the shown bar left (<0) or right (>0)

    // groove
    AdjustBpm(f32),
    AdjustSwing(f32),
    NextKit,
    ToggleDistortion(DrumType),

    // back to the default song, stopped
    ResetAll,
    Save,
    Quit,
}

#[derive(Clone, Debug)]
pub struct DisplayState {
    pub grid: [[bool; STEPS_PER_BAR]; NUM_DRUMS], // rows in DrumType::GRID_ORDER
    pub accents: [bool; STEPS_PER_BAR],
    pub shown_bar: usize,
    pub bar_count: usize,
    pub playhead: Option<usize>, // step being played, only when the shown bar is playing
    pub cursor: (usize, usize),  // (grid row, step)
    pub playback: PlaybackState,
    pub position: Position,
    pub bpm: f32,
    pub swing: f32,
    pub kit: DrumKit,
    pub distortion: [bool; 3], // kick, snare, clap
    pub song_name: String,
    pub status: String, // one line of feedback, e.g. "saved" or the last error
}
