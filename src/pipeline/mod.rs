pub mod pattern;
pub mod persistence;
pub mod song;

pub use pattern::{Bar, Pattern, Track};
pub use song::{DistortionSettings, Groove, Song};
