// The boundary between the control side (scheduler, transport, synthesizer)
// and whatever actually makes sound.
pub use crate::audio::Voice;
use crate::error::EngineError;
use crate::synth::NoteGraph;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputState {
    Suspended,
    Running,
    Closed,
}

/// An audio output with its own clock. The clock only advances while the
/// output is running; note graphs are timed against it.
pub trait AudioOutput {
    /// Seconds of audio rendered so far.
    fn current_time(&self) -> f64;

    fn state(&self) -> OutputState;

    /// Must leave the output `Running` or fail.
    fn resume(&mut self) -> Result<(), EngineError>;

    fn suspend(&mut self) -> Result<(), EngineError>;

    /// Releases the device. The output can't be resumed afterwards.
    fn close(&mut self);

    /// Fire and forget: a graph that can't be delivered is dropped.
    fn submit(&mut self, graph: NoteGraph);
}

#[derive(Debug)]
pub enum AudioCommand {
    // prepared on the control side; the render thread never allocates
    Play(Box<Voice>),
}
