// Per-drum waveshaping. Kick, snare and clap each own a distortion curve,
// computed once up front; toggling only flips a flag, later notes pick it up.
use std::sync::Arc;

use crate::audio::ShapingCurve;
use crate::pipeline::DistortionSettings;
use crate::shared::DrumType;

#[derive(Clone, Debug)]
struct Shaper {
    curve: Arc<ShapingCurve>,
    enabled: bool,
}

#[derive(Clone, Debug)]
pub struct SignalShaping {
    shapers: [Shaper; 3], // kick, snare, clap
}

fn slot(drum: DrumType) -> Option<usize> {
    match drum {
        DrumType::Kick => Some(0),
        DrumType::Snare => Some(1),
        DrumType::Clap => Some(2),
        _ => None,
    }
}

impl SignalShaping {
    pub fn new(amount: f32) -> Self {
        let shaper = || Shaper {
            curve: Arc::new(ShapingCurve::distortion(amount)),
            enabled: false,
        };
        Self { shapers: [shaper(), shaper(), shaper()] }
    }

    /// No-op for drums without a shaper. Returns whether `drum` has one.
    pub fn set_enabled(&mut self, drum: DrumType, enabled: bool) -> bool {
        match slot(drum) {
            Some(i) => {
                self.shapers[i].enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn is_enabled(&self, drum: DrumType) -> bool {
        slot(drum).is_some_and(|i| self.shapers[i].enabled)
    }

    pub fn apply(&mut self, settings: &DistortionSettings) {
        for drum in DrumType::DISTORTABLE {
            self.set_enabled(drum, settings.get(drum));
        }
    }

    pub fn settings(&self) -> DistortionSettings {
        DistortionSettings {
            kick: self.is_enabled(DrumType::Kick),
            snare: self.is_enabled(DrumType::Snare),
            clap: self.is_enabled(DrumType::Clap),
        }
    }

    pub fn curve(&self, drum: DrumType) -> Option<&Arc<ShapingCurve>> {
        slot(drum).map(|i| &self.shapers[i].curve)
    }

    /// The curve a note on `drum` should pass through right now, if any.
    pub fn active_curve(&self, drum: DrumType) -> Option<Arc<ShapingCurve>> {
        let i = slot(drum)?;
        let shaper = &self.shapers[i];
        shaper.enabled.then(|| Arc::clone(&shaper.curve))
    }
}
