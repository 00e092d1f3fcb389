// The symbolic pattern: bars of 16 steps, one boolean track per drum.
//
// -- DEFINITIONS --
// "bar": one 16-step measure with a track per drum type.
// "step" (a.k.a. beat index): one sixteenth inside a bar, 0..16.
// "accent": an overlay on the snare track marking louder hits.
// "pattern": the ordered list of bars the transport loops over (1..=30).

use serde::{Deserialize, Serialize};

use crate::error::PatternError;
use crate::shared::{DrumType, MAX_BARS, STEPS_PER_BAR};

pub type Track = [bool; STEPS_PER_BAR];

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub kick: Track,
    pub snare: Track,
    pub hihat: Track,
    pub openhat: Track,
    pub clap: Track,
    pub tom: Track,
    pub rim: Track,
    pub cowbell: Track,
    // older files don't carry accents at all
    #[serde(default)]
    pub snare_accent: Track,
}

impl Bar {
    pub fn steps(&self, drum: DrumType) -> &Track {
        match drum {
            DrumType::Kick => &self.kick,
            DrumType::Snare => &self.snare,
            DrumType::Hihat => &self.hihat,
            DrumType::Openhat => &self.openhat,
            DrumType::Clap => &self.clap,
            DrumType::Tom => &self.tom,
            DrumType::Rim => &self.rim,
            DrumType::Cowbell => &self.cowbell,
        }
    }

    pub fn steps_mut(&mut self, drum: DrumType) -> &mut Track {
        match drum {
            DrumType::Kick => &mut self.kick,
            DrumType::Snare => &mut self.snare,
            DrumType::Hihat => &mut self.hihat,
            DrumType::Openhat => &mut self.openhat,
            DrumType::Clap => &mut self.clap,
            DrumType::Tom => &mut self.tom,
            DrumType::Rim => &mut self.rim,
            DrumType::Cowbell => &mut self.cowbell,
        }
    }

    pub fn is_active(&self, drum: DrumType, step: usize) -> bool {
        self.steps(drum).get(step).copied().unwrap_or(false)
    }

    pub fn is_accented(&self, step: usize) -> bool {
        self.snare_accent.get(step).copied().unwrap_or(false)
    }

    /// Drums sounding at `step`, in grid order.
    pub fn active_drums(&self, step: usize) -> impl Iterator<Item = DrumType> + '_ {
        DrumType::GRID_ORDER
            .into_iter()
            .filter(move |d| self.is_active(*d, step))
    }

    pub fn is_empty(&self) -> bool {
        DrumType::ALL.iter().all(|d| self.steps(*d).iter().all(|s| !s))
    }
}

/// An ordered, never-empty list of at most `MAX_BARS` bars.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bar>", into = "Vec<Bar>")]
pub struct Pattern {
    bars: Vec<Bar>,
}

impl Default for Pattern {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Vec<Bar>> for Pattern {
    type Error = PatternError;

    fn try_from(bars: Vec<Bar>) -> Result<Self, Self::Error> {
        Self::from_bars(bars)
    }
}

impl From<Pattern> for Vec<Bar> {
    fn from(p: Pattern) -> Self {
        p.bars
    }
}

impl Pattern {
    pub fn new() -> Self {
        Self { bars: vec![Bar::default()] }
    }

    pub fn from_bars(bars: Vec<Bar>) -> Result<Self, PatternError> {
        if bars.is_empty() {
            return Err(PatternError::LastBar);
        }
        if bars.len() > MAX_BARS {
            return Err(PatternError::Full);
        }
        Ok(Self { bars })
    }

    /// One-bar rock beat: kick on 0, 8 and 10, snare on 4 and 12, eighth-note hats.
    pub fn backbeat() -> Self {
        let mut bar = Bar::default();
        for step in (0..STEPS_PER_BAR).step_by(2) {
            bar.hihat[step] = true;
        }
        bar.kick[0] = true;
        bar.kick[8] = true;
        bar.kick[10] = true;
        bar.snare[4] = true;
        bar.snare[12] = true;
        Self { bars: vec![bar] }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bar(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    fn bar_mut(&mut self, index: usize) -> Result<&mut Bar, PatternError> {
        let len = self.bars.len();
        self.bars
            .get_mut(index)
            .ok_or(PatternError::BarOutOfRange { index, len })
    }

    fn check_index(&self, index: usize) -> Result<(), PatternError> {
        if index < self.bars.len() {
            Ok(())
        } else {
            Err(PatternError::BarOutOfRange { index, len: self.bars.len() })
        }
    }

    pub fn toggle_step(
        &mut self,
        bar: usize,
        drum: DrumType,
        step: usize,
    ) -> Result<(), PatternError> {
        if step >= STEPS_PER_BAR {
            return Err(PatternError::StepOutOfRange(step));
        }
        let cell = &mut self.bar_mut(bar)?.steps_mut(drum)[step];
        *cell = !*cell;
        Ok(())
    }

    /// Clearing an accent leaves the snare hit alone; setting one also turns the snare on.
    pub fn toggle_accent(&mut self, bar: usize, step: usize) -> Result<(), PatternError> {
        if step >= STEPS_PER_BAR {
            return Err(PatternError::StepOutOfRange(step));
        }
        let bar = self.bar_mut(bar)?;
        if bar.snare_accent[step] {
            bar.snare_accent[step] = false;
        } else {
            bar.snare[step] = true;
            bar.snare_accent[step] = true;
        }
        Ok(())
    }

    pub fn add_bar(&mut self) -> Result<usize, PatternError> {
        if self.bars.len() >= MAX_BARS {
            return Err(PatternError::Full);
        }
        self.bars.push(Bar::default());
        Ok(self.bars.len() - 1)
    }

    pub fn delete_bar(&mut self, index: usize) -> Result<Bar, PatternError> {
        self.check_index(index)?;
        if self.bars.len() == 1 {
            return Err(PatternError::LastBar);
        }
        Ok(self.bars.remove(index))
    }

    /// Copies bar `index` and inserts the copy right after it.
    pub fn duplicate_bar(&mut self, index: usize) -> Result<usize, PatternError> {
        let copy = self.bar(index).cloned().ok_or(PatternError::BarOutOfRange {
            index,
            len: self.bars.len(),
        })?;
        self.insert_bar_after(index, copy)
    }

    /// Paste: inserts `bar` after `index`.
    pub fn insert_bar_after(&mut self, index: usize, bar: Bar) -> Result<usize, PatternError> {
        self.check_index(index)?;
        if self.bars.len() >= MAX_BARS {
            return Err(PatternError::Full);
        }
        self.bars.insert(index + 1, bar);
        Ok(index + 1)
    }

    pub fn move_bar(&mut self, from: usize, to: usize) -> Result<(), PatternError> {
        self.check_index(from)?;
        self.check_index(to)?;
        let bar = self.bars.remove(from);
        self.bars.insert(to, bar);
        Ok(())
    }

    pub fn clear_bar(&mut self, index: usize) -> Result<(), PatternError> {
        *self.bar_mut(index)? = Bar::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_step_twice_restores_the_bar() {
        let mut p = Pattern::backbeat();
        let before = p.clone();
        p.toggle_step(0, DrumType::Cowbell, 3).unwrap();
        assert!(p.bar(0).unwrap().is_active(DrumType::Cowbell, 3));
        p.toggle_step(0, DrumType::Cowbell, 3).unwrap();
        assert_eq!(p, before);
    }

    #[test]
    fn toggle_step_rejects_bad_indices() {
        let mut p = Pattern::new();
        assert_eq!(
            p.toggle_step(1, DrumType::Kick, 0),
            Err(PatternError::BarOutOfRange { index: 1, len: 1 })
        );
        assert_eq!(p.toggle_step(0, DrumType::Kick, 16), Err(PatternError::StepOutOfRange(16)));
    }

    #[test]
    fn accent_forces_snare_on_but_clearing_keeps_it() {
        let mut p = Pattern::new();
        p.toggle_accent(0, 4).unwrap();
        let bar = p.bar(0).unwrap();
        assert!(bar.snare[4]);
        assert!(bar.snare_accent[4]);

        p.toggle_accent(0, 4).unwrap();
        let bar = p.bar(0).unwrap();
        assert!(bar.snare[4]);
        assert!(!bar.snare_accent[4]);
    }

    #[test]
    fn bar_count_is_bounded() {
        let mut p = Pattern::new();
        for _ in 1..MAX_BARS {
            p.add_bar().unwrap();
        }
        assert_eq!(p.len(), MAX_BARS);
        assert_eq!(p.add_bar(), Err(PatternError::Full));
        assert_eq!(p.duplicate_bar(0), Err(PatternError::Full));

        for _ in 1..MAX_BARS {
            p.delete_bar(0).unwrap();
        }
        assert_eq!(p.delete_bar(0), Err(PatternError::LastBar));
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn duplicate_inserts_copy_after_source() {
        let mut p = Pattern::backbeat();
        p.add_bar().unwrap();
        let at = p.duplicate_bar(0).unwrap();
        assert_eq!(at, 1);
        assert_eq!(p.len(), 3);
        assert_eq!(p.bar(0), p.bar(1));
        assert!(p.bar(2).unwrap().is_empty());
    }

    #[test]
    fn move_bar_reorders() {
        let mut p = Pattern::new();
        p.add_bar().unwrap();
        p.add_bar().unwrap();
        p.toggle_step(0, DrumType::Rim, 0).unwrap();
        p.move_bar(0, 2).unwrap();
        assert!(p.bar(2).unwrap().rim[0]);
        assert!(p.bar(0).unwrap().is_empty());
    }

    #[test]
    fn clear_bar_empties_only_that_bar() {
        let mut p = Pattern::backbeat();
        p.duplicate_bar(0).unwrap();
        p.clear_bar(1).unwrap();
        assert!(!p.bar(0).unwrap().is_empty());
        assert!(p.bar(1).unwrap().is_empty());
    }

    #[test]
    fn active_drums_follow_grid_order() {
        let mut bar = Bar::default();
        bar.kick[0] = true;
        bar.hihat[0] = true;
        bar.snare[0] = true;
        let drums: Vec<_> = bar.active_drums(0).collect();
        assert_eq!(drums, vec![DrumType::Hihat, DrumType::Snare, DrumType::Kick]);
    }

    #[test]
    fn empty_pattern_is_rejected_on_load() {
        let err = serde_json::from_str::<Pattern>("[]").unwrap_err();
        assert!(err.to_string().contains("at least one bar"));
    }

    #[test]
    fn missing_accents_default_to_false() {
        let json = r#"{
            "kick":    [true,false,false,false,false,false,false,false,false,false,false,false,false,false,false,false],
            "snare":   [false,false,false,false,true,false,false,false,false,false,false,false,false,false,false,false],
            "hihat":   [false,false,false,false,false,false,false,false,false,false,false,false,false,false,false,false],
            "openhat": [false,false,false,false,false,false,false,false,false,false,false,false,false,false,false,false],
            "clap":    [false,false,false,false,false,false,false,false,false,false,false,false,false,false,false,false],
            "tom":     [false,false,false,false,false,false,false,false,false,false,false,false,false,false,false,false],
            "rim":     [false,false,false,false,false,false,false,false,false,false,false,false,false,false,false,false],
            "cowbell": [false,false,false,false,false,false,false,false,false,false,false,false,false,false,false,false]
        }"#;
        let bar: Bar = serde_json::from_str(json).unwrap();
        assert!(bar.kick[0]);
        assert!(bar.snare[4]);
        assert!(!bar.is_accented(4));
    }
}
