//! Parameter automation timelines.
//!
//! An `Automation` is a default value plus an ordered list of events, evaluated
//! the way Web Audio `AudioParam`s are: a `Set` jumps at its time, a ramp
//! interpolates from the previous event's value and time up to its own.
//! Before the first event the default applies, after the last one its value holds.

#[derive(Clone, Copy, Debug, PartialEq)]
enum Event {
    Set { value: f32, time: f64 },
    Linear { value: f32, time: f64 },
    Exponential { value: f32, time: f64 },
}

impl Event {
    fn time(&self) -> f64 {
        match *self {
            Event::Set { time, .. }
            | Event::Linear { time, .. }
            | Event::Exponential { time, .. } => time,
        }
    }

    fn value(&self) -> f32 {
        match *self {
            Event::Set { value, .. }
            | Event::Linear { value, .. }
            | Event::Exponential { value, .. } => value,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Automation {
    default: f32,
    events: Vec<Event>,
}

impl Automation {
    pub fn constant(value: f32) -> Self {
        Self { default: value, events: Vec::new() }
    }

    pub fn set_value_at(mut self, value: f32, time: f64) -> Self {
        self.events.push(Event::Set { value, time });
        self
    }

    pub fn linear_ramp_to(mut self, value: f32, time: f64) -> Self {
        self.events.push(Event::Linear { value, time });
        self
    }

    /// `value` must be non-zero and share the sign of the previous value,
    /// otherwise the previous value is held until `time`.
    pub fn exponential_ramp_to(mut self, value: f32, time: f64) -> Self {
        self.events.push(Event::Exponential { value, time });
        self
    }

    pub fn is_constant(&self) -> bool {
        self.events.is_empty()
    }

    /// Value in effect when the timeline starts.
    pub fn initial_value(&self) -> f32 {
        match self.events.first() {
            Some(Event::Set { value, .. }) => *value,
            _ => self.default,
        }
    }

    pub fn final_value(&self) -> f32 {
        self.events.last().map(Event::value).unwrap_or(self.default)
    }

    pub fn last_event_time(&self) -> Option<f64> {
        self.events.last().map(Event::time)
    }

    pub fn value_at(&self, t: f64) -> f32 {
        let mut value = self.default;
        let mut prev: Option<(f64, f32)> = None;

        for event in &self.events {
            let end = event.time();
            if t < end {
                return match (*event, prev) {
                    (Event::Set { .. }, _) | (_, None) => value,
                    (Event::Linear { value: target, .. }, Some((start, from))) => {
                        let frac = ((t - start) / (end - start)) as f32;
                        from + (target - from) * frac
                    }
                    (Event::Exponential { value: target, .. }, Some((start, from))) => {
                        if from == 0.0 || target == 0.0 || from.signum() != target.signum() {
                            return from;
                        }
                        let frac = (t - start) / (end - start);
                        from * (target / from).powf(frac as f32)
                    }
                };
            }
            value = event.value();
            prev = Some((end, value));
        }
        value
    }
}
