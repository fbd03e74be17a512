/// Admits at most one event per `interval` seconds of frame time.
///
/// Timestamps come from the frames themselves, so replays and tests behave
/// the same as live capture.
#[derive(Debug, Clone)]
pub struct IntervalGate {
    interval: f64,
    last: Option<f64>,
}

impl IntervalGate {
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Returns `true` and records `timestamp` when at least `interval` has
    /// passed since the last admitted event.
    pub fn admit(&mut self, timestamp: f64) -> bool {
        match self.last {
            Some(last) if timestamp - last < self.interval => false,
            _ => {
                self.last = Some(timestamp);
                true
            }
        }
    }

    pub fn last_admitted(&self) -> Option<f64> {
        self.last
    }
}
