use log::trace;
use pathsense_depth::IntervalGate;
use std::fmt::Display;

/// Lets at most one packet through per interval of frame time. Packets
/// offered too early are dropped, never queued.
#[derive(Debug, Clone)]
pub struct CommandThrottle {
    gate: IntervalGate,
}

impl CommandThrottle {
    pub fn new(interval: f64) -> Self {
        Self {
            gate: IntervalGate::new(interval),
        }
    }

    pub fn offer<T: Display>(&mut self, timestamp: f64, packet: T) -> Option<T> {
        if self.gate.admit(timestamp) {
            Some(packet)
        } else {
            trace!("Dropping {packet} at t={timestamp:.3}");
            None
        }
    }
}
