use bytes::Bytes;
use log::debug;
use parking_lot::Mutex;
use std::sync::Arc;

/// Outbound connection to the haptic actuator. Sends are fire-and-forget.
pub trait ActuatorLink {
    fn send(&mut self, packet: Bytes);
}

/// Writes packets to the log instead of a radio.
#[derive(Debug, Default)]
pub struct LoggingLink {
    sent: usize,
}

impl LoggingLink {
    pub fn sent(&self) -> usize {
        self.sent
    }
}

impl ActuatorLink for LoggingLink {
    fn send(&mut self, packet: Bytes) {
        self.sent += 1;
        debug!("Actuator packet #{}: {:?}", self.sent, packet.as_ref());
    }
}

impl ActuatorLink for Arc<Mutex<Vec<Bytes>>> {
    fn send(&mut self, packet: Bytes) {
        self.lock().push(packet);
    }
}
