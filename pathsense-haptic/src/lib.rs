//! Actuator side of the walking aid: intensity encoding, direction packets
//! and their rate limit.

pub mod command;
pub mod encoder;
pub mod throttle;

pub use command::{DirectionCode, DirectionCommand};
pub use encoder::{HapticEncoder, HapticIntensities, HapticMode};
pub use throttle::CommandThrottle;
