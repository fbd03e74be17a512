use anyhow::{ensure, Result};
use bytes::Bytes;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt::{Display, Formatter};

/// Largest magnitude a command carries, in degrees.
pub(crate) const MAX_MAGNITUDE_DEG: f32 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum DirectionCode {
    None = 0,
    Left = 1,
    Right = 2,
    OffRoute = 3,
}

impl Display for DirectionCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectionCode::None => write!(f, "none"),
            DirectionCode::Left => write!(f, "left"),
            DirectionCode::Right => write!(f, "right"),
            DirectionCode::OffRoute => write!(f, "off route"),
        }
    }
}

/// Two-byte actuator command: `[code, magnitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionCommand {
    pub code: DirectionCode,
    /// Turn magnitude in whole degrees, 0 to 180.
    pub magnitude: u8,
}

impl DirectionCommand {
    /// Command for a signed steering angle, positive to the right. Angles are
    /// wrapped into `(-180, 180]` first.
    ///
    /// Inside the deadband no side is cued and the magnitude carries the
    /// signed angle clamped at zero, so small left deviations read as `0`.
    pub fn from_steering(angle_deg: f32, deadband_deg: f32) -> Self {
        let angle = wrap_degrees(angle_deg);
        let (code, magnitude) = if angle.abs() <= deadband_deg {
            (DirectionCode::None, angle)
        } else if angle < 0.0 {
            (DirectionCode::Left, -angle)
        } else {
            (DirectionCode::Right, angle)
        };
        Self {
            code,
            magnitude: magnitude.round().clamp(0.0, MAX_MAGNITUDE_DEG) as u8,
        }
    }

    /// No turn, zero magnitude. Quiets the actuator's direction cue.
    pub fn hold() -> Self {
        Self {
            code: DirectionCode::None,
            magnitude: 0,
        }
    }

    /// Tells the actuator the user has left the route.
    pub fn off_route() -> Self {
        Self {
            code: DirectionCode::OffRoute,
            magnitude: 0,
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&[self.code.into(), self.magnitude])
    }

    pub fn from_bytes(packet: &[u8]) -> Result<Self> {
        ensure!(packet.len() == 2, "direction packet must be 2 bytes, got {}", packet.len());
        let code = DirectionCode::try_from(packet[0])?;
        ensure!(
            packet[1] as f32 <= MAX_MAGNITUDE_DEG,
            "magnitude {} exceeds {MAX_MAGNITUDE_DEG}",
            packet[1]
        );
        Ok(Self {
            code,
            magnitude: packet[1],
        })
    }
}

impl Display for DirectionCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}°", self.code, self.magnitude)
    }
}

fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadband_suppresses_small_angles() {
        for angle in [-5.0, -2.4, 0.0, 3.0, 5.0] {
            assert_eq!(DirectionCommand::from_steering(angle, 5.0).code, DirectionCode::None);
        }
        assert_eq!(DirectionCommand::from_steering(3.0, 5.0).magnitude, 3);
    }

    #[test]
    fn small_left_deviation_has_zero_magnitude() {
        assert_eq!(DirectionCommand::from_steering(-3.0, 5.0), DirectionCommand::hold());
        assert_eq!(DirectionCommand::from_steering(-4.6, 5.0).to_bytes().as_ref(), &[0, 0]);
        assert_eq!(DirectionCommand::from_steering(357.0, 5.0).magnitude, 0);
        assert_eq!(DirectionCommand::from_steering(4.6, 5.0).to_bytes().as_ref(), &[0, 5]);
    }

    #[test]
    fn sign_picks_the_side() {
        assert_eq!(
            DirectionCommand::from_steering(-12.6, 5.0),
            DirectionCommand {
                code: DirectionCode::Left,
                magnitude: 13
            }
        );
        assert_eq!(
            DirectionCommand::from_steering(30.0, 5.0),
            DirectionCommand {
                code: DirectionCode::Right,
                magnitude: 30
            }
        );
    }

    #[test]
    fn large_angles_wrap_around() {
        let command = DirectionCommand::from_steering(350.0, 5.0);
        assert_eq!(command.code, DirectionCode::Left);
        assert_eq!(command.magnitude, 10);
        assert_eq!(DirectionCommand::from_steering(-190.0, 5.0).code, DirectionCode::Right);
        assert_eq!(DirectionCommand::from_steering(180.0, 5.0).magnitude, 180);
    }

    #[test]
    fn packets_decode_back() -> anyhow::Result<()> {
        assert_eq!(DirectionCommand::off_route().to_bytes().as_ref(), &[3, 0]);
        let command = DirectionCommand::from_bytes(&[2, 45])?;
        assert_eq!(command.code, DirectionCode::Right);
        assert_eq!(command.to_bytes().as_ref(), &[2, 45]);
        Ok(())
    }

    #[test]
    fn malformed_packets_are_rejected() {
        assert!(DirectionCommand::from_bytes(&[1]).is_err());
        assert!(DirectionCommand::from_bytes(&[9, 0]).is_err());
        assert!(DirectionCommand::from_bytes(&[1, 200]).is_err());
    }
}
