use bytes::Bytes;
use pathsense_depth::config::{DistanceConfig, HapticConfig};
use pathsense_depth::FrameAnalysisResult;
use std::fmt::{Display, Formatter};

/// Left, front and right actuator drive levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HapticIntensities {
    pub left: u8,
    pub front: u8,
    pub right: u8,
}

impl HapticIntensities {
    /// All channels saturated, the stop signal.
    pub const STOP: Self = Self {
        left: 255,
        front: 255,
        right: 255,
    };

    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&[self.left, self.front, self.right])
    }
}

impl Display for HapticIntensities {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "L{:3} F{:3} R{:3}", self.left, self.front, self.right)
    }
}

/// Which rule produced a frame's raw intensities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticMode {
    /// No safe path: stop.
    Stop,
    /// Safe path off to one side: steer.
    Steer,
    /// Safe path straight ahead: warn about obstacles alongside.
    Guard,
}

impl HapticMode {
    pub fn of(result: &FrameAnalysisResult) -> Self {
        if result.flags.no_safe_path {
            HapticMode::Stop
        } else if result.flags.safe_path_exists && !result.flags.safe_path_straight {
            HapticMode::Steer
        } else {
            HapticMode::Guard
        }
    }
}

/// Turns stabilized analysis results into actuator intensities.
///
/// Holds the only state of the haptic path: the per-channel moving average
/// that keeps the actuators from jumping between frames.
#[derive(Debug, Clone)]
pub struct HapticEncoder {
    config: HapticConfig,
    danger_close: f32,
    caution: f32,
    smoothed: Option<[f32; 3]>,
}

impl HapticEncoder {
    pub fn new(config: &HapticConfig, distance: &DistanceConfig) -> Self {
        Self {
            config: config.clone(),
            danger_close: distance.danger_close,
            caution: distance.caution,
            smoothed: None,
        }
    }

    /// 0 beyond the caution distance, 1 at or inside danger-close.
    pub fn proximity(&self, distance: f32) -> f32 {
        ((self.caution - distance) / (self.caution - self.danger_close)).clamp(0.0, 1.0)
    }

    /// Unsmoothed `[left, front, right]` levels for one result.
    pub fn target(&self, result: &FrameAnalysisResult) -> [f32; 3] {
        let [left, mut front, right] = match HapticMode::of(result) {
            HapticMode::Stop => [255.0; 3],
            HapticMode::Steer => {
                let angle = result.steering_angle;
                let weight = (angle.abs() / self.config.full_side_angle_deg).min(1.0);
                let urgency = 0.5 + 0.5 * self.proximity(result.nearest_distance);
                let side = 255.0 * weight * urgency;
                let front = 255.0 * (1.0 - weight) * urgency;
                if angle < 0.0 {
                    [side, front, 0.0]
                } else {
                    [0.0, front, side]
                }
            }
            HapticMode::Guard => {
                let (mut left, mut right) = (0.0f32, 0.0f32);
                for cluster in &result.clusters {
                    let level = 255.0 * self.proximity(cluster.nearest_distance);
                    if cluster.center_angle_deg < result.steering_angle {
                        left = left.max(level);
                    } else if cluster.center_angle_deg > result.steering_angle {
                        right = right.max(level);
                    }
                }
                [left, 0.0, right]
            }
        };

        if result.flags.stairs() {
            front = front.max(self.config.stairs_front_floor as f32);
        }
        if result.flags.slope() {
            front = front.max(self.config.slope_front_floor as f32);
        }
        [left, front, right].map(|level| level.clamp(0.0, 255.0))
    }

    pub fn encode(&mut self, result: &FrameAnalysisResult) -> HapticIntensities {
        let target = self.target(result);
        let alpha = self.config.ema_alpha;
        let smoothed = match self.smoothed {
            Some(previous) => {
                let mut next = previous;
                for (channel, raw) in next.iter_mut().zip(target) {
                    *channel += alpha * (raw - *channel);
                }
                next
            }
            None => target,
        };
        self.smoothed = Some(smoothed);

        let [left, front, right] = smoothed.map(|level| level.round().clamp(0.0, 255.0) as u8);
        HapticIntensities { left, front, right }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pathsense_depth::{ClusterType, HazardFlags, ObstacleCluster};

    fn encoder() -> HapticEncoder {
        HapticEncoder::new(&HapticConfig::default(), &DistanceConfig::default())
    }

    fn result(flags: HazardFlags) -> FrameAnalysisResult {
        FrameAnalysisResult {
            timestamp: 0.0,
            flags,
            steering_angle: 0.0,
            corridor_width: 0.0,
            nearest_distance: 5.0,
            nearest_angle: None,
            ground_height: 0.0,
            clusters: Vec::new(),
        }
    }

    fn steering(angle: f32, nearest: f32) -> FrameAnalysisResult {
        let mut flags = HazardFlags::cleared();
        flags.safe_path_exists = true;
        let mut result = result(flags);
        result.steering_angle = angle;
        result.nearest_distance = nearest;
        result
    }

    fn straight() -> FrameAnalysisResult {
        let mut flags = HazardFlags::cleared();
        flags.safe_path_exists = true;
        flags.safe_path_straight = true;
        result(flags)
    }

    fn cluster(angle: f32, distance: f32) -> ObstacleCluster {
        ObstacleCluster {
            center_angle_deg: angle,
            nearest_distance: distance,
            angular_width_deg: 5.0,
            physical_width: 0.2,
            kind: ClusterType::Pole,
        }
    }

    #[test]
    fn no_safe_path_saturates_everything() {
        let mut encoder = encoder();
        assert_eq!(encoder.encode(&result(HazardFlags::default())), HapticIntensities::STOP);
    }

    #[test]
    fn steering_splits_between_side_and_front() {
        let encoder = encoder();
        let [left, front, right] = encoder.target(&steering(22.5, 5.0));
        assert_eq!(left, 0.0);
        assert_abs_diff_eq!(right, 255.0 * 0.5 * 0.5, epsilon = 1e-3);
        assert_abs_diff_eq!(front, 255.0 * 0.5 * 0.5, epsilon = 1e-3);

        let [left, front, right] = encoder.target(&steering(-90.0, 0.5));
        assert_eq!((left, front, right), (255.0, 0.0, 0.0));
    }

    #[test]
    fn straight_path_reports_clusters_per_side() {
        let encoder = encoder();
        let mut result = straight();
        result.clusters = vec![cluster(-20.0, 1.25), cluster(-10.0, 0.5), cluster(15.0, 3.0)];
        let [left, front, right] = encoder.target(&result);
        assert_eq!(left, 255.0);
        assert_eq!(front, 0.0);
        assert_eq!(right, 0.0);
    }

    #[test]
    fn terrain_floors_the_front_channel() {
        let encoder = encoder();
        let mut stairs = straight();
        stairs.flags.up_stairs = true;
        assert_eq!(encoder.target(&stairs)[1], 200.0);

        let mut slope = straight();
        slope.flags.down_slope = true;
        assert_eq!(encoder.target(&slope)[1], 120.0);

        let mut both = stairs.clone();
        both.flags.up_slope = true;
        assert_eq!(encoder.target(&both)[1], 200.0);
    }

    #[test]
    fn outputs_are_smoothed() {
        let mut encoder = encoder();
        let stop = result(HazardFlags::default());
        assert_eq!(encoder.encode(&stop), HapticIntensities::STOP);

        let clear = encoder.encode(&straight());
        assert_eq!(clear.front, 128);
        assert_eq!(clear.left, 128);
        let clearer = encoder.encode(&straight());
        assert_eq!(clearer.front, 64);
    }

    #[test]
    fn packet_is_three_bytes() {
        let intensities = HapticIntensities {
            left: 1,
            front: 2,
            right: 3,
        };
        assert_eq!(intensities.to_bytes().as_ref(), &[1, 2, 3]);
    }
}
