use crate::stabilize::flags::HazardFlags;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterType {
    Wall,
    Pole,
    LowObstacle,
    DropOff,
    TripHazard,
}

impl Display for ClusterType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ClusterType::Wall => "wall",
            ClusterType::Pole => "pole",
            ClusterType::LowObstacle => "low obstacle",
            ClusterType::DropOff => "drop-off",
            ClusterType::TripHazard => "trip hazard",
        };
        write!(f, "{name}")
    }
}

/// A run of adjacent blocked columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleCluster {
    /// Signed angle of the run center, 0 is straight ahead, positive is right.
    pub center_angle_deg: f32,
    pub nearest_distance: f32,
    pub angular_width_deg: f32,
    /// Chord width at the nearest distance (meters).
    pub physical_width: f32,
    pub kind: ClusterType,
}

impl Display for ObstacleCluster {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {:.1} m, {:+.0}° ({:.0}° wide)",
            self.kind, self.nearest_distance, self.center_angle_deg, self.angular_width_deg
        )
    }
}

/// Stabilized output of one analyzed frame.
#[derive(Debug, Clone)]
pub struct FrameAnalysisResult {
    pub timestamp: f64,
    pub flags: HazardFlags,
    /// Smoothed steering angle in degrees, positive is right. Zero until a
    /// corridor has been seen.
    pub steering_angle: f32,
    /// Physical width of the selected corridor, zero when there is none.
    pub corridor_width: f32,
    /// Smoothed nearest obstacle distance. Equals the analysis range when
    /// nothing has been blocked recently.
    pub nearest_distance: f32,
    /// Angle of this frame's nearest blocked column.
    pub nearest_angle: Option<f32>,
    pub ground_height: f32,
    pub clusters: Vec<ObstacleCluster>,
}

impl Display for FrameAnalysisResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "t={:.2} flags=[{}] steer={:+.1}° corridor={:.2} m nearest={:.2} m ground={:.2} m clusters={}",
            self.timestamp,
            self.flags,
            self.steering_angle,
            self.corridor_width,
            self.nearest_distance,
            self.ground_height,
            self.clusters.len()
        )
    }
}
