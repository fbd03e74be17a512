use super::central_band;
use crate::classify::{ClassifiedGrid, PointClass};
use crate::config::TerrainConfig;
use log::debug;

/// Fits below this relative conditioning are treated as degenerate.
pub(crate) const SLOPE_CONDITION_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SlopeSignal {
    pub up: bool,
    pub down: bool,
    /// Fitted incline, positive when the ground rises ahead.
    pub angle_deg: Option<f32>,
}

/// Fits a line through ground height against forward distance in the
/// central columns.
#[derive(Debug, Clone)]
pub struct SlopeDetector {
    band_half_width: usize,
    min_points: usize,
    angle_threshold_deg: f32,
}

impl SlopeDetector {
    pub fn from_config(config: &TerrainConfig) -> Self {
        Self {
            band_half_width: config.slope_band_half_width,
            min_points: config.slope_min_points,
            angle_threshold_deg: config.slope_angle_threshold_deg,
        }
    }

    pub fn detect(&self, grid: &ClassifiedGrid) -> SlopeSignal {
        let samples = central_band(grid.cols(), self.band_half_width)
            .flat_map(|col| grid.column(col))
            .filter(|(class, _, _)| *class == PointClass::Ground)
            .map(|(_, height, distance)| (distance as f64, height as f64))
            .collect::<Vec<_>>();

        if samples.len() < self.min_points {
            return SlopeSignal::default();
        }
        let Some(gradient) = fit_gradient(&samples) else {
            debug!("Slope fit over {} points is degenerate", samples.len());
            return SlopeSignal::default();
        };

        let angle = gradient.atan().to_degrees() as f32;
        SlopeSignal {
            up: angle > self.angle_threshold_deg,
            down: angle < -self.angle_threshold_deg,
            angle_deg: Some(angle),
        }
    }
}

/// Least-squares gradient `a` of `y = a·x + b` over `(x, y)` samples.
fn fit_gradient(samples: &[(f64, f64)]) -> Option<f64> {
    let n = samples.len() as f64;
    let (sum_x, sum_y, sum_xx, sum_xy) = samples.iter().fold(
        (0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxx, sxy), &(x, y)| (sx + x, sy + y, sxx + x * x, sxy + x * y),
    );

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator.abs() <= SLOPE_CONDITION_EPSILON * n * sum_xx {
        return None;
    }
    Some((n * sum_xy - sum_x * sum_y) / denominator)
}
