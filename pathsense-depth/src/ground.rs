use crate::projection::WorldPointGrid;
use log::debug;

/// Histogram bin width for world heights (meters).
pub(crate) const GROUND_BIN_WIDTH: f32 = 0.05;
/// Fraction of the observed height range searched for the ground mode.
pub(crate) const GROUND_SEARCH_FRACTION: f32 = 0.3;
/// Assumed camera height above ground when nothing has been observed yet.
pub(crate) const FALLBACK_CAMERA_HEIGHT: f32 = 1.2;

/// Tracks the ground height across frames.
///
/// Each frame votes with the modal height bin among the lowest part of the
/// point cloud; the vote is blended slowly into the running estimate so the
/// ground does not jump between frames.
#[derive(Debug, Clone)]
pub struct GroundEstimator {
    alpha: f32,
    smoothed: Option<f32>,
}

impl GroundEstimator {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha,
            smoothed: None,
        }
    }

    /// Current smoothed ground height, `None` before the first update.
    pub fn ground_height(&self) -> Option<f32> {
        self.smoothed
    }

    /// Updates the estimate from a projected grid and returns it.
    pub fn update(&mut self, grid: &WorldPointGrid, camera_height: f32) -> f32 {
        let heights = grid.valid_points().map(|p| p.y).collect::<Vec<_>>();
        self.update_from_heights(&heights, camera_height)
    }

    pub fn update_from_heights(&mut self, heights: &[f32], camera_height: f32) -> f32 {
        let ground = match (histogram_mode(heights), self.smoothed) {
            (None, Some(previous)) => previous,
            (None, None) => {
                debug!("No valid points yet, assuming ground {FALLBACK_CAMERA_HEIGHT} m below camera");
                camera_height - FALLBACK_CAMERA_HEIGHT
            }
            (Some(estimate), None) => estimate,
            (Some(estimate), Some(previous)) => previous * (1.0 - self.alpha) + estimate * self.alpha,
        };
        self.smoothed = Some(ground);
        ground
    }
}

/// Center of the most populated height bin within the lowest
/// [`GROUND_SEARCH_FRACTION`] of the observed range. Ties go to the lower bin.
pub fn histogram_mode(heights: &[f32]) -> Option<f32> {
    let (min, max) = heights
        .iter()
        .copied()
        .filter(|h| h.is_finite())
        .fold(None, |range: Option<(f32, f32)>, h| match range {
            None => Some((h, h)),
            Some((lo, hi)) => Some((lo.min(h), hi.max(h))),
        })?;

    let bin_count = ((max - min) / GROUND_BIN_WIDTH) as usize + 1;
    let mut bins = vec![0usize; bin_count];
    for h in heights.iter().copied().filter(|h| h.is_finite()) {
        let index = (((h - min) / GROUND_BIN_WIDTH) as usize).min(bin_count - 1);
        bins[index] += 1;
    }

    let search_top = min + GROUND_SEARCH_FRACTION * (max - min);
    let center = |index: usize| min + (index as f32 + 0.5) * GROUND_BIN_WIDTH;

    let mut best = 0;
    for index in 1..bin_count {
        if center(index) > search_top {
            break;
        }
        if bins[index] > bins[best] {
            best = index;
        }
    }
    Some(center(best))
}
