//! Angular free space and corridor selection.

mod cluster;
pub mod free_space;
pub mod safe_path;

pub use free_space::{BlockingSample, ColumnProfile, FreeSpaceMapper, FreeSpaceProfile};
pub use safe_path::{Corridor, NearestObstacle, PathAnalysis, SafePathFinder};

use std::ops::RangeInclusive;

/// Center angle of an analysis column in degrees, positive to the right.
#[inline]
pub fn column_angle(col: usize, cols: usize, horizontal_fov_deg: f32) -> f32 {
    ((col as f32 + 0.5) / cols as f32 - 0.5) * horizontal_fov_deg
}

/// Maximal runs of consecutive columns for which `keep` holds.
pub(crate) fn runs(len: usize, keep: impl Fn(usize) -> bool) -> Vec<RangeInclusive<usize>> {
    let mut result = Vec::new();
    let mut start = None;
    for col in 0..len {
        match (keep(col), start) {
            (true, None) => start = Some(col),
            (false, Some(first)) => {
                result.push(first..=col - 1);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(first) = start {
        result.push(first..=len - 1);
    }
    result
}

/// Chord subtended by `angular_width_deg` at `distance`.
#[inline]
pub(crate) fn chord_width(distance: f32, angular_width_deg: f32) -> f32 {
    2.0 * distance * (angular_width_deg.to_radians() / 2.0).tan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn column_angles_are_symmetric() {
        assert_abs_diff_eq!(column_angle(0, 48, 60.0), -29.375, epsilon = 1e-4);
        assert_abs_diff_eq!(column_angle(47, 48, 60.0), 29.375, epsilon = 1e-4);
        assert_abs_diff_eq!(
            column_angle(23, 48, 60.0) + column_angle(24, 48, 60.0),
            0.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn runs_cover_edges() {
        let mask = [true, true, false, true, false, false, true];
        assert_eq!(runs(mask.len(), |i| mask[i]), vec![0..=1, 3..=3, 6..=6]);
        assert!(runs(4, |_| false).is_empty());
        assert_eq!(runs(4, |_| true), vec![0..=3]);
        assert!(runs(0, |_| true).is_empty());
    }

    #[test]
    fn chord_of_ninety_degrees() {
        assert_abs_diff_eq!(chord_width(1.0, 90.0), 2.0, epsilon = 1e-5);
    }
}
