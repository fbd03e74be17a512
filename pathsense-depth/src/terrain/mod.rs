//! Terrain trend detection over a forward-centered band of columns.
//!
//! Stairs and slopes are scanned independently. Up and down signals are not
//! reconciled: if one column climbs while another descends, both are
//! reported and left for the stabilizer and the user to sort out.

pub mod slope;
pub mod stairs;

pub use slope::{SlopeDetector, SlopeSignal};
pub use stairs::{StairDetector, StairSignal};

use std::ops::RangeInclusive;

/// Columns within `half_width` of the forward column, clamped to the grid.
pub(crate) fn central_band(cols: usize, half_width: usize) -> RangeInclusive<usize> {
    let center = cols / 2;
    let first = center.saturating_sub(half_width);
    let last = (center + half_width).min(cols.saturating_sub(1));
    first..=last
}
