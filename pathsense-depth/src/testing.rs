//! Grid builders shared by unit tests.

use crate::classify::ClassifiedGrid;
use crate::config::HeightBands;
use crate::projection::WorldPointGrid;
use nalgebra::Point3;

pub(crate) const CAMERA_HEIGHT: f32 = 1.4;

/// Builds a classified grid from `(forward distance, height)` per cell with
/// the ground at zero. Points are placed straight ahead of the camera, so
/// only their distance and height matter.
pub(crate) fn classified_grid(
    rows: usize,
    cols: usize,
    cell: impl Fn(usize, usize) -> Option<(f32, f32)>,
) -> ClassifiedGrid {
    let mut cells = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            cells.push(cell(row, col).map(|(distance, height)| Point3::new(0.0, height, -distance)));
        }
    }
    let grid = WorldPointGrid::from_cells(rows, cols, &cells, Point3::new(0.0, CAMERA_HEIGHT, 0.0));
    ClassifiedGrid::classify(grid, 0.0, &HeightBands::default())
}
