//! Depth buffer → world-frame point grid.

use crate::config::{DistanceConfig, GridConfig};
use crate::frame::{is_valid_depth, DepthFrame};
use bitvec::prelude::*;
use log::debug;
use nalgebra::Point3;
use ndarray::Array2;
use rayon::prelude::*;

/// Dense `rows × cols` grid of world points with a parallel validity mask.
///
/// Row 0 looks farthest up, rows increase toward the user's feet. Column 0 is
/// the user's left.
#[derive(Debug, Clone)]
pub struct WorldPointGrid {
    points: Array2<Point3<f32>>,
    valid: BitVec,
    camera: Point3<f32>,
}

impl WorldPointGrid {
    /// Builds a grid from per-cell optional points, row-major.
    pub fn from_cells(
        rows: usize,
        cols: usize,
        cells: &[Option<Point3<f32>>],
        camera: Point3<f32>,
    ) -> Self {
        debug_assert_eq!(cells.len(), rows * cols);
        let valid = cells.iter().map(Option::is_some).collect::<BitVec>();
        let points = Array2::from_shape_fn((rows, cols), |(r, c)| {
            cells
                .get(r * cols + c)
                .copied()
                .flatten()
                .unwrap_or_else(Point3::origin)
        });
        Self {
            points,
            valid,
            camera,
        }
    }

    pub fn rows(&self) -> usize {
        self.points.nrows()
    }

    pub fn cols(&self) -> usize {
        self.points.ncols()
    }

    pub fn camera_position(&self) -> &Point3<f32> {
        &self.camera
    }

    pub fn is_valid(&self, row: usize, col: usize) -> bool {
        self.valid
            .get(row * self.cols() + col)
            .map_or(false, |bit| *bit)
    }

    pub fn point(&self, row: usize, col: usize) -> Option<&Point3<f32>> {
        if self.is_valid(row, col) {
            self.points.get((row, col))
        } else {
            None
        }
    }

    pub fn valid_count(&self) -> usize {
        self.valid.count_ones()
    }

    pub fn valid_points(&self) -> impl Iterator<Item = &Point3<f32>> + '_ {
        self.valid
            .iter_ones()
            .filter_map(move |index| self.points.get((index / self.cols(), index % self.cols())))
    }

    /// Horizontal distance from the camera to `point`, ignoring height.
    #[inline]
    pub fn forward_distance(&self, point: &Point3<f32>) -> f32 {
        (point.x - self.camera.x).hypot(point.z - self.camera.z)
    }
}

/// Unprojects a strided subsample of the depth buffer into world space.
#[derive(Debug, Clone)]
pub struct WorldProjector {
    rows: usize,
    cols: usize,
    forward_crop_ratio: f32,
    max_range: f32,
}

impl WorldProjector {
    pub fn new(rows: usize, cols: usize, forward_crop_ratio: f32, max_range: f32) -> Self {
        Self {
            rows,
            cols,
            forward_crop_ratio,
            max_range,
        }
    }

    pub fn from_config(grid: &GridConfig, distance: &DistanceConfig) -> Self {
        Self::new(
            grid.analysis_rows,
            grid.analysis_cols,
            grid.forward_crop_ratio,
            distance.max_analysis_range,
        )
    }

    /// Buffer pixel sampled for grid cell `(row, col)`.
    ///
    /// Rows stride the cropped buffer width, columns stride the buffer height
    /// mirrored left to right. Each sample sits in the middle of its stride.
    pub fn sample_pixel(&self, frame: &DepthFrame, row: usize, col: usize) -> (usize, usize) {
        let usable_x = (frame.width() as f32 * self.forward_crop_ratio) as usize;
        let stride_x = (usable_x / self.rows).max(1);
        let stride_y = (frame.height() / self.cols).max(1);
        let bx = row * stride_x + stride_x / 2;
        let by = (self.cols - 1 - col) * stride_y + stride_y / 2;
        (bx, by)
    }

    pub fn project(&self, frame: &DepthFrame) -> WorldPointGrid {
        let pose = frame.pose();
        let intrinsics = frame.intrinsics();

        let cells = (0..self.rows)
            .into_par_iter()
            .flat_map_iter(|row| {
                (0..self.cols).map(move |col| {
                    let (bx, by) = self.sample_pixel(frame, row, col);
                    let depth = frame.sample(bx, by)?;
                    if !is_valid_depth(depth) || depth >= self.max_range {
                        return None;
                    }
                    let camera_point = intrinsics.unproject(bx as f32, by as f32, depth);
                    Some(pose.to_world(&camera_point))
                })
            })
            .collect::<Vec<_>>();

        let grid = WorldPointGrid::from_cells(self.rows, self.cols, &cells, pose.position());
        debug!(
            "Projected {} of {} samples into world space",
            grid.valid_count(),
            self.rows * self.cols
        );
        grid
    }
}
