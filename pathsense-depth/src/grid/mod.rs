//! Coarse display grid summarizing the raw depth buffer.
//!
//! Each cell holds the percentile-10 depth of the pixels it covers, which
//! tracks the nearest surface while ignoring a few noisy samples. The grid is
//! only used for display and diagnostics; the hazard analysis works on the
//! projected point grid.

pub mod edges;
pub mod percentile;

use crate::config::{DistanceConfig, GridConfig};
use crate::frame::{is_valid_depth, DepthFrame};
use ndarray::{Array2, Zip};
use percentile::percentile10;
use std::fmt::{Display, Formatter, Write};

/// Cells above this distance are printed as `--`.
pub(crate) const RENDER_MAX_DISTANCE: f32 = 99.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DepthGrid(Array2<f32>);

impl DepthGrid {
    pub fn from_cells(cells: Array2<f32>) -> Self {
        Self(cells)
    }

    pub fn rows(&self) -> usize {
        self.0.nrows()
    }

    pub fn cols(&self) -> usize {
        self.0.ncols()
    }

    /// Percentile-10 depth of a cell, `f32::INFINITY` when it had no data.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.0[[row, col]]
    }

    pub fn cells(&self) -> &Array2<f32> {
        &self.0
    }

    pub fn zone(&self, row: usize, col: usize, bands: &DistanceConfig) -> GridZone {
        GridZone::of(self.get(row, col), bands)
    }

    /// Nearest cell value in the grid, `None` when every cell is empty.
    pub fn nearest(&self) -> Option<f32> {
        self.0
            .iter()
            .copied()
            .filter(|d| d.is_finite())
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Compact text rendering, one line per row.
    pub fn render(&self) -> String {
        let mut output = String::new();
        for row in self.0.rows() {
            let cells = row
                .iter()
                .map(|&value| {
                    if value > RENDER_MAX_DISTANCE {
                        " -- ".to_string()
                    } else {
                        format!("{value:4.1}")
                    }
                })
                .collect::<Vec<_>>();
            // Writing into a String cannot fail.
            let _ = writeln!(output, "  [{}]", cells.join("|"));
        }
        output
    }
}

/// Danger zone of a display cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridZone {
    DangerClose,
    Danger,
    Caution,
    Clear,
    NoData,
}

impl GridZone {
    pub fn of(distance: f32, bands: &DistanceConfig) -> Self {
        if !distance.is_finite() {
            GridZone::NoData
        } else if distance < bands.danger_close {
            GridZone::DangerClose
        } else if distance < bands.danger {
            GridZone::Danger
        } else if distance < bands.caution {
            GridZone::Caution
        } else {
            GridZone::Clear
        }
    }
}

impl Display for GridZone {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GridZone::DangerClose => write!(f, "danger close"),
            GridZone::Danger => write!(f, "danger"),
            GridZone::Caution => write!(f, "caution"),
            GridZone::Clear => write!(f, "clear"),
            GridZone::NoData => write!(f, "no data"),
        }
    }
}

/// Downsamples a depth buffer into a [`DepthGrid`].
///
/// Display rows run along the buffer width axis (the forward crop applies
/// there), display columns along the buffer height axis, mirrored so column 0
/// is on the user's left.
#[derive(Debug, Clone)]
pub struct GridSummarizer {
    rows: usize,
    cols: usize,
    forward_crop_ratio: f32,
}

impl GridSummarizer {
    pub fn new(rows: usize, cols: usize, forward_crop_ratio: f32) -> Self {
        Self {
            rows,
            cols,
            forward_crop_ratio,
        }
    }

    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(
            config.display_rows,
            config.display_cols,
            config.forward_crop_ratio,
        )
    }

    pub fn summarize(&self, frame: &DepthFrame) -> DepthGrid {
        let (buf_w, buf_h) = (frame.width(), frame.height());
        let usable_x = (buf_w as f32 * self.forward_crop_ratio) as usize;
        let px_per_row = (usable_x / self.rows).max(1);
        let px_per_col = (buf_h / self.cols).max(1);
        let cols = self.cols;

        let mut cells = Array2::from_elem((self.rows, cols), f32::INFINITY);
        Zip::indexed(&mut cells).par_for_each(|(row, col), cell| {
            let bx_start = row * px_per_row;
            let by_start = (cols - 1 - col) * px_per_col;

            let mut samples = Vec::with_capacity(px_per_row * px_per_col);
            for bx in bx_start..(bx_start + px_per_row).min(buf_w) {
                for by in by_start..(by_start + px_per_col).min(buf_h) {
                    if let Some(d) = frame.sample(bx, by) {
                        if is_valid_depth(d) {
                            samples.push(d);
                        }
                    }
                }
            }
            if let Some(depth) = percentile10(&mut samples) {
                *cell = depth;
            }
        });
        DepthGrid(cells)
    }
}
