use crate::classify::{ClassifiedGrid, PointClass};
use crate::config::DistanceConfig;
use std::ops::{Deref, DerefMut};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockingSample {
    pub distance: f32,
    pub class: PointClass,
}

/// Free-space entry for one angular column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    /// Distance to the nearest blocking sample, or the analysis range.
    pub free_distance: f32,
    pub blocking: Vec<BlockingSample>,
}

impl ColumnProfile {
    pub fn is_blocked(&self) -> bool {
        !self.blocking.is_empty()
    }
}

/// One [`ColumnProfile`] per analysis column, left to right.
#[derive(Debug, Clone, Default)]
pub struct FreeSpaceProfile(Vec<ColumnProfile>);
impl Deref for FreeSpaceProfile {
    type Target = Vec<ColumnProfile>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl DerefMut for FreeSpaceProfile {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<ColumnProfile>> for FreeSpaceProfile {
    fn from(columns: Vec<ColumnProfile>) -> Self {
        Self(columns)
    }
}

#[derive(Debug, Clone)]
pub struct FreeSpaceMapper {
    max_range: f32,
}

impl FreeSpaceMapper {
    pub fn new(max_range: f32) -> Self {
        Self { max_range }
    }

    pub fn from_config(distance: &DistanceConfig) -> Self {
        Self::new(distance.max_analysis_range)
    }

    pub fn map(&self, grid: &ClassifiedGrid) -> FreeSpaceProfile {
        let columns = (0..grid.cols())
            .map(|col| {
                let blocking = grid
                    .column(col)
                    .filter(|(class, _, _)| class.is_blocking())
                    .map(|(class, _, distance)| BlockingSample { distance, class })
                    .collect::<Vec<_>>();
                let free_distance = blocking
                    .iter()
                    .map(|sample| sample.distance)
                    .fold(self.max_range, f32::min);
                ColumnProfile {
                    free_distance,
                    blocking,
                }
            })
            .collect();
        FreeSpaceProfile(columns)
    }
}
