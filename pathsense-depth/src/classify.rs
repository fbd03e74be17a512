use crate::config::HeightBands;
use crate::projection::WorldPointGrid;
use nalgebra::Point3;
use ndarray::Array2;
use std::fmt::{Display, Formatter};

/// Terrain class of one projected point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointClass {
    Invalid,
    Ground,
    TripHazard,
    ObstacleLow,
    ObstacleMid,
    ObstacleHigh,
    DropMild,
    DropSevere,
}

impl PointClass {
    /// Classes that make a column impassable at their distance.
    pub fn is_blocking(self) -> bool {
        matches!(
            self,
            PointClass::ObstacleLow
                | PointClass::ObstacleMid
                | PointClass::ObstacleHigh
                | PointClass::DropSevere
        )
    }

    pub fn is_tall(self) -> bool {
        matches!(self, PointClass::ObstacleMid | PointClass::ObstacleHigh)
    }

    /// Surfaces a foot can land on, used when looking for steps.
    pub fn is_walkable_surface(self) -> bool {
        matches!(
            self,
            PointClass::Ground | PointClass::TripHazard | PointClass::ObstacleLow
        )
    }
}

impl Display for PointClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PointClass::Invalid => "invalid",
            PointClass::Ground => "ground",
            PointClass::TripHazard => "trip hazard",
            PointClass::ObstacleLow => "low obstacle",
            PointClass::ObstacleMid => "mid obstacle",
            PointClass::ObstacleHigh => "high obstacle",
            PointClass::DropMild => "mild drop",
            PointClass::DropSevere => "severe drop",
        };
        write!(f, "{name}")
    }
}

/// Maps a height above ground onto the band taxonomy.
///
/// Bands, from most negative: severe drop, mild drop, ground, trip hazard,
/// low, mid and high obstacle. Heights that are not finite fall back to
/// ground.
pub fn classify_height(h: f32, bands: &HeightBands) -> PointClass {
    if !h.is_finite() {
        return PointClass::Ground;
    }
    if h < -bands.drop_severe_depth {
        PointClass::DropSevere
    } else if h < -bands.drop_mild_depth {
        PointClass::DropMild
    } else if h <= bands.ground_tolerance {
        PointClass::Ground
    } else if h < bands.trip_hazard_max {
        PointClass::TripHazard
    } else if h < bands.obstacle_low_max {
        PointClass::ObstacleLow
    } else if h < bands.obstacle_mid_max {
        PointClass::ObstacleMid
    } else {
        PointClass::ObstacleHigh
    }
}

/// A projected grid with one class per cell and the ground it was measured
/// against.
#[derive(Debug, Clone)]
pub struct ClassifiedGrid {
    grid: WorldPointGrid,
    classes: Array2<PointClass>,
    ground: f32,
}

impl ClassifiedGrid {
    pub fn classify(grid: WorldPointGrid, ground: f32, bands: &HeightBands) -> Self {
        let classes = Array2::from_shape_fn((grid.rows(), grid.cols()), |(r, c)| {
            grid.point(r, c)
                .map_or(PointClass::Invalid, |p| classify_height(p.y - ground, bands))
        });
        Self {
            grid,
            classes,
            ground,
        }
    }

    pub fn rows(&self) -> usize {
        self.classes.nrows()
    }

    pub fn cols(&self) -> usize {
        self.classes.ncols()
    }

    pub fn ground(&self) -> f32 {
        self.ground
    }

    pub fn class(&self, row: usize, col: usize) -> PointClass {
        self.classes[[row, col]]
    }

    pub fn point(&self, row: usize, col: usize) -> Option<&Point3<f32>> {
        self.grid.point(row, col)
    }

    pub fn height_above_ground(&self, row: usize, col: usize) -> Option<f32> {
        self.point(row, col).map(|p| p.y - self.ground)
    }

    pub fn forward_distance(&self, row: usize, col: usize) -> Option<f32> {
        self.point(row, col).map(|p| self.grid.forward_distance(p))
    }

    /// Valid samples of one column as `(class, height above ground, forward
    /// distance)`.
    pub fn column(&self, col: usize) -> impl Iterator<Item = (PointClass, f32, f32)> + '_ {
        (0..self.rows()).filter_map(move |row| {
            let point = self.point(row, col)?;
            Some((
                self.class(row, col),
                point.y - self.ground,
                self.grid.forward_distance(point),
            ))
        })
    }

    pub fn classes(&self) -> &Array2<PointClass> {
        &self.classes
    }
}
