use super::cluster::ClassTally;
use super::free_space::FreeSpaceProfile;
use super::{chord_width, column_angle, runs};
use crate::analysis::ObstacleCluster;
use crate::config::{CorridorConfig, DistanceConfig, GridConfig};
use log::debug;
use std::cmp::Ordering;

/// A maximal run of safe columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Corridor {
    pub first_col: usize,
    pub last_col: usize,
    pub angular_width_deg: f32,
    pub center_angle_deg: f32,
    pub min_free_distance: f32,
    /// Chord width at the corridor's nearest free distance (meters).
    pub physical_width: f32,
}

impl Corridor {
    fn spans(&self, col: f32) -> bool {
        self.first_col as f32 <= col && col <= self.last_col as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestObstacle {
    pub distance: f32,
    pub angle_deg: f32,
}

/// Corridor search result for one frame, before stabilization.
#[derive(Debug, Clone, Default)]
pub struct PathAnalysis {
    /// Every safe run, passable or not, left to right.
    pub corridors: Vec<Corridor>,
    pub selected: Option<Corridor>,
    /// The selected corridor contains the forward direction.
    pub straight: bool,
    pub clusters: Vec<ObstacleCluster>,
    pub nearest: Option<NearestObstacle>,
}

impl PathAnalysis {
    pub fn safe_path_exists(&self) -> bool {
        self.selected.is_some()
    }

    pub fn steering_angle(&self) -> Option<f32> {
        self.selected.as_ref().map(|c| c.center_angle_deg)
    }
}

#[derive(Debug, Clone)]
pub struct SafePathFinder {
    min_safe_distance: f32,
    min_passable_width: f32,
    horizontal_fov_deg: f32,
    pole_max_angular_width_deg: f32,
    trip_hazard_max_points: usize,
}

impl SafePathFinder {
    pub fn from_config(
        distance: &DistanceConfig,
        grid: &GridConfig,
        corridor: &CorridorConfig,
    ) -> Self {
        Self {
            min_safe_distance: distance.min_safe_distance,
            min_passable_width: corridor.min_passable_width,
            horizontal_fov_deg: grid.horizontal_fov_deg,
            pole_max_angular_width_deg: corridor.pole_max_angular_width_deg,
            trip_hazard_max_points: corridor.trip_hazard_max_points,
        }
    }

    pub fn find(&self, profile: &FreeSpaceProfile) -> PathAnalysis {
        let cols = profile.len();
        if cols == 0 {
            return PathAnalysis::default();
        }
        let degrees_per_column = self.horizontal_fov_deg / cols as f32;
        let is_safe = |col: usize| profile[col].free_distance >= self.min_safe_distance;

        let corridors = runs(cols, is_safe)
            .into_iter()
            .map(|run| {
                let min_free_distance = profile[run.clone()]
                    .iter()
                    .map(|column| column.free_distance)
                    .fold(f32::INFINITY, f32::min);
                let angular_width_deg = run.clone().count() as f32 * degrees_per_column;
                Corridor {
                    first_col: *run.start(),
                    last_col: *run.end(),
                    angular_width_deg,
                    center_angle_deg: self.run_center_angle(*run.start(), *run.end(), cols),
                    min_free_distance,
                    physical_width: chord_width(min_free_distance, angular_width_deg),
                }
            })
            .collect::<Vec<_>>();

        let (selected, straight) = self.select(&corridors, cols);
        if let Some(corridor) = &selected {
            debug!(
                "Selected corridor {}..={} at {:+.1}° ({:.2} m wide, straight: {straight})",
                corridor.first_col, corridor.last_col, corridor.center_angle_deg, corridor.physical_width
            );
        }

        let clusters = runs(cols, |col| !is_safe(col))
            .into_iter()
            .map(|run| {
                let nearest_distance = profile[run.clone()]
                    .iter()
                    .map(|column| column.free_distance)
                    .fold(f32::INFINITY, f32::min);
                let angular_width_deg = run.clone().count() as f32 * degrees_per_column;
                let tally = ClassTally::collect(
                    profile[run.clone()].iter().flat_map(|column| column.blocking.iter()),
                    self.min_safe_distance,
                );
                ObstacleCluster {
                    center_angle_deg: self.run_center_angle(*run.start(), *run.end(), cols),
                    nearest_distance,
                    angular_width_deg,
                    physical_width: chord_width(nearest_distance, angular_width_deg),
                    kind: tally.cluster_type(
                        angular_width_deg,
                        self.pole_max_angular_width_deg,
                        self.trip_hazard_max_points,
                    ),
                }
            })
            .collect();

        let nearest = profile
            .iter()
            .enumerate()
            .filter(|(_, column)| column.is_blocked())
            .min_by(|(_, a), (_, b)| a.free_distance.total_cmp(&b.free_distance))
            .map(|(col, column)| NearestObstacle {
                distance: column.free_distance,
                angle_deg: column_angle(col, cols, self.horizontal_fov_deg),
            });

        PathAnalysis {
            corridors,
            selected,
            straight,
            clusters,
            nearest,
        }
    }

    /// Picks the widest passable corridor through the forward direction, or
    /// failing that the widest passable corridor closest to forward.
    fn select(&self, corridors: &[Corridor], cols: usize) -> (Option<Corridor>, bool) {
        let center = (cols - 1) as f32 / 2.0;
        let passable = corridors
            .iter()
            .filter(|c| c.physical_width >= self.min_passable_width)
            .collect::<Vec<_>>();

        let forward = passable
            .iter()
            .filter(|c| c.spans(center))
            .max_by(|a, b| a.physical_width.total_cmp(&b.physical_width));
        if let Some(corridor) = forward {
            return (Some((*corridor).clone()), true);
        }

        let best = passable.iter().max_by(|a, b| {
            match a.physical_width.total_cmp(&b.physical_width) {
                // Equal widths: the one nearer to forward wins.
                Ordering::Equal => b
                    .center_angle_deg
                    .abs()
                    .total_cmp(&a.center_angle_deg.abs()),
                ordering => ordering,
            }
        });
        (best.map(|corridor| (*corridor).clone()), false)
    }

    fn run_center_angle(&self, first: usize, last: usize, cols: usize) -> f32 {
        (column_angle(first, cols, self.horizontal_fov_deg)
            + column_angle(last, cols, self.horizontal_fov_deg))
            / 2.0
    }
}
