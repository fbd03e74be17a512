use super::central_band;
use crate::classify::ClassifiedGrid;
use crate::config::TerrainConfig;
use log::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StairSignal {
    pub up: bool,
    pub down: bool,
}

/// Looks for repeated step-sized height changes along the walking direction.
#[derive(Debug, Clone)]
pub struct StairDetector {
    band_half_width: usize,
    step_min: f32,
    step_max: f32,
    min_separation: f32,
    min_steps: usize,
}

impl StairDetector {
    pub fn from_config(config: &TerrainConfig) -> Self {
        Self {
            band_half_width: config.stair_band_half_width,
            step_min: config.stair_step_min,
            step_max: config.stair_step_max,
            min_separation: config.stair_min_separation,
            min_steps: config.stair_min_steps,
        }
    }

    pub fn detect(&self, grid: &ClassifiedGrid) -> StairSignal {
        let mut signal = StairSignal::default();

        for col in central_band(grid.cols(), self.band_half_width) {
            let (rises, falls) = self.count_steps(grid, col);
            if rises >= self.min_steps {
                debug!("Column {col}: {rises} rising steps");
                signal.up = true;
            }
            if falls >= self.min_steps {
                debug!("Column {col}: {falls} falling steps");
                signal.down = true;
            }
        }
        signal
    }

    /// Walks a column's walkable samples by forward distance and splits
    /// them into treads. A tread is the run of samples whose height stays
    /// within `step_min` of its mean; a sample that leaves it by up to
    /// `step_max` counts as one rise or fall and opens the next tread.
    /// Larger jumps open a tread without counting.
    fn count_steps(&self, grid: &ClassifiedGrid, col: usize) -> (usize, usize) {
        let mut samples = grid
            .column(col)
            .filter(|(class, _, _)| class.is_walkable_surface())
            .map(|(_, height, distance)| (height, distance))
            .collect::<Vec<_>>();
        samples.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut samples = samples.into_iter();
        let Some((first_height, first_distance)) = samples.next() else {
            return (0, 0);
        };
        let mut tread_start = first_distance;
        let mut tread_sum = first_height;
        let mut tread_len = 1usize;

        let (mut rises, mut falls) = (0, 0);
        for (height, distance) in samples {
            // Too close to the tread edge to tell a riser from its nosing.
            if distance - tread_start <= self.min_separation {
                continue;
            }
            let delta = height - tread_sum / tread_len as f32;
            if delta.abs() < self.step_min {
                tread_sum += height;
                tread_len += 1;
                continue;
            }
            if delta.abs() <= self.step_max {
                if delta > 0.0 {
                    rises += 1;
                } else {
                    falls += 1;
                }
            }
            tread_start = distance;
            tread_sum = height;
            tread_len = 1;
        }
        (rises, falls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::classified_grid;

    const STEP: f32 = 0.17;

    fn detector() -> StairDetector {
        StairDetector::from_config(&TerrainConfig::default())
    }

    #[test]
    fn ascending_treads_flag_up_stairs() {
        let grid = classified_grid(3, 48, |row, col| {
            (col == 24).then(|| (1.0 + row as f32 * 0.3, row as f32 * STEP))
        });
        assert_eq!(
            detector().detect(&grid),
            StairSignal {
                up: true,
                down: false
            }
        );
    }

    #[test]
    fn descending_treads_flag_down_stairs() {
        let grid = classified_grid(3, 48, |row, col| {
            (col == 20).then(|| (1.0 + row as f32 * 0.3, (2 - row) as f32 * STEP))
        });
        assert_eq!(
            detector().detect(&grid),
            StairSignal {
                up: false,
                down: true
            }
        );
    }

    #[test]
    fn opposite_columns_report_both_directions() {
        let grid = classified_grid(3, 48, |row, col| match col {
            18 => Some((1.0 + row as f32 * 0.3, row as f32 * STEP)),
            30 => Some((1.0 + row as f32 * 0.3, (2 - row) as f32 * STEP)),
            _ => None,
        });
        let signal = detector().detect(&grid);
        assert!(signal.up && signal.down);
    }

    #[test]
    fn flat_ground_has_no_stairs() {
        let grid = classified_grid(20, 48, |row, _| Some((1.0 + row as f32 * 0.2, 0.0)));
        assert_eq!(detector().detect(&grid), StairSignal::default());
    }

    #[test]
    fn closely_spaced_samples_are_ignored() {
        let grid = classified_grid(3, 48, |row, col| {
            (col == 24).then(|| (1.0 + row as f32 * 0.05, row as f32 * STEP))
        });
        assert_eq!(detector().detect(&grid), StairSignal::default());
    }

    #[test]
    fn densely_sampled_treads_count_once_each() {
        // Six samples per tread, 4 cm apart.
        let grid = classified_grid(18, 48, |row, col| {
            (col == 24).then(|| (1.0 + row as f32 * 0.04, (row / 6) as f32 * STEP))
        });
        assert_eq!(
            detector().detect(&grid),
            StairSignal {
                up: true,
                down: false
            }
        );
    }

    #[test]
    fn gentle_ramp_is_not_a_staircase() {
        let grid = classified_grid(24, 48, |row, col| {
            (col == 24).then(|| (1.0 + row as f32 * 0.1, row as f32 * 0.012))
        });
        assert_eq!(detector().detect(&grid), StairSignal::default());
    }

    #[test]
    fn columns_outside_band_are_ignored() {
        let grid = classified_grid(3, 48, |row, col| {
            (col == 2).then(|| (1.0 + row as f32 * 0.3, row as f32 * STEP))
        });
        assert_eq!(detector().detect(&grid), StairSignal::default());
    }
}
