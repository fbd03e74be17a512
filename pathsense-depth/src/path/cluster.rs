use super::free_space::BlockingSample;
use crate::analysis::ClusterType;
use crate::classify::PointClass;
use hashbrown::HashMap;

/// Blocking-class tally of one unsafe run.
#[derive(Debug, Default)]
pub(crate) struct ClassTally(HashMap<PointClass, usize>);

impl ClassTally {
    /// Counts the samples closer than `within`.
    pub(crate) fn collect<'a>(
        samples: impl IntoIterator<Item = &'a BlockingSample>,
        within: f32,
    ) -> Self {
        let mut counts = HashMap::new();
        for sample in samples {
            if sample.distance < within {
                *counts.entry(sample.class).or_insert(0) += 1;
            }
        }
        Self(counts)
    }

    fn count(&self, class: PointClass) -> usize {
        self.0.get(&class).copied().unwrap_or(0)
    }

    /// Types the run. Drops win ties over tall obstacles, tall obstacles win
    /// ties over low ones.
    pub(crate) fn cluster_type(
        &self,
        angular_width_deg: f32,
        pole_max_angular_width_deg: f32,
        trip_hazard_max_points: usize,
    ) -> ClusterType {
        let drop = self.count(PointClass::DropSevere);
        let tall = self.count(PointClass::ObstacleMid) + self.count(PointClass::ObstacleHigh);
        let low = self.count(PointClass::ObstacleLow);

        if drop + tall + low == 0 {
            ClusterType::LowObstacle
        } else if drop >= tall && drop >= low {
            ClusterType::DropOff
        } else if tall >= low {
            if angular_width_deg <= pole_max_angular_width_deg {
                ClusterType::Pole
            } else {
                ClusterType::Wall
            }
        } else if low < trip_hazard_max_points {
            ClusterType::TripHazard
        } else {
            ClusterType::LowObstacle
        }
    }
}
