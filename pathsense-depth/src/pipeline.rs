//! Per-frame hazard analysis, stages 2 to 8.

use crate::analysis::FrameAnalysisResult;
use crate::classify::ClassifiedGrid;
use crate::config::{AnalysisConfig, HeightBands};
use crate::frame::DepthFrame;
use crate::ground::GroundEstimator;
use crate::path::{FreeSpaceMapper, FreeSpaceProfile, PathAnalysis, SafePathFinder};
use crate::projection::WorldProjector;
use crate::stabilize::flags::HazardFlags;
use crate::stabilize::TemporalStabilizer;
use crate::terrain::{SlopeDetector, SlopeSignal, StairDetector, StairSignal};
use log::debug;

/// Everything one frame shows before cross-frame smoothing.
#[derive(Debug, Clone)]
pub struct RawAnalysis {
    pub timestamp: f64,
    pub ground_height: f32,
    pub grid: ClassifiedGrid,
    pub stairs: StairSignal,
    pub slope: SlopeSignal,
    pub free_space: FreeSpaceProfile,
    pub path: PathAnalysis,
}

impl RawAnalysis {
    /// This frame's flags, before hysteresis.
    pub fn flags(&self) -> HazardFlags {
        let exists = self.path.safe_path_exists();
        HazardFlags {
            safe_path_exists: exists,
            safe_path_straight: exists && self.path.straight,
            up_slope: self.slope.up,
            down_slope: self.slope.down,
            up_stairs: self.stairs.up,
            down_stairs: self.stairs.down,
            no_safe_path: !exists,
        }
    }
}

/// Owns every stage of the analysis and the state carried between frames.
pub struct HazardPipeline {
    bands: HeightBands,
    projector: WorldProjector,
    ground: GroundEstimator,
    stairs: StairDetector,
    slope: SlopeDetector,
    free_space: FreeSpaceMapper,
    path: SafePathFinder,
    stabilizer: TemporalStabilizer,
}

impl HazardPipeline {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            bands: config.height.clone(),
            projector: WorldProjector::from_config(&config.grid, &config.distance),
            ground: GroundEstimator::new(config.smoothing.ground_ema_alpha),
            stairs: StairDetector::from_config(&config.terrain),
            slope: SlopeDetector::from_config(&config.terrain),
            free_space: FreeSpaceMapper::from_config(&config.distance),
            path: SafePathFinder::from_config(&config.distance, &config.grid, &config.corridor),
            stabilizer: TemporalStabilizer::new(&config.smoothing, &config.distance),
        }
    }

    pub fn ground_height(&self) -> Option<f32> {
        self.ground.ground_height()
    }

    pub fn stabilizer(&self) -> &TemporalStabilizer {
        &self.stabilizer
    }

    /// Runs projection through corridor search. Advances the ground estimate
    /// but not the stabilizer.
    pub fn analyze_raw(&mut self, frame: &DepthFrame) -> RawAnalysis {
        let points = self.projector.project(frame);
        let ground_height = self.ground.update(&points, frame.pose().height());
        let grid = ClassifiedGrid::classify(points, ground_height, &self.bands);

        let stairs = self.stairs.detect(&grid);
        let slope = self.slope.detect(&grid);
        let free_space = self.free_space.map(&grid);
        let path = self.path.find(&free_space);

        RawAnalysis {
            timestamp: frame.timestamp(),
            ground_height,
            grid,
            stairs,
            slope,
            free_space,
            path,
        }
    }

    pub fn process(&mut self, frame: &DepthFrame) -> FrameAnalysisResult {
        let raw = self.analyze_raw(frame);
        let raw_flags = raw.flags();
        let stabilized = self.stabilizer.update(
            &raw_flags,
            raw.path.steering_angle(),
            raw.path.nearest.map(|nearest| nearest.distance),
        );
        debug!("Raw flags [{raw_flags}], stabilized [{}]", stabilized.flags);

        FrameAnalysisResult {
            timestamp: raw.timestamp,
            flags: stabilized.flags,
            steering_angle: stabilized.steering_angle.unwrap_or(0.0),
            corridor_width: raw
                .path
                .selected
                .as_ref()
                .map_or(0.0, |corridor| corridor.physical_width),
            nearest_distance: stabilized.nearest_distance,
            nearest_angle: raw.path.nearest.map(|nearest| nearest.angle_deg),
            ground_height: raw.ground_height,
            clusters: raw.path.clusters,
        }
    }
}
