//! Depth-frame hazard analysis for a walking aid.
//!
//! A [`DepthFrame`] goes through projection, ground estimation,
//! classification, terrain scans and corridor search, then through the
//! [`TemporalStabilizer`](stabilize::TemporalStabilizer) which turns noisy
//! per-frame observations into steady flags. [`HazardPipeline`] wires the
//! stages together; [`GridSummarizer`] produces the coarse display grid
//! alongside.

pub mod analysis;
pub mod classify;
pub mod config;
pub mod frame;
pub mod grid;
pub mod ground;
pub mod path;
pub mod pipeline;
pub mod projection;
pub mod scene;
pub mod stabilize;
pub mod terrain;
pub mod timing;

#[cfg(test)]
mod testing;

pub use analysis::{ClusterType, FrameAnalysisResult, ObstacleCluster};
pub use config::AnalysisConfig;
pub use frame::{CameraPose, DepthFrame, Intrinsics};
pub use grid::{DepthGrid, GridSummarizer};
pub use pipeline::{HazardPipeline, RawAnalysis};
pub use stabilize::flags::{HazardFlag, HazardFlags};
pub use timing::IntervalGate;
