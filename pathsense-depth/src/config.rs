//! Analysis configuration.
//!
//! Every threshold the pipeline reads lives here. A configuration is fixed for
//! the lifetime of a session; load it once, validate it, then hand it to the
//! pipeline. All fields have defaults so a TOML file only needs the values it
//! overrides.

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top level configuration, one section per concern.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub distance: DistanceConfig,
    pub grid: GridConfig,
    pub height: HeightBands,
    pub terrain: TerrainConfig,
    pub corridor: CorridorConfig,
    pub smoothing: SmoothingConfig,
    pub haptic: HapticConfig,
    pub timing: TimingConfig,
}

/// Distance bands in meters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceConfig {
    /// Below this a grid cell is extreme danger.
    pub danger_close: f32,
    pub danger: f32,
    /// Upper bound of the caution zone, also where haptic proximity starts.
    pub caution: f32,
    /// A column is safe when its free distance reaches this value.
    pub min_safe_distance: f32,
    /// Samples at or beyond this range are dropped before projection.
    pub max_analysis_range: f32,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            danger_close: 0.5,
            danger: 1.0,
            caution: 2.0,
            min_safe_distance: 2.0,
            max_analysis_range: 5.0,
        }
    }
}

/// Sampling geometry for the display grid and the analysis grid.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub display_rows: usize,
    pub display_cols: usize,
    pub analysis_rows: usize,
    /// Number of angular columns.
    pub analysis_cols: usize,
    /// Fraction of the buffer width axis in use. The remainder looks at the
    /// user's feet and is skipped.
    pub forward_crop_ratio: f32,
    /// Neighbouring display columns differing by more than this mark an
    /// obstacle edge (meters).
    pub h_gradient_threshold: f32,
    /// Neighbouring display rows differing by more than this mark a terrain
    /// discontinuity (meters).
    pub v_gradient_threshold: f32,
    /// Field of view spanned by the analysis columns.
    pub horizontal_fov_deg: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            display_rows: 16,
            display_cols: 16,
            analysis_rows: 64,
            analysis_cols: 48,
            forward_crop_ratio: 0.75,
            h_gradient_threshold: 1.0,
            v_gradient_threshold: 0.5,
            horizontal_fov_deg: 60.0,
        }
    }
}

impl GridConfig {
    pub fn degrees_per_column(&self) -> f32 {
        self.horizontal_fov_deg / self.analysis_cols as f32
    }
}

/// Height-above-ground bands used by the point classifier (meters).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightBands {
    pub ground_tolerance: f32,
    pub trip_hazard_max: f32,
    pub obstacle_low_max: f32,
    pub obstacle_mid_max: f32,
    /// Depth below ground where a mild drop starts.
    pub drop_mild_depth: f32,
    /// Depth below ground where a severe drop starts.
    pub drop_severe_depth: f32,
}

impl Default for HeightBands {
    fn default() -> Self {
        Self {
            ground_tolerance: 0.05,
            trip_hazard_max: 0.15,
            obstacle_low_max: 0.5,
            obstacle_mid_max: 1.2,
            drop_mild_depth: 0.05,
            drop_severe_depth: 0.25,
        }
    }
}

/// Stair and slope detection.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub stair_band_half_width: usize,
    pub stair_step_min: f32,
    pub stair_step_max: f32,
    /// Samples closer than this to the start of the current tread are
    /// treated as part of it and never open a new one.
    pub stair_min_separation: f32,
    pub stair_min_steps: usize,
    pub slope_band_half_width: usize,
    pub slope_min_points: usize,
    pub slope_angle_threshold_deg: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            stair_band_half_width: 10,
            stair_step_min: 0.10,
            stair_step_max: 0.25,
            stair_min_separation: 0.15,
            stair_min_steps: 2,
            slope_band_half_width: 5,
            slope_min_points: 10,
            slope_angle_threshold_deg: 3.0,
        }
    }
}

/// Corridor search and obstacle cluster typing.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CorridorConfig {
    /// Roughly shoulder width.
    pub min_passable_width: f32,
    pub pole_max_angular_width_deg: f32,
    /// Low clusters with fewer blocking samples than this are trip hazards.
    pub trip_hazard_max_points: usize,
}

impl Default for CorridorConfig {
    fn default() -> Self {
        Self {
            min_passable_width: 0.6,
            pole_max_angular_width_deg: 20.0,
            trip_hazard_max_points: 6,
        }
    }
}

/// Cross-frame smoothing: EMA coefficients and flag hysteresis.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub ground_ema_alpha: f32,
    pub angle_ema_alpha: f32,
    /// Used while the nearest obstacle gets closer.
    pub distance_ema_approach: f32,
    /// Used while the nearest obstacle recedes.
    pub distance_ema_release: f32,
    pub hysteresis_on_frames: u32,
    pub hysteresis_off_frames: u32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            ground_ema_alpha: 0.1,
            angle_ema_alpha: 0.3,
            distance_ema_approach: 0.6,
            distance_ema_release: 0.2,
            hysteresis_on_frames: 3,
            hysteresis_off_frames: 5,
        }
    }
}

/// Wire format handed to the actuator link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketFormat {
    /// Two bytes: direction code and magnitude.
    Direction,
    /// Three bytes: left, front, right intensity.
    Intensities,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HapticConfig {
    pub ema_alpha: f32,
    /// Steering angle mapped to a full side channel.
    pub full_side_angle_deg: f32,
    pub stairs_front_floor: u8,
    pub slope_front_floor: u8,
    /// Steering angles within this band produce no direction cue.
    pub steering_deadband_deg: f32,
    pub packet: PacketFormat,
}

impl Default for HapticConfig {
    fn default() -> Self {
        Self {
            ema_alpha: 0.5,
            full_side_angle_deg: 45.0,
            stairs_front_floor: 200,
            slope_front_floor: 120,
            steering_deadband_deg: 5.0,
            packet: PacketFormat::Direction,
        }
    }
}

/// Cadences in seconds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub analysis_interval: f64,
    pub log_interval: f64,
    pub command_interval: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            analysis_interval: 0.2, // 5 Hz
            log_interval: 0.5,
            command_interval: 0.2,
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("loading {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the relations the pipeline relies on. Catching these at startup
    /// keeps every per-frame stage infallible.
    pub fn validate(&self) -> Result<()> {
        let d = &self.distance;
        ensure!(
            0.0 < d.danger_close && d.danger_close < d.danger && d.danger < d.caution,
            "distance bands must satisfy 0 < danger_close < danger < caution"
        );
        ensure!(
            d.min_safe_distance > 0.0 && d.min_safe_distance <= d.max_analysis_range,
            "min_safe_distance must be positive and within max_analysis_range"
        );

        let g = &self.grid;
        ensure!(
            g.display_rows > 0 && g.display_cols > 0 && g.analysis_rows > 0 && g.analysis_cols > 0,
            "grid sizes must be non-zero"
        );
        ensure!(
            g.forward_crop_ratio > 0.0 && g.forward_crop_ratio <= 1.0,
            "forward_crop_ratio must be in (0, 1]"
        );
        ensure!(
            g.horizontal_fov_deg > 0.0 && g.horizontal_fov_deg < 180.0,
            "horizontal_fov_deg must be in (0, 180)"
        );

        let h = &self.height;
        ensure!(
            0.0 < h.drop_mild_depth && h.drop_mild_depth <= h.drop_severe_depth,
            "drop depths must satisfy 0 < drop_mild_depth <= drop_severe_depth"
        );
        ensure!(
            0.0 <= h.ground_tolerance
                && h.ground_tolerance < h.trip_hazard_max
                && h.trip_hazard_max < h.obstacle_low_max
                && h.obstacle_low_max < h.obstacle_mid_max,
            "height bands must satisfy 0 <= ground_tolerance < trip_hazard_max < obstacle_low_max < obstacle_mid_max"
        );

        let t = &self.terrain;
        ensure!(
            0.0 < t.stair_step_min && t.stair_step_min <= t.stair_step_max,
            "stair step band must satisfy 0 < stair_step_min <= stair_step_max"
        );
        ensure!(t.stair_min_steps > 0, "stair_min_steps must be positive");
        ensure!(t.slope_min_points >= 2, "slope_min_points must be at least 2");

        ensure!(
            self.corridor.min_passable_width > 0.0,
            "min_passable_width must be positive"
        );

        let s = &self.smoothing;
        for (name, alpha) in [
            ("ground_ema_alpha", s.ground_ema_alpha),
            ("angle_ema_alpha", s.angle_ema_alpha),
            ("distance_ema_approach", s.distance_ema_approach),
            ("distance_ema_release", s.distance_ema_release),
            ("haptic.ema_alpha", self.haptic.ema_alpha),
        ] {
            ensure!(alpha > 0.0 && alpha <= 1.0, "{name} must be in (0, 1]");
        }
        ensure!(
            s.distance_ema_approach >= s.distance_ema_release,
            "distance_ema_approach must not be slower than distance_ema_release"
        );
        ensure!(
            s.hysteresis_on_frames > 0 && s.hysteresis_off_frames > s.hysteresis_on_frames,
            "hysteresis must satisfy 0 < on_frames < off_frames"
        );

        ensure!(
            self.haptic.full_side_angle_deg > 0.0,
            "full_side_angle_deg must be positive"
        );

        let timing = &self.timing;
        ensure!(
            timing.analysis_interval >= 0.0
                && timing.log_interval >= 0.0
                && timing.command_interval >= 0.0,
            "intervals must not be negative"
        );
        Ok(())
    }
}
