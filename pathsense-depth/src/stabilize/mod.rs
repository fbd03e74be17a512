//! Cross-frame smoothing of the raw per-frame analysis.
//!
//! Flags go through a symmetric counter with asymmetric thresholds: a flag
//! needs `on_frames` consecutive raw positives to latch and `off_frames`
//! consecutive raw negatives to release. Steering angle and nearest distance
//! are exponentially smoothed.

#[macro_use]
mod flag_macro;
pub mod flags;

use crate::config::{DistanceConfig, SmoothingConfig};
use flags::{HazardFlag, HazardFlags, HazardLatches};
use log::debug;

/// Hysteresis state of a single flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagLatch {
    counter: i32,
    latched: bool,
}

impl FlagLatch {
    pub fn new(latched: bool) -> Self {
        Self {
            counter: 0,
            latched,
        }
    }

    pub fn latched(&self) -> bool {
        self.latched
    }

    pub fn counter(&self) -> i32 {
        self.counter
    }

    /// Feeds one raw observation and returns the latched value.
    pub fn update(&mut self, raw: bool, on_frames: i32, off_frames: i32) -> bool {
        if raw {
            self.counter = (self.counter.max(0) + 1).min(on_frames);
            if self.counter >= on_frames {
                self.latched = true;
            }
        } else {
            self.counter = (self.counter.min(0) - 1).max(-off_frames);
            if self.counter <= -off_frames {
                self.latched = false;
            }
        }
        self.latched
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilizedOutput {
    pub flags: HazardFlags,
    /// `None` until the first corridor has been seen.
    pub steering_angle: Option<f32>,
    pub nearest_distance: f32,
}

#[derive(Debug, Clone)]
pub struct TemporalStabilizer {
    on_frames: i32,
    off_frames: i32,
    angle_alpha: f32,
    approach_alpha: f32,
    release_alpha: f32,
    max_range: f32,
    latches: HazardLatches,
    steering_angle: Option<f32>,
    nearest_distance: Option<f32>,
}

impl TemporalStabilizer {
    pub fn new(smoothing: &SmoothingConfig, distance: &DistanceConfig) -> Self {
        Self {
            on_frames: smoothing.hysteresis_on_frames as i32,
            off_frames: smoothing.hysteresis_off_frames as i32,
            angle_alpha: smoothing.angle_ema_alpha,
            approach_alpha: smoothing.distance_ema_approach,
            release_alpha: smoothing.distance_ema_release,
            max_range: distance.max_analysis_range,
            latches: HazardLatches::new(),
            steering_angle: None,
            nearest_distance: None,
        }
    }

    pub fn latch(&self, flag: HazardFlag) -> &FlagLatch {
        self.latches.get(flag)
    }

    /// Current latched flags without feeding a new observation.
    pub fn flags(&self) -> HazardFlags {
        self.latches.latched()
    }

    /// Feeds one frame's raw flags, steering angle and nearest distance.
    ///
    /// A frame without a corridor leaves the steering angle untouched. A frame
    /// without a blocked column counts as an obstacle at the analysis range.
    pub fn update(
        &mut self,
        raw: &HazardFlags,
        steering_angle: Option<f32>,
        nearest_distance: Option<f32>,
    ) -> StabilizedOutput {
        for flag in HazardFlag::ALL {
            let latch = self.latches.get_mut(*flag);
            let before = latch.latched();
            let after = latch.update(raw.get(*flag), self.on_frames, self.off_frames);
            if before != after {
                debug!("Flag {flag} latched {after}");
            }
        }
        let flags = self.latches.latched();

        if let Some(angle) = steering_angle {
            self.steering_angle = Some(match self.steering_angle {
                Some(previous) => previous + self.angle_alpha * (angle - previous),
                None => angle,
            });
        }

        let distance = nearest_distance.unwrap_or(self.max_range);
        let smoothed = match self.nearest_distance {
            Some(previous) => {
                let alpha = if distance < previous {
                    self.approach_alpha
                } else {
                    self.release_alpha
                };
                previous + alpha * (distance - previous)
            }
            None => distance,
        };
        self.nearest_distance = Some(smoothed);

        StabilizedOutput {
            flags,
            steering_angle: self.steering_angle,
            nearest_distance: smoothed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn stabilizer() -> TemporalStabilizer {
        TemporalStabilizer::new(&SmoothingConfig::default(), &DistanceConfig::default())
    }

    fn raw_with(flag: HazardFlag, value: bool) -> HazardFlags {
        let mut raw = HazardFlags::cleared();
        raw.set(flag, value);
        raw
    }

    #[test]
    fn latch_needs_consecutive_frames() {
        let mut latch = FlagLatch::new(false);
        assert!(!latch.update(true, 3, 5));
        assert!(!latch.update(true, 3, 5));
        assert!(latch.update(true, 3, 5));
        assert_eq!(latch.counter(), 3);

        for _ in 0..4 {
            assert!(latch.update(false, 3, 5));
        }
        assert!(!latch.update(false, 3, 5));
        assert_eq!(latch.counter(), -5);
    }

    #[test]
    fn interrupted_run_restarts_counter() {
        let mut latch = FlagLatch::new(false);
        latch.update(true, 3, 5);
        latch.update(true, 3, 5);
        latch.update(false, 3, 5);
        assert_eq!(latch.counter(), -1);
        latch.update(true, 3, 5);
        latch.update(true, 3, 5);
        assert!(!latch.latched());
        assert!(latch.update(true, 3, 5));
    }

    #[test]
    fn counter_stays_within_bounds() {
        let mut latch = FlagLatch::new(false);
        let pattern = [true, true, false, true, true, true, true, false, false];
        for step in 0..500 {
            latch.update(pattern[step % pattern.len()] ^ (step % 7 == 0), 3, 5);
            assert!((-5..=3).contains(&latch.counter()));
        }
    }

    #[test]
    fn starts_with_no_safe_path() {
        let stabilizer = stabilizer();
        assert_eq!(stabilizer.flags(), HazardFlags::default());
        assert!(stabilizer.flags().no_safe_path);
        assert!(stabilizer.latch(HazardFlag::NoSafePath).latched());
    }

    #[test]
    fn each_flag_updates_only_its_own_latch() {
        let mut stabilizer = stabilizer();
        let slope = raw_with(HazardFlag::UpSlope, true);
        stabilizer.update(&slope, None, None);
        stabilizer.update(&slope, None, None);

        assert_eq!(stabilizer.latch(HazardFlag::UpSlope).counter(), 2);
        assert_eq!(stabilizer.latch(HazardFlag::DownSlope).counter(), -2);
        assert_eq!(stabilizer.latch(HazardFlag::NoSafePath).counter(), -2);

        let output = stabilizer.update(&slope, None, None);
        assert_eq!(output.flags, stabilizer.flags());
        assert!(output.flags.up_slope);
        assert!(!output.flags.down_slope);
        assert!(output.flags.no_safe_path);
    }

    #[test]
    fn flags_latch_after_on_frames_and_release_after_off_frames() {
        let mut stabilizer = stabilizer();
        let stairs = raw_with(HazardFlag::UpStairs, true);
        let clear = HazardFlags::cleared();

        assert!(!stabilizer.update(&stairs, None, None).flags.up_stairs);
        assert!(!stabilizer.update(&stairs, None, None).flags.up_stairs);
        assert!(stabilizer.update(&stairs, None, None).flags.up_stairs);

        for _ in 0..4 {
            assert!(stabilizer.update(&clear, None, None).flags.up_stairs);
        }
        let output = stabilizer.update(&clear, None, None);
        assert!(!output.flags.up_stairs);
        // no_safe_path was never raised and has been released by now.
        assert!(!output.flags.no_safe_path);
    }

    #[test]
    fn single_frame_flicker_is_suppressed() {
        let mut stabilizer = stabilizer();
        let raised = raw_with(HazardFlag::DownSlope, true);
        let clear = HazardFlags::cleared();
        for frame in 0..20 {
            let raw = if frame % 2 == 0 { &raised } else { &clear };
            assert!(!stabilizer.update(raw, None, None).flags.down_slope);
        }
    }

    #[test]
    fn steering_angle_initializes_then_smooths() {
        let mut stabilizer = stabilizer();
        let clear = HazardFlags::cleared();
        assert_eq!(stabilizer.update(&clear, None, None).steering_angle, None);
        assert_eq!(stabilizer.update(&clear, Some(20.0), None).steering_angle, Some(20.0));

        let smoothed = stabilizer.update(&clear, Some(10.0), None).steering_angle.unwrap();
        assert_abs_diff_eq!(smoothed, 17.0, epsilon = 1e-5);
        // No corridor: angle held.
        assert_eq!(stabilizer.update(&clear, None, None).steering_angle, Some(smoothed));
    }

    #[test]
    fn distance_approaches_faster_than_it_releases() {
        let mut stabilizer = stabilizer();
        let clear = HazardFlags::cleared();
        assert_eq!(stabilizer.update(&clear, None, None).nearest_distance, 5.0);

        let closer = stabilizer.update(&clear, None, Some(1.0)).nearest_distance;
        assert_abs_diff_eq!(closer, 5.0 - 0.6 * 4.0, epsilon = 1e-5);

        let farther = stabilizer.update(&clear, None, None).nearest_distance;
        assert_abs_diff_eq!(farther, closer + 0.2 * (5.0 - closer), epsilon = 1e-5);
    }
}
