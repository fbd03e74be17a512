use approx::assert_abs_diff_eq;
use pathsense_depth::scene::{portrait_intrinsics, ScenePreset, SyntheticScene};
use pathsense_depth::{
    AnalysisConfig, CameraPose, ClusterType, DepthFrame, FrameAnalysisResult, HazardPipeline,
    Intrinsics,
};

const WIDTH: usize = 256;
const HEIGHT: usize = 192;
const CAMERA_HEIGHT: f32 = 1.4;
const PITCH_DEG: f32 = 30.0;

fn pose() -> CameraPose {
    CameraPose::portrait(CAMERA_HEIGHT, PITCH_DEG)
}

fn intrinsics() -> Intrinsics {
    portrait_intrinsics(WIDTH, HEIGHT, 60.0)
}

/// Feeds `frames` identical renders of `preset` 0.2 s apart.
fn run_scene(preset: ScenePreset, frames: usize) -> anyhow::Result<Vec<FrameAnalysisResult>> {
    run(&preset.build(), frames)
}

fn run(scene: &SyntheticScene, frames: usize) -> anyhow::Result<Vec<FrameAnalysisResult>> {
    let mut pipeline = HazardPipeline::new(&AnalysisConfig::default());
    (0..frames)
        .map(|i| {
            let frame = scene.render(i as f64 * 0.2, WIDTH, HEIGHT, pose(), intrinsics())?;
            Ok(pipeline.process(&frame))
        })
        .collect()
}

#[test]
fn uniform_max_range_frame_is_all_invalid() -> anyhow::Result<()> {
    let mut pipeline = HazardPipeline::new(&AnalysisConfig::default());
    let frame = DepthFrame::new(0.0, WIDTH, HEIGHT, vec![5.0; WIDTH * HEIGHT], pose(), intrinsics())?;

    let raw = pipeline.analyze_raw(&frame);
    assert_abs_diff_eq!(raw.ground_height, CAMERA_HEIGHT - 1.2, epsilon = 1e-5);
    assert!(raw.path.clusters.is_empty());
    assert!(raw.path.nearest.is_none());
    assert!(raw.path.straight);
    assert!(!raw.stairs.up && !raw.stairs.down);
    assert_eq!(raw.slope.angle_deg, None);
    Ok(())
}

#[test]
fn empty_scene_settles_on_straight_path() -> anyhow::Result<()> {
    let results = run_scene(ScenePreset::Empty, 6)?;

    // The initial no-safe-path latch takes five frames to release.
    assert!(results[0].flags.no_safe_path);
    assert!(!results[1].flags.safe_path_exists);

    let last = results.last().unwrap();
    assert!(last.flags.safe_path_exists);
    assert!(last.flags.safe_path_straight);
    assert!(!last.flags.no_safe_path);
    assert_eq!(last.nearest_distance, 5.0);
    assert_eq!(last.nearest_angle, None);
    Ok(())
}

#[test]
fn flat_floor_is_clear() -> anyhow::Result<()> {
    let results = run_scene(ScenePreset::Flat, 6)?;
    let last = results.last().unwrap();

    assert_abs_diff_eq!(last.ground_height, 0.0, epsilon = 0.05);
    assert!(last.flags.safe_path_straight);
    assert!(!last.flags.up_slope && !last.flags.down_slope);
    assert!(!last.flags.up_stairs && !last.flags.down_stairs);
    assert_abs_diff_eq!(last.steering_angle, 0.0, epsilon = 1e-3);
    assert!(last.clusters.is_empty());
    Ok(())
}

#[test]
fn pole_ahead_steers_around() -> anyhow::Result<()> {
    let results = run_scene(ScenePreset::Pole, 8)?;
    let last = results.last().unwrap();

    assert!(last.flags.safe_path_exists);
    assert!(!last.flags.safe_path_straight);
    assert!(!last.flags.no_safe_path);
    // The pole sits left of center, so the wider corridor is on the right.
    assert!(last.steering_angle > 5.0, "steering {}", last.steering_angle);

    assert_eq!(last.clusters.len(), 1);
    let pole = &last.clusters[0];
    assert_eq!(pole.kind, ClusterType::Pole);
    assert!(pole.center_angle_deg < 0.0);
    assert!(pole.nearest_distance < 1.6);
    assert!(last.nearest_distance < 2.0);
    assert!(last.nearest_angle.unwrap() < 0.0);
    Ok(())
}

#[test]
fn wall_ahead_blocks_every_column() -> anyhow::Result<()> {
    let results = run_scene(ScenePreset::Wall, 6)?;

    for result in &results {
        assert!(result.flags.no_safe_path);
        assert!(!result.flags.safe_path_exists);
    }
    let last = results.last().unwrap();
    assert_eq!(last.clusters.len(), 1);
    assert_eq!(last.clusters[0].kind, ClusterType::Wall);
    assert_abs_diff_eq!(last.clusters[0].angular_width_deg, 60.0, epsilon = 1e-3);
    assert_eq!(last.corridor_width, 0.0);
    Ok(())
}

#[test]
fn centered_pole_splits_the_view() -> anyhow::Result<()> {
    let results = run(&SyntheticScene::flat().with_pole(0.0, 1.5, 0.3), 8)?;
    let last = results.last().unwrap();

    assert!(last.flags.safe_path_exists);
    assert!(!last.flags.safe_path_straight);
    assert!(!last.flags.no_safe_path);
    // Either side is open, neither is straight ahead.
    assert!(last.steering_angle.abs() > 10.0, "steering {}", last.steering_angle);

    assert_eq!(last.clusters.len(), 1);
    let pole = &last.clusters[0];
    assert_eq!(pole.kind, ClusterType::Pole);
    assert!(pole.center_angle_deg.abs() < 1.0, "center {}", pole.center_angle_deg);
    assert!(pole.nearest_distance < 1.6);
    Ok(())
}

#[test]
fn rising_stairs_latch_after_three_frames() -> anyhow::Result<()> {
    let scene = ScenePreset::Stairs.build();
    let mut pipeline = HazardPipeline::new(&AnalysisConfig::default());
    let frame = scene.render(0.0, WIDTH, HEIGHT, pose(), intrinsics())?;
    let raw = pipeline.analyze_raw(&frame);
    assert!(raw.stairs.up);
    assert!(!raw.stairs.down);

    let results = run_scene(ScenePreset::Stairs, 4)?;
    assert!(!results[0].flags.up_stairs);
    assert!(!results[1].flags.up_stairs);
    assert!(results[2].flags.up_stairs);
    assert!(results[3].flags.up_stairs);
    assert!(!results[3].flags.down_stairs);
    Ok(())
}

#[test]
fn falling_stairs_latch_after_three_frames() -> anyhow::Result<()> {
    let scene = ScenePreset::StairsDown.build();
    let mut pipeline = HazardPipeline::new(&AnalysisConfig::default());
    let frame = scene.render(0.0, WIDTH, HEIGHT, pose(), intrinsics())?;
    let raw = pipeline.analyze_raw(&frame);
    assert!(raw.stairs.down);
    assert!(!raw.stairs.up);

    let results = run_scene(ScenePreset::StairsDown, 4)?;
    assert!(!results[1].flags.down_stairs);
    assert!(results[2].flags.down_stairs);
    assert!(!results[3].flags.up_stairs);
    Ok(())
}
