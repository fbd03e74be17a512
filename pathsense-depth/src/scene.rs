//! Ray-cast synthetic scenes standing in for the depth sensor.
//!
//! A scene is a floor plane plus axis-aligned boxes in world space (Y-up,
//! forward is -Z). Rendering intersects every pixel ray with the scene and
//! writes the camera-space depth; rays that hit nothing get `0.0`, the same
//! invalid sentinel real sensors use.

use crate::frame::{CameraPose, DepthFrame, Intrinsics};
use anyhow::{bail, Result};
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Rays closer to parallel than this never hit a slab or the floor.
const PARALLEL_EPSILON: f32 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Ray parameter of the first hit in front of `origin`, slab method.
    pub fn intersect(&self, origin: &Point3<f32>, direction: &Vector3<f32>) -> Option<f32> {
        let mut t_min = 0.0f32;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let (o, d) = (origin[axis], direction[axis]);
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < PARALLEL_EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let (t1, t2) = ((lo - o) / d, (hi - o) / d);
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SyntheticScene {
    floor: Option<f32>,
    boxes: Vec<Aabb>,
}

impl SyntheticScene {
    /// Infinite floor at world height zero.
    pub fn flat() -> Self {
        Self {
            floor: Some(0.0),
            boxes: Vec::new(),
        }
    }

    /// Nothing in range at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_box(mut self, min: Point3<f32>, max: Point3<f32>) -> Self {
        self.boxes.push(Aabb::new(min, max));
        self
    }

    /// A `width` wide pole whose near face is `distance` ahead, centered at
    /// lateral offset `x`.
    pub fn with_pole(self, x: f32, distance: f32, width: f32) -> Self {
        self.with_box(
            Point3::new(x - width / 2.0, 0.0, -distance - width),
            Point3::new(x + width / 2.0, 2.0, -distance),
        )
    }

    /// A wall spanning the whole view `distance` ahead.
    pub fn with_wall(self, distance: f32) -> Self {
        self.with_box(
            Point3::new(-20.0, 0.0, -distance - 0.2),
            Point3::new(20.0, 3.0, -distance),
        )
    }

    /// A flight of `count` steps going up, the first riser `distance` ahead.
    pub fn with_stairs(mut self, distance: f32, count: usize, rise: f32, run: f32) -> Self {
        for step in 0..count {
            let near = distance + step as f32 * run;
            self = self.with_box(
                Point3::new(-2.0, 0.0, -(near + run)),
                Point3::new(2.0, rise * (step + 1) as f32, -near),
            );
        }
        self
    }

    /// A landing that ends `distance` ahead and drops down `count` steps to
    /// a lower floor. The camera stands on the landing at world height zero.
    pub fn descent(distance: f32, count: usize, rise: f32, run: f32) -> Self {
        let bottom = -rise * count as f32;
        let mut scene = Self {
            floor: Some(bottom),
            boxes: Vec::new(),
        }
        .with_box(
            Point3::new(-20.0, bottom, -distance),
            Point3::new(20.0, 0.0, 5.0),
        );
        for step in 1..count {
            let near = distance + (step - 1) as f32 * run;
            scene = scene.with_box(
                Point3::new(-20.0, bottom, -(near + run)),
                Point3::new(20.0, -rise * step as f32, -near),
            );
        }
        scene
    }

    /// Ray parameter of the nearest hit.
    pub fn cast(&self, origin: &Point3<f32>, direction: &Vector3<f32>) -> Option<f32> {
        let floor = self.floor.and_then(|height| {
            if direction.y.abs() < PARALLEL_EPSILON {
                return None;
            }
            let t = (height - origin.y) / direction.y;
            (t > 0.0).then_some(t)
        });
        self.boxes
            .iter()
            .filter_map(|aabb| aabb.intersect(origin, direction))
            .chain(floor)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Renders a `width × height` depth buffer seen from `pose`.
    ///
    /// Each pixel ray is `(px - cx) / fx, (py - cy) / fy, 1` in camera space,
    /// so the ray parameter of a hit is its camera-space depth.
    pub fn render(
        &self,
        timestamp: f64,
        width: usize,
        height: usize,
        pose: CameraPose,
        intrinsics: Intrinsics,
    ) -> Result<DepthFrame> {
        let origin = pose.position();
        let data = (0..height)
            .into_par_iter()
            .flat_map_iter(|by| {
                (0..width).map(move |bx| {
                    let ray = Vector3::new(
                        (bx as f32 - intrinsics.cx) / intrinsics.fx,
                        (by as f32 - intrinsics.cy) / intrinsics.fy,
                        1.0,
                    );
                    let direction = pose.matrix().transform_vector(&ray);
                    self.cast(&origin, &direction).unwrap_or(0.0)
                })
            })
            .collect::<Vec<_>>();
        DepthFrame::new(timestamp, width, height, data, pose, intrinsics)
    }
}

/// Intrinsics for a portrait buffer whose height axis spans
/// `horizontal_fov_deg`.
pub fn portrait_intrinsics(width: usize, height: usize, horizontal_fov_deg: f32) -> Intrinsics {
    let focal = (height as f32 / 2.0) / (horizontal_fov_deg.to_radians() / 2.0).tan();
    Intrinsics::new(focal, focal, width as f32 / 2.0, height as f32 / 2.0)
}

/// Named demo scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenePreset {
    Empty,
    Flat,
    Pole,
    Wall,
    Stairs,
    StairsDown,
}

impl ScenePreset {
    pub fn build(self) -> SyntheticScene {
        match self {
            ScenePreset::Empty => SyntheticScene::empty(),
            ScenePreset::Flat => SyntheticScene::flat(),
            ScenePreset::Pole => SyntheticScene::flat().with_pole(-0.1, 1.4, 0.2),
            ScenePreset::Wall => SyntheticScene::flat().with_wall(1.2),
            ScenePreset::Stairs => SyntheticScene::flat().with_stairs(1.5, 4, 0.17, 0.3),
            ScenePreset::StairsDown => SyntheticScene::descent(1.5, 3, 0.17, 0.45),
        }
    }
}

impl FromStr for ScenePreset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "empty" => ScenePreset::Empty,
            "flat" => ScenePreset::Flat,
            "pole" => ScenePreset::Pole,
            "wall" => ScenePreset::Wall,
            "stairs" => ScenePreset::Stairs,
            "stairs-down" => ScenePreset::StairsDown,
            other => bail!(
                "unknown scene {other:?}, expected empty, flat, pole, wall, stairs or stairs-down"
            ),
        })
    }
}

impl Display for ScenePreset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScenePreset::Empty => "empty",
            ScenePreset::Flat => "flat",
            ScenePreset::Pole => "pole",
            ScenePreset::Wall => "wall",
            ScenePreset::Stairs => "stairs",
            ScenePreset::StairsDown => "stairs-down",
        };
        write!(f, "{name}")
    }
}
