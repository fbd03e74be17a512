use anyhow::{ensure, Result};
use nalgebra::{
    Isometry3, Matrix3, Matrix4, Point3, Rotation3, Translation3, UnitQuaternion, Vector3,
};
use ndarray::Array2;
use num::Float;

/// Pinhole intrinsics already scaled to the depth buffer resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intrinsics {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
}

impl Intrinsics {
    pub fn new(fx: f32, fy: f32, cx: f32, cy: f32) -> Self {
        Self { fx, fy, cx, cy }
    }

    /// Reads fx, fy, cx, cy from a 3×3 camera matrix.
    pub fn from_matrix(m: &Matrix3<f32>) -> Self {
        Self {
            fx: m[(0, 0)],
            fy: m[(1, 1)],
            cx: m[(0, 2)],
            cy: m[(1, 2)],
        }
    }

    /// Camera-space point for buffer pixel `(px, py)` at depth `depth`.
    #[inline]
    pub fn unproject(&self, px: f32, py: f32, depth: f32) -> Point3<f32> {
        Point3::new(
            (px - self.cx) * depth / self.fx,
            (py - self.cy) * depth / self.fy,
            depth,
        )
    }
}

/// Rigid world←camera transform.
///
/// Camera space follows the buffer: x along the buffer width, y along the
/// buffer height, z along the optical axis. World space is Y-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose(Matrix4<f32>);

impl CameraPose {
    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }

    pub fn from_matrix(matrix: Matrix4<f32>) -> Self {
        Self(matrix)
    }

    /// Pose of a phone held in portrait at `height` meters, looking along
    /// world -Z and pitched down by `pitch_deg`.
    ///
    /// In portrait the buffer width axis points at the floor and the buffer
    /// height axis points to the user's left.
    pub fn portrait(height: f32, pitch_deg: f32) -> Self {
        #[rustfmt::skip]
        let level = Rotation3::from_matrix_unchecked(Matrix3::new(
            0.0, -1.0, 0.0,
            -1.0, 0.0, 0.0,
            0.0, 0.0, -1.0,
        ));
        let tilt = Rotation3::from_axis_angle(&Vector3::x_axis(), -pitch_deg.to_radians());
        let isometry = Isometry3::from_parts(
            Translation3::new(0.0, height, 0.0),
            UnitQuaternion::from_rotation_matrix(&(tilt * level)),
        );
        Self(isometry.to_homogeneous())
    }

    pub fn matrix(&self) -> &Matrix4<f32> {
        &self.0
    }

    pub fn position(&self) -> Point3<f32> {
        Point3::new(self.0[(0, 3)], self.0[(1, 3)], self.0[(2, 3)])
    }

    /// Camera height along world Y.
    pub fn height(&self) -> f32 {
        self.0[(1, 3)]
    }

    #[inline]
    pub fn to_world(&self, camera_point: &Point3<f32>) -> Point3<f32> {
        self.0.transform_point(camera_point)
    }
}

/// A depth sample counts when it is finite and strictly positive.
#[inline]
pub fn is_valid_depth<T: Float>(depth: T) -> bool {
    depth.is_finite() && depth > T::zero()
}

/// One sensor tick: depth buffer, pose and intrinsics.
#[derive(Debug, Clone)]
pub struct DepthFrame {
    timestamp: f64,
    /// Indexed `[[by, bx]]`.
    depth: Array2<f32>,
    pose: CameraPose,
    intrinsics: Intrinsics,
}

impl DepthFrame {
    /// Builds a frame from a row-major buffer of `width * height` samples.
    pub fn new(
        timestamp: f64,
        width: usize,
        height: usize,
        data: Vec<f32>,
        pose: CameraPose,
        intrinsics: Intrinsics,
    ) -> Result<Self> {
        ensure!(
            data.len() == width * height,
            "depth buffer holds {} samples, expected {}x{}",
            data.len(),
            width,
            height
        );
        let depth = Array2::from_shape_vec((height, width), data)?;
        Self::from_array(timestamp, depth, pose, intrinsics)
    }

    pub fn from_array(
        timestamp: f64,
        depth: Array2<f32>,
        pose: CameraPose,
        intrinsics: Intrinsics,
    ) -> Result<Self> {
        ensure!(!depth.is_empty(), "depth buffer is empty");
        ensure!(
            intrinsics.fx > 0.0 && intrinsics.fy > 0.0,
            "focal lengths must be positive, got fx={} fy={}",
            intrinsics.fx,
            intrinsics.fy
        );
        Ok(Self {
            timestamp,
            depth,
            pose,
            intrinsics,
        })
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn width(&self) -> usize {
        self.depth.ncols()
    }

    pub fn height(&self) -> usize {
        self.depth.nrows()
    }

    pub fn depth(&self) -> &Array2<f32> {
        &self.depth
    }

    /// Raw sample at buffer coordinates, `None` outside the buffer.
    #[inline]
    pub fn sample(&self, bx: usize, by: usize) -> Option<f32> {
        self.depth.get((by, bx)).copied()
    }

    pub fn pose(&self) -> &CameraPose {
        &self.pose
    }

    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }
}
