//! Eye-space frustum corner rays.
//!
//! The raymarch shader reconstructs a per-pixel view ray by blending four
//! corner rays. Row order is part of the shader contract: top-left,
//! top-right, bottom-right, bottom-left.

use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::camera::{validate_intrinsics, CameraIntrinsics};
use crate::error::EffectError;

/// One corner of the view plane, numbered as the shader indexes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft = 0,
    TopRight = 1,
    BottomRight = 2,
    BottomLeft = 3,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Screen-space position of the corner with the origin at bottom-left.
    pub const fn screen_position(self) -> [f32; 2] {
        match self {
            Corner::TopLeft => [0.0, 1.0],
            Corner::TopRight => [1.0, 1.0],
            Corner::BottomRight => [1.0, 0.0],
            Corner::BottomLeft => [0.0, 0.0],
        }
    }
}

/// Four eye-space rays through the corners of the view plane at unit
/// forward distance. Rays are not normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrustumCornerMatrix {
    rows: [Vec3; 4],
}

impl FrustumCornerMatrix {
    /// Solves the corner rays for a camera snapshot. Only the field of view
    /// and aspect ratio participate; the camera pose is ignored.
    pub fn from_camera(camera: &CameraIntrinsics) -> Result<Self, EffectError> {
        frustum_corners(camera.fov_degrees, camera.aspect)
    }

    pub fn row(&self, corner: Corner) -> Vec3 {
        self.rows[corner.index()]
    }

    pub fn rows(&self) -> &[Vec3; 4] {
        &self.rows
    }

    /// Packs the rays as matrix rows (w = 0) for upload as a `mat4` uniform.
    pub fn to_mat4(&self) -> Mat4 {
        let [r0, r1, r2, r3] = self.rows;
        Mat4::from_cols(
            Vec4::new(r0.x, r1.x, r2.x, r3.x),
            Vec4::new(r0.y, r1.y, r2.y, r3.y),
            Vec4::new(r0.z, r1.z, r2.z, r3.z),
            Vec4::ZERO,
        )
    }

    /// Bilinear blend of the corner rays at screen coordinate `uv`, with
    /// `v = 0` at the bottom edge.
    ///
    /// This is the reconstruction the shader has to perform. Interpolating the
    /// corner index stored in the quad vertices instead gives wrong rays along
    /// the diagonal that splits the quad into two triangles.
    pub fn interpolate(&self, uv: Vec2) -> Vec3 {
        let top = self
            .row(Corner::TopLeft)
            .lerp(self.row(Corner::TopRight), uv.x);
        let bottom = self
            .row(Corner::BottomLeft)
            .lerp(self.row(Corner::BottomRight), uv.x);
        bottom.lerp(top, uv.y)
    }

    /// World-space ray direction through `uv`, not normalized.
    pub fn world_ray(&self, uv: Vec2, camera: &CameraIntrinsics) -> Vec3 {
        camera
            .camera_to_world
            .transform_vector3(self.interpolate(uv))
    }
}

/// Computes the corner rays for a vertical field of view (degrees) and
/// aspect ratio, in a right-handed frame looking down -Z.
pub fn frustum_corners(fov_degrees: f32, aspect: f32) -> Result<FrustumCornerMatrix, EffectError> {
    validate_intrinsics(fov_degrees, aspect)?;

    let half_height = (fov_degrees * 0.5).to_radians().tan();
    let to_right = Vec3::X * half_height * aspect;
    let to_top = Vec3::Y * half_height;
    let forward = Vec3::NEG_Z;

    Ok(FrustumCornerMatrix {
        rows: [
            forward - to_right + to_top,
            forward + to_right + to_top,
            forward + to_right - to_top,
            forward - to_right - to_top,
        ],
    })
}

/// World-space line used by the frustum debug overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Vec3,
    pub end: Vec3,
}

/// Builds the frustum debug overlay: the four corner rays leaving the camera,
/// scaled by `length`, followed by the four rim edges joining their tips.
pub fn overlay_lines(
    camera: &CameraIntrinsics,
    corners: &FrustumCornerMatrix,
    length: f32,
) -> [LineSegment; 8] {
    let tips = corners
        .rows
        .map(|ray| camera.position + camera.camera_to_world.transform_vector3(ray) * length);
    let ray = |i: usize| LineSegment {
        start: camera.position,
        end: tips[i],
    };
    let rim = |i: usize| LineSegment {
        start: tips[i],
        end: tips[(i + 1) % 4],
    };
    [ray(0), ray(1), ray(2), ray(3), rim(0), rim(1), rim(2), rim(3)]
}
