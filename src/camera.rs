use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::EffectError;

const MIN_FOV_DEGREES: f32 = 0.01;
const MAX_FOV_DEGREES: f32 = 179.0;
const MIN_ASPECT: f32 = 0.01;
const FALLBACK_FOV_DEGREES: f32 = 60.0;

/// Snapshot of the perspective camera taken once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Vertical field of view in degrees, exclusive range `(0, 180)`.
    pub fov_degrees: f32,
    /// Width over height, strictly positive.
    pub aspect: f32,
    pub position: Vec3,
    /// Camera-to-world transform (the inverse of the view matrix).
    pub camera_to_world: Mat4,
}

impl Default for CameraIntrinsics {
    fn default() -> Self {
        Self::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, 60.0, 16.0 / 9.0)
    }
}

impl CameraIntrinsics {
    /// Builds a right-handed camera at `position` looking towards `target`.
    pub fn look_at(position: Vec3, target: Vec3, fov_degrees: f32, aspect: f32) -> Self {
        let forward = target - position;
        let forward = if forward.length_squared() > f32::EPSILON {
            forward.normalize()
        } else {
            Vec3::NEG_Z
        };
        // Looking straight up or down makes +Y degenerate as the up hint.
        let up = if forward.cross(Vec3::Y).length_squared() > 1e-6 {
            Vec3::Y
        } else {
            Vec3::Z
        };
        let view = Mat4::look_at_rh(position, position + forward, up);
        Self {
            fov_degrees,
            aspect,
            position,
            camera_to_world: view.inverse(),
        }
    }

    /// Rejects field of view outside `(0, 180)` degrees and non-positive aspect.
    pub fn validate(&self) -> Result<(), EffectError> {
        validate_intrinsics(self.fov_degrees, self.aspect)
    }

    /// Returns a copy whose field of view and aspect are forced into range.
    pub fn clamped(&self) -> Self {
        let fov_degrees = if self.fov_degrees.is_finite() {
            self.fov_degrees.clamp(MIN_FOV_DEGREES, MAX_FOV_DEGREES)
        } else {
            FALLBACK_FOV_DEGREES
        };
        let aspect = if self.aspect.is_finite() {
            self.aspect.max(MIN_ASPECT)
        } else {
            1.0
        };
        Self {
            fov_degrees,
            aspect,
            ..*self
        }
    }

    /// World-space view direction (camera local -Z).
    pub fn forward(&self) -> Vec3 {
        self.camera_to_world.transform_vector3(Vec3::NEG_Z)
    }
}

/// Checks a vertical field of view (degrees) and aspect ratio.
pub fn validate_intrinsics(fov_degrees: f32, aspect: f32) -> Result<(), EffectError> {
    let valid_fov = fov_degrees > 0.0 && fov_degrees < 180.0;
    let valid_aspect = aspect > 0.0 && aspect.is_finite();
    if valid_fov && valid_aspect {
        Ok(())
    } else {
        Err(EffectError::InvalidCameraIntrinsics {
            fov_degrees,
            aspect,
        })
    }
}

/// How invalid camera intrinsics are treated when a frame is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntrinsicsPolicy {
    /// Report [`EffectError::InvalidCameraIntrinsics`].
    Reject,
    /// Force the values into range with [`CameraIntrinsics::clamped`].
    Clamp,
}

impl IntrinsicsPolicy {
    /// `Reject` in debug builds, `Clamp` in release builds.
    pub const fn for_build() -> Self {
        if cfg!(debug_assertions) {
            Self::Reject
        } else {
            Self::Clamp
        }
    }

    pub fn apply(self, camera: &CameraIntrinsics) -> Result<CameraIntrinsics, EffectError> {
        match self {
            Self::Reject => camera.validate().map(|()| *camera),
            Self::Clamp => Ok(camera.clamped()),
        }
    }
}

/// Read-only access to the camera and the optional sun light.
pub trait ViewProvider {
    fn camera(&self) -> CameraIntrinsics;

    /// Forward direction of the scene's directional light, if one exists.
    fn sun_direction(&self) -> Option<Vec3>;
}

/// View that always reports the same camera and light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticView {
    pub camera: CameraIntrinsics,
    pub sun_direction: Option<Vec3>,
}

impl StaticView {
    pub const fn new(camera: CameraIntrinsics, sun_direction: Option<Vec3>) -> Self {
        Self {
            camera,
            sun_direction,
        }
    }
}

impl ViewProvider for StaticView {
    fn camera(&self) -> CameraIntrinsics {
        self.camera
    }

    fn sun_direction(&self) -> Option<Vec3> {
        self.sun_direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_at_points_forward_at_target() {
        let camera = CameraIntrinsics::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 60.0, 1.0);
        assert!(camera.forward().abs_diff_eq(Vec3::NEG_Z, 1e-5));
        let origin = camera.camera_to_world.transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(camera.position, 1e-5));
    }

    #[test]
    fn look_at_handles_vertical_view() {
        let camera = CameraIntrinsics::look_at(Vec3::new(0.0, 8.0, 0.0), Vec3::ZERO, 45.0, 1.5);
        assert!(camera.forward().abs_diff_eq(Vec3::NEG_Y, 1e-5));
        assert!(camera.camera_to_world.is_finite());
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut camera = CameraIntrinsics::default();
        assert!(camera.validate().is_ok());
        camera.fov_degrees = 180.0;
        assert!(camera.validate().is_err());
        camera.fov_degrees = 0.0;
        assert!(camera.validate().is_err());
        camera.fov_degrees = 60.0;
        camera.aspect = 0.0;
        assert_eq!(
            camera.validate(),
            Err(EffectError::InvalidCameraIntrinsics {
                fov_degrees: 60.0,
                aspect: 0.0
            })
        );
    }

    #[test]
    fn clamped_camera_is_valid() {
        let mut camera = CameraIntrinsics::default();
        camera.fov_degrees = 270.0;
        camera.aspect = -2.0;
        let clamped = camera.clamped();
        assert!(clamped.validate().is_ok());
        assert_eq!(clamped.fov_degrees, MAX_FOV_DEGREES);
        assert_eq!(clamped.aspect, MIN_ASPECT);
        assert_eq!(clamped.position, camera.position);

        camera.fov_degrees = f32::NAN;
        assert_eq!(camera.clamped().fov_degrees, FALLBACK_FOV_DEGREES);
    }

    #[test]
    fn policy_rejects_or_clamps_invalid_intrinsics() {
        let mut camera = CameraIntrinsics::default();
        camera.fov_degrees = 200.0;
        assert!(matches!(
            IntrinsicsPolicy::Reject.apply(&camera),
            Err(EffectError::InvalidCameraIntrinsics { .. })
        ));
        let clamped = IntrinsicsPolicy::Clamp.apply(&camera).unwrap();
        assert_eq!(clamped.fov_degrees, MAX_FOV_DEGREES);

        let valid = CameraIntrinsics::default();
        assert_eq!(IntrinsicsPolicy::Reject.apply(&valid), Ok(valid));
        assert_eq!(IntrinsicsPolicy::Clamp.apply(&valid), Ok(valid));
        assert_eq!(
            IntrinsicsPolicy::for_build() == IntrinsicsPolicy::Reject,
            cfg!(debug_assertions)
        );
    }
}
