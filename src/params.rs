//! Per-frame uniform assembly for the raymarch program.

use glam::{Mat4, Vec3};
use log::debug;

use crate::animation::DemoAnimation;
use crate::camera::{CameraIntrinsics, IntrinsicsPolicy, ViewProvider};
use crate::clock::Clock;
use crate::config::EffectSettings;
use crate::error::EffectError;
use crate::frustum::FrustumCornerMatrix;
use crate::render::{ShaderProgram, TextureHandle, UniformValue};

/// Uniform and feature-flag names the raymarch program declares.
pub mod names {
    pub const LIGHT_DIRECTION: &str = "lightDirection";
    pub const MODEL_INVERSE: &str = "modelInverse";
    pub const COLOR_RAMP_MATERIAL: &str = "colorRampMaterial";
    pub const COLOR_RAMP_PERF: &str = "colorRampPerf";
    pub const DRAW_DISTANCE: &str = "drawDistance";
    pub const FRUSTUM_CORNERS: &str = "frustumCorners";
    pub const CAMERA_INVERSE_VIEW: &str = "cameraInverseView";
    pub const CAMERA_WORLD_POSITION: &str = "cameraWorldPosition";
    pub const MAIN_TEXTURE: &str = "mainTexture";
    pub const DEBUG_PERFORMANCE: &str = "DEBUG_PERFORMANCE";
}

/// Light direction used when the scene has no directional light.
pub const DEFAULT_LIGHT_DIRECTION: Vec3 = Vec3::NEG_Y;

/// Everything the effect reads from the outside world for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInputs {
    pub camera: CameraIntrinsics,
    pub sun_direction: Option<Vec3>,
    pub elapsed_seconds: f32,
}

impl FrameInputs {
    /// Takes the per-frame snapshot of the view and the clock.
    pub fn capture<V, C>(view: &V, clock: &C) -> Self
    where
        V: ViewProvider + ?Sized,
        C: Clock + ?Sized,
    {
        Self {
            camera: view.camera(),
            sun_direction: view.sun_direction(),
            elapsed_seconds: clock.elapsed_seconds(),
        }
    }
}

/// Values handed to the raymarch program for a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectParameterSet {
    pub light_direction: Vec3,
    pub model_inverse: Mat4,
    pub frustum_corners: FrustumCornerMatrix,
    pub camera_inverse_view: Mat4,
    pub camera_world_position: Vec3,
    pub draw_distance: f32,
    pub color_ramp_material: Option<TextureHandle>,
    pub color_ramp_perf: Option<TextureHandle>,
    pub debug_performance: bool,
}

impl EffectParameterSet {
    /// Computes the parameter set without touching any program state.
    ///
    /// Debug builds reject invalid camera intrinsics; release builds clamp
    /// them into range first.
    pub fn assemble(
        frame: &FrameInputs,
        settings: &EffectSettings,
        animation: &DemoAnimation,
    ) -> Result<Self, EffectError> {
        Self::assemble_with(frame, settings, animation, IntrinsicsPolicy::for_build())
    }

    /// [`Self::assemble`] with an explicit policy for invalid intrinsics.
    pub fn assemble_with(
        frame: &FrameInputs,
        settings: &EffectSettings,
        animation: &DemoAnimation,
        policy: IntrinsicsPolicy,
    ) -> Result<Self, EffectError> {
        let camera = policy.apply(&frame.camera)?;
        let frustum_corners = FrustumCornerMatrix::from_camera(&camera)?;
        let light_direction = frame
            .sun_direction
            .and_then(Vec3::try_normalize)
            .unwrap_or(DEFAULT_LIGHT_DIRECTION);

        Ok(Self {
            light_direction,
            model_inverse: animation.world_to_model(frame.elapsed_seconds),
            frustum_corners,
            camera_inverse_view: camera.camera_to_world,
            camera_world_position: camera.position,
            draw_distance: settings.draw_distance,
            color_ramp_material: settings.color_ramp_material.clone(),
            color_ramp_perf: settings.color_ramp_perf.clone(),
            debug_performance: settings.debug_performance,
        })
    }

    /// Named uniform values in upload order.
    pub fn uniforms(&self) -> [(&'static str, UniformValue); 8] {
        [
            (names::LIGHT_DIRECTION, UniformValue::Vec3(self.light_direction)),
            (names::MODEL_INVERSE, UniformValue::Mat4(self.model_inverse)),
            (
                names::COLOR_RAMP_MATERIAL,
                UniformValue::Texture(self.color_ramp_material.clone()),
            ),
            (
                names::COLOR_RAMP_PERF,
                UniformValue::Texture(self.color_ramp_perf.clone()),
            ),
            (names::DRAW_DISTANCE, UniformValue::Float(self.draw_distance)),
            (
                names::FRUSTUM_CORNERS,
                UniformValue::Mat4(self.frustum_corners.to_mat4()),
            ),
            (
                names::CAMERA_INVERSE_VIEW,
                UniformValue::Mat4(self.camera_inverse_view),
            ),
            (
                names::CAMERA_WORLD_POSITION,
                UniformValue::Vec3(self.camera_world_position),
            ),
        ]
    }
}

/// Assembles the frame's parameters and uploads them to `program`.
///
/// The `DEBUG_PERFORMANCE` flag is only written when it differs from the
/// program's current state.
pub fn bind_parameters<P>(
    program: &mut P,
    frame: &FrameInputs,
    settings: &EffectSettings,
    animation: &DemoAnimation,
) -> Result<EffectParameterSet, EffectError>
where
    P: ShaderProgram + ?Sized,
{
    if !program.is_bound() {
        return Err(EffectError::MissingShaderProgram);
    }

    let parameters = EffectParameterSet::assemble(frame, settings, animation)?;
    for (name, value) in parameters.uniforms() {
        program.set_uniform(name, value);
    }
    sync_feature_flag(program, names::DEBUG_PERFORMANCE, parameters.debug_performance);
    Ok(parameters)
}

/// Writes `name` only if the program disagrees. Returns whether it wrote.
pub fn sync_feature_flag<P>(program: &mut P, name: &str, enabled: bool) -> bool
where
    P: ShaderProgram + ?Sized,
{
    if program.is_feature_flag_set(name) == enabled {
        return false;
    }
    debug!("setting feature flag {name} = {enabled}");
    program.set_feature_flag(name, enabled);
    true
}
