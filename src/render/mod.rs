//! Boundary with the graphics device and the compiled effect program.
//!
//! The device, the shader program and the compiler are external
//! collaborators; this module only states what the effect needs from them.

pub mod blit;
pub mod headless;
pub mod uniforms;

use std::fmt;

use anyhow::Result;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

pub use blit::{
    blit, quad_projection, quad_vertices, PipelineScope, QuadVertex, QUAD_DEPTH_RANGE,
};
pub use headless::{
    CommandLog, DeviceCommand, HeadlessCompiler, ProgramCommand, RecordingDevice,
    RecordingProgram,
};
pub use uniforms::EffectUniforms;

/// Opaque handle of a render target owned by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderTargetId(pub u32);

impl fmt::Display for RenderTargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target#{}", self.0)
    }
}

/// Opaque handle of a texture asset, identified by its asset path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub String);

impl TextureHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Value of a named shader uniform.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec3(Vec3),
    Mat4(Mat4),
    /// Optional texture slot; `None` clears the binding.
    Texture(Option<TextureHandle>),
    /// A render target sampled as a texture.
    Target(RenderTargetId),
}

/// Render-target and fixed-function state of the graphics device.
pub trait RenderDevice {
    /// Copies `source` into `destination` unchanged.
    fn copy(&mut self, source: RenderTargetId, destination: RenderTargetId);

    fn set_active_target(&mut self, target: Option<RenderTargetId>);

    fn active_target(&self) -> Option<RenderTargetId>;

    /// Saves the current projection matrix.
    fn push_projection(&mut self);

    fn load_projection(&mut self, projection: Mat4);

    /// Restores the projection saved by the matching [`Self::push_projection`].
    fn pop_projection(&mut self);

    /// Draws one quad with the currently active pass.
    fn draw_quad(&mut self, vertices: &[QuadVertex; 4]);
}

/// A compiled effect program and its material state.
pub trait ShaderProgram {
    fn is_bound(&self) -> bool;

    fn set_uniform(&mut self, name: &str, value: UniformValue);

    fn set_feature_flag(&mut self, name: &str, enabled: bool);

    fn is_feature_flag_set(&self, name: &str) -> bool;

    fn pass_count(&self) -> usize;

    /// Makes pass `pass` current for the next draw. Callers check
    /// [`Self::pass_count`] first.
    fn activate_pass(&mut self, pass: usize);
}

/// Turns shader source into a program.
pub trait ProgramCompiler {
    type Program: ShaderProgram;

    fn compile(&mut self, source: &str) -> Result<Self::Program>;
}
