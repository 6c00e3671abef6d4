//! Host-side driver for a screen-space raymarching effect.
//!
//! Each frame the driver solves the camera's frustum corner rays, animates
//! the single demo object, uploads the uniforms the raymarch program expects
//! and draws a full-screen quad whose vertices carry corner indices. The
//! graphics device, the program and its compiler stay behind traits in
//! [`render`] so the crate remains testable and easy to embed in headless
//! tools.

pub mod animation;
pub mod app;
pub mod camera;
pub mod clock;
pub mod config;
pub mod effect;
pub mod error;
pub mod frustum;
pub mod params;
pub mod render;

pub use animation::DemoAnimation;
pub use app::{run_headless, RunOptions, RunSummary};
pub use camera::{CameraIntrinsics, IntrinsicsPolicy, StaticView, ViewProvider};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CameraSetup, EffectConfig, EffectSettings};
pub use effect::{EffectOrchestrator, EffectState, FrameOutcome, PassThroughReason};
pub use error::EffectError;
pub use frustum::{frustum_corners, overlay_lines, Corner, FrustumCornerMatrix, LineSegment};
pub use params::{bind_parameters, EffectParameterSet, FrameInputs};
pub use render::{
    ProgramCompiler, QuadVertex, RenderDevice, RenderTargetId, ShaderProgram, TextureHandle,
    UniformValue,
};
