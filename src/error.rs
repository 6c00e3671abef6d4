use thiserror::Error;

/// Failures raised while preparing or submitting the raymarch pass.
///
/// None of these escape [`crate::EffectOrchestrator::render_effect`]; the
/// orchestrator demotes every variant to a pass-through copy for the frame.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum EffectError {
    #[error("invalid camera intrinsics: fov={fov_degrees} degrees, aspect={aspect}")]
    InvalidCameraIntrinsics { fov_degrees: f32, aspect: f32 },
    #[error("no compiled effect program is bound")]
    MissingShaderProgram,
    #[error("shader pass {pass} is unavailable (program has {available} pass(es))")]
    ShaderPassUnavailable { pass: usize, available: usize },
    #[error("destination render target is not bound")]
    UnboundRenderTarget,
}

impl EffectError {
    /// Whether the error points at incomplete configuration rather than a
    /// caller contract violation.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingShaderProgram | Self::ShaderPassUnavailable { .. }
        )
    }
}
