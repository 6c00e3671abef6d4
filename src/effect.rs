use log::{debug, error, trace, warn};

use crate::animation::DemoAnimation;
use crate::config::{EffectConfig, EffectSettings};
use crate::error::EffectError;
use crate::params::{bind_parameters, FrameInputs};
use crate::render::{blit, ProgramCompiler, RenderDevice, RenderTargetId};

/// Whether the raymarch pass can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectState {
    /// A compiled program is cached.
    Active,
    /// No program: the effect copies its input through.
    Inactive,
}

/// Why a frame was copied through instead of marched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PassThroughReason {
    Inactive,
    Failed(EffectError),
}

/// Result of one [`EffectOrchestrator::render_effect`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    Marched,
    PassThrough(PassThroughReason),
    /// No destination to draw or copy into.
    Dropped(PassThroughReason),
}

enum ProgramSlot<P> {
    Empty,
    Ready(P),
    /// Compilation of the current source failed; not retried until the
    /// source changes.
    Failed,
}

/// Per-frame driver of the raymarch effect.
///
/// Owns the lazily compiled program, the effect settings and the demo object
/// animation. Every failure inside a frame is demoted to a pass-through copy.
pub struct EffectOrchestrator<C: ProgramCompiler> {
    compiler: C,
    settings: EffectSettings,
    animation: DemoAnimation,
    program: ProgramSlot<C::Program>,
}

impl<C: ProgramCompiler> EffectOrchestrator<C> {
    pub fn new(compiler: C, settings: EffectSettings, animation: DemoAnimation) -> Self {
        Self {
            compiler,
            settings,
            animation,
            program: ProgramSlot::Empty,
        }
    }

    pub fn from_config(compiler: C, config: &EffectConfig) -> Self {
        Self::new(compiler, config.settings.clone(), config.animation)
    }

    pub fn state(&self) -> EffectState {
        match self.program {
            ProgramSlot::Ready(_) => EffectState::Active,
            ProgramSlot::Empty | ProgramSlot::Failed => EffectState::Inactive,
        }
    }

    /// Whether a program has been compiled and cached.
    pub fn is_initialized(&self) -> bool {
        self.state() == EffectState::Active
    }

    pub fn settings(&self) -> &EffectSettings {
        &self.settings
    }

    pub fn animation(&self) -> &DemoAnimation {
        &self.animation
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// The cached program, if compiled.
    pub fn program(&self) -> Option<&C::Program> {
        match &self.program {
            ProgramSlot::Ready(program) => Some(program),
            _ => None,
        }
    }

    /// Replaces the shader source. A different source discards the cached
    /// program (or a remembered failure) so the next frame compiles again.
    pub fn set_shader_source(&mut self, shader: Option<String>) {
        if self.settings.shader == shader {
            return;
        }
        debug!("effect shader source changed; recompiling on next frame");
        self.settings.shader = shader;
        self.program = ProgramSlot::Empty;
    }

    pub fn set_debug_performance(&mut self, enabled: bool) {
        self.settings.debug_performance = enabled;
    }

    pub fn set_pass(&mut self, pass: usize) {
        self.settings.pass = pass;
    }

    /// Ignores non-positive or non-finite distances.
    pub fn set_draw_distance(&mut self, distance: f32) {
        if distance > 0.0 && distance.is_finite() {
            self.settings.draw_distance = distance;
        } else {
            warn!("ignoring invalid draw distance {distance}");
        }
    }

    /// Renders one frame of the effect from `source` into `destination`.
    ///
    /// Never fails: when the effect is inactive or any step errors, `source`
    /// is copied to `destination` unchanged.
    pub fn render_effect<D>(
        &mut self,
        device: &mut D,
        frame: &FrameInputs,
        source: RenderTargetId,
        destination: Option<RenderTargetId>,
    ) -> FrameOutcome
    where
        D: RenderDevice + ?Sized,
    {
        let reason = match self.march(device, frame, source, destination) {
            Ok(()) => return FrameOutcome::Marched,
            Err(reason) => reason,
        };

        match reason {
            PassThroughReason::Inactive => trace!("effect inactive; copying through"),
            PassThroughReason::Failed(err) if err.is_configuration() => {
                warn!("raymarch effect skipped this frame: {err}")
            }
            PassThroughReason::Failed(err) => error!("raymarch effect failed this frame: {err}"),
        }

        match destination {
            Some(destination) => {
                device.copy(source, destination);
                FrameOutcome::PassThrough(reason)
            }
            None => {
                error!("no destination target bound; dropping frame");
                FrameOutcome::Dropped(reason)
            }
        }
    }

    fn march<D>(
        &mut self,
        device: &mut D,
        frame: &FrameInputs,
        source: RenderTargetId,
        destination: Option<RenderTargetId>,
    ) -> Result<(), PassThroughReason>
    where
        D: RenderDevice + ?Sized,
    {
        self.ensure_program();
        let ProgramSlot::Ready(program) = &mut self.program else {
            return Err(PassThroughReason::Inactive);
        };

        bind_parameters(program, frame, &self.settings, &self.animation)
            .map_err(PassThroughReason::Failed)?;
        blit(device, program, source, destination, self.settings.pass)
            .map_err(PassThroughReason::Failed)
    }

    fn ensure_program(&mut self) {
        if !matches!(self.program, ProgramSlot::Empty) {
            return;
        }
        let Some(source) = self.settings.shader.as_deref() else {
            return;
        };
        self.program = match self.compiler.compile(source) {
            Ok(program) => {
                debug!("compiled raymarch effect program");
                ProgramSlot::Ready(program)
            }
            Err(err) => {
                warn!("failed to compile raymarch effect program: {err:?}");
                ProgramSlot::Failed
            }
        };
    }
}
