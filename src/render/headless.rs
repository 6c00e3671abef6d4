//! Device, program and compiler that record commands instead of drawing.
//!
//! Used by the headless CLI and by tests to observe exactly what the effect
//! asks of its collaborators.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use glam::Mat4;
use log::{debug, warn};
use parking_lot::RwLock;

use super::{
    ProgramCompiler, QuadVertex, RenderDevice, RenderTargetId, ShaderProgram, UniformValue,
};

/// Shared, append-only command list. Clones observe the same entries.
#[derive(Debug)]
pub struct CommandLog<T> {
    entries: Arc<RwLock<Vec<T>>>,
}

impl<T> Clone for CommandLog<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T> Default for CommandLog<T> {
    fn default() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<T: Clone> CommandLog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: T) {
        self.entries.write().push(entry);
    }

    /// Returns a copy of every recorded entry.
    pub fn snapshot(&self) -> Vec<T> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Counts entries matching `predicate`.
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        self.entries.read().iter().filter(|&entry| predicate(entry)).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    Copy {
        source: RenderTargetId,
        destination: RenderTargetId,
    },
    SetActiveTarget(Option<RenderTargetId>),
    PushProjection,
    LoadProjection(Mat4),
    PopProjection,
    DrawQuad {
        target: Option<RenderTargetId>,
        vertices: [QuadVertex; 4],
    },
}

/// Device that tracks pipeline state and records every call.
#[derive(Debug)]
pub struct RecordingDevice {
    log: CommandLog<DeviceCommand>,
    active_target: Option<RenderTargetId>,
    projection: Mat4,
    saved_projections: Vec<Mat4>,
}

impl RecordingDevice {
    pub fn new(log: CommandLog<DeviceCommand>) -> Self {
        Self {
            log,
            active_target: None,
            projection: Mat4::IDENTITY,
            saved_projections: Vec::new(),
        }
    }

    pub fn log(&self) -> &CommandLog<DeviceCommand> {
        &self.log
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Number of projections pushed and not yet popped.
    pub fn projection_depth(&self) -> usize {
        self.saved_projections.len()
    }
}

impl RenderDevice for RecordingDevice {
    fn copy(&mut self, source: RenderTargetId, destination: RenderTargetId) {
        self.log.push(DeviceCommand::Copy {
            source,
            destination,
        });
    }

    fn set_active_target(&mut self, target: Option<RenderTargetId>) {
        self.active_target = target;
        self.log.push(DeviceCommand::SetActiveTarget(target));
    }

    fn active_target(&self) -> Option<RenderTargetId> {
        self.active_target
    }

    fn push_projection(&mut self) {
        self.saved_projections.push(self.projection);
        self.log.push(DeviceCommand::PushProjection);
    }

    fn load_projection(&mut self, projection: Mat4) {
        self.projection = projection;
        self.log.push(DeviceCommand::LoadProjection(projection));
    }

    fn pop_projection(&mut self) {
        match self.saved_projections.pop() {
            Some(projection) => self.projection = projection,
            None => warn!("projection stack underflow"),
        }
        self.log.push(DeviceCommand::PopProjection);
    }

    fn draw_quad(&mut self, vertices: &[QuadVertex; 4]) {
        self.log.push(DeviceCommand::DrawQuad {
            target: self.active_target,
            vertices: *vertices,
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgramCommand {
    SetUniform { name: String, value: UniformValue },
    SetFeatureFlag { name: String, enabled: bool },
    ActivatePass(usize),
}

/// Program that keeps its material state in memory and records mutations.
#[derive(Debug)]
pub struct RecordingProgram {
    log: CommandLog<ProgramCommand>,
    bound: bool,
    passes: usize,
    active_pass: Option<usize>,
    flags: HashSet<String>,
    uniforms: HashMap<String, UniformValue>,
}

impl RecordingProgram {
    pub fn new(passes: usize, log: CommandLog<ProgramCommand>) -> Self {
        Self {
            log,
            bound: true,
            passes,
            active_pass: None,
            flags: HashSet::new(),
            uniforms: HashMap::new(),
        }
    }

    pub fn log(&self) -> &CommandLog<ProgramCommand> {
        &self.log
    }

    /// Simulates the device dropping the program's resources.
    pub fn unbind(&mut self) {
        self.bound = false;
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    pub fn active_pass(&self) -> Option<usize> {
        self.active_pass
    }
}

impl ShaderProgram for RecordingProgram {
    fn is_bound(&self) -> bool {
        self.bound
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.uniforms.insert(name.to_string(), value.clone());
        self.log.push(ProgramCommand::SetUniform {
            name: name.to_string(),
            value,
        });
    }

    fn set_feature_flag(&mut self, name: &str, enabled: bool) {
        if enabled {
            self.flags.insert(name.to_string());
        } else {
            self.flags.remove(name);
        }
        self.log.push(ProgramCommand::SetFeatureFlag {
            name: name.to_string(),
            enabled,
        });
    }

    fn is_feature_flag_set(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    fn pass_count(&self) -> usize {
        self.passes
    }

    fn activate_pass(&mut self, pass: usize) {
        self.active_pass = Some(pass);
        self.log.push(ProgramCommand::ActivatePass(pass));
    }
}

/// Compiler producing [`RecordingProgram`]s that share one command log.
///
/// Any non-blank source compiles; blank source is reported as an error.
#[derive(Debug)]
pub struct HeadlessCompiler {
    passes: usize,
    bind_programs: bool,
    log: CommandLog<ProgramCommand>,
    attempts: usize,
}

impl HeadlessCompiler {
    pub fn new(passes: usize, log: CommandLog<ProgramCommand>) -> Self {
        Self {
            passes,
            bind_programs: true,
            log,
            attempts: 0,
        }
    }

    /// Compiler whose programs report themselves as unbound.
    pub fn unbound(passes: usize, log: CommandLog<ProgramCommand>) -> Self {
        Self {
            bind_programs: false,
            ..Self::new(passes, log)
        }
    }

    /// Number of `compile` calls so far, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

impl ProgramCompiler for HeadlessCompiler {
    type Program = RecordingProgram;

    fn compile(&mut self, source: &str) -> Result<RecordingProgram> {
        self.attempts += 1;
        if source.trim().is_empty() {
            return Err(anyhow!("shader source is empty"));
        }
        debug!(
            "compiled headless program ({} bytes, {} pass(es))",
            source.len(),
            self.passes
        );
        let mut program = RecordingProgram::new(self.passes, self.log.clone());
        if !self.bind_programs {
            program.unbind();
        }
        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_clones_share_entries() {
        let log = CommandLog::new();
        let other = log.clone();
        log.push(1);
        other.push(2);
        assert_eq!(log.snapshot(), vec![1, 2]);
        assert_eq!(other.count(|entry| *entry > 1), 1);
        other.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn device_restores_saved_projection() {
        let mut device = RecordingDevice::new(CommandLog::new());
        device.push_projection();
        device.load_projection(Mat4::from_scale(glam::Vec3::splat(2.0)));
        device.pop_projection();
        assert_eq!(device.projection(), Mat4::IDENTITY);
        assert_eq!(device.projection_depth(), 0);
    }

    #[test]
    fn program_tracks_flags_and_uniforms() {
        let mut program = RecordingProgram::new(1, CommandLog::new());
        program.set_feature_flag("FLAG", true);
        assert!(program.is_feature_flag_set("FLAG"));
        program.set_feature_flag("FLAG", false);
        assert!(!program.is_feature_flag_set("FLAG"));
        program.set_uniform("drawDistance", UniformValue::Float(3.0));
        assert_eq!(
            program.uniform("drawDistance"),
            Some(&UniformValue::Float(3.0))
        );
        assert_eq!(program.log().len(), 3);
    }

    #[test]
    fn compiler_rejects_blank_source() {
        let mut compiler = HeadlessCompiler::new(1, CommandLog::new());
        assert!(compiler.compile("  \n").is_err());
        assert!(compiler.compile("fn main() {}").is_ok());
        assert_eq!(compiler.attempts(), 2);
    }

    #[test]
    fn unbound_compiler_yields_unbound_programs() {
        let mut compiler = HeadlessCompiler::unbound(1, CommandLog::new());
        let program = compiler.compile("pass").unwrap();
        assert!(!program.is_bound());
    }
}
