use std::ops::{Deref, DerefMut};

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use log::trace;

use crate::error::EffectError;
use crate::frustum::Corner;
use crate::params::names;

use super::{RenderDevice, RenderTargetId, ShaderProgram, UniformValue};

/// Vertex of the full-screen quad. `position[2]` carries the frustum corner
/// index instead of a depth.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub texcoord: [f32; 2],
}

impl QuadVertex {
    fn at(corner: Corner) -> Self {
        let [x, y] = corner.screen_position();
        Self {
            position: [x, y, corner.index() as f32],
            texcoord: [x, y],
        }
    }

    pub fn corner_index(&self) -> usize {
        self.position[2] as usize
    }
}

/// Submission order of the quad: bottom-left, bottom-right, top-right,
/// top-left.
const SUBMISSION_ORDER: [Corner; 4] = [
    Corner::BottomLeft,
    Corner::BottomRight,
    Corner::TopRight,
    Corner::TopLeft,
];

/// The four quad vertices, rebuilt for every draw.
pub fn quad_vertices() -> [QuadVertex; 4] {
    SUBMISSION_ORDER.map(QuadVertex::at)
}

/// Near/far planes wide enough that corner indices 0..=3 stored in z never
/// clip.
pub const QUAD_DEPTH_RANGE: (f32, f32) = (-4.0, 4.0);

/// Orthographic projection mapping the unit square onto the whole target.
pub fn quad_projection() -> Mat4 {
    let (near, far) = QUAD_DEPTH_RANGE;
    Mat4::orthographic_rh_gl(0.0, 1.0, 0.0, 1.0, near, far)
}

/// Saves the projection and active target on entry and restores both when
/// dropped, whichever way the enclosing call exits.
pub struct PipelineScope<'a, D: RenderDevice + ?Sized> {
    device: &'a mut D,
    previous_target: Option<RenderTargetId>,
}

impl<'a, D: RenderDevice + ?Sized> PipelineScope<'a, D> {
    pub fn enter(device: &'a mut D) -> Self {
        let previous_target = device.active_target();
        device.push_projection();
        Self {
            device,
            previous_target,
        }
    }
}

impl<D: RenderDevice + ?Sized> Deref for PipelineScope<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.device
    }
}

impl<D: RenderDevice + ?Sized> DerefMut for PipelineScope<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.device
    }
}

impl<D: RenderDevice + ?Sized> Drop for PipelineScope<'_, D> {
    fn drop(&mut self) {
        self.device.pop_projection();
        self.device.set_active_target(self.previous_target);
    }
}

/// Draws `source` through pass `pass` of `program` into `destination` with a
/// single index-encoded full-screen quad.
pub fn blit<D, P>(
    device: &mut D,
    program: &mut P,
    source: RenderTargetId,
    destination: Option<RenderTargetId>,
    pass: usize,
) -> Result<(), EffectError>
where
    D: RenderDevice + ?Sized,
    P: ShaderProgram + ?Sized,
{
    let destination = destination.ok_or(EffectError::UnboundRenderTarget)?;

    let mut scope = PipelineScope::enter(device);
    scope.set_active_target(Some(destination));
    program.set_uniform(names::MAIN_TEXTURE, UniformValue::Target(source));
    scope.load_projection(quad_projection());

    let available = program.pass_count();
    if pass >= available {
        return Err(EffectError::ShaderPassUnavailable { pass, available });
    }
    program.activate_pass(pass);

    trace!("blitting {source} -> {destination} with pass {pass}");
    scope.draw_quad(&quad_vertices());
    Ok(())
}
