use bytemuck::{bytes_of, Pod, Zeroable};

use crate::params::EffectParameterSet;

/// Uniform block layout for backends that upload the parameters as one
/// buffer. Matrices are column-major; vec3 values are padded to vec4.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct EffectUniforms {
    pub model_inverse: [[f32; 4]; 4],
    pub frustum_corners: [[f32; 4]; 4],
    pub camera_inverse_view: [[f32; 4]; 4],
    pub light_direction: [f32; 4],
    pub camera_world_position: [f32; 4],
    pub draw_distance: f32,
    pub debug_performance: u32,
    pub _padding: [u32; 2],
}

impl EffectUniforms {
    pub fn as_bytes(&self) -> &[u8] {
        bytes_of(self)
    }
}

impl From<&EffectParameterSet> for EffectUniforms {
    fn from(parameters: &EffectParameterSet) -> Self {
        Self {
            model_inverse: parameters.model_inverse.to_cols_array_2d(),
            frustum_corners: parameters.frustum_corners.to_mat4().to_cols_array_2d(),
            camera_inverse_view: parameters.camera_inverse_view.to_cols_array_2d(),
            light_direction: parameters.light_direction.extend(0.0).into(),
            camera_world_position: parameters.camera_world_position.extend(1.0).into(),
            draw_distance: parameters.draw_distance,
            debug_performance: u32::from(parameters.debug_performance),
            _padding: [0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::mem::{offset_of, size_of};

    use super::*;
    use crate::animation::DemoAnimation;
    use crate::camera::CameraIntrinsics;
    use crate::config::EffectSettings;
    use crate::params::FrameInputs;

    #[test]
    fn block_is_sixteen_byte_aligned() {
        assert_eq!(size_of::<EffectUniforms>(), 240);
        assert_eq!(offset_of!(EffectUniforms, light_direction), 192);
        assert_eq!(offset_of!(EffectUniforms, draw_distance), 224);
    }

    #[test]
    fn packs_corner_rows_for_the_shader() {
        let frame = FrameInputs {
            camera: CameraIntrinsics::default(),
            sun_direction: None,
            elapsed_seconds: 0.0,
        };
        let settings = EffectSettings {
            debug_performance: true,
            ..EffectSettings::default()
        };
        let parameters =
            EffectParameterSet::assemble(&frame, &settings, &DemoAnimation::default()).unwrap();
        let block = EffectUniforms::from(&parameters);

        let top_left = parameters.frustum_corners.rows()[0];
        // Column 0 holds the x components of the four rows.
        assert_eq!(block.frustum_corners[0][0], top_left.x);
        assert_eq!(block.frustum_corners[1][0], top_left.y);
        assert_eq!(block.frustum_corners[2][0], top_left.z);
        assert_eq!(block.debug_performance, 1);
        assert_eq!(block.light_direction, [0.0, -1.0, 0.0, 0.0]);
        assert_eq!(block.as_bytes().len(), 240);
    }
}
