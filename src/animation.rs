use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Motion of the single marched demo object: a sine sweep along one axis
/// combined with a constant spin about another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemoAnimation {
    #[serde(default = "default_translation_axis")]
    pub translation_axis: Vec3,
    #[serde(default = "default_amplitude")]
    pub amplitude: f32,
    #[serde(default = "default_rotation_axis")]
    pub rotation_axis: Vec3,
    /// Spin rate in degrees per second.
    #[serde(default = "default_angular_velocity")]
    pub angular_velocity: f32,
}

impl Default for DemoAnimation {
    fn default() -> Self {
        Self {
            translation_axis: default_translation_axis(),
            amplitude: default_amplitude(),
            rotation_axis: default_rotation_axis(),
            angular_velocity: default_angular_velocity(),
        }
    }
}

fn default_translation_axis() -> Vec3 {
    Vec3::X
}

fn default_amplitude() -> f32 {
    5.0
}

fn default_rotation_axis() -> Vec3 {
    Vec3::Z
}

fn default_angular_velocity() -> f32 {
    200.0
}

impl DemoAnimation {
    /// Spin angle at `t` seconds, wrapped to `[0, 360)` degrees.
    pub fn rotation_degrees(&self, t: f32) -> f32 {
        let angle = (t * self.angular_velocity).rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs.
        if angle >= 360.0 {
            0.0
        } else {
            angle
        }
    }

    /// Offset along the translation axis at `t` seconds. Only the axis
    /// direction matters; `amplitude` alone sets the sweep.
    pub fn translation(&self, t: f32) -> Vec3 {
        let axis = self.translation_axis.try_normalize().unwrap_or(Vec3::X);
        axis * (t.sin() * self.amplitude)
    }

    /// Model-to-world transform at `t` seconds. Deterministic in `t`.
    pub fn model_to_world(&self, t: f32) -> Mat4 {
        let axis = self.rotation_axis.try_normalize().unwrap_or(Vec3::Z);
        let rotation = Quat::from_axis_angle(axis, self.rotation_degrees(t).to_radians());
        Mat4::from_translation(self.translation(t)) * Mat4::from_quat(rotation)
    }

    /// Inverse of [`Self::model_to_world`], the only form the shader sees.
    pub fn world_to_model(&self, t: f32) -> Mat4 {
        self.model_to_world(t).inverse()
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn starts_at_origin_without_rotation() {
        let animation = DemoAnimation::default();
        assert_eq!(animation.rotation_degrees(0.0), 0.0);
        assert_eq!(animation.model_to_world(0.0), Mat4::IDENTITY);
    }

    #[test]
    fn quarter_period_reaches_full_amplitude() {
        let animation = DemoAnimation::default();
        let model = animation.model_to_world(FRAC_PI_2);
        assert!((model.w_axis.x - 5.0).abs() < 1e-5, "{:?}", model.w_axis);
        assert!(model.w_axis.y.abs() < 1e-6);
        assert!(model.w_axis.z.abs() < 1e-6);
    }

    #[test]
    fn sweep_ignores_axis_length() {
        let animation = DemoAnimation {
            translation_axis: Vec3::new(0.0, 2.0, 0.0),
            ..DemoAnimation::default()
        };
        let offset = animation.translation(FRAC_PI_2);
        assert!((offset.length() - animation.amplitude).abs() < 1e-5, "{offset:?}");
        assert!(offset.abs_diff_eq(Vec3::new(0.0, 5.0, 0.0), 1e-5));

        let degenerate = DemoAnimation {
            translation_axis: Vec3::ZERO,
            ..DemoAnimation::default()
        };
        assert!(degenerate
            .translation(FRAC_PI_2)
            .abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn inverse_cancels_transform() {
        let animation = DemoAnimation::default();
        for step in 0..64 {
            let t = step as f32 * 0.37;
            let product = animation.model_to_world(t) * animation.world_to_model(t);
            assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-4), "t={t}");
        }
    }

    #[test]
    fn rotation_repeats_every_period() {
        let animation = DemoAnimation::default();
        let period = 360.0 / animation.angular_velocity;
        for t in [0.1_f32, 0.3, 0.77, 1.2, 4.0] {
            let a = animation.rotation_degrees(t);
            let b = animation.rotation_degrees(t + period);
            let delta = (a - b).abs();
            assert!(delta.min(360.0 - delta) < 1e-2, "t={t}: {a} vs {b}");
        }
    }

    #[test]
    fn rotation_stays_wrapped() {
        let animation = DemoAnimation::default();
        for step in 0..500 {
            let angle = animation.rotation_degrees(step as f32 * 0.123);
            assert!((0.0..360.0).contains(&angle));
        }
    }

    #[test]
    fn recomputation_is_idempotent() {
        let animation = DemoAnimation::default();
        assert_eq!(animation.model_to_world(12.5), animation.model_to_world(12.5));
    }
}
