use anyhow::{anyhow, bail, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::animation::DemoAnimation;
use crate::camera::{CameraIntrinsics, StaticView};
use crate::render::TextureHandle;

/// Effect configuration read from an `<effect>` XML document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EffectConfig {
    #[serde(default)]
    pub settings: EffectSettings,
    #[serde(default)]
    pub animation: DemoAnimation,
    #[serde(default)]
    pub camera: CameraSetup,
    /// Forward direction of the directional light, if the scene has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sun_direction: Option<Vec3>,
}

impl EffectConfig {
    /// Parses the effect XML. Missing elements keep their defaults.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid effect XML")?;
        let root = document.root_element();
        if !root.has_tag_name("effect") {
            bail!("expected <effect> root element, found <{}>", root.tag_name().name());
        }

        let mut settings = EffectSettings::default();
        settings.shader = optional_text(&root, "shader");
        settings.pass = parse_usize(optional_text(&root, "pass"), settings.pass)?;
        settings.draw_distance =
            parse_f32(optional_text(&root, "drawDistance"), settings.draw_distance)?;
        if settings.draw_distance <= 0.0 || !settings.draw_distance.is_finite() {
            bail!("<drawDistance> must be positive, got {}", settings.draw_distance);
        }
        settings.debug_performance = parse_bool(
            optional_text(&root, "debugPerformance"),
            settings.debug_performance,
        )?;
        settings.color_ramp_material =
            optional_text(&root, "colorRampMaterial").map(TextureHandle::new);
        settings.color_ramp_perf = optional_text(&root, "colorRampPerf").map(TextureHandle::new);

        let mut animation = DemoAnimation::default();
        if let Some(node) = child(&root, "animation") {
            animation.amplitude = parse_f32(optional_text(&node, "amplitude"), animation.amplitude)?;
            animation.angular_velocity = parse_f32(
                optional_text(&node, "angularVelocity"),
                animation.angular_velocity,
            )?;
            animation.translation_axis = parse_vec3(
                optional_text(&node, "translationAxis"),
                animation.translation_axis,
            )?;
            animation.rotation_axis =
                parse_vec3(optional_text(&node, "rotationAxis"), animation.rotation_axis)?;
        }

        let mut camera = CameraSetup::default();
        if let Some(node) = child(&root, "camera") {
            camera.position = parse_vec3(optional_text(&node, "position"), camera.position)?;
            camera.target = parse_vec3(optional_text(&node, "target"), camera.target)?;
            camera.fov = parse_f32(optional_text(&node, "fov"), camera.fov)?;
            camera.aspect = parse_f32(optional_text(&node, "aspect"), camera.aspect)?;
        }

        let sun_direction = match child(&root, "light") {
            Some(node) => Some(
                parse_vec3(optional_text(&node, "direction"), Vec3::NEG_Y)
                    .context("invalid <light> direction")?,
            ),
            None => None,
        };

        Ok(Self {
            settings,
            animation,
            camera,
            sun_direction,
        })
    }

    /// Static view over the configured camera and light.
    pub fn view(&self) -> StaticView {
        StaticView::new(self.camera.intrinsics(), self.sun_direction)
    }
}

/// Settings of the raymarch pass itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSettings {
    /// Shader source handed to the program compiler. `None` keeps the effect
    /// inactive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shader: Option<String>,
    #[serde(default)]
    pub pass: usize,
    #[serde(default = "default_draw_distance")]
    pub draw_distance: f32,
    #[serde(default)]
    pub debug_performance: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_ramp_material: Option<TextureHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_ramp_perf: Option<TextureHandle>,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            shader: None,
            pass: 0,
            draw_distance: default_draw_distance(),
            debug_performance: false,
            color_ramp_material: None,
            color_ramp_perf: None,
        }
    }
}

fn default_draw_distance() -> f32 {
    40.0
}

/// Camera placement as authored in the config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSetup {
    #[serde(default = "default_camera_position")]
    pub position: Vec3,
    #[serde(default)]
    pub target: Vec3,
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_aspect")]
    pub aspect: f32,
}

impl Default for CameraSetup {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            target: Vec3::ZERO,
            fov: default_fov(),
            aspect: default_aspect(),
        }
    }
}

impl CameraSetup {
    pub fn intrinsics(&self) -> CameraIntrinsics {
        CameraIntrinsics::look_at(self.position, self.target, self.fov, self.aspect)
    }
}

fn default_camera_position() -> Vec3 {
    Vec3::new(0.0, 2.0, 6.0)
}

fn default_fov() -> f32 {
    60.0
}

fn default_aspect() -> f32 {
    16.0 / 9.0
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(tag))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    child(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let components = value
        .split_whitespace()
        .map(|component| {
            component
                .parse::<f32>()
                .map_err(|err| anyhow!("invalid vector component {component:?}: {err}"))
        })
        .collect::<Result<Vec<_>>>()?;
    match components.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(anyhow!(
            "vector needs 3 components, got {}",
            components.len()
        )),
    }
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float: {err}")),
        None => Ok(default),
    }
}

fn parse_usize(value: Option<String>, default: usize) -> Result<usize> {
    match value {
        Some(value) => value
            .parse::<usize>()
            .map_err(|err| anyhow!("failed to parse index: {err}")),
        None => Ok(default),
    }
}

fn parse_bool(value: Option<String>, default: bool) -> Result<bool> {
    match value.as_deref() {
        Some("true" | "1" | "on") => Ok(true),
        Some("false" | "0" | "off") => Ok(false),
        Some(other) => Err(anyhow!("failed to parse boolean: {other:?}")),
        None => Ok(default),
    }
}
