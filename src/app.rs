use glam::Vec3;
use log::info;

use crate::clock::{Clock, ManualClock};
use crate::config::EffectConfig;
use crate::effect::{EffectOrchestrator, FrameOutcome};
use crate::frustum::{overlay_lines, Corner, FrustumCornerMatrix};
use crate::params::{EffectParameterSet, FrameInputs};
use crate::render::{CommandLog, HeadlessCompiler, RecordingDevice, RenderTargetId};

const SOURCE: RenderTargetId = RenderTargetId(0);
const DESTINATION: RenderTargetId = RenderTargetId(1);

/// Options of a headless run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    pub frames: usize,
    /// Seconds the clock advances between frames.
    pub time_step: f32,
    /// Print the frustum debug overlay for every frame.
    pub overlay: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            frames: 1,
            time_step: 1.0 / 60.0,
            overlay: false,
        }
    }
}

/// Counters collected over a headless run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub marched: usize,
    pub pass_through: usize,
    pub dropped: usize,
    pub device_commands: usize,
    pub program_commands: usize,
}

/// Drives the effect for `options.frames` frames against the recording
/// backend and prints what each frame produced.
pub fn run_headless(config: &EffectConfig, options: &RunOptions) -> RunSummary {
    let device_log = CommandLog::new();
    let program_log = CommandLog::new();
    let mut device = RecordingDevice::new(device_log.clone());
    let mut effect =
        EffectOrchestrator::from_config(HeadlessCompiler::new(1, program_log.clone()), config);
    let view = config.view();
    let clock = ManualClock::new(0.0);
    let mut summary = RunSummary::default();

    info!("running {} headless frame(s)", options.frames);
    for index in 0..options.frames {
        let frame = FrameInputs::capture(&view, &clock);
        let outcome = effect.render_effect(&mut device, &frame, SOURCE, Some(DESTINATION));
        match outcome {
            FrameOutcome::Marched => summary.marched += 1,
            FrameOutcome::PassThrough(_) => summary.pass_through += 1,
            FrameOutcome::Dropped(_) => summary.dropped += 1,
        }
        print_frame(index, &frame, &outcome, config);
        if options.overlay {
            print_overlay(&frame, config.settings.draw_distance);
        }
        clock.advance(options.time_step);
    }

    summary.device_commands = device_log.len();
    summary.program_commands = program_log.len();
    print_summary(&summary, clock.elapsed_seconds());
    summary
}

fn print_frame(index: usize, frame: &FrameInputs, outcome: &FrameOutcome, config: &EffectConfig) {
    let label = match outcome {
        FrameOutcome::Marched => "marched".to_string(),
        FrameOutcome::PassThrough(reason) => format!("pass-through ({reason:?})"),
        FrameOutcome::Dropped(reason) => format!("dropped ({reason:?})"),
    };
    println!("frame {index} t={:.3} {label}", frame.elapsed_seconds);

    let Ok(parameters) = EffectParameterSet::assemble(frame, &config.settings, &config.animation)
    else {
        return;
    };
    print_corners(&parameters.frustum_corners);
    let model = parameters.model_inverse.inverse();
    println!(
        "  model translation={} rotation={:.2}deg",
        fmt_vec3(model.w_axis.truncate()),
        config.animation.rotation_degrees(frame.elapsed_seconds)
    );
    println!(
        "  cameraWorldPosition={} lightDirection={}",
        fmt_vec3(parameters.camera_world_position),
        fmt_vec3(parameters.light_direction)
    );
}

fn print_corners(corners: &FrustumCornerMatrix) {
    println!(
        "  frustumCorners tl={} tr={} br={} bl={}",
        fmt_vec3(corners.row(Corner::TopLeft)),
        fmt_vec3(corners.row(Corner::TopRight)),
        fmt_vec3(corners.row(Corner::BottomRight)),
        fmt_vec3(corners.row(Corner::BottomLeft)),
    );
}

fn print_overlay(frame: &FrameInputs, length: f32) {
    let Ok(corners) = FrustumCornerMatrix::from_camera(&frame.camera) else {
        return;
    };
    for line in overlay_lines(&frame.camera, &corners, length) {
        println!("  overlay {} -> {}", fmt_vec3(line.start), fmt_vec3(line.end));
    }
}

fn print_summary(summary: &RunSummary, elapsed: f32) {
    println!(
        "Summary: {} marched, {} pass-through, {} dropped over {:.3}s",
        summary.marched, summary.pass_through, summary.dropped, elapsed
    );
    println!(
        "Recorded {} device command(s), {} program command(s)",
        summary.device_commands, summary.program_commands
    );
}

fn fmt_vec3(value: Vec3) -> String {
    format!("({:.4}, {:.4}, {:.4})", value.x, value.y, value.z)
}
