use std::env;
use std::fs;

use anyhow::{anyhow, Context, Result};
use log::info;

use raymarch_effect::{run_headless, EffectConfig, RunOptions};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let xml = fs::read_to_string(&options.path)
        .with_context(|| format!("failed to read effect config {}", options.path))?;
    let config = EffectConfig::from_xml(&xml).context("failed to parse effect XML")?;

    let settings = &config.settings;
    println!(
        "Loaded effect: shader={} pass={} drawDistance={:.2} debugPerformance={}",
        settings.shader.as_deref().unwrap_or("<none>"),
        settings.pass,
        settings.draw_distance,
        settings.debug_performance
    );
    info!("camera {:?}", config.camera);

    let summary = run_headless(&config, &options.run);
    if summary.marched == 0 && settings.shader.is_some() {
        info!("effect never ran; every frame was copied through");
    }
    Ok(())
}

const USAGE: &str =
    "Usage: raymarch-effect <effect.xml> [--frames N] [--time-step SECONDS] [--overlay]";

struct CliOptions {
    path: String,
    run: RunOptions,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let Some(path) = args.next() else {
            return Err(anyhow!(USAGE));
        };
        let mut run = RunOptions::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--frames" => {
                    let value = args.next().ok_or_else(|| anyhow!("--frames needs a value"))?;
                    run.frames = value
                        .parse()
                        .with_context(|| format!("invalid frame count {value:?}"))?;
                }
                "--time-step" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--time-step needs a value"))?;
                    run.time_step = value
                        .parse()
                        .with_context(|| format!("invalid time step {value:?}"))?;
                }
                "--overlay" => run.overlay = true,
                other => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Expected --frames, --time-step or --overlay"
                    ));
                }
            }
        }
        Ok(Self { path, run })
    }
}
