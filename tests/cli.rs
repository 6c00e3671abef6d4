use assert_cmd::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn write_config(xml: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp config");
    tmp.write_all(xml.as_bytes()).expect("write config");
    tmp
}

const ACTIVE: &str = r#"<effect>
  <shader>raymarch.wgsl</shader>
  <drawDistance>40</drawDistance>
  <camera>
    <position>0 0 10</position>
    <target>0 0 0</target>
    <fov>60</fov>
    <aspect>1.7778</aspect>
  </camera>
</effect>
"#;

#[test]
fn cli_marches_frames_and_prints_corner_rays() {
    let config = write_config(ACTIVE);
    let mut cmd = Command::cargo_bin("raymarch-effect").expect("binary exists");
    cmd.arg(config.path())
        .args(["--frames", "2", "--time-step", "1.5707964"]);
    cmd.assert()
        .success()
        .stdout(contains("Loaded effect: shader=raymarch.wgsl pass=0"))
        .stdout(contains("frame 0 t=0.000 marched"))
        .stdout(contains("frustumCorners tl=(-1.0264, 0.5774, -1.0000)"))
        .stdout(contains("frame 1 t=1.571 marched"))
        .stdout(contains("model translation=(5.0000,"))
        .stdout(contains("cameraWorldPosition=(0.0000, 0.0000, 10.0000)"))
        .stdout(contains("lightDirection=(0.0000, -1.0000, 0.0000)"))
        .stdout(contains("Summary: 2 marched, 0 pass-through, 0 dropped"));
}

#[test]
fn cli_copies_through_without_shader() {
    let config = write_config("<effect><drawDistance>10</drawDistance></effect>");
    let mut cmd = Command::cargo_bin("raymarch-effect").expect("binary exists");
    cmd.arg(config.path()).args(["--frames", "2"]);
    cmd.assert()
        .success()
        .stdout(contains("shader=<none>"))
        .stdout(contains("pass-through (Inactive)"))
        .stdout(contains("Summary: 0 marched, 2 pass-through, 0 dropped"))
        .stdout(contains("Recorded 2 device command(s), 0 program command(s)"));
}

#[test]
fn cli_prints_overlay_lines() {
    let config = write_config(ACTIVE);
    let mut cmd = Command::cargo_bin("raymarch-effect").expect("binary exists");
    cmd.arg(config.path()).arg("--overlay");
    cmd.assert()
        .success()
        .stdout(contains("overlay (0.0000, 0.0000, 10.0000) ->"));
}

#[test]
fn cli_rejects_unknown_arguments() {
    let config = write_config(ACTIVE);
    let mut cmd = Command::cargo_bin("raymarch-effect").expect("binary exists");
    cmd.arg(config.path()).arg("--fast");
    cmd.assert()
        .failure()
        .stderr(contains("Unknown argument: --fast"));
}

#[test]
fn cli_reports_invalid_config() {
    let config = write_config("<effect><drawDistance>-5</drawDistance></effect>");
    let mut cmd = Command::cargo_bin("raymarch-effect").expect("binary exists");
    cmd.arg(config.path());
    cmd.assert()
        .failure()
        .stderr(contains("failed to parse effect XML"));
}
