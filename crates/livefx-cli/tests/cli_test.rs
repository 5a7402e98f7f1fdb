//! Runs the `livefx` binary end to end on the CPU backend.

use std::path::Path;
use std::process::Command;

fn livefx() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_livefx"));
    cmd.env_remove("LIVEFX_LOG").env_remove("RUST_LOG").env("LIVEFX_BACKEND", "cpu");
    cmd
}

fn write_rgba(path: &Path, width: u32, height: u32, data: &[u8]) {
    let file = std::fs::File::create(path).unwrap();
    let mut encoder = png::Encoder::new(std::io::BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.write_header().unwrap().write_image_data(data).unwrap();
}

fn read_size(path: &Path) -> (u32, u32) {
    let decoder = png::Decoder::new(std::io::BufReader::new(std::fs::File::open(path).unwrap()));
    let reader = decoder.read_info().unwrap();
    let info = reader.info();
    (info.width, info.height)
}

#[test]
fn test_list_json() {
    let out = livefx().args(["list", "--json"]).output().unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v.as_array().unwrap().len(), 4);
}

#[test]
fn test_apply_grows_canvas() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.png");
    let output = dir.path().join("out.png");
    write_rgba(&input, 8, 6, &[200; 8 * 6 * 4]);

    let status = livefx()
        .arg("apply")
        .arg("directional-blur-v1")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["-p", r#"{"strength": 3}"#])
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(read_size(&output), (14, 12));
}

#[test]
fn test_unknown_effect_fails() {
    let out = livefx().args(["edit", "no-such-effect"]).output().unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("no-such-effect"));
}

#[test]
fn test_interpolate() {
    let out = livefx()
        .args(["interpolate", "blur-v1", "--from", r#"{"radius": 2}"#, "--to", r#"{"radius": 6}"#, "-t", "0.25"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["radius"], serde_json::json!(3.0));
}
