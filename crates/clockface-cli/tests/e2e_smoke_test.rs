use std::{fs, path::Path};

use tempfile::tempdir;

use clockface::{
    ClockError,
    color::Color,
    draw::{Brush, Composition, Painter, Pixmap},
    geometry::Rect,
};
use clockface_cli::Args;

/// Writes a solid black glyph image.
fn write_glyph(path: &Path, width: u32, height: u32) {
    let mut painter = Painter::new(width, height, 1.0).expect("valid glyph size");
    painter.fill_rect(
        Rect::new(0.0, 0.0, width as f32, height as f32),
        &Brush::solid(Color::default()),
        false,
        Composition::SourceOver,
    );
    painter.save_png(path).expect("glyph written");
}

/// Writes glyph images for digits and the separator.
fn write_glyphs(dir: &Path) {
    for digit in 0..10 {
        write_glyph(&dir.join(format!("{digit}.png")), 4, 10);
    }
    write_glyph(&dir.join("s1.png"), 2, 10);
}

fn write_config(dir: &Path, glyphs: &Path) -> String {
    let path = dir.join("config.toml");
    let content = format!(
        "[skin]\nformat = \"hh:mm\"\n\n[image_glyphs]\ndirectory = {:?}\n",
        glyphs.display().to_string()
    );
    fs::write(&path, content).expect("config written");
    path.to_string_lossy().to_string()
}

fn args(config: String, output: &Path) -> Args {
    Args {
        output: output.to_string_lossy().to_string(),
        time: Some("2024-06-01 12:34:56".to_string()),
        ticks: 1,
        format: None,
        config: Some(config),
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_single_frame() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    write_glyphs(temp_dir.path());
    let config = write_config(temp_dir.path(), temp_dir.path());
    let output = temp_dir.path().join("clock.png");

    clockface_cli::run(&args(config, &output)).expect("clock face renders");

    let frame = Pixmap::load_png(&output).expect("output is a PNG");
    assert_eq!((frame.width(), frame.height()), (18, 10));
}

#[test]
fn e2e_smoke_test_ticks_write_numbered_frames() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    write_glyphs(temp_dir.path());
    let config = write_config(temp_dir.path(), temp_dir.path());
    let output = temp_dir.path().join("clock.png");

    let mut args = args(config, &output);
    args.ticks = 3;
    args.format = Some("mm:ss".to_string());
    clockface_cli::run(&args).expect("clock face renders");

    for index in 0..3 {
        let frame = temp_dir.path().join(format!("clock-{index:03}.png"));
        assert!(frame.exists(), "missing frame {}", frame.display());
    }
    assert!(!output.exists());
}

#[test]
fn e2e_smoke_test_invalid_format() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    write_glyphs(temp_dir.path());
    let config = write_config(temp_dir.path(), temp_dir.path());
    let output = temp_dir.path().join("clock.png");

    let mut args = args(config, &output);
    args.format = Some("hh 'open".to_string());
    let result = clockface_cli::run(&args);

    assert!(matches!(result, Err(ClockError::Format(_))));
    assert!(!output.exists());
}

#[test]
fn e2e_smoke_test_invalid_time() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    write_glyphs(temp_dir.path());
    let config = write_config(temp_dir.path(), temp_dir.path());
    let output = temp_dir.path().join("clock.png");

    let mut args = args(config, &output);
    args.time = Some("noon".to_string());
    let result = clockface_cli::run(&args);

    assert!(matches!(result, Err(ClockError::Config(_))));
}

#[test]
fn e2e_smoke_test_missing_config() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output = temp_dir.path().join("clock.png");
    let missing = temp_dir.path().join("missing.toml");

    let result = clockface_cli::run(&args(missing.to_string_lossy().to_string(), &output));

    assert!(matches!(result, Err(ClockError::Config(msg)) if msg.contains("Missing")));
}
