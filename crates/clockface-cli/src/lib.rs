//! CLI logic for the clockface renderer.
//!
//! This module loads the configuration, builds a [`ClockFace`] and writes
//! one PNG per rendered frame.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use log::info;

use clockface::{ClockError, ClockFace};

/// Accepted layout of the `--time` argument.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Run the clockface CLI application
///
/// Renders the configured clock face at the requested instant. With more
/// than one tick, every frame advances the separator blink and is written
/// next to the output path with its index appended (`clock-000.png`, ...).
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `ClockError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Invalid time or format strings
/// - Glyph loading and rendering errors
pub fn run(args: &Args) -> Result<(), ClockError> {
    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(format) = &args.format {
        let mut skin = app_config.skin().clone();
        skin.set_format(format.as_str());
        app_config = app_config.with_skin(skin);
    }

    let start = parse_time(args.time.as_deref())?;
    info!(
        time:% = start,
        ticks = args.ticks,
        output_path = args.output;
        "Rendering clock face"
    );

    let mut face = ClockFace::new(app_config)?;
    let output = Path::new(&args.output);

    if args.ticks <= 1 {
        face.render_png(&start, output)?;
        info!(output_file = args.output; "PNG exported successfully");
        return Ok(());
    }

    let times: Vec<NaiveDateTime> = face
        .ticker()
        .schedule(start, args.ticks as usize)
        .collect();
    for (index, time) in times.iter().enumerate() {
        let path = frame_path(output, index);
        let frame = face.tick(time)?;
        frame
            .save_png(&path)
            .map_err(|err| ClockError::Image(format!("{}: {err}", path.display())))?;
        info!(output_file = path.display().to_string(); "Frame exported");
    }

    Ok(())
}

fn parse_time(time: Option<&str>) -> Result<NaiveDateTime, ClockError> {
    match time {
        Some(text) => NaiveDateTime::parse_from_str(text, TIME_FORMAT).map_err(|err| {
            ClockError::Config(format!("Invalid time `{text}` (expected {TIME_FORMAT}): {err}"))
        }),
        None => Ok(Local::now().naive_local()),
    }
}

/// `out.png` becomes `out-003.png` for frame 3.
fn frame_path(output: &Path, index: usize) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    let extension = output
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    output.with_file_name(format!("{stem}-{index:03}.{extension}"))
}
