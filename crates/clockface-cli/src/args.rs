//! Command-line argument definitions for the clockface CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control the rendered instant, the number of
//! frames, output paths, configuration file selection, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the clockface renderer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the output PNG file
    #[arg(short, long, default_value = "clock.png")]
    pub output: String,

    /// Instant to render as "YYYY-MM-DD HH:MM:SS" (defaults to now)
    #[arg(short, long)]
    pub time: Option<String>,

    /// Number of frames to render, one per tick interval
    #[arg(long, default_value_t = 1)]
    pub ticks: u32,

    /// Format string overriding the configured skin format
    #[arg(short, long)]
    pub format: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
