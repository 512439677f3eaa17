//! Skin file discovery.
//!
//! The clock reads one TOML file describing its skin, font, glyph images and
//! render options. The file comes from the first of:
//!
//! - the `--config` argument
//! - `clockface/config.toml` under the working directory
//! - `config.toml` in the platform config directory (`~/.config/clockface`
//!   on Linux)
//!
//! Without a file the built-in skin is used. A relative
//! `image_glyphs.directory` is resolved against the folder of the file that
//! names it, so a skin can ship next to its glyph images.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use clockface::{
    ClockError,
    config::{AppConfig, ImageGlyphsConfig},
};

const LOCAL_SKIN_FILE: &str = "clockface/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML skin file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Invalid skin in {}: {reason}", path.display())]
    InvalidSkin { path: PathBuf, reason: String },
}

impl From<ConfigError> for ClockError {
    fn from(err: ConfigError) -> Self {
        ClockError::Config(err.to_string())
    }
}

/// Where the skin file was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Argument(PathBuf),
    Local(PathBuf),
    Platform(PathBuf),
    Builtin,
}

impl ConfigSource {
    /// Picks the skin file to read. An explicit path is taken even when it
    /// does not exist, so that the caller can report it.
    pub fn locate(explicit_path: Option<impl AsRef<Path>>) -> Self {
        if let Some(path) = explicit_path {
            return Self::Argument(path.as_ref().to_path_buf());
        }

        let local = Path::new(LOCAL_SKIN_FILE);
        if local.is_file() {
            return Self::Local(local.to_path_buf());
        }

        match ProjectDirs::from("com", "clockface", "clockface") {
            Some(dirs) => {
                let platform = dirs.config_dir().join("config.toml");
                if platform.is_file() {
                    return Self::Platform(platform);
                }
                debug!(path = platform.display().to_string(); "No skin file in config directory");
            }
            None => debug!("No platform config directory"),
        }
        Self::Builtin
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Argument(path) | Self::Local(path) | Self::Platform(path) => Some(path),
            Self::Builtin => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Argument(_) => "argument",
            Self::Local(_) => "local",
            Self::Platform(_) => "platform",
            Self::Builtin => "builtin",
        }
    }
}

/// Loads the clock configuration from the first skin file found.
///
/// # Errors
///
/// Returns `ClockError::Config` when the `--config` file is missing, when a
/// file is not valid TOML, or when its skin section fails validation.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, ClockError> {
    let source = ConfigSource::locate(explicit_path);
    let Some(path) = source.path() else {
        debug!("Using the built-in skin");
        return Ok(AppConfig::default());
    };
    info!(
        source = source.label(),
        path = path.display().to_string();
        "Loading skin file"
    );
    read_skin_file(path)
}

fn read_skin_file(path: &Path) -> Result<AppConfig, ClockError> {
    if !path.is_file() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    config
        .skin()
        .validate()
        .map_err(|err| ConfigError::InvalidSkin {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

    Ok(resolve_glyph_directory(config, path))
}

fn resolve_glyph_directory(config: AppConfig, skin_file: &Path) -> AppConfig {
    let Some(images) = config.image_glyphs() else {
        return config;
    };
    if images.directory().is_absolute() {
        return config;
    }
    let Some(base) = skin_file.parent() else {
        return config;
    };
    let directory = base.join(images.directory());
    debug!(directory = directory.display().to_string(); "Glyph images relative to skin file");
    config.with_image_glyphs(ImageGlyphsConfig::new(directory))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_skin(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_argument_wins_even_when_missing() {
        let source = ConfigSource::locate(Some("/no/such/clockface.toml"));
        assert_eq!(
            source,
            ConfigSource::Argument(PathBuf::from("/no/such/clockface.toml"))
        );
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = load_config(Some("/no/such/clockface.toml"));
        assert!(matches!(result, Err(ClockError::Config(msg)) if msg.contains("Missing")));
    }

    #[test]
    fn test_load_explicit_file() {
        let (_dir, path) = write_skin("[skin]\nformat = \"mm:ss\"\n");

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.skin().format(), "mm:ss");
    }

    #[test]
    fn test_invalid_toml_names_file() {
        let (_dir, path) = write_skin("[skin\nformat = ");

        let result = load_config(Some(&path));
        assert!(matches!(
            result,
            Err(ClockError::Config(msg)) if msg.contains("TOML") && msg.contains("config.toml")
        ));
    }

    #[test]
    fn test_invalid_skin_rejected() {
        let (_dir, path) = write_skin("[skin]\nglyph_base_height = -4.0\n");

        let result = load_config(Some(&path));
        assert!(matches!(result, Err(ClockError::Config(msg)) if msg.contains("Invalid skin")));
    }

    #[test]
    fn test_relative_glyph_directory_follows_skin_file() {
        let (dir, path) = write_skin("[image_glyphs]\ndirectory = \"glyphs\"\n");

        let config = load_config(Some(&path)).unwrap();
        let images = config.image_glyphs().unwrap();
        assert_eq!(images.directory(), dir.path().join("glyphs"));
    }

    #[test]
    fn test_absolute_glyph_directory_kept() {
        let glyphs = tempfile::tempdir().unwrap();
        let (_dir, path) = write_skin(&format!(
            "[image_glyphs]\ndirectory = {:?}\n",
            glyphs.path().display().to_string()
        ));

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.image_glyphs().unwrap().directory(), glyphs.path());
    }
}
