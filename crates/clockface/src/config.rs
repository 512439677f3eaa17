//! Configuration types for clock faces.
//!
//! Every record implements [`serde::Deserialize`] and [`serde::Serialize`] so a
//! configuration can be loaded from TOML and written back unchanged. Missing
//! fields fall back to their defaults.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration: skin, font and render sections.
//! - [`SkinConfig`] - Format string, layout options and effects of a skin.
//! - [`FontConfig`] - Font used by the font-backed glyph factory.
//! - [`ImageGlyphsConfig`] - Directory of glyph images, used instead of a font.
//! - [`RenderConfig`] - Device pixel ratio, cache size and timing.
//!
//! # Example
//!
//! ```
//! # use clockface::config::AppConfig;
//! let config: AppConfig = toml::from_str(r#"
//!     [skin]
//!     format = "hh:mm:ss"
//!     spacing = 2.0
//! "#).unwrap();
//! assert_eq!(config.skin().format(), "hh:mm:ss");
//! assert_eq!(config.render().tick_interval_ms(), 500);
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use clockface_core::{
    color::Color,
    draw::{Brush, ColorStop, Pen, Pixmap},
    geometry::{Orientation, Point, Transform},
    hash::{ContentHash, ContentHasher},
    layout::Alignment,
};

use crate::ClockError;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    skin: SkinConfig,

    #[serde(default)]
    font: FontConfig,

    /// Glyph images; when set they replace the font.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_glyphs: Option<ImageGlyphsConfig>,

    #[serde(default)]
    render: RenderConfig,
}

impl AppConfig {
    pub fn new(skin: SkinConfig, font: FontConfig, render: RenderConfig) -> Self {
        Self {
            skin,
            font,
            image_glyphs: None,
            render,
        }
    }

    /// Replaces the skin section (builder style).
    pub fn with_skin(mut self, skin: SkinConfig) -> Self {
        self.skin = skin;
        self
    }

    /// Uses glyph images instead of the font (builder style).
    pub fn with_image_glyphs(mut self, image_glyphs: ImageGlyphsConfig) -> Self {
        self.image_glyphs = Some(image_glyphs);
        self
    }

    pub fn skin(&self) -> &SkinConfig {
        &self.skin
    }

    pub fn font(&self) -> &FontConfig {
        &self.font
    }

    pub fn image_glyphs(&self) -> Option<&ImageGlyphsConfig> {
        self.image_glyphs.as_ref()
    }

    pub fn render(&self) -> &RenderConfig {
        &self.render
    }
}

/// A brush as written in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BrushConfig {
    Solid {
        color: String,
    },
    /// Endpoints are relative to the target when the brush is stretched.
    LinearGradient {
        start: [f32; 2],
        end: [f32; 2],
        stops: Vec<ColorStopConfig>,
    },
    /// A PNG image, tiled or stretched over the target.
    Image {
        path: PathBuf,
    },
}

/// One gradient stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStopConfig {
    offset: f32,
    color: String,
}

impl ColorStopConfig {
    pub fn new(offset: f32, color: impl Into<String>) -> Self {
        Self {
            offset,
            color: color.into(),
        }
    }
}

impl BrushConfig {
    pub fn solid(color: impl Into<String>) -> Self {
        Self::Solid {
            color: color.into(),
        }
    }

    /// Resolves colors and loads images.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Config`] for unparsable colors or an empty
    /// gradient, and [`ClockError::Image`] when the image cannot be decoded.
    pub fn to_brush(&self) -> Result<Brush, ClockError> {
        match self {
            Self::Solid { color } => Ok(Brush::solid(parse_color(color)?)),
            Self::LinearGradient { start, end, stops } => {
                if stops.is_empty() {
                    return Err(ClockError::Config(
                        "Linear gradient needs at least one stop".to_string(),
                    ));
                }
                let stops = stops
                    .iter()
                    .map(|stop| Ok(ColorStop::new(stop.offset, parse_color(&stop.color)?)))
                    .collect::<Result<Vec<_>, ClockError>>()?;
                Ok(Brush::LinearGradient {
                    start: Point::new(start[0], start[1]),
                    end: Point::new(end[0], end[1]),
                    stops,
                })
            }
            Self::Image { path } => Ok(Brush::Pattern(load_png(path)?.into())),
        }
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        match self {
            Self::Solid { color } => {
                hasher.write("solid").write(color);
            }
            Self::LinearGradient { start, end, stops } => {
                hasher.write("linear-gradient");
                for value in start.iter().chain(end) {
                    hasher.write_f32(*value);
                }
                for stop in stops {
                    hasher.write_f32(stop.offset).write(&stop.color);
                }
            }
            Self::Image { path } => {
                hasher.write("image").write(path);
            }
        }
    }
}

/// Loads a PNG file into a pixmap.
pub(crate) fn load_png(path: &Path) -> Result<Pixmap, ClockError> {
    Pixmap::load_png(path)
        .map_err(|err| ClockError::Image(format!("{}: {err}", path.display())))
}

fn parse_color(value: &str) -> Result<Color, ClockError> {
    Color::new(value).map_err(|err| ClockError::Config(format!("Invalid color `{value}`: {err}")))
}

/// An outline as written in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenConfig {
    color: String,
    #[serde(default = "default_pen_width")]
    width: f32,
}

fn default_pen_width() -> f32 {
    1.0
}

impl PenConfig {
    pub fn new(color: impl Into<String>, width: f32) -> Self {
        Self {
            color: color.into(),
            width,
        }
    }

    pub fn to_pen(&self) -> Result<Pen, ClockError> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(ClockError::Config(format!(
                "Invalid border width {}",
                self.width
            )));
        }
        Ok(Pen::new(parse_color(&self.color)?, self.width))
    }
}

/// Transform applied to every glyph of one format token.
///
/// Components are applied in order: scale, shear, rotation (degrees), then
/// translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    scale_x: f32,
    scale_y: f32,
    shear_x: f32,
    shear_y: f32,
    rotation: f32,
    dx: f32,
    dy: f32,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            shear_x: 0.0,
            shear_y: 0.0,
            rotation: 0.0,
            dx: 0.0,
            dy: 0.0,
        }
    }
}

impl TransformConfig {
    /// A uniform or non-uniform scale.
    pub fn scale(scale_x: f32, scale_y: f32) -> Self {
        Self {
            scale_x,
            scale_y,
            ..Self::default()
        }
    }

    /// Adds a rotation in degrees (builder style).
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    /// Adds a translation (builder style).
    pub fn with_offset(mut self, dx: f32, dy: f32) -> Self {
        self.dx = dx;
        self.dy = dy;
        self
    }

    pub fn to_transform(&self) -> Transform {
        Transform::scale(self.scale_x, self.scale_y)
            .then(Transform::shear(self.shear_x, self.shear_y))
            .then(Transform::rotation(self.rotation))
            .then(Transform::translation(self.dx, self.dy))
    }

    fn is_valid(&self) -> bool {
        [
            self.scale_x,
            self.scale_y,
            self.shear_x,
            self.shear_y,
            self.rotation,
            self.dx,
            self.dy,
        ]
        .iter()
        .all(|value| value.is_finite())
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        for value in [
            self.scale_x,
            self.scale_y,
            self.shear_x,
            self.shear_y,
            self.rotation,
            self.dx,
            self.dy,
        ] {
            hasher.write_f32(value);
        }
    }
}

/// The options of a skin.
///
/// [`SkinConfig::content_hash`] summarizes every option that affects
/// rendered pixels; it is stamped onto each glyph's cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinConfig {
    format: String,
    orientation: Orientation,
    spacing: f32,

    texture: Option<BrushConfig>,
    texture_stretch: bool,
    texture_per_element: bool,

    background: Option<BrushConfig>,
    background_stretch: bool,
    background_per_element: bool,

    border: Option<PenConfig>,

    use_custom_separators: bool,
    custom_separators: Vec<char>,

    ignore_advance_x: bool,
    ignore_advance_y: bool,

    glyph_base_height: Option<f32>,
    respect_line_spacing: bool,
    line_alignment: Alignment,

    token_transforms: IndexMap<String, TransformConfig>,

    separator_animation: bool,
}

impl Default for SkinConfig {
    fn default() -> Self {
        Self {
            format: "hh:mm".to_string(),
            orientation: Orientation::Horizontal,
            spacing: 0.0,
            texture: None,
            texture_stretch: false,
            texture_per_element: false,
            background: None,
            background_stretch: false,
            background_per_element: false,
            border: None,
            use_custom_separators: false,
            custom_separators: Vec::new(),
            ignore_advance_x: false,
            ignore_advance_y: false,
            glyph_base_height: None,
            respect_line_spacing: true,
            line_alignment: Alignment::default(),
            token_transforms: IndexMap::new(),
            separator_animation: true,
        }
    }
}

impl SkinConfig {
    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn set_format(&mut self, format: impl Into<String>) {
        self.format = format.into();
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn set_spacing(&mut self, spacing: f32) {
        self.spacing = spacing;
    }

    pub fn texture(&self) -> Option<&BrushConfig> {
        self.texture.as_ref()
    }

    pub fn texture_stretch(&self) -> bool {
        self.texture_stretch
    }

    pub fn texture_per_element(&self) -> bool {
        self.texture_per_element
    }

    /// Sets the texture brush, whether it is stretched, and whether it is
    /// applied to each glyph or to the whole layout.
    pub fn set_texture(&mut self, texture: Option<BrushConfig>, stretch: bool, per_element: bool) {
        self.texture = texture;
        self.texture_stretch = stretch;
        self.texture_per_element = per_element;
    }

    pub fn background(&self) -> Option<&BrushConfig> {
        self.background.as_ref()
    }

    pub fn background_stretch(&self) -> bool {
        self.background_stretch
    }

    pub fn background_per_element(&self) -> bool {
        self.background_per_element
    }

    /// Sets the background brush, whether it is stretched, and whether it is
    /// applied to each glyph or to the whole layout.
    pub fn set_background(
        &mut self,
        background: Option<BrushConfig>,
        stretch: bool,
        per_element: bool,
    ) {
        self.background = background;
        self.background_stretch = stretch;
        self.background_per_element = per_element;
    }

    /// Outline drawn around the whole layout
    pub fn border(&self) -> Option<&PenConfig> {
        self.border.as_ref()
    }

    pub fn set_border(&mut self, border: Option<PenConfig>) {
        self.border = border;
    }

    pub fn use_custom_separators(&self) -> bool {
        self.use_custom_separators
    }

    /// Replacement characters, indexed by separator occurrence
    pub fn custom_separators(&self) -> &[char] {
        &self.custom_separators
    }

    pub fn set_custom_separators(&mut self, enabled: bool, separators: Vec<char>) {
        self.use_custom_separators = enabled;
        self.custom_separators = separators;
    }

    pub fn ignore_advance_x(&self) -> bool {
        self.ignore_advance_x
    }

    pub fn ignore_advance_y(&self) -> bool {
        self.ignore_advance_y
    }

    pub fn ignore_advance(&self, axis: Orientation) -> bool {
        match axis {
            Orientation::Horizontal => self.ignore_advance_x,
            Orientation::Vertical => self.ignore_advance_y,
        }
    }

    pub fn set_ignore_advance(&mut self, x: bool, y: bool) {
        self.ignore_advance_x = x;
        self.ignore_advance_y = y;
    }

    /// Height every glyph is scaled to, measured by the factory's line height
    pub fn glyph_base_height(&self) -> Option<f32> {
        self.glyph_base_height
    }

    pub fn set_glyph_base_height(&mut self, height: Option<f32>) {
        self.glyph_base_height = height;
    }

    /// Whether lines keep the factory's nominal ascent and descent
    pub fn respect_line_spacing(&self) -> bool {
        self.respect_line_spacing
    }

    pub fn set_respect_line_spacing(&mut self, respect: bool) {
        self.respect_line_spacing = respect;
    }

    /// Placement of each line inside a multi-line layout
    pub fn line_alignment(&self) -> Alignment {
        self.line_alignment
    }

    pub fn set_line_alignment(&mut self, alignment: Alignment) {
        self.line_alignment = alignment;
    }

    /// Per-token transforms, keyed by field pattern (e.g. `"ss"`)
    pub fn token_transforms(&self) -> &IndexMap<String, TransformConfig> {
        &self.token_transforms
    }

    pub fn token_transform(&self, pattern: &str) -> Option<&TransformConfig> {
        self.token_transforms.get(pattern)
    }

    /// Sets or (with `None`) removes the transform of a token.
    pub fn set_token_transform(
        &mut self,
        pattern: impl Into<String>,
        transform: Option<TransformConfig>,
    ) {
        let pattern = pattern.into();
        match transform {
            Some(transform) => {
                self.token_transforms.insert(pattern, transform);
            }
            None => {
                self.token_transforms.shift_remove(&pattern);
            }
        }
    }

    pub fn separator_animation(&self) -> bool {
        self.separator_animation
    }

    pub fn set_separator_animation(&mut self, enabled: bool) {
        self.separator_animation = enabled;
    }

    /// Checks the numeric options.
    ///
    /// Colors, brushes and the format string are checked when the skin
    /// compiles the configuration.
    pub fn validate(&self) -> Result<(), ClockError> {
        if !self.spacing.is_finite() {
            return Err(ClockError::Config(format!(
                "Invalid spacing {}",
                self.spacing
            )));
        }
        if let Some(height) = self.glyph_base_height.filter(|h| !(h.is_finite() && *h > 0.0)) {
            return Err(ClockError::Config(format!(
                "Invalid glyph base height {height}"
            )));
        }
        if let Some((pattern, _)) = self
            .token_transforms
            .iter()
            .find(|(_, transform)| !transform.is_valid())
        {
            return Err(ClockError::Config(format!(
                "Invalid transform for token `{pattern}`"
            )));
        }
        Ok(())
    }

    /// Summary of every option that affects rendered pixels.
    ///
    /// Token transforms are hashed in key order, so the order they were
    /// written in does not matter. Separator animation only changes which
    /// glyph is shown and is left out.
    pub fn content_hash(&self) -> ContentHash {
        let mut hasher = ContentHasher::new();
        hasher
            .write(&self.format)
            .write(&self.orientation)
            .write_f32(self.spacing);

        hasher.write(&self.texture.is_some());
        if let Some(texture) = &self.texture {
            texture.hash_into(&mut hasher);
        }
        hasher
            .write(&self.texture_stretch)
            .write(&self.texture_per_element);

        hasher.write(&self.background.is_some());
        if let Some(background) = &self.background {
            background.hash_into(&mut hasher);
        }
        hasher
            .write(&self.background_stretch)
            .write(&self.background_per_element);

        hasher.write(&self.border.is_some());
        if let Some(border) = &self.border {
            hasher.write(&border.color).write_f32(border.width);
        }

        hasher
            .write(&self.use_custom_separators)
            .write(&self.custom_separators)
            .write(&self.ignore_advance_x)
            .write(&self.ignore_advance_y)
            .write(&self.glyph_base_height.map(f32::to_bits))
            .write(&self.respect_line_spacing)
            .write(&self.line_alignment);

        let mut patterns: Vec<&String> = self.token_transforms.keys().collect();
        patterns.sort();
        for pattern in patterns {
            hasher.write(pattern);
            if let Some(transform) = self.token_transforms.get(pattern) {
                transform.hash_into(&mut hasher);
            }
        }
        hasher.finish()
    }
}

/// Font used to draw glyphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Family name, or one of `sans-serif`, `serif`, `monospace`
    family: String,
    /// Size in logical pixels
    size: f32,
    color: String,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            size: 48.0,
            color: "#1e1e1e".to_string(),
        }
    }
}

impl FontConfig {
    pub fn new(family: impl Into<String>, size: f32, color: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            size,
            color: color.into(),
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Returns the parsed glyph color.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn color(&self) -> Result<Color, ClockError> {
        parse_color(&self.color)
    }
}

/// Glyph images loaded from a directory.
///
/// Files are PNG images named after the character they show (`0.png`,
/// `a.png`, ...). The separator uses `s1.png`; an optional `s2.png` is the
/// blank glyph shown while the separator blinks off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGlyphsConfig {
    directory: PathBuf,
}

impl ImageGlyphsConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// Output and runtime options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    device_pixel_ratio: f32,
    /// Number of bitmaps kept by the cache; `0` disables caching
    cache_capacity: usize,
    debug_overlay: bool,
    tick_interval_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            cache_capacity: 256,
            debug_overlay: false,
            tick_interval_ms: 500,
        }
    }
}

impl RenderConfig {
    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    pub fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn debug_overlay(&self) -> bool {
        self.debug_overlay
    }

    pub fn with_debug_overlay(mut self, enabled: bool) -> Self {
        self.debug_overlay = enabled;
        self
    }

    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }
}
