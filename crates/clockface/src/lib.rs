//! Clockface - Skin-driven rendering of a continuously updating clock.
//!
//! A skin turns a format string such as `"hh:mm:ss"` and an instant into a
//! tree of glyph items laid out by linear layouts, decorated with texture,
//! background and border effects, and drawn through a shared bitmap cache.
//!
//! # Overview
//!
//! - [`ClockFace`] - Builds a skin from an [`config::AppConfig`] and renders frames
//! - [`skin::Skin`] - Configuration, observers and the glyph layout builder
//! - [`glyph`] - Font- and image-backed glyph factories
//! - [`ticker::Ticker`] - Fixed-interval frame timing and separator blinking

pub mod config;
pub mod glyph;
pub mod skin;
pub mod ticker;

mod error;

pub use clockface_core::{cache, color, draw, effect, geometry, hash, item, layout, resource};
pub use clockface_format as format;

pub use error::ClockError;

use std::{path::Path, rc::Rc};

use chrono::NaiveDateTime;
use log::{debug, info};

use cache::{BitmapCache, SharedBitmapCache};
use config::AppConfig;
use draw::{Painter, Pixmap};
use glyph::{FontGlyphFactory, GlyphFactoryRef, PixmapGlyphFactory};
use resource::ResourceRef;
use skin::Skin;
use ticker::Ticker;

/// A configured clock face.
///
/// # Examples
///
/// ```rust,no_run
/// use chrono::Local;
/// use clockface::{ClockFace, config::AppConfig};
///
/// let face = ClockFace::new(AppConfig::default()).expect("Failed to load skin");
/// let frame = face.render(&Local::now().naive_local()).expect("Failed to render");
/// assert!(frame.width() > 0);
/// ```
#[derive(Debug)]
pub struct ClockFace {
    config: AppConfig,
    skin: Skin,
    ticker: Ticker,
}

impl ClockFace {
    /// Creates a clock face, loading glyphs from the configured font or
    /// image directory.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including skin, font and render settings
    ///
    /// # Errors
    ///
    /// Returns an error when glyphs cannot be loaded or the skin
    /// configuration is invalid.
    pub fn new(config: AppConfig) -> Result<Self, ClockError> {
        let factory: GlyphFactoryRef = match config.image_glyphs() {
            Some(images) => Rc::new(PixmapGlyphFactory::load_dir(images.directory())?),
            None => Rc::new(FontGlyphFactory::new(
                config.font(),
                config.render().device_pixel_ratio(),
            )?),
        };
        Self::with_factory(config, factory)
    }

    /// Creates a clock face that draws glyphs from `factory`.
    ///
    /// # Errors
    ///
    /// Returns an error when the skin configuration is invalid.
    pub fn with_factory(config: AppConfig, factory: GlyphFactoryRef) -> Result<Self, ClockError> {
        let render = config.render();
        let cache: SharedBitmapCache = BitmapCache::shared(render.cache_capacity());
        let mut skin = Skin::new(config.skin().clone(), factory, cache)?;
        skin.set_debug_overlay(render.debug_overlay());
        let ticker = Ticker::from_millis(render.tick_interval_ms());

        info!(
            format = config.skin().format(),
            cache_capacity = render.cache_capacity();
            "Clock face ready"
        );
        Ok(Self {
            config,
            skin,
            ticker,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn skin(&self) -> &Skin {
        &self.skin
    }

    pub fn skin_mut(&mut self) -> &mut Skin {
        &mut self.skin
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    /// Renders the frame for `time` into a new pixmap.
    ///
    /// The pixmap covers the laid-out clock face at the configured device
    /// pixel ratio.
    pub fn render(&self, time: &NaiveDateTime) -> Result<Pixmap, ClockError> {
        self.paint(&self.skin.process(time))
    }

    /// Renders the frame for `time` and writes it as a PNG file.
    pub fn render_png(
        &self,
        time: &NaiveDateTime,
        path: impl AsRef<Path>,
    ) -> Result<(), ClockError> {
        let pixmap = self.render(time)?;
        pixmap
            .save_png(path.as_ref())
            .map_err(|err| ClockError::Image(format!("{}: {err}", path.as_ref().display())))
    }

    /// Advances the separator blink and renders the frame for `time`.
    pub fn tick(&mut self, time: &NaiveDateTime) -> Result<Pixmap, ClockError> {
        let resource = self.ticker.tick(&mut self.skin, time);
        self.paint(&resource)
    }

    fn paint(&self, resource: &ResourceRef) -> Result<Pixmap, ClockError> {
        let rect = resource.rect();
        let mut painter = Painter::for_rect(rect, self.config.render().device_pixel_ratio())?;
        resource.draw(&mut painter);
        debug!(
            width = painter.width(),
            height = painter.height();
            "Frame rendered"
        );
        Ok(painter.into_pixmap())
    }
}
