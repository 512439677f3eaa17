//! Clock skins.
//!
//! A [`Skin`] owns a [`SkinConfig`], a glyph factory and a shared bitmap
//! cache. [`Skin::process`] turns an instant into a drawable resource by
//! replaying the format string through the glyph layout builder.
//!
//! # Change notification
//!
//! Observers registered with [`Skin::subscribe`] are told once per effective
//! configuration change. Setters that would produce an invalid or unchanged
//! configuration leave the skin as it was and notify nobody. Batch several
//! edits with [`Skin::update`] to notify once for all of them.
//!
//! # Separator blinking
//!
//! [`Skin::animate_separator`] toggles the separator's visibility when
//! separator animation is enabled. Disabling animation shows the separator
//! again.

mod builder;

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use chrono::NaiveDateTime;
use log::{debug, trace, warn};

use clockface_core::{
    cache::SharedBitmapCache,
    effect::{
        BackgroundEffect, BorderEffect, CompositeEffect, EffectRef, EffectResource,
        NewSurfaceEffect, TextureEffect,
    },
    geometry::Orientation,
    hash::ContentHash,
    item::TreeResource,
    layout::Alignment,
    resource::{DebugOverlay, ResourceRef},
};
use clockface_format::TimeFormat;

use crate::{
    ClockError,
    config::{BrushConfig, PenConfig, SkinConfig, TransformConfig},
    glyph::GlyphFactoryRef,
};

use builder::GlyphLayoutBuilder;

/// Receives skin change notifications.
pub trait SkinObserver {
    /// Called once after each effective configuration change.
    fn skin_changed(&self);
}

/// A configuration resolved into the objects the builder uses.
#[derive(Debug)]
struct CompiledSkin {
    format: TimeFormat,
    element_effect: Option<EffectRef>,
    layout_effect: Option<EffectRef>,
    stamp: ContentHash,
}

impl CompiledSkin {
    fn compile(config: &SkinConfig) -> Result<Self, ClockError> {
        config.validate()?;
        let format = TimeFormat::parse(config.format())?;

        let mut element = CompositeEffect::new();
        let mut layout = CompositeEffect::new();

        if let Some(texture) = config.texture() {
            let target = if config.texture_per_element() {
                &mut element
            } else {
                &mut layout
            };
            target.push(Rc::new(TextureEffect::new(
                texture.to_brush()?,
                config.texture_stretch(),
            )));
            target.push(Rc::new(NewSurfaceEffect::new()));
        }
        if let Some(background) = config.background() {
            let target = if config.background_per_element() {
                &mut element
            } else {
                &mut layout
            };
            target.push(Rc::new(BackgroundEffect::new(
                background.to_brush()?,
                config.background_stretch(),
            )));
        }
        if let Some(border) = config.border() {
            layout.push(Rc::new(BorderEffect::new(border.to_pen()?)));
        }

        Ok(Self {
            format,
            element_effect: non_empty(element),
            layout_effect: non_empty(layout),
            stamp: config.content_hash(),
        })
    }
}

fn non_empty(effect: CompositeEffect) -> Option<EffectRef> {
    (!effect.is_empty()).then(|| Rc::new(effect) as EffectRef)
}

/// A clock skin: configuration, glyphs and blink state.
pub struct Skin {
    config: SkinConfig,
    compiled: CompiledSkin,
    factory: GlyphFactoryRef,
    cache: SharedBitmapCache,
    observers: RefCell<Vec<Weak<dyn SkinObserver>>>,
    separator_visible: bool,
    debug_overlay: bool,
}

impl Skin {
    /// Creates a skin.
    ///
    /// # Arguments
    ///
    /// * `config` - Format string, layout options and effects
    /// * `factory` - Source of glyph resources
    /// * `cache` - Bitmap cache shared by every glyph of the skin
    ///
    /// # Errors
    ///
    /// Returns an error when the format string, a color or an image of the
    /// configuration is invalid.
    pub fn new(
        config: SkinConfig,
        factory: GlyphFactoryRef,
        cache: SharedBitmapCache,
    ) -> Result<Self, ClockError> {
        let compiled = CompiledSkin::compile(&config)?;
        debug!(format = config.format(); "Skin created");
        Ok(Self {
            config,
            compiled,
            factory,
            cache,
            observers: RefCell::new(Vec::new()),
            separator_visible: true,
            debug_overlay: false,
        })
    }

    pub fn config(&self) -> &SkinConfig {
        &self.config
    }

    /// The parsed format string
    pub fn format(&self) -> &TimeFormat {
        &self.compiled.format
    }

    pub fn factory(&self) -> &GlyphFactoryRef {
        &self.factory
    }

    pub fn cache(&self) -> &SharedBitmapCache {
        &self.cache
    }

    /// Configuration hash stamped onto every glyph's cache key
    pub fn stamp(&self) -> ContentHash {
        self.compiled.stamp
    }

    pub fn is_separator_visible(&self) -> bool {
        self.separator_visible
    }

    pub fn debug_overlay(&self) -> bool {
        self.debug_overlay
    }

    /// Registers an observer.
    ///
    /// The skin holds observers weakly; dropped observers are forgotten.
    pub fn subscribe(&self, observer: Weak<dyn SkinObserver>) {
        self.observers.borrow_mut().push(observer);
    }

    /// Number of live observers
    pub fn observer_count(&self) -> usize {
        let mut observers = self.observers.borrow_mut();
        observers.retain(|observer| observer.strong_count() > 0);
        observers.len()
    }

    fn notify(&self) {
        let observers: Vec<Rc<dyn SkinObserver>> = {
            let mut observers = self.observers.borrow_mut();
            observers.retain(|observer| observer.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };
        trace!(observers = observers.len(); "Notifying skin observers");
        for observer in observers {
            observer.skin_changed();
        }
    }

    /// Applies several configuration edits at once.
    ///
    /// Observers are notified once if the result differs from the current
    /// configuration. An invalid result is rejected and the current
    /// configuration is kept.
    ///
    /// Returns whether the configuration changed.
    pub fn update(&mut self, edit: impl FnOnce(&mut SkinConfig)) -> bool {
        let mut config = self.config.clone();
        edit(&mut config);
        if config == self.config {
            return false;
        }

        let compiled = match CompiledSkin::compile(&config) {
            Ok(compiled) => compiled,
            Err(err) => {
                warn!(err:%; "Rejected skin configuration");
                return false;
            }
        };

        if !config.separator_animation() {
            self.separator_visible = true;
        }
        self.config = config;
        self.compiled = compiled;
        self.notify();
        true
    }

    pub fn set_format(&mut self, format: &str) -> bool {
        self.update(|config| config.set_format(format))
    }

    pub fn set_orientation(&mut self, orientation: Orientation) -> bool {
        self.update(|config| config.set_orientation(orientation))
    }

    pub fn set_spacing(&mut self, spacing: f32) -> bool {
        self.update(|config| config.set_spacing(spacing))
    }

    pub fn set_texture(
        &mut self,
        texture: Option<BrushConfig>,
        stretch: bool,
        per_element: bool,
    ) -> bool {
        self.update(|config| config.set_texture(texture, stretch, per_element))
    }

    pub fn set_background(
        &mut self,
        background: Option<BrushConfig>,
        stretch: bool,
        per_element: bool,
    ) -> bool {
        self.update(|config| config.set_background(background, stretch, per_element))
    }

    pub fn set_border(&mut self, border: Option<PenConfig>) -> bool {
        self.update(|config| config.set_border(border))
    }

    pub fn set_custom_separators(&mut self, enabled: bool, separators: Vec<char>) -> bool {
        self.update(|config| config.set_custom_separators(enabled, separators))
    }

    pub fn set_ignore_advance(&mut self, x: bool, y: bool) -> bool {
        self.update(|config| config.set_ignore_advance(x, y))
    }

    pub fn set_glyph_base_height(&mut self, height: Option<f32>) -> bool {
        self.update(|config| config.set_glyph_base_height(height))
    }

    pub fn set_respect_line_spacing(&mut self, respect: bool) -> bool {
        self.update(|config| config.set_respect_line_spacing(respect))
    }

    pub fn set_line_alignment(&mut self, alignment: Alignment) -> bool {
        self.update(|config| config.set_line_alignment(alignment))
    }

    pub fn set_token_transform(
        &mut self,
        pattern: &str,
        transform: Option<TransformConfig>,
    ) -> bool {
        self.update(|config| config.set_token_transform(pattern, transform))
    }

    /// Enables or disables separator blinking; disabling shows the separator.
    pub fn set_separator_animation_enabled(&mut self, enabled: bool) -> bool {
        self.update(|config| config.set_separator_animation(enabled))
    }

    /// Replaces the glyph factory and notifies observers.
    pub fn set_glyph_factory(&mut self, factory: GlyphFactoryRef) {
        self.factory = factory;
        self.notify();
    }

    /// Outlines every glyph and the whole layout when enabled.
    pub fn set_debug_overlay(&mut self, enabled: bool) {
        if self.debug_overlay != enabled {
            self.debug_overlay = enabled;
            self.notify();
        }
    }

    /// Advances the separator blink by one step.
    ///
    /// Does nothing while separator animation is disabled.
    pub fn animate_separator(&mut self) {
        if self.config.separator_animation() {
            self.separator_visible = !self.separator_visible;
            trace!(visible = self.separator_visible; "Separator toggled");
        }
    }

    /// Builds the glyph layout of `time` without layout-level effects.
    pub fn layout(&self, time: &NaiveDateTime) -> TreeResource {
        let mut builder = GlyphLayoutBuilder::new(self);
        self.compiled.format.visit(time, &mut builder);
        builder.finish()
    }

    /// Builds the drawable clock face for `time`.
    ///
    /// Every call builds a fresh tree; glyph bitmaps are shared through the
    /// cache.
    pub fn process(&self, time: &NaiveDateTime) -> ResourceRef {
        let mut resource: ResourceRef = Rc::new(self.layout(time));
        if let Some(effect) = &self.compiled.layout_effect {
            resource = Rc::new(EffectResource::new(resource, Rc::clone(effect)));
        }
        if self.debug_overlay {
            resource = Rc::new(DebugOverlay::new(resource));
        }
        resource
    }

    fn element_effect(&self) -> Option<&EffectRef> {
        self.compiled.element_effect.as_ref()
    }
}

impl fmt::Debug for Skin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Skin")
            .field("config", &self.config)
            .field("factory", &self.factory)
            .field("separator_visible", &self.separator_visible)
            .field("debug_overlay", &self.debug_overlay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use clockface_core::{cache::BitmapCache, draw::Pixmap};

    use super::*;
    use crate::glyph::PixmapGlyphFactory;

    #[derive(Default)]
    struct Counter(Cell<u32>);

    impl SkinObserver for Counter {
        fn skin_changed(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn skin(format: &str) -> Skin {
        let mut config = SkinConfig::default();
        config.set_format(format);
        let factory = PixmapGlyphFactory::new().with_glyph('1', Pixmap::new(4, 8).unwrap());
        Skin::new(config, Rc::new(factory), BitmapCache::shared(16)).unwrap()
    }

    #[test]
    fn test_invalid_initial_config() {
        let mut config = SkinConfig::default();
        config.set_format("");
        let result = Skin::new(
            config,
            Rc::new(PixmapGlyphFactory::new()),
            BitmapCache::shared(1),
        );
        assert!(matches!(result, Err(ClockError::Format(_))));
    }

    #[test]
    fn test_rejected_setter_keeps_config() {
        let mut skin = skin("hh:mm");
        let counter = Rc::new(Counter::default());
        skin.subscribe(Rc::downgrade(&counter) as Weak<dyn SkinObserver>);

        assert!(!skin.set_format("'open"));
        assert!(!skin.set_spacing(f32::NAN));
        assert_eq!(skin.config().format(), "hh:mm");
        assert_eq!(counter.0.get(), 0);
    }

    #[test]
    fn test_unchanged_value_does_not_notify() {
        let mut skin = skin("hh:mm");
        let counter = Rc::new(Counter::default());
        skin.subscribe(Rc::downgrade(&counter) as Weak<dyn SkinObserver>);

        assert!(!skin.set_format("hh:mm"));
        assert!(skin.set_format("mm:ss"));
        assert_eq!(counter.0.get(), 1);
    }

    #[test]
    fn test_update_notifies_once() {
        let mut skin = skin("hh:mm");
        let counter = Rc::new(Counter::default());
        skin.subscribe(Rc::downgrade(&counter) as Weak<dyn SkinObserver>);

        skin.update(|config| {
            config.set_spacing(2.0);
            config.set_orientation(Orientation::Vertical);
            config.set_ignore_advance(true, false);
        });
        assert_eq!(counter.0.get(), 1);
    }

    #[test]
    fn test_dropped_observer_is_forgotten() {
        let skin = skin("hh:mm");
        let counter = Rc::new(Counter::default());
        skin.subscribe(Rc::downgrade(&counter) as Weak<dyn SkinObserver>);
        assert_eq!(skin.observer_count(), 1);

        drop(counter);
        assert_eq!(skin.observer_count(), 0);
    }

    #[test]
    fn test_stamp_follows_config() {
        let mut skin = skin("hh:mm");
        let before = skin.stamp();
        skin.set_spacing(4.0);
        assert_ne!(skin.stamp(), before);
    }

    #[test]
    fn test_separator_blink() {
        let mut skin = skin("hh:mm");
        assert!(skin.is_separator_visible());
        skin.animate_separator();
        assert!(!skin.is_separator_visible());
        skin.animate_separator();
        assert!(skin.is_separator_visible());
    }

    #[test]
    fn test_disabling_animation_shows_separator() {
        let mut skin = skin("hh:mm");
        skin.animate_separator();
        assert!(!skin.is_separator_visible());

        assert!(skin.set_separator_animation_enabled(false));
        assert!(skin.is_separator_visible());

        skin.animate_separator();
        assert!(skin.is_separator_visible());
    }

    #[test]
    fn test_layout_effects_compiled() {
        let mut skin = skin("hh:mm");
        assert!(skin.compiled.layout_effect.is_none());
        assert!(skin.element_effect().is_none());

        skin.set_texture(Some(BrushConfig::solid("red")), false, true);
        skin.set_border(Some(PenConfig::new("black", 1.0)));

        let element = skin.element_effect().unwrap();
        let layout = skin.compiled.layout_effect.as_ref().unwrap();
        assert!(element.content_hash().is_valid());
        assert!(layout.content_hash().is_valid());
    }
}
