//! Clockface Core Types and Rendering Pipeline
//!
//! This crate provides the building blocks a clock skin is rendered with:
//!
//! - **Geometry**: points, rects and affine transforms ([`geometry`] module)
//! - **Colors**: CSS color handling ([`color::Color`])
//! - **Hashing**: deterministic content hashes used as cache keys ([`hash`])
//! - **Draw**: the rasterizing [`draw::Painter`], brushes and pens
//! - **Resources**: drawables and their decorators ([`resource`] module)
//! - **Effects**: texture, background, border and new-surface effects ([`effect`])
//! - **Cache**: the bitmap cache and [`cache::CachedResource`]
//! - **Items**: geometry items, layouts and the item tree ([`item`], [`layout`])

pub mod cache;
pub mod color;
pub mod draw;
pub mod effect;
pub mod geometry;
pub mod hash;
pub mod item;
pub mod layout;
pub mod resource;

mod error;

pub use error::RenderError;
