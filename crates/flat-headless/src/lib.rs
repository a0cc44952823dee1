//! Headless host for flat-engine.
//!
//! Provides a [`Surface`](flat_engine::Surface) that keeps frames in memory and
//! can paint them into an image, an audio backend that plays nothing, and a small
//! demo scene.

pub mod audio;
pub mod demo;
pub mod paint;
pub mod surface;

pub use audio::NullAudio;
pub use paint::paint_frame;
pub use surface::HeadlessSurface;
