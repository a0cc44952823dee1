use std::path::Path;
use std::sync::Arc;

use image::{Rgba, RgbaImage};

use crate::error::EngineError;
use crate::systems::text::FontAtlas;

/// Sprite component — defines how an entity appears visually.
///
/// Layers are drawn in a fixed order: source image, fill color, text. The
/// rasterized result is cached and only rebuilt every `delay` seconds (see
/// [`rasterize`](crate::systems::raster::rasterize)).
#[derive(Debug, Clone)]
pub struct Sprite {
    /// Source image, stretched over the whole raster.
    pub image: Option<Arc<RgbaImage>>,
    /// Solid color blended over the image.
    pub fill: Option<Rgba<u8>>,
    /// Text drawn on top; needs both `text_color` and `font`.
    pub text: String,
    pub text_color: Option<Rgba<u8>>,
    pub font: Option<Arc<FontAtlas>>,
    /// Fraction (0..=1) of the window diagonal used as raster resolution.
    pub quality: f32,
    /// Seconds between re-rasterizations.
    pub delay: f32,
    /// Rotation in degrees.
    pub angle: f32,
    /// Flip horizontally.
    pub mirror: bool,
    pub(crate) countdown: f32,
    pub(crate) rendered: Option<Arc<RgbaImage>>,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            image: None,
            fill: None,
            text: String::new(),
            text_color: None,
            font: None,
            quality: 1.0,
            delay: 1.0,
            angle: 0.0,
            mirror: false,
            countdown: 0.0,
            rendered: None,
        }
    }
}

impl Sprite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sprite filled with a single color.
    pub fn solid(color: Rgba<u8>) -> Self {
        Self {
            fill: Some(color),
            ..Default::default()
        }
    }

    /// Decode an image file and use it as the source layer.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let image = image::open(path)?.to_rgba8();
        Ok(Self {
            image: Some(Arc::new(image)),
            ..Default::default()
        })
    }

    /// The most recently rasterized bitmap, if any.
    pub fn rendered(&self) -> Option<&Arc<RgbaImage>> {
        self.rendered.as_ref()
    }

    /// Seconds left until the next re-rasterization.
    pub fn countdown(&self) -> f32 {
        self.countdown
    }

    /// Drop the cached bitmap and make the next tick rasterize again.
    pub fn invalidate(&mut self) {
        self.countdown = 0.0;
        self.rendered = None;
    }

    // -- Builder pattern --

    pub fn with_image(mut self, image: Arc<RgbaImage>) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_fill(mut self, color: Rgba<u8>) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn with_text(
        mut self,
        text: impl Into<String>,
        color: Rgba<u8>,
        font: Arc<FontAtlas>,
    ) -> Self {
        self.text = text.into();
        self.text_color = Some(color);
        self.font = Some(font);
        self
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_mirror(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }
}
