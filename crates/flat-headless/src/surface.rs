use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use flat_engine::{Frame, FrameSlot, Surface, WindowSettings};
use glam::Vec2;
use image::RgbaImage;

/// A surface with no window behind it. Frames are kept in a [`FrameSlot`] and
/// window requests are recorded for inspection.
pub struct HeadlessSurface {
    size: Vec2,
    visible: AtomicBool,
    closed: AtomicBool,
    presented: AtomicU64,
    frames: FrameSlot,
    window: Mutex<Option<WindowSettings>>,
    icon: Mutex<Option<Arc<RgbaImage>>>,
}

impl HeadlessSurface {
    /// A visible surface with a fixed client area of `width`×`height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Vec2::new(width as f32, height as f32),
            visible: AtomicBool::new(true),
            closed: AtomicBool::new(false),
            presented: AtomicU64::new(0),
            frames: FrameSlot::new(),
            window: Mutex::new(None),
            icon: Mutex::new(None),
        }
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Release);
    }

    /// Most recent frame handed over by the engine.
    pub fn latest_frame(&self) -> Option<Arc<Frame>> {
        self.frames.latest()
    }

    /// Number of frames presented so far.
    pub fn presented(&self) -> u64 {
        self.presented.load(Ordering::Acquire)
    }

    /// Window settings from the last `configure` call.
    pub fn window(&self) -> Option<WindowSettings> {
        self.window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn icon(&self) -> Option<Arc<RgbaImage>> {
        self.icon
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Surface for HeadlessSurface {
    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    fn client_size(&self) -> Vec2 {
        self.size
    }

    fn configure(&self, window: &WindowSettings) {
        log::debug!("Window configured: {:?} '{}'", window.state, window.title);
        *self.window.lock().unwrap_or_else(PoisonError::into_inner) = Some(window.clone());
    }

    fn set_icon(&self, icon: Option<Arc<RgbaImage>>) {
        *self.icon.lock().unwrap_or_else(PoisonError::into_inner) = icon;
    }

    fn present(&self, frame: Arc<Frame>) {
        self.frames.publish(frame);
        self.presented.fetch_add(1, Ordering::AcqRel);
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
