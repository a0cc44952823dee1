//! Presentation surface contract.
//!
//! The surface runs on its own thread (usually a window event loop) and is
//! implemented by the host. The simulation thread only talks to it through this
//! trait and never shares mutable state with it: frames are handed over as
//! immutable snapshots, input comes back through a channel.

use std::sync::Arc;

use glam::Vec2;
use image::RgbaImage;

use crate::core::config::WindowSettings;
use crate::renderer::instance::Frame;

pub trait Surface: Send + Sync {
    /// Whether the surface is shown. The engine waits for this before starting.
    fn is_visible(&self) -> bool;

    /// Client-area size in pixels.
    fn client_size(&self) -> Vec2;

    /// Apply window geometry, state, chrome, title and visibility.
    fn configure(&self, window: &WindowSettings);

    /// Replace the window icon. `None` restores the default icon.
    fn set_icon(&self, icon: Option<Arc<RgbaImage>>);

    /// A new frame is ready; repaint with it.
    fn present(&self, frame: Arc<Frame>);

    /// The simulation loop has exited.
    fn close(&self);

    /// Bring the window to the foreground.
    fn focus(&self) {}
}
