use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::components::shape::Shape;

/// Window state as exchanged with the presentation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindowState {
    #[default]
    Normal,
    Minimized,
    Maximized,
}

impl WindowState {
    /// Small-integer encoding: 0 = normal, 1 = minimized, 2 = maximized.
    pub fn code(self) -> u8 {
        match self {
            WindowState::Normal => 0,
            WindowState::Minimized => 1,
            WindowState::Maximized => 2,
        }
    }

    /// Decode; unknown codes fall back to `Normal`.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => WindowState::Minimized,
            2 => WindowState::Maximized,
            _ => WindowState::Normal,
        }
    }
}

/// Window chrome and geometry requested from the presentation surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawWindowSettings")]
pub struct WindowSettings {
    /// Window rectangle in screen-normalized units (screen center at origin,
    /// 1.0 = full screen extent).
    pub shape: Shape,
    pub state: WindowState,
    controllable: bool,
    sizeable: bool,
    pub visible: bool,
    pub title: String,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            shape: Shape::new(Vec2::ZERO, Vec2::splat(0.5)),
            state: WindowState::Normal,
            controllable: true,
            sizeable: true,
            visible: true,
            title: String::new(),
        }
    }
}

impl WindowSettings {
    /// Whether the window shows its control box.
    pub fn controllable(&self) -> bool {
        self.controllable
    }

    /// Whether the window can be resized by the user.
    pub fn sizeable(&self) -> bool {
        self.sizeable
    }

    /// Toggling control also toggles resizing.
    pub fn set_controllable(&mut self, controllable: bool) {
        self.controllable = controllable;
        self.set_sizeable(controllable);
    }

    /// Resizing cannot be enabled on a window without controls.
    pub fn set_sizeable(&mut self, sizeable: bool) {
        self.sizeable = sizeable && self.controllable;
    }
}

/// Deserialized form of [`WindowSettings`]. Converting applies the
/// control/resize coupling.
#[derive(Deserialize)]
#[serde(default)]
struct RawWindowSettings {
    shape: Shape,
    state: WindowState,
    controllable: bool,
    sizeable: bool,
    visible: bool,
    title: String,
}

impl Default for RawWindowSettings {
    fn default() -> Self {
        let window = WindowSettings::default();
        Self {
            shape: window.shape,
            state: window.state,
            controllable: window.controllable,
            sizeable: window.sizeable,
            visible: window.visible,
            title: window.title,
        }
    }
}

impl From<RawWindowSettings> for WindowSettings {
    fn from(raw: RawWindowSettings) -> Self {
        let mut window = WindowSettings {
            shape: raw.shape,
            state: raw.state,
            controllable: raw.controllable,
            sizeable: false,
            visible: raw.visible,
            title: raw.title,
        };
        window.set_sizeable(raw.sizeable);
        window
    }
}

/// Scene-wide configuration read by every tick and writable by scripts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Visible region of the world.
    pub camera: Shape,
    /// Camera rotation in degrees.
    pub camera_angle: f32,
    /// Acceleration added to gravity-enabled bodies, in world units per second².
    pub gravity: Vec2,
    /// Multiplier applied to wall-clock delta time.
    pub time_scale: f32,
    pub window: WindowSettings,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: Shape::new(Vec2::ZERO, Vec2::ONE),
            camera_angle: 0.0,
            gravity: Vec2::new(0.0, -9.8),
            time_scale: 1.0,
            window: WindowSettings::default(),
        }
    }
}

impl SceneConfig {
    /// Parse a scene configuration from a JSON string. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    // -- Builder pattern --

    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    pub fn with_camera(mut self, camera: Shape) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.window.title = title.into();
        self
    }
}

/// Configuration for the loop driver, provided by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scene state the world starts from.
    pub scene: SceneConfig,
    /// Give up waiting for the surface to become visible after this long.
    /// `None` waits forever.
    pub visibility_timeout: Option<Duration>,
    /// Name of the simulation thread.
    pub thread_name: String,
    /// Faults the engine keeps for the host before it starts dropping them.
    pub fault_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scene: SceneConfig::default(),
            visibility_timeout: None,
            thread_name: "flat-sim".to_string(),
            fault_capacity: 1024,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_scene(mut self, scene: SceneConfig) -> Self {
        self.scene = scene;
        self
    }

    pub fn with_visibility_timeout(mut self, timeout: Duration) -> Self {
        self.visibility_timeout = Some(timeout);
        self
    }

    pub fn with_fault_capacity(mut self, capacity: usize) -> Self {
        self.fault_capacity = capacity;
        self
    }
}
