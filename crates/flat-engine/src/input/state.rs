use glam::Vec2;

use crate::input::event::InputEvent;
use crate::renderer::camera::screen_to_world;

pub const KEY_COUNT: usize = 256;
pub const MOUSE_BUTTON_COUNT: usize = 5;

/// Map a vendor mouse-button flag (left = `0x100000`, right = `0x200000`,
/// middle = `0x400000`, extra buttons `0x800000` and `0x1000000`) to a 0-based
/// button index. Unknown codes yield `None`.
pub fn normalize_mouse_button(raw: u32) -> Option<u8> {
    match raw / 0x100000 {
        1 => Some(0),
        2 => Some(1),
        4 => Some(2),
        8 => Some(3),
        16 => Some(4),
        _ => None,
    }
}

/// Input as seen by scripts during a tick.
#[derive(Debug, Clone)]
pub struct InputState {
    keys: [bool; KEY_COUNT],
    mouse: [bool; MOUSE_BUTTON_COUNT],
    cursor: Vec2,
    cursor_delta: Vec2,
    /// Events received since the previous tick, in arrival order.
    events: Vec<InputEvent>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys: [false; KEY_COUNT],
            mouse: [false; MOUSE_BUTTON_COUNT],
            cursor: Vec2::ZERO,
            cursor_delta: Vec2::ZERO,
            events: Vec::new(),
        }
    }

    /// Fold the events received since the previous tick into the key/button
    /// tables and cursor. They replace the previous tick's [`events`](Self::events).
    ///
    /// `viewport` is the client area in pixels and `camera` the camera center;
    /// cursor positions are converted to world units.
    pub fn apply<I>(&mut self, events: I, viewport: Vec2, camera: Vec2)
    where
        I: IntoIterator<Item = InputEvent>,
    {
        self.events.clear();
        self.events.extend(events);
        for event in &self.events {
            match *event {
                InputEvent::KeyDown { key_code } => self.keys[key_code as usize] = true,
                InputEvent::KeyUp { key_code } => self.keys[key_code as usize] = false,
                InputEvent::MouseDown { button } => {
                    if let Some(b) = self.mouse.get_mut(button as usize) {
                        *b = true;
                    }
                }
                InputEvent::MouseUp { button } => {
                    if let Some(b) = self.mouse.get_mut(button as usize) {
                        *b = false;
                    }
                }
                InputEvent::MouseMove { x, y } => {
                    let previous = self.cursor;
                    self.cursor = screen_to_world(Vec2::new(x, y), viewport, camera);
                    self.cursor_delta = self.cursor - previous;
                }
            }
        }
    }

    pub fn key(&self, key_code: u8) -> bool {
        self.keys[key_code as usize]
    }

    pub fn keys(&self) -> &[bool; KEY_COUNT] {
        &self.keys
    }

    pub fn mouse_button(&self, button: u8) -> bool {
        self.mouse.get(button as usize).copied().unwrap_or(false)
    }

    /// Cursor position in world units.
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    /// Cursor movement reported by the most recent move event.
    pub fn cursor_delta(&self) -> Vec2 {
        self.cursor_delta
    }

    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
