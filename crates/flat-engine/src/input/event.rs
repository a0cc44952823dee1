/// Raw input events reported by the presentation surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A key was pressed. Codes index a 256-entry table.
    KeyDown { key_code: u8 },
    /// A key was released.
    KeyUp { key_code: u8 },
    /// A mouse button (0-based, see [`normalize_mouse_button`](super::state::normalize_mouse_button)) was pressed.
    MouseDown { button: u8 },
    MouseUp { button: u8 },
    /// Cursor moved to client-area pixel coordinates (origin top-left).
    MouseMove { x: f32, y: f32 },
}
