pub mod api;
pub mod audio;
pub mod components;
pub mod core;
pub mod error;
pub mod input;
pub mod renderer;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::context::{Command, ScriptCtx};
pub use api::script::{Hook, Script, ScriptKind, ScriptResult};
pub use api::types::{EntityId, IdAllocator, SoundId};
pub use audio::{AudioBackend, PlaybackHandle};
pub use components::body::Body;
pub use components::entity::Entity;
pub use components::shape::Shape;
pub use components::sound::Sound;
pub use components::sprite::Sprite;
pub use components::tags::Tags;
pub use core::config::{EngineConfig, SceneConfig, WindowSettings, WindowState};
pub use core::engine::Engine;
pub use core::fault::{FaultReason, TickFault};
pub use core::scene::Scene;
pub use core::time::{Clock, TimeInfo};
pub use core::world::World;
pub use error::{AudioError, EngineError, ScriptError};
pub use input::event::InputEvent;
pub use input::state::{normalize_mouse_button, InputState};
pub use renderer::instance::{DrawInstance, DrawItem, Frame, FrameSlot};
pub use renderer::traits::Surface;
pub use systems::text::FontAtlas;
