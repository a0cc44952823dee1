use crate::api::types::{EntityId, IdAllocator, SoundId};
use crate::components::entity::Entity;
use crate::components::sound::Sound;
use crate::components::sprite::Sprite;
use crate::core::config::SceneConfig;
use crate::core::time::TimeInfo;
use crate::core::world::World;
use crate::input::state::InputState;

/// A deferred world mutation. Scripts queue commands through [`ScriptCtx`]; the
/// host queues them through [`Engine::submit`](crate::core::engine::Engine::submit).
/// Commands run after the current tick's entity loop, in queue order.
pub enum Command {
    LoadEntity(Entity),
    UnloadEntity(EntityId),
    LoadSound(Sound),
    UnloadSound(SoundId),
    /// Start or restart a loaded sound on the world's audio backend.
    PlaySound(SoundId),
    StopSound(SoundId),
    /// Rasterize the sprite once and hand it to the surface as the window icon.
    /// `None` restores the surface's default icon.
    SetIcon(Option<Sprite>),
    /// Ask the loop driver to stop after this tick.
    Stop,
    /// Arbitrary access to the world.
    Apply(Box<dyn FnOnce(&mut World) + Send>),
}

/// Mutable access to scene state, passed to every world-side script hook.
pub struct ScriptCtx<'a> {
    /// Camera, gravity, time scale and window settings. Changes apply immediately.
    pub config: &'a mut SceneConfig,
    /// Input as of the start of this tick.
    pub input: &'a InputState,
    pub time: TimeInfo,
    ids: &'a mut IdAllocator,
    commands: &'a mut Vec<Command>,
}

impl<'a> ScriptCtx<'a> {
    pub fn new(
        config: &'a mut SceneConfig,
        input: &'a InputState,
        time: TimeInfo,
        ids: &'a mut IdAllocator,
        commands: &'a mut Vec<Command>,
    ) -> Self {
        Self {
            config,
            input,
            time,
            ids,
            commands,
        }
    }

    /// Scaled seconds elapsed since the previous tick.
    pub fn delta(&self) -> f32 {
        self.time.delta
    }

    pub fn next_entity_id(&mut self) -> EntityId {
        self.ids.entity()
    }

    pub fn next_sound_id(&mut self) -> SoundId {
        self.ids.sound()
    }

    /// Register an entity once the current tick's entity loop is done.
    pub fn spawn(&mut self, entity: Entity) {
        self.commands.push(Command::LoadEntity(entity));
    }

    /// Unregister an entity once the current tick's entity loop is done.
    pub fn despawn(&mut self, id: EntityId) {
        self.commands.push(Command::UnloadEntity(id));
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Play a registered sound once the current tick's entity loop is done.
    pub fn play_sound(&mut self, id: SoundId) {
        self.commands.push(Command::PlaySound(id));
    }

    pub fn stop_sound(&mut self, id: SoundId) {
        self.commands.push(Command::StopSound(id));
    }

    pub fn stop(&mut self) {
        self.commands.push(Command::Stop);
    }
}
