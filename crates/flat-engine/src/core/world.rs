//! The world: everything one simulation thread owns.
//!
//! A tick walks the entity registry in insertion order. For each entity:
//! `on_update`, gravity, X displacement and X collision pass, Y displacement
//! and Y collision pass, then rasterization and `on_render` if a new bitmap was
//! produced. Commands queued during the tick are applied once the walk is done.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use glam::Vec2;
use image::RgbaImage;

use crate::api::context::{Command, ScriptCtx};
use crate::api::types::{EntityId, IdAllocator, SoundId};
use crate::audio::AudioBackend;
use crate::components::entity::Entity;
use crate::components::sound::Sound;
use crate::core::collision;
use crate::core::config::SceneConfig;
use crate::core::fault::{panic_message, FaultLog, FaultReason, TickFault};
use crate::core::physics::{self, Axis};
use crate::core::scene::Scene;
use crate::core::time::{Clock, TimeInfo};
use crate::input::event::InputEvent;
use crate::input::state::InputState;
use crate::renderer::instance::Frame;
use crate::systems::{dispatch, raster, render};

/// Rounds of command application per tick. Commands queued by load hooks of
/// the last round wait for the next tick.
const MAX_COMMAND_ROUNDS: usize = 16;

pub struct World {
    pub scene: Scene,
    pub config: SceneConfig,
    input: InputState,
    clock: Clock,
    ids: IdAllocator,
    /// Client-area size in pixels, as last reported by the surface.
    viewport: Vec2,
    commands: Vec<Command>,
    audio: Option<Arc<dyn AudioBackend + Send + Sync>>,
    /// Faults raised outside a tick (load/unload hooks run from the host).
    pending_faults: Vec<TickFault>,
    pending_icon: Option<Option<Arc<RgbaImage>>>,
    stop_requested: bool,
}

impl World {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            scene: Scene::new(),
            config,
            input: InputState::new(),
            clock: Clock::new(),
            ids: IdAllocator::new(),
            viewport: Vec2::ZERO,
            commands: Vec::new(),
            audio: None,
            pending_faults: Vec::new(),
            pending_icon: None,
            stop_requested: false,
        }
    }

    pub fn next_entity_id(&mut self) -> EntityId {
        self.ids.entity()
    }

    pub fn next_sound_id(&mut self) -> SoundId {
        self.ids.sound()
    }

    pub fn entities(&self) -> &[Entity] {
        self.scene.entities()
    }

    pub fn sounds(&self) -> &[Sound] {
        self.scene.sounds()
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn time(&self) -> TimeInfo {
        self.clock.info()
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub(crate) fn restart_clock(&mut self) {
        self.clock.restart();
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    /// Backend that plays the registered sounds. Without one, playing a sound
    /// does nothing.
    pub fn set_audio(&mut self, audio: Arc<dyn AudioBackend + Send + Sync>) {
        self.audio = Some(audio);
    }

    /// Fold the input events received since the previous tick into the input
    /// state. Cursor positions are mapped through the current viewport and camera.
    pub fn feed_input<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = InputEvent>,
    {
        self.input.apply(events, self.viewport, self.config.camera.position);
    }

    /// Queue a command for the end of the next tick.
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    // -- Registries --

    /// Register an entity and fire its `on_load` hooks.
    /// Returns `false` if an entity with the same id is already registered.
    pub fn load_entity(&mut self, entity: Entity) -> bool {
        let mut faults = FaultLog::new(self.clock.ticks());
        let World {
            scene,
            config,
            input,
            clock,
            ids,
            commands,
            ..
        } = self;

        let entity = match scene.insert(entity) {
            Ok(entity) => entity,
            Err(rejected) => {
                log::debug!("Entity {} is already loaded", rejected.id.0);
                return false;
            }
        };
        let mut ctx = ScriptCtx::new(config, input, clock.info(), ids, commands);
        dispatch::load(entity, &mut ctx, &mut faults);

        self.pending_faults.extend(faults.into_vec());
        true
    }

    /// Unregister an entity and fire its `on_unload` hooks.
    pub fn unload_entity(&mut self, id: EntityId) -> Option<Entity> {
        let mut entity = self.scene.remove(id)?;
        let mut faults = FaultLog::new(self.clock.ticks());
        let World {
            config,
            input,
            clock,
            ids,
            commands,
            ..
        } = self;

        let mut ctx = ScriptCtx::new(config, input, clock.info(), ids, commands);
        dispatch::unload(&mut entity, &mut ctx, &mut faults);

        self.pending_faults.extend(faults.into_vec());
        Some(entity)
    }

    /// Register a sound. Returns `false` if the id is already registered.
    pub fn load_sound(&mut self, sound: Sound) -> bool {
        match self.scene.insert_sound(sound) {
            Ok(sound) => {
                sound.loaded = true;
                true
            }
            Err(rejected) => {
                log::debug!("Sound {} is already loaded", rejected.id.0);
                false
            }
        }
    }

    /// Unregister a sound, stopping its playback. Without an audio backend the
    /// sound keeps its playback handle, and playing it after a reload stops the
    /// old playback first.
    pub fn unload_sound(&mut self, id: SoundId) -> Option<Sound> {
        let mut sound = self.scene.remove_sound(id)?;
        if let Some(audio) = self.audio.as_deref() {
            if sound.stop(audio) {
                log::debug!("Sound {} stopped on unload", id.0);
            }
        }
        sound.loaded = false;
        Some(sound)
    }

    /// Start (or restart) a registered sound. Returns `false` when the sound is
    /// unknown, there is no audio backend or the backend refused.
    pub fn play_sound(&mut self, id: SoundId) -> bool {
        let Some(audio) = self.audio.as_deref() else {
            log::debug!("No audio backend, sound {} not played", id.0);
            return false;
        };
        self.scene.sound_mut(id).is_some_and(|sound| sound.play(audio))
    }

    /// Stop a registered sound. Returns `false` when it was not playing.
    pub fn stop_sound(&mut self, id: SoundId) -> bool {
        let Some(audio) = self.audio.as_deref() else {
            return false;
        };
        self.scene.sound_mut(id).is_some_and(|sound| sound.stop(audio))
    }

    // -- Tick --

    /// Run one tick with the wall-clock time since the previous one.
    pub fn tick(&mut self) -> Vec<TickFault> {
        let dt = self.clock.advance(self.config.time_scale);
        self.run_tick(dt)
    }

    /// Run one tick with a supplied raw delta in seconds.
    pub fn step(&mut self, raw_dt: f32) -> Vec<TickFault> {
        let dt = self.clock.advance_by(raw_dt, self.config.time_scale);
        self.run_tick(dt)
    }

    fn run_tick(&mut self, dt: f32) -> Vec<TickFault> {
        let mut out = std::mem::take(&mut self.pending_faults);
        let mut faults = FaultLog::new(self.clock.ticks());

        self.walk_entities(dt, &mut faults);
        out.extend(faults.into_vec());
        self.apply_commands();
        self.clock.finish_tick();

        out.append(&mut self.pending_faults);
        out
    }

    fn walk_entities(&mut self, dt: f32, faults: &mut FaultLog) {
        let World {
            scene,
            config,
            input,
            clock,
            ids,
            commands,
            viewport,
            ..
        } = self;
        let viewport = *viewport;
        let mut ctx = ScriptCtx::new(config, input, clock.info(), ids, commands);
        let entities = scene.entities_mut();

        for i in 0..entities.len() {
            let id = entities[i].id;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                step_entity(entities, i, dt, viewport, &mut ctx, faults);
            }));
            if let Err(payload) = outcome {
                faults.record(
                    Some(id),
                    None,
                    None,
                    FaultReason::Panic(panic_message(payload.as_ref())),
                );
            }
        }
    }

    fn apply_commands(&mut self) {
        for _ in 0..MAX_COMMAND_ROUNDS {
            if self.commands.is_empty() {
                return;
            }
            for command in std::mem::take(&mut self.commands) {
                self.apply(command);
            }
        }
        if !self.commands.is_empty() {
            log::warn!(
                "{} commands deferred to the next tick",
                self.commands.len()
            );
        }
    }

    /// Apply one command immediately.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::LoadEntity(entity) => {
                self.load_entity(entity);
            }
            Command::UnloadEntity(id) => {
                if self.unload_entity(id).is_none() {
                    log::debug!("Entity {} is not loaded", id.0);
                }
            }
            Command::LoadSound(sound) => {
                self.load_sound(sound);
            }
            Command::UnloadSound(id) => {
                self.unload_sound(id);
            }
            Command::PlaySound(id) => {
                if !self.play_sound(id) {
                    log::debug!("Sound {} did not start", id.0);
                }
            }
            Command::StopSound(id) => {
                self.stop_sound(id);
            }
            Command::SetIcon(sprite) => {
                let icon = sprite.and_then(|mut sprite| {
                    raster::rasterize(&mut sprite, 0.0, self.viewport, true);
                    sprite.rendered().cloned()
                });
                self.pending_icon = Some(icon);
            }
            Command::Stop => self.stop_requested = true,
            Command::Apply(f) => f(self),
        }
    }

    /// Icon change requested since the last call, if any.
    pub fn take_icon(&mut self) -> Option<Option<Arc<RgbaImage>>> {
        self.pending_icon.take()
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Snapshot of everything drawable right now.
    pub fn frame(&self) -> Frame {
        render::build_frame(
            self.scene.iter(),
            &self.config,
            self.viewport,
            self.clock.ticks(),
        )
    }
}

fn step_entity(
    entities: &mut [Entity],
    i: usize,
    dt: f32,
    viewport: Vec2,
    ctx: &mut ScriptCtx,
    faults: &mut FaultLog,
) {
    dispatch::update(&mut entities[i], ctx, faults);

    let gravity = ctx.config.gravity;
    let entity = &mut entities[i];
    physics::apply_gravity(&mut entity.body, gravity, dt);

    for axis in Axis::BOTH {
        let entity = &mut entities[i];
        physics::advance(&mut entity.shape, &entity.body, axis, dt);
        collision::resolve_axis(entities, i, axis, dt, ctx, faults);
    }

    let entity = &mut entities[i];
    if raster::rasterize(&mut entity.sprite, dt, viewport, false) {
        dispatch::render(entity, ctx, faults);
    }
}
