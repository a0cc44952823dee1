//! Loop driver: owns the simulation thread.
//!
//! The simulation thread is the only one that touches the [`World`]. The host
//! talks to it through channels (input events, commands) and receives frames
//! through [`Surface::present`] and faults through [`Engine::faults`]. The fault
//! queue holds [`EngineConfig::fault_capacity`] entries; faults reported while it
//! is full are counted and dropped.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::api::context::Command;
use crate::core::config::{EngineConfig, WindowSettings};
use crate::core::fault::{panic_message, FaultLog, FaultReason, TickFault};
use crate::core::world::World;
use crate::error::EngineError;
use crate::input::event::InputEvent;
use crate::renderer::traits::Surface;

pub struct Engine {
    running: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
    commands: Sender<Command>,
    input: Sender<InputEvent>,
    faults: Receiver<TickFault>,
    dropped_faults: Arc<AtomicU64>,
    handle: Option<JoinHandle<World>>,
}

impl Engine {
    /// Wait for the surface to become visible, build the world, run `setup` on
    /// it and start the simulation thread.
    pub fn start<F>(
        config: EngineConfig,
        surface: Arc<dyn Surface>,
        setup: F,
    ) -> Result<Self, EngineError>
    where
        F: FnOnce(&mut World),
    {
        wait_until_visible(surface.as_ref(), config.visibility_timeout)?;

        let mut world = World::new(config.scene);
        world.set_viewport(surface.client_size());
        setup(&mut world);

        let window = world.config.window.clone();
        surface.configure(&window);
        surface.focus();

        let running = Arc::new(AtomicBool::new(true));
        let ticks = Arc::new(AtomicU64::new(0));
        let (command_tx, command_rx) = mpsc::channel();
        let (input_tx, input_rx) = mpsc::channel();
        let (fault_tx, fault_rx) = mpsc::sync_channel(config.fault_capacity);
        let dropped_faults = Arc::new(AtomicU64::new(0));

        let sim = SimLoop {
            world,
            surface,
            running: running.clone(),
            ticks: ticks.clone(),
            commands: command_rx,
            input: input_rx,
            faults: fault_tx,
            dropped_faults: dropped_faults.clone(),
            dropping: false,
            window,
        };

        let handle = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || sim.run())
            .map_err(EngineError::ThreadSpawn)?;

        log::info!("Simulation thread '{}' started", config.thread_name);

        Ok(Self {
            running,
            ticks,
            commands: command_tx,
            input: input_tx,
            faults: fault_rx,
            dropped_faults,
            handle: Some(handle),
        })
    }

    /// Ask the loop to exit after the tick in progress.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Whether the simulation thread is still looping.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
            && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Queue a command for the next tick. Returns `false` if the loop is gone.
    pub fn command(&self, command: Command) -> bool {
        self.commands.send(command).is_ok()
    }

    /// Run `f` on the simulation thread at the end of the next tick.
    pub fn submit<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut World) + Send + 'static,
    {
        self.command(Command::Apply(Box::new(f)))
    }

    /// Sender for the presentation surface to report input on.
    pub fn input_sender(&self) -> Sender<InputEvent> {
        self.input.clone()
    }

    pub fn send_input(&self, event: InputEvent) -> bool {
        self.input.send(event).is_ok()
    }

    /// Faults reported by past ticks, oldest first.
    pub fn faults(&self) -> &Receiver<TickFault> {
        &self.faults
    }

    /// Faults dropped because the fault queue was full.
    pub fn dropped_faults(&self) -> u64 {
        self.dropped_faults.load(Ordering::Relaxed)
    }

    /// Wait for the simulation thread to exit and take back the world.
    /// Call [`stop`](Self::stop) first unless a script stops the loop.
    pub fn join(mut self) -> Result<World, EngineError> {
        self.join_thread()
    }

    /// Stop the loop, wait for it and collect the faults nobody read yet.
    pub fn finish(mut self) -> Result<(World, Vec<TickFault>), EngineError> {
        self.stop();
        let world = self.join_thread()?;
        Ok((world, self.faults.try_iter().collect()))
    }

    fn join_thread(&mut self) -> Result<World, EngineError> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|payload| EngineError::ThreadPanicked(panic_message(payload.as_ref()))),
            None => Err(EngineError::ThreadPanicked("already joined".into())),
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.stop();
            if handle.join().is_err() {
                log::error!("Simulation thread panicked");
            }
        }
    }
}

fn wait_until_visible(surface: &dyn Surface, timeout: Option<Duration>) -> Result<(), EngineError> {
    let started = Instant::now();
    while !surface.is_visible() {
        if let Some(timeout) = timeout {
            if started.elapsed() >= timeout {
                return Err(EngineError::SurfaceTimeout(timeout));
            }
        }
        thread::yield_now();
    }
    Ok(())
}

/// State moved onto the simulation thread.
struct SimLoop {
    world: World,
    surface: Arc<dyn Surface>,
    running: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
    commands: Receiver<Command>,
    input: Receiver<InputEvent>,
    faults: SyncSender<TickFault>,
    dropped_faults: Arc<AtomicU64>,
    /// Whether the fault queue was full at the last report.
    dropping: bool,
    /// Window settings last pushed to the surface.
    window: WindowSettings,
}

impl SimLoop {
    fn run(mut self) -> World {
        self.world.restart_clock();

        while self.running.load(Ordering::Acquire) {
            self.world.set_viewport(self.surface.client_size());
            self.world.feed_input(self.input.try_iter());
            for command in self.commands.try_iter() {
                self.world.push(command);
            }

            for fault in self.tick() {
                self.report(fault);
            }

            self.sync_surface();
            self.ticks.store(self.world.time().tick, Ordering::Release);

            if self.world.stop_requested() {
                self.running.store(false, Ordering::Release);
            }
            thread::yield_now();
        }

        self.surface.close();
        log::info!("Simulation stopped after {} ticks", self.world.time().tick);
        self.world
    }

    fn tick(&mut self) -> Vec<TickFault> {
        let tick = self.world.time().tick;
        match panic::catch_unwind(AssertUnwindSafe(|| self.world.tick())) {
            Ok(faults) => faults,
            Err(payload) => {
                let mut log = FaultLog::new(tick);
                log.record(None, None, None, FaultReason::Panic(panic_message(payload.as_ref())));
                log.into_vec()
            }
        }
    }

    fn report(&mut self, fault: TickFault) {
        match self.faults.try_send(fault) {
            Ok(()) => {
                if self.dropping {
                    self.dropping = false;
                    log::info!(
                        "Fault queue has room again ({} faults dropped so far)",
                        self.dropped_faults.load(Ordering::Relaxed)
                    );
                }
            }
            Err(TrySendError::Full(_)) => {
                self.dropped_faults.fetch_add(1, Ordering::Relaxed);
                if !self.dropping {
                    self.dropping = true;
                    log::warn!("Fault queue is full, dropping faults until the host reads it");
                }
            }
            // Host dropped the engine handle; faults were already logged.
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    fn sync_surface(&mut self) {
        if self.world.config.window != self.window {
            self.window = self.world.config.window.clone();
            self.surface.configure(&self.window);
        }
        if let Some(icon) = self.world.take_icon() {
            self.surface.set_icon(icon);
        }
        self.surface.present(Arc::new(self.world.frame()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::context::ScriptCtx;
    use crate::api::script::{Script, ScriptKind, ScriptResult};
    use crate::components::body::Body;
    use crate::components::entity::Entity;
    use crate::renderer::instance::{Frame, FrameSlot};
    use glam::Vec2;
    use image::RgbaImage;
    use std::sync::atomic::AtomicUsize;

    struct TestSurface {
        visible: AtomicBool,
        configured: AtomicUsize,
        closed: AtomicBool,
        frames: FrameSlot,
    }

    impl TestSurface {
        fn new(visible: bool) -> Arc<Self> {
            Arc::new(Self {
                visible: AtomicBool::new(visible),
                configured: AtomicUsize::new(0),
                closed: AtomicBool::new(false),
                frames: FrameSlot::new(),
            })
        }
    }

    impl Surface for TestSurface {
        fn is_visible(&self) -> bool {
            self.visible.load(Ordering::SeqCst)
        }

        fn client_size(&self) -> Vec2 {
            Vec2::new(64.0, 48.0)
        }

        fn configure(&self, _window: &WindowSettings) {
            self.configured.fetch_add(1, Ordering::SeqCst);
        }

        fn set_icon(&self, _icon: Option<Arc<RgbaImage>>) {}

        fn present(&self, frame: Arc<Frame>) {
            self.frames.publish(frame);
        }

        fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    /// Stops the loop after a few updates.
    struct StopAfter(u32);

    impl Script for StopAfter {
        fn kind(&self) -> ScriptKind {
            ScriptKind("stop-after")
        }

        fn on_update(&mut self, _entity: &mut Entity, ctx: &mut ScriptCtx) -> ScriptResult {
            if ctx.time.tick + 1 >= u64::from(self.0) {
                ctx.stop();
            }
            Ok(())
        }
    }

    struct Failing;

    impl Script for Failing {
        fn kind(&self) -> ScriptKind {
            ScriptKind("failing")
        }

        fn on_update(&mut self, _entity: &mut Entity, _ctx: &mut ScriptCtx) -> ScriptResult {
            Err("always".into())
        }
    }

    fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        false
    }

    #[test]
    fn runs_until_stopped() {
        let surface = TestSurface::new(true);
        let mut falling = None;
        let engine = Engine::start(EngineConfig::default(), surface.clone(), |world| {
            let id = world.next_entity_id();
            world.load_entity(Entity::new(id).with_body(Body::dynamic()));
            falling = Some(id);
        })
        .unwrap();

        assert!(wait_for(|| engine.ticks() >= 5));
        assert!(engine.is_running());
        engine.stop();
        let world = engine.join().unwrap();

        let entity = world.scene.get(falling.unwrap()).unwrap();
        assert!(entity.shape.position.y < 0.0);
        assert!(surface.closed.load(Ordering::SeqCst));
        assert_eq!(surface.configured.load(Ordering::SeqCst), 1);
        assert!(surface.frames.latest().is_some());
    }

    #[test]
    fn finish_collects_faults() {
        let surface = TestSurface::new(true);
        let engine = Engine::start(EngineConfig::default(), surface, |world| {
            let id = world.next_entity_id();
            world.load_entity(Entity::new(id).with_script(Failing));
        })
        .unwrap();

        assert!(wait_for(|| engine.ticks() >= 2));
        let (world, faults) = engine.finish().unwrap();
        assert!(faults.len() as u64 >= 2);
        assert!(faults.len() as u64 <= world.time().tick);
        assert!(faults.iter().all(|f| f.script == Some(ScriptKind("failing"))));
    }

    #[test]
    fn unread_faults_stay_bounded() {
        let surface = TestSurface::new(true);
        let config = EngineConfig::default().with_fault_capacity(4);
        let engine = Engine::start(config, surface, |world| {
            let id = world.next_entity_id();
            world.load_entity(Entity::new(id).with_script(Failing));
        })
        .unwrap();

        assert!(wait_for(|| engine.ticks() >= 20));
        assert!(engine.dropped_faults() >= 10);

        // Reading makes room again.
        assert_eq!(engine.faults().try_iter().take(4).count(), 4);
        assert!(wait_for(|| engine.faults().try_iter().next().is_some()));

        let (_, faults) = engine.finish().unwrap();
        assert!(faults.len() <= 4);
    }

    #[test]
    fn invisible_surface_times_out() {
        let surface = TestSurface::new(false);
        let config = EngineConfig::default().with_visibility_timeout(Duration::from_millis(10));
        let result = Engine::start(config, surface.clone(), |_| {});
        assert!(matches!(result, Err(EngineError::SurfaceTimeout(_))));
        assert_eq!(surface.configured.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn script_can_stop_the_loop() {
        let surface = TestSurface::new(true);
        let engine = Engine::start(EngineConfig::default(), surface.clone(), |world| {
            let id = world.next_entity_id();
            world.load_entity(Entity::new(id).with_script(StopAfter(3)));
        })
        .unwrap();

        assert!(wait_for(|| !engine.is_running()));
        let world = engine.join().unwrap();
        assert_eq!(world.time().tick, 3);
        assert!(surface.closed.load(Ordering::SeqCst));
    }

    #[test]
    fn submitted_work_and_window_changes_reach_the_surface() {
        let surface = TestSurface::new(true);
        let engine = Engine::start(EngineConfig::default(), surface.clone(), |_| {}).unwrap();

        assert!(engine.submit(|world| {
            world.config.window.title = "renamed".into();
            let id = world.next_entity_id();
            world.load_entity(Entity::new(id).with_tag("late"));
        }));

        assert!(wait_for(|| surface.configured.load(Ordering::SeqCst) == 2));
        engine.stop();
        let world = engine.join().unwrap();
        assert!(world.scene.find_by_tag("late").is_some());
        assert_eq!(world.config.window.title, "renamed");
    }
}
