//! Script dispatch.
//!
//! Each script is moved out of its slot only while its own hook runs, so the
//! hook gets `&mut Entity` and still sees every sibling. Scripts attached by a
//! hook wait for the next dispatch. A script detached mid-dispatch is skipped,
//! or gets its `on_detach` as soon as its running hook returns.

use std::panic::{self, AssertUnwindSafe};

use crate::api::context::ScriptCtx;
use crate::api::script::{Hook, Script, ScriptResult};
use crate::components::entity::Entity;
use crate::core::fault::{panic_message, FaultLog, FaultReason};

/// Run `call` for every script of `entity` in attach order.
///
/// Each call is isolated: an `Err` or a panic is recorded in `faults` and the
/// remaining scripts still run.
pub fn dispatch<F>(
    entity: &mut Entity,
    hook: Hook,
    ctx: &mut ScriptCtx,
    faults: &mut FaultLog,
    mut call: F,
) where
    F: FnMut(&mut dyn Script, &mut Entity, &mut ScriptCtx) -> ScriptResult,
{
    let horizon = entity.script_horizon();
    let mut from = 0;

    while let Some(seq) = entity.next_script(from, horizon) {
        from = seq + 1;
        let Some(mut script) = entity.take_script(seq) else {
            continue;
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            call(script.as_mut(), entity, ctx)
        }));
        let kind = script.kind();

        if let Some(mut gone) = entity.return_script(seq, script) {
            gone.on_detach(entity);
        }

        let reason = match outcome {
            Ok(Ok(())) => continue,
            Ok(Err(err)) => FaultReason::Error(err.to_string()),
            Err(payload) => FaultReason::Panic(panic_message(payload.as_ref())),
        };
        faults.record(Some(entity.id), Some(kind), Some(hook), reason);
    }
}

pub fn update(entity: &mut Entity, ctx: &mut ScriptCtx, faults: &mut FaultLog) {
    dispatch(entity, Hook::Update, ctx, faults, |s, e, c| s.on_update(e, c));
}

pub fn render(entity: &mut Entity, ctx: &mut ScriptCtx, faults: &mut FaultLog) {
    dispatch(entity, Hook::Render, ctx, faults, |s, e, c| s.on_render(e, c));
}

pub fn load(entity: &mut Entity, ctx: &mut ScriptCtx, faults: &mut FaultLog) {
    dispatch(entity, Hook::Load, ctx, faults, |s, e, c| s.on_load(e, c));
}

pub fn unload(entity: &mut Entity, ctx: &mut ScriptCtx, faults: &mut FaultLog) {
    dispatch(entity, Hook::Unload, ctx, faults, |s, e, c| s.on_unload(e, c));
}

/// Mutable access to `items[i]` alongside shared access to `items[j]`.
pub(crate) fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &T) {
    assert_ne!(i, j, "pair_mut needs two distinct indices");
    if i < j {
        let (head, tail) = items.split_at_mut(j);
        (&mut head[i], &tail[0])
    } else {
        let (head, tail) = items.split_at_mut(i);
        (&mut tail[0], &head[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::script::ScriptKind;
    use crate::api::types::{EntityId, IdAllocator};
    use crate::core::config::SceneConfig;
    use crate::core::time::TimeInfo;
    use crate::input::state::InputState;
    use std::sync::{Arc, Mutex};

    struct Recorder {
        name: &'static str,
        journal: Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
        panic: bool,
    }

    impl Script for Recorder {
        fn kind(&self) -> ScriptKind {
            ScriptKind(self.name)
        }

        fn on_update(&mut self, entity: &mut Entity, _ctx: &mut ScriptCtx) -> ScriptResult {
            self.journal.lock().unwrap().push(self.name);
            entity.body.velocity.x += 1.0;
            if self.panic {
                panic!("{} exploded", self.name);
            }
            if self.fail {
                return Err("refused".into());
            }
            Ok(())
        }
    }

    fn recorder(name: &'static str, journal: &Arc<Mutex<Vec<&'static str>>>) -> Recorder {
        Recorder {
            name,
            journal: journal.clone(),
            fail: false,
            panic: false,
        }
    }

    fn run_update(entity: &mut Entity) -> FaultLog {
        let mut config = SceneConfig::default();
        let input = InputState::new();
        let mut ids = IdAllocator::new();
        let mut commands = Vec::new();
        let mut ctx = ScriptCtx::new(&mut config, &input, TimeInfo::default(), &mut ids, &mut commands);
        let mut faults = FaultLog::new(0);
        update(entity, &mut ctx, &mut faults);
        faults
    }

    #[test]
    fn dispatch_follows_attach_order() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut entity = Entity::new(EntityId(1))
            .with_script(recorder("first", &journal))
            .with_script(recorder("second", &journal))
            .with_script(recorder("third", &journal));

        let faults = run_update(&mut entity);

        assert!(faults.is_empty());
        assert_eq!(*journal.lock().unwrap(), vec!["first", "second", "third"]);
        assert_eq!(entity.body.velocity.x, 3.0);
        assert_eq!(entity.script_count(), 3);
    }

    #[test]
    fn failing_and_panicking_scripts_are_isolated() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut entity = Entity::new(EntityId(4))
            .with_script(Recorder { fail: true, ..recorder("grumpy", &journal) })
            .with_script(Recorder { panic: true, ..recorder("fragile", &journal) })
            .with_script(recorder("steady", &journal));

        let faults = run_update(&mut entity);

        assert_eq!(*journal.lock().unwrap(), vec!["grumpy", "fragile", "steady"]);
        let reasons: Vec<_> = faults.iter().map(|f| (f.script, f.reason.clone())).collect();
        assert_eq!(
            reasons,
            vec![
                (Some(ScriptKind("grumpy")), FaultReason::Error("refused".into())),
                (Some(ScriptKind("fragile")), FaultReason::Panic("fragile exploded".into())),
            ]
        );
        // Scripts survive a panic mid-dispatch.
        assert_eq!(entity.script_count(), 3);
    }

    const BASE: ScriptKind = ScriptKind("base");
    const CLONER: ScriptKind = ScriptKind("cloner");

    struct Base;

    impl Script for Base {
        fn kind(&self) -> ScriptKind {
            BASE
        }
    }

    /// Looks up its sibling and tries to attach a second `Base` from its hook.
    struct Cloner {
        seen: Arc<Mutex<Vec<(bool, bool, bool)>>>,
    }

    impl Script for Cloner {
        fn kind(&self) -> ScriptKind {
            CLONER
        }

        fn on_update(&mut self, entity: &mut Entity, _ctx: &mut ScriptCtx) -> ScriptResult {
            let sees_base = entity.get_script(BASE).is_some();
            let sees_self = entity.has_script(CLONER);
            let attached = entity.attach_script(Base);
            self.seen.lock().unwrap().push((sees_base, sees_self, attached));
            Ok(())
        }
    }

    #[test]
    fn hooks_see_sibling_scripts() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut entity = Entity::new(EntityId(2))
            .with_script(Base)
            .with_script(Cloner { seen: seen.clone() });

        assert!(run_update(&mut entity).is_empty());

        assert_eq!(*seen.lock().unwrap(), vec![(true, true, false)]);
        assert_eq!(entity.script_kinds().collect::<Vec<_>>(), vec![BASE, CLONER]);
    }

    /// Detaches `target` from its hook and counts its own `on_detach`.
    struct Detacher {
        target: ScriptKind,
        kind: ScriptKind,
        journal: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Script for Detacher {
        fn kind(&self) -> ScriptKind {
            self.kind
        }

        fn on_update(&mut self, entity: &mut Entity, _ctx: &mut ScriptCtx) -> ScriptResult {
            self.journal.lock().unwrap().push(self.kind.0);
            entity.detach_script(self.target);
            Ok(())
        }

        fn on_detach(&mut self, _entity: &mut Entity) {
            self.journal.lock().unwrap().push("detached");
        }
    }

    #[test]
    fn detaching_during_dispatch() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut entity = Entity::new(EntityId(3))
            .with_script(Detacher {
                target: ScriptKind("later"),
                kind: ScriptKind("first"),
                journal: journal.clone(),
            })
            .with_script(recorder("later", &journal))
            .with_script(Detacher {
                target: ScriptKind("quitter"),
                kind: ScriptKind("quitter"),
                journal: journal.clone(),
            });

        assert!(run_update(&mut entity).is_empty());

        // "later" was removed before its turn; "quitter" detached itself and got
        // its hook once on_update returned.
        assert_eq!(*journal.lock().unwrap(), vec!["first", "quitter", "detached"]);
        assert_eq!(entity.script_kinds().collect::<Vec<_>>(), vec![ScriptKind("first")]);
    }

    #[test]
    fn scripts_attached_by_a_hook_wait_for_the_next_dispatch() {
        struct Adder(Arc<Mutex<Vec<&'static str>>>);

        impl Script for Adder {
            fn kind(&self) -> ScriptKind {
                ScriptKind("adder")
            }

            fn on_update(&mut self, entity: &mut Entity, _ctx: &mut ScriptCtx) -> ScriptResult {
                entity.attach_script(recorder("added", &self.0));
                Ok(())
            }
        }

        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut entity = Entity::new(EntityId(5)).with_script(Adder(journal.clone()));

        run_update(&mut entity);
        assert!(journal.lock().unwrap().is_empty());
        assert_eq!(entity.script_count(), 2);

        run_update(&mut entity);
        assert_eq!(*journal.lock().unwrap(), vec!["added"]);
    }

    #[test]
    fn pair_mut_both_orders() {
        let mut items = [1, 2, 3];
        let (a, b) = pair_mut(&mut items, 0, 2);
        *a += *b;
        let (a, b) = pair_mut(&mut items, 2, 1);
        *a += *b;
        assert_eq!(items, [4, 2, 5]);
    }
}
