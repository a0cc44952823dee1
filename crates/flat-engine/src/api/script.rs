use std::any::Any;
use std::fmt;

use glam::Vec2;

use crate::api::context::ScriptCtx;
use crate::components::entity::Entity;
use crate::error::ScriptError;

pub type ScriptResult = Result<(), ScriptError>;

/// Stable identifier of a script variant, e.g. `ScriptKind("player.controller")`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptKind(pub &'static str);

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Which hook a dispatch is running. Carried by tick faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Update,
    Render,
    Load,
    Unload,
    Attach,
    Detach,
    Intersection,
}

/// Upcast helper so attached scripts can be downcast to their concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A behavior unit attached to an entity.
///
/// Every hook has an empty default. Hooks that run inside the world return a
/// [`ScriptResult`]; an `Err` (or a panic) is recorded as a tick fault for this
/// script and dispatch continues with the next one.
///
/// `kind` and `excludes` drive the single-instance rule: a script *matches* a kind
/// when it is its own kind or listed in `excludes`. An entity never holds two
/// scripts where either matches the other's kind.
pub trait Script: AsAny + Send {
    fn kind(&self) -> ScriptKind;

    /// Kinds this script stands in for. A "subtype" lists its "ancestors" here.
    fn excludes(&self) -> &'static [ScriptKind] {
        &[]
    }

    /// Once per tick, before the entity's physics step.
    fn on_update(&mut self, _entity: &mut Entity, _ctx: &mut ScriptCtx) -> ScriptResult {
        Ok(())
    }

    /// After the sprite produced a fresh bitmap.
    fn on_render(&mut self, _entity: &mut Entity, _ctx: &mut ScriptCtx) -> ScriptResult {
        Ok(())
    }

    fn on_load(&mut self, _entity: &mut Entity, _ctx: &mut ScriptCtx) -> ScriptResult {
        Ok(())
    }

    fn on_unload(&mut self, _entity: &mut Entity, _ctx: &mut ScriptCtx) -> ScriptResult {
        Ok(())
    }

    fn on_attach(&mut self, _entity: &mut Entity) {}

    fn on_detach(&mut self, _entity: &mut Entity) {}

    /// Overlap with `other`. `impulse` is `None` for the plain "touching" signal and
    /// `Some` with the resolved axis impulse when the collision is resolved.
    fn on_intersection(
        &mut self,
        _entity: &mut Entity,
        _other: &Entity,
        _contact: Vec2,
        _impulse: Option<Vec2>,
        _ctx: &mut ScriptCtx,
    ) -> ScriptResult {
        Ok(())
    }
}

impl dyn Script {
    /// Whether this script is `kind` or stands in for it.
    pub fn matches(&self, kind: ScriptKind) -> bool {
        self.kind() == kind || self.excludes().contains(&kind)
    }

    /// Whether two scripts may not share an entity.
    pub fn conflicts_with(&self, other: &(dyn Script + 'static)) -> bool {
        self.matches(other.kind()) || other.matches(self.kind())
    }

    pub fn downcast_ref<T: Script>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Script>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Walker;
    struct Runner;

    impl Script for Walker {
        fn kind(&self) -> ScriptKind {
            ScriptKind("walker")
        }
    }

    impl Script for Runner {
        fn kind(&self) -> ScriptKind {
            ScriptKind("runner")
        }

        fn excludes(&self) -> &'static [ScriptKind] {
            &[ScriptKind("walker")]
        }
    }

    #[test]
    fn subtype_matches_ancestor_kind() {
        let runner: Box<dyn Script> = Box::new(Runner);
        assert!(runner.matches(ScriptKind("runner")));
        assert!(runner.matches(ScriptKind("walker")));
        assert!(!runner.matches(ScriptKind("swimmer")));
    }

    #[test]
    fn conflict_is_checked_both_ways() {
        let walker: Box<dyn Script> = Box::new(Walker);
        let runner: Box<dyn Script> = Box::new(Runner);
        assert!(walker.conflicts_with(runner.as_ref()));
        assert!(runner.conflicts_with(walker.as_ref()));
    }

    #[test]
    fn downcast_to_concrete_type() {
        let walker: Box<dyn Script> = Box::new(Walker);
        assert!(walker.downcast_ref::<Walker>().is_some());
        assert!(walker.downcast_ref::<Runner>().is_none());
    }
}
