use std::fmt;

use crate::api::script::{Script, ScriptKind};
use crate::api::types::EntityId;
use crate::components::body::Body;
use crate::components::shape::Shape;
use crate::components::sprite::Sprite;
use crate::components::tags::Tags;

/// Fat Entity — one shape, one body, one sprite and an ordered script stack.
/// Designed for simplicity over ECS purity.
pub struct Entity {
    /// Registry identity.
    pub id: EntityId,
    pub shape: Shape,
    pub body: Body,
    pub sprite: Sprite,
    scripts: Vec<ScriptSlot>,
    next_seq: u64,
    tags: Tags,
}

/// One attached script. The box is out of its slot while one of its own hooks
/// runs; the slot's kind still takes part in conflict checks and lookups.
struct ScriptSlot {
    seq: u64,
    kind: ScriptKind,
    excludes: &'static [ScriptKind],
    script: Option<Box<dyn Script>>,
}

impl ScriptSlot {
    fn matches(&self, kind: ScriptKind) -> bool {
        self.kind == kind || self.excludes.contains(&kind)
    }

    fn conflicts_with(&self, other: &(dyn Script + 'static)) -> bool {
        self.matches(other.kind()) || other.matches(self.kind)
    }
}

impl Entity {
    /// Create an entity at the origin with zero size, a default body and a
    /// minimum-quality sprite.
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            shape: Shape::default(),
            body: Body::default(),
            sprite: Sprite {
                quality: 0.0,
                ..Default::default()
            },
            scripts: Vec::new(),
            next_seq: 0,
            tags: Tags::new(),
        }
    }

    // -- Builder pattern --

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    pub fn with_sprite(mut self, sprite: Sprite) -> Self {
        self.sprite = sprite;
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.tag(tag);
        self
    }

    /// Attach a script while building. A conflicting script is dropped.
    pub fn with_script(mut self, script: impl Script + 'static) -> Self {
        if !self.attach_script(script) {
            log::warn!("entity {:?}: script rejected by single-instance rule", self.id);
        }
        self
    }

    // -- Scripts --

    /// Attach a script and fire its `on_attach` hook.
    ///
    /// Returns `false` without attaching when an attached script matches the new
    /// script's kind or the new script matches an attached script's kind.
    pub fn attach_script(&mut self, script: impl Script + 'static) -> bool {
        self.attach_boxed(Box::new(script))
    }

    pub fn attach_boxed(&mut self, script: Box<dyn Script>) -> bool {
        if self.scripts.iter().any(|s| s.conflicts_with(script.as_ref())) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.scripts.push(ScriptSlot {
            seq,
            kind: script.kind(),
            excludes: script.excludes(),
            script: Some(script),
        });

        if let Some(mut script) = self.take_script(seq) {
            script.on_attach(self);
            if let Some(mut gone) = self.return_script(seq, script) {
                gone.on_detach(self);
            }
        }
        true
    }

    /// Detach the first script (insertion order) matching `kind` and fire its
    /// `on_detach` hook. Returns the detached script.
    ///
    /// A script whose own hook is running is removed from the entity right away,
    /// but its `on_detach` fires once that hook returns and `None` is returned.
    pub fn detach_script(&mut self, kind: ScriptKind) -> Option<Box<dyn Script>> {
        let idx = self.scripts.iter().position(|s| s.matches(kind))?;
        let mut script = self.scripts.remove(idx).script?;
        script.on_detach(self);
        Some(script)
    }

    /// First script matching `kind`. A script whose hook is running is borrowed
    /// by that hook and is skipped.
    pub fn get_script(&self, kind: ScriptKind) -> Option<&(dyn Script + 'static)> {
        self.scripts
            .iter()
            .filter(|s| s.matches(kind))
            .find_map(|s| s.script.as_deref())
    }

    pub fn get_script_mut(&mut self, kind: ScriptKind) -> Option<&mut (dyn Script + 'static)> {
        self.scripts
            .iter_mut()
            .filter(|s| s.matches(kind))
            .find_map(|s| s.script.as_deref_mut())
    }

    /// Whether any attached script matches `kind`, including one whose hook is
    /// running.
    pub fn has_script(&self, kind: ScriptKind) -> bool {
        self.scripts.iter().any(|s| s.matches(kind))
    }

    /// Attached script kinds in dispatch order.
    pub fn script_kinds(&self) -> impl Iterator<Item = ScriptKind> + '_ {
        self.scripts.iter().map(|s| s.kind)
    }

    pub fn script_count(&self) -> usize {
        self.scripts.len()
    }

    // -- Dispatch support --

    /// Attach sequence number the next script will get.
    pub(crate) fn script_horizon(&self) -> u64 {
        self.next_seq
    }

    /// First script at or after `from` and before `until` that is in its slot.
    pub(crate) fn next_script(&self, from: u64, until: u64) -> Option<u64> {
        self.scripts
            .iter()
            .find(|s| s.seq >= from && s.seq < until && s.script.is_some())
            .map(|s| s.seq)
    }

    /// Move a script out of its slot, leaving the slot in place.
    pub(crate) fn take_script(&mut self, seq: u64) -> Option<Box<dyn Script>> {
        self.scripts
            .iter_mut()
            .find(|s| s.seq == seq)
            .and_then(|s| s.script.take())
    }

    /// Put a script taken with [`take_script`](Self::take_script) back. Hands it
    /// back when the slot was detached in the meantime.
    pub(crate) fn return_script(
        &mut self,
        seq: u64,
        script: Box<dyn Script>,
    ) -> Option<Box<dyn Script>> {
        match self.scripts.iter_mut().find(|s| s.seq == seq) {
            Some(slot) => {
                slot.script = Some(script);
                None
            }
            None => Some(script),
        }
    }

    // -- Tags --

    pub fn tag(&mut self, tag: &str) -> bool {
        self.tags.tag(tag)
    }

    pub fn tagged(&self, tag: &str) -> bool {
        self.tags.tagged(tag)
    }

    pub fn untag(&mut self, tag: &str) -> bool {
        self.tags.untag(tag)
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("shape", &self.shape)
            .field("body", &self.body)
            .field("scripts", &self.script_kinds().collect::<Vec<_>>())
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const MOVER: ScriptKind = ScriptKind("mover");
    const JUMPER: ScriptKind = ScriptKind("jumper");
    const LOGGER: ScriptKind = ScriptKind("logger");

    #[derive(Default)]
    struct Counters {
        attached: AtomicUsize,
        detached: AtomicUsize,
    }

    /// Base kind.
    struct Mover(Arc<Counters>);
    /// Refines `Mover`.
    struct Jumper(Arc<Counters>);
    /// Unrelated.
    struct Logger;

    impl Script for Mover {
        fn kind(&self) -> ScriptKind {
            MOVER
        }

        fn on_attach(&mut self, _entity: &mut Entity) {
            self.0.attached.fetch_add(1, Ordering::SeqCst);
        }

        fn on_detach(&mut self, _entity: &mut Entity) {
            self.0.detached.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Script for Jumper {
        fn kind(&self) -> ScriptKind {
            JUMPER
        }

        fn excludes(&self) -> &'static [ScriptKind] {
            &[MOVER]
        }

        fn on_attach(&mut self, _entity: &mut Entity) {
            self.0.attached.fetch_add(1, Ordering::SeqCst);
        }

        fn on_detach(&mut self, _entity: &mut Entity) {
            self.0.detached.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Script for Logger {
        fn kind(&self) -> ScriptKind {
            LOGGER
        }
    }

    #[test]
    fn refined_kind_rejected_after_base() {
        let counters = Arc::new(Counters::default());
        let mut entity = Entity::new(EntityId(1));
        assert!(entity.attach_script(Mover(counters.clone())));
        assert!(!entity.attach_script(Jumper(counters.clone())));
        assert!(entity.attach_script(Logger));
        assert_eq!(entity.script_count(), 2);
        // The rejected script never saw on_attach.
        assert_eq!(counters.attached.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn base_kind_rejected_after_refined() {
        let counters = Arc::new(Counters::default());
        let mut entity = Entity::new(EntityId(1));
        assert!(entity.attach_script(Jumper(counters.clone())));
        assert!(!entity.attach_script(Mover(counters)));
    }

    #[test]
    fn detach_by_base_kind_removes_refined_script() {
        let counters = Arc::new(Counters::default());
        let mut entity = Entity::new(EntityId(1));
        entity.attach_script(Logger);
        entity.attach_script(Jumper(counters.clone()));

        let detached = entity.detach_script(MOVER).unwrap();
        assert_eq!(detached.kind(), JUMPER);
        assert_eq!(counters.detached.load(Ordering::SeqCst), 1);
        assert!(entity.detach_script(MOVER).is_none());
        assert_eq!(counters.detached.load(Ordering::SeqCst), 1);
        assert_eq!(entity.script_kinds().collect::<Vec<_>>(), vec![LOGGER]);
    }

    #[test]
    fn lookup_by_base_kind_and_downcast() {
        let counters = Arc::new(Counters::default());
        let entity = Entity::new(EntityId(1)).with_script(Jumper(counters));
        let script = entity.get_script(MOVER).unwrap();
        assert!(script.downcast_ref::<Jumper>().is_some());
        assert!(entity.get_script(LOGGER).is_none());
    }

    /// Records whether it could find itself from `on_attach`.
    struct SelfAware(Arc<AtomicUsize>);

    impl Script for SelfAware {
        fn kind(&self) -> ScriptKind {
            ScriptKind("self_aware")
        }

        fn on_attach(&mut self, entity: &mut Entity) {
            if entity.has_script(ScriptKind("self_aware")) && entity.script_count() == 2 {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
            // A second copy is rejected even while this one is attaching.
            assert!(!entity.attach_script(SelfAware(self.0.clone())));
        }
    }

    #[test]
    fn on_attach_runs_after_the_script_is_attached() {
        let found = Arc::new(AtomicUsize::new(0));
        let mut entity = Entity::new(EntityId(1)).with_script(Logger);
        assert!(entity.attach_script(SelfAware(found.clone())));
        assert_eq!(found.load(Ordering::SeqCst), 1);
        assert_eq!(
            entity.script_kinds().collect::<Vec<_>>(),
            vec![LOGGER, ScriptKind("self_aware")]
        );
        assert!(entity.get_script(ScriptKind("self_aware")).is_some());
    }

    #[test]
    fn default_sprite_is_minimum_quality() {
        let entity = Entity::new(EntityId(7));
        assert_eq!(entity.sprite.quality, 0.0);
        assert!(entity.sprite.rendered().is_none());
    }

    #[test]
    fn tags_on_entity() {
        let mut entity = Entity::new(EntityId(1)).with_tag("Hero");
        assert!(entity.tagged("hero"));
        assert!(!entity.tag("HERO"));
        assert!(entity.untag("hero"));
        assert!(entity.tags().is_empty());
    }
}
