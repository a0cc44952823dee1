use crate::api::types::{EntityId, SoundId};
use crate::components::entity::Entity;
use crate::components::sound::Sound;

/// Entity and sound registries.
///
/// Flat Vecs in insertion order. Insertion order is also collision pair order,
/// so removal preserves the order of the remaining items. Designed for small
/// entity counts (hundreds, not millions): every lookup is a linear scan.
pub struct Scene {
    entities: Vec<Entity>,
    sounds: Vec<Sound>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: Vec::with_capacity(256),
            sounds: Vec::new(),
        }
    }

    // -- Entities --

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.iter().any(|e| e.id == id)
    }

    /// Append an entity. Hands it back if the id is already registered.
    pub(crate) fn insert(&mut self, entity: Entity) -> Result<&mut Entity, Entity> {
        if self.contains(entity.id) {
            return Err(entity);
        }
        self.entities.push(entity);
        let last = self.entities.len() - 1;
        Ok(&mut self.entities[last])
    }

    /// Remove an entity by ID, keeping the order of the rest.
    pub(crate) fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let idx = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(idx))
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Read-only view of the registry in insertion order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub(crate) fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// Find the first entity with the given tag.
    pub fn find_by_tag(&self, tag: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.tagged(tag))
    }

    pub fn find_by_tag_mut(&mut self, tag: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.tagged(tag))
    }

    /// Find all entities with the given tag.
    pub fn find_all_by_tag(&self, tag: &str) -> Vec<&Entity> {
        self.entities.iter().filter(|e| e.tagged(tag)).collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // -- Sounds --

    pub fn contains_sound(&self, id: SoundId) -> bool {
        self.sounds.iter().any(|s| s.id == id)
    }

    pub(crate) fn insert_sound(&mut self, sound: Sound) -> Result<&mut Sound, Sound> {
        if self.contains_sound(sound.id) {
            return Err(sound);
        }
        self.sounds.push(sound);
        let last = self.sounds.len() - 1;
        Ok(&mut self.sounds[last])
    }

    pub(crate) fn remove_sound(&mut self, id: SoundId) -> Option<Sound> {
        let idx = self.sounds.iter().position(|s| s.id == id)?;
        Some(self.sounds.remove(idx))
    }

    pub fn sound(&self, id: SoundId) -> Option<&Sound> {
        self.sounds.iter().find(|s| s.id == id)
    }

    pub fn sound_mut(&mut self, id: SoundId) -> Option<&mut Sound> {
        self.sounds.iter_mut().find(|s| s.id == id)
    }

    pub fn sounds(&self) -> &[Sound] {
        &self.sounds
    }

    pub fn find_sounds_by_tag(&self, tag: &str) -> Vec<&Sound> {
        self.sounds.iter().filter(|s| s.tagged(tag)).collect()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::shape::Shape;
    use glam::Vec2;

    #[test]
    fn insert_and_get() {
        let mut scene = Scene::new();
        let id = EntityId(1);
        assert!(scene
            .insert(Entity::new(id).with_shape(Shape::new(Vec2::new(10.0, 20.0), Vec2::ONE)))
            .is_ok());
        let e = scene.get(id).unwrap();
        assert_eq!(e.shape.position, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn duplicate_id_is_handed_back() {
        let mut scene = Scene::new();
        assert!(scene.insert(Entity::new(EntityId(1))).is_ok());
        let rejected = scene.insert(Entity::new(EntityId(1)).with_tag("copy"));
        assert!(rejected.unwrap_err().tagged("copy"));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn remove_keeps_order() {
        let mut scene = Scene::new();
        for i in 1..=4 {
            scene.insert(Entity::new(EntityId(i))).ok();
        }
        assert!(scene.remove(EntityId(2)).is_some());
        assert!(scene.remove(EntityId(2)).is_none());
        let ids: Vec<_> = scene.iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn find_by_tag() {
        let mut scene = Scene::new();
        scene.insert(Entity::new(EntityId(1)).with_tag("hero")).ok();
        scene.insert(Entity::new(EntityId(2)).with_tag("enemy")).ok();
        scene.insert(Entity::new(EntityId(3)).with_tag("Enemy")).ok();
        let hero = scene.find_by_tag("HERO").unwrap();
        assert_eq!(hero.id, EntityId(1));
        assert_eq!(scene.find_all_by_tag("enemy").len(), 2);
    }
}
