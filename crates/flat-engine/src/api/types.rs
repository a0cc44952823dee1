use serde::{Deserialize, Serialize};

/// Unique identifier for an entity. Registry membership is decided by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Unique identifier for a sound registered with the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SoundId(pub u32);

/// Hands out monotonically increasing ids for entities and sounds.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next_entity: u32,
    next_sound: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            next_entity: 1,
            next_sound: 1,
        }
    }

    /// Generate the next unique entity ID.
    pub fn entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }

    /// Generate the next unique sound ID.
    pub fn sound(&mut self) -> SoundId {
        let id = SoundId(self.next_sound);
        self.next_sound += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_per_kind() {
        let mut ids = IdAllocator::new();
        let a = ids.entity();
        let b = ids.entity();
        assert_ne!(a, b);
        assert_eq!(ids.sound(), SoundId(1));
        assert_eq!(ids.sound(), SoundId(2));
    }
}
