//! Ordered in-memory copy of a remote collection.

use crate::models::{Entity, Fields};

/// Local cache of one collection.
///
/// Order is whatever the last bulk load delivered. Local mutations never
/// re-sort: new records go to the front and updated records keep their
/// position. Operations on an unknown identifier are no-ops, since the cache
/// may lag behind the remote store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityCache {
    entities: Vec<Entity>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.entities.iter().position(|e| e.id == id)
    }

    pub fn push_front(&mut self, entity: Entity) {
        self.entities.insert(0, entity);
    }

    /// Swaps in a whole record at the existing position.
    pub fn replace(&mut self, entity: Entity) -> bool {
        match self.position(&entity.id) {
            Some(index) => {
                self.entities[index] = entity;
                true
            }
            None => false,
        }
    }

    /// Merges a partial update into the record in place.
    pub fn patch(&mut self, id: &str, patch: &Fields) -> bool {
        match self.entities.iter_mut().find(|e| e.id == id) {
            Some(entity) => {
                entity.apply(patch);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entities.len();
        self.entities.retain(|e| e.id != id);
        self.entities.len() != before
    }

    /// Bulk load: the new contents replace everything, in the given order.
    pub fn replace_all(&mut self, entities: Vec<Entity>) {
        self.entities = entities;
    }
}

impl From<Vec<Entity>> for EntityCache {
    fn from(entities: Vec<Entity>) -> Self {
        Self { entities }
    }
}

impl<'a> IntoIterator for &'a EntityCache {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
