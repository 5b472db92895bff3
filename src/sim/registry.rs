//! Live object registry
//!
//! The single authoritative set of falling objects. Objects are kept in
//! insertion order; ids are allocated monotonically, so insertion order is also
//! id order and lookups can binary search.

use super::object::{FallingObject, ObjectId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("object {0} is already registered")]
    DuplicateId(ObjectId),
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    objects: Vec<FallingObject>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    fn position(&self, id: ObjectId) -> Result<usize, usize> {
        self.objects.binary_search_by_key(&id, |o| o.id)
    }

    /// Insert a new object.
    ///
    /// Ids come from a monotonic allocator, so a duplicate is a logic error and
    /// asserts in debug builds.
    pub fn insert(&mut self, object: FallingObject) -> Result<(), RegistryError> {
        match self.position(object.id) {
            Ok(_) => {
                debug_assert!(false, "duplicate object id {}", object.id);
                Err(RegistryError::DuplicateId(object.id))
            }
            Err(idx) => {
                self.objects.insert(idx, object);
                Ok(())
            }
        }
    }

    /// Remove an object by id. Absent ids are a benign miss.
    pub fn remove(&mut self, id: ObjectId) -> Option<FallingObject> {
        self.position(id).ok().map(|idx| self.objects.remove(idx))
    }

    /// Remove everything, returning how many objects were dropped
    pub fn remove_all(&mut self) -> usize {
        let count = self.objects.len();
        self.objects.clear();
        count
    }

    /// Keep only objects matching the predicate, returning the ids removed
    pub fn retain(&mut self, mut keep: impl FnMut(&FallingObject) -> bool) -> Vec<ObjectId> {
        let mut removed = Vec::new();
        self.objects.retain(|o| {
            let kept = keep(o);
            if !kept {
                removed.push(o.id);
            }
            kept
        });
        removed
    }

    /// Read-only view of the live set, in insertion order
    pub fn snapshot(&self) -> &[FallingObject] {
        &self.objects
    }

    pub fn get(&self, id: ObjectId) -> Option<&FallingObject> {
        self.position(id).ok().map(|idx| &self.objects[idx])
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.position(id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
