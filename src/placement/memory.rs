//! A process-local `ObjectStore` for tests and single-node runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use hashbrown::HashMap;

use super::{HashBucketGroup, ObjectRef, ObjectStore};
use crate::error::BucketError;

#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    next_id: AtomicU64,
    objects: Mutex<HashMap<ObjectRef, Arc<HashBucketGroup>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of placed objects. A poisoned lock still reports the real count.
    pub fn len(&self) -> usize {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn put(&self, group: HashBucketGroup) -> Result<ObjectRef, BucketError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let obj_ref = ObjectRef::new(format!("mem-obj-{:08}", id));
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| BucketError::ObjectStore("object map lock poisoned".into()))?;
        objects.insert(obj_ref.clone(), Arc::new(group));
        Ok(obj_ref)
    }

    fn get(&self, obj_ref: &ObjectRef) -> Result<Arc<HashBucketGroup>, BucketError> {
        let objects = self
            .objects
            .lock()
            .map_err(|_| BucketError::ObjectStore("object map lock poisoned".into()))?;
        objects
            .get(obj_ref)
            .cloned()
            .ok_or_else(|| BucketError::ObjectStore(format!("unknown object '{}'", obj_ref)))
    }
}
