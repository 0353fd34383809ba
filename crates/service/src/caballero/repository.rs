use async_trait::async_trait;
use models::{Caballero, ChangeSet};
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Collection;
use tracing::debug;

use crate::errors::ServiceError;

/// Result of a single-document `$set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

/// Repository abstraction for knight persistence.
#[async_trait]
pub trait CaballeroRepository: Send + Sync {
    /// Set exactly the fields in `changes` on the document with `_id == id`.
    async fn update_fields(&self, id: ObjectId, changes: &ChangeSet) -> Result<UpdateOutcome, ServiceError>;
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Caballero>, ServiceError>;
}

/// MongoDB-backed repository implementation.
#[derive(Clone)]
pub struct MongoCaballeroRepository {
    pub collection: Collection<Caballero>,
}

impl MongoCaballeroRepository {
    pub fn new(collection: Collection<Caballero>) -> Self { Self { collection } }
}

#[async_trait]
impl CaballeroRepository for MongoCaballeroRepository {
    async fn update_fields(&self, id: ObjectId, changes: &ChangeSet) -> Result<UpdateOutcome, ServiceError> {
        let result = self
            .collection
            .update_one(doc! { "_id": id }, changes.to_set_document())
            .await?;
        debug!(%id, matched = result.matched_count, modified = result.modified_count, "mongo_update_one");
        Ok(UpdateOutcome { matched: result.matched_count, modified: result.modified_count })
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Caballero>, ServiceError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard, PoisonError};

    // poisoned locks still hand out the data
    fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
        m.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[derive(Default)]
    pub struct MockCaballeroRepository {
        docs: Mutex<HashMap<ObjectId, Caballero>>,
        calls: AtomicUsize,
        failure: Mutex<Option<String>>,
    }

    impl MockCaballeroRepository {
        /// Store a knight, assigning an id when it has none.
        pub fn insert(&self, mut knight: Caballero) -> ObjectId {
            let id = *knight.id.get_or_insert_with(ObjectId::new);
            lock(&self.docs).insert(id, knight);
            id
        }

        /// Number of store calls made so far (reads and writes).
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Make every following call fail like a lost connection.
        pub fn fail_with(&self, msg: &str) {
            *lock(&self.failure) = Some(msg.to_string());
        }

        fn enter(&self) -> Result<(), ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match lock(&self.failure).as_ref() {
                Some(msg) => Err(ServiceError::Db(msg.clone())),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl CaballeroRepository for MockCaballeroRepository {
        async fn update_fields(&self, id: ObjectId, changes: &ChangeSet) -> Result<UpdateOutcome, ServiceError> {
            self.enter()?;
            let mut docs = lock(&self.docs);
            let Some(knight) = docs.get_mut(&id) else {
                return Ok(UpdateOutcome::default());
            };
            let before = knight.clone();
            knight.apply(changes);
            let modified = u64::from(*knight != before);
            Ok(UpdateOutcome { matched: 1, modified })
        }

        async fn find_by_id(&self, id: ObjectId) -> Result<Option<Caballero>, ServiceError> {
            self.enter()?;
            Ok(lock(&self.docs).get(&id).cloned())
        }
    }

}
