use std::sync::Arc;

use models::caballero::parse_object_id;
use models::{CaballeroUpdate, ChangeSet};
use mongodb::bson::oid::ObjectId;
use tracing::{info, instrument, warn};

use crate::caballero::repository::CaballeroRepository;
use crate::errors::ServiceError;

/// Validate a route identifier before anything touches the store.
pub fn parse_id(raw: &str) -> Result<ObjectId, ServiceError> {
    parse_object_id(raw).map_err(|e| {
        warn!(id = %raw, "invalid_caballero_id");
        ServiceError::from(e)
    })
}

/// Knight edit service, independent of the web framework.
pub struct CaballeroService<R: CaballeroRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: CaballeroRepository + ?Sized> CaballeroService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Apply a partial update to the knight with the given identifier.
    ///
    /// Returns the change-set that was written.
    ///
    /// # Examples
    /// ```
    /// use service::caballero::{CaballeroService, repository::mock::MockCaballeroRepository};
    /// use models::{Caballero, CaballeroUpdate};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockCaballeroRepository::default());
    /// let id = repo.insert(Caballero { nombre: Some("Ikki".into()), ..Default::default() });
    /// let svc = CaballeroService::new(repo);
    /// let update = CaballeroUpdate { nombre: Some("Seiya".into()), ..Default::default() };
    /// let cambios = tokio_test::block_on(svc.update(&id.to_hex(), update)).unwrap();
    /// assert_eq!(cambios.keys(), vec!["nombre"]);
    /// ```
    pub async fn update(&self, raw_id: &str, update: CaballeroUpdate) -> Result<ChangeSet, ServiceError> {
        let id = parse_id(raw_id)?;
        self.update_by_id(id, update).await
    }

    /// Same as [`update`](Self::update) for an identifier that is already parsed.
    #[instrument(skip(self, id, update), fields(id = %id))]
    pub async fn update_by_id(&self, id: ObjectId, update: CaballeroUpdate) -> Result<ChangeSet, ServiceError> {
        let changes = ChangeSet::from_update(&update);
        if changes.is_empty() {
            warn!("empty_changeset");
            return Err(ServiceError::EmptyChangeset);
        }

        let outcome = self.repo.update_fields(id, &changes).await?;
        if outcome.matched == 0 {
            info!(fields = ?changes.keys(), "caballero_not_found");
            return Err(ServiceError::not_found("caballero"));
        }

        info!(fields = ?changes.keys(), matched = outcome.matched, modified = outcome.modified, "caballero_updated");
        Ok(changes)
    }
}
