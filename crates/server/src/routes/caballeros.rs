use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use models::{CaballeroUpdate, ChangeSet};
use serde::Serialize;
use service::caballero::parse_id;
use tracing::debug;

use crate::errors::ApiError;
use crate::routes::ServerState;

pub const MSG_UPDATED: &str = "Caballero actualizado correctamente";

#[derive(Debug, Serialize)]
pub struct UpdateCaballeroOutput {
    pub ok: bool,
    pub mensaje: &'static str,
    pub cambios: ChangeSet,
}

/// `PUT /caballeros/:id` — partial update of one knight.
///
/// The id is checked before the body, so a bad id is a 400 whatever the payload.
pub async fn update_caballero(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<CaballeroUpdate>, JsonRejection>,
) -> Result<Json<UpdateCaballeroOutput>, ApiError> {
    let oid = parse_id(&id)?;
    let Json(update) = payload.map_err(|rejection| {
        debug!(%id, error = %rejection.body_text(), "caballero_body_rejected");
        ApiError::from(rejection)
    })?;

    let cambios = state.caballeros.update_by_id(oid, update).await?;
    Ok(Json(UpdateCaballeroOutput { ok: true, mensaje: MSG_UPDATED, cambios }))
}
