use axum::Json;
use axum::extract::State;

use crate::error::WaypostError;
use crate::middleware::auth::RequireAuth;
use crate::router::WaypostState;
use crate::service;
use crate::types::snapshot::{ImportReport, Snapshot};

/// Snapshots contain private rows, so export is always gated.
pub async fn export_snapshot(
    State(state): State<WaypostState>,
    _auth: RequireAuth,
) -> Result<Json<Snapshot>, WaypostError> {
    Ok(Json(service::import::export(&state.store).await?))
}

pub async fn import_snapshot(
    State(state): State<WaypostState>,
    _auth: RequireAuth,
    Json(snapshot): Json<Snapshot>,
) -> Result<Json<ImportReport>, WaypostError> {
    let stats = service::import::merge(&state.store, &snapshot).await?;
    Ok(Json(ImportReport {
        success: true,
        stats,
    }))
}
