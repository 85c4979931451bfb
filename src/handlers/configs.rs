use axum::Json;
use axum::extract::{Path, State};
use std::collections::BTreeMap;

use crate::error::WaypostError;
use crate::middleware::auth::{ReadAccess, RequireAuth};
use crate::router::WaypostState;
use crate::types::requests::{ConfigBody, ConfigValue};

pub async fn list(
    State(state): State<WaypostState>,
    _read: ReadAccess,
) -> Result<Json<BTreeMap<String, String>>, WaypostError> {
    Ok(Json(state.store.all_configs().await?))
}

/// Missing keys answer with a null value rather than 404; clients
/// treat unset and missing the same way.
pub async fn get_one(
    State(state): State<WaypostState>,
    _read: ReadAccess,
    Path(key): Path<String>,
) -> Result<Json<ConfigValue>, WaypostError> {
    let value = state.store.get_config(&key).await?;
    Ok(Json(ConfigValue { key, value }))
}

pub async fn set(
    State(state): State<WaypostState>,
    _auth: RequireAuth,
    Path(key): Path<String>,
    Json(body): Json<ConfigBody>,
) -> Result<Json<ConfigValue>, WaypostError> {
    let entry = state.store.set_config(&key, &body.value).await?;
    Ok(Json(ConfigValue {
        key: entry.key,
        value: Some(entry.value),
    }))
}
