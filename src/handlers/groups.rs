use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};

use crate::db::models::Group;
use crate::error::WaypostError;
use crate::middleware::auth::{ReadAccess, RequireAuth};
use crate::router::WaypostState;
use crate::service;
use crate::service::forest::GroupNode;
use crate::types::requests::{GroupPatch, NewGroup, OrderUpdate};

pub async fn list(
    State(state): State<WaypostState>,
    ReadAccess { authenticated }: ReadAccess,
) -> Result<Json<Vec<Group>>, WaypostError> {
    Ok(Json(state.store.list_groups(authenticated).await?))
}

pub async fn create(
    State(state): State<WaypostState>,
    _auth: RequireAuth,
    Json(body): Json<NewGroup>,
) -> Result<Json<Group>, WaypostError> {
    body.validate()?;
    if let Some(parent_id) = body.parent_id {
        ensure_parent_exists(&state, parent_id).await?;
    }
    Ok(Json(state.store.insert_group(&body).await?))
}

pub async fn get_one(
    State(state): State<WaypostState>,
    ReadAccess { authenticated }: ReadAccess,
    Path(id): Path<i64>,
) -> Result<Json<Group>, WaypostError> {
    match state.store.get_group(id).await? {
        Some(group) if group.is_public || authenticated => Ok(Json(group)),
        // Private rows look absent to anonymous callers.
        _ => Err(WaypostError::NotFound("group")),
    }
}

pub async fn update(
    State(state): State<WaypostState>,
    _auth: RequireAuth,
    Path(id): Path<i64>,
    Json(patch): Json<GroupPatch>,
) -> Result<Json<Group>, WaypostError> {
    patch.validate()?;
    if let Some(Some(parent_id)) = patch.parent_id {
        ensure_parent_exists(&state, parent_id).await?;
        if state.store.would_create_group_cycle(id, parent_id).await? {
            return Err(WaypostError::Validation(vec![
                "parentId: group cannot become its own ancestor".to_string(),
            ]));
        }
    }
    Ok(Json(state.store.update_group(id, &patch).await?))
}

pub async fn remove(
    State(state): State<WaypostState>,
    _auth: RequireAuth,
    Path(id): Path<i64>,
) -> Result<Json<Value>, WaypostError> {
    if !state.store.delete_group(id).await? {
        return Err(WaypostError::NotFound("group"));
    }
    Ok(Json(json!({ "deleted": true })))
}

pub async fn reorder(
    State(state): State<WaypostState>,
    _auth: RequireAuth,
    Json(updates): Json<Vec<OrderUpdate>>,
) -> Result<Json<Value>, WaypostError> {
    service::ordering::apply_group_orders(&state.store, &updates).await?;
    Ok(Json(json!({ "updated": updates.len() })))
}

/// The fully assembled forest, one round trip for navigation UIs.
pub async fn with_sites(
    State(state): State<WaypostState>,
    ReadAccess { authenticated }: ReadAccess,
) -> Result<Json<Vec<GroupNode>>, WaypostError> {
    let groups = state.store.list_groups(authenticated).await?;
    let sites = state.store.list_sites(None, authenticated).await?;
    Ok(Json(service::forest::assemble(groups, sites)))
}

async fn ensure_parent_exists(
    state: &WaypostState,
    parent_id: i64,
) -> Result<(), WaypostError> {
    if state.store.get_group(parent_id).await?.is_none() {
        return Err(WaypostError::Validation(vec![
            "parentId: parent group not found".to_string(),
        ]));
    }
    Ok(())
}
