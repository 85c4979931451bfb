use axum::Json;
use axum::extract::{Path, Query, State};
use serde_json::{Value, json};

use crate::db::models::Site;
use crate::error::WaypostError;
use crate::middleware::auth::{ReadAccess, RequireAuth};
use crate::router::WaypostState;
use crate::service;
use crate::types::requests::{NewSite, OrderUpdate, SitePatch, SiteQuery};

pub async fn list(
    State(state): State<WaypostState>,
    ReadAccess { authenticated }: ReadAccess,
    Query(query): Query<SiteQuery>,
) -> Result<Json<Vec<Site>>, WaypostError> {
    Ok(Json(
        state.store.list_sites(query.group_id, authenticated).await?,
    ))
}

pub async fn create(
    State(state): State<WaypostState>,
    _auth: RequireAuth,
    Json(body): Json<NewSite>,
) -> Result<Json<Site>, WaypostError> {
    body.validate()?;
    ensure_group_exists(&state, body.group_id).await?;
    Ok(Json(state.store.insert_site(&body).await?))
}

pub async fn get_one(
    State(state): State<WaypostState>,
    ReadAccess { authenticated }: ReadAccess,
    Path(id): Path<i64>,
) -> Result<Json<Site>, WaypostError> {
    match state.store.get_site(id).await? {
        Some(site) if site.is_public || authenticated => Ok(Json(site)),
        _ => Err(WaypostError::NotFound("site")),
    }
}

pub async fn update(
    State(state): State<WaypostState>,
    _auth: RequireAuth,
    Path(id): Path<i64>,
    Json(patch): Json<SitePatch>,
) -> Result<Json<Site>, WaypostError> {
    patch.validate()?;
    if let Some(group_id) = patch.group_id {
        ensure_group_exists(&state, group_id).await?;
    }
    Ok(Json(state.store.update_site(id, &patch).await?))
}

pub async fn remove(
    State(state): State<WaypostState>,
    _auth: RequireAuth,
    Path(id): Path<i64>,
) -> Result<Json<Value>, WaypostError> {
    if !state.store.delete_site(id).await? {
        return Err(WaypostError::NotFound("site"));
    }
    Ok(Json(json!({ "deleted": true })))
}

pub async fn reorder(
    State(state): State<WaypostState>,
    _auth: RequireAuth,
    Json(updates): Json<Vec<OrderUpdate>>,
) -> Result<Json<Value>, WaypostError> {
    service::ordering::apply_site_orders(&state.store, &updates).await?;
    Ok(Json(json!({ "updated": updates.len() })))
}

async fn ensure_group_exists(state: &WaypostState, group_id: i64) -> Result<(), WaypostError> {
    if state.store.get_group(group_id).await?.is_none() {
        return Err(WaypostError::Validation(vec![
            "groupId: group not found".to_string(),
        ]));
    }
    Ok(())
}
