use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::db::sqlite::{NavStore, detects_parent_cycle};
use crate::error::WaypostError;
use crate::types::snapshot::{
    EXPORT_FORMAT_VERSION, ImportStats, Snapshot, SnapshotGroup, SnapshotSite,
};

/// Merge a snapshot into the live store.
///
/// Validation runs first; nothing touches the database unless the
/// snapshot is well formed. All writes happen inside one transaction,
/// so a failed import leaves no partial state behind.
///
/// Merge rules, in order:
/// - groups match by exact name; a match maps the origin id onto the
///   existing row and overwrites nothing, otherwise a new group is
///   created (parent deferred to the second pass)
/// - parent links are restored only when both ends resolved in the id
///   map, and never when the link would close a cycle; such groups
///   simply stay roots
/// - sites match by URL: same destination group means update the
///   mutable fields, anything else inserts; a site whose group did not
///   resolve is counted as skipped
/// - config keys upsert
pub async fn merge(store: &NavStore, snapshot: &Snapshot) -> Result<ImportStats, WaypostError> {
    snapshot.validate()?;

    let mut stats = ImportStats::new(snapshot.groups.len(), snapshot.sites.len());
    let mut tx = store.pool().begin().await?;
    let mut group_id_map: HashMap<i64, i64> = HashMap::new();

    // Pass 1: create or merge every group, ignoring parents.
    for group in &snapshot.groups {
        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM groups WHERE name = ? LIMIT 1")
                .bind(&group.name)
                .fetch_optional(&mut *tx)
                .await?;
        let destination = match existing {
            Some(id) => {
                stats.groups.merged += 1;
                id
            }
            None => {
                let id: i64 = sqlx::query_scalar(
                    "INSERT INTO groups (name, order_num, is_public) VALUES (?, ?, ?) RETURNING id",
                )
                .bind(&group.name)
                .bind(group.order_num)
                .bind(group.is_public.unwrap_or(true))
                .fetch_one(&mut *tx)
                .await?;
                stats.groups.created += 1;
                id
            }
        };
        if let Some(origin) = group.id {
            group_id_map.insert(origin, destination);
        }
    }

    // Pass 2: restore parent links between mapped groups. Merging by
    // name can alias two origin groups onto one row, so a relink may
    // point a group at itself or at its own subtree; those are skipped.
    for group in &snapshot.groups {
        let (Some(origin), Some(origin_parent)) = (group.id, group.parent_id) else {
            continue;
        };
        let (Some(&destination), Some(&new_parent)) = (
            group_id_map.get(&origin),
            group_id_map.get(&origin_parent),
        ) else {
            continue;
        };
        if detects_parent_cycle(&mut *tx, destination, new_parent).await? {
            debug!(
                group_id = destination,
                parent_id = new_parent,
                "skipping parent relink that would close a cycle"
            );
            continue;
        }
        sqlx::query("UPDATE groups SET parent_id = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?")
            .bind(new_parent)
            .bind(destination)
            .execute(&mut *tx)
            .await?;
    }

    for site in &snapshot.sites {
        let Some(&destination_group) = group_id_map.get(&site.group_id) else {
            stats.sites.skipped += 1;
            continue;
        };
        let existing: Option<(i64, i64)> =
            sqlx::query_as("SELECT id, group_id FROM sites WHERE url = ? LIMIT 1")
                .bind(&site.url)
                .fetch_optional(&mut *tx)
                .await?;
        match existing {
            Some((site_id, group_id)) if group_id == destination_group => {
                sqlx::query(
                    r#"UPDATE sites SET
                           name = ?, icon = ?, description = ?, notes = ?,
                           order_num = ?, is_public = ?, updated_at = CURRENT_TIMESTAMP
                       WHERE id = ?"#,
                )
                .bind(&site.name)
                .bind(&site.icon)
                .bind(&site.description)
                .bind(&site.notes)
                .bind(site.order_num)
                .bind(site.is_public.unwrap_or(true))
                .bind(site_id)
                .execute(&mut *tx)
                .await?;
                stats.sites.updated += 1;
            }
            _ => {
                sqlx::query(
                    r#"INSERT INTO sites
                           (group_id, name, url, icon, description, notes, order_num, is_public)
                       VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
                )
                .bind(destination_group)
                .bind(&site.name)
                .bind(&site.url)
                .bind(&site.icon)
                .bind(&site.description)
                .bind(&site.notes)
                .bind(site.order_num)
                .bind(site.is_public.unwrap_or(true))
                .execute(&mut *tx)
                .await?;
                stats.sites.created += 1;
            }
        }
    }

    for (key, value) in &snapshot.configs {
        sqlx::query(
            r#"INSERT INTO configs (key, value) VALUES (?, ?)
               ON CONFLICT(key) DO UPDATE SET
                   value = excluded.value,
                   updated_at = CURRENT_TIMESTAMP"#,
        )
        .bind(key)
        .bind(value)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    info!(
        groups_created = stats.groups.created,
        groups_merged = stats.groups.merged,
        sites_created = stats.sites.created,
        sites_updated = stats.sites.updated,
        sites_skipped = stats.sites.skipped,
        "snapshot import committed"
    );
    Ok(stats)
}

/// Dump the whole store, private rows included.
pub async fn export(store: &NavStore) -> Result<Snapshot, WaypostError> {
    let groups = store.list_groups(true).await?;
    let sites = store.list_sites(None, true).await?;
    let configs = store.all_configs().await?;
    Ok(Snapshot {
        version: EXPORT_FORMAT_VERSION.to_string(),
        export_date: Utc::now().to_rfc3339(),
        groups: groups.into_iter().map(SnapshotGroup::from).collect(),
        sites: sites.into_iter().map(SnapshotSite::from).collect(),
        configs,
    })
}
