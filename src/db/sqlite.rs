use crate::db::models::{ConfigEntry, Group, Site};
use crate::db::schema::SQLITE_INIT;
use crate::error::WaypostError;
use crate::types::requests::{GroupPatch, NewGroup, NewSite, SitePatch};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};
use std::collections::BTreeMap;
use std::str::FromStr;

pub type SqlitePool = Pool<Sqlite>;

/// Ceiling on the ancestor walk used for cycle checks. A legal tree
/// never gets close to this; exhausting the bound counts as a cycle.
pub const MAX_ANCESTOR_HOPS: usize = 64;

#[derive(Clone)]
pub struct NavStore {
    pool: SqlitePool,
}

impl NavStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating the file if needed), enable foreign keys and run
    /// the bundled DDL.
    pub async fn connect(database_url: &str) -> Result<Self, WaypostError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        let store = Self::new(pool);
        store.init_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), WaypostError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    // ---- groups ----

    pub async fn list_groups(&self, include_private: bool) -> Result<Vec<Group>, WaypostError> {
        let sql = if include_private {
            r#"SELECT id, name, parent_id, order_num, is_public, created_at, updated_at
               FROM groups ORDER BY order_num, id"#
        } else {
            r#"SELECT id, name, parent_id, order_num, is_public, created_at, updated_at
               FROM groups WHERE is_public = 1 ORDER BY order_num, id"#
        };
        Ok(sqlx::query_as::<_, Group>(sql).fetch_all(&self.pool).await?)
    }

    pub async fn get_group(&self, id: i64) -> Result<Option<Group>, WaypostError> {
        let group = sqlx::query_as::<_, Group>(
            r#"SELECT id, name, parent_id, order_num, is_public, created_at, updated_at
               FROM groups WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(group)
    }

    pub async fn insert_group(&self, new: &NewGroup) -> Result<Group, WaypostError> {
        let group = sqlx::query_as::<_, Group>(
            r#"INSERT INTO groups (name, parent_id, order_num, is_public)
               VALUES (?, ?, ?, ?)
               RETURNING id, name, parent_id, order_num, is_public, created_at, updated_at"#,
        )
        .bind(&new.name)
        .bind(new.parent_id)
        .bind(new.order_num)
        .bind(new.is_public.unwrap_or(true))
        .fetch_one(&self.pool)
        .await?;
        Ok(group)
    }

    /// Apply the provided fields only; `updated_at` is always touched.
    /// `parent_id` distinguishes "absent" from "set to NULL".
    pub async fn update_group(&self, id: i64, patch: &GroupPatch) -> Result<Group, WaypostError> {
        if patch.is_empty() {
            return Err(WaypostError::Validation(vec![
                "no fields to update".to_string(),
            ]));
        }
        let mut qb =
            QueryBuilder::<Sqlite>::new("UPDATE groups SET updated_at = CURRENT_TIMESTAMP");
        if let Some(name) = &patch.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(parent_id) = patch.parent_id {
            qb.push(", parent_id = ").push_bind(parent_id);
        }
        if let Some(order_num) = patch.order_num {
            qb.push(", order_num = ").push_bind(order_num);
        }
        if let Some(is_public) = patch.is_public {
            qb.push(", is_public = ").push_bind(is_public);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING id, name, parent_id, order_num, is_public, created_at, updated_at");
        qb.build_query_as::<Group>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or(WaypostError::NotFound("group"))
    }

    pub async fn delete_group(&self, id: i64) -> Result<bool, WaypostError> {
        let result = sqlx::query("DELETE FROM groups WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Would re-parenting `group_id` under `proposed_parent` make the
    /// group its own ancestor?
    pub async fn would_create_group_cycle(
        &self,
        group_id: i64,
        proposed_parent: i64,
    ) -> Result<bool, WaypostError> {
        let mut conn = self.pool.acquire().await?;
        detects_parent_cycle(&mut conn, group_id, proposed_parent).await
    }

    // ---- sites ----

    pub async fn list_sites(
        &self,
        group_id: Option<i64>,
        include_private: bool,
    ) -> Result<Vec<Site>, WaypostError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"SELECT id, group_id, name, url, icon, description, notes,
                      order_num, is_public, created_at, updated_at
               FROM sites WHERE 1 = 1"#,
        );
        if let Some(group_id) = group_id {
            qb.push(" AND group_id = ").push_bind(group_id);
        }
        if !include_private {
            qb.push(" AND is_public = 1");
        }
        qb.push(" ORDER BY order_num, id");
        Ok(qb.build_query_as::<Site>().fetch_all(&self.pool).await?)
    }

    pub async fn get_site(&self, id: i64) -> Result<Option<Site>, WaypostError> {
        let site = sqlx::query_as::<_, Site>(
            r#"SELECT id, group_id, name, url, icon, description, notes,
                      order_num, is_public, created_at, updated_at
               FROM sites WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(site)
    }

    pub async fn insert_site(&self, new: &NewSite) -> Result<Site, WaypostError> {
        let site = sqlx::query_as::<_, Site>(
            r#"INSERT INTO sites (group_id, name, url, icon, description, notes, order_num, is_public)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING id, group_id, name, url, icon, description, notes,
                         order_num, is_public, created_at, updated_at"#,
        )
        .bind(new.group_id)
        .bind(&new.name)
        .bind(&new.url)
        .bind(&new.icon)
        .bind(&new.description)
        .bind(&new.notes)
        .bind(new.order_num)
        .bind(new.is_public.unwrap_or(true))
        .fetch_one(&self.pool)
        .await?;
        Ok(site)
    }

    pub async fn update_site(&self, id: i64, patch: &SitePatch) -> Result<Site, WaypostError> {
        if patch.is_empty() {
            return Err(WaypostError::Validation(vec![
                "no fields to update".to_string(),
            ]));
        }
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE sites SET updated_at = CURRENT_TIMESTAMP");
        if let Some(group_id) = patch.group_id {
            qb.push(", group_id = ").push_bind(group_id);
        }
        if let Some(name) = &patch.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(url) = &patch.url {
            qb.push(", url = ").push_bind(url);
        }
        if let Some(icon) = &patch.icon {
            qb.push(", icon = ").push_bind(icon);
        }
        if let Some(description) = &patch.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(notes) = &patch.notes {
            qb.push(", notes = ").push_bind(notes);
        }
        if let Some(order_num) = patch.order_num {
            qb.push(", order_num = ").push_bind(order_num);
        }
        if let Some(is_public) = patch.is_public {
            qb.push(", is_public = ").push_bind(is_public);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(
            r#" RETURNING id, group_id, name, url, icon, description, notes,
                          order_num, is_public, created_at, updated_at"#,
        );
        qb.build_query_as::<Site>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or(WaypostError::NotFound("site"))
    }

    pub async fn delete_site(&self, id: i64) -> Result<bool, WaypostError> {
        let result = sqlx::query("DELETE FROM sites WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- configs ----

    pub async fn get_config(&self, key: &str) -> Result<Option<String>, WaypostError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM configs WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    pub async fn all_configs(&self) -> Result<BTreeMap<String, String>, WaypostError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM configs ORDER BY key")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().collect())
    }

    /// Uses SQLite `INSERT ... ON CONFLICT(key) DO UPDATE`.
    pub async fn set_config(&self, key: &str, value: &str) -> Result<ConfigEntry, WaypostError> {
        let entry = sqlx::query_as::<_, ConfigEntry>(
            r#"INSERT INTO configs (key, value) VALUES (?, ?)
               ON CONFLICT(key) DO UPDATE SET
                   value = excluded.value,
                   updated_at = CURRENT_TIMESTAMP
               RETURNING key, value, created_at, updated_at"#,
        )
        .bind(key)
        .bind(value)
        .fetch_one(&self.pool)
        .await?;
        Ok(entry)
    }
}

/// Walk `proposed_parent`'s ancestor chain; reaching `group_id` (or
/// running past [`MAX_ANCESTOR_HOPS`]) means the reassignment would
/// close a cycle. Takes a bare connection so snapshot import can run it
/// inside its transaction.
pub(crate) async fn detects_parent_cycle(
    conn: &mut SqliteConnection,
    group_id: i64,
    proposed_parent: i64,
) -> Result<bool, WaypostError> {
    let mut cursor = Some(proposed_parent);
    let mut hops = 0usize;
    while let Some(current) = cursor {
        if current == group_id {
            return Ok(true);
        }
        hops += 1;
        if hops > MAX_ANCESTOR_HOPS {
            return Ok(true);
        }
        cursor = sqlx::query_scalar::<_, Option<i64>>("SELECT parent_id FROM groups WHERE id = ?")
            .bind(current)
            .fetch_optional(&mut *conn)
            .await?
            .flatten();
    }
    Ok(false)
}
