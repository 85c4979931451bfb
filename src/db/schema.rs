//! SQL DDL for initializing navigation storage.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `groups` self-referencing via `parent_id` (NULL = root), cascade delete
/// - `sites` owned by a group, cascade delete
/// - `configs` as a plain key/value table
/// - `is_public` BOOLEAN (stored as INTEGER 0/1), default public
/// - timestamps as SQLite `CURRENT_TIMESTAMP` text, passed through untouched
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS groups (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    parent_id INTEGER NULL REFERENCES groups(id) ON DELETE CASCADE,
    order_num INTEGER NOT NULL DEFAULT 0,
    is_public INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS sites (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    group_id INTEGER NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    url TEXT NOT NULL,
    icon TEXT NULL,
    description TEXT NULL,
    notes TEXT NULL,
    order_num INTEGER NOT NULL DEFAULT 0,
    is_public INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS configs (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_groups_parent_id ON groups(parent_id);
CREATE INDEX IF NOT EXISTS idx_sites_group_id ON sites(group_id);
-- Snapshot import matches sites by URL.
CREATE INDEX IF NOT EXISTS idx_sites_url ON sites(url);
"#;
