use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A navigation group. Groups nest through `parent_id`; a NULL parent
/// marks a root. Timestamps are SQLite `CURRENT_TIMESTAMP` text and are
/// served exactly as stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub order_num: i64,
    pub is_public: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A bookmarked site inside a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: i64,
    pub group_id: i64,
    pub name: String,
    pub url: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub order_num: i64,
    pub is_public: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// One key/value row from the `configs` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub created_at: String,
    pub updated_at: String,
}
