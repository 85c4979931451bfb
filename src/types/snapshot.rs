use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

use crate::db::models::{Group, Site};
use crate::error::WaypostError;

pub const EXPORT_FORMAT_VERSION: &str = "1.0.0";

/// A full dump of the store: every group, site and config key.
/// Identifiers inside a snapshot are origin ids; import maps them to
/// destination rows and never trusts them as local ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,
    pub export_date: String,
    pub groups: Vec<SnapshotGroup>,
    pub sites: Vec<SnapshotSite>,
    pub configs: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotGroup {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub order_num: i64,
    #[serde(
        default,
        deserialize_with = "lenient_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSite {
    #[serde(default)]
    pub id: Option<i64>,
    pub group_id: i64,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub order_num: i64,
    #[serde(
        default,
        deserialize_with = "lenient_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Visibility flags arrive as JSON booleans from our own exports but as
/// 0/1 integers from older snapshot producers; accept both.
fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(Value::Number(n)) => Ok(Some(n.as_f64().is_some_and(|v| v != 0.0))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected boolean or 0/1, got {other}"
        ))),
    }
}

impl Snapshot {
    /// Value-level checks, collected per field. Shape-level problems
    /// (wrong types, missing required fields) are already rejected by
    /// deserialization before this runs.
    pub fn validate(&self) -> Result<(), WaypostError> {
        let mut errors = Vec::new();

        if self.version.trim().is_empty() {
            errors.push("Missing or invalid version".to_string());
        }
        if self.export_date.trim().is_empty() {
            errors.push("Missing or invalid export date".to_string());
        }
        for (index, group) in self.groups.iter().enumerate() {
            if group.name.trim().is_empty() {
                errors.push(format!("groups[{index}]: name must be a string"));
            }
        }
        for (index, site) in self.sites.iter().enumerate() {
            if site.name.trim().is_empty() {
                errors.push(format!("sites[{index}]: name must be a string"));
            }
            if site.url.trim().is_empty() {
                errors.push(format!("sites[{index}]: url must be a string"));
            } else if Url::parse(&site.url).is_err() {
                errors.push(format!("sites[{index}]: invalid URL format"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(WaypostError::Validation(errors))
        }
    }
}

impl From<Group> for SnapshotGroup {
    fn from(g: Group) -> Self {
        Self {
            id: Some(g.id),
            name: g.name,
            parent_id: g.parent_id,
            order_num: g.order_num,
            is_public: Some(g.is_public),
            created_at: Some(g.created_at),
            updated_at: Some(g.updated_at),
        }
    }
}

impl From<Site> for SnapshotSite {
    fn from(s: Site) -> Self {
        Self {
            id: Some(s.id),
            group_id: s.group_id,
            name: s.name,
            url: s.url,
            icon: s.icon,
            description: s.description,
            notes: s.notes,
            order_num: s.order_num,
            is_public: Some(s.is_public),
            created_at: Some(s.created_at),
            updated_at: Some(s.updated_at),
        }
    }
}

/// Outcome counters for one import run. `total` is what the snapshot
/// contained; the remaining counters say what happened to each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    pub groups: GroupImportStats,
    pub sites: SiteImportStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupImportStats {
    pub total: usize,
    pub created: usize,
    pub merged: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteImportStats {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

impl ImportStats {
    pub fn new(group_total: usize, site_total: usize) -> Self {
        Self {
            groups: GroupImportStats {
                total: group_total,
                created: 0,
                merged: 0,
            },
            sites: SiteImportStats {
                total: site_total,
                created: 0,
                updated: 0,
                skipped: 0,
            },
        }
    }
}

/// Body of a successful import response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub success: bool,
    pub stats: ImportStats,
}
