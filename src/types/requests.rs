use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::error::WaypostError;

/// For PATCH-style bodies: outer `None` = field absent, `Some(None)` =
/// field explicitly null. Plain `Option` cannot tell those apart.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    pub authenticated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGroup {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub order_num: i64,
    #[serde(default)]
    pub is_public: Option<bool>,
}

impl NewGroup {
    pub fn validate(&self) -> Result<(), WaypostError> {
        if self.name.trim().is_empty() {
            return Err(WaypostError::Validation(vec![
                "name: must be a non-empty string".to_string(),
            ]));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<i64>>,
    #[serde(default)]
    pub order_num: Option<i64>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

impl GroupPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.parent_id.is_none()
            && self.order_num.is_none()
            && self.is_public.is_none()
    }

    pub fn validate(&self) -> Result<(), WaypostError> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err(WaypostError::Validation(vec![
                "name: must be a non-empty string".to_string(),
            ]));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSite {
    pub group_id: i64,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub order_num: i64,
    #[serde(default)]
    pub is_public: Option<bool>,
}

impl NewSite {
    pub fn validate(&self) -> Result<(), WaypostError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push("name: must be a non-empty string".to_string());
        }
        if Url::parse(&self.url).is_err() {
            errors.push("url: invalid URL format".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(WaypostError::Validation(errors))
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitePatch {
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub icon: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    #[serde(default)]
    pub order_num: Option<i64>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

impl SitePatch {
    pub fn is_empty(&self) -> bool {
        self.group_id.is_none()
            && self.name.is_none()
            && self.url.is_none()
            && self.icon.is_none()
            && self.description.is_none()
            && self.notes.is_none()
            && self.order_num.is_none()
            && self.is_public.is_none()
    }

    pub fn validate(&self) -> Result<(), WaypostError> {
        let mut errors = Vec::new();
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            errors.push("name: must be a non-empty string".to_string());
        }
        if let Some(url) = &self.url
            && Url::parse(url).is_err()
        {
            errors.push("url: invalid URL format".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(WaypostError::Validation(errors))
        }
    }
}

/// One `{id, orderNum}` pair of a batch reorder request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub id: i64,
    pub order_num: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteQuery {
    #[serde(default)]
    pub group_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigBody {
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue {
    pub key: String,
    pub value: Option<String>,
}
