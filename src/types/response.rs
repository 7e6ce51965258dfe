// src/types/response.rs
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::application::{Application, ApplicationStatus};

// ===== Pagination =====

/// One page of a list endpoint.
///
/// Endpoints answer either with a bare array or with an envelope holding
/// the rows under `items`, `data`, `results` or the resource name.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: Option<u64>,
    pub page: Option<u32>,
    pub pages: Option<u32>,
}

impl<T> Page<T> {
    pub fn from_items(items: Vec<T>) -> Self {
        Self {
            items,
            total: None,
            page: None,
            pages: None,
        }
    }
}

/// Keys an envelope may keep its rows under, in lookup order
const ROW_KEYS: [&str; 11] = [
    "items",
    "data",
    "results",
    "jobs",
    "applications",
    "users",
    "posts",
    "courses",
    "classes",
    "lessons",
    "categories",
];

fn envelope_number(envelope: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    keys.iter()
        .find_map(|key| envelope.get(*key))
        .and_then(Value::as_u64)
}

/// First key whose removal lets `row` decode, i.e. the field that broke it
fn failing_key<T: DeserializeOwned>(row: &Value) -> Option<String> {
    let object = row.as_object()?;
    object
        .keys()
        .find(|key| {
            let mut trimmed = object.clone();
            trimmed.remove(key.as_str());
            match T::deserialize(&Value::Object(trimmed)) {
                Ok(_) => true,
                Err(e) => e.to_string() == format!("missing field `{}`", key),
            }
        })
        .cloned()
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, String> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            T::deserialize(row).map_err(|e| match failing_key::<T>(row) {
                Some(key) => format!("row {}, field `{}`: {}", index, key, e),
                None => format!("row {}: {}", index, e),
            })
        })
        .collect()
}

impl<'de, T> Deserialize<'de> for Page<T>
where
    T: DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Array(rows) => decode_rows(rows)
                .map(Page::from_items)
                .map_err(D::Error::custom),
            Value::Object(mut envelope) => {
                let rows = match ROW_KEYS.iter().find_map(|key| envelope.remove(*key)) {
                    Some(Value::Array(rows)) => rows,
                    Some(other) => {
                        return Err(D::Error::custom(format!(
                            "page rows must be a list, got {}",
                            other
                        )))
                    }
                    None => {
                        return Err(D::Error::custom(format!(
                            "page has no rows under any of: {}",
                            ROW_KEYS.join(", ")
                        )))
                    }
                };
                let as_u32 = |n: u64| u32::try_from(n).ok();

                Ok(Page {
                    items: decode_rows(rows).map_err(D::Error::custom)?,
                    total: envelope_number(&envelope, &["total", "count"]),
                    page: envelope_number(&envelope, &["page", "current_page"]).and_then(as_u32),
                    pages: envelope_number(&envelope, &["pages", "total_pages"]).and_then(as_u32),
                })
            }
            other => Err(D::Error::custom(format!(
                "expected a list or a page envelope, got {}",
                other
            ))),
        }
    }
}

// ===== Uploads / auth / misc =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(alias = "file_url", alias = "resume_url", alias = "image_url")]
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<crate::core::session::SessionUser>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default, alias = "detail")]
    pub message: Option<String>,
}

// ===== Dashboard =====

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_jobs: u64,
    #[serde(default)]
    pub published_jobs: u64,
    #[serde(default)]
    pub total_applications: u64,
    #[serde(default)]
    pub pending_applications: u64,
    #[serde(default)]
    pub total_courses: u64,
    #[serde(default)]
    pub total_classes: u64,
    #[serde(default)]
    pub total_posts: u64,
}

/// Per-status application counts, in lifecycle order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown(pub Vec<(ApplicationStatus, usize)>);

impl StatusBreakdown {
    pub fn from_applications(applications: &[Application]) -> Self {
        Self(
            ApplicationStatus::ALL
                .into_iter()
                .map(|status| {
                    let count = applications.iter().filter(|a| a.status == status).count();
                    (status, count)
                })
                .collect(),
        )
    }

    pub fn count(&self, status: ApplicationStatus) -> usize {
        self.0
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}
