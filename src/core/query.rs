// src/core/query.rs
//! List query parameters shared by every list endpoint, and the row
//! predicates that keep a filtered page honest.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{
    Application, ApplicationStatus, BlogPost, Class, Course, EmploymentType, ExperienceLevel,
    Job, User, UserRole,
};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{}', use asc or desc", other)),
        }
    }
}

/// Filter, sort and paging parameters for a list call.
/// Unset and blank values are never put on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub remote: Option<bool>,
    pub employment_type: Option<EmploymentType>,
    pub experience_level: Option<ExperienceLevel>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub status: Option<ApplicationStatus>,
    pub role: Option<UserRole>,
    pub job_id: Option<String>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1-based page with `per_page` rows; fills page, limit and skip together
    pub fn paged(mut self, page: u32, per_page: u32) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);
        self.page = Some(page);
        self.limit = Some(per_page);
        self.skip = Some(u64::from(page - 1) * u64::from(per_page));
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn status(mut self, status: ApplicationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn role(mut self, role: UserRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = Some(order);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn current_page(&self) -> u32 {
        self.page.unwrap_or(1)
    }

    /// Query string pairs in a stable order
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                let value = value.trim().to_string();
                if !value.is_empty() {
                    pairs.push((key.to_string(), value));
                }
            }
        };

        push("skip", self.skip.map(|v| v.to_string()));
        push("limit", self.limit.map(|v| v.to_string()));
        push("page", self.page.map(|v| v.to_string()));
        push("category", self.category.clone());
        push("location", self.location.clone());
        push("remote", self.remote.map(|v| v.to_string()));
        push(
            "employment_type",
            self.employment_type.map(|v| v.as_str().to_string()),
        );
        push(
            "experience_level",
            self.experience_level.map(|v| v.as_str().to_string()),
        );
        push("search", self.search.clone());
        push("sort_by", self.sort_by.clone());
        push("sort_order", self.sort_order.map(|v| v.as_str().to_string()));
        push("status", self.status.map(|v| v.as_str().to_string()));
        push("role", self.role.map(|v| v.as_str().to_string()));
        push("job_id", self.job_id.clone());

        pairs
    }
}

/// Whether a returned row satisfies the enum-valued filters of a query.
/// Free-text search is left to the server.
pub trait RowFilter<T> {
    fn matches(&self, item: &T) -> bool;
}

fn same_text(wanted: &Option<String>, actual: Option<&str>) -> bool {
    match wanted.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(wanted) => actual.map_or(false, |actual| actual.trim().eq_ignore_ascii_case(wanted)),
    }
}

fn same<V: PartialEq + Copy>(wanted: Option<V>, actual: V) -> bool {
    wanted.map_or(true, |wanted| wanted == actual)
}

impl RowFilter<Job> for ListQuery {
    fn matches(&self, job: &Job) -> bool {
        same_text(&self.category, job.category.as_deref())
            && same(self.employment_type, job.employment_type)
            && same(self.experience_level, job.experience_level)
            && self.remote.map_or(true, |remote| !remote || job.location.remote)
    }
}

impl RowFilter<Application> for ListQuery {
    fn matches(&self, application: &Application) -> bool {
        same(self.status, application.status)
            && same_text(&self.job_id, Some(application.job_id.as_str()))
    }
}

impl RowFilter<User> for ListQuery {
    fn matches(&self, user: &User) -> bool {
        same(self.role, user.role)
    }
}

impl RowFilter<BlogPost> for ListQuery {
    fn matches(&self, post: &BlogPost) -> bool {
        same_text(&self.category, post.category.as_deref())
    }
}

impl RowFilter<Course> for ListQuery {
    fn matches(&self, course: &Course) -> bool {
        same_text(&self.category, course.category.as_deref())
    }
}

impl RowFilter<Class> for ListQuery {
    fn matches(&self, _class: &Class) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_query_sends_nothing() {
        assert!(ListQuery::new().to_pairs().is_empty());
    }

    #[test]
    fn test_blank_values_are_dropped() {
        let query = ListQuery::new().search("   ").category("Engineering");
        assert_eq!(query.to_pairs(), expected(&[("category", "Engineering")]));
    }

    #[test]
    fn test_paging_sets_skip() {
        let query = ListQuery::new().paged(3, 20);
        assert_eq!(
            query.to_pairs(),
            expected(&[("skip", "40"), ("limit", "20"), ("page", "3")])
        );
        assert_eq!(ListQuery::new().paged(0, 10).skip, Some(0));
    }

    #[test]
    fn test_enum_filters_use_wire_values() {
        let query = ListQuery {
            employment_type: Some(EmploymentType::PartTime),
            experience_level: Some(ExperienceLevel::Entry),
            remote: Some(true),
            ..Default::default()
        }
        .status(ApplicationStatus::Interview)
        .sort("created_at", SortOrder::Desc);

        assert_eq!(
            query.to_pairs(),
            expected(&[
                ("remote", "true"),
                ("employment_type", "part_time"),
                ("experience_level", "entry"),
                ("sort_by", "created_at"),
                ("sort_order", "desc"),
                ("status", "interview"),
            ])
        );
    }

    #[test]
    fn test_application_row_filter() {
        let app: Application = serde_json::from_value(serde_json::json!({
            "id": "a1", "job_id": "j1", "status": "reviewing"
        }))
        .unwrap();

        assert!(ListQuery::new().matches(&app));
        assert!(ListQuery::new()
            .status(ApplicationStatus::Reviewing)
            .matches(&app));
        assert!(!ListQuery::new()
            .status(ApplicationStatus::Applied)
            .matches(&app));
    }
}
