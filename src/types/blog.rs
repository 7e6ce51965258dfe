// src/types/blog.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// Authors arrive either as a bare display name or as an embedded profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Author {
    Name(String),
    Profile {
        #[serde(default, alias = "_id")]
        id: Option<String>,
        #[serde(alias = "full_name")]
        name: String,
    },
}

impl Author {
    pub fn display_name(&self) -> &str {
        match self {
            Author::Name(name) => name,
            Author::Profile { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default, with = "timestamp")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl BlogPost {
    pub fn author_name(&self) -> &str {
        self.author.as_ref().map(Author::display_name).unwrap_or("")
    }

    /// Stored excerpt, or one derived from the rich-text body
    pub fn summary(&self, max_len: usize) -> String {
        match self.excerpt.as_deref() {
            Some(excerpt) if !excerpt.trim().is_empty() => {
                crate::format::truncate(excerpt.trim(), max_len)
            }
            _ => crate::format::html_excerpt(&self.content, max_len),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

impl PostDraft {
    /// Fills a missing slug from the title
    pub fn with_default_slug(mut self) -> Self {
        if self.slug.as_deref().map_or(true, |s| s.trim().is_empty()) {
            self.slug = Some(slugify(&self.title));
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogCategory {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_shapes() {
        let plain: BlogPost = serde_json::from_value(serde_json::json!({
            "id": "p1", "title": "Hello", "author": "Ada"
        }))
        .unwrap();
        assert_eq!(plain.author_name(), "Ada");

        let profile: BlogPost = serde_json::from_value(serde_json::json!({
            "id": "p2", "title": "Hello", "author": {"id": "u1", "name": "Grace"}
        }))
        .unwrap();
        assert_eq!(profile.author_name(), "Grace");
    }

    #[test]
    fn test_summary_falls_back_to_content() {
        let post: BlogPost = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "title": "Hello",
            "excerpt": "",
            "content": "<p>Rust <b>in</b> production</p>"
        }))
        .unwrap();
        assert_eq!(post.summary(100), "Rust in production");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hiring: 5 Tips for 2025!"), "hiring-5-tips-for-2025");
        assert_eq!(slugify("  --Already--slugged-- "), "already-slugged");
    }
}
