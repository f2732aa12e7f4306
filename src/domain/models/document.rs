use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    Resume,
    Photo,
    #[serde(rename = "ID")]
    Id,
    Certificate,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Resume,
        Category::Photo,
        Category::Id,
        Category::Certificate,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Resume => "Resume",
            Category::Photo => "Photo",
            Category::Id => "ID",
            Category::Certificate => "Certificate",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Category selector used by the list view. `All` disables category filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(selected) => *selected == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("All"),
            CategoryFilter::Only(category) => category.fmt(f),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == "All" {
            return Ok(CategoryFilter::All);
        }
        s.parse().map(CategoryFilter::Only)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub owner: Uuid,
    pub file_name: String,
    pub storage_path: String,
    pub category: Category,
    pub size_bytes: Option<u64>,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub fn matches_search(&self, needle_lowercase: &str) -> bool {
        self.file_name.to_lowercase().contains(needle_lowercase)
    }
}

/// Formats a byte count the way the dashboard cards show it.
pub fn format_file_size(bytes: Option<u64>) -> String {
    match bytes {
        None | Some(0) => "—".to_string(),
        Some(b) if b < 1024 => format!("{} B", b),
        Some(b) if b < 1024 * 1024 => format!("{:.1} KB", b as f64 / 1024.0),
        Some(b) => format!("{:.1} MB", b as f64 / (1024.0 * 1024.0)),
    }
}
