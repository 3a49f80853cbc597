//! Legacy content shapes and destination records
//!
//! Frontmatter structs describe the YAML header of legacy `index.md` files;
//! unknown keys are ignored. `New*` structs are insert payloads for the
//! destination store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Legacy frontmatter
// ============================================================================

/// `contents/members/**/index.md`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberFrontmatter {
    pub name_ja: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub face_image: Option<String>,
    #[serde(default)]
    pub upper_body_image: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl MemberFrontmatter {
    /// Portrait reference: `image`, then `faceImage`, then `upperBodyImage`
    pub fn image_ref(&self) -> Option<&str> {
        self.image
            .as_deref()
            .or(self.face_image.as_deref())
            .or(self.upper_body_image.as_deref())
    }

    /// Description plus social lines, one per line; `None` when nothing is present
    pub fn bio(&self) -> Option<String> {
        let mut lines: Vec<String> = Vec::new();
        if let Some(description) = non_empty(&self.description) {
            lines.push(description.to_string());
        }
        if let Some(github) = non_empty(&self.github) {
            lines.push(format!("GitHub: @{}", github));
        }
        if let Some(twitter) = non_empty(&self.twitter) {
            lines.push(format!("Twitter: @{}", twitter));
        }
        if let Some(website) = non_empty(&self.website) {
            lines.push(format!("Web: {}", website));
        }

        let bio = lines.join("\n");
        (!bio.is_empty()).then_some(bio)
    }
}

/// `thumbnail: { src: ... }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnail {
    #[serde(default)]
    pub src: Option<String>,
}

/// `contents/articles/<year>/<MM-DD>_<name>/index.md`
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleFrontmatter {
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub thumbnail: Option<Thumbnail>,
    /// `"YYYY/member-slug"` reference
    #[serde(default)]
    pub author: Option<String>,
}

impl ArticleFrontmatter {
    pub fn cover_ref(&self) -> Option<&str> {
        self.thumbnail.as_ref().and_then(|t| t.src.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectApp {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectSocial {
    #[serde(default)]
    pub github: Option<String>,
}

/// `contents/projects/**/<slug>/index.md`
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectFrontmatter {
    #[serde(default)]
    pub app: Option<ProjectApp>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<Thumbnail>,
    #[serde(default)]
    pub social: Option<ProjectSocial>,
    /// `"YYYY/member-slug"` references
    #[serde(default)]
    pub members: Option<Vec<String>>,
}

impl ProjectFrontmatter {
    pub fn cover_ref(&self) -> Option<&str> {
        self.thumbnail.as_ref().and_then(|t| t.src.as_deref())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

// ============================================================================
// Destination records
// ============================================================================

/// Destination project category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectCategory {
    Active,
    Hackathon,
    Festival,
    Personal,
}

impl ProjectCategory {
    /// Map the legacy `kind` field; unknown or missing kinds become `Active`
    pub fn from_legacy_kind(kind: Option<&str>) -> Self {
        match kind {
            Some("long-term") => ProjectCategory::Active,
            Some("hackathon") => ProjectCategory::Hackathon,
            Some("festival") => ProjectCategory::Festival,
            Some("personal") => ProjectCategory::Personal,
            _ => ProjectCategory::Active,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectCategory::Active => "active",
            ProjectCategory::Hackathon => "hackathon",
            ProjectCategory::Festival => "festival",
            ProjectCategory::Personal => "personal",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewMember {
    pub slug: String,
    pub name: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub page_content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub slug: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub cover_url: Option<String>,
    pub author_id: Option<String>,
    pub published: bool,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub cover_url: Option<String>,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
    pub category: ProjectCategory,
}
