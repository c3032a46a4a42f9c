//! # Domain Model
//!
//! Core entities of the blog backend. The category tree is the root
//! aggregate; posts, drafts and templates are independent aggregates that
//! hold weak references to categories (by id), images (by file reference)
//! and hashtags (by name). Deleting a category never deletes content rows
//! directly; the command layer decides between cascade and detach.
//!
//! Ids are small integers assigned by the store, with two sentinels on the
//! category axis:
//!
//! - `UNCATEGORIZED` (id 0): "no category" — a real value on content rows.
//! - `None` in read paths: the virtual root ("all posts"), never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type CategoryId = u32;
pub type PostId = u32;
pub type DraftId = u32;
pub type TemplateId = u32;
pub type HashtagId = u32;
pub type ImageId = u32;

/// Sentinel category id meaning "no category".
pub const UNCATEGORIZED: CategoryId = 0;

pub const ALL_POSTS_NAME: &str = "All posts";
pub const ALL_POSTS_DESCRIPTION: &str = "Every post on the blog";
pub const UNCATEGORIZED_NAME: &str = "Uncategorized";
pub const UNCATEGORIZED_DESCRIPTION: &str = "Posts without a category";

/// Authentication state of the caller, passed explicitly into every
/// operation. There is exactly one author, so this is a boolean rather
/// than an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub authenticated: bool,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
        }
    }

    pub fn author() -> Self {
        Self {
            authenticated: true,
        }
    }

    /// Guard for write operations and authenticated-only reads.
    pub fn require_auth(&self) -> crate::error::Result<()> {
        if self.authenticated {
            Ok(())
        } else {
            Err(crate::error::BlogError::PermissionDenied(
                "authentication required".to_string(),
            ))
        }
    }
}

/// A node in the category forest.
///
/// `level`, `lft`, `rght` and `tree_id` are nested-set metadata maintained
/// by [`crate::tree::rebuild`]; they make descendant and ancestor lookups
/// range scans instead of recursive walks. They are never edited directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub is_hidden: bool,
    pub is_deleted: bool,
    pub cover_image: Option<String>,
    pub subcategory_of: Option<CategoryId>,
    pub level: u32,
    pub lft: u32,
    pub rght: u32,
    pub tree_id: u32,
}

/// The content shape shared by posts, drafts and templates.
///
/// `content` is the rich body as authored; `text_content` is its plain-text
/// projection and is what keyword search runs over. `images` holds the file
/// references of inline body images; `tags` holds hashtag names (the
/// registry row carries the id).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBody {
    pub title: String,
    pub content: String,
    pub text_content: String,
    pub thumbnail: Option<String>,
    pub images: Vec<String>,
    pub tags: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    #[serde(flatten)]
    pub body: ContentBody,
    pub category: Option<CategoryId>,
    pub is_hidden: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A work-in-progress post. Drafts are author-only: they have no public
/// visibility scoping and are hard-deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub id: DraftId,
    #[serde(flatten)]
    pub body: ContentBody,
    pub category: Option<CategoryId>,
    pub is_hidden: bool,
    pub created_at: DateTime<Utc>,
}

/// Reusable content boilerplate. No category, no visibility, no
/// timestamps; hard-deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub template_name: String,
    #[serde(flatten)]
    pub body: ContentBody,
}

/// A registry row for a tag name. Content rows attach by name; the row
/// exists so a tag keeps a stable identity across attach/detach cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hashtag {
    pub id: HashtagId,
    pub name: String,
}

/// A registered media image. `file` is an opaque reference into the
/// external object store and is unique per row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,
    pub file: String,
    pub width: u32,
    pub height: u32,
    pub uploaded_at: DateTime<Utc>,
}

/// The single-row site configuration record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub title: String,
    pub description: String,
    pub avatar: Option<String>,
    pub favicon: Option<String>,
}

/// Caller-facing projection of a category.
///
/// Unlike [`Category`], the id is optional: the two synthetic categories
/// ("all posts" with no id, "uncategorized" with id 0) exist only as
/// response values and are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryView {
    pub id: Option<CategoryId>,
    pub name: String,
    pub description: String,
    pub is_hidden: bool,
    pub cover_image: Option<String>,
    pub subcategory_of: Option<CategoryId>,
    pub level: u32,
}

impl CategoryView {
    /// The virtual root: every post on the blog.
    pub fn all_posts() -> Self {
        Self {
            id: None,
            name: ALL_POSTS_NAME.to_string(),
            description: ALL_POSTS_DESCRIPTION.to_string(),
            is_hidden: false,
            cover_image: None,
            subcategory_of: None,
            level: 0,
        }
    }

    /// The "no category" bucket (id 0).
    pub fn uncategorized() -> Self {
        Self {
            id: Some(UNCATEGORIZED),
            name: UNCATEGORIZED_NAME.to_string(),
            description: UNCATEGORIZED_DESCRIPTION.to_string(),
            is_hidden: false,
            cover_image: None,
            subcategory_of: None,
            level: 0,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self.id, None | Some(UNCATEGORIZED))
    }
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            id: Some(category.id),
            name: category.name.clone(),
            description: category.description.clone(),
            is_hidden: category.is_hidden,
            cover_image: category.cover_image.clone(),
            subcategory_of: category.subcategory_of,
            level: category.level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_viewer_fails_auth_guard() {
        assert!(Viewer::anonymous().require_auth().is_err());
        assert!(Viewer::author().require_auth().is_ok());
    }

    #[test]
    fn synthetic_views_are_level_zero() {
        let all = CategoryView::all_posts();
        assert_eq!(all.id, None);
        assert_eq!(all.level, 0);
        assert!(all.is_synthetic());

        let none = CategoryView::uncategorized();
        assert_eq!(none.id, Some(UNCATEGORIZED));
        assert!(none.is_synthetic());
    }

    #[test]
    fn content_body_serialization_roundtrip() {
        let body = ContentBody {
            title: "Hello".into(),
            content: "<p>Hello</p>".into(),
            text_content: "Hello".into(),
            thumbnail: None,
            images: vec!["media/a_1.png".into()],
            tags: BTreeSet::from(["rust".to_string()]),
        };
        let json = serde_json::to_string(&body).unwrap();
        let loaded: ContentBody = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, body);
    }
}
