//! # Command Layer
//!
//! The business logic of the backend. Each content kind lives in its own
//! submodule with plain functions over a generic [`crate::store::BlogStore`];
//! the [`crate::api::BlogApi`] facade is a thin dispatcher on top.
//!
//! Conventions shared by every command:
//!
//! - The caller's [`crate::model::Viewer`] is an explicit parameter; no
//!   ambient request state.
//! - Queries return typed views, never render anything.
//! - Mutations require authentication, run inside one store transaction
//!   and roll back fully on any failure.
//! - Lookup failures surface as `NotFound`/`PermissionDenied`/
//!   `InvalidValue` at the command boundary; raw storage errors never
//!   leak out of mutations.

use crate::error::{BlogError, Result};
use crate::model::{CategoryId, Post, Viewer, UNCATEGORIZED};
use crate::store::{BlogStore, StorageBackend};
use crate::visibility;

pub mod category;
pub mod draft;
pub mod hashtag;
pub mod image;
pub mod info;
pub mod post;
pub mod template;

/// Resolve a category reference supplied on a write path.
///
/// `None` and the `UNCATEGORIZED` sentinel both mean "no category". A
/// real id must name a live (non-deleted) category, otherwise the input
/// is invalid.
/// Every post the viewer may see, with category-hidden state resolved.
/// Soft-deleted posts are excluded for everyone.
pub(crate) fn visible_posts<B: StorageBackend>(store: &BlogStore<B>, viewer: Viewer) -> Vec<Post> {
    store
        .posts()
        .into_iter()
        .filter(|post| {
            let category = post.category.and_then(|id| store.category(id).ok());
            visibility::post_visible(viewer, post, category.as_ref())
        })
        .collect()
}

pub(crate) fn resolve_category_for_write<B: StorageBackend>(
    store: &BlogStore<B>,
    category: Option<CategoryId>,
) -> Result<Option<CategoryId>> {
    match category {
        None | Some(UNCATEGORIZED) => Ok(None),
        Some(id) => {
            let row = store
                .category(id)
                .map_err(|_| BlogError::InvalidValue("category does not exist".to_string()))?;
            if row.is_deleted {
                return Err(BlogError::InvalidValue("category does not exist".to_string()));
            }
            Ok(Some(id))
        }
    }
}
