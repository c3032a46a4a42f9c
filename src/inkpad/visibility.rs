//! Pure visibility policy.
//!
//! Collections filter invisible items out silently; single-item fetches
//! surface `PermissionDenied` instead. Both paths decide through these
//! predicates so the two never disagree.

use crate::model::{Category, Post, Viewer};

/// A category is visible when it is not deleted and either the viewer is
/// authenticated or the category is not hidden.
pub fn category_visible(viewer: Viewer, category: &Category) -> bool {
    !category.is_deleted && (viewer.authenticated || !category.is_hidden)
}

/// A post is visible when it is not deleted and either the viewer is
/// authenticated or neither the post nor its category is hidden.
///
/// `category` is the post's resolved category row; a post with no
/// category is never excluded on the category-hidden clause.
pub fn post_visible(viewer: Viewer, post: &Post, category: Option<&Category>) -> bool {
    if post.is_deleted {
        return false;
    }
    if viewer.authenticated {
        return true;
    }
    let category_hidden = category.is_some_and(|c| c.is_hidden);
    !post.is_hidden && !category_hidden
}
