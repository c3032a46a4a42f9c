//! Post commands: CRUD plus the listing pipeline.
//!
//! The pipeline runs in a fixed order: category scope, soft-delete and
//! visibility filters, keyword filter, tag filter, highlight computation,
//! ordering, pagination. Keywords are ANDed with each other; a keyword
//! supplied through the combined parameter may match either field.

use crate::commands::{resolve_category_for_write, visible_posts};
use crate::error::{BlogError, Result};
use crate::model::{CategoryId, CategoryView, ContentBody, Post, PostId, Viewer, UNCATEGORIZED};
use crate::pagination::{anchored_offset, paginate, Page};
use crate::search::{
    find_matching_intervals, longest_matched_text, matched_tag_count, split_keywords, Span,
};
use crate::store::{BlogStore, StorageBackend};
use crate::tags;
use crate::tree;
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeSet;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderBy {
    #[default]
    Recent,
    Relevant,
}

impl FromStr for OrderBy {
    type Err = BlogError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "recent" => Ok(OrderBy::Recent),
            "relevant" => Ok(OrderBy::Relevant),
            other => Err(BlogError::InvalidValue(format!(
                "unknown order mode '{other}'"
            ))),
        }
    }
}

/// Listing filter. `category` follows the read-path convention: `None`
/// means no scope filter, id 0 means the uncategorized bucket. The three
/// keyword parameters differ only in which fields they target.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub category: Option<CategoryId>,
    pub keywords: Option<String>,
    pub title_keywords: Option<String>,
    pub content_keywords: Option<String>,
    pub tags: Vec<String>,
    pub order_by: OrderBy,
}

/// Page selection: an explicit offset, or a target post the returned
/// page must contain.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub page_size: Option<usize>,
    pub offset: usize,
    pub target_post: Option<PostId>,
}

/// A listed post with its resolved category and highlight spans. Spans
/// are byte offsets into the lowercased title / plain-text content and
/// are empty when the listing had no keyword query.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub post: Post,
    pub category: CategoryView,
    pub title_highlights: Vec<Span>,
    pub content_highlights: Vec<Span>,
}

/// One keyword and the fields it must be found in.
struct KeywordTarget {
    keyword: String,
    in_title: bool,
    in_content: bool,
}

fn keyword_targets(filter: &PostFilter) -> Vec<KeywordTarget> {
    let mut targets: Vec<KeywordTarget> = Vec::new();
    let mut add = |raw: &Option<String>, in_title: bool, in_content: bool| {
        for keyword in split_keywords(raw.as_deref().unwrap_or_default()) {
            match targets.iter_mut().find(|t| t.keyword == keyword) {
                Some(existing) => {
                    existing.in_title |= in_title;
                    existing.in_content |= in_content;
                }
                None => targets.push(KeywordTarget {
                    keyword,
                    in_title,
                    in_content,
                }),
            }
        }
    };
    add(&filter.keywords, true, true);
    add(&filter.title_keywords, true, false);
    add(&filter.content_keywords, false, true);
    targets
}

fn category_view<B: StorageBackend>(store: &BlogStore<B>, post: &Post) -> CategoryView {
    match post.category {
        None => CategoryView::uncategorized(),
        Some(id) => store
            .category(id)
            .as_ref()
            .map(CategoryView::from)
            .unwrap_or_else(|_| CategoryView::uncategorized()),
    }
}

/// Run the listing pipeline and return one page of results.
pub fn list<B: StorageBackend>(
    store: &BlogStore<B>,
    viewer: Viewer,
    filter: &PostFilter,
    page: &PageRequest,
) -> Result<Page<PostView>> {
    if page.page_size == Some(0) {
        return Err(BlogError::InvalidValue(
            "page size must be positive".to_string(),
        ));
    }

    // 1. category scope: a missing or deleted scope category yields an
    // empty result, a hidden one is an authorization failure
    let scope: Option<BTreeSet<CategoryId>> = match filter.category {
        None => None,
        Some(UNCATEGORIZED) => Some(BTreeSet::new()),
        Some(id) => match store.category(id) {
            Err(_) => return Ok(paginate(Vec::new(), page.page_size, page.offset)),
            Ok(category) => {
                if category.is_deleted {
                    return Ok(paginate(Vec::new(), page.page_size, page.offset));
                }
                if category.is_hidden && !viewer.authenticated {
                    return Err(BlogError::PermissionDenied(
                        "category is hidden".to_string(),
                    ));
                }
                Some(tree::descendant_ids(store.category_map(), id, true)?)
            }
        },
    };

    // 2 + 3. soft-delete and visibility
    let mut posts = visible_posts(store, viewer);
    if let Some(scope) = &scope {
        if filter.category == Some(UNCATEGORIZED) {
            posts.retain(|p| p.category.is_none());
        } else {
            posts.retain(|p| p.category.is_some_and(|c| scope.contains(&c)));
        }
    }

    // 4. keywords: every keyword must appear in at least one targeted field
    let targets = keyword_targets(filter);
    if !targets.is_empty() {
        posts.retain(|post| {
            let title = post.body.title.to_lowercase();
            let content = post.body.text_content.to_lowercase();
            targets.iter().all(|t| {
                (t.in_title && title.contains(&t.keyword))
                    || (t.in_content && content.contains(&t.keyword))
            })
        });
    }

    // 5. tags: at least one of the requested names
    if !filter.tags.is_empty() {
        posts.retain(|post| post.body.tags.iter().any(|tag| filter.tags.contains(tag)));
    }

    // 6. highlights
    let title_set: BTreeSet<String> = targets
        .iter()
        .filter(|t| t.in_title)
        .map(|t| t.keyword.clone())
        .collect();
    let content_set: BTreeSet<String> = targets
        .iter()
        .filter(|t| t.in_content)
        .map(|t| t.keyword.clone())
        .collect();
    let mut views: Vec<PostView> = posts
        .into_iter()
        .map(|post| {
            let title_highlights =
                find_matching_intervals(&post.body.title.to_lowercase(), &title_set);
            let content_highlights =
                find_matching_intervals(&post.body.text_content.to_lowercase(), &content_set);
            let category = category_view(store, &post);
            PostView {
                post,
                category,
                title_highlights,
                content_highlights,
            }
        })
        .collect();

    // 7. ordering: recent first, then a stable relevance re-sort so ties
    // keep chronological order
    views.sort_by(|a, b| {
        b.post
            .created_at
            .cmp(&a.post.created_at)
            .then(b.post.id.cmp(&a.post.id))
    });
    if filter.order_by == OrderBy::Relevant {
        if !filter.tags.is_empty() {
            views.sort_by(|a, b| {
                matched_tag_count(&b.post.body.tags, &filter.tags)
                    .cmp(&matched_tag_count(&a.post.body.tags, &filter.tags))
            });
        } else if !targets.is_empty() {
            views.sort_by(|a, b| {
                longest_matched_text(&b.title_highlights, &b.content_highlights).cmp(
                    &longest_matched_text(&a.title_highlights, &a.content_highlights),
                )
            });
        }
    }

    // 8. pagination, anchored on the target post when one is given
    let offset = match page.target_post {
        None => page.offset,
        Some(target) => {
            let position = views
                .iter()
                .position(|view| view.post.id == target)
                .ok_or_else(|| BlogError::NotFound("post".to_string()))?;
            let page_size = page.page_size.unwrap_or_else(|| views.len().max(1));
            anchored_offset(position, page_size)
        }
    };
    Ok(paginate(views, page.page_size, offset))
}

/// Fetch one post. `include_deleted` flips the lookup to soft-deleted
/// rows and requires authentication.
pub fn get<B: StorageBackend>(
    store: &BlogStore<B>,
    viewer: Viewer,
    id: PostId,
    include_deleted: bool,
) -> Result<PostView> {
    if include_deleted {
        viewer.require_auth()?;
    }
    let post = store.post(id)?;
    if post.is_deleted != include_deleted {
        return Err(BlogError::NotFound("post".to_string()));
    }
    if !viewer.authenticated {
        let category = post.category.and_then(|id| store.category(id).ok());
        if !crate::visibility::post_visible(viewer, &post, category.as_ref()) {
            return Err(BlogError::PermissionDenied("post is hidden".to_string()));
        }
    }
    let category = category_view(store, &post);
    Ok(PostView {
        post,
        category,
        title_highlights: Vec::new(),
        content_highlights: Vec::new(),
    })
}

pub struct PostInput {
    pub title: String,
    pub content: String,
    pub text_content: String,
    pub category: Option<CategoryId>,
    pub thumbnail: Option<String>,
    pub images: Vec<String>,
    pub tags: BTreeSet<String>,
    pub is_hidden: bool,
}

/// Partial update: `None` leaves a field untouched.
#[derive(Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub text_content: Option<String>,
    pub category: Option<Option<CategoryId>>,
    pub thumbnail: Option<Option<String>>,
    pub images: Option<Vec<String>>,
    pub tags: Option<BTreeSet<String>>,
    pub is_hidden: Option<bool>,
}

pub(crate) fn validate_references<B: StorageBackend>(
    store: &BlogStore<B>,
    thumbnail: &Option<String>,
    images: &[String],
) -> Result<()> {
    if let Some(reference) = thumbnail {
        super::image::require_reference(store, reference)?;
    }
    for reference in images {
        super::image::require_reference(store, reference)?;
    }
    Ok(())
}

pub fn create<B: StorageBackend>(
    store: &mut BlogStore<B>,
    viewer: Viewer,
    input: PostInput,
) -> Result<PostView> {
    viewer.require_auth()?;
    let category = resolve_category_for_write(store, input.category)?;
    validate_references(store, &input.thumbnail, &input.images)?;
    let now = Utc::now();
    let post = store.transaction(|store| {
        let post = store.insert_post(Post {
            id: 0,
            body: ContentBody {
                title: input.title.clone(),
                content: input.content.clone(),
                text_content: input.text_content.clone(),
                thumbnail: input.thumbnail.clone(),
                images: input.images.clone(),
                tags: input.tags.clone(),
            },
            category,
            is_hidden: input.is_hidden,
            is_deleted: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        });
        tags::sync(store, &BTreeSet::new(), &post.body.tags, false)?;
        Ok(post)
    })?;
    let category = category_view(store, &post);
    Ok(PostView {
        post,
        category,
        title_highlights: Vec::new(),
        content_highlights: Vec::new(),
    })
}

pub fn update<B: StorageBackend>(
    store: &mut BlogStore<B>,
    viewer: Viewer,
    id: PostId,
    patch: PostPatch,
    delete_orphan_tags: bool,
) -> Result<PostView> {
    viewer.require_auth()?;
    let mut post = store.post(id)?;
    if post.is_deleted {
        return Err(BlogError::NotFound("post".to_string()));
    }
    let previous_tags = post.body.tags.clone();

    if let Some(title) = patch.title {
        post.body.title = title;
    }
    if let Some(content) = patch.content {
        post.body.content = content;
    }
    if let Some(text_content) = patch.text_content {
        post.body.text_content = text_content;
    }
    if let Some(category) = patch.category {
        post.category = resolve_category_for_write(store, category)?;
    }
    if let Some(thumbnail) = patch.thumbnail {
        post.body.thumbnail = thumbnail;
    }
    if let Some(images) = patch.images {
        post.body.images = images;
    }
    if let Some(tags) = patch.tags {
        post.body.tags = tags;
    }
    if let Some(hidden) = patch.is_hidden {
        post.is_hidden = hidden;
    }
    validate_references(store, &post.body.thumbnail, &post.body.images)?;
    post.updated_at = Utc::now();

    let post = store.transaction(|store| {
        store.save_post(&post)?;
        tags::sync(store, &previous_tags, &post.body.tags, delete_orphan_tags)?;
        Ok(post)
    })?;
    let category = category_view(store, &post);
    Ok(PostView {
        post,
        category,
        title_highlights: Vec::new(),
        content_highlights: Vec::new(),
    })
}

/// Soft-delete a post. Its tags detach; orphaned registry rows are
/// collected only when `delete_orphan_tags` is set.
pub fn delete<B: StorageBackend>(
    store: &mut BlogStore<B>,
    viewer: Viewer,
    id: PostId,
    delete_orphan_tags: bool,
) -> Result<()> {
    viewer.require_auth()?;
    let mut post = store.post(id)?;
    if post.is_deleted {
        return Err(BlogError::NotFound("post".to_string()));
    }
    let previous_tags = std::mem::take(&mut post.body.tags);
    post.is_deleted = true;
    post.deleted_at = Some(Utc::now());

    store.transaction(|store| {
        store.save_post(&post)?;
        tags::sync(store, &previous_tags, &BTreeSet::new(), delete_orphan_tags)?;
        Ok(())
    })
}
