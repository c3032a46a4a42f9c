//! Draft commands. Drafts are author-only work in progress: every query
//! and mutation requires authentication, there is no visibility scoping
//! to apply, and deletion is a hard row delete.

use crate::commands::resolve_category_for_write;
use crate::error::Result;
use crate::model::{CategoryId, ContentBody, Draft, DraftId, Viewer};
use crate::store::{BlogStore, StorageBackend};
use crate::tags;
use chrono::Utc;
use std::collections::BTreeSet;

pub fn get<B: StorageBackend>(store: &BlogStore<B>, viewer: Viewer, id: DraftId) -> Result<Draft> {
    viewer.require_auth()?;
    store.draft(id)
}

/// All drafts, newest first.
pub fn list<B: StorageBackend>(store: &BlogStore<B>, viewer: Viewer) -> Result<Vec<Draft>> {
    viewer.require_auth()?;
    let mut drafts = store.drafts();
    drafts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    Ok(drafts)
}

pub struct DraftInput {
    pub title: String,
    pub content: String,
    pub text_content: String,
    pub category: Option<CategoryId>,
    pub thumbnail: Option<String>,
    pub images: Vec<String>,
    pub tags: BTreeSet<String>,
    pub is_hidden: bool,
}

#[derive(Default)]
pub struct DraftPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub text_content: Option<String>,
    pub category: Option<Option<CategoryId>>,
    pub thumbnail: Option<Option<String>>,
    pub images: Option<Vec<String>>,
    pub tags: Option<BTreeSet<String>>,
    pub is_hidden: Option<bool>,
}

pub fn create<B: StorageBackend>(
    store: &mut BlogStore<B>,
    viewer: Viewer,
    input: DraftInput,
) -> Result<Draft> {
    viewer.require_auth()?;
    let category = resolve_category_for_write(store, input.category)?;
    super::post::validate_references(store, &input.thumbnail, &input.images)?;
    store.transaction(|store| {
        let draft = store.insert_draft(Draft {
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
            created_at: Utc::now(),
        });
        tags::sync(store, &BTreeSet::new(), &draft.body.tags, false)?;
        Ok(draft)
    })
}

pub fn update<B: StorageBackend>(
    store: &mut BlogStore<B>,
    viewer: Viewer,
    id: DraftId,
    patch: DraftPatch,
    delete_orphan_tags: bool,
) -> Result<Draft> {
    viewer.require_auth()?;
    let mut draft = store.draft(id)?;
    let previous_tags = draft.body.tags.clone();

    if let Some(title) = patch.title {
        draft.body.title = title;
    }
    if let Some(content) = patch.content {
        draft.body.content = content;
    }
    if let Some(text_content) = patch.text_content {
        draft.body.text_content = text_content;
    }
    if let Some(category) = patch.category {
        draft.category = resolve_category_for_write(store, category)?;
    }
    if let Some(thumbnail) = patch.thumbnail {
        draft.body.thumbnail = thumbnail;
    }
    if let Some(images) = patch.images {
        draft.body.images = images;
    }
    if let Some(tags) = patch.tags {
        draft.body.tags = tags;
    }
    if let Some(hidden) = patch.is_hidden {
        draft.is_hidden = hidden;
    }
    super::post::validate_references(store, &draft.body.thumbnail, &draft.body.images)?;

    store.transaction(|store| {
        store.save_draft(&draft)?;
        tags::sync(store, &previous_tags, &draft.body.tags, delete_orphan_tags)?;
        Ok(draft)
    })
}

/// Hard-delete a draft, detaching its tags first.
pub fn delete<B: StorageBackend>(
    store: &mut BlogStore<B>,
    viewer: Viewer,
    id: DraftId,
    delete_orphan_tags: bool,
) -> Result<()> {
    viewer.require_auth()?;
    let draft = store.draft(id)?;
    store.transaction(|store| {
        store.delete_draft(id)?;
        tags::sync(store, &draft.body.tags, &BTreeSet::new(), delete_orphan_tags)?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BlogError;
    use crate::store::memory::fixtures::StoreFixture;

    fn input(title: &str, tags: &[&str]) -> DraftInput {
        DraftInput {
            title: title.to_string(),
            content: String::new(),
            text_content: String::new(),
            category: None,
            thumbnail: None,
            images: Vec::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            is_hidden: false,
        }
    }

    #[test]
    fn draft_queries_require_authentication() {
        let fixture = StoreFixture::new();
        assert!(matches!(
            list(&fixture.store, fixture.anonymous()),
            Err(BlogError::PermissionDenied(_))
        ));
        assert!(matches!(
            get(&fixture.store, fixture.anonymous(), 1),
            Err(BlogError::PermissionDenied(_))
        ));
    }

    #[test]
    fn create_then_delete_is_a_hard_delete() {
        let mut fixture = StoreFixture::new();
        let viewer = fixture.author();
        let draft = create(&mut fixture.store, viewer, input("wip", &[])).unwrap();
        delete(&mut fixture.store, viewer, draft.id, false).unwrap();
        assert!(matches!(
            fixture.store.draft(draft.id),
            Err(BlogError::NotFound(_))
        ));
    }

    #[test]
    fn delete_can_collect_orphaned_tags() {
        let mut fixture = StoreFixture::new();
        let viewer = fixture.author();
        let draft = create(&mut fixture.store, viewer, input("wip", &["lonely"])).unwrap();
        assert!(fixture.store.hashtag_by_name("lonely").is_some());
        delete(&mut fixture.store, viewer, draft.id, true).unwrap();
        assert!(fixture.store.hashtag_by_name("lonely").is_none());
    }

    #[test]
    fn update_patches_supplied_fields_only() {
        let mut fixture = StoreFixture::new();
        let viewer = fixture.author();
        let draft = create(&mut fixture.store, viewer, input("before", &[])).unwrap();
        let updated = update(
            &mut fixture.store,
            viewer,
            draft.id,
            DraftPatch {
                is_hidden: Some(true),
                ..Default::default()
            },
            false,
        )
        .unwrap();
        assert_eq!(updated.body.title, "before");
        assert!(updated.is_hidden);
    }
}
