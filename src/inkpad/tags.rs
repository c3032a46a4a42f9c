//! # Tag Lifecycle Manager
//!
//! Content rows attach tags by name; the hashtag registry carries tag
//! identity. [`sync`] reconciles the registry against one content item's
//! tag-set change: names being added are found-or-created, names being
//! removed are optionally garbage-collected once nothing references them.
//!
//! `sync` must run inside the same [`crate::store::BlogStore::transaction`]
//! as the content save, after the content row has been written with its
//! new tag set — the orphan scan looks at saved rows.

use crate::error::Result;
use crate::store::{BlogStore, StorageBackend};
use std::collections::BTreeSet;

/// Number of content items (posts including soft-deleted ones, drafts,
/// templates) currently attached to `name`.
pub fn attachment_count<B: StorageBackend>(store: &BlogStore<B>, name: &str) -> usize {
    let in_posts = store
        .posts()
        .iter()
        .filter(|p| p.body.tags.contains(name))
        .count();
    let in_drafts = store
        .drafts()
        .iter()
        .filter(|d| d.body.tags.contains(name))
        .count();
    let in_templates = store
        .templates()
        .iter()
        .filter(|t| t.body.tags.contains(name))
        .count();
    in_posts + in_drafts + in_templates
}

/// Reconcile the hashtag registry with a content item's tag-set change
/// from `previous` to `desired`.
///
/// Idempotent: running it again with the same sets is a no-op — no
/// duplicate rows, no re-creation.
pub fn sync<B: StorageBackend>(
    store: &mut BlogStore<B>,
    previous: &BTreeSet<String>,
    desired: &BTreeSet<String>,
    delete_orphans: bool,
) -> Result<()> {
    for name in desired.difference(previous) {
        if store.hashtag_by_name(name).is_none() {
            store.insert_hashtag(name)?;
        }
    }

    for name in previous.difference(desired) {
        if !delete_orphans {
            continue;
        }
        if attachment_count(store, name) == 0 {
            if let Some(tag) = store.hashtag_by_name(name) {
                store.delete_hashtag(tag.id)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;

    fn names(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn adding_creates_registry_rows_on_demand() {
        let mut fixture = StoreFixture::new();
        sync(&mut fixture.store, &names(&[]), &names(&["rust", "web"]), false).unwrap();
        assert!(fixture.store.hashtag_by_name("rust").is_some());
        assert!(fixture.store.hashtag_by_name("web").is_some());
    }

    #[test]
    fn sync_is_idempotent() {
        let mut fixture = StoreFixture::new();
        let desired = names(&["rust"]);
        sync(&mut fixture.store, &names(&[]), &desired, false).unwrap();
        let id = fixture.store.hashtag_by_name("rust").unwrap().id;

        sync(&mut fixture.store, &desired, &desired, true).unwrap();
        assert_eq!(fixture.store.hashtags().len(), 1);
        assert_eq!(fixture.store.hashtag_by_name("rust").unwrap().id, id);
    }

    #[test]
    fn orphan_is_collected_only_when_opted_in() {
        // tag exists in registry, no content references it after removal
        let mut fixture = StoreFixture::new();
        sync(&mut fixture.store, &names(&[]), &names(&["foo"]), false).unwrap();

        sync(&mut fixture.store, &names(&["foo"]), &names(&[]), false).unwrap();
        assert!(fixture.store.hashtag_by_name("foo").is_some());

        sync(&mut fixture.store, &names(&["foo"]), &names(&[]), true).unwrap();
        assert!(fixture.store.hashtag_by_name("foo").is_none());
    }

    #[test]
    fn referenced_tag_survives_orphan_collection() {
        let mut fixture = StoreFixture::new().with_tagged_post("Rust intro", &["rust"]);
        // another item detaches "rust"; the post above still holds it
        sync(&mut fixture.store, &names(&["rust"]), &names(&[]), true).unwrap();
        assert!(fixture.store.hashtag_by_name("rust").is_some());
    }

    #[test]
    fn attachment_count_spans_all_content_kinds() {
        let fixture = StoreFixture::new()
            .with_tagged_post("One", &["shared"])
            .with_tagged_post("Two", &["shared"]);
        assert_eq!(attachment_count(&fixture.store, "shared"), 2);
        assert_eq!(attachment_count(&fixture.store, "absent"), 0);
    }
}
