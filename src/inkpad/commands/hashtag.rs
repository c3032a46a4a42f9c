//! Hashtag queries. The registry is author-only; public callers see tags
//! only through the content that carries them.

use crate::error::Result;
use crate::model::{Hashtag, Viewer};
use crate::store::{BlogStore, StorageBackend};

pub fn get<B: StorageBackend>(
    store: &BlogStore<B>,
    viewer: Viewer,
    name: &str,
) -> Result<Option<Hashtag>> {
    viewer.require_auth()?;
    Ok(store.hashtag_by_name(name))
}

/// Registry rows in name order, optionally narrowed to a case-insensitive
/// name prefix and capped at `limit`.
pub fn list<B: StorageBackend>(
    store: &BlogStore<B>,
    viewer: Viewer,
    keyword: Option<&str>,
    limit: Option<usize>,
) -> Result<Vec<Hashtag>> {
    viewer.require_auth()?;
    let prefix = keyword.map(str::to_lowercase);
    let mut rows: Vec<Hashtag> = store
        .hashtags()
        .into_iter()
        .filter(|tag| match &prefix {
            Some(prefix) => tag.name.to_lowercase().starts_with(prefix),
            None => true,
        })
        .collect();
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BlogError;
    use crate::store::memory::fixtures::StoreFixture;

    fn registry() -> StoreFixture {
        let mut fixture = StoreFixture::new();
        for name in ["rust", "rustdoc", "web", "Ruby"] {
            fixture.store.insert_hashtag(name).unwrap();
        }
        fixture
    }

    #[test]
    fn prefix_match_is_case_insensitive() {
        let fixture = registry();
        let names: Vec<String> = list(&fixture.store, fixture.author(), Some("ru"), None)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Ruby", "rust", "rustdoc"]);
    }

    #[test]
    fn limit_caps_the_result() {
        let fixture = registry();
        let rows = list(&fixture.store, fixture.author(), None, Some(2)).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn lookup_by_name_is_exact() {
        let fixture = registry();
        assert!(get(&fixture.store, fixture.author(), "rust")
            .unwrap()
            .is_some());
        assert!(get(&fixture.store, fixture.author(), "rus")
            .unwrap()
            .is_none());
    }

    #[test]
    fn registry_is_author_only() {
        let fixture = registry();
        assert!(matches!(
            list(&fixture.store, fixture.anonymous(), None, None),
            Err(BlogError::PermissionDenied(_))
        ));
    }
}
