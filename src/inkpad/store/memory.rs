use super::{State, StorageBackend};
use crate::error::Result;

/// In-memory persistence for testing and ephemeral use. "Persisted"
/// state survives reopening the same backend value, nothing more.
#[derive(Debug, Default, Clone)]
pub struct MemBackend {
    persisted: State,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemBackend {
    fn load(&mut self) -> Result<State> {
        Ok(self.persisted.clone())
    }

    fn persist(&mut self, state: &State) -> Result<()> {
        self.persisted = state.clone();
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use crate::model::{Category, ContentBody, Post, Viewer};
    use crate::store::{memory::MemBackend, BlogStore};
    use chrono::{Duration, Utc};
    use std::collections::BTreeSet;

    /// Builder for pre-populated in-memory stores.
    pub struct StoreFixture {
        pub store: BlogStore<MemBackend>,
        post_counter: i64,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: BlogStore::in_memory(),
                post_counter: 0,
            }
        }

        pub fn with_category(mut self, name: &str, parent: Option<u32>, hidden: bool) -> Self {
            self.store.insert_category(Category {
                id: 0,
                name: name.to_string(),
                description: format!("{name} posts"),
                is_hidden: hidden,
                is_deleted: false,
                cover_image: None,
                subcategory_of: parent,
                level: 0,
                lft: 0,
                rght: 0,
                tree_id: 0,
            });
            self.store.rebuild_tree().unwrap();
            self
        }

        /// Insert a post. Posts get strictly increasing creation times so
        /// `recent` ordering is deterministic: later fixtures are newer.
        pub fn with_post(mut self, title: &str, category: Option<u32>, hidden: bool) -> Self {
            self.post_counter += 1;
            let created = Utc::now() + Duration::seconds(self.post_counter);
            self.store.insert_post(Post {
                id: 0,
                body: ContentBody {
                    title: title.to_string(),
                    content: format!("<p>{title}</p>"),
                    text_content: title.to_string(),
                    thumbnail: None,
                    images: Vec::new(),
                    tags: BTreeSet::new(),
                },
                category,
                is_hidden: hidden,
                is_deleted: false,
                created_at: created,
                updated_at: created,
                deleted_at: None,
            });
            self
        }

        pub fn with_tagged_post(mut self, title: &str, tags: &[&str]) -> Self {
            self = self.with_post(title, None, false);
            let mut post = self.store.posts().into_iter().last().unwrap();
            post.body.tags = tags.iter().map(|t| t.to_string()).collect();
            for tag in tags {
                if self.store.hashtag_by_name(tag).is_none() {
                    self.store.insert_hashtag(tag).unwrap();
                }
            }
            self.store.save_post(&post).unwrap();
            self
        }

        pub fn author(&self) -> Viewer {
            Viewer::author()
        }

        pub fn anonymous(&self) -> Viewer {
            Viewer::anonymous()
        }
    }
}
