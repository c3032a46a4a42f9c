//! # Storage Layer
//!
//! Persistence is split in two, with the backend handling the "how" and
//! [`BlogStore`] handling the "what":
//!
//! - [`StorageBackend`] loads and persists one [`State`] document — the
//!   whole blog as a single serializable value.
//! - [`BlogStore`] keeps the live `State` in memory, exposes typed CRUD
//!   per entity, assigns ids, and provides snapshot transactions.
//!
//! ## Transactions
//!
//! Every mutation that touches more than one row (hidden cascade, tag
//! sync, category delete) runs through [`BlogStore::transaction`]: the
//! state is checkpointed, the closure runs, and on success the backend
//! persists. Any failure — including a persist failure — restores the
//! checkpoint, so tags are never half-attached and cascades never stop
//! halfway.
//!
//! ## Implementations
//!
//! - [`memory::MemBackend`]: keeps the persisted document in memory; for
//!   tests and ephemeral use.
//! - [`fs::FsBackend`]: one pretty-printed JSON file, written atomically
//!   (temp file + rename).

use crate::error::{BlogError, Result};
use crate::model::{
    Category, CategoryId, Draft, DraftId, Hashtag, HashtagId, Image, ImageId, Post, PostId,
    SiteInfo, Template, TemplateId,
};
use crate::tree;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod fs;
pub mod memory;

/// The complete persisted state of a blog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub categories: BTreeMap<CategoryId, Category>,
    #[serde(default)]
    pub posts: BTreeMap<PostId, Post>,
    #[serde(default)]
    pub drafts: BTreeMap<DraftId, Draft>,
    #[serde(default)]
    pub templates: BTreeMap<TemplateId, Template>,
    #[serde(default)]
    pub hashtags: BTreeMap<HashtagId, Hashtag>,
    #[serde(default)]
    pub images: BTreeMap<ImageId, Image>,
    #[serde(default)]
    pub site_info: Option<SiteInfo>,
    #[serde(default)]
    next_ids: NextIds,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct NextIds {
    category: CategoryId,
    post: PostId,
    draft: DraftId,
    template: TemplateId,
    hashtag: HashtagId,
    image: ImageId,
}

impl State {
    /// Repair id counters against the actual rows. Documents written by
    /// hand (or by older versions without counters) stay usable.
    fn normalize(&mut self) {
        fn floor<V>(counter: &mut u32, rows: &BTreeMap<u32, V>) {
            let min = rows.keys().next_back().map_or(1, |max| max + 1);
            if *counter < min {
                *counter = min;
            }
        }
        floor(&mut self.next_ids.category, &self.categories);
        floor(&mut self.next_ids.post, &self.posts);
        floor(&mut self.next_ids.draft, &self.drafts);
        floor(&mut self.next_ids.template, &self.templates);
        floor(&mut self.next_ids.hashtag, &self.hashtags);
        floor(&mut self.next_ids.image, &self.images);
    }
}

/// Abstract interface for raw state I/O: where the document lives and how
/// it is read and written. `BlogStore` owns everything above that.
pub trait StorageBackend {
    /// Load the state document, or a default state if none exists yet.
    fn load(&mut self) -> Result<State>;

    /// Persist the state document. Must be atomic: a crash mid-write may
    /// lose the update but never corrupt the previous document.
    fn persist(&mut self, state: &State) -> Result<()>;
}

/// An opaque snapshot of store state, produced by [`BlogStore::checkpoint`].
pub struct Checkpoint(State);

/// Typed data access over a [`StorageBackend`].
pub struct BlogStore<B: StorageBackend> {
    state: State,
    backend: B,
}

impl BlogStore<memory::MemBackend> {
    /// A fresh, empty in-memory store.
    pub fn in_memory() -> Self {
        Self::open(memory::MemBackend::new()).expect("memory backend cannot fail to load")
    }
}

impl<B: StorageBackend> BlogStore<B> {
    pub fn open(mut backend: B) -> Result<Self> {
        let mut state = backend.load()?;
        state.normalize();
        Ok(Self { state, backend })
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.state.clone())
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.state = checkpoint.0;
    }

    /// Run `f` as one atomic unit: on success the state is persisted, on
    /// any failure (including persist) the pre-transaction state is
    /// restored before the error is surfaced.
    pub fn transaction<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let checkpoint = self.checkpoint();
        let outcome = f(self).and_then(|value| {
            self.backend.persist(&self.state)?;
            Ok(value)
        });
        if outcome.is_err() {
            self.restore(checkpoint);
        }
        outcome
    }

    // --- Categories ---

    pub fn insert_category(&mut self, mut category: Category) -> Category {
        category.id = self.state.next_ids.category.max(1);
        self.state.next_ids.category = category.id + 1;
        self.state.categories.insert(category.id, category.clone());
        category
    }

    pub fn category(&self, id: CategoryId) -> Result<Category> {
        self.state
            .categories
            .get(&id)
            .cloned()
            .ok_or_else(|| BlogError::NotFound("category".to_string()))
    }

    pub fn categories(&self) -> Vec<Category> {
        let mut rows: Vec<Category> = self.state.categories.values().cloned().collect();
        rows.sort_by_key(|c| (c.tree_id, c.lft));
        rows
    }

    /// The raw category map, for the range queries in [`crate::tree`].
    pub fn category_map(&self) -> &BTreeMap<CategoryId, Category> {
        &self.state.categories
    }

    pub fn save_category(&mut self, category: &Category) -> Result<()> {
        if !self.state.categories.contains_key(&category.id) {
            return Err(BlogError::NotFound("category".to_string()));
        }
        self.state.categories.insert(category.id, category.clone());
        Ok(())
    }

    /// Re-derive nested-set metadata after a structural change. Fails if
    /// the parent references no longer form a forest.
    pub fn rebuild_tree(&mut self) -> Result<()> {
        tree::rebuild(&mut self.state.categories)
    }

    // --- Posts ---

    pub fn insert_post(&mut self, mut post: Post) -> Post {
        post.id = self.state.next_ids.post.max(1);
        self.state.next_ids.post = post.id + 1;
        self.state.posts.insert(post.id, post.clone());
        post
    }

    pub fn post(&self, id: PostId) -> Result<Post> {
        self.state
            .posts
            .get(&id)
            .cloned()
            .ok_or_else(|| BlogError::NotFound("post".to_string()))
    }

    pub fn posts(&self) -> Vec<Post> {
        self.state.posts.values().cloned().collect()
    }

    pub fn save_post(&mut self, post: &Post) -> Result<()> {
        if !self.state.posts.contains_key(&post.id) {
            return Err(BlogError::NotFound("post".to_string()));
        }
        self.state.posts.insert(post.id, post.clone());
        Ok(())
    }

    // --- Drafts ---

    pub fn insert_draft(&mut self, mut draft: Draft) -> Draft {
        draft.id = self.state.next_ids.draft.max(1);
        self.state.next_ids.draft = draft.id + 1;
        self.state.drafts.insert(draft.id, draft.clone());
        draft
    }

    pub fn draft(&self, id: DraftId) -> Result<Draft> {
        self.state
            .drafts
            .get(&id)
            .cloned()
            .ok_or_else(|| BlogError::NotFound("draft".to_string()))
    }

    pub fn drafts(&self) -> Vec<Draft> {
        self.state.drafts.values().cloned().collect()
    }

    pub fn save_draft(&mut self, draft: &Draft) -> Result<()> {
        if !self.state.drafts.contains_key(&draft.id) {
            return Err(BlogError::NotFound("draft".to_string()));
        }
        self.state.drafts.insert(draft.id, draft.clone());
        Ok(())
    }

    pub fn delete_draft(&mut self, id: DraftId) -> Result<()> {
        self.state
            .drafts
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| BlogError::NotFound("draft".to_string()))
    }

    // --- Templates ---

    pub fn insert_template(&mut self, mut template: Template) -> Template {
        template.id = self.state.next_ids.template.max(1);
        self.state.next_ids.template = template.id + 1;
        self.state.templates.insert(template.id, template.clone());
        template
    }

    pub fn template(&self, id: TemplateId) -> Result<Template> {
        self.state
            .templates
            .get(&id)
            .cloned()
            .ok_or_else(|| BlogError::NotFound("template".to_string()))
    }

    pub fn templates(&self) -> Vec<Template> {
        let mut rows: Vec<Template> = self.state.templates.values().cloned().collect();
        rows.sort_by(|a, b| a.template_name.cmp(&b.template_name));
        rows
    }

    pub fn save_template(&mut self, template: &Template) -> Result<()> {
        if !self.state.templates.contains_key(&template.id) {
            return Err(BlogError::NotFound("template".to_string()));
        }
        self.state.templates.insert(template.id, template.clone());
        Ok(())
    }

    pub fn delete_template(&mut self, id: TemplateId) -> Result<()> {
        self.state
            .templates
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| BlogError::NotFound("template".to_string()))
    }

    // --- Hashtags ---

    pub fn hashtags(&self) -> Vec<Hashtag> {
        let mut rows: Vec<Hashtag> = self.state.hashtags.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }

    pub fn hashtag_by_name(&self, name: &str) -> Option<Hashtag> {
        self.state
            .hashtags
            .values()
            .find(|tag| tag.name == name)
            .cloned()
    }

    /// Insert a new hashtag row. The name is unique; inserting a
    /// duplicate is a constraint violation.
    pub fn insert_hashtag(&mut self, name: &str) -> Result<Hashtag> {
        if self.hashtag_by_name(name).is_some() {
            return Err(BlogError::Internal(format!(
                "hashtag name '{name}' already exists"
            )));
        }
        let id = self.state.next_ids.hashtag.max(1);
        self.state.next_ids.hashtag = id + 1;
        let tag = Hashtag {
            id,
            name: name.to_string(),
        };
        self.state.hashtags.insert(id, tag.clone());
        Ok(tag)
    }

    pub fn delete_hashtag(&mut self, id: HashtagId) -> Result<()> {
        self.state
            .hashtags
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| BlogError::NotFound("hashtag".to_string()))
    }

    // --- Images ---

    pub fn insert_image(&mut self, mut image: Image) -> Result<Image> {
        if self.state.images.values().any(|row| row.file == image.file) {
            return Err(BlogError::Internal(format!(
                "image file '{}' already registered",
                image.file
            )));
        }
        image.id = self.state.next_ids.image.max(1);
        self.state.next_ids.image = image.id + 1;
        self.state.images.insert(image.id, image.clone());
        Ok(image)
    }

    pub fn image(&self, id: ImageId) -> Result<Image> {
        self.state
            .images
            .get(&id)
            .cloned()
            .ok_or_else(|| BlogError::NotFound("image".to_string()))
    }

    pub fn images(&self) -> Vec<Image> {
        let mut rows: Vec<Image> = self.state.images.values().cloned().collect();
        rows.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
        rows
    }

    pub fn delete_image(&mut self, id: ImageId) -> Result<()> {
        self.state
            .images
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| BlogError::NotFound("image".to_string()))
    }

    // --- Site info ---

    pub fn site_info(&self) -> Option<SiteInfo> {
        self.state.site_info.clone()
    }

    pub fn save_site_info(&mut self, info: &SiteInfo) {
        self.state.site_info = Some(info.clone());
    }
}
