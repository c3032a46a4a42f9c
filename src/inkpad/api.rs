//! # API Facade
//!
//! The single entry point for every blog operation, regardless of the
//! surface calling it (CLI here, an HTTP adapter elsewhere).
//!
//! The facade dispatches to the command layer and nothing more: no
//! business logic, no I/O, no presentation. It holds the store and the
//! caller's [`Viewer`]; commands receive both explicitly.
//!
//! `BlogApi<B: StorageBackend>` is generic over the storage backend:
//! production uses `BlogApi<FsBackend>`, tests use `BlogApi<MemBackend>`.

use crate::commands;
use crate::commands::category::{CategoryInput, CategoryNode, CategoryPatch};
use crate::commands::draft::{DraftInput, DraftPatch};
use crate::commands::image::ImageView;
use crate::commands::info::InfoPatch;
use crate::commands::post::{PageRequest, PostFilter, PostInput, PostPatch, PostView};
use crate::commands::template::{TemplateInput, TemplatePatch};
use crate::error::Result;
use crate::model::{
    CategoryId, CategoryView, Draft, DraftId, Hashtag, Image, ImageId, PostId, SiteInfo, Template,
    TemplateId, Viewer,
};
use crate::pagination::Page;
use crate::store::{BlogStore, StorageBackend};

pub struct BlogApi<B: StorageBackend> {
    store: BlogStore<B>,
    viewer: Viewer,
}

impl<B: StorageBackend> BlogApi<B> {
    pub fn new(store: BlogStore<B>, viewer: Viewer) -> Self {
        Self { store, viewer }
    }

    pub fn viewer(&self) -> Viewer {
        self.viewer
    }

    // --- Categories ---

    pub fn category(
        &self,
        id: Option<CategoryId>,
        include_deleted: bool,
    ) -> Result<CategoryView> {
        commands::category::get(&self.store, self.viewer, id, include_deleted)
    }

    pub fn categories(&self) -> Vec<CategoryView> {
        commands::category::list(&self.store, self.viewer)
    }

    pub fn category_hierarchy(&self) -> Vec<CategoryNode> {
        commands::category::hierarchy(&self.store, self.viewer)
    }

    pub fn category_ancestors(&self, id: Option<CategoryId>) -> Result<Vec<CategoryView>> {
        commands::category::ancestors(&self.store, self.viewer, id)
    }

    pub fn valid_supercategories(&self, id: CategoryId) -> Result<Vec<CategoryView>> {
        commands::category::valid_supercategories(&self.store, self.viewer, id)
    }

    pub fn category_post_count(
        &self,
        id: Option<CategoryId>,
        exclude_subcategories: bool,
    ) -> Result<usize> {
        commands::category::post_count(&self.store, self.viewer, id, exclude_subcategories)
    }

    pub fn create_category(&mut self, input: CategoryInput) -> Result<CategoryView> {
        commands::category::create(&mut self.store, self.viewer, input)
    }

    pub fn update_category(&mut self, id: CategoryId, patch: CategoryPatch) -> Result<CategoryView> {
        commands::category::update(&mut self.store, self.viewer, id, patch)
    }

    pub fn delete_category(&mut self, id: CategoryId, delete_posts: bool) -> Result<()> {
        commands::category::delete(&mut self.store, self.viewer, id, delete_posts)
    }

    // --- Posts ---

    pub fn post(&self, id: PostId, include_deleted: bool) -> Result<PostView> {
        commands::post::get(&self.store, self.viewer, id, include_deleted)
    }

    pub fn posts(&self, filter: &PostFilter, page: &PageRequest) -> Result<Page<PostView>> {
        commands::post::list(&self.store, self.viewer, filter, page)
    }

    pub fn create_post(&mut self, input: PostInput) -> Result<PostView> {
        commands::post::create(&mut self.store, self.viewer, input)
    }

    pub fn update_post(
        &mut self,
        id: PostId,
        patch: PostPatch,
        delete_orphan_tags: bool,
    ) -> Result<PostView> {
        commands::post::update(&mut self.store, self.viewer, id, patch, delete_orphan_tags)
    }

    pub fn delete_post(&mut self, id: PostId, delete_orphan_tags: bool) -> Result<()> {
        commands::post::delete(&mut self.store, self.viewer, id, delete_orphan_tags)
    }

    // --- Drafts ---

    pub fn draft(&self, id: DraftId) -> Result<Draft> {
        commands::draft::get(&self.store, self.viewer, id)
    }

    pub fn drafts(&self) -> Result<Vec<Draft>> {
        commands::draft::list(&self.store, self.viewer)
    }

    pub fn create_draft(&mut self, input: DraftInput) -> Result<Draft> {
        commands::draft::create(&mut self.store, self.viewer, input)
    }

    pub fn update_draft(
        &mut self,
        id: DraftId,
        patch: DraftPatch,
        delete_orphan_tags: bool,
    ) -> Result<Draft> {
        commands::draft::update(&mut self.store, self.viewer, id, patch, delete_orphan_tags)
    }

    pub fn delete_draft(&mut self, id: DraftId, delete_orphan_tags: bool) -> Result<()> {
        commands::draft::delete(&mut self.store, self.viewer, id, delete_orphan_tags)
    }

    // --- Templates ---

    pub fn template(&self, id: TemplateId) -> Result<Template> {
        commands::template::get(&self.store, self.viewer, id)
    }

    pub fn templates(&self) -> Result<Vec<Template>> {
        commands::template::list(&self.store, self.viewer)
    }

    pub fn create_template(&mut self, input: TemplateInput) -> Result<Template> {
        commands::template::create(&mut self.store, self.viewer, input)
    }

    pub fn update_template(
        &mut self,
        id: TemplateId,
        patch: TemplatePatch,
        delete_orphan_tags: bool,
    ) -> Result<Template> {
        commands::template::update(&mut self.store, self.viewer, id, patch, delete_orphan_tags)
    }

    pub fn delete_template(&mut self, id: TemplateId, delete_orphan_tags: bool) -> Result<()> {
        commands::template::delete(&mut self.store, self.viewer, id, delete_orphan_tags)
    }

    // --- Hashtags ---

    pub fn hashtag(&self, name: &str) -> Result<Option<Hashtag>> {
        commands::hashtag::get(&self.store, self.viewer, name)
    }

    pub fn hashtags(&self, keyword: Option<&str>, limit: Option<usize>) -> Result<Vec<Hashtag>> {
        commands::hashtag::list(&self.store, self.viewer, keyword, limit)
    }

    // --- Images ---

    pub fn image(&self, id: Option<ImageId>, url: Option<&str>) -> Result<ImageView> {
        commands::image::get(&self.store, self.viewer, id, url)
    }

    pub fn images(&self) -> Result<Vec<ImageView>> {
        commands::image::list(&self.store, self.viewer)
    }

    pub fn upload_image(&mut self, filename: &str, width: u32, height: u32) -> Result<Image> {
        commands::image::register(&mut self.store, self.viewer, filename, width, height)
    }

    pub fn delete_image(&mut self, url: &str) -> Result<()> {
        commands::image::delete(&mut self.store, self.viewer, url)
    }

    pub fn delete_images(&mut self, urls: &[String]) -> Result<()> {
        commands::image::delete_many(&mut self.store, self.viewer, urls)
    }

    // --- Site info ---

    pub fn site_info(&self) -> SiteInfo {
        commands::info::get(&self.store)
    }

    pub fn update_info(&mut self, patch: InfoPatch) -> Result<SiteInfo> {
        commands::info::update(&mut self.store, self.viewer, patch)
    }
}
