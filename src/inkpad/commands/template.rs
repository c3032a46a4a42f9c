//! Template commands. Templates are reusable content boilerplate with no
//! category, visibility or timestamps. Author-only, hard-deleted.

use crate::error::Result;
use crate::model::{ContentBody, Template, TemplateId, Viewer};
use crate::store::{BlogStore, StorageBackend};
use crate::tags;
use std::collections::BTreeSet;

pub fn get<B: StorageBackend>(
    store: &BlogStore<B>,
    viewer: Viewer,
    id: TemplateId,
) -> Result<Template> {
    viewer.require_auth()?;
    store.template(id)
}

/// All templates, ordered by template name.
pub fn list<B: StorageBackend>(store: &BlogStore<B>, viewer: Viewer) -> Result<Vec<Template>> {
    viewer.require_auth()?;
    Ok(store.templates())
}

pub struct TemplateInput {
    pub template_name: String,
    pub title: String,
    pub content: String,
    pub text_content: String,
    pub thumbnail: Option<String>,
    pub images: Vec<String>,
    pub tags: BTreeSet<String>,
}

#[derive(Default)]
pub struct TemplatePatch {
    pub template_name: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub text_content: Option<String>,
    pub thumbnail: Option<Option<String>>,
    pub images: Option<Vec<String>>,
    pub tags: Option<BTreeSet<String>>,
}

pub fn create<B: StorageBackend>(
    store: &mut BlogStore<B>,
    viewer: Viewer,
    input: TemplateInput,
) -> Result<Template> {
    viewer.require_auth()?;
    super::post::validate_references(store, &input.thumbnail, &input.images)?;
    store.transaction(|store| {
        let template = store.insert_template(Template {
            id: 0,
            template_name: input.template_name.clone(),
            body: ContentBody {
                title: input.title.clone(),
                content: input.content.clone(),
                text_content: input.text_content.clone(),
                thumbnail: input.thumbnail.clone(),
                images: input.images.clone(),
                tags: input.tags.clone(),
            },
        });
        tags::sync(store, &BTreeSet::new(), &template.body.tags, false)?;
        Ok(template)
    })
}

pub fn update<B: StorageBackend>(
    store: &mut BlogStore<B>,
    viewer: Viewer,
    id: TemplateId,
    patch: TemplatePatch,
    delete_orphan_tags: bool,
) -> Result<Template> {
    viewer.require_auth()?;
    let mut template = store.template(id)?;
    let previous_tags = template.body.tags.clone();

    if let Some(template_name) = patch.template_name {
        template.template_name = template_name;
    }
    if let Some(title) = patch.title {
        template.body.title = title;
    }
    if let Some(content) = patch.content {
        template.body.content = content;
    }
    if let Some(text_content) = patch.text_content {
        template.body.text_content = text_content;
    }
    if let Some(thumbnail) = patch.thumbnail {
        template.body.thumbnail = thumbnail;
    }
    if let Some(images) = patch.images {
        template.body.images = images;
    }
    if let Some(tags) = patch.tags {
        template.body.tags = tags;
    }
    super::post::validate_references(store, &template.body.thumbnail, &template.body.images)?;

    store.transaction(|store| {
        store.save_template(&template)?;
        tags::sync(store, &previous_tags, &template.body.tags, delete_orphan_tags)?;
        Ok(template)
    })
}

pub fn delete<B: StorageBackend>(
    store: &mut BlogStore<B>,
    viewer: Viewer,
    id: TemplateId,
    delete_orphan_tags: bool,
) -> Result<()> {
    viewer.require_auth()?;
    let template = store.template(id)?;
    store.transaction(|store| {
        store.delete_template(id)?;
        tags::sync(store, &template.body.tags, &BTreeSet::new(), delete_orphan_tags)?;
        Ok(())
    })
}
