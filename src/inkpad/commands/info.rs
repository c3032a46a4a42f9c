//! Site-info commands. One well-known record with lazy-create-on-write:
//! reads never fail, they fall back to defaults until the author saves
//! something.

use crate::error::Result;
use crate::model::{SiteInfo, Viewer};
use crate::store::{BlogStore, StorageBackend};

pub fn get<B: StorageBackend>(store: &BlogStore<B>) -> SiteInfo {
    store.site_info().unwrap_or_default()
}

#[derive(Default)]
pub struct InfoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<Option<String>>,
    pub favicon: Option<Option<String>>,
}

pub fn update<B: StorageBackend>(
    store: &mut BlogStore<B>,
    viewer: Viewer,
    patch: InfoPatch,
) -> Result<SiteInfo> {
    viewer.require_auth()?;
    let mut info = get(store);
    if let Some(title) = patch.title {
        info.title = title;
    }
    if let Some(description) = patch.description {
        info.description = description;
    }
    if let Some(avatar) = patch.avatar {
        if let Some(reference) = &avatar {
            super::image::require_reference(store, reference)?;
        }
        info.avatar = avatar;
    }
    if let Some(favicon) = patch.favicon {
        if let Some(reference) = &favicon {
            super::image::require_reference(store, reference)?;
        }
        info.favicon = favicon;
    }
    store.transaction(|store| {
        store.save_site_info(&info);
        Ok(info.clone())
    })
}
