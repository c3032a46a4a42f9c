//! Image registry commands. Rows track the stored file reference and its
//! dimensions; the backing object store is an external collaborator, so
//! "deleting" here removes the registry row only.
//!
//! Content refers to images by URL-ish reference strings. A reference
//! resolves to the row whose `file` it ends with, so full URLs and bare
//! file paths both work.

use crate::error::{BlogError, Result};
use crate::model::{Image, ImageId, Viewer};
use crate::store::{BlogStore, StorageBackend};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// An image row plus how content currently uses it.
#[derive(Debug, Clone, Serialize)]
pub struct ImageView {
    pub image: Image,
    pub is_referenced: bool,
    pub thumbnail_references: usize,
    pub content_references: usize,
}

fn reference_matches(reference: &str, file: &str) -> bool {
    reference == file || reference.ends_with(&format!("/{file}"))
}

fn find_by_reference<B: StorageBackend>(store: &BlogStore<B>, reference: &str) -> Option<Image> {
    store
        .images()
        .into_iter()
        .find(|image| reference_matches(reference, &image.file))
}

/// Resolve a content-side image reference, failing with `InvalidValue`
/// when it names no registered image.
pub(crate) fn require_reference<B: StorageBackend>(
    store: &BlogStore<B>,
    reference: &str,
) -> Result<Image> {
    find_by_reference(store, reference).ok_or_else(|| {
        BlogError::InvalidValue(format!("image reference '{reference}' does not resolve"))
    })
}

fn view<B: StorageBackend>(store: &BlogStore<B>, image: Image) -> ImageView {
    let mut thumbnail_references = 0;
    let mut content_references = 0;
    let mut tally = |thumbnail: &Option<String>, images: &[String]| {
        if thumbnail
            .as_deref()
            .is_some_and(|t| reference_matches(t, &image.file))
        {
            thumbnail_references += 1;
        }
        if images.iter().any(|i| reference_matches(i, &image.file)) {
            content_references += 1;
        }
    };
    for post in store.posts().iter().filter(|p| !p.is_deleted) {
        tally(&post.body.thumbnail, &post.body.images);
    }
    for draft in &store.drafts() {
        tally(&draft.body.thumbnail, &draft.body.images);
    }
    for template in &store.templates() {
        tally(&template.body.thumbnail, &template.body.images);
    }
    let cover_references = store
        .categories()
        .iter()
        .filter(|c| {
            !c.is_deleted
                && c.cover_image
                    .as_deref()
                    .is_some_and(|cover| reference_matches(cover, &image.file))
        })
        .count();
    ImageView {
        is_referenced: thumbnail_references + content_references + cover_references > 0,
        thumbnail_references,
        content_references,
        image,
    }
}

/// Fetch one image by id or by reference; exactly one selector is needed.
pub fn get<B: StorageBackend>(
    store: &BlogStore<B>,
    viewer: Viewer,
    id: Option<ImageId>,
    url: Option<&str>,
) -> Result<ImageView> {
    viewer.require_auth()?;
    let image = match (id, url) {
        (Some(id), _) => store.image(id)?,
        (None, Some(url)) => {
            find_by_reference(store, url).ok_or_else(|| BlogError::NotFound("image".to_string()))?
        }
        (None, None) => {
            return Err(BlogError::InvalidValue(
                "an image id or url is required".to_string(),
            ))
        }
    };
    Ok(view(store, image))
}

/// All registered images, newest upload first.
pub fn list<B: StorageBackend>(store: &BlogStore<B>, viewer: Viewer) -> Result<Vec<ImageView>> {
    viewer.require_auth()?;
    Ok(store
        .images()
        .into_iter()
        .map(|image| view(store, image))
        .collect())
}

/// Register an uploaded file. The stored reference gets a uuid suffix so
/// re-uploads of the same filename never collide.
pub fn register<B: StorageBackend>(
    store: &mut BlogStore<B>,
    viewer: Viewer,
    filename: &str,
    width: u32,
    height: u32,
) -> Result<Image> {
    viewer.require_auth()?;
    let (stem, extension) = match filename.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => (stem, Some(extension)),
        _ => (filename, None),
    };
    if stem.is_empty() {
        return Err(BlogError::InvalidValue("empty image filename".to_string()));
    }
    let unique = Uuid::new_v4().simple();
    let file = match extension {
        Some(extension) => format!("media/{stem}_{unique}.{extension}"),
        None => format!("media/{stem}_{unique}"),
    };
    store.transaction(|store| {
        store.insert_image(Image {
            id: 0,
            file,
            width,
            height,
            uploaded_at: Utc::now(),
        })
    })
}

/// Delete one image row by reference.
pub fn delete<B: StorageBackend>(
    store: &mut BlogStore<B>,
    viewer: Viewer,
    url: &str,
) -> Result<()> {
    viewer.require_auth()?;
    let image =
        find_by_reference(store, url).ok_or_else(|| BlogError::NotFound("image".to_string()))?;
    store.transaction(|store| store.delete_image(image.id))
}

/// Delete several image rows; all or none.
pub fn delete_many<B: StorageBackend>(
    store: &mut BlogStore<B>,
    viewer: Viewer,
    urls: &[String],
) -> Result<()> {
    viewer.require_auth()?;
    store.transaction(|store| {
        for url in urls {
            let image = find_by_reference(store, url)
                .ok_or_else(|| BlogError::NotFound("image".to_string()))?;
            store.delete_image(image.id)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn register_keeps_stem_and_extension() {
        let mut fixture = StoreFixture::new();
        let viewer = fixture.author();
        let image = register(&mut fixture.store, viewer, "sunset.png", 800, 600).unwrap();
        assert!(image.file.starts_with("media/sunset_"));
        assert!(image.file.ends_with(".png"));
        assert_ne!(image.file, "media/sunset_.png");
    }

    #[test]
    fn repeated_uploads_of_one_filename_do_not_collide() {
        let mut fixture = StoreFixture::new();
        let viewer = fixture.author();
        let first = register(&mut fixture.store, viewer, "a.png", 1, 1).unwrap();
        let second = register(&mut fixture.store, viewer, "a.png", 1, 1).unwrap();
        assert_ne!(first.file, second.file);
    }

    #[test]
    fn get_needs_an_id_or_a_url() {
        let fixture = StoreFixture::new();
        let err = get(&fixture.store, fixture.author(), None, None).unwrap_err();
        assert!(matches!(err, BlogError::InvalidValue(_)));
    }

    #[test]
    fn url_lookup_matches_by_suffix() {
        let mut fixture = StoreFixture::new();
        let viewer = fixture.author();
        let image = register(&mut fixture.store, viewer, "pic.jpg", 1, 1).unwrap();
        let url = format!("https://cdn.example.com/{}", image.file);
        let found = get(&fixture.store, viewer, None, Some(&url)).unwrap();
        assert_eq!(found.image.id, image.id);
    }

    #[test]
    fn reference_counts_track_content_usage() {
        let mut fixture = StoreFixture::new().with_post("uses image", None, false);
        let viewer = fixture.author();
        let image = register(&mut fixture.store, viewer, "pic.jpg", 1, 1).unwrap();

        let unused = get(&fixture.store, viewer, Some(image.id), None).unwrap();
        assert!(!unused.is_referenced);

        let mut post = fixture.store.post(1).unwrap();
        post.body.thumbnail = Some(image.file.clone());
        post.body.images = vec![image.file.clone()];
        fixture.store.save_post(&post).unwrap();

        let used = get(&fixture.store, viewer, Some(image.id), None).unwrap();
        assert!(used.is_referenced);
        assert_eq!(used.thumbnail_references, 1);
        assert_eq!(used.content_references, 1);
    }

    #[test]
    fn delete_many_is_atomic() {
        let mut fixture = StoreFixture::new();
        let viewer = fixture.author();
        let image = register(&mut fixture.store, viewer, "keep.png", 1, 1).unwrap();
        let err = delete_many(
            &mut fixture.store,
            viewer,
            &[image.file.clone(), "media/absent.png".to_string()],
        )
        .unwrap_err();
        assert!(matches!(err, BlogError::NotFound(_)));
        assert!(fixture.store.image(image.id).is_ok());
    }

    #[test]
    fn unresolved_reference_is_invalid() {
        let fixture = StoreFixture::new();
        assert!(matches!(
            require_reference(&fixture.store, "media/nope.png"),
            Err(BlogError::InvalidValue(_))
        ));
    }
}
