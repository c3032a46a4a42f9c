//! Category commands: the tree store operations plus their read views.
//!
//! Reads accept the two synthetic categories (`None` = all posts, id 0 =
//! uncategorized) wherever a category reference makes sense; writes only
//! ever touch real rows. Structural mutations (create, re-parent, delete)
//! rebuild the nested-set metadata inside the same transaction.

use crate::commands::{resolve_category_for_write, visible_posts};
use crate::error::{BlogError, Result};
use crate::model::{Category, CategoryId, CategoryView, Viewer, UNCATEGORIZED};
use crate::store::{BlogStore, StorageBackend};
use crate::tree;
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeSet;

pub struct CategoryInput {
    pub name: String,
    pub description: String,
    pub is_hidden: bool,
    pub cover_image: Option<String>,
    pub subcategory_of: Option<CategoryId>,
}

/// Partial update: `None` leaves a field untouched. The two reference
/// fields nest an `Option` so "clear it" and "leave it" stay distinct.
#[derive(Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_hidden: Option<bool>,
    pub cover_image: Option<Option<String>>,
    pub subcategory_of: Option<Option<CategoryId>>,
}

/// One node of the hierarchy snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    pub id: Option<CategoryId>,
    pub name: String,
    pub is_hidden: bool,
    pub level: u32,
    pub post_count: usize,
    pub subcategories: Vec<CategoryNode>,
}

/// Fetch one category as a view. `None` and id 0 resolve to the synthetic
/// "all posts" / "uncategorized" views. `include_deleted` flips the
/// lookup to soft-deleted rows and requires authentication.
pub fn get<B: StorageBackend>(
    store: &BlogStore<B>,
    viewer: Viewer,
    id: Option<CategoryId>,
    include_deleted: bool,
) -> Result<CategoryView> {
    if include_deleted {
        viewer.require_auth()?;
    }
    match id {
        None => Ok(CategoryView::all_posts()),
        Some(UNCATEGORIZED) => Ok(CategoryView::uncategorized()),
        Some(id) => {
            let row = store.category(id)?;
            if row.is_deleted != include_deleted {
                return Err(BlogError::NotFound("category".to_string()));
            }
            if row.is_hidden && !viewer.authenticated {
                return Err(BlogError::PermissionDenied(
                    "category is hidden".to_string(),
                ));
            }
            Ok(CategoryView::from(&row))
        }
    }
}

/// All categories the viewer may see, in tree order.
pub fn list<B: StorageBackend>(store: &BlogStore<B>, viewer: Viewer) -> Vec<CategoryView> {
    store
        .categories()
        .iter()
        .filter(|c| crate::visibility::category_visible(viewer, c))
        .map(CategoryView::from)
        .collect()
}

/// Ancestors of a category in root-to-parent order. The synthetic
/// categories sit at the top level and have none.
pub fn ancestors<B: StorageBackend>(
    store: &BlogStore<B>,
    viewer: Viewer,
    id: Option<CategoryId>,
) -> Result<Vec<CategoryView>> {
    let id = match id {
        None | Some(UNCATEGORIZED) => return Ok(Vec::new()),
        Some(id) => id,
    };
    let row = store.category(id)?;
    if row.is_deleted {
        return Err(BlogError::NotFound("category".to_string()));
    }
    if row.is_hidden && !viewer.authenticated {
        return Err(BlogError::PermissionDenied(
            "category is hidden".to_string(),
        ));
    }
    let chain = tree::ancestors(store.category_map(), id)?;
    Ok(chain.iter().map(CategoryView::from).collect())
}

/// Candidate parents when re-parenting `id`: every live category outside
/// `id`'s own subtree. Author-only, like the rest of the admin tooling.
pub fn valid_supercategories<B: StorageBackend>(
    store: &BlogStore<B>,
    viewer: Viewer,
    id: CategoryId,
) -> Result<Vec<CategoryView>> {
    viewer.require_auth()?;
    let excluded = tree::descendant_ids(store.category_map(), id, true)?;
    Ok(store
        .categories()
        .iter()
        .filter(|c| !c.is_deleted && !excluded.contains(&c.id))
        .map(CategoryView::from)
        .collect())
}

/// The full hierarchy snapshot: "all posts", then the real roots with
/// their subtrees, then "uncategorized". Deleted categories never appear;
/// hidden ones (and hidden posts) drop out for anonymous viewers.
pub fn hierarchy<B: StorageBackend>(store: &BlogStore<B>, viewer: Viewer) -> Vec<CategoryNode> {
    let posts = visible_posts(store, viewer);

    let count_in = |ids: &BTreeSet<CategoryId>| {
        posts
            .iter()
            .filter(|p| p.category.is_some_and(|id| ids.contains(&id)))
            .count()
    };

    fn build<B: StorageBackend>(
        store: &BlogStore<B>,
        viewer: Viewer,
        category: &Category,
        count_in: &impl Fn(&BTreeSet<CategoryId>) -> usize,
    ) -> Option<CategoryNode> {
        if !crate::visibility::category_visible(viewer, category) {
            return None;
        }
        let ids = tree::descendant_ids(store.category_map(), category.id, true).ok()?;
        let subcategories = tree::children_of(store.category_map(), Some(category.id))
            .iter()
            .filter_map(|child| build(store, viewer, child, count_in))
            .collect();
        Some(CategoryNode {
            id: Some(category.id),
            name: category.name.clone(),
            is_hidden: category.is_hidden,
            level: category.level,
            post_count: count_in(&ids),
            subcategories,
        })
    }

    let mut nodes = vec![CategoryNode {
        id: None,
        name: crate::model::ALL_POSTS_NAME.to_string(),
        is_hidden: false,
        level: 0,
        post_count: posts.len(),
        subcategories: Vec::new(),
    }];
    for root in tree::children_of(store.category_map(), None) {
        if let Some(node) = build(store, viewer, &root, &count_in) {
            nodes.push(node);
        }
    }
    nodes.push(CategoryNode {
        id: Some(UNCATEGORIZED),
        name: crate::model::UNCATEGORIZED_NAME.to_string(),
        is_hidden: false,
        level: 0,
        post_count: posts.iter().filter(|p| p.category.is_none()).count(),
        subcategories: Vec::new(),
    });
    nodes
}

/// Number of visible posts under a category. `None` counts everything,
/// id 0 counts the uncategorized bucket, and `exclude_subcategories`
/// restricts a real category to direct members only.
pub fn post_count<B: StorageBackend>(
    store: &BlogStore<B>,
    viewer: Viewer,
    id: Option<CategoryId>,
    exclude_subcategories: bool,
) -> Result<usize> {
    let posts = visible_posts(store, viewer);
    match id {
        None => Ok(posts.len()),
        Some(UNCATEGORIZED) => Ok(posts.iter().filter(|p| p.category.is_none()).count()),
        Some(id) => {
            let scope = if exclude_subcategories {
                store.category(id)?;
                BTreeSet::from([id])
            } else {
                tree::descendant_ids(store.category_map(), id, true)?
            };
            Ok(posts
                .iter()
                .filter(|p| p.category.is_some_and(|c| scope.contains(&c)))
                .count())
        }
    }
}

pub fn create<B: StorageBackend>(
    store: &mut BlogStore<B>,
    viewer: Viewer,
    input: CategoryInput,
) -> Result<CategoryView> {
    viewer.require_auth()?;
    if let Some(parent) = input.subcategory_of {
        let row = store.category(parent)?;
        if row.is_deleted {
            return Err(BlogError::NotFound("category".to_string()));
        }
    }
    if let Some(reference) = &input.cover_image {
        super::image::require_reference(store, reference)?;
    }
    store.transaction(|store| {
        let inserted = store.insert_category(Category {
            id: 0,
            name: input.name.clone(),
            description: input.description.clone(),
            is_hidden: input.is_hidden,
            is_deleted: false,
            cover_image: input.cover_image.clone(),
            subcategory_of: input.subcategory_of,
            level: 0,
            lft: 0,
            rght: 0,
            tree_id: 0,
        });
        store.rebuild_tree()?;
        let row = store.category(inserted.id)?;
        Ok(CategoryView::from(&row))
    })
}

pub fn update<B: StorageBackend>(
    store: &mut BlogStore<B>,
    viewer: Viewer,
    id: CategoryId,
    patch: CategoryPatch,
) -> Result<CategoryView> {
    viewer.require_auth()?;
    let mut row = store.category(id)?;
    if row.is_deleted {
        return Err(BlogError::NotFound("category".to_string()));
    }

    let newly_hidden = patch.is_hidden == Some(true) && !row.is_hidden;

    if let Some(name) = patch.name {
        row.name = name;
    }
    if let Some(description) = patch.description {
        row.description = description;
    }
    if let Some(hidden) = patch.is_hidden {
        row.is_hidden = hidden;
    }
    if let Some(cover_image) = patch.cover_image {
        if let Some(reference) = &cover_image {
            super::image::require_reference(store, reference)?;
        }
        row.cover_image = cover_image;
    }
    if let Some(parent) = patch.subcategory_of {
        if parent == Some(id) {
            return Err(BlogError::InvalidValue(
                "a category cannot be its own parent".to_string(),
            ));
        }
        row.subcategory_of = resolve_category_for_write(store, parent)?;
    }

    store.transaction(|store| {
        store.save_category(&row)?;
        // a re-parent into the category's own subtree turns the forest
        // into a cycle, which rebuild rejects and the transaction undoes
        store.rebuild_tree()?;
        if newly_hidden {
            let ids = tree::descendant_ids(store.category_map(), id, false)?;
            for descendant_id in ids {
                let mut descendant = store.category(descendant_id)?;
                if !descendant.is_deleted {
                    descendant.is_hidden = true;
                    store.save_category(&descendant)?;
                }
            }
        }
        let row = store.category(id)?;
        Ok(CategoryView::from(&row))
    })
}

/// Soft-delete a category and every descendant. Posts under any affected
/// category are soft-deleted too when `delete_posts` is set, otherwise
/// they detach to "uncategorized".
pub fn delete<B: StorageBackend>(
    store: &mut BlogStore<B>,
    viewer: Viewer,
    id: CategoryId,
    delete_posts: bool,
) -> Result<()> {
    viewer.require_auth()?;
    store.category(id)?;

    store.transaction(|store| {
        let affected = tree::descendant_ids(store.category_map(), id, true)?;
        for category_id in &affected {
            let mut category = store.category(*category_id)?;
            category.is_deleted = true;
            store.save_category(&category)?;
        }
        for mut post in store.posts() {
            if !post.category.is_some_and(|c| affected.contains(&c)) {
                continue;
            }
            if delete_posts {
                post.is_deleted = true;
                post.deleted_at = Some(Utc::now());
            } else {
                post.category = None;
            }
            store.save_post(&post)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;

    /// dev(1) > rust(2), dev(1) > web(3); life(4) hidden
    fn forest() -> StoreFixture {
        StoreFixture::new()
            .with_category("dev", None, false)
            .with_category("rust", Some(1), false)
            .with_category("web", Some(1), false)
            .with_category("life", None, true)
    }

    #[test]
    fn synthetic_categories_resolve_without_rows() {
        let fixture = StoreFixture::new();
        let all = get(&fixture.store, fixture.anonymous(), None, false).unwrap();
        assert_eq!(all.id, None);
        let none = get(&fixture.store, fixture.anonymous(), Some(UNCATEGORIZED), false).unwrap();
        assert_eq!(none.id, Some(UNCATEGORIZED));
    }

    #[test]
    fn include_deleted_requires_authentication() {
        let fixture = forest();
        let err = get(&fixture.store, fixture.anonymous(), Some(1), true).unwrap_err();
        assert!(matches!(err, BlogError::PermissionDenied(_)));
    }

    #[test]
    fn hidden_category_fetch_is_denied_anonymously() {
        let fixture = forest();
        let err = get(&fixture.store, fixture.anonymous(), Some(4), false).unwrap_err();
        assert!(matches!(err, BlogError::PermissionDenied(_)));
        assert!(get(&fixture.store, fixture.author(), Some(4), false).is_ok());
    }

    #[test]
    fn listing_silently_drops_hidden_categories() {
        let fixture = forest();
        let names: Vec<String> = list(&fixture.store, fixture.anonymous())
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["dev", "rust", "web"]);
        assert_eq!(list(&fixture.store, fixture.author()).len(), 4);
    }

    #[test]
    fn hiding_a_category_cascades_to_descendants() {
        let mut fixture = forest();
        let viewer = fixture.author();
        update(
            &mut fixture.store,
            viewer,
            1,
            CategoryPatch {
                is_hidden: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(fixture.store.category(2).unwrap().is_hidden);
        assert!(fixture.store.category(3).unwrap().is_hidden);
        assert!(!fixture.store.category(4).unwrap().is_deleted);
    }

    #[test]
    fn unhiding_does_not_cascade() {
        let mut fixture = forest();
        let viewer = fixture.author();
        update(
            &mut fixture.store,
            viewer,
            1,
            CategoryPatch {
                is_hidden: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        update(
            &mut fixture.store,
            viewer,
            1,
            CategoryPatch {
                is_hidden: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(!fixture.store.category(1).unwrap().is_hidden);
        assert!(fixture.store.category(2).unwrap().is_hidden);
    }

    #[test]
    fn reparenting_into_own_subtree_is_rejected_and_rolled_back() {
        let mut fixture = forest();
        let viewer = fixture.author();
        let err = update(
            &mut fixture.store,
            viewer,
            1,
            CategoryPatch {
                subcategory_of: Some(Some(2)),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, BlogError::InvalidValue(_)));
        assert_eq!(fixture.store.category(1).unwrap().subcategory_of, None);
    }

    #[test]
    fn delete_cascades_and_detaches_posts_by_default() {
        let mut fixture = forest()
            .with_post("In rust", Some(2), false)
            .with_post("In dev", Some(1), false);
        let viewer = fixture.author();
        delete(&mut fixture.store, viewer, 1, false).unwrap();

        assert!(fixture.store.category(1).unwrap().is_deleted);
        assert!(fixture.store.category(2).unwrap().is_deleted);
        assert!(fixture.store.category(3).unwrap().is_deleted);
        for post in fixture.store.posts() {
            assert_eq!(post.category, None);
            assert!(!post.is_deleted);
        }
    }

    #[test]
    fn delete_can_take_posts_with_it() {
        let mut fixture = forest().with_post("In rust", Some(2), false);
        let viewer = fixture.author();
        delete(&mut fixture.store, viewer, 1, true).unwrap();
        let post = fixture.store.post(1).unwrap();
        assert!(post.is_deleted);
        assert!(post.deleted_at.is_some());
        assert!(visible_posts(&fixture.store, Viewer::author()).is_empty());
    }

    #[test]
    fn ancestors_run_root_to_parent_and_respect_hidden() {
        let mut fixture = forest().with_category("tokio", Some(2), false);
        let chain: Vec<Option<CategoryId>> = ancestors(&fixture.store, fixture.anonymous(), Some(5))
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(chain, vec![Some(1), Some(2)]);

        assert!(ancestors(&fixture.store, fixture.anonymous(), None)
            .unwrap()
            .is_empty());

        let viewer = fixture.author();
        update(
            &mut fixture.store,
            viewer,
            5,
            CategoryPatch {
                is_hidden: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        let err = ancestors(&fixture.store, fixture.anonymous(), Some(5)).unwrap_err();
        assert!(matches!(err, BlogError::PermissionDenied(_)));
    }

    #[test]
    fn valid_supercategories_exclude_own_subtree() {
        let fixture = forest();
        let ids: Vec<Option<CategoryId>> =
            valid_supercategories(&fixture.store, fixture.author(), 1)
                .unwrap()
                .into_iter()
                .map(|c| c.id)
                .collect();
        assert_eq!(ids, vec![Some(4)]);
    }

    #[test]
    fn hierarchy_counts_posts_through_subtrees() {
        let fixture = forest()
            .with_post("a", Some(2), false)
            .with_post("b", Some(3), false)
            .with_post("c", None, false)
            .with_post("hidden", Some(2), true);

        let nodes = hierarchy(&fixture.store, fixture.anonymous());
        assert_eq!(nodes.first().unwrap().post_count, 3); // all posts
        assert_eq!(nodes.last().unwrap().post_count, 1); // uncategorized

        let dev = nodes.iter().find(|n| n.name == "dev").unwrap();
        assert_eq!(dev.post_count, 2);
        assert_eq!(dev.subcategories.len(), 2);
        assert!(nodes.iter().all(|n| n.name != "life")); // hidden root

        let nodes = hierarchy(&fixture.store, fixture.author());
        let dev = nodes.iter().find(|n| n.name == "dev").unwrap();
        assert_eq!(dev.post_count, 3);
        assert!(nodes.iter().any(|n| n.name == "life"));
    }

    #[test]
    fn post_count_can_exclude_subcategories() {
        let fixture = forest()
            .with_post("direct", Some(1), false)
            .with_post("nested", Some(2), false);
        let viewer = fixture.anonymous();
        assert_eq!(post_count(&fixture.store, viewer, Some(1), false).unwrap(), 2);
        assert_eq!(post_count(&fixture.store, viewer, Some(1), true).unwrap(), 1);
        assert_eq!(post_count(&fixture.store, viewer, None, false).unwrap(), 2);
    }

    #[test]
    fn create_under_missing_parent_is_not_found() {
        let mut fixture = StoreFixture::new();
        let viewer = fixture.author();
        let err = create(
            &mut fixture.store,
            viewer,
            CategoryInput {
                name: "orphan".to_string(),
                description: String::new(),
                is_hidden: false,
                cover_image: None,
                subcategory_of: Some(42),
            },
        )
        .unwrap_err();
        assert!(matches!(err, BlogError::NotFound(_)));
    }

    #[test]
    fn writes_require_authentication() {
        let mut fixture = forest();
        let viewer = fixture.anonymous();
        let err = delete(&mut fixture.store, viewer, 1, false).unwrap_err();
        assert!(matches!(err, BlogError::PermissionDenied(_)));
    }
}
