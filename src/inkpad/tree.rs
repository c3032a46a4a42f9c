//! # Category Tree Maintenance
//!
//! The category hierarchy is a forest stored as a flat map of rows with
//! nested-set metadata (`lft`/`rght` range markers, `level`, `tree_id`).
//! [`rebuild`] re-derives that metadata for the whole forest from the
//! `subcategory_of` references; every structural mutation (create,
//! re-parent) runs it before committing. Descendant and ancestor lookups
//! are then pure range scans — no recursive pointer chasing, no cycles to
//! manage in memory.
//!
//! Soft-deleted categories stay in the forest and keep valid ranges; the
//! visibility layer decides who gets to see them.

use crate::error::{BlogError, Result};
use crate::model::{Category, CategoryId};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Recompute `level`, `lft`, `rght` and `tree_id` for every category.
///
/// Roots and siblings are ordered by name (ties broken by id), matching
/// the insertion order the admin sees. Fails with `InvalidValue` if the
/// parent references do not form a forest — a cycle, a self-parent or a
/// dangling parent id all leave nodes unreachable from the roots.
pub fn rebuild(categories: &mut BTreeMap<CategoryId, Category>) -> Result<()> {
    let mut children: HashMap<Option<CategoryId>, Vec<CategoryId>> = HashMap::new();
    for category in categories.values() {
        children
            .entry(category.subcategory_of)
            .or_default()
            .push(category.id);
    }
    for ids in children.values_mut() {
        ids.sort_by(|a, b| {
            let left = &categories[a];
            let right = &categories[b];
            left.name.cmp(&right.name).then(left.id.cmp(&right.id))
        });
    }

    // (level, lft, rght, tree_id) per visited node
    let mut computed: HashMap<CategoryId, (u32, u32, u32, u32)> = HashMap::new();
    let roots = children.get(&None).cloned().unwrap_or_default();

    for (tree_index, root) in roots.iter().enumerate() {
        let tree_id = tree_index as u32 + 1;
        let mut counter = 1;
        assign(*root, 0, tree_id, &mut counter, &children, &mut computed);
    }

    if computed.len() != categories.len() {
        return Err(BlogError::InvalidValue(
            "category hierarchy is not a forest (cycle or dangling parent)".to_string(),
        ));
    }

    for (id, (level, lft, rght, tree_id)) in computed {
        let category = categories.get_mut(&id).expect("computed id exists");
        category.level = level;
        category.lft = lft;
        category.rght = rght;
        category.tree_id = tree_id;
    }
    Ok(())
}

fn assign(
    id: CategoryId,
    level: u32,
    tree_id: u32,
    counter: &mut u32,
    children: &HashMap<Option<CategoryId>, Vec<CategoryId>>,
    computed: &mut HashMap<CategoryId, (u32, u32, u32, u32)>,
) {
    let lft = *counter;
    *counter += 1;
    for child in children.get(&Some(id)).into_iter().flatten() {
        assign(*child, level + 1, tree_id, counter, children, computed);
    }
    let rght = *counter;
    *counter += 1;
    computed.insert(id, (level, lft, rght, tree_id));
}

fn node<'a>(
    categories: &'a BTreeMap<CategoryId, Category>,
    id: CategoryId,
) -> Result<&'a Category> {
    categories
        .get(&id)
        .ok_or_else(|| BlogError::NotFound("category".to_string()))
}

/// Ids of every category nested within `id`'s range, optionally with `id`
/// itself. Fails with `NotFound` if `id` is absent.
pub fn descendant_ids(
    categories: &BTreeMap<CategoryId, Category>,
    id: CategoryId,
    include_self: bool,
) -> Result<BTreeSet<CategoryId>> {
    let target = node(categories, id)?;
    let mut ids: BTreeSet<CategoryId> = categories
        .values()
        .filter(|c| c.tree_id == target.tree_id && c.lft > target.lft && c.rght < target.rght)
        .map(|c| c.id)
        .collect();
    if include_self {
        ids.insert(id);
    }
    Ok(ids)
}

/// Ancestor rows in root-to-parent order.
pub fn ancestors(
    categories: &BTreeMap<CategoryId, Category>,
    id: CategoryId,
) -> Result<Vec<Category>> {
    let target = node(categories, id)?;
    let mut rows: Vec<Category> = categories
        .values()
        .filter(|c| c.tree_id == target.tree_id && c.lft < target.lft && c.rght > target.rght)
        .cloned()
        .collect();
    rows.sort_by_key(|c| c.lft);
    Ok(rows)
}

/// Direct children of `parent` (`None` = roots), in sibling order.
pub fn children_of(
    categories: &BTreeMap<CategoryId, Category>,
    parent: Option<CategoryId>,
) -> Vec<Category> {
    let mut rows: Vec<Category> = categories
        .values()
        .filter(|c| c.subcategory_of == parent)
        .cloned()
        .collect();
    rows.sort_by_key(|c| (c.tree_id, c.lft));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: CategoryId, name: &str, parent: Option<CategoryId>) -> Category {
        Category {
            id,
            name: name.to_string(),
            description: String::new(),
            is_hidden: false,
            is_deleted: false,
            cover_image: None,
            subcategory_of: parent,
            level: 0,
            lft: 0,
            rght: 0,
            tree_id: 0,
        }
    }

    /// dev (1)
    ///   rust (2)
    ///     async (4)
    ///   web (3)
    /// life (5)
    fn sample_forest() -> BTreeMap<CategoryId, Category> {
        let mut map = BTreeMap::new();
        for c in [
            category(1, "dev", None),
            category(2, "rust", Some(1)),
            category(3, "web", Some(1)),
            category(4, "async", Some(2)),
            category(5, "life", None),
        ] {
            map.insert(c.id, c);
        }
        rebuild(&mut map).unwrap();
        map
    }

    #[test]
    fn rebuild_assigns_nested_ranges() {
        let map = sample_forest();
        let dev = &map[&1];
        let rust = &map[&2];
        let async_ = &map[&4];

        assert_eq!(dev.level, 0);
        assert_eq!(rust.level, 1);
        assert_eq!(async_.level, 2);
        // every ancestor range strictly contains the descendant range
        assert!(dev.lft < rust.lft && rust.rght < dev.rght);
        assert!(rust.lft < async_.lft && async_.rght < rust.rght);
        assert_eq!(dev.tree_id, rust.tree_id);
    }

    #[test]
    fn separate_roots_get_separate_trees() {
        let map = sample_forest();
        assert_ne!(map[&1].tree_id, map[&5].tree_id);
    }

    #[test]
    fn siblings_are_ordered_by_name() {
        let map = sample_forest();
        // under "dev": "rust" before "web"
        assert!(map[&2].lft < map[&3].lft);
    }

    #[test]
    fn descendant_ids_is_a_range_query() {
        let map = sample_forest();
        let ids = descendant_ids(&map, 1, true).unwrap();
        assert_eq!(ids, BTreeSet::from([1, 2, 3, 4]));

        let without_self = descendant_ids(&map, 2, false).unwrap();
        assert_eq!(without_self, BTreeSet::from([4]));
    }

    #[test]
    fn leaf_has_no_descendants() {
        let map = sample_forest();
        assert!(descendant_ids(&map, 5, false).unwrap().is_empty());
    }

    #[test]
    fn ancestors_run_root_to_parent() {
        let map = sample_forest();
        let chain: Vec<CategoryId> = ancestors(&map, 4).unwrap().iter().map(|c| c.id).collect();
        assert_eq!(chain, vec![1, 2]);
    }

    #[test]
    fn missing_category_is_not_found() {
        let map = sample_forest();
        assert!(matches!(
            descendant_ids(&map, 42, true),
            Err(BlogError::NotFound(_))
        ));
    }

    #[test]
    fn cycle_fails_rebuild() {
        let mut map = BTreeMap::new();
        map.insert(1, category(1, "a", Some(2)));
        map.insert(2, category(2, "b", Some(1)));
        assert!(matches!(
            rebuild(&mut map),
            Err(BlogError::InvalidValue(_))
        ));
    }

    #[test]
    fn self_parent_fails_rebuild() {
        let mut map = BTreeMap::new();
        map.insert(1, category(1, "a", Some(1)));
        assert!(rebuild(&mut map).is_err());
    }

    #[test]
    fn dangling_parent_fails_rebuild() {
        let mut map = BTreeMap::new();
        map.insert(1, category(1, "a", Some(9)));
        assert!(rebuild(&mut map).is_err());
    }
}
