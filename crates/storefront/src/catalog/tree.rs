//! Navigation tree: category -> subcategory -> leaf.
//!
//! # Sources
//!
//! - `main_categories`: top-level nodes
//! - `subcategories`: nodes linked by `mainCategory` (second level), or by
//!   `mainCategory` plus `subcategory`/`parent` (third level)
//! - `categories`: older layout, read only when `main_categories` is empty.
//!   Either flat documents with the same parent fields, or top-level
//!   documents carrying nested `children`/`subcategories` arrays
//!
//! Parents are matched case-insensitively on name, label, or slug.
//! Documents whose parent cannot be found are dropped with a warning.
//!
//! # Icons
//!
//! A node's declared icon is kept when it is one we can render. Otherwise the
//! first keyword rule matching the node's name, label, or slug wins, else
//! [`DEFAULT_ICON`]. Top-level siblings never share an icon while the
//! [`FALLBACK_ICONS`] sequence still has unused entries.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use safeguard_core::CategoryTreeNode;
use tracing::{debug, instrument, warn};

use super::normalize::{as_array, as_map, extract_field, extract_text, raw_field};
use crate::store::{Document, DocumentStore, Fields, Query, StoreError};

/// Maximum tree depth.
pub const MAX_DEPTH: usize = 3;

/// Icon used when nothing else applies.
pub const DEFAULT_ICON: &str = "grid";

/// Substitutes for a top-level icon that is already taken, in order.
pub const FALLBACK_ICONS: &[&str] = &["shield", "toolbox", "lifebuoy", "package", "cone", "star", "layers"];

/// Keyword rules, first match wins. Keywords are lowercase substrings.
const ICON_RULES: &[(&[&str], &str)] = &[
    (&["helmet", "hard hat", "hardhat", "head"], "hard-hat"),
    (&["glove", "hand"], "hand"),
    (&["goggle", "glasses", "eye", "face shield", "visor"], "glasses"),
    (&["hearing", "earplug", "earmuff"], "ear"),
    (&["respirat", "mask", "breath"], "mask"),
    (&["boot", "shoe", "foot"], "boot"),
    (&["vest", "cloth", "coverall", "suit", "apparel"], "vest"),
    (&["harness", "fall", "height", "lanyard"], "harness"),
    (&["rescue", "rope", "stretcher", "evacuat"], "lifebuoy"),
    (&["fire", "extinguish"], "flame"),
    (&["first aid", "first-aid", "medical"], "first-aid"),
    (&["sign", "tape", "barrier"], "sign"),
    (&["lock", "tagout"], "lock"),
    (&["ppe", "protect"], "shield"),
    (&["workplace", "work", "industrial"], "toolbox"),
];

const MAIN_CATEGORIES: &str = "main_categories";
const SUBCATEGORIES: &str = "subcategories";
const LEGACY_CATEGORIES: &str = "categories";
const TREE_KEY: &str = "tree";

/// Builds (and caches) the navigation tree from category documents.
pub struct CategoryTreeBuilder<S> {
    inner: Arc<TreeBuilderInner<S>>,
}

impl<S> Clone for CategoryTreeBuilder<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct TreeBuilderInner<S> {
    store: S,
    cache: Cache<&'static str, Arc<Vec<CategoryTreeNode>>>,
}

impl<S: DocumentStore> CategoryTreeBuilder<S> {
    /// Create a builder whose result stays cached for `ttl`.
    #[must_use]
    pub fn new(store: S, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(TreeBuilderInner {
                store,
                cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
            }),
        }
    }

    /// The navigation tree, ordered by each node's `order` field.
    ///
    /// Store failures are logged; an incomplete read is returned but not
    /// cached.
    #[instrument(skip(self))]
    pub async fn build_tree(&self) -> Vec<CategoryTreeNode> {
        if let Some(tree) = self.inner.cache.get(&TREE_KEY).await {
            debug!("Cache hit for category tree");
            return tree.as_ref().clone();
        }

        let mut complete = true;
        let mut read = |collection: &'static str, result: Result<Vec<Document>, StoreError>| match result {
            Ok(docs) => docs,
            Err(e) => {
                warn!(collection, error = %e, "Failed to read category documents");
                complete = false;
                Vec::new()
            }
        };

        let mains = read(
            MAIN_CATEGORIES,
            self.inner.store.query(&Query::collection(MAIN_CATEGORIES)).await,
        );

        let drafts = if mains.is_empty() {
            let legacy = read(
                LEGACY_CATEGORIES,
                self.inner.store.query(&Query::collection(LEGACY_CATEGORIES)).await,
            );
            legacy.iter().filter_map(|d| Draft::parse(&d.fields, true)).collect()
        } else {
            let subs = read(
                SUBCATEGORIES,
                self.inner.store.query(&Query::collection(SUBCATEGORIES)).await,
            );
            let linked = subs.iter().filter_map(|d| {
                let draft = Draft::parse(&d.fields, true)?;
                if extract_text(&d.fields, "mainCategory").is_none() {
                    warn!(name = %draft.name, "Dropping subcategory without mainCategory");
                    return None;
                }
                Some(draft)
            });
            mains
                .iter()
                .filter_map(|d| Draft::parse(&d.fields, false))
                .chain(linked)
                .collect()
        };

        let tree = Arc::new(assemble(drafts));
        debug!(roots = tree.len(), "Built category tree");
        if complete {
            self.inner.cache.insert(TREE_KEY, Arc::clone(&tree)).await;
        }

        Arc::unwrap_or_clone(tree)
    }
}

// =============================================================================
// Assembly
// =============================================================================

/// A category document before linking.
#[derive(Debug, Clone)]
struct Draft {
    name: String,
    slug: String,
    /// Lowercased name, label, and slug for parent matching and icon rules.
    keys: Vec<String>,
    order: i64,
    icon: Option<String>,
    /// Names of ancestors, outermost first. Empty for top-level nodes.
    parent_path: Vec<String>,
    children: Vec<Self>,
}

impl Draft {
    /// Parse a category document. Returns `None` when it has no usable name.
    fn parse(fields: &Fields, linked: bool) -> Option<Self> {
        let raw_name = extract_text(fields, "name");
        let label = extract_text(fields, "label");
        let explicit_slug = extract_text(fields, "slug");

        let name = label
            .clone()
            .or_else(|| raw_name.clone())
            .or_else(|| explicit_slug.clone())?;
        let slug = explicit_slug
            .clone()
            .unwrap_or_else(|| slugify(raw_name.as_deref().unwrap_or(&name)));

        let keys = [raw_name, label, Some(slug.clone())]
            .into_iter()
            .flatten()
            .map(|k| k.to_lowercase())
            .collect();

        let parent_path = if linked {
            let main = extract_text(fields, "mainCategory");
            let sub = extract_text(fields, "subcategory").or_else(|| extract_text(fields, "parent"));
            match (main, sub) {
                (Some(main), Some(sub)) => vec![main, sub],
                (Some(main), None) => vec![main],
                (None, Some(sub)) => vec![sub],
                (None, None) => Vec::new(),
            }
        } else {
            Vec::new()
        };

        let children = ["children", "subcategories"]
            .iter()
            .filter_map(|key| raw_field(fields, key).and_then(as_array))
            .flatten()
            .filter_map(as_map)
            .filter_map(|child| Self::parse(child, false))
            .collect();

        Some(Self {
            name,
            slug,
            keys,
            order: extract_field::<i64>(fields, "order").unwrap_or(0),
            icon: extract_text(fields, "icon"),
            parent_path,
            children,
        })
    }

    fn matches(&self, key: &str) -> bool {
        let key = key.trim().to_lowercase();
        self.keys.contains(&key) || self.slug == slugify(&key)
    }
}

/// Link drafts by parent path and convert them into ordered, iconned nodes.
fn assemble(drafts: Vec<Draft>) -> Vec<CategoryTreeNode> {
    let (mut roots, mut linked): (Vec<Draft>, Vec<Draft>) =
        drafts.into_iter().partition(|d| d.parent_path.is_empty());

    // Second level first so third-level documents can find them.
    linked.sort_by_key(|d| d.parent_path.len());
    for draft in linked {
        let Some(parent) = find_parent(&mut roots, &draft.parent_path) else {
            warn!(
                name = %draft.name,
                parent = ?draft.parent_path,
                "Dropping category with unknown parent"
            );
            continue;
        };
        parent.children.push(draft);
    }

    let mut used = HashSet::new();
    finalize(roots, 1)
        .into_iter()
        .map(|mut node| {
            node.icon = node.icon.map(|icon| dedupe_icon(icon, &mut used));
            node
        })
        .collect()
}

fn find_parent<'a>(nodes: &'a mut [Draft], path: &[String]) -> Option<&'a mut Draft> {
    let (first, rest) = path.split_first()?;
    let node = nodes.iter_mut().find(|n| n.matches(first))?;
    if rest.is_empty() {
        Some(node)
    } else {
        find_parent(&mut node.children, rest)
    }
}

/// Sort by `order` (stable), cap depth, and resolve icons.
fn finalize(mut drafts: Vec<Draft>, depth: usize) -> Vec<CategoryTreeNode> {
    drafts.sort_by_key(|d| d.order);

    drafts
        .into_iter()
        .map(|draft| {
            let icon = resolve_icon(draft.icon.as_deref(), &draft.keys);
            let children = if depth < MAX_DEPTH {
                finalize(draft.children, depth + 1)
            } else {
                if !draft.children.is_empty() {
                    debug!(name = %draft.name, "Ignoring categories nested below the third level");
                }
                Vec::new()
            };

            CategoryTreeNode {
                name: draft.name,
                slug: draft.slug,
                icon: Some(icon),
                children,
            }
        })
        .collect()
}

// =============================================================================
// Icons
// =============================================================================

/// Whether an icon identifier is one the storefront can render.
#[must_use]
pub fn is_known_icon(icon: &str) -> bool {
    icon == DEFAULT_ICON
        || FALLBACK_ICONS.contains(&icon)
        || ICON_RULES.iter().any(|(_, known)| *known == icon)
}

/// Pick an icon for a node from its declared icon and its names.
#[must_use]
pub fn resolve_icon(declared: Option<&str>, keys: &[String]) -> String {
    if let Some(icon) = declared.map(|i| i.trim().to_lowercase())
        && is_known_icon(&icon)
    {
        return icon;
    }

    ICON_RULES
        .iter()
        .find(|(keywords, _)| {
            keys.iter()
                .any(|key| keywords.iter().any(|kw| key.contains(kw)))
        })
        .map_or(DEFAULT_ICON, |(_, icon)| icon)
        .to_string()
}

/// Replace an icon already used by a sibling with the next unused fallback.
fn dedupe_icon(icon: String, used: &mut HashSet<String>) -> String {
    if used.insert(icon.clone()) {
        return icon;
    }

    match FALLBACK_ICONS.iter().find(|f| !used.contains(**f)) {
        Some(fallback) => {
            used.insert((*fallback).to_string());
            (*fallback).to_string()
        }
        None => DEFAULT_ICON.to_string(),
    }
}

/// URL-safe identifier: lowercase alphanumerics joined by single dashes.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::store::MemoryStore;

    const TTL: Duration = Duration::from_secs(300);

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    fn names(nodes: &[CategoryTreeNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    async fn build(store: MemoryStore) -> Vec<CategoryTreeNode> {
        CategoryTreeBuilder::new(store, TTL).build_tree().await
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Head & Face Protection"), "head-face-protection");
        assert_eq!(slugify("  Fall Arrest -- Harnesses "), "fall-arrest-harnesses");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_resolve_icon() {
        let keys = |s: &str| vec![s.to_lowercase()];

        assert_eq!(resolve_icon(Some("Flame"), &keys("Anything")), "flame");
        assert_eq!(resolve_icon(Some("unicorn"), &keys("Safety Gloves")), "hand");
        assert_eq!(resolve_icon(None, &keys("Hard Hats")), "hard-hat");
        assert_eq!(resolve_icon(None, &keys("Rescue Gear")), "lifebuoy");
        assert_eq!(resolve_icon(None, &keys("Miscellaneous")), DEFAULT_ICON);
    }

    #[test]
    fn test_dedupe_walks_fallbacks_then_default() {
        let mut used = HashSet::new();
        let mut assigned: Vec<String> = (0..FALLBACK_ICONS.len() + 2)
            .map(|_| dedupe_icon("hard-hat".to_string(), &mut used))
            .collect();

        assert_eq!(assigned.remove(0), "hard-hat");
        for fallback in FALLBACK_ICONS {
            assert_eq!(assigned.remove(0), *fallback);
        }
        assert_eq!(assigned.remove(0), DEFAULT_ICON);
    }

    #[tokio::test]
    async fn test_three_levels_linked_by_parent() {
        let store = MemoryStore::new();
        store.insert(MAIN_CATEGORIES, "m1", fields(json!({ "name": "PPE", "slug": "ppe" })));
        store.insert(
            SUBCATEGORIES,
            "s1",
            fields(json!({ "name": "Gloves", "mainCategory": "ppe" })),
        );
        store.insert(
            SUBCATEGORIES,
            "s2",
            fields(json!({ "name": "Cut Resistant", "mainCategory": "PPE", "subcategory": "gloves" })),
        );

        let tree = build(store).await;
        assert_eq!(names(&tree), ["PPE"]);
        assert_eq!(tree[0].depth(), 3);

        let gloves = &tree[0].children[0];
        assert_eq!(gloves.name, "Gloves");
        assert_eq!(gloves.slug, "gloves");
        assert_eq!(gloves.icon.as_deref(), Some("hand"));
        assert_eq!(gloves.children[0].name, "Cut Resistant");
        assert!(gloves.children[0].is_leaf());
    }

    #[tokio::test]
    async fn test_order_ascending_ties_stable() {
        let store = MemoryStore::new();
        store.insert(MAIN_CATEGORIES, "a", fields(json!({ "name": "A", "order": 1 })));
        store.insert(MAIN_CATEGORIES, "b", fields(json!({ "name": "B", "order": 0 })));
        store.insert(MAIN_CATEGORIES, "c", fields(json!({ "name": "C" })));
        store.insert(MAIN_CATEGORIES, "d", fields(json!({ "name": "D", "order": { "integerValue": "1" } })));

        let tree = build(store).await;
        assert_eq!(names(&tree), ["B", "C", "A", "D"]);
    }

    #[tokio::test]
    async fn test_label_is_display_name() {
        let store = MemoryStore::new();
        store.insert(
            MAIN_CATEGORIES,
            "m",
            fields(json!({ "name": "rescue", "label": "Rescue Equipment" })),
        );
        store.insert(
            SUBCATEGORIES,
            "s",
            fields(json!({ "name": "Ropes", "mainCategory": "Rescue Equipment" })),
        );

        let tree = build(store).await;
        assert_eq!(tree[0].name, "Rescue Equipment");
        assert_eq!(tree[0].slug, "rescue");
        assert_eq!(names(&tree[0].children), ["Ropes"]);
    }

    #[tokio::test]
    async fn test_orphans_are_dropped() {
        let store = MemoryStore::new();
        store.insert(MAIN_CATEGORIES, "m", fields(json!({ "name": "PPE" })));
        store.insert(
            SUBCATEGORIES,
            "s",
            fields(json!({ "name": "Lost", "mainCategory": "Nowhere" })),
        );

        let tree = build(store).await;
        assert_eq!(names(&tree), ["PPE"]);
        assert!(tree[0].is_leaf());
    }

    #[tokio::test]
    async fn test_subcategory_without_main_category_is_dropped() {
        let store = MemoryStore::new();
        store.insert(MAIN_CATEGORIES, "m", fields(json!({ "name": "Gloves" })));
        store.insert(
            SUBCATEGORIES,
            "s1",
            fields(json!({ "name": "Nitrile", "subcategory": "Gloves" })),
        );
        store.insert(
            SUBCATEGORIES,
            "s2",
            fields(json!({ "name": "Latex", "parent": "Gloves" })),
        );

        let tree = build(store).await;
        assert_eq!(names(&tree), ["Gloves"]);
        assert!(tree[0].is_leaf());
    }

    #[tokio::test]
    async fn test_colliding_siblings_get_distinct_icons() {
        let store = MemoryStore::new();
        for (i, name) in ["Helmets", "Hard Hats", "Helmet Accessories"].iter().enumerate() {
            store.insert(MAIN_CATEGORIES, format!("m{i}"), fields(json!({ "name": name, "order": i })));
        }

        let tree = build(store).await;
        let icons: Vec<_> = tree.iter().map(|n| n.icon.as_deref().unwrap()).collect();
        assert_eq!(icons, ["hard-hat", FALLBACK_ICONS[0], FALLBACK_ICONS[1]]);
    }

    #[tokio::test]
    async fn test_legacy_nested_categories() {
        let store = MemoryStore::new();
        store.insert(
            LEGACY_CATEGORIES,
            "ppe",
            fields(json!({
                "name": "PPE",
                "order": 2,
                "children": { "arrayValue": { "values": [
                    { "mapValue": { "fields": {
                        "name": { "stringValue": "Eye Protection" },
                        "subcategories": { "arrayValue": { "values": [
                            { "mapValue": { "fields": { "name": { "stringValue": "Goggles" } } } }
                        ]}}
                    }}}
                ]}}
            })),
        );
        store.insert(LEGACY_CATEGORIES, "work", fields(json!({ "name": "Workplace", "order": 1 })));
        store.insert(
            LEGACY_CATEGORIES,
            "signs",
            fields(json!({ "name": "Signs", "mainCategory": "workplace" })),
        );

        let tree = build(store).await;
        assert_eq!(names(&tree), ["Workplace", "PPE"]);
        assert_eq!(names(&tree[0].children), ["Signs"]);
        assert_eq!(tree[1].children[0].name, "Eye Protection");
        assert_eq!(tree[1].children[0].children[0].name, "Goggles");
        assert_eq!(tree[1].children[0].icon.as_deref(), Some("glasses"));
    }

    #[tokio::test]
    async fn test_nesting_capped_at_three_levels() {
        let store = MemoryStore::new();
        store.insert(
            LEGACY_CATEGORIES,
            "deep",
            fields(json!({
                "name": "L1",
                "children": [{ "name": "L2", "children": [{ "name": "L3", "children": [{ "name": "L4" }] }] }]
            })),
        );

        let tree = build(store).await;
        assert_eq!(tree[0].depth(), MAX_DEPTH);
    }

    #[tokio::test]
    async fn test_failed_read_is_not_cached() {
        let store = MemoryStore::new();
        store.insert(MAIN_CATEGORIES, "m", fields(json!({ "name": "PPE" })));
        store.set_unavailable(true);

        let builder = CategoryTreeBuilder::new(store.clone(), TTL);
        assert!(builder.build_tree().await.is_empty());

        store.set_unavailable(false);
        assert_eq!(names(&builder.build_tree().await), ["PPE"]);
    }
}
