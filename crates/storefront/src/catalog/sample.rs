//! Deterministic sample catalog for demos, local development, and seeding.

use safeguard_core::DocumentId;
use serde_json::{Value, json};

use super::repository::PRODUCTS;
use super::tree::slugify;
use crate::store::{DocumentStore, Fields, MemoryStore, StoreError};

/// Number of products generated when none is requested.
pub const DEFAULT_COUNT: usize = 24;

/// (category, main category, subcategory, leaf, product noun)
const LINES: &[(&str, &str, &str, &str, &str)] = &[
    ("ppe", "Head Protection", "Helmets", "Hard Hats", "Safety Helmet"),
    ("ppe", "Hand Protection", "Gloves", "Cut Resistant", "Work Gloves"),
    ("ppe", "Eye Protection", "Goggles", "Anti-Fog", "Safety Goggles"),
    ("ppe", "Foot Protection", "Boots", "Steel Toe", "Safety Boots"),
    ("rescue", "Fall Protection", "Harnesses", "Full Body", "Fall Arrest Harness"),
    ("rescue", "Rescue Equipment", "Ropes", "Static Ropes", "Rescue Rope"),
    ("workplace", "Signage", "Signs", "Warning Signs", "Warning Sign"),
    ("workplace", "First Aid", "Kits", "Vehicle Kits", "First Aid Kit"),
    ("other", "Accessories", "Storage", "Cabinets", "Storage Cabinet"),
];

const BRANDS: &[&str] = &["3M", "Honeywell", "Uvex", "Petzl", "Ansell", "MSA"];
const COLORS: &[&str] = &["Yellow", "White", "Blue", "Black", "Orange"];
const SIZES: &[&str] = &["S", "M", "L", "XL"];
const THEMES: &[&str] = &["", "Hi-Vis", "Classic"];
const TYPES: &[Option<&str>] = &[Some("best"), Some("new"), None, Some("discount"), Some("promo"), Some("suggest")];

/// A generated document and the collection it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleDocument {
    pub collection: &'static str,
    pub id: DocumentId,
    pub fields: Fields,
}

/// Generate `count` products spread over every category.
///
/// Keys are `sample-0001`, `sample-0002`, ...; every fourth product is out
/// of stock.
#[must_use]
pub fn generate(count: usize) -> Vec<SampleDocument> {
    (1..=count)
        .map(|n| {
            let (category, main, sub, leaf, noun) = cycle(LINES, n - 1);
            let brand = cycle(BRANDS, n);
            let price = 15 + (n * 37) % 240;
            let stock = if n % 4 == 0 { 0 } else { (n * 7) % 25 + 1 };
            let slug = slugify(noun);

            let mut fields = object(json!({
                "id": n,
                "name": format!("{brand} {noun}"),
                "price": format!("{price} ₾"),
                "priceValue": price,
                "image": format!("products/{slug}-{n}.jpg"),
                "images": [
                    format!("products/{slug}-{n}.jpg"),
                    format!("products/{slug}-{n}-alt.jpg"),
                ],
                "model": format!("SG-{n:04}"),
                "category": category,
                "mainCategory": main,
                "subcategory": sub,
                "leaf": leaf,
                "color": cycle(COLORS, n),
                "brand": brand,
                "size": cycle(SIZES, n),
                "theme": cycle(THEMES, n),
                "stock": stock,
                "description": format!("{noun} by {brand}, certified for professional use."),
            }));
            if let Some(tag) = cycle(TYPES, n) {
                fields.insert("productType".to_string(), Value::from(tag));
            }

            SampleDocument {
                collection: PRODUCTS,
                id: DocumentId::new(format!("sample-{n:04}")),
                fields,
            }
        })
        .collect()
}

/// Category documents matching the generated products.
#[must_use]
pub fn sample_categories() -> Vec<SampleDocument> {
    let mut docs = Vec::new();
    let mut mains: Vec<&str> = Vec::new();

    for &(category, main, sub, leaf, _) in LINES {
        if !mains.contains(&main) {
            mains.push(main);
            docs.push(SampleDocument {
                collection: "main_categories",
                id: DocumentId::new(slugify(main)),
                fields: object(json!({
                    "name": main,
                    "slug": slugify(main),
                    "category": category,
                    "order": mains.len(),
                })),
            });
        }

        docs.push(SampleDocument {
            collection: "subcategories",
            id: DocumentId::new(slugify(sub)),
            fields: object(json!({ "name": sub, "mainCategory": main })),
        });
        docs.push(SampleDocument {
            collection: "subcategories",
            id: DocumentId::new(format!("{}-{}", slugify(sub), slugify(leaf))),
            fields: object(json!({ "name": leaf, "mainCategory": main, "subcategory": sub })),
        });
    }

    docs
}

/// Load the sample catalog into an in-memory store.
pub fn seed_memory(store: &MemoryStore, count: usize) {
    for doc in generate(count).into_iter().chain(sample_categories()) {
        store.insert(doc.collection, doc.id, doc.fields);
    }
}

/// Write the sample catalog to any store, returning the number of
/// documents written.
///
/// # Errors
///
/// Returns the first store error; earlier writes are kept.
pub async fn seed<S: DocumentStore>(store: &S, count: usize) -> Result<usize, StoreError> {
    let docs: Vec<SampleDocument> = generate(count).into_iter().chain(sample_categories()).collect();
    for doc in &docs {
        store.put(doc.collection, &doc.id, doc.fields.clone()).await?;
    }
    Ok(docs.len())
}

#[allow(clippy::indexing_slicing)] // index is reduced modulo a non-empty const table
const fn cycle<T: Copy>(table: &[T], n: usize) -> T {
    table[n % table.len()]
}

fn object(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use safeguard_core::Category;

    use super::*;
    use crate::catalog::mapper::map_document;

    #[test]
    fn test_generate_is_deterministic() {
        assert_eq!(generate(10), generate(10));
        assert_eq!(generate(3)[2].id.as_str(), "sample-0003");
    }

    #[test]
    fn test_generated_products_map_cleanly() {
        let products: Vec<_> = generate(DEFAULT_COUNT)
            .into_iter()
            .map(|d| map_document(d.id, &d.fields))
            .collect();

        for category in Category::ALL {
            assert!(products.iter().any(|p| p.category == category));
        }
        assert!(products.iter().any(|p| p.stock == 0));
        assert!(products.iter().any(|p| p.in_stock()));
        assert!(products.iter().all(|p| !p.price_value.amount().is_zero()));
        assert!(products.iter().any(|p| p.product_type.is_none()));
    }

    #[tokio::test]
    async fn test_seed_writes_everything() {
        let store = MemoryStore::new();
        let written = seed(&store, 5).await.unwrap();

        assert_eq!(written, 5 + sample_categories().len());
        assert_eq!(store.documents(PRODUCTS).len(), 5);
        assert_eq!(store.write_count(), written);
    }

    #[tokio::test]
    async fn test_sample_categories_build_a_tree() {
        let store = MemoryStore::new();
        seed_memory(&store, 0);

        let tree = crate::catalog::CategoryTreeBuilder::new(store, std::time::Duration::from_secs(60))
            .build_tree()
            .await;
        assert_eq!(tree.len(), 9);
        assert!(tree.iter().all(|node| node.depth() == 3));
    }
}
