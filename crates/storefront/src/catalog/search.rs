//! In-memory filtering over a fetched product listing.

use safeguard_core::{Product, ProductType};
use serde::Serialize;

/// Products whose name, model, brand, subcategory, or leaf contains `term`
/// (case-insensitive). A blank term matches everything.
#[must_use]
pub fn search_products(products: &[Product], term: &str) -> Vec<Product> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return products.to_vec();
    }

    products
        .iter()
        .filter(|p| {
            [
                Some(p.name.as_str()),
                Some(p.model.as_str()),
                Some(p.brand.as_str()),
                Some(p.subcategory.as_str()),
                p.leaf.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term))
        })
        .cloned()
        .collect()
}

/// Products reachable from a `category=<name>` navigation link.
///
/// The name may be a top-level category, a main-category tag, a
/// subcategory, or a leaf.
#[must_use]
pub fn filter_by_navigation(products: &[Product], category: &str) -> Vec<Product> {
    let wanted = category.trim();
    if wanted.is_empty() {
        return products.to_vec();
    }

    products
        .iter()
        .filter(|p| {
            p.category.as_str().eq_ignore_ascii_case(wanted)
                || p.main_category
                    .as_deref()
                    .is_some_and(|m| m.trim().eq_ignore_ascii_case(wanted))
                || p.subcategory.trim().eq_ignore_ascii_case(wanted)
                || p.leaf
                    .as_deref()
                    .is_some_and(|l| l.trim().eq_ignore_ascii_case(wanted))
        })
        .cloned()
        .collect()
}

/// Products tagged with a merchandising type.
#[must_use]
pub fn products_of_type(products: &[Product], product_type: ProductType) -> Vec<Product> {
    products
        .iter()
        .filter(|p| p.product_type_tag() == Some(product_type))
        .cloned()
        .collect()
}

/// Variant values a buyer can pick for a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariantOptions {
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub themes: Vec<String>,
}

/// Distinct non-empty colors, sizes, and themes among products sharing the
/// product's subcategory, in first-seen order.
///
/// A product without a subcategory only offers its own values.
#[must_use]
pub fn variant_options(products: &[Product], product: &Product) -> VariantOptions {
    let subcategory = product.subcategory.trim();
    let siblings: Vec<&Product> = if subcategory.is_empty() {
        vec![product]
    } else {
        let mut siblings: Vec<&Product> = products
            .iter()
            .filter(|p| p.subcategory.trim().eq_ignore_ascii_case(subcategory))
            .collect();
        if !siblings.iter().any(|p| p.document_id == product.document_id) {
            siblings.insert(0, product);
        }
        siblings
    };

    VariantOptions {
        colors: distinct(siblings.iter().map(|p| p.color.as_str())),
        sizes: distinct(siblings.iter().map(|p| p.size.as_str())),
        themes: distinct(siblings.iter().map(|p| p.theme.as_str())),
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values.map(str::trim).filter(|v| !v.is_empty()) {
        if !out.iter().any(|seen| seen == value) {
            out.push(value.to_owned());
        }
    }
    out
}
