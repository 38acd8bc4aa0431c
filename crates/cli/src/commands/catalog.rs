//! Catalog browsing commands.

use std::fmt::Write as _;

use safeguard_core::{CategoryTreeNode, Product};
use safeguard_storefront::catalog::{filter_by_navigation, search_products};

use super::Context;

/// Print products, optionally narrowed by navigation name and search term.
#[allow(clippy::print_stdout)]
pub async fn products(ctx: &Context, category: Option<&str>, search: Option<&str>) {
    let mut products = ctx.catalog().fetch_all().await;
    if let Some(category) = category {
        products = filter_by_navigation(&products, category);
    }
    if let Some(term) = search {
        products = search_products(&products, term);
    }

    for product in &products {
        println!("{}", product_line(product));
    }
    tracing::info!(count = products.len(), "Listed products");
}

/// Print the navigation tree, one node per line.
#[allow(clippy::print_stdout)]
pub async fn categories(ctx: &Context) {
    let tree = ctx.categories().build_tree().await;
    print!("{}", render_tree(&tree));
}

fn product_line(product: &Product) -> String {
    let availability = if product.in_stock() {
        format!("{} in stock", product.stock)
    } else {
        "preorder".to_string()
    };
    format!(
        "{:>6}  {:<40}  {:>12}  {}  [{}]",
        product.id, product.name, product.price, availability, product.document_id
    )
}

fn render_tree(nodes: &[CategoryTreeNode]) -> String {
    fn walk(out: &mut String, nodes: &[CategoryTreeNode], depth: usize) {
        for node in nodes {
            let _ = writeln!(out, "{}{} ({})", "  ".repeat(depth), node.name, node.slug);
            walk(out, &node.children, depth + 1);
        }
    }

    let mut out = String::new();
    walk(&mut out, nodes, 0);
    out
}
