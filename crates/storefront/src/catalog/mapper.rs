//! Raw product documents to [`Product`].

use safeguard_core::{Category, DocumentId, Price, Product, ProductId};

use super::normalize::{Scalar, extract_field, extract_string_list, extract_text, raw_field};
use crate::store::{Document, Fields};

/// Map one stored document into a [`Product`].
///
/// Total: missing or malformed fields take their defaults (`""`, `0`,
/// [`Category::Other`], `None`).
#[must_use]
pub fn map_document(document_id: impl Into<DocumentId>, fields: &Fields) -> Product {
    let text = |name: &str| extract_field::<String>(fields, name).unwrap_or_default();

    let images = extract_string_list(fields, "images");
    let image = extract_text(fields, "image")
        .or_else(|| images.first().cloned())
        .unwrap_or_default();

    let stock = extract_field::<i64>(fields, "stock")
        .map_or(0, |s| u32::try_from(s.max(0)).unwrap_or(u32::MAX));

    let (price, price_value) = map_price(fields);

    Product {
        id: ProductId::new(extract_field::<i64>(fields, "id").unwrap_or_default()),
        document_id: document_id.into(),
        name: text("name"),
        price,
        price_value,
        image,
        images,
        model: text("model"),
        category: Category::from_lenient(&text("category")),
        main_category: extract_field::<String>(fields, "mainCategory"),
        subcategory: text("subcategory"),
        leaf: extract_text(fields, "leaf"),
        color: text("color"),
        brand: text("brand"),
        size: text("size"),
        theme: text("theme"),
        stock,
        material: extract_text(fields, "material"),
        description: extract_text(fields, "description"),
        features: extract_text(fields, "features"),
        product_type: extract_text(fields, "productType"),
    }
}

/// Display price and numeric price.
///
/// `price` is usually a label such as `"120 ₾"`, but some documents store a
/// bare number. `priceValue` wins for the numeric price when present.
fn map_price(fields: &Fields) -> (String, Price) {
    let numeric_price = raw_field(fields, "price")
        .and_then(Scalar::decode)
        .and_then(numeric);

    let label = extract_field::<String>(fields, "price").unwrap_or_default();

    let value = extract_field::<f64>(fields, "priceValue")
        .or(numeric_price)
        .map(Price::from_f64)
        .or_else(|| Price::parse_label(&label))
        .unwrap_or(Price::ZERO);

    let label = match numeric_price {
        Some(_) => value.display(),
        None => label,
    };

    (label, value)
}

#[allow(clippy::cast_precision_loss)] // Catalog prices are far below 2^52
fn numeric(scalar: Scalar<'_>) -> Option<f64> {
    match scalar {
        Scalar::Integer(i) => Some(i as f64),
        Scalar::Double(d) => Some(d),
        Scalar::Text(_) | Scalar::Bool(_) => None,
    }
}

/// Map a batch of documents, keeping their order.
#[must_use]
pub fn map_documents(documents: Vec<Document>) -> Vec<Product> {
    documents
        .into_iter()
        .map(|doc| map_document(doc.id, &doc.fields))
        .collect()
}
