//! Quote and special-order submission.

use safeguard_core::{CartItem, ContactDetails, QuoteRequest, RequestId, SpecialOrderRequest, ValidationError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::store::{DocumentStore, Fields, NewDocument, StoreError};

/// Collection for quote requests.
pub const QUOTES: &str = "quotes";

/// Collection for special-order requests.
pub const SPECIAL_QUOTES: &str = "special_quotes";

/// Field filled with the store's commit time.
pub const CREATED_AT: &str = "createdAt";

/// Errors that can occur when submitting a request.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The request was rejected before reaching the store.
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// The store refused or failed the write.
    #[error("failed to save request: {0}")]
    Store(#[from] StoreError),
}

/// Writes quote and special-order requests to the document store.
#[derive(Debug, Clone)]
pub struct QuoteSubmitter<S> {
    store: S,
}

impl<S: DocumentStore> QuoteSubmitter<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Submit a quote for a cart snapshot.
    ///
    /// The snapshot is copied into the request, so the caller may clear or
    /// keep editing its cart afterwards. Clearing the cart on success is the
    /// caller's job.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Validation`] for a cart with no quantities or invalid
    /// contact details (nothing is written), and [`SubmitError::Store`]
    /// when the write fails.
    #[instrument(skip_all, fields(items = items.len()))]
    pub async fn submit(&self, contact: &ContactDetails, items: &[CartItem]) -> Result<RequestId, SubmitError> {
        if items.iter().all(|item| item.quantity == 0) {
            return Err(ValidationError::EmptyCart.into());
        }
        let request = QuoteRequest::from_cart(contact.validate()?, items)?;

        let id = self.write(QUOTES, &request).await?;
        info!(request_id = %id, "Quote request submitted");
        Ok(id)
    }

    /// Submit a request for a product the catalog does not carry.
    ///
    /// # Errors
    ///
    /// Same as [`Self::submit`].
    #[instrument(skip_all)]
    pub async fn submit_special(&self, request: &SpecialOrderRequest) -> Result<RequestId, SubmitError> {
        let request = request.validate()?;

        let id = self.write(SPECIAL_QUOTES, &request).await?;
        info!(request_id = %id, "Special order request submitted");
        Ok(id)
    }

    async fn write(&self, collection: &str, request: &impl Serialize) -> Result<RequestId, StoreError> {
        let fields = match serde_json::to_value(request)? {
            serde_json::Value::Object(map) => map,
            _ => Fields::new(),
        };

        let document = NewDocument {
            fields,
            server_timestamp: Some(CREATED_AT),
        };
        match self.store.create(collection, document).await {
            Ok(id) => Ok(RequestId::new(id.into_inner())),
            Err(e) => {
                error!(collection, error = %e, "Failed to write request");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use safeguard_core::{DocumentId, Price, ProductId, ProductRef, VariantChoice};
    use serde_json::json;

    use super::*;
    use crate::store::MemoryStore;

    fn contact() -> ContactDetails {
        ContactDetails {
            first_name: "Nino".to_string(),
            last_name: "Beridze".to_string(),
            email: "Nino@Example.ge".to_string(),
            phone: "+995 555 123 456".to_string(),
            company: "Tbilisi Metro".to_string(),
            ..ContactDetails::default()
        }
    }

    fn line(id: i64, stock: u32, quantity: u32) -> CartItem {
        CartItem {
            product: ProductRef {
                id: ProductId::new(id),
                name: format!("Item {id}"),
                price: "10 ₾".to_string(),
                unit_price: Price::new(Decimal::new(10, 0)),
                image: String::new(),
                model: String::new(),
                stock,
            },
            variant: VariantChoice::default(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected_without_write() {
        let store = MemoryStore::new();
        let submitter = QuoteSubmitter::new(store.clone());

        let err = submitter.submit(&contact(), &[]).await.unwrap_err();
        assert!(matches!(err, SubmitError::Validation(ValidationError::EmptyCart)));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_zero_quantity_lines_are_rejected_without_write() {
        let store = MemoryStore::new();
        let submitter = QuoteSubmitter::new(store.clone());

        let err = submitter
            .submit(&contact(), &[line(1, 5, 0), line(1, 5, 0)])
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Validation(ValidationError::EmptyCart)));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_contact_is_rejected_without_write() {
        let store = MemoryStore::new();
        let submitter = QuoteSubmitter::new(store.clone());
        let mut bad = contact();
        bad.phone = "  ".to_string();

        let err = submitter.submit(&bad, &[line(1, 1, 1)]).await.unwrap_err();
        assert!(matches!(err, SubmitError::Validation(ValidationError::MissingField("phone"))));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_submit_writes_pending_quote() {
        let store = MemoryStore::new();
        let submitter = QuoteSubmitter::new(store.clone());

        let id = submitter
            .submit(&contact(), &[line(1, 5, 2), line(2, 0, 1)])
            .await
            .unwrap();

        let doc = store
            .get(QUOTES, &DocumentId::new(id.as_str()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.fields["status"], json!("pending"));
        assert_eq!(doc.fields["email"], json!("nino@example.ge"));
        assert_eq!(doc.fields["items"][0]["status_type"], json!("in stock"));
        assert_eq!(doc.fields["items"][1]["status_type"], json!("preorder"));
        assert!(doc.fields[CREATED_AT].is_string());
    }

    #[tokio::test]
    async fn test_store_failure_is_reported() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let submitter = QuoteSubmitter::new(store);

        let err = submitter.submit(&contact(), &[line(1, 1, 1)]).await.unwrap_err();
        assert!(matches!(err, SubmitError::Store(StoreError::Unavailable)));
    }

    #[tokio::test]
    async fn test_special_order_goes_to_its_own_collection() {
        let store = MemoryStore::new();
        let submitter = QuoteSubmitter::new(store.clone());

        let request = SpecialOrderRequest {
            contact: contact(),
            product_description: "  Arc flash suit, class 4 ".to_string(),
            quantity: Some(0),
            status: safeguard_core::QuoteStatus::Completed,
            created_at: None,
        };
        submitter.submit_special(&request).await.unwrap();

        let docs = store.documents(SPECIAL_QUOTES);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].fields["productDescription"], json!("Arc flash suit, class 4"));
        assert_eq!(docs[0].fields["status"], json!("pending"));
        assert!(docs[0].fields.get("quantity").is_none());
        assert!(store.documents(QUOTES).is_empty());
    }
}
