//! Quote and special-order request records.
//!
//! Both are written to the document store as `pending` and picked up by
//! staff. Field names on the wire are camelCase except `status_type`,
//! which existing back-office tooling reads under that exact name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::CartItem;
use super::email::{Email, EmailError};
use super::id::ProductId;
use super::price::Price;
use super::status::{QuoteStatus, StockStatus};

/// Reasons a request is rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required contact field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// The email address is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
    /// A quote was submitted without any cart lines.
    #[error("cart is empty")]
    EmptyCart,
}

/// Buyer contact fields shared by quote and special-order forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// Free-text note from the buyer.
    pub note: String,
    /// Job title.
    pub position: String,
    pub company: String,
}

impl ContactDetails {
    /// Check required fields and return a trimmed copy with the email
    /// normalized.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] for a blank first name,
    /// last name, or phone, and [`ValidationError::InvalidEmail`] for a
    /// malformed email.
    pub fn validate(&self) -> Result<Self, ValidationError> {
        let required = [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("phone", &self.phone),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(field));
            }
        }

        let email = Email::parse(&self.email)?;

        Ok(Self {
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            email: email.into_inner(),
            phone: self.phone.trim().to_owned(),
            note: self.note.trim().to_owned(),
            position: self.position.trim().to_owned(),
            company: self.company.trim().to_owned(),
        })
    }
}

/// A cart line frozen into a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItem {
    pub product_id: ProductId,
    pub name: String,
    pub model: String,
    pub price: String,
    pub unit_price: Price,
    pub image: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(rename = "status_type")]
    pub status_type: StockStatus,
}

impl From<&CartItem> for QuoteItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product.id,
            name: item.product.name.clone(),
            model: item.product.model.clone(),
            price: item.product.price.clone(),
            unit_price: item.product.unit_price,
            image: item.product.image.clone(),
            quantity: item.quantity,
            color: item.variant.color.clone(),
            size: item.variant.size.clone(),
            theme: item.variant.theme.clone(),
            status_type: item.stock_status(),
        }
    }
}

/// A quote request: contact details plus an owned snapshot of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(flatten)]
    pub contact: ContactDetails,
    pub items: Vec<QuoteItem>,
    pub status: QuoteStatus,
    /// Assigned by the store on write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl QuoteRequest {
    /// Build a pending request from validated contact details and a cart
    /// snapshot.
    ///
    /// Items are copied, so later cart changes never reach the request.
    /// Zero-quantity lines are dropped and duplicate product ids merged
    /// (see [`CartItem::consolidate`]).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyCart`] when no line has a quantity.
    pub fn from_cart(contact: ContactDetails, items: &[CartItem]) -> Result<Self, ValidationError> {
        let lines = CartItem::consolidate(items.iter().cloned());
        if lines.is_empty() {
            return Err(ValidationError::EmptyCart);
        }

        Ok(Self {
            contact,
            items: lines.iter().map(QuoteItem::from).collect(),
            status: QuoteStatus::Pending,
            created_at: None,
        })
    }
}

/// A request for a product the catalog does not carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialOrderRequest {
    #[serde(flatten)]
    pub contact: ContactDetails,
    /// What the buyer is looking for.
    pub product_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub status: QuoteStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl SpecialOrderRequest {
    /// Validate and normalize the request, resetting its status to pending.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for invalid contact fields or a blank
    /// product description.
    pub fn validate(&self) -> Result<Self, ValidationError> {
        let contact = self.contact.validate()?;
        let description = self.product_description.trim();
        if description.is_empty() {
            return Err(ValidationError::MissingField("productDescription"));
        }

        Ok(Self {
            contact,
            product_description: description.to_owned(),
            quantity: self.quantity.filter(|q| *q > 0),
            status: QuoteStatus::Pending,
            created_at: None,
        })
    }
}
