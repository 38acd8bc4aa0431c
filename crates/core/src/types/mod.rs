//! Core types for Safeguard.
//!
//! This module provides type-safe wrappers and records for the catalog,
//! cart, and quote domains.

pub mod cart;
pub mod category;
pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod quote;
pub mod status;

pub use cart::{CartItem, ProductRef, VariantChoice};
pub use category::{Category, CategoryTreeNode, ProductType};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use product::Product;
pub use quote::{ContactDetails, QuoteItem, QuoteRequest, SpecialOrderRequest, ValidationError};
pub use status::*;
