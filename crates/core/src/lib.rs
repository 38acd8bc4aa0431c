//! Safeguard Core - Shared types library.
//!
//! This crate provides common types used across all Safeguard components:
//! - `storefront` - Catalog, cart, and quote services plus the JSON API
//! - `cli` - Command-line tools for seeding, browsing, and quoting
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no document store
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product, category tree, cart, and quote records plus the
//!   newtypes they are built from

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
