//! Seed the store with sample products and categories.

use safeguard_storefront::catalog::sample;
use tracing::info;

use super::Context;

/// Write `count` sample products plus the sample category tree.
///
/// Documents are upserted under fixed keys, so reseeding overwrites rather
/// than duplicates.
///
/// # Errors
///
/// Returns an error if no store is configured or a write fails.
pub async fn sample(ctx: &Context, count: usize) -> Result<(), Box<dyn std::error::Error>> {
    let store = ctx.store()?;
    info!(backend = store.kind(), count, "Seeding sample catalog");

    let written = sample::seed(store, count).await?;

    info!(written, "Seeding complete");
    Ok(())
}
