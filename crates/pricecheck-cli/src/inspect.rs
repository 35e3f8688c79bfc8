//! Single-shot helpers: print one variant code, compare two prices.

use std::path::Path;

use pricecheck_core::{parse_amount, symbol, RawPrice, VariantCode, VariantCodeBuilder};
use pricecheck_recon::{ArticleHandle, Catalog, FixtureCatalog, ItemKind};

/// Variant code of the best catalog match for `sku`, as inserted.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, no article matches, or
/// the article's snapshots cannot be read.
pub(crate) async fn default_variant_code(
    sku: &str,
    catalog_path: &Path,
) -> anyhow::Result<VariantCode> {
    let catalog = FixtureCatalog::from_path(catalog_path).map_err(|e| {
        anyhow::anyhow!("failed to load catalog {}: {e}", catalog_path.display())
    })?;

    let item = catalog
        .search(sku, usize::MAX)
        .await?
        .into_iter()
        .find(|i| i.kind == ItemKind::Article)
        .ok_or_else(|| anyhow::anyhow!("no article found for SKU '{sku}'"))?;

    let handle = catalog.insert(&item).await?;
    let item_properties = handle.item_properties().await?;
    let article_data = handle.article_data().await?;
    let code = VariantCodeBuilder::default().build(Some(&item_properties), Some(&article_data))?;
    tracing::debug!(sku, item = %item.name, "variant code built");
    Ok(code)
}

pub(crate) async fn run_variant_code(sku: &str, catalog_path: &Path) -> anyhow::Result<()> {
    let code = default_variant_code(sku, catalog_path).await?;
    println!("{code}");
    Ok(())
}

pub(crate) fn compare_report(first: &str, second: &str) -> String {
    let a = RawPrice::from(first);
    let b = RawPrice::from(second);
    format!(
        "{first} -> {}\n{second} -> {}\n{}",
        parse_amount(&a),
        parse_amount(&b),
        symbol(&a, &b)
    )
}
