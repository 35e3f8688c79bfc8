//! `check` command handler.
//!
//! Setup failures (no SKUs, unreadable catalog, bad service URLs) are
//! returned as errors. Discrepancies and unavailable prices are part of the
//! report and never fail the command.

use std::path::Path;

use pricecheck_core::AppConfig;
use pricecheck_pricing::{QuoteClient, ReferenceClient};
use pricecheck_recon::{parse_sku_list, FixtureCatalog, PriceReconciler, ReconReport};

/// Run a price check over `skus` and print the outcome.
///
/// # Errors
///
/// Returns an error if the SKU list is empty, the catalog cannot be loaded,
/// either price client cannot be built, or the HTML report cannot be written.
pub(crate) async fn run_check(
    config: &AppConfig,
    skus: &str,
    catalog_override: Option<&Path>,
    html_out: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let skus = parse_sku_list(skus);
    if skus.is_empty() {
        anyhow::bail!("no SKUs given; pass --skus A,B,C");
    }

    let catalog_path = catalog_override.unwrap_or(&config.catalog_path);
    let catalog = FixtureCatalog::from_path(catalog_path).map_err(|e| {
        anyhow::anyhow!("failed to load catalog {}: {e}", catalog_path.display())
    })?;

    let quotes = QuoteClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build quote client: {e}"))?;
    let references = ReferenceClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build reference client: {e}"))?;

    let reconciler = PriceReconciler::new(catalog, quotes, references, config.catalog_max_hits);
    let report = reconciler.reconcile(&skus).await;

    if let Some(path) = html_out {
        std::fs::write(path, report.render_html())
            .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
        tracing::info!(path = %path.display(), "HTML report written");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text_summary(&report));
    }

    Ok(())
}

/// One line per product followed by the run totals and every discrepancy.
pub(crate) fn render_text_summary(report: &ReconReport) -> String {
    let mut out = format!("price check {}\n", report.run_id);

    for product in &report.products {
        out.push_str(&format!(
            "  {:<12} {:<11} items={} match={} mismatch={} n/a={}",
            product.sku,
            product.family.to_string(),
            product.items_matched,
            product.matches,
            product.mismatches,
            product.not_comparable,
        ));
        if product.aborted_branches > 0 {
            out.push_str(&format!(" aborted={}", product.aborted_branches));
        }
        if let Some(error) = &product.search_error {
            out.push_str(&format!(" search failed: {error}"));
        } else if product.items_matched == 0 {
            out.push_str(" (not found)");
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "Total Successes: {}  Total Errors: {}  Not comparable: {}\n",
        report.total_matches(),
        report.total_mismatches(),
        report.total_not_comparable(),
    ));

    for record in report.discrepancies() {
        out.push_str(&format!(
            "  \u{274c} {} {} quoted={} reference={}\n",
            record.sku, record.variant_code, record.quoted_price, record.reference_price
        ));
    }
    out
}
