//! Walks every reachable configuration of the articles found for a SKU and
//! compares quoted against reference prices.
//!
//! The walk is strictly sequential. For each article it holds the
//! [`ArticleSession`] lock from the first `set_value` to the last comparison,
//! and every emit finishes its price lookups before the next value is set.

use chrono::Utc;
use pricecheck_core::{is_equal, Choice, RawPrice, VariantCodeBuilder};
use pricecheck_pricing::{QuoteSource, ReferenceSource};
use uuid::Uuid;

use crate::article::{ArticleError, ArticleHandle, ArticleSession, Catalog, CatalogItem, ItemKind};
use crate::family::{AxisPlan, ProductFamily};
use crate::report::{Outcome, ProductReport, ReconReport, ReconRow};
use crate::series::SeriesKey;

/// Splits a comma-separated SKU list, trimming blanks and dropping empty
/// entries.
#[must_use]
pub fn parse_sku_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Index of the first choice to walk: a leading placeholder is skipped when it
/// is one of exactly two choices.
pub(crate) fn start_index(choices: &[Choice]) -> usize {
    match choices {
        [first, _] if first.is_placeholder() => 1,
        _ => 0,
    }
}

/// Per-article walk state.
struct Walk<'a> {
    sku: &'a str,
    plan: &'a AxisPlan,
    report: &'a mut ProductReport,
    /// Keys already bound to an outer axis; they never match a deeper one.
    walked: Vec<String>,
}

pub struct PriceReconciler<C, Q, R> {
    catalog: C,
    quotes: Q,
    references: R,
    builder: VariantCodeBuilder,
    max_hits: usize,
}

impl<C, Q, R> PriceReconciler<C, Q, R>
where
    C: Catalog,
    Q: QuoteSource,
    R: ReferenceSource,
{
    #[must_use]
    pub fn new(catalog: C, quotes: Q, references: R, max_hits: usize) -> Self {
        Self {
            catalog,
            quotes,
            references,
            builder: VariantCodeBuilder::default(),
            max_hits,
        }
    }

    #[must_use]
    pub fn with_builder(mut self, builder: VariantCodeBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Reconciles each SKU in turn. Failures are recorded in the report and
    /// never stop the batch.
    pub async fn reconcile(&self, skus: &[String]) -> ReconReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        tracing::info!(run_id = %run_id, skus = skus.len(), "price check started");

        let mut products = Vec::with_capacity(skus.len());
        for sku in skus {
            products.push(self.reconcile_sku(sku).await);
        }

        let report = ReconReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            products,
        };
        tracing::info!(
            run_id = %run_id,
            matches = report.total_matches(),
            mismatches = report.total_mismatches(),
            not_comparable = report.total_not_comparable(),
            "price check finished"
        );
        report
    }

    pub async fn reconcile_sku(&self, sku: &str) -> ProductReport {
        let mut report = ProductReport::new(sku, ProductFamily::classify(sku));

        let items = match self.catalog.search(sku, self.max_hits).await {
            Ok(items) => items,
            Err(e) => {
                tracing::error!(sku, error = %e, "catalog search failed");
                report.search_error = Some(e.to_string());
                return report;
            }
        };
        if items.is_empty() {
            tracing::warn!(sku, "no catalog items found");
        }

        for item in items.into_iter().filter(|i| i.kind == ItemKind::Article) {
            let family = ProductFamily::resolve(item.family, sku);
            if report.items_matched == 0 {
                report.family = family;
            }
            report.items_matched += 1;
            self.reconcile_item(sku, item, family, &mut report).await;
        }

        tracing::info!(
            sku,
            family = %report.family,
            items = report.items_matched,
            matches = report.matches,
            mismatches = report.mismatches,
            not_comparable = report.not_comparable,
            aborted_branches = report.aborted_branches,
            "product reconciled"
        );
        report
    }

    async fn reconcile_item(
        &self,
        sku: &str,
        item: CatalogItem,
        family: ProductFamily,
        report: &mut ProductReport,
    ) {
        let handle = match self.catalog.insert(&item).await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(sku, item = %item.name, error = %e, "article insert failed");
                report.aborted_branches += 1;
                return;
            }
        };

        let session = ArticleSession::new(item, handle);
        let plan = family.plan();
        let mut guard = session.lock().await;
        let mut walk = Walk {
            sku,
            plan: &plan,
            report,
            walked: Vec::new(),
        };

        tracing::debug!(sku, item = %session.item().name, family = %family, "walking article");
        if let Err(e) = self.walk_axis(&mut walk, &mut **guard, 0, false).await {
            tracing::warn!(sku, item = %session.item().name, error = %e, "article walk aborted");
            walk.report.aborted_branches += 1;
        }
    }

    /// Walks axis `depth` and everything below it.
    ///
    /// When the axis is absent (or offers no choices) the current
    /// configuration is a leaf and is emitted, unless the caller already
    /// emitted it for a sentinel choice.
    async fn walk_axis(
        &self,
        walk: &mut Walk<'_>,
        handle: &mut dyn ArticleHandle,
        depth: usize,
        emitted: bool,
    ) -> Result<(), ArticleError> {
        let choices = match Self::probe_axis(walk, handle, depth).await? {
            Some(axis) => {
                let choices = handle.choices(&axis).await?;
                (!choices.is_empty()).then_some((axis, choices))
            }
            None => None,
        };

        let Some((axis, choices)) = choices else {
            if !emitted {
                self.emit(walk, handle).await?;
            }
            return Ok(());
        };

        walk.walked.push(axis.clone());
        for choice in &choices[start_index(&choices)..] {
            if let Err(e) = self.walk_choice(walk, handle, depth, &axis, choice).await {
                tracing::warn!(
                    sku = walk.sku,
                    axis = %axis,
                    value = %choice.value,
                    error = %e,
                    "branch aborted"
                );
                walk.report.aborted_branches += 1;
            }
        }
        walk.walked.pop();
        Ok(())
    }

    async fn walk_choice(
        &self,
        walk: &mut Walk<'_>,
        handle: &mut dyn ArticleHandle,
        depth: usize,
        axis: &str,
        choice: &Choice,
    ) -> Result<(), ArticleError> {
        handle.set_value(axis, &choice.value).await?;
        tracing::debug!(sku = walk.sku, axis, value = %choice.value, depth, "axis value set");

        let sentinel = walk.plan.is_sentinel(&choice.value);
        if sentinel {
            self.emit(walk, handle).await?;
        }

        Box::pin(self.walk_axis(walk, handle, depth + 1, sentinel)).await
    }

    /// Key of the property playing axis `depth` in the current configuration.
    async fn probe_axis(
        walk: &Walk<'_>,
        handle: &dyn ArticleHandle,
        depth: usize,
    ) -> Result<Option<String>, ArticleError> {
        let Some(matcher) = walk.plan.axes.get(depth) else {
            return Ok(None);
        };
        let properties = handle.properties().await?;
        Ok(properties
            .into_iter()
            .map(|p| p.key)
            .find(|key| matcher.matches(key) && !walk.walked.contains(key)))
    }

    /// Prices the current configuration and records the row.
    async fn emit(
        &self,
        walk: &mut Walk<'_>,
        handle: &dyn ArticleHandle,
    ) -> Result<(), ArticleError> {
        let item = handle.item_properties().await?;
        let data = handle.article_data().await?;
        let code = self.builder.build(Some(&item), Some(&data))?;
        let variant_code = code.to_string();
        let sku = walk.sku;

        let quoted_price = match self.quotes.fetch_quote(sku, &variant_code).await {
            Ok(quote) => quote.price,
            Err(e) => {
                tracing::warn!(sku, variant_code = %variant_code, error = %e, "quote unavailable");
                RawPrice::quote_unavailable()
            }
        };

        let row = match walk.plan.series_rules.extract(&code) {
            SeriesKey::NotFound => {
                tracing::warn!(
                    sku,
                    variant_code = %variant_code,
                    "no series key in variant code, row is not comparable"
                );
                ReconRow {
                    sku: sku.to_owned(),
                    serie: None,
                    variant_code,
                    quoted_price,
                    reference_price: None,
                    outcome: Outcome::NotComparable,
                }
            }
            SeriesKey::Found(serie) => {
                let reference_price = match self.references.fetch_reference(sku, &serie).await {
                    Ok(reference) => reference.price,
                    Err(e) => {
                        tracing::warn!(sku, serie = %serie, error = %e, "reference price unavailable");
                        RawPrice::reference_unavailable()
                    }
                };
                let outcome = if is_equal(&quoted_price, &reference_price) {
                    Outcome::Match
                } else {
                    tracing::info!(
                        sku,
                        serie = %serie,
                        quoted = %quoted_price,
                        reference = %reference_price,
                        variant_code = %variant_code,
                        "price mismatch"
                    );
                    Outcome::Mismatch
                };
                ReconRow {
                    sku: sku.to_owned(),
                    serie: Some(serie),
                    variant_code,
                    quoted_price,
                    reference_price: Some(reference_price),
                    outcome,
                }
            }
        };

        walk.report.record(row);
        Ok(())
    }
}
