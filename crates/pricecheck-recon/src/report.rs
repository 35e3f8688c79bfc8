//! Reconciliation results and their HTML rendering.

use chrono::{DateTime, Utc};
use pricecheck_core::RawPrice;
use serde::Serialize;
use uuid::Uuid;

use crate::family::ProductFamily;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Match,
    Mismatch,
    /// No series key could be derived, so no reference price was looked up.
    NotComparable,
}

impl Outcome {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Match => "\u{2705}",
            Self::Mismatch => "\u{274c}",
            Self::NotComparable => "N/A",
        }
    }
}

/// One priced combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconRow {
    pub sku: String,
    pub serie: Option<String>,
    pub variant_code: String,
    pub quoted_price: RawPrice,
    pub reference_price: Option<RawPrice>,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscrepancyRecord {
    pub sku: String,
    pub variant_code: String,
    pub quoted_price: RawPrice,
    pub reference_price: RawPrice,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductReport {
    pub sku: String,
    pub family: ProductFamily,
    /// Article items returned by the catalog search and walked.
    pub items_matched: usize,
    pub rows: Vec<ReconRow>,
    pub discrepancies: Vec<DiscrepancyRecord>,
    pub matches: usize,
    pub mismatches: usize,
    pub not_comparable: usize,
    /// Branches abandoned because the article changed under the walk.
    pub aborted_branches: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_error: Option<String>,
}

impl ProductReport {
    #[must_use]
    pub fn new(sku: impl Into<String>, family: ProductFamily) -> Self {
        Self {
            sku: sku.into(),
            family,
            items_matched: 0,
            rows: Vec::new(),
            discrepancies: Vec::new(),
            matches: 0,
            mismatches: 0,
            not_comparable: 0,
            aborted_branches: 0,
            search_error: None,
        }
    }

    /// Appends `row` and keeps the counters and discrepancy list in step.
    pub fn record(&mut self, row: ReconRow) {
        match row.outcome {
            Outcome::Match => self.matches += 1,
            Outcome::Mismatch => {
                self.mismatches += 1;
                self.discrepancies.push(DiscrepancyRecord {
                    sku: row.sku.clone(),
                    variant_code: row.variant_code.clone(),
                    quoted_price: row.quoted_price.clone(),
                    reference_price: row
                        .reference_price
                        .clone()
                        .unwrap_or_else(RawPrice::reference_unavailable),
                });
            }
            Outcome::NotComparable => self.not_comparable += 1,
        }
        self.rows.push(row);
    }

    /// Number of price checks performed, comparable or not.
    #[must_use]
    pub fn emits(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub products: Vec<ProductReport>,
}

impl ReconReport {
    #[must_use]
    pub fn total_matches(&self) -> usize {
        self.products.iter().map(|p| p.matches).sum()
    }

    #[must_use]
    pub fn total_mismatches(&self) -> usize {
        self.products.iter().map(|p| p.mismatches).sum()
    }

    #[must_use]
    pub fn total_not_comparable(&self) -> usize {
        self.products.iter().map(|p| p.not_comparable).sum()
    }

    pub fn discrepancies(&self) -> impl Iterator<Item = &DiscrepancyRecord> {
        self.products.iter().flat_map(|p| p.discrepancies.iter())
    }

    /// Renders the prices table followed by the summary block.
    #[must_use]
    pub fn render_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<title>Price check {}</title>\n", self.run_id));
        html.push_str("</head>\n<body>\n");
        html.push_str(&self.render_prices_table());
        html.push_str(&self.render_summary());
        html.push_str("</body>\n</html>\n");
        html
    }

    #[must_use]
    pub fn render_prices_table(&self) -> String {
        let mut html = String::new();
        html.push_str("<table class=\"prices-table\">\n<thead>\n");
        push_header_row(&mut html, &["SKU", "Serie", "Precio", "SAP", "Igual"]);
        html.push_str("</thead>\n<tbody>\n");
        for row in self.products.iter().flat_map(|p| p.rows.iter()) {
            let reference = row
                .reference_price
                .as_ref()
                .map_or_else(|| "N/A".to_owned(), ToString::to_string);
            push_row(
                &mut html,
                &[
                    &row.sku,
                    row.serie.as_deref().unwrap_or("N/A"),
                    &row.quoted_price.to_string(),
                    &reference,
                    row.outcome.symbol(),
                ],
            );
        }
        html.push_str("</tbody>\n</table>\n");
        html
    }

    #[must_use]
    pub fn render_summary(&self) -> String {
        let mut html = String::new();
        html.push_str("<div class=\"summary-section\">\n<h3>Summary</h3>\n");
        html.push_str(&format!("<p>Total Successes: {}</p>\n", self.total_matches()));
        html.push_str(&format!("<p>Total Errors: {}</p>\n", self.total_mismatches()));

        if self.total_mismatches() > 0 {
            html.push_str("<div class=\"error-details\">\n<h4>Error Details</h4>\n");
            html.push_str("<table class=\"error-table\">\n<thead>\n");
            push_header_row(&mut html, &["SKU", "Variant Code", "Price", "SAP Price"]);
            html.push_str("</thead>\n<tbody>\n");
            for record in self.discrepancies() {
                push_row(
                    &mut html,
                    &[
                        &record.sku,
                        &record.variant_code,
                        &record.quoted_price.to_string(),
                        &record.reference_price.to_string(),
                    ],
                );
            }
            html.push_str("</tbody>\n</table>\n</div>\n");
        }

        html.push_str("</div>\n");
        html
    }
}

fn push_header_row(html: &mut String, cells: &[&str]) {
    html.push_str("<tr>");
    for cell in cells {
        html.push_str(&format!("<th>{}</th>", escape_html(cell)));
    }
    html.push_str("</tr>\n");
}

fn push_row(html: &mut String, cells: &[&str]) {
    html.push_str("<tr>");
    for cell in cells {
        html.push_str(&format!("<td>{}</td>", escape_html(cell)));
    }
    html.push_str("</tr>\n");
}

/// Escapes the five characters with special meaning in HTML text and
/// attribute values.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(outcome: Outcome, quoted: RawPrice, reference: Option<RawPrice>) -> ReconRow {
        ReconRow {
            sku: "ABC123".to_owned(),
            serie: reference.as_ref().map(|_| "4".to_owned()),
            variant_code: "AW_TAPICERIA_ASP.AWSERIE_ASIE=4".to_owned(),
            quoted_price: quoted,
            reference_price: reference,
            outcome,
        }
    }

    fn report(product: ProductReport) -> ReconReport {
        let now = Utc::now();
        ReconReport {
            run_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            products: vec![product],
        }
    }

    #[test]
    fn record_updates_counters_and_discrepancies() {
        let mut product = ProductReport::new("ABC123", ProductFamily::Upholstery);
        product.record(row(
            Outcome::Match,
            RawPrice::Number(410.0),
            Some(RawPrice::from("410,00€")),
        ));
        product.record(row(
            Outcome::Mismatch,
            RawPrice::quote_unavailable(),
            Some(RawPrice::from("410,00€")),
        ));
        product.record(row(Outcome::NotComparable, RawPrice::Number(5.0), None));

        assert_eq!(product.matches, 1);
        assert_eq!(product.mismatches, 1);
        assert_eq!(product.not_comparable, 1);
        assert_eq!(product.emits(), 3);
        assert_eq!(product.discrepancies.len(), 1);
        assert_eq!(
            product.discrepancies[0].quoted_price,
            RawPrice::quote_unavailable()
        );
    }

    #[test]
    fn escape_html_handles_all_specials() {
        assert_eq!(
            escape_html(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("AW_X.Y=1;AW_Z.W=2"), "AW_X.Y=1;AW_Z.W=2");
    }

    #[test]
    fn prices_table_has_headers_and_escaped_cells() {
        let mut product = ProductReport::new("ABC123", ProductFamily::Upholstery);
        product.record(ReconRow {
            sku: "<script>".to_owned(),
            serie: Some("4".to_owned()),
            variant_code: "X.Y=1".to_owned(),
            quoted_price: RawPrice::Number(10.0),
            reference_price: Some(RawPrice::from("10,00€")),
            outcome: Outcome::Match,
        });
        let html = report(product).render_prices_table();
        assert!(html.contains(
            "<tr><th>SKU</th><th>Serie</th><th>Precio</th><th>SAP</th><th>Igual</th></tr>"
        ));
        assert!(html.contains("<td>&lt;script&gt;</td>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<td>\u{2705}</td>"));
    }

    #[test]
    fn summary_lists_errors_only_when_present() {
        let mut clean = ProductReport::new("ABC123", ProductFamily::Upholstery);
        clean.record(row(
            Outcome::Match,
            RawPrice::Number(1.0),
            Some(RawPrice::Number(1.0)),
        ));
        let html = report(clean).render_summary();
        assert!(html.contains("Total Successes: 1"));
        assert!(html.contains("Total Errors: 0"));
        assert!(!html.contains("error-table"));

        let mut dirty = ProductReport::new("ABC123", ProductFamily::Upholstery);
        dirty.record(row(
            Outcome::Mismatch,
            RawPrice::Number(1.0),
            Some(RawPrice::reference_unavailable()),
        ));
        let html = report(dirty).render_summary();
        assert!(html.contains("Total Errors: 1"));
        assert!(html.contains(
            "<tr><th>SKU</th><th>Variant Code</th><th>Price</th><th>SAP Price</th></tr>"
        ));
        assert!(html.contains("<td>SAP not available</td>"));
    }

    #[test]
    fn html_document_wraps_table_and_summary() {
        let mut product = ProductReport::new("ABC123", ProductFamily::Upholstery);
        product.record(row(
            Outcome::Match,
            RawPrice::Number(1.0),
            Some(RawPrice::Number(1.0)),
        ));
        let report = report(product);
        let html = report.render_html();

        assert!(html.starts_with("<!DOCTYPE html>\n"));
        assert!(html.contains(&format!("<title>Price check {}</title>\n", report.run_id)));
        assert!(html.contains("<p>Total Successes: 1</p>\n<p>Total Errors: 0</p>\n"));
        let table = html.find("prices-table").unwrap();
        let summary = html.find("summary-section").unwrap();
        assert!(table < summary);
        assert!(html.ends_with("</body>\n</html>\n"));
    }

    #[test]
    fn not_comparable_rows_render_placeholders() {
        let mut product = ProductReport::new("ABC123", ProductFamily::Upholstery);
        product.record(row(Outcome::NotComparable, RawPrice::Number(3.0), None));
        let html = report(product).render_prices_table();
        assert!(html.contains("<td>ABC123</td><td>N/A</td><td>3</td><td>N/A</td><td>N/A</td>"));
    }

    #[test]
    fn serializes_to_json() {
        let mut product = ProductReport::new("M100", ProductFamily::Table);
        product.record(row(
            Outcome::Mismatch,
            RawPrice::Number(2.0),
            Some(RawPrice::from("3,00€")),
        ));
        let json = serde_json::to_value(report(product)).unwrap();
        let first = &json["products"][0];
        assert_eq!(first["family"], "table");
        assert_eq!(first["rows"][0]["outcome"], "mismatch");
        assert_eq!(first["rows"][0]["quoted_price"], 2.0);
        assert_eq!(first["discrepancies"][0]["reference_price"], "3,00€");
        assert!(first.get("search_error").is_none());
    }
}
