use std::io::Write as _;

use pricecheck_core::RawPrice;
use pricecheck_recon::{Outcome, ProductFamily, ProductReport, ReconReport, ReconRow};

use super::*;

#[test]
fn parses_check_with_skus_only() {
    let cli = Cli::try_parse_from(["pricecheck", "check", "--skus", "ABC123,M100"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Check {
            ref skus,
            catalog: None,
            html_out: None,
            json: false,
        } if skus == "ABC123,M100"
    ));
}

#[test]
fn parses_check_with_all_flags() {
    let cli = Cli::try_parse_from([
        "pricecheck",
        "check",
        "--skus",
        "CZ100",
        "--catalog",
        "fixtures/catalog.yaml",
        "--html-out",
        "out/report.html",
        "--json",
    ])
    .expect("expected valid cli args");

    let Commands::Check {
        catalog,
        html_out,
        json,
        ..
    } = cli.command
    else {
        panic!("expected check command");
    };
    assert_eq!(catalog, Some(PathBuf::from("fixtures/catalog.yaml")));
    assert_eq!(html_out, Some(PathBuf::from("out/report.html")));
    assert!(json);
}

#[test]
fn check_requires_skus() {
    assert!(Cli::try_parse_from(["pricecheck", "check"]).is_err());
}

#[test]
fn command_is_required() {
    assert!(Cli::try_parse_from(["pricecheck"]).is_err());
}

#[test]
fn parses_variant_code_with_explicit_catalog() {
    let cli = Cli::try_parse_from([
        "pricecheck",
        "variant-code",
        "--sku",
        "ABC123",
        "--catalog",
        "other.yaml",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::VariantCode { ref sku, ref catalog }
            if sku == "ABC123" && catalog == &PathBuf::from("other.yaml")
    ));
}

#[test]
fn parses_compare_positionals() {
    let cli = Cli::try_parse_from(["pricecheck", "compare", "410", "410,00€"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Compare { ref first, ref second } if first == "410" && second == "410,00€"
    ));
}

#[test]
fn compare_report_shows_amounts_and_symbol() {
    assert_eq!(
        inspect::compare_report("1234.56", "1.234,56€"),
        "1234.56 -> 1234.56\n1.234,56€ -> 1234.56\n\u{2705}"
    );
    assert_eq!(
        inspect::compare_report("Price not available", "10"),
        "Price not available -> NaN\n10 -> 10\n\u{274c}"
    );
}

#[tokio::test]
async fn default_variant_code_reads_catalog_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(
        br#"
articles:
  - sku: CZ100
    label: Credenza
    base_article_number: CZ100
    variant_code: "AW_BASE.MODELO=CZ100;"
    properties:
      - key: EXT
        class: AW_TIPO_MAT__EXT
        name: AWSERIE_EXT
        value: "2"
      - key: SOBRE
        class: AW_CONF_SOBRE
        name: AWSERIE_SOBRE
        value: "7"
"#,
    )
    .expect("write catalog");

    let code = inspect::default_variant_code("cz100", file.path())
        .await
        .expect("variant code");
    assert_eq!(
        code.to_string(),
        "AW_BASE.MODELO=CZ100;AW_TIPO_MAT_EXT.AWSERIE_EXT=2;AW_CONF_SOBRE.AWSERIE_SOBRE=7;AW_CONF_CREDENZA.AWSERIE_MESAS=27"
    );

    let err = inspect::default_variant_code("NOPE", file.path())
        .await
        .expect_err("unknown sku");
    assert!(err.to_string().contains("no article found"));
}

fn sample_report() -> ReconReport {
    let mut found = ProductReport::new("ABC123", ProductFamily::Upholstery);
    found.items_matched = 1;
    found.record(ReconRow {
        sku: "ABC123".to_owned(),
        serie: Some("1".to_owned()),
        variant_code: "A.B=1".to_owned(),
        quoted_price: RawPrice::Number(100.0),
        reference_price: Some(RawPrice::from("100,00€")),
        outcome: Outcome::Match,
    });
    found.record(ReconRow {
        sku: "ABC123".to_owned(),
        serie: Some("2".to_owned()),
        variant_code: "A.B=2".to_owned(),
        quoted_price: RawPrice::quote_unavailable(),
        reference_price: Some(RawPrice::from("200,00€")),
        outcome: Outcome::Mismatch,
    });
    let missing = ProductReport::new("M999", ProductFamily::Table);

    let now = chrono::Utc::now();
    ReconReport {
        run_id: uuid::Uuid::nil(),
        started_at: now,
        finished_at: now,
        products: vec![found, missing],
    }
}

#[test]
fn text_summary_lists_products_totals_and_discrepancies() {
    let text = check::render_text_summary(&sample_report());

    assert!(text.starts_with("price check 00000000-0000-0000-0000-000000000000\n"));
    assert!(text.contains("ABC123"));
    assert!(text.contains("match=1 mismatch=1"));
    assert!(text.contains("M999"));
    assert!(text.contains("(not found)"));
    assert!(text.contains("Total Successes: 1  Total Errors: 1"));
    assert!(text.contains("A.B=2 quoted=Price not available reference=200,00€"));
}

#[test]
fn json_report_serializes() {
    let value = serde_json::to_value(sample_report()).expect("serializable");
    assert_eq!(value["products"][0]["family"], "upholstery");
    assert_eq!(value["products"][0]["rows"][1]["outcome"], "mismatch");
    assert!(value["products"][1].get("search_error").is_none());
}
