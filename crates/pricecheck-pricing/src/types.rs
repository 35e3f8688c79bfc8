use pricecheck_core::RawPrice;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A price quoted by the configurator's pricing endpoint for one variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub sku: String,
    pub variant_code: String,
    pub price: RawPrice,
    pub currency: Option<String>,
}

/// The expected price for a SKU and series, read from the ERP extract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferencePrice {
    pub sku: String,
    pub serie_key: String,
    pub price: RawPrice,
}

/// Body of a quote-service response. Extra fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct QuoteResponse {
    #[serde(default)]
    pub price: Option<RawPrice>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// One row of the reference extract. Series columns are dynamic, so rows stay
/// untyped.
pub(crate) type ReferenceRow = Map<String, Value>;

fn to_raw_price(value: &Value) -> Option<RawPrice> {
    match value {
        Value::Number(n) => n.as_f64().map(RawPrice::Number),
        Value::String(s) => Some(RawPrice::Text(s.clone())),
        _ => None,
    }
}

/// Picks the price for `serie_key` out of the extract rows: the first row that
/// has a column named after the series, else the `precio` column of the first
/// row.
pub(crate) fn select_reference_price(rows: &[ReferenceRow], serie_key: &str) -> Option<RawPrice> {
    rows.iter()
        .find_map(|row| row.get(serie_key).and_then(to_raw_price))
        .or_else(|| {
            rows.first()
                .and_then(|row| row.get("precio"))
                .and_then(to_raw_price)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(json: &str) -> Vec<ReferenceRow> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn series_column_wins() {
        let rows = rows(r#"[{"modelo":"ABC","4":"410,00€"},{"modelo":"ABC","7":512.5}]"#);
        assert_eq!(
            select_reference_price(&rows, "7"),
            Some(RawPrice::Number(512.5))
        );
        assert_eq!(
            select_reference_price(&rows, "4"),
            Some(RawPrice::Text("410,00€".to_string()))
        );
    }

    #[test]
    fn falls_back_to_precio_of_first_row() {
        let rows = rows(r#"[{"modelo":"ABC","precio":"99,00€"},{"precio":"1,00€"}]"#);
        assert_eq!(
            select_reference_price(&rows, "Z"),
            Some(RawPrice::Text("99,00€".to_string()))
        );
    }

    #[test]
    fn null_series_column_is_skipped() {
        let rows = rows(r#"[{"4":null},{"4":"12,00€"}]"#);
        assert_eq!(
            select_reference_price(&rows, "4"),
            Some(RawPrice::Text("12,00€".to_string()))
        );
    }

    #[test]
    fn nothing_to_select() {
        assert_eq!(select_reference_price(&[], "4"), None);
        let rows = rows(r#"[{"modelo":"ABC"}]"#);
        assert_eq!(select_reference_price(&rows, "4"), None);
    }

    #[test]
    fn quote_response_tolerates_extra_and_missing_fields() {
        let parsed: QuoteResponse =
            serde_json::from_str(r#"{"price":1234.5,"currency":"EUR","tax":21}"#).unwrap();
        assert_eq!(parsed.price, Some(RawPrice::Number(1234.5)));
        assert_eq!(parsed.currency.as_deref(), Some("EUR"));

        let empty: QuoteResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.price.is_none());
    }
}
