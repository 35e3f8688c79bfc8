//! Normalization and comparison of prices coming from differently formatted
//! sources.
//!
//! The quote service answers with JSON numbers using a decimal point; the
//! reference extract uses comma decimals, thousands dots and a currency
//! suffix (`"1.234,56€"`). Both are reduced to `f64` before comparing, and a
//! price that could not be produced parses to NaN so it never compares equal.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Shown in place of a quote that could not be obtained.
pub const QUOTE_UNAVAILABLE: &str = "Price not available";

/// Shown in place of a reference price that could not be obtained.
pub const REFERENCE_UNAVAILABLE: &str = "SAP not available";

static NON_NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9,.\-]").expect("valid non-numeric regex"));

/// Longest leading `-?digits[.digits]` literal with at least one digit.
static LEADING_DECIMAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(?:\d+(?:\.\d+)?|\.\d+)").expect("valid leading decimal regex")
});

/// A price as delivered by a source: either a JSON number or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
}

impl RawPrice {
    #[must_use]
    pub fn quote_unavailable() -> Self {
        Self::Text(QUOTE_UNAVAILABLE.to_string())
    }

    #[must_use]
    pub fn reference_unavailable() -> Self {
        Self::Text(REFERENCE_UNAVAILABLE.to_string())
    }

    /// `true` when the price parses to a number.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !parse_amount(self).is_nan()
    }
}

impl fmt::Display for RawPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for RawPrice {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawPrice {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawPrice {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Converts a price to a number.
///
/// Numbers pass through. Text keeps only digits, `,`, `.` and `-`; when both
/// separators are present the dots are thousands separators and the first
/// comma is the decimal mark, when only a comma is present it is the decimal
/// mark. The longest leading decimal literal is then parsed. Text without a
/// leading number (including the unavailable sentinels) yields NaN.
#[must_use]
pub fn parse_amount(raw: &RawPrice) -> f64 {
    match raw {
        RawPrice::Number(n) => *n,
        RawPrice::Text(text) => parse_text_amount(text),
    }
}

fn parse_text_amount(text: &str) -> f64 {
    let mut cleaned = NON_NUMERIC_RE.replace_all(text, "").into_owned();

    if cleaned.contains('.') && cleaned.contains(',') {
        cleaned = cleaned.replace('.', "").replacen(',', ".", 1);
    } else if cleaned.contains(',') {
        cleaned = cleaned.replacen(',', ".", 1);
    }

    LEADING_DECIMAL_RE
        .find(&cleaned)
        .and_then(|literal| literal.as_str().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// `true` when both prices parse to the same number. Never `true` when either
/// side is unavailable.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn is_equal(a: &RawPrice, b: &RawPrice) -> bool {
    let a = parse_amount(a);
    let b = parse_amount(b);
    !a.is_nan() && !b.is_nan() && a == b
}

/// Presentation helper over [`is_equal`].
#[must_use]
pub fn symbol(a: &RawPrice, b: &RawPrice) -> &'static str {
    if is_equal(a, b) {
        "\u{2705}"
    } else {
        "\u{274c}"
    }
}
