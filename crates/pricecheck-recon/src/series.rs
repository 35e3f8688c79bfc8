//! Locating the price-list series key inside a built variant code.

use pricecheck_core::VariantCode;
use serde::Serialize;

/// Result of looking up the price-list series in a variant code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum SeriesKey {
    Found(String),
    NotFound,
}

/// How a rule recognizes the token carrying the series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesNeedle {
    /// The token text contains the needle anywhere.
    Contains(String),
    /// The token's `class.name` key is exactly the needle.
    Key(String),
}

impl SeriesNeedle {
    #[must_use]
    pub fn matches(&self, token: &str) -> bool {
        match self {
            Self::Contains(needle) => token.contains(needle.as_str()),
            Self::Key(key) => token
                .strip_prefix(key.as_str())
                .is_some_and(|rest| rest.starts_with('=')),
        }
    }
}

impl From<&str> for SeriesNeedle {
    fn from(needle: &str) -> Self {
        Self::Contains(needle.to_owned())
    }
}

impl From<String> for SeriesNeedle {
    fn from(needle: String) -> Self {
        Self::Contains(needle)
    }
}

/// Ordered list of needles; the first needle that finds a token wins.
///
/// A needle matches the first token it recognizes that carries a non-empty
/// value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesKeyRules {
    needles: Vec<SeriesNeedle>,
}

impl SeriesKeyRules {
    #[must_use]
    pub fn new<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SeriesNeedle>,
    {
        Self {
            needles: needles.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn needles(&self) -> &[SeriesNeedle] {
        &self.needles
    }

    #[must_use]
    pub fn extract(&self, code: &VariantCode) -> SeriesKey {
        self.needles
            .iter()
            .find_map(|needle| {
                code.tokens()
                    .filter(|token| needle.matches(token.as_str()))
                    .find_map(|token| token.value().filter(|v| !v.is_empty()))
            })
            .map_or(SeriesKey::NotFound, |value| SeriesKey::Found(value.to_owned()))
    }
}
