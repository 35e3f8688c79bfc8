//! Canonical variant codes for configured articles.
//!
//! A variant code is a `;`-separated list of `class.name=value` tokens. The
//! configurator backend reports a (sometimes partial) code for the item, and
//! the article exposes its characteristic properties; [`VariantCodeBuilder`]
//! merges both, drops the upholstery sub-encodings that the pricing system
//! no longer understands, and applies the two series amendments the pricing
//! system expects for credenzas and ruta tables.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::article::{ArticleData, ItemProperties, PropertyAssignment};
use crate::CoreError;

pub const DELIMITER: char = ';';

/// Only properties whose class carries this marker take part in the code.
pub const PROPERTY_PREFIX: &str = "AW_";

/// Token prefixes superseded by the unified upholstery/series encoding.
pub const EXCLUDED_PREFIXES: [&str; 10] = [
    "AW_TAPICERIA.AWTAPICERIA",
    "AW_TAPICERIA_ASP.SERIE",
    "AW_TAPICERIA_ASP.COLECCION",
    "AW_TAPICERIA_ARP.SERIE",
    "AW_TAPICERIA_ARP.COLECCION",
    "AW_TAPICERIA_ARP.AWTAPIZ",
    "AW_TAPICERIA_ASP.AWTAPIZ",
    "AW_BZT_TAP.AWTAPIZ_BZ",
    "AW_TAPICERIA.SERIE_TAPICERIA",
    "AW_TAPICERIA_TAP.SERIE_TAPICERIA",
];

pub const CREDENZA_EXT_SERIES: &str = "AW_TIPO_MAT_EXT.AWSERIE_EXT";
pub const CREDENZA_SURFACE_SERIES: &str = "AW_CONF_SOBRE.AWSERIE_SOBRE";
pub const CREDENZA_SERIES: &str = "AW_CONF_CREDENZA.AWSERIE_MESAS";

pub const RUTA_LOWER_SERIES: &str = "AW_TIPO_SOBRE_INF.AWSERIE_MESAS_INF";
pub const RUTA_TABLE_SERIES: &str = "AW_CONF_MESA.AWSERIE_MESAS";

fn collapse_separators(input: &str) -> String {
    input.replace("__", "_")
}

/// One `class.name=value` unit of a variant code.
///
/// Equality is by the full string; two tokens that only differ in how their
/// class or name were spelled are distinct, which is why normalization happens
/// when the token is formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantToken(String);

impl VariantToken {
    /// Wraps a raw token as found in an existing code. No validation.
    #[must_use]
    pub fn raw(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn new(key: &str, value: &str) -> Self {
        Self(format!("{key}={value}"))
    }

    #[must_use]
    pub fn from_property(property: &PropertyAssignment) -> Self {
        Self(format!(
            "{}.{}={}",
            collapse_separators(&property.class_id),
            collapse_separators(&property.name),
            property.value
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Text before the first `=`; the whole token when there is none.
    #[must_use]
    pub fn key(&self) -> &str {
        self.0.split_once('=').map_or(self.0.as_str(), |(k, _)| k)
    }

    /// Text after the first `=`. `None` for malformed tokens without `=`.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.0.split_once('=').map(|(_, v)| v)
    }

    #[must_use]
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for VariantToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Insertion-ordered set of [`VariantToken`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantCode {
    tokens: Vec<VariantToken>,
}

impl VariantCode {
    /// Splits a `;`-joined code. Empty segments are skipped and repeated
    /// tokens keep their first position.
    #[must_use]
    pub fn parse(code: &str) -> Self {
        let mut parsed = Self::default();
        for segment in code.split(DELIMITER).filter(|s| !s.is_empty()) {
            parsed.insert(VariantToken::raw(segment));
        }
        parsed
    }

    /// Appends `token` unless an identical token is already present.
    /// Returns `true` when the token was added.
    pub fn insert(&mut self, token: VariantToken) -> bool {
        if self.tokens.contains(&token) {
            false
        } else {
            self.tokens.push(token);
            true
        }
    }

    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t.as_str() == token)
    }

    /// First token starting with `prefix`.
    #[must_use]
    pub fn find_prefixed(&self, prefix: &str) -> Option<&VariantToken> {
        self.tokens.iter().find(|t| t.has_prefix(prefix))
    }

    /// Removes every token starting with any of `prefixes`; returns how many
    /// were dropped.
    pub fn remove_prefixed<S: AsRef<str>>(&mut self, prefixes: &[S]) -> usize {
        let before = self.tokens.len();
        self.tokens
            .retain(|t| !prefixes.iter().any(|p| t.has_prefix(p.as_ref())));
        before - self.tokens.len()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &VariantToken> {
        self.tokens.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Rewrites tokens in place, then drops any duplicates the rewrite created.
    fn rewrite<F>(&mut self, mut f: F) -> usize
    where
        F: FnMut(&VariantToken) -> Option<VariantToken>,
    {
        let mut rewritten = 0;
        let mut next = Self::default();
        for token in self.tokens.drain(..) {
            match f(&token) {
                Some(replacement) => {
                    rewritten += 1;
                    next.insert(replacement);
                }
                None => {
                    next.insert(token);
                }
            }
        }
        *self = next;
        rewritten
    }
}

impl fmt::Display for VariantCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, token) in self.tokens.iter().enumerate() {
            if idx > 0 {
                write!(f, "{DELIMITER}")?;
            }
            f.write_str(token.as_str())?;
        }
        Ok(())
    }
}

impl Serialize for VariantCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A patch applied to a filtered variant code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmendmentRule {
    /// If tokens prefixed `first` and `second` both exist, add
    /// `target=<value(first)><value(second)>`.
    Synthesize {
        first: String,
        second: String,
        target: String,
    },
    /// If a token prefixed `source` exists, append its value to the value of
    /// every token prefixed `target`.
    AppendSuffix { source: String, target: String },
}

impl AmendmentRule {
    /// Credenza series: ext material series followed by surface series.
    #[must_use]
    pub fn credenza_series() -> Self {
        Self::Synthesize {
            first: CREDENZA_EXT_SERIES.to_string(),
            second: CREDENZA_SURFACE_SERIES.to_string(),
            target: CREDENZA_SERIES.to_string(),
        }
    }

    /// Ruta tables: the lower-top series is appended to the table series.
    #[must_use]
    pub fn ruta_table() -> Self {
        Self::AppendSuffix {
            source: RUTA_LOWER_SERIES.to_string(),
            target: RUTA_TABLE_SERIES.to_string(),
        }
    }

    /// Applies the rule to `code`. Returns `true` if anything changed.
    ///
    /// Source tokens without a value do not trigger the rule.
    pub fn apply(&self, code: &mut VariantCode) -> bool {
        match self {
            Self::Synthesize {
                first,
                second,
                target,
            } => {
                let first_value = code.find_prefixed(first).and_then(VariantToken::value);
                let second_value = code.find_prefixed(second).and_then(VariantToken::value);
                match (first_value, second_value) {
                    (Some(a), Some(b)) => {
                        let token = VariantToken::new(target, &format!("{a}{b}"));
                        code.insert(token)
                    }
                    _ => false,
                }
            }
            Self::AppendSuffix { source, target } => {
                let Some(source_token) = code.find_prefixed(source).cloned() else {
                    return false;
                };
                let Some(suffix) = source_token.value().map(str::to_owned) else {
                    return false;
                };
                let rewritten = code.rewrite(|token| {
                    if token == &source_token || !token.has_prefix(target) {
                        return None;
                    }
                    let current = token.value()?;
                    Some(VariantToken::new(token.key(), &format!("{current}{suffix}")))
                });
                rewritten > 0
            }
        }
    }
}

/// Builds canonical [`VariantCode`]s from article snapshots.
#[derive(Debug, Clone)]
pub struct VariantCodeBuilder {
    property_prefix: String,
    exclusions: Vec<String>,
    amendments: Vec<AmendmentRule>,
}

impl Default for VariantCodeBuilder {
    fn default() -> Self {
        Self::new(
            EXCLUDED_PREFIXES.iter().map(|p| (*p).to_string()).collect(),
            vec![AmendmentRule::credenza_series(), AmendmentRule::ruta_table()],
        )
    }
}

impl VariantCodeBuilder {
    #[must_use]
    pub fn new(exclusions: Vec<String>, amendments: Vec<AmendmentRule>) -> Self {
        Self {
            property_prefix: PROPERTY_PREFIX.to_string(),
            exclusions,
            amendments,
        }
    }

    /// Builds the variant code for an article from its two snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if either snapshot is absent.
    pub fn build(
        &self,
        item: Option<&ItemProperties>,
        data: Option<&ArticleData>,
    ) -> Result<VariantCode, CoreError> {
        let (Some(item), Some(data)) = (item, data) else {
            return Err(CoreError::InvalidInput(
                "item properties or article data is missing".to_string(),
            ));
        };
        let properties = data.properties.as_deref().unwrap_or_default();
        Ok(self.build_from_parts(item.variant_code(), properties))
    }

    /// Builds a variant code from an existing (possibly partial) code and the
    /// article's characteristic properties.
    ///
    /// Tokens from `existing` come first, then tokens generated from
    /// `properties`, each in source order.
    #[must_use]
    pub fn build_from_parts(
        &self,
        existing: Option<&str>,
        properties: &[PropertyAssignment],
    ) -> VariantCode {
        let mut code = existing.map(VariantCode::parse).unwrap_or_default();

        for property in properties
            .iter()
            .filter(|p| p.class_id.starts_with(&self.property_prefix))
        {
            code.insert(VariantToken::from_property(property));
        }

        code.remove_prefixed(&self.exclusions);

        for rule in &self.amendments {
            rule.apply(&mut code);
        }

        code
    }
}

#[cfg(test)]
#[path = "variant_test.rs"]
mod tests;
