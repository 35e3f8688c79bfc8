//! Product families and the configuration axes walked for each of them.

use std::fmt;

use pricecheck_core::variant::{CREDENZA_SERIES, RUTA_TABLE_SERIES};
use pricecheck_core::FamilyHint;
use serde::Serialize;

use crate::series::{SeriesKeyRules, SeriesNeedle};

/// Chooses which axes are walked and how the series key is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductFamily {
    Upholstery,
    Table,
    Credenza,
}

impl ProductFamily {
    /// Infers the family from the article number: `CZ…` credenzas, `M…`
    /// tables, anything else upholstered seating.
    #[must_use]
    pub fn classify(sku: &str) -> Self {
        let sku = sku.trim();
        if sku.starts_with("CZ") {
            Self::Credenza
        } else if sku.starts_with('M') {
            Self::Table
        } else {
            Self::Upholstery
        }
    }

    /// The catalog's hint when it has one, else [`ProductFamily::classify`].
    #[must_use]
    pub fn resolve(hint: Option<FamilyHint>, sku: &str) -> Self {
        hint.map_or_else(|| Self::classify(sku), Self::from)
    }

    #[must_use]
    pub fn plan(self) -> AxisPlan {
        match self {
            Self::Upholstery => AxisPlan {
                axes: vec![
                    AxisMatcher::AnyOf(vec![
                        "[Character]AWD_AWOPCION__TAPICERIA",
                        "[Character]AWD_LISTAS__TAPICERIA",
                    ]),
                    AxisMatcher::Affixed {
                        prefix: "[Character]AWD_LISTAS",
                        suffix: "TAPICERIA",
                    },
                    AxisMatcher::Affixed {
                        prefix: "[Character]AWD_SERIE",
                        suffix: "TAPICERIA",
                    },
                ],
                sentinel: Some("STAP".to_owned()),
                series_rules: SeriesKeyRules::new(["AWSERIE_ASIE", "AWSERIE"]),
            },
            Self::Table => AxisPlan {
                axes: vec![
                    AxisMatcher::Exact("[Character]AWD_FORMA__SOBRE"),
                    AxisMatcher::Exact("[Character]AWD_TIPO__SOBRE"),
                    AxisMatcher::Exact("[Character]AWD_SUBTIPO__SOBRE"),
                ],
                sentinel: None,
                series_rules: SeriesKeyRules::new([
                    SeriesNeedle::Key(RUTA_TABLE_SERIES.to_owned()),
                    SeriesNeedle::from("AWSERIE"),
                ]),
            },
            Self::Credenza => AxisPlan {
                axes: vec![
                    AxisMatcher::Exact("[Character]AWD_TIPO_MAT__EXT"),
                    AxisMatcher::Exact("[Character]AWD_SERIE__EXT"),
                    AxisMatcher::Exact("[Character]AWD_CONF__SOBRE"),
                ],
                sentinel: None,
                series_rules: SeriesKeyRules::new([
                    SeriesNeedle::Key(CREDENZA_SERIES.to_owned()),
                    SeriesNeedle::from("AWSERIE"),
                ]),
            },
        }
    }
}

impl From<FamilyHint> for ProductFamily {
    fn from(hint: FamilyHint) -> Self {
        match hint {
            FamilyHint::Upholstery => Self::Upholstery,
            FamilyHint::Table => Self::Table,
            FamilyHint::Credenza => Self::Credenza,
        }
    }
}

impl fmt::Display for ProductFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upholstery => write!(f, "upholstery"),
            Self::Table => write!(f, "table"),
            Self::Credenza => write!(f, "credenza"),
        }
    }
}

/// Recognizes the property that plays the role of one axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxisMatcher {
    Exact(&'static str),
    AnyOf(Vec<&'static str>),
    Affixed {
        prefix: &'static str,
        suffix: &'static str,
    },
}

impl AxisMatcher {
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        match self {
            Self::Exact(expected) => key == *expected,
            Self::AnyOf(keys) => keys.iter().any(|k| *k == key),
            Self::Affixed { prefix, suffix } => key.starts_with(prefix) && key.ends_with(suffix),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisPlan {
    /// Walked in order; axis `n + 1` is only probed after a value of axis `n`
    /// has been set.
    pub axes: Vec<AxisMatcher>,
    /// A choice value that is priced as soon as it is selected, before the
    /// sub-axes are walked.
    pub sentinel: Option<String>,
    pub series_rules: SeriesKeyRules,
}

impl AxisPlan {
    #[must_use]
    pub fn is_sentinel(&self, value: &str) -> bool {
        self.sentinel.as_deref() == Some(value)
    }
}
