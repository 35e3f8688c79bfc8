//! Snapshots read from a configurable article.
//!
//! These mirror what the configurator backend hands out for an inserted
//! article: the characteristic properties with their current values, the
//! item-level variant code, and the choice lists of individual properties.
//! They are plain values; the live article must be re-read after every
//! `set_value` because the backend owns the state.

use serde::{Deserialize, Serialize};

/// A single selected option on an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAssignment {
    /// Property class, e.g. `"AW_TAPICERIA_ASP"`.
    pub class_id: String,
    /// Property name within the class, e.g. `"AWSERIE_ASIE"`.
    pub name: String,
    pub value: String,
}

impl PropertyAssignment {
    pub fn new(
        class_id: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            class_id: class_id.into(),
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Item-level data of an article; carries the variant code the backend
/// already knows for the current configuration, which may be partial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemProperties {
    pub article: Option<ItemArticle>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemArticle {
    pub variant_code: Option<String>,
}

impl ItemProperties {
    #[must_use]
    pub fn with_variant_code(code: impl Into<String>) -> Self {
        Self {
            article: Some(ItemArticle {
                variant_code: Some(code.into()),
            }),
        }
    }

    /// The known variant code, if the backend reported one.
    #[must_use]
    pub fn variant_code(&self) -> Option<&str> {
        self.article
            .as_ref()
            .and_then(|a| a.variant_code.as_deref())
    }
}

/// Article-level data: the full list of characteristic properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleData {
    pub properties: Option<Vec<PropertyAssignment>>,
    pub base_article_number: String,
}

/// One entry of a property's choice list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    pub text: String,
}

impl Choice {
    /// Empty values and a literal `none` stand for "nothing selected".
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        let v = self.value.trim();
        v.is_empty() || v.eq_ignore_ascii_case("none")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_code_absent_when_article_missing() {
        assert!(ItemProperties::default().variant_code().is_none());
    }

    #[test]
    fn variant_code_reads_nested_value() {
        let item = ItemProperties::with_variant_code("A.B=1");
        assert_eq!(item.variant_code(), Some("A.B=1"));
    }

    #[test]
    fn placeholder_choices() {
        let empty = Choice {
            value: String::new(),
            text: "-".into(),
        };
        let none = Choice {
            value: "NONE".into(),
            text: "Sin tapizar".into(),
        };
        let real = Choice {
            value: "STAP".into(),
            text: "Tapizado".into(),
        };
        assert!(empty.is_placeholder());
        assert!(none.is_placeholder());
        assert!(!real.is_placeholder());
    }
}
