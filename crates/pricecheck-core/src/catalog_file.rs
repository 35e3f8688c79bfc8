use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Product family declared for a fixture article. When absent the family is
/// inferred from the SKU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyHint {
    Upholstery,
    Table,
    Credenza,
}

impl std::fmt::Display for FamilyHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FamilyHint::Upholstery => write!(f, "upholstery"),
            FamilyHint::Table => write!(f, "table"),
            FamilyHint::Credenza => write!(f, "credenza"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceConfig {
    pub value: String,
    #[serde(default)]
    pub text: String,
}

/// The property is only present while the property `key` holds one of
/// `values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleWhen {
    pub key: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureProperty {
    /// Configurator-facing key, e.g. `"[Character]AWD_LISTAS__TAPICERIA"`.
    pub key: String,
    pub class: String,
    pub name: String,
    /// Initial value.
    pub value: String,
    #[serde(default)]
    pub choices: Vec<ChoiceConfig>,
    pub visible_when: Option<VisibleWhen>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureArticle {
    pub sku: String,
    pub label: String,
    pub family: Option<FamilyHint>,
    pub base_article_number: String,
    pub variant_code: Option<String>,
    #[serde(default)]
    pub properties: Vec<FixtureProperty>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    pub articles: Vec<FixtureArticle>,
}

/// Load and validate a fixture catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<CatalogFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let catalog: CatalogFile =
        serde_yaml::from_str(&content).map_err(ConfigError::CatalogFileParse)?;

    validate_catalog(&catalog)?;

    Ok(catalog)
}

fn validate_catalog(catalog: &CatalogFile) -> Result<(), ConfigError> {
    let mut seen_skus = HashSet::new();

    for article in &catalog.articles {
        if article.sku.trim().is_empty() {
            return Err(ConfigError::Validation(
                "article sku must be non-empty".to_string(),
            ));
        }

        if !seen_skus.insert(article.sku.to_uppercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate article sku: '{}'",
                article.sku
            )));
        }

        validate_properties(article)?;
    }

    Ok(())
}

fn validate_properties(article: &FixtureArticle) -> Result<(), ConfigError> {
    let mut seen_keys = HashSet::new();

    for property in &article.properties {
        if property.key.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "article '{}' has a property with an empty key",
                article.sku
            )));
        }

        if !seen_keys.insert(property.key.as_str()) {
            return Err(ConfigError::Validation(format!(
                "article '{}' declares property '{}' twice",
                article.sku, property.key
            )));
        }

        if !property.choices.is_empty()
            && !property.choices.iter().any(|c| c.value == property.value)
        {
            return Err(ConfigError::Validation(format!(
                "article '{}' property '{}' defaults to '{}', which is not one of its choices",
                article.sku, property.key, property.value
            )));
        }
    }

    for property in &article.properties {
        if let Some(cond) = &property.visible_when {
            if cond.key == property.key || !seen_keys.contains(cond.key.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "article '{}' property '{}' depends on unknown property '{}'",
                    article.sku, property.key, cond.key
                )));
            }
        }
    }

    Ok(())
}
