pub mod app_config;
pub mod article;
pub mod catalog_file;
pub mod config;
pub mod price;
pub mod variant;

pub use app_config::AppConfig;
pub use article::{ArticleData, Choice, ItemArticle, ItemProperties, PropertyAssignment};
pub use catalog_file::{
    load_catalog, CatalogFile, ChoiceConfig, FamilyHint, FixtureArticle, FixtureProperty,
    VisibleWhen,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use price::{is_equal, parse_amount, symbol, RawPrice, QUOTE_UNAVAILABLE, REFERENCE_UNAVAILABLE};
pub use variant::{AmendmentRule, VariantCode, VariantCodeBuilder, VariantToken};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),

    #[error("catalog validation failed: {0}")]
    Validation(String),
}
