pub mod article;
pub mod family;
pub mod fixture;
pub mod reconciler;
pub mod report;
pub mod series;

pub use article::{
    ArticleError, ArticleHandle, ArticleSession, Catalog, CatalogItem, ConfigProperty, ItemKind,
};
pub use family::{AxisMatcher, AxisPlan, ProductFamily};
pub use fixture::{FixtureArticleHandle, FixtureCatalog};
pub use reconciler::{parse_sku_list, PriceReconciler};
pub use report::{
    escape_html, DiscrepancyRecord, Outcome, ProductReport, ReconReport, ReconRow,
};
pub use series::{SeriesKey, SeriesKeyRules, SeriesNeedle};
