//! A catalog backed by a YAML fixture, for running checks without the
//! configurator backend.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use pricecheck_core::{
    load_catalog, ArticleData, CatalogFile, Choice, ConfigError, FixtureArticle, FixtureProperty,
    ItemArticle, ItemProperties, PropertyAssignment,
};

use crate::article::{ArticleError, ArticleHandle, Catalog, CatalogItem, ConfigProperty, ItemKind};

const EXACT_SCORE: u32 = 100;
const PREFIX_SCORE: u32 = 50;
const LABEL_SCORE: u32 = 10;

#[derive(Debug, Clone)]
pub struct FixtureCatalog {
    articles: Vec<FixtureArticle>,
}

impl FixtureCatalog {
    #[must_use]
    pub fn new(file: CatalogFile) -> Self {
        Self {
            articles: file.articles,
        }
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        load_catalog(path).map(Self::new)
    }

    fn score(article: &FixtureArticle, query: &str) -> u32 {
        let sku = article.sku.to_uppercase();
        if sku == query {
            EXACT_SCORE
        } else if sku.starts_with(query) {
            PREFIX_SCORE
        } else if article.label.to_uppercase().contains(query) {
            LABEL_SCORE
        } else {
            0
        }
    }
}

#[async_trait]
impl Catalog for FixtureCatalog {
    async fn search(
        &self,
        query: &str,
        max_hits: usize,
    ) -> Result<Vec<CatalogItem>, ArticleError> {
        let query = query.trim().to_uppercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<CatalogItem> = self
            .articles
            .iter()
            .filter_map(|article| {
                let score = Self::score(article, &query);
                (score > 0).then(|| CatalogItem {
                    name: article.sku.clone(),
                    label: article.label.clone(),
                    kind: ItemKind::Article,
                    score,
                    family: article.family,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        hits.truncate(max_hits);
        Ok(hits)
    }

    async fn insert(&self, item: &CatalogItem) -> Result<Box<dyn ArticleHandle>, ArticleError> {
        if item.kind != ItemKind::Article {
            return Err(ArticleError::NotAnArticle {
                name: item.name.clone(),
            });
        }
        let article = self
            .articles
            .iter()
            .find(|a| a.sku == item.name)
            .ok_or_else(|| ArticleError::Provider(format!("unknown article {}", item.name)))?;
        Ok(Box::new(FixtureArticleHandle::new(article.clone())))
    }
}

/// Inserted fixture article. Values start at the fixture defaults; a
/// property with a `visible_when` condition exists only while its controlling
/// property is itself present and holds one of the listed values.
#[derive(Debug, Clone)]
pub struct FixtureArticleHandle {
    article: FixtureArticle,
    values: HashMap<String, String>,
}

impl FixtureArticleHandle {
    #[must_use]
    pub fn new(article: FixtureArticle) -> Self {
        let values = article
            .properties
            .iter()
            .map(|p| (p.key.clone(), p.value.clone()))
            .collect();
        Self { article, values }
    }

    fn property(&self, key: &str) -> Option<&FixtureProperty> {
        self.article.properties.iter().find(|p| p.key == key)
    }

    fn value_of(&self, property: &FixtureProperty) -> String {
        self.values
            .get(&property.key)
            .cloned()
            .unwrap_or_else(|| property.value.clone())
    }

    fn is_visible(&self, property: &FixtureProperty) -> bool {
        self.is_visible_within(property, self.article.properties.len())
    }

    // `budget` bounds the walk up the dependency chain so a cyclic fixture
    // cannot recurse forever; a cycle just hides the properties involved.
    fn is_visible_within(&self, property: &FixtureProperty, budget: usize) -> bool {
        let Some(cond) = &property.visible_when else {
            return true;
        };
        if budget == 0 {
            return false;
        }
        let Some(controller) = self.property(&cond.key) else {
            return false;
        };
        self.is_visible_within(controller, budget - 1)
            && cond.values.contains(&self.value_of(controller))
    }

    fn visible_property(&self, key: &str) -> Result<&FixtureProperty, ArticleError> {
        self.property(key)
            .filter(|p| self.is_visible(p))
            .ok_or_else(|| ArticleError::PropertyMissing {
                key: key.to_owned(),
            })
    }
}

#[async_trait]
impl ArticleHandle for FixtureArticleHandle {
    async fn properties(&self) -> Result<Vec<ConfigProperty>, ArticleError> {
        Ok(self
            .article
            .properties
            .iter()
            .filter(|p| self.is_visible(p))
            .map(|p| ConfigProperty {
                key: p.key.clone(),
                value: self.value_of(p),
            })
            .collect())
    }

    async fn choices(&self, key: &str) -> Result<Vec<Choice>, ArticleError> {
        let property = self.visible_property(key)?;
        Ok(property
            .choices
            .iter()
            .map(|c| Choice {
                value: c.value.clone(),
                text: c.text.clone(),
            })
            .collect())
    }

    async fn set_value(&mut self, key: &str, value: &str) -> Result<(), ArticleError> {
        let property = self.visible_property(key)?;
        if !property.choices.is_empty() && !property.choices.iter().any(|c| c.value == value) {
            return Err(ArticleError::InvalidChoice {
                key: key.to_owned(),
                value: value.to_owned(),
            });
        }
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn article_data(&self) -> Result<ArticleData, ArticleError> {
        let properties = self
            .article
            .properties
            .iter()
            .filter(|p| self.is_visible(p))
            .map(|p| PropertyAssignment::new(&p.class, &p.name, self.value_of(p)))
            .collect();
        Ok(ArticleData {
            properties: Some(properties),
            base_article_number: self.article.base_article_number.clone(),
        })
    }

    async fn item_properties(&self) -> Result<ItemProperties, ArticleError> {
        Ok(ItemProperties {
            article: Some(ItemArticle {
                variant_code: self.article.variant_code.clone(),
            }),
        })
    }
}
