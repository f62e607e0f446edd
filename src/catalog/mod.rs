mod in_memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use in_memory::InMemoryFoodCatalog;

use crate::{state::MacroTotals, types::FoodSuggestion};

/// One catalog item with nutrition per 100 g reference portion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodRecord {
    pub name: String,
    pub category: String,
    pub per_100g: MacroTotals,
    pub verified: bool,
}

impl FoodRecord {
    /// Protein-per-calorie density used to rank search results.
    pub fn protein_density(&self) -> f64 {
        if self.per_100g.calories > 0.0 {
            self.per_100g.protein / self.per_100g.calories
        } else {
            0.0
        }
    }

    pub fn suggestion(&self) -> FoodSuggestion {
        FoodSuggestion {
            name: self.name.clone(),
            calories: self.per_100g.calories,
            protein: self.per_100g.protein,
            carbs: self.per_100g.carbs,
            fat: self.per_100g.fat,
            verified: self.verified,
        }
    }
}

/// Conjunctive search predicates. A record matches only if every set filter
/// holds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FoodFilters {
    pub query: Option<String>,
    pub min_protein: Option<f64>,
    pub max_calories: Option<f64>,
    pub max_carbs: Option<f64>,
    pub max_fat: Option<f64>,
    pub category: Option<String>,
    #[serde(default)]
    pub verified_only: bool,
}

impl FoodFilters {
    pub fn matches(&self, record: &FoodRecord) -> bool {
        if let Some(query) = &self.query {
            if !record.name.to_lowercase().contains(&query.to_lowercase()) {
                return false;
            }
        }
        if let Some(min_protein) = self.min_protein {
            if record.per_100g.protein < min_protein {
                return false;
            }
        }
        if let Some(max_calories) = self.max_calories {
            if record.per_100g.calories > max_calories {
                return false;
            }
        }
        if let Some(max_carbs) = self.max_carbs {
            if record.per_100g.carbs > max_carbs {
                return false;
            }
        }
        if let Some(max_fat) = self.max_fat {
            if record.per_100g.fat > max_fat {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !record.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if self.verified_only && !record.verified {
            return false;
        }
        true
    }
}

/// Pluggable food lookup capability behind the search/detail/log tools.
#[async_trait]
pub trait FoodCatalog: Send + Sync {
    /// Returns matching records in the catalog's stable source order.
    async fn search(&self, filters: &FoodFilters) -> anyhow::Result<Vec<FoodRecord>>;

    async fn find(&self, name: &str) -> anyhow::Result<Option<FoodRecord>>;
}
