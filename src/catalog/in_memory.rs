use async_trait::async_trait;

use super::{FoodCatalog, FoodFilters, FoodRecord};
use crate::state::MacroTotals;

#[derive(Debug, Default)]
pub struct InMemoryFoodCatalog {
    records: Vec<FoodRecord>,
}

impl InMemoryFoodCatalog {
    pub fn new(records: Vec<FoodRecord>) -> Self {
        Self { records }
    }

    pub fn with_sample_foods() -> Self {
        Self::new(vec![
            food("chicken breast", "protein", 165.0, 31.0, 0.0, 3.6, true),
            food("greek yogurt", "dairy", 59.0, 10.0, 3.6, 0.4, true),
            food("cottage cheese", "dairy", 98.0, 11.0, 3.4, 4.3, true),
            food("salmon fillet", "protein", 208.0, 20.0, 0.0, 13.0, true),
            food("egg", "protein", 155.0, 13.0, 1.1, 11.0, true),
            food("tofu", "protein", 76.0, 8.0, 1.9, 4.8, true),
            food("white rice", "grain", 130.0, 2.7, 28.0, 0.3, true),
            food("oats", "grain", 389.0, 16.9, 66.0, 6.9, true),
            food("almonds", "nuts", 579.0, 21.0, 22.0, 50.0, true),
            food("apple", "fruit", 52.0, 0.3, 14.0, 0.2, true),
            food("banana", "fruit", 89.0, 1.1, 23.0, 0.3, true),
            food("whey protein shake", "supplement", 380.0, 76.0, 8.0, 5.0, false),
        ])
    }
}

fn food(
    name: &str,
    category: &str,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    verified: bool,
) -> FoodRecord {
    FoodRecord {
        name: name.to_owned(),
        category: category.to_owned(),
        per_100g: MacroTotals {
            calories,
            protein,
            carbs,
            fat,
        },
        verified,
    }
}

#[async_trait]
impl FoodCatalog for InMemoryFoodCatalog {
    async fn search(&self, filters: &FoodFilters) -> anyhow::Result<Vec<FoodRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|record| filters.matches(record))
            .cloned()
            .collect())
    }

    async fn find(&self, name: &str) -> anyhow::Result<Option<FoodRecord>> {
        let query = name.trim().to_lowercase();
        Ok(self
            .records
            .iter()
            .find(|record| record.name.to_lowercase() == query)
            .or_else(|| {
                self.records
                    .iter()
                    .find(|record| record.name.to_lowercase().contains(&query))
            })
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryFoodCatalog;
    use crate::catalog::{FoodCatalog, FoodFilters};

    #[tokio::test]
    async fn filters_apply_conjunctively() {
        let catalog = InMemoryFoodCatalog::with_sample_foods();
        let filters = FoodFilters {
            min_protein: Some(10.0),
            max_calories: Some(200.0),
            max_fat: Some(5.0),
            ..FoodFilters::default()
        };

        let results = catalog.search(&filters).await.expect("search should work");
        assert!(!results.is_empty());
        for record in &results {
            assert!(record.per_100g.protein >= 10.0);
            assert!(record.per_100g.calories <= 200.0);
            assert!(record.per_100g.fat <= 5.0);
        }
    }

    #[tokio::test]
    async fn verified_only_excludes_unverified_entries() {
        let catalog = InMemoryFoodCatalog::with_sample_foods();
        let filters = FoodFilters {
            verified_only: true,
            ..FoodFilters::default()
        };

        let results = catalog.search(&filters).await.expect("search should work");
        assert!(results.iter().all(|record| record.verified));
        assert!(!results.iter().any(|record| record.name.contains("whey")));
    }

    #[tokio::test]
    async fn find_prefers_exact_match_then_substring() {
        let catalog = InMemoryFoodCatalog::with_sample_foods();

        let exact = catalog
            .find("egg")
            .await
            .expect("find should work")
            .expect("egg should exist");
        assert_eq!(exact.name, "egg");

        let partial = catalog
            .find("yogurt")
            .await
            .expect("find should work")
            .expect("yogurt should match by substring");
        assert_eq!(partial.name, "greek yogurt");

        assert!(
            catalog
                .find("pizza")
                .await
                .expect("find should work")
                .is_none()
        );
    }
}
