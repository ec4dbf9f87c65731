//! In-memory recipe store
//!
//! Evaluates predicates directly against the stored records. Used by tests
//! and for running the feed without a database.

use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::StoreError,
    model::RecipeRecord,
    personalization::PersonalizationProfile,
    predicate::Predicate,
    store::{OrderBy, OrderField, RecipeStore, SortDirection},
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryRecipeStore {
    recipes: Arc<RwLock<Vec<RecipeRecord>>>,
    profiles: Arc<RwLock<HashMap<Uuid, PersonalizationProfile>>>,
}

impl InMemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_recipe(&self, recipe: RecipeRecord) {
        self.recipes.write().await.push(recipe);
    }

    pub async fn set_profile(&self, user_id: Uuid, profile: PersonalizationProfile) {
        self.profiles.write().await.insert(user_id, profile);
    }
}

fn compare_records(a: &RecipeRecord, b: &RecipeRecord, order: &[OrderBy]) -> Ordering {
    for spec in order {
        let ordering = match spec.field {
            OrderField::CreatedAt => a.created_at.cmp(&b.created_at),
            OrderField::Id => a.id.cmp(&b.id),
        };
        let ordering = match spec.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

impl RecipeStore for InMemoryRecipeStore {
    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let recipes = self.recipes.read().await;
        Ok(recipes.iter().filter(|r| predicate.matches(r)).count() as u64)
    }

    async fn find_page(
        &self,
        predicate: &Predicate,
        order: &[OrderBy],
        offset: u64,
        limit: u64,
    ) -> Result<Vec<RecipeRecord>, StoreError> {
        let recipes = self.recipes.read().await;
        let mut matching: Vec<&RecipeRecord> =
            recipes.iter().filter(|r| predicate.matches(r)).collect();
        matching.sort_by(|a, b| compare_records(a, b, order));

        Ok(matching
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn find_user_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PersonalizationProfile>, StoreError> {
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }

    async fn distinct_ingredient_names(&self) -> Result<Vec<String>, StoreError> {
        let recipes = self.recipes.read().await;
        let mut names: Vec<String> = recipes
            .iter()
            .flat_map(|recipe| recipe.ingredients.iter().map(|i| i.name.clone()))
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}
