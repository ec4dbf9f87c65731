//! Feed resolution: predicate selection, pagination and result shaping

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::{
    criteria::FilterCriteria,
    error::{FeedError, FeedResult},
    model::{Ingredient, Nutrition, RecipeImage, RecipeRecord},
    personalization::{PersonalizationProfile, healthy_recipe_predicate},
    predicate::Predicate,
    store::{FEED_ORDER, RecipeStore},
};

/// How the feed is filtered
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMode {
    /// Filters chosen by the user
    Manual(FilterCriteria),
    /// Fixed health rules plus the user's budget and allergies
    Automatic,
}

/// 1-based page number and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> FeedResult<Self> {
        if page_size == 0 {
            return Err(FeedError::InvalidPageSize(page_size));
        }
        Ok(Self { page, page_size })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.page_size))
    }
}

/// Author fields the feed renders next to each recipe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorSummary {
    pub username: String,
    /// Profile image URL, empty when the user has none
    pub image: String,
}

/// One recipe as returned to the feed renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedRecipe {
    pub id: Uuid,
    pub title: String,
    pub procedure: String,
    pub total_price: f64,
    #[serde(flatten)]
    pub nutrition: Nutrition,
    pub created_at: DateTime<Utc>,
    pub ingredients: Vec<Ingredient>,
    pub images: Vec<RecipeImage>,
    pub user: AuthorSummary,
}

impl From<RecipeRecord> for FeedRecipe {
    fn from(recipe: RecipeRecord) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            procedure: recipe.procedure,
            total_price: recipe.total_price,
            nutrition: recipe.nutrition,
            created_at: recipe.created_at,
            ingredients: recipe.ingredients,
            images: recipe.images,
            user: AuthorSummary {
                username: recipe.author.username,
                image: recipe.author.profile_image.unwrap_or_default(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedPage {
    pub recipes: Vec<FeedRecipe>,
    pub page: u32,
    pub total_pages: u64,
    pub is_filtered: bool,
}

/// Resolves home feed pages against a [`RecipeStore`]
#[derive(Debug, Clone)]
pub struct FeedService<S> {
    store: S,
}

impl<S: RecipeStore> FeedService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Fetch one page of the feed for `current_user`
    ///
    /// The page query and the count query run independently against the
    /// same predicate, so a concurrent insert can leave `total_pages` one
    /// page off for this response. Pages past the end come back empty.
    pub async fn resolve_feed(
        &self,
        mode: &FeedMode,
        current_user: Uuid,
        page: PageRequest,
    ) -> FeedResult<FeedPage> {
        let (predicate, is_filtered) = self.resolve_predicate(mode, current_user).await?;

        let (records, total) = tokio::try_join!(
            self.store.find_page(
                &predicate,
                &FEED_ORDER,
                page.offset(),
                u64::from(page.page_size),
            ),
            self.store.count(&predicate),
        )?;

        debug!(
            automatic = matches!(mode, FeedMode::Automatic),
            page = page.page,
            returned = records.len(),
            total,
            "Resolved feed page"
        );

        Ok(FeedPage {
            recipes: records.into_iter().map(FeedRecipe::from).collect(),
            page: page.page,
            total_pages: page.total_pages(total),
            is_filtered,
        })
    }

    /// Distinct ingredient names offered by the filter form
    pub async fn ingredient_options(&self) -> FeedResult<Vec<String>> {
        Ok(self.store.distinct_ingredient_names().await?)
    }

    async fn resolve_predicate(
        &self,
        mode: &FeedMode,
        current_user: Uuid,
    ) -> FeedResult<(Predicate, bool)> {
        match mode {
            FeedMode::Automatic => {
                let profile = self.load_profile(current_user).await?;
                Ok((healthy_recipe_predicate(&profile), true))
            }
            FeedMode::Manual(criteria) => {
                let allergies = if criteria.needs_allergies() {
                    self.load_profile(current_user).await?.allergies
                } else {
                    Vec::new()
                };
                Ok((criteria.to_predicate(&allergies), criteria.is_filtered()))
            }
        }
    }

    async fn load_profile(&self, user_id: Uuid) -> FeedResult<PersonalizationProfile> {
        match self.store.find_user_profile(user_id).await? {
            Some(profile) => Ok(profile),
            None => {
                debug!(%user_id, "User has no nutrition profile, using empty profile");
                Ok(PersonalizationProfile::empty())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_offsets() {
        let page = PageRequest::new(3, 3).unwrap();
        assert_eq!(page.offset(), 6);
        assert_eq!(page.total_pages(7), 3);
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(PageRequest::new(0, 3).unwrap().offset(), 0);
    }

    #[test]
    fn test_page_request_rejects_zero_size() {
        assert!(matches!(
            PageRequest::new(1, 0),
            Err(FeedError::InvalidPageSize(0))
        ));
    }
}
