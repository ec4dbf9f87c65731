//! Recipe store port

use std::future::Future;
use uuid::Uuid;

use crate::{
    error::StoreError, model::RecipeRecord, personalization::PersonalizationProfile,
    predicate::Predicate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    CreatedAt,
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: OrderField,
    pub direction: SortDirection,
}

/// Newest recipes first; the id only breaks ties between equal timestamps
pub const FEED_ORDER: [OrderBy; 2] = [
    OrderBy {
        field: OrderField::CreatedAt,
        direction: SortDirection::Desc,
    },
    OrderBy {
        field: OrderField::Id,
        direction: SortDirection::Desc,
    },
];

/// Queryable collection of recipes and user nutrition profiles
pub trait RecipeStore: Send + Sync {
    /// Number of recipes matching `predicate`
    fn count(&self, predicate: &Predicate) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// One window of matching recipes, with ingredients, images and author
    fn find_page(
        &self,
        predicate: &Predicate,
        order: &[OrderBy],
        offset: u64,
        limit: u64,
    ) -> impl Future<Output = Result<Vec<RecipeRecord>, StoreError>> + Send;

    /// Budget and allergies of `user_id`, if the user has a profile
    fn find_user_profile(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Option<PersonalizationProfile>, StoreError>> + Send;

    /// Every distinct ingredient name, sorted
    fn distinct_ingredient_names(
        &self,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;
}
