//! Recipe filter and ranking engine
//!
//! Turns the home feed's filter inputs (or a user's personalization
//! profile) into a typed [`Predicate`], runs it against a [`RecipeStore`]
//! and returns one ordered, paginated page of recipes.
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use feed::{FeedRequest, FeedService, InMemoryRecipeStore, PageRequest};
//!
//! # async fn run() -> Result<(), feed::FeedError> {
//! let service = FeedService::new(InMemoryRecipeStore::new());
//! let mut query = HashMap::new();
//! query.insert("title".to_string(), "adobo".to_string());
//!
//! let request = FeedRequest::from_query_map(&query);
//! let page = PageRequest::new(request.page, 3)?;
//! let feed = service
//!     .resolve_feed(&request.mode, uuid::Uuid::new_v4(), page)
//!     .await?;
//! println!("{} of {} pages", feed.page, feed.total_pages);
//! # Ok(())
//! # }
//! ```

pub mod criteria;
pub mod error;
pub mod memory;
pub mod model;
pub mod personalization;
pub mod predicate;
pub mod query;
pub mod service;
pub mod sql;
pub mod store;

pub use criteria::FilterCriteria;
pub use error::{FeedError, StoreError};
pub use memory::InMemoryRecipeStore;
pub use model::{Author, Ingredient, Nutrient, Nutrition, RecipeImage, RecipeRecord};
pub use personalization::PersonalizationProfile;
pub use predicate::{CompareOp, NumericField, Predicate, TextField};
pub use query::FeedRequest;
pub use service::{AuthorSummary, FeedMode, FeedPage, FeedRecipe, FeedService, PageRequest};
pub use store::{OrderBy, OrderField, RecipeStore, SortDirection};
