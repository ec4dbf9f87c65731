//! End-to-end feed resolution against the in-memory recipe store

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, TimeZone, Utc};
use feed::{
    Author, FeedError, FeedMode, FeedPage, FeedRequest, FeedService, FilterCriteria,
    InMemoryRecipeStore, Ingredient, Nutrient, Nutrition, OrderBy, PageRequest,
    PersonalizationProfile, Predicate, RecipeRecord, RecipeStore, StoreError,
};
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

const PAGE_SIZE: u32 = 3;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

struct RecipeSpec<'a> {
    title: &'a str,
    price: f64,
    ingredients: &'a [&'a str],
    nutrition: Nutrition,
    minutes_after_base: i64,
}

impl<'a> RecipeSpec<'a> {
    fn new(title: &'a str, price: f64, ingredients: &'a [&'a str]) -> Self {
        Self {
            title,
            price,
            ingredients,
            nutrition: Nutrition::default(),
            minutes_after_base: 0,
        }
    }

    fn at(mut self, minutes: i64) -> Self {
        self.minutes_after_base = minutes;
        self
    }

    fn nutrition(mut self, nutrition: Nutrition) -> Self {
        self.nutrition = nutrition;
        self
    }

    fn build(self) -> RecipeRecord {
        RecipeRecord {
            id: Uuid::new_v4(),
            title: self.title.to_string(),
            procedure: "Cook it.".to_string(),
            total_price: self.price,
            nutrition: self.nutrition,
            created_at: base_time() + Duration::minutes(self.minutes_after_base),
            ingredients: self
                .ingredients
                .iter()
                .map(|name| Ingredient {
                    name: name.to_string(),
                    price: 1.0,
                })
                .collect(),
            images: Vec::new(),
            author: Author {
                id: Uuid::new_v4(),
                username: "lola_cooks".to_string(),
                profile_image: None,
            },
        }
    }
}

fn healthy(calories: f64) -> Nutrition {
    Nutrition {
        calories,
        protein: 15.0,
        fat: 5.0,
        sugar: 2.0,
        fiber: 4.0,
        ..Nutrition::default()
    }
}

async fn store_with(recipes: Vec<RecipeRecord>) -> InMemoryRecipeStore {
    let store = InMemoryRecipeStore::new();
    for recipe in recipes {
        store.insert_recipe(recipe).await;
    }
    store
}

async fn resolve(
    service: &FeedService<InMemoryRecipeStore>,
    mode: FeedMode,
    user: Uuid,
    page: u32,
) -> FeedPage {
    let page = PageRequest::new(page, PAGE_SIZE).unwrap();
    service.resolve_feed(&mode, user, page).await.unwrap()
}

fn manual(criteria: FilterCriteria) -> FeedMode {
    FeedMode::Manual(criteria)
}

fn titles(page: &FeedPage) -> Vec<&str> {
    page.recipes.iter().map(|r| r.title.as_str()).collect()
}

#[tokio::test]
async fn test_no_criteria_returns_full_feed_newest_first() {
    let store = store_with(vec![
        RecipeSpec::new("Oldest", 10.0, &["Rice"]).at(0).build(),
        RecipeSpec::new("Newest", 10.0, &["Rice"]).at(20).build(),
        RecipeSpec::new("Middle", 10.0, &["Rice"]).at(10).build(),
    ])
    .await;
    let service = FeedService::new(store);

    let page = resolve(&service, manual(FilterCriteria::default()), Uuid::new_v4(), 1).await;

    assert!(!page.is_filtered);
    assert_eq!(page.total_pages, 1);
    assert_eq!(titles(&page), vec!["Newest", "Middle", "Oldest"]);
}

#[tokio::test]
async fn test_title_filter_is_case_insensitive_substring() {
    let store = store_with(vec![
        RecipeSpec::new("Chicken Adobo", 10.0, &[]).build(),
        RecipeSpec::new("Pork ADOBO", 10.0, &[]).at(1).build(),
        RecipeSpec::new("Sinigang", 10.0, &[]).at(2).build(),
    ])
    .await;
    let service = FeedService::new(store);

    let criteria = FilterCriteria {
        title: Some("adobo".to_string()),
        ..FilterCriteria::default()
    };
    let page = resolve(&service, manual(criteria), Uuid::new_v4(), 1).await;

    assert!(page.is_filtered);
    assert_eq!(titles(&page), vec!["Pork ADOBO", "Chicken Adobo"]);
}

#[tokio::test]
async fn test_budget_bound_flips_with_high_to_low() {
    let store = store_with(vec![
        RecipeSpec::new("Cheap", 50.0, &[]).build(),
        RecipeSpec::new("Exact", 100.0, &[]).at(1).build(),
        RecipeSpec::new("Pricey", 150.0, &[]).at(2).build(),
    ])
    .await;
    let service = FeedService::new(store);
    let user = Uuid::new_v4();

    let ceiling = FilterCriteria {
        budget: Some("100".to_string()),
        ..FilterCriteria::default()
    };
    let page = resolve(&service, manual(ceiling.clone()), user, 1).await;
    assert!(page.recipes.iter().all(|r| r.total_price <= 100.0));
    assert_eq!(titles(&page), vec!["Exact", "Cheap"]);

    let floor = FilterCriteria {
        high_to_low: true,
        ..ceiling
    };
    let page = resolve(&service, manual(floor), user, 1).await;
    assert!(page.recipes.iter().all(|r| r.total_price >= 100.0));
    // Still ordered by creation time, not by price.
    assert_eq!(titles(&page), vec!["Pricey", "Exact"]);
}

#[tokio::test]
async fn test_ingredient_terms_are_or_matched() {
    let store = store_with(vec![
        RecipeSpec::new("Fried Rice", 10.0, &["Jasmine Rice", "Egg"]).build(),
        RecipeSpec::new("Tinola", 10.0, &["Chicken", "Ginger"]).at(1).build(),
        RecipeSpec::new("Salad", 10.0, &["Lettuce"]).at(2).build(),
    ])
    .await;
    let service = FeedService::new(store);

    let criteria = FilterCriteria {
        ingredients: vec!["rice".to_string(), "CHICKEN".to_string()],
        ..FilterCriteria::default()
    };
    let page = resolve(&service, manual(criteria), Uuid::new_v4(), 1).await;

    assert_eq!(titles(&page), vec!["Tinola", "Fried Rice"]);
}

#[tokio::test]
async fn test_allergen_avoidance_excludes_substring_matches() {
    let user = Uuid::new_v4();
    let store = store_with(vec![
        RecipeSpec::new("PB Toast", 10.0, &["Bread", "Peanut Butter"]).build(),
        RecipeSpec::new("Satay", 10.0, &["Chicken", "Crushed PEANUTS"]).at(1).build(),
        RecipeSpec::new("Plain Toast", 10.0, &["Bread"]).at(2).build(),
    ])
    .await;
    store
        .set_profile(
            user,
            PersonalizationProfile {
                monthly_budget: 500.0,
                allergies: vec!["Peanut".to_string()],
            },
        )
        .await;
    let service = FeedService::new(store);

    let criteria = FilterCriteria {
        avoid_allergens: true,
        ..FilterCriteria::default()
    };
    let page = resolve(&service, manual(criteria), user, 1).await;

    assert!(page.is_filtered);
    assert_eq!(titles(&page), vec!["Plain Toast"]);
}

#[tokio::test]
async fn test_allergen_avoidance_without_profile_excludes_nothing() {
    let store = store_with(vec![
        RecipeSpec::new("PB Toast", 10.0, &["Peanut Butter"]).build(),
    ])
    .await;
    let service = FeedService::new(store);

    let criteria = FilterCriteria {
        avoid_allergens: true,
        ..FilterCriteria::default()
    };
    let page = resolve(&service, manual(criteria), Uuid::new_v4(), 1).await;

    assert!(page.is_filtered);
    assert_eq!(titles(&page), vec!["PB Toast"]);
}

// Inclusion and exclusion both target the ingredient list. They are kept
// as separate clauses, so a recipe must satisfy both.
#[tokio::test]
async fn test_ingredient_and_allergen_filters_both_apply() {
    let user = Uuid::new_v4();
    let store = store_with(vec![
        RecipeSpec::new("Rice Bowl", 10.0, &["Rice", "Egg"]).build(),
        RecipeSpec::new("Peanut Rice", 10.0, &["Rice", "Peanuts"]).at(1).build(),
        RecipeSpec::new("Omelette", 10.0, &["Egg"]).at(2).build(),
    ])
    .await;
    store
        .set_profile(
            user,
            PersonalizationProfile {
                monthly_budget: 100.0,
                allergies: vec!["peanut".to_string()],
            },
        )
        .await;
    let service = FeedService::new(store);

    let criteria = FilterCriteria {
        ingredients: vec!["rice".to_string()],
        avoid_allergens: true,
        ..FilterCriteria::default()
    };
    let page = resolve(&service, manual(criteria), user, 1).await;

    assert_eq!(titles(&page), vec!["Rice Bowl"]);
}

#[tokio::test]
async fn test_nutrient_limits_combine() {
    let store = store_with(vec![
        RecipeSpec::new("Light", 10.0, &[])
            .nutrition(Nutrition {
                calories: 300.0,
                sodium: 200.0,
                ..Nutrition::default()
            })
            .build(),
        RecipeSpec::new("Salty", 10.0, &[])
            .nutrition(Nutrition {
                calories: 300.0,
                sodium: 900.0,
                ..Nutrition::default()
            })
            .at(1)
            .build(),
        RecipeSpec::new("Heavy", 10.0, &[])
            .nutrition(Nutrition {
                calories: 900.0,
                sodium: 100.0,
                ..Nutrition::default()
            })
            .at(2)
            .build(),
    ])
    .await;
    let service = FeedService::new(store);

    let mut nutrient_limits = BTreeMap::new();
    nutrient_limits.insert(Nutrient::Calories, "400".to_string());
    nutrient_limits.insert(Nutrient::Sodium, "500".to_string());
    let criteria = FilterCriteria {
        nutrient_limits,
        ..FilterCriteria::default()
    };
    let page = resolve(&service, manual(criteria), Uuid::new_v4(), 1).await;

    assert_eq!(titles(&page), vec!["Light"]);
}

#[tokio::test]
async fn test_automatic_mode_applies_health_rules_budget_and_allergies() {
    let user = Uuid::new_v4();
    let store = store_with(vec![
        RecipeSpec::new("Recipe A", 8.0, &["Rice", "Chicken"])
            .nutrition(healthy(300.0))
            .build(),
        RecipeSpec::new("Recipe B", 8.0, &["Rice"])
            .nutrition(healthy(600.0))
            .at(1)
            .build(),
        RecipeSpec::new("Wheat Wrap", 8.0, &["Gluten-free? no, GLUTEN flour"])
            .nutrition(healthy(300.0))
            .at(2)
            .build(),
        RecipeSpec::new("Too Pricey", 12.0, &["Rice"])
            .nutrition(healthy(300.0))
            .at(3)
            .build(),
    ])
    .await;
    store
        .set_profile(
            user,
            PersonalizationProfile {
                monthly_budget: 10.0,
                allergies: vec!["Gluten".to_string()],
            },
        )
        .await;
    let service = FeedService::new(store);

    let page = resolve(&service, FeedMode::Automatic, user, 1).await;

    assert!(page.is_filtered);
    assert_eq!(page.total_pages, 1);
    assert_eq!(titles(&page), vec!["Recipe A"]);
}

#[tokio::test]
async fn test_automatic_mode_ignores_manual_query_params() {
    let user = Uuid::new_v4();
    let store = store_with(vec![
        RecipeSpec::new("Recipe A", 8.0, &["Rice"])
            .nutrition(healthy(300.0))
            .build(),
    ])
    .await;
    store
        .set_profile(
            user,
            PersonalizationProfile {
                monthly_budget: 10.0,
                allergies: Vec::new(),
            },
        )
        .await;
    let service = FeedService::new(store);

    let query: HashMap<String, String> = [
        ("auto-filter", "1"),
        ("title", "does not exist"),
        ("budget", "1"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    let request = FeedRequest::from_query_map(&query);
    let page = resolve(&service, request.mode, user, request.page).await;

    assert_eq!(titles(&page), vec!["Recipe A"]);
}

#[tokio::test]
async fn test_automatic_mode_without_profile_uses_zero_budget() {
    let store = store_with(vec![
        RecipeSpec::new("Free Sample", 0.0, &["Rice"])
            .nutrition(healthy(300.0))
            .build(),
        RecipeSpec::new("Recipe A", 8.0, &["Rice"])
            .nutrition(healthy(300.0))
            .at(1)
            .build(),
    ])
    .await;
    let service = FeedService::new(store);

    let page = resolve(&service, FeedMode::Automatic, Uuid::new_v4(), 1).await;

    assert_eq!(titles(&page), vec!["Free Sample"]);
}

#[tokio::test]
async fn test_pagination_counts_and_past_the_end() {
    let recipes = (0..7)
        .map(|i| RecipeSpec::new("Dish", 10.0, &[]).at(i).build())
        .collect();
    let service = FeedService::new(store_with(recipes).await);
    let user = Uuid::new_v4();
    let mode = manual(FilterCriteria::default());

    let first = resolve(&service, mode.clone(), user, 1).await;
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.recipes.len(), 3);

    let third = resolve(&service, mode.clone(), user, 3).await;
    assert_eq!(third.recipes.len(), 1);
    assert_eq!(third.page, 3);

    let fourth = resolve(&service, mode, user, 4).await;
    assert!(fourth.recipes.is_empty());
    assert_eq!(fourth.total_pages, 3);
}

#[tokio::test]
async fn test_page_size_is_injectable() {
    let recipes = (0..7)
        .map(|i| RecipeSpec::new("Dish", 10.0, &[]).at(i).build())
        .collect();
    let service = FeedService::new(store_with(recipes).await);

    let page = PageRequest::new(1, 5).unwrap();
    let feed = service
        .resolve_feed(&manual(FilterCriteria::default()), Uuid::new_v4(), page)
        .await
        .unwrap();

    assert_eq!(feed.recipes.len(), 5);
    assert_eq!(feed.total_pages, 2);
}

#[tokio::test]
async fn test_repeated_calls_are_identical() {
    // Equal timestamps exercise the id tie-break.
    let recipes = (0..5)
        .map(|_| RecipeSpec::new("Same Minute", 10.0, &["Rice"]).build())
        .collect();
    let service = FeedService::new(store_with(recipes).await);
    let user = Uuid::new_v4();
    let criteria = FilterCriteria {
        ingredients: vec!["rice".to_string()],
        ..FilterCriteria::default()
    };

    let first = resolve(&service, manual(criteria.clone()), user, 1).await;
    let second = resolve(&service, manual(criteria), user, 1).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_non_numeric_budget_behaves_as_unset() {
    let store = store_with(vec![
        RecipeSpec::new("Cheap", 5.0, &[]).build(),
        RecipeSpec::new("Pricey", 500.0, &[]).at(1).build(),
    ])
    .await;
    let service = FeedService::new(store);

    let criteria = FilterCriteria {
        budget: Some("abc".to_string()),
        ..FilterCriteria::default()
    };
    let page = PageRequest::new(1, PAGE_SIZE).unwrap();
    let result = service
        .resolve_feed(&manual(criteria), Uuid::new_v4(), page)
        .await;

    let feed = assert_ok!(result);
    assert_eq!(titles(&feed), vec!["Pricey", "Cheap"]);
}

#[tokio::test]
async fn test_feed_shapes_author_fields() {
    let mut with_image = RecipeSpec::new("Pancit", 10.0, &[]).build();
    with_image.author.profile_image = Some("https://img.example/lola.png".to_string());
    let without_image = RecipeSpec::new("Lumpia", 10.0, &[]).at(1).build();
    let service = FeedService::new(store_with(vec![with_image, without_image]).await);

    let page = resolve(&service, manual(FilterCriteria::default()), Uuid::new_v4(), 1).await;

    assert_eq!(page.recipes[0].user.username, "lola_cooks");
    assert_eq!(page.recipes[0].user.image, "");
    assert_eq!(page.recipes[1].user.image, "https://img.example/lola.png");

    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["recipes"][1]["user"]["image"], "https://img.example/lola.png");
    assert_eq!(json["recipes"][0]["calories"], 0.0);
}

#[tokio::test]
async fn test_ingredient_options_are_distinct_and_sorted() {
    let service = FeedService::new(
        store_with(vec![
            RecipeSpec::new("A", 1.0, &["Rice", "Egg"]).build(),
            RecipeSpec::new("B", 1.0, &["Egg", "Chicken"]).build(),
        ])
        .await,
    );

    let options = service.ingredient_options().await.unwrap();
    assert_eq!(options, vec!["Chicken", "Egg", "Rice"]);
}

/// Store whose every query fails
struct UnavailableStore;

impl RecipeStore for UnavailableStore {
    async fn count(&self, _predicate: &Predicate) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn find_page(
        &self,
        _predicate: &Predicate,
        _order: &[OrderBy],
        _offset: u64,
        _limit: u64,
    ) -> Result<Vec<RecipeRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn find_user_profile(
        &self,
        _user_id: Uuid,
    ) -> Result<Option<PersonalizationProfile>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn distinct_ingredient_names(&self) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_store_failure_propagates_without_partial_result() {
    let service = FeedService::new(UnavailableStore);
    let page = PageRequest::new(1, PAGE_SIZE).unwrap();

    let manual_result = service
        .resolve_feed(&manual(FilterCriteria::default()), Uuid::new_v4(), page)
        .await;
    let err = assert_err!(manual_result);
    assert!(matches!(err, FeedError::Store(StoreError::Unavailable(_))));

    let automatic_result = service
        .resolve_feed(&FeedMode::Automatic, Uuid::new_v4(), page)
        .await;
    assert!(matches!(automatic_result, Err(FeedError::Store(_))));
}
