//! PostgreSQL-backed [`RecipeStore`]
//!
//! Recipes are fetched in one query built from the predicate tree, then
//! their ingredients and images are loaded with one query each for the
//! whole page.

use std::collections::HashMap;

use feed::{
    Author, Ingredient, Nutrient, Nutrition, OrderBy, PersonalizationProfile, Predicate,
    RecipeImage, RecipeRecord, RecipeStore, StoreError,
    sql::{push_order_by, push_predicate},
};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use uuid::Uuid;

const RECIPE_PAGE_SELECT: &str = r#"
    SELECT r.id, r.title, r.procedure, r.total_price, r.created_at,
           r.calories, r.protein, r.carbs, r.fat, r.fiber, r.sugar,
           r.sodium, r.potassium, r.vitamin_c, r.vitamin_a, r.calcium, r.iron,
           u.id AS author_id, u.username, u.profile_image
    FROM recipes r
    JOIN users u ON u.id = r.user_id
    WHERE "#;

/// Recipe repository for database operations
#[derive(Clone)]
pub struct PgRecipeStore {
    pool: PgPool,
}

impl PgRecipeStore {
    /// Create a new recipe store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_ingredients(
        &self,
        recipe_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Ingredient>>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT recipe_id, name, price
            FROM ingredients
            WHERE recipe_id = ANY($1)
            ORDER BY recipe_id, name
            "#,
        )
        .bind(recipe_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_recipe: HashMap<Uuid, Vec<Ingredient>> = HashMap::new();
        for row in rows {
            let recipe_id: Uuid = row.try_get("recipe_id")?;
            by_recipe.entry(recipe_id).or_default().push(Ingredient {
                name: row.try_get("name")?,
                price: row.try_get("price")?,
            });
        }
        Ok(by_recipe)
    }

    async fn load_images(
        &self,
        recipe_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<RecipeImage>>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, recipe_id, url
            FROM recipe_images
            WHERE recipe_id = ANY($1)
            ORDER BY recipe_id, id
            "#,
        )
        .bind(recipe_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_recipe: HashMap<Uuid, Vec<RecipeImage>> = HashMap::new();
        for row in rows {
            let recipe_id: Uuid = row.try_get("recipe_id")?;
            by_recipe.entry(recipe_id).or_default().push(RecipeImage {
                id: row.try_get("id")?,
                url: row.try_get("url")?,
            });
        }
        Ok(by_recipe)
    }
}

fn recipe_from_row(row: &PgRow) -> Result<RecipeRecord, sqlx::Error> {
    let mut nutrition = Nutrition::default();
    for nutrient in Nutrient::ALL {
        nutrition.set(nutrient, row.try_get(nutrient.column())?);
    }

    Ok(RecipeRecord {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        procedure: row.try_get("procedure")?,
        total_price: row.try_get("total_price")?,
        nutrition,
        created_at: row.try_get("created_at")?,
        ingredients: Vec::new(),
        images: Vec::new(),
        author: Author {
            id: row.try_get("author_id")?,
            username: row.try_get("username")?,
            profile_image: row.try_get("profile_image")?,
        },
    })
}

impl RecipeStore for PgRecipeStore {
    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM recipes r WHERE ");
        push_predicate(&mut builder, predicate);

        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn find_page(
        &self,
        predicate: &Predicate,
        order: &[OrderBy],
        offset: u64,
        limit: u64,
    ) -> Result<Vec<RecipeRecord>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(RECIPE_PAGE_SELECT);
        push_predicate(&mut builder, predicate);
        push_order_by(&mut builder, order);
        builder
            .push(" LIMIT ")
            .push_bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .push(" OFFSET ")
            .push_bind(i64::try_from(offset).unwrap_or(i64::MAX));

        let rows = builder.build().fetch_all(&self.pool).await?;
        let mut recipes = rows
            .iter()
            .map(recipe_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        if recipes.is_empty() {
            return Ok(recipes);
        }

        let ids: Vec<Uuid> = recipes.iter().map(|recipe| recipe.id).collect();
        let (mut ingredients, mut images) =
            tokio::try_join!(self.load_ingredients(&ids), self.load_images(&ids))?;

        for recipe in &mut recipes {
            recipe.ingredients = ingredients.remove(&recipe.id).unwrap_or_default();
            recipe.images = images.remove(&recipe.id).unwrap_or_default();
        }

        Ok(recipes)
    }

    async fn find_user_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PersonalizationProfile>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT ui.monthly_budget,
                   COALESCE(
                       array_agg(a.name) FILTER (WHERE a.name IS NOT NULL),
                       '{}'
                   ) AS allergies
            FROM user_infos ui
            LEFT JOIN allergies a ON a.user_info_id = ui.id
            WHERE ui.user_id = $1
            GROUP BY ui.id, ui.monthly_budget
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let profile = row
            .map(|row| -> Result<PersonalizationProfile, sqlx::Error> {
                Ok(PersonalizationProfile {
                    monthly_budget: row.try_get("monthly_budget")?,
                    allergies: row.try_get("allergies")?,
                })
            })
            .transpose()?;

        Ok(profile)
    }

    async fn distinct_ingredient_names(&self) -> Result<Vec<String>, StoreError> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT name
            FROM ingredients
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::database::{DatabaseConfig, init_pool};
    use feed::store::FEED_ORDER;

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL with the Nutribud schema"]
    async fn test_page_and_count_agree() -> anyhow::Result<()> {
        let pool = init_pool(&DatabaseConfig::from_env()?).await?;
        let store = PgRecipeStore::new(pool);

        let predicate = Predicate::all();
        let total = store.count(&predicate).await?;
        let page = store
            .find_page(&predicate, &FEED_ORDER, 0, total.max(1))
            .await?;
        assert_eq!(page.len() as u64, total);

        for pair in page.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL with the Nutribud schema"]
    async fn test_wildcards_in_title_match_literally() -> anyhow::Result<()> {
        let pool = init_pool(&DatabaseConfig::from_env()?).await?;
        let store = PgRecipeStore::new(pool);

        let matching = store
            .find_page(&Predicate::title_contains("%"), &FEED_ORDER, 0, 100)
            .await?;
        assert!(matching.iter().all(|recipe| recipe.title.contains('%')));
        Ok(())
    }
}
