//! Response bodies that are not feed types

use serde::Serialize;

/// Ingredient names offered by the filter form
#[derive(Debug, Serialize)]
pub struct IngredientOptionsResponse {
    pub ingredients: Vec<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub database: bool,
}
