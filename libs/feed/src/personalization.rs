//! Automatic "personalized healthy recipe" filter

use serde::{Deserialize, Serialize};

use crate::{
    model::Nutrient,
    predicate::{CompareOp, NumericField, Predicate},
};

pub const MAX_CALORIES: f64 = 500.0;
pub const MIN_PROTEIN: f64 = 10.0;
pub const MAX_FAT: f64 = 15.0;
pub const MAX_SUGAR: f64 = 10.0;
pub const MIN_FIBER: f64 = 3.0;

/// Budget and allergies read from a user's nutrition profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalizationProfile {
    pub monthly_budget: f64,
    pub allergies: Vec<String>,
}

impl PersonalizationProfile {
    /// Profile used for users who never filled in their nutrition info
    ///
    /// A zero budget only admits free recipes, which is the strictest
    /// possible price filter.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Fixed health thresholds plus the user's budget and allergen exclusion
pub fn healthy_recipe_predicate(profile: &PersonalizationProfile) -> Predicate {
    let nutrient = NumericField::Nutrient;

    Predicate::And(vec![
        Predicate::compare(nutrient(Nutrient::Calories), CompareOp::Lt, MAX_CALORIES),
        Predicate::compare(nutrient(Nutrient::Protein), CompareOp::Gte, MIN_PROTEIN),
        Predicate::compare(nutrient(Nutrient::Fat), CompareOp::Lt, MAX_FAT),
        Predicate::compare(nutrient(Nutrient::Sugar), CompareOp::Lt, MAX_SUGAR),
        Predicate::compare(nutrient(Nutrient::Fiber), CompareOp::Gte, MIN_FIBER),
        Predicate::compare(
            NumericField::TotalPrice,
            CompareOp::Lte,
            profile.monthly_budget,
        ),
        Predicate::ingredients_none(profile.allergies.clone()),
    ])
}
