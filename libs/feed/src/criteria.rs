//! Manual filter criteria and the predicate builder

use std::collections::BTreeMap;

use crate::{
    model::Nutrient,
    predicate::{CompareOp, NumericField, Predicate},
};

/// Filters a user picked on the home feed
///
/// Numeric inputs are kept as the raw text the user submitted. They are
/// interpreted leniently when the predicate is built: a value that does not
/// parse drops its clause instead of failing the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Case-insensitive title substring
    pub title: Option<String>,
    /// Price bound, a ceiling unless `high_to_low` is set
    pub budget: Option<String>,
    /// Turns the budget into a floor (`total_price >= budget`)
    pub high_to_low: bool,
    /// Ingredient name substrings, OR-matched
    pub ingredients: Vec<String>,
    /// Per-nutrient upper bounds
    pub nutrient_limits: BTreeMap<Nutrient, String>,
    /// Exclude recipes containing any of the user's allergens
    pub avoid_allergens: bool,
}

impl FilterCriteria {
    /// Whether the user asked for any filtering at all
    ///
    /// This reflects what was requested, not what survived numeric
    /// parsing: a budget of `"abc"` still counts as a requested filter.
    pub fn is_filtered(&self) -> bool {
        self.title.is_some()
            || self.budget.is_some()
            || !self.ingredients.is_empty()
            || !self.nutrient_limits.is_empty()
            || self.avoid_allergens
    }

    /// Whether building the predicate needs the user's allergy list
    pub fn needs_allergies(&self) -> bool {
        self.avoid_allergens
    }

    /// Build the compound predicate for these criteria
    ///
    /// `allergies` is only consulted when `avoid_allergens` is set.
    /// Ingredient inclusion and allergen exclusion are separate clauses of
    /// the same conjunction, so asking for both keeps both.
    pub fn to_predicate(&self, allergies: &[String]) -> Predicate {
        let mut clauses = Vec::new();

        if let Some(title) = self.title.as_deref().filter(|title| !title.is_empty()) {
            clauses.push(Predicate::title_contains(title));
        }

        if let Some(budget) = self.budget.as_deref().and_then(parse_budget) {
            let op = if self.high_to_low {
                CompareOp::Gte
            } else {
                CompareOp::Lte
            };
            clauses.push(Predicate::compare(NumericField::TotalPrice, op, budget));
        }

        if !self.ingredients.is_empty() {
            clauses.push(Predicate::ingredients_any(self.ingredients.clone()));
        }

        for (nutrient, raw) in &self.nutrient_limits {
            if let Some(limit) = parse_amount(raw) {
                clauses.push(Predicate::compare(
                    NumericField::Nutrient(*nutrient),
                    CompareOp::Lte,
                    limit,
                ));
            }
        }

        if self.avoid_allergens {
            clauses.push(Predicate::ingredients_none(allergies.to_vec()));
        }

        Predicate::and(clauses)
    }
}

/// Parse a budget bound
///
/// Any number other than zero applies, including negatives and infinity.
/// Zero, NaN and non-numeric text drop the clause.
pub fn parse_budget(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| !value.is_nan() && *value != 0.0)
}

/// Parse a nutrient limit, accepting only finite positive numbers
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}
