//! Typed predicate tree over recipes
//!
//! Filters are assembled as a [`Predicate`] value and only later lowered to
//! a concrete store's query dialect (see [`crate::sql`]), or evaluated
//! directly with [`Predicate::matches`].

use crate::model::{Nutrient, RecipeRecord};

/// Text columns that support substring matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
}

/// Numeric columns that support comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    TotalPrice,
    Nutrient(Nutrient),
}

impl NumericField {
    fn value_of(self, recipe: &RecipeRecord) -> f64 {
        match self {
            NumericField::TotalPrice => recipe.total_price,
            NumericField::Nutrient(nutrient) => recipe.nutrition.get(nutrient),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            CompareOp::Lt => lhs < rhs,
            CompareOp::Lte => lhs <= rhs,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Gte => lhs >= rhs,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
        }
    }
}

/// Condition deciding whether a recipe belongs to a result set
///
/// Text matching is always a case-insensitive substring test. The set
/// variants quantify over the recipe's ingredient names:
/// `SetContainsAny` needs at least one ingredient matching any needle,
/// `SetContainsNone` needs no ingredient matching any needle.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    TextContains {
        field: TextField,
        needle: String,
    },
    NumericCompare {
        field: NumericField,
        op: CompareOp,
        value: f64,
    },
    SetContainsAny {
        needles: Vec<String>,
    },
    SetContainsNone {
        needles: Vec<String>,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Predicate every recipe satisfies
    pub fn all() -> Self {
        Predicate::And(Vec::new())
    }

    pub fn title_contains(needle: impl Into<String>) -> Self {
        Predicate::TextContains {
            field: TextField::Title,
            needle: needle.into(),
        }
    }

    pub fn compare(field: NumericField, op: CompareOp, value: f64) -> Self {
        Predicate::NumericCompare { field, op, value }
    }

    pub fn ingredients_any(needles: Vec<String>) -> Self {
        Predicate::SetContainsAny { needles }
    }

    pub fn ingredients_none(needles: Vec<String>) -> Self {
        Predicate::SetContainsNone { needles }
    }

    /// Conjunction of `clauses`, with nested conjunctions flattened
    pub fn and(clauses: Vec<Predicate>) -> Self {
        let mut flat = Vec::with_capacity(clauses.len());
        for clause in clauses {
            match clause {
                Predicate::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        Predicate::And(flat)
    }

    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Predicate::And(clauses) if clauses.is_empty())
    }

    /// Evaluate the predicate against one recipe
    pub fn matches(&self, recipe: &RecipeRecord) -> bool {
        match self {
            Predicate::TextContains {
                field: TextField::Title,
                needle,
            } => contains_ignore_case(&recipe.title, needle),
            Predicate::NumericCompare { field, op, value } => {
                op.apply(field.value_of(recipe), *value)
            }
            Predicate::SetContainsAny { needles } => any_ingredient_matches(recipe, needles),
            Predicate::SetContainsNone { needles } => !any_ingredient_matches(recipe, needles),
            Predicate::And(clauses) => clauses.iter().all(|clause| clause.matches(recipe)),
            Predicate::Or(clauses) => clauses.iter().any(|clause| clause.matches(recipe)),
        }
    }
}

fn any_ingredient_matches(recipe: &RecipeRecord, needles: &[String]) -> bool {
    recipe.ingredients.iter().any(|ingredient| {
        needles
            .iter()
            .any(|needle| contains_ignore_case(&ingredient.name, needle))
    })
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
