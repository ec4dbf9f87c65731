//! Recipe records as the feed engine reads them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Nutrient columns stored on every recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Nutrient {
    Calories,
    Protein,
    Carbs,
    Fat,
    Fiber,
    Sugar,
    Sodium,
    Potassium,
    VitaminC,
    VitaminA,
    Calcium,
    Iron,
}

impl Nutrient {
    pub const ALL: [Nutrient; 12] = [
        Nutrient::Calories,
        Nutrient::Protein,
        Nutrient::Carbs,
        Nutrient::Fat,
        Nutrient::Fiber,
        Nutrient::Sugar,
        Nutrient::Sodium,
        Nutrient::Potassium,
        Nutrient::VitaminC,
        Nutrient::VitaminA,
        Nutrient::Calcium,
        Nutrient::Iron,
    ];

    /// Name used as the query-string key for this nutrient's upper bound
    pub fn query_name(self) -> &'static str {
        match self {
            Nutrient::Calories => "Calories",
            Nutrient::Protein => "Protein",
            Nutrient::Carbs => "Carbs",
            Nutrient::Fat => "Fat",
            Nutrient::Fiber => "Fiber",
            Nutrient::Sugar => "Sugar",
            Nutrient::Sodium => "Sodium",
            Nutrient::Potassium => "Potassium",
            Nutrient::VitaminC => "VitaminC",
            Nutrient::VitaminA => "VitaminA",
            Nutrient::Calcium => "Calcium",
            Nutrient::Iron => "Iron",
        }
    }

    /// Column holding this nutrient in the `recipes` table
    pub fn column(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Protein => "protein",
            Nutrient::Carbs => "carbs",
            Nutrient::Fat => "fat",
            Nutrient::Fiber => "fiber",
            Nutrient::Sugar => "sugar",
            Nutrient::Sodium => "sodium",
            Nutrient::Potassium => "potassium",
            Nutrient::VitaminC => "vitamin_c",
            Nutrient::VitaminA => "vitamin_a",
            Nutrient::Calcium => "calcium",
            Nutrient::Iron => "iron",
        }
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_name())
    }
}

impl FromStr for Nutrient {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Nutrient::ALL
            .into_iter()
            .find(|nutrient| nutrient.query_name() == s)
            .ok_or(())
    }
}

/// Nutrition facts of one recipe; absent values are stored as zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub sodium: f64,
    pub potassium: f64,
    pub vitamin_c: f64,
    pub vitamin_a: f64,
    pub calcium: f64,
    pub iron: f64,
}

impl Nutrition {
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein,
            Nutrient::Carbs => self.carbs,
            Nutrient::Fat => self.fat,
            Nutrient::Fiber => self.fiber,
            Nutrient::Sugar => self.sugar,
            Nutrient::Sodium => self.sodium,
            Nutrient::Potassium => self.potassium,
            Nutrient::VitaminC => self.vitamin_c,
            Nutrient::VitaminA => self.vitamin_a,
            Nutrient::Calcium => self.calcium,
            Nutrient::Iron => self.iron,
        }
    }

    pub fn set(&mut self, nutrient: Nutrient, value: f64) {
        let slot = match nutrient {
            Nutrient::Calories => &mut self.calories,
            Nutrient::Protein => &mut self.protein,
            Nutrient::Carbs => &mut self.carbs,
            Nutrient::Fat => &mut self.fat,
            Nutrient::Fiber => &mut self.fiber,
            Nutrient::Sugar => &mut self.sugar,
            Nutrient::Sodium => &mut self.sodium,
            Nutrient::Potassium => &mut self.potassium,
            Nutrient::VitaminC => &mut self.vitamin_c,
            Nutrient::VitaminA => &mut self.vitamin_a,
            Nutrient::Calcium => &mut self.calcium,
            Nutrient::Iron => &mut self.iron,
        };
        *slot = value;
    }
}

/// Ingredient line owned by a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    /// Unit price, never negative
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeImage {
    pub id: Uuid,
    pub url: String,
}

/// Owner of a recipe, as much of the user as the feed needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
    pub profile_image: Option<String>,
}

/// A posted recipe with its ingredients, images and owner
///
/// `total_price` is the sum of ingredient prices computed when the recipe
/// was posted; the feed never recomputes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    pub id: Uuid,
    pub title: String,
    pub procedure: String,
    pub total_price: f64,
    pub nutrition: Nutrition,
    pub created_at: DateTime<Utc>,
    pub ingredients: Vec<Ingredient>,
    pub images: Vec<RecipeImage>,
    pub author: Author,
}
