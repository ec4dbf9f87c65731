//! Home feed query-string decoding
//!
//! Recognised keys:
//! - `auto-filter=1`: automatic mode, every other filter key is ignored
//! - `title`, `budget`, `high-to-low`, `allergens=1`
//! - `ingredients`: comma-separated substrings
//! - one key per nutrient (`Calories`, `Protein`, ..., `Iron`)
//! - `page`: 1-based page number

use std::collections::{BTreeMap, HashMap};

use crate::{criteria::FilterCriteria, model::Nutrient, service::FeedMode};

/// Decoded feed request
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRequest {
    pub mode: FeedMode,
    /// Always at least 1
    pub page: u32,
}

impl FeedRequest {
    pub fn from_query_map(query: &HashMap<String, String>) -> Self {
        let page = param(query, "page")
            .and_then(parse_page)
            .unwrap_or(1)
            .max(1);

        if param(query, "auto-filter") == Some("1") {
            return Self {
                mode: FeedMode::Automatic,
                page,
            };
        }

        let ingredients = param(query, "ingredients")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|term| !term.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let nutrient_limits: BTreeMap<Nutrient, String> = Nutrient::ALL
            .into_iter()
            .filter_map(|nutrient| {
                param(query, nutrient.query_name()).map(|value| (nutrient, value.to_string()))
            })
            .collect();

        let criteria = FilterCriteria {
            title: param(query, "title").map(str::to_string),
            budget: param(query, "budget").map(str::to_string),
            high_to_low: param(query, "high-to-low").is_some(),
            ingredients,
            nutrient_limits,
            avoid_allergens: param(query, "allergens") == Some("1"),
        };

        Self {
            mode: FeedMode::Manual(criteria),
            page,
        }
    }
}

/// Leading integer of `raw`, so `2abc` and `2.5` both read as page 2
///
/// Negative numbers come back as 0 and overlong digit runs saturate.
fn parse_page(raw: &str) -> Option<u32> {
    let raw = raw.trim_start();
    let (negative, unsigned) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let digits_len = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..digits_len];
    if digits.is_empty() {
        return None;
    }
    if negative {
        return Some(0);
    }
    Some(digits.parse::<u32>().unwrap_or(u32::MAX))
}

/// Non-empty value of `key`
fn param<'a>(query: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    query
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}
