//! Shelf and review records plus the values derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest allowed review rating; ratings run from 0 to this inclusive.
pub const MAX_RATE: i32 = 5;

/// Opaque account id of the requester, owned by the authentication layer.
pub type UserId = i64;

/// Fixed set of book classifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Business,
    Life,
    Hobby,
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Business,
        Category::Life,
        Category::Hobby,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Business => "business",
            Category::Life => "life",
            Category::Hobby => "hobby",
            Category::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Business => "Business",
            Category::Life => "Life",
            Category::Hobby => "Hobby",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// One selectable choice (value + display label) for forms and filters.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

pub fn category_choices() -> Vec<Choice> {
    Category::ALL
        .iter()
        .map(|c| Choice {
            value: c.as_str().to_string(),
            label: c.label().to_string(),
        })
        .collect()
}

pub fn rate_choices() -> Vec<Choice> {
    (0..=MAX_RATE)
        .map(|r| Choice {
            value: r.to_string(),
            label: r.to_string(),
        })
        .collect()
}

/// A cataloged book as stored.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Shelf {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub thumbnail: Option<String>,
    pub category: Category,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shelf {
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.user_id == user
    }
}

/// A shelf together with its review and favorite aggregates.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ShelfSummary {
    #[serde(flatten)]
    pub shelf: Shelf,
    /// Mean review rating; 0 when the shelf has no reviews.
    pub average_rating: f64,
    pub review_count: i64,
    pub favorite_count: i64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Review {
    pub id: i64,
    pub book_id: i64,
    pub title: String,
    pub text: String,
    pub rate: i32,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Result of a favorite toggle, returned as a bare JSON object.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FavoriteState {
    pub is_favorited: bool,
    pub favorite_count: i64,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: Category,
    pub label: &'static str,
    pub count: i64,
}

/// Per-requester statistics for the dashboard.
#[derive(Clone, Debug, Serialize)]
pub struct Dashboard {
    pub total_books: i64,
    pub total_reviews: i64,
    pub favorite_books: Vec<ShelfSummary>,
    pub recent_books: Vec<ShelfSummary>,
    pub recent_reviews: Vec<Review>,
    pub category_stats: Vec<CategoryCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_exact_lowercase_only() {
        assert_eq!("hobby".parse::<Category>().unwrap(), Category::Hobby);
        assert!("Hobby".parse::<Category>().is_err());
        assert!("".parse::<Category>().is_err());
    }

    #[test]
    fn category_serializes_as_value() {
        assert_eq!(serde_json::to_value(Category::Business).unwrap(), "business");
    }

    #[test]
    fn rate_choices_cover_zero_to_max() {
        let choices = rate_choices();
        assert_eq!(choices.len(), (MAX_RATE + 1) as usize);
        assert_eq!(choices[0].value, "0");
        assert_eq!(choices.last().unwrap().value, MAX_RATE.to_string());
    }

    #[test]
    fn summary_flattens_shelf_fields() {
        let now = Utc::now();
        let summary = ShelfSummary {
            shelf: Shelf {
                id: 7,
                title: "Dune".into(),
                text: "Spice".into(),
                thumbnail: None,
                category: Category::Hobby,
                user_id: 1,
                created_at: now,
                updated_at: now,
            },
            average_rating: 0.0,
            review_count: 0,
            favorite_count: 0,
        };
        let v = serde_json::to_value(&summary).unwrap();
        assert_eq!(v["id"], 7);
        assert_eq!(v["category"], "hobby");
        assert_eq!(v["average_rating"], 0.0);
    }
}
