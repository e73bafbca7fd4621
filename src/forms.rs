//! Create/edit payloads for shelves and reviews, and their field rules.
//!
//! Forms deserialize leniently (every field optional, rating accepted as number or numeric
//! string) and are then validated into the typed values the services insert. Fields that are
//! not part of a form, such as the owner or the reviewed book, are never read from input.

use crate::error::{AppError, FieldErrors};
use crate::models::{category_choices, rate_choices, Category, Choice, MAX_RATE};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const TITLE_MAX_LENGTH: usize = 100;
pub const THUMBNAIL_MAX_LENGTH: usize = 255;

/// Rule for one form field, also published in form context so clients can render inputs.
#[derive(Clone, Debug, Serialize)]
pub struct FieldRule {
    pub name: &'static str,
    pub widget: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
}

pub fn shelf_form_fields() -> Vec<FieldRule> {
    vec![
        FieldRule { name: "title", widget: "text", required: true, max_length: Some(TITLE_MAX_LENGTH), choices: None },
        FieldRule { name: "text", widget: "textarea", required: true, max_length: None, choices: None },
        FieldRule { name: "category", widget: "select", required: true, max_length: None, choices: Some(category_choices()) },
        FieldRule { name: "thumbnail", widget: "file", required: false, max_length: Some(THUMBNAIL_MAX_LENGTH), choices: None },
    ]
}

pub fn review_form_fields() -> Vec<FieldRule> {
    vec![
        FieldRule { name: "title", widget: "text", required: true, max_length: Some(TITLE_MAX_LENGTH), choices: None },
        FieldRule { name: "text", widget: "textarea", required: true, max_length: None, choices: None },
        FieldRule { name: "rate", widget: "select", required: true, max_length: None, choices: Some(rate_choices()) },
    ]
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ShelfForm {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Validated shelf input. Used for both create and full update.
#[derive(Clone, Debug, PartialEq)]
pub struct ShelfInput {
    pub title: String,
    pub text: String,
    pub category: Category,
    pub thumbnail: Option<String>,
}

impl ShelfForm {
    pub fn validate(self) -> Result<ShelfInput, AppError> {
        let mut errors = FieldErrors::new();
        let title = required_text(&mut errors, "title", self.title, Some(TITLE_MAX_LENGTH));
        let text = required_text(&mut errors, "text", self.text, None);
        let category = match self.category.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => {
                push(&mut errors, "category", "This field is required.");
                None
            }
            Some(raw) => match raw.parse::<Category>() {
                Ok(c) => Some(c),
                Err(_) => {
                    push(
                        &mut errors,
                        "category",
                        &format!("Select a valid choice. {} is not one of the available choices.", raw),
                    );
                    None
                }
            },
        };
        let thumbnail = self
            .thumbnail
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if let Some(t) = &thumbnail {
            check_length(&mut errors, "thumbnail", t, THUMBNAIL_MAX_LENGTH);
        }
        match (title, text, category) {
            (Some(title), Some(text), Some(category)) if errors.is_empty() => Ok(ShelfInput {
                title,
                text,
                category,
                thumbnail,
            }),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Number or numeric string.
    #[serde(default)]
    pub rate: Option<Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReviewInput {
    pub title: String,
    pub text: String,
    pub rate: i32,
}

impl ReviewForm {
    pub fn validate(self) -> Result<ReviewInput, AppError> {
        let mut errors = FieldErrors::new();
        let title = required_text(&mut errors, "title", self.title, Some(TITLE_MAX_LENGTH));
        let text = required_text(&mut errors, "text", self.text, None);
        let rate = match self.rate {
            None | Some(Value::Null) => {
                push(&mut errors, "rate", "This field is required.");
                None
            }
            Some(v) => match parse_rate(&v) {
                Some(r) if (0..=MAX_RATE).contains(&r) => Some(r),
                _ => {
                    push(
                        &mut errors,
                        "rate",
                        &format!("Select a valid choice. {} is not one of the available choices.", v),
                    );
                    None
                }
            },
        };
        match (title, text, rate) {
            (Some(title), Some(text), Some(rate)) if errors.is_empty() => Ok(ReviewInput { title, text, rate }),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

fn parse_rate(v: &Value) -> Option<i32> {
    match v {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    max_length: Option<usize>,
) -> Option<String> {
    let value = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let Some(value) = value else {
        push(errors, field, "This field is required.");
        return None;
    };
    if let Some(max) = max_length {
        if !check_length(errors, field, &value, max) {
            return None;
        }
    }
    Some(value)
}

fn check_length(errors: &mut FieldErrors, field: &str, value: &str, max: usize) -> bool {
    let len = value.chars().count();
    if len > max {
        push(
            errors,
            field,
            &format!("Ensure this value has at most {} characters (it has {}).", max, len),
        );
        return false;
    }
    true
}

fn push(errors: &mut FieldErrors, field: &str, message: &str) {
    errors.entry(field.to_string()).or_default().push(message.to_string());
}
