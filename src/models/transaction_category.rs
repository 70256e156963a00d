//! Transaction category models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_len_between, require_max_len};
use crate::{Error, Result};

/// A category used to organize transactions. Categories may nest one level
/// through `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionCategory {
    /// Unique category identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Hex color, e.g. `"#4CAF50"`.
    pub color: Option<String>,
    /// Icon identifier.
    pub icon: Option<String>,
    /// The parent category, for subcategories.
    pub parent_id: Option<String>,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
}

impl TransactionCategory {
    /// Whether this category has a parent.
    pub fn is_subcategory(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// Request body for creating a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionCategoryCreateRequest {
    /// Category name (1-100 characters).
    pub name: String,
    /// Hex color in `#RRGGBB` form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Icon identifier (at most 50 characters).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Parent category, for subcategories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl TransactionCategoryCreateRequest {
    /// Creates a top-level category request.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
            icon: None,
            parent_id: None,
        }
    }

    /// Sets the hex color.
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Sets the icon.
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Makes this a subcategory of `parent_id`.
    pub fn parent_id(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        require_len_between("name", &self.name, 1, 100)?;
        if let Some(color) = &self.color {
            if !is_hex_color(color) {
                return Err(Error::InvalidRequest(format!(
                    "color must be a hex color like #4CAF50, got {:?}",
                    color
                )));
            }
        }
        require_max_len("icon", self.icon.as_deref(), 50)
    }
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_subcategory() {
        let category: TransactionCategory = serde_json::from_value(json!({
            "id": "cat_2",
            "name": "Groceries",
            "color": "#4CAF50",
            "parentId": "cat_1",
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert!(category.is_subcategory());
        assert_eq!(category.icon, None);
    }

    #[test]
    fn test_create_request_wire_format() {
        let request = TransactionCategoryCreateRequest::new("Groceries")
            .color("#4CAF50")
            .parent_id("cat_1");

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"name": "Groceries", "color": "#4CAF50", "parentId": "cat_1"})
        );
    }

    #[test]
    fn test_validation() {
        assert!(TransactionCategoryCreateRequest::new("Food").validate().is_ok());
        assert!(TransactionCategoryCreateRequest::new("").validate().is_err());
        assert!(TransactionCategoryCreateRequest::new("x".repeat(101))
            .validate()
            .is_err());
        assert!(TransactionCategoryCreateRequest::new("Food")
            .color("#abcdef")
            .validate()
            .is_ok());
        assert!(TransactionCategoryCreateRequest::new("Food")
            .color("4CAF50")
            .validate()
            .is_err());
        assert!(TransactionCategoryCreateRequest::new("Food")
            .color("#4CAF5G")
            .validate()
            .is_err());
        assert!(TransactionCategoryCreateRequest::new("Food")
            .icon("i".repeat(51))
            .validate()
            .is_err());
    }

    #[test]
    fn test_is_hex_color() {
        assert!(is_hex_color("#FF5733"));
        assert!(!is_hex_color("#FF573"));
        assert!(!is_hex_color("#FF57333"));
        assert!(!is_hex_color(""));
    }
}
