use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::validation::Payload;

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Category {
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub user_id: Uuid,
    pub name: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub icon: Option<Option<String>>,
}

/// Keys a client may send for a category. The owner comes from the token.
pub const CATEGORY_FIELDS: &[&str] = &["name", "icon"];

/// HTTP payload for creating a category
#[derive(Debug, Clone)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub icon: Option<String>,
}

impl CreateCategoryRequest {
    pub fn from_payload(payload: &Payload) -> Result<Self> {
        Ok(Self {
            name: payload.required("name")?,
            icon: payload.optional("icon")?,
        })
    }
}

/// HTTP payload for a partial category update
#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub icon: Option<Option<String>>,
}

impl UpdateCategoryRequest {
    pub fn from_payload(payload: &Payload) -> Result<Self> {
        payload.require_any()?;
        Ok(Self {
            name: payload.optional("name")?,
            icon: payload.nullable("icon")?,
        })
    }
}

/// Category as embedded in transaction and budget responses.
///
/// Soft-deleted categories still resolve; `is_deleted` tells the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub is_deleted: bool,
}

/// Name reported for budgets without a category.
pub const OVERALL_BUDGET_NAME: &str = "Overall Budget";

impl CategorySummary {
    pub fn overall() -> Self {
        Self {
            id: None,
            name: OVERALL_BUDGET_NAME.to_string(),
            icon: None,
            is_deleted: false,
        }
    }
}
