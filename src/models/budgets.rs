use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::error::Result;
use crate::models::categories::CategorySummary;
use crate::validation::Payload;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, sqlx::Type,
)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    /// Last day of the period starting on `start`, inclusive.
    ///
    /// Weekly spans 7 days; monthly and yearly follow calendar months, so a
    /// monthly budget starting on Jan 31 ends on Feb 27 (or 28 in leap years).
    pub fn end_date_from(self, start: NaiveDate) -> Option<NaiveDate> {
        let next_start = match self {
            BudgetPeriod::Weekly => start.checked_add_days(Days::new(7)),
            BudgetPeriod::Monthly => start.checked_add_months(Months::new(1)),
            BudgetPeriod::Yearly => start.checked_add_months(Months::new(12)),
        }?;
        next_start.pred_opt()
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    #[sqlx(rename = "amount_limit")]
    pub limit: Decimal,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Budget joined with its category. The foreign key nulls `category_id` when
/// the category is purged, so a present id always has a row behind it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BudgetWithCategory {
    #[sqlx(flatten)]
    pub budget: Budget,
    pub category_name: Option<String>,
    pub category_icon: Option<String>,
    pub category_deleted_at: Option<DateTime<Utc>>,
}

impl BudgetWithCategory {
    pub fn category_summary(&self) -> CategorySummary {
        match self.budget.category_id {
            Some(id) => CategorySummary {
                id: Some(id),
                name: self.category_name.clone().unwrap_or_default(),
                icon: self.category_icon.clone(),
                is_deleted: self.category_deleted_at.is_some(),
            },
            None => CategorySummary::overall(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewBudget {
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub limit: Decimal,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateBudget {
    pub limit: Option<Decimal>,
    pub period: Option<BudgetPeriod>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub const CREATE_BUDGET_FIELDS: &[&str] = &["category_id", "limit", "period", "start_date", "end_date"];

/// The category is fixed at creation, so updates do not accept it.
pub const UPDATE_BUDGET_FIELDS: &[&str] = &["limit", "period", "start_date", "end_date"];

/// HTTP payload for creating a budget
#[derive(Debug, Clone)]
pub struct CreateBudgetRequest {
    pub category_id: Option<Uuid>,
    pub limit: Decimal,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl CreateBudgetRequest {
    pub fn from_payload(payload: &Payload) -> Result<Self> {
        Ok(Self {
            category_id: payload.optional("category_id")?,
            limit: payload.required("limit")?,
            period: payload.required("period")?,
            start_date: payload.required("start_date")?,
            end_date: payload.optional("end_date")?,
        })
    }
}

/// HTTP payload for a partial budget update
#[derive(Debug, Clone, Default)]
pub struct UpdateBudgetRequest {
    pub limit: Option<Decimal>,
    pub period: Option<BudgetPeriod>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
}

impl UpdateBudgetRequest {
    pub fn from_payload(payload: &Payload) -> Result<Self> {
        payload.require_any()?;
        Ok(Self {
            limit: payload.optional("limit")?,
            period: payload.optional("period")?,
            start_date: payload.optional("start_date")?,
            end_date: payload.nullable("end_date")?,
        })
    }
}

/// Spending progress of a budget over its effective date window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetProgress {
    pub limit: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub progress_percent: Decimal,
    pub is_over_budget: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetResponse {
    #[serde(flatten)]
    pub budget: Budget,
    pub category: CategorySummary,
    pub progress: BudgetProgress,
}
