//! Budget progress: how much of a budget's limit has been spent over its
//! effective date window.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::DbConn;
use crate::error::Result;
use crate::models::budgets::{Budget, BudgetProgress};
use crate::queries::transactions;
use crate::validation::to_currency;

/// Today's date in the given IANA timezone, UTC when unset or unknown.
pub fn today_in(timezone: Option<&str>) -> NaiveDate {
    let now = Utc::now();
    match timezone.and_then(|tz| tz.parse::<Tz>().ok()) {
        Some(tz) => now.with_timezone(&tz).date_naive(),
        None => now.date_naive(),
    }
}

/// Stored end date, or `today` for open-ended budgets.
pub fn effective_end_date(budget: &Budget, today: NaiveDate) -> NaiveDate {
    budget.end_date.unwrap_or(today)
}

/// Pure progress arithmetic over an already-summed `spent`.
pub fn compute_progress(limit: Decimal, spent: Decimal) -> BudgetProgress {
    let limit = to_currency(limit);
    let spent = to_currency(spent);

    let remaining = if limit > spent { limit - spent } else { Decimal::ZERO };

    let progress_percent = if limit > Decimal::ZERO {
        spent * dec!(100) / limit
    } else {
        Decimal::ZERO
    };

    BudgetProgress {
        limit,
        spent,
        remaining: to_currency(remaining),
        progress_percent: to_currency(progress_percent),
        is_over_budget: spent > limit,
    }
}

/// Computes progress for `budget` against its owner's transactions.
///
/// `timezone` is the owner's timezone, used to pick "today" when the budget
/// has no end date.
pub async fn calculate_progress(conn: &mut DbConn, budget: &Budget, timezone: Option<&str>) -> Result<BudgetProgress> {
    let end = effective_end_date(budget, today_in(timezone));

    let spent = if end < budget.start_date {
        Some(Decimal::ZERO)
    } else {
        transactions::sum_spent(conn, budget.user_id, budget.category_id, budget.start_date, end).await?
    };

    let spent = spent.unwrap_or_else(|| {
        tracing::warn!(
            budget_id = %budget.id,
            user_id = %budget.user_id,
            "budget owner could not be resolved, reporting zero spend"
        );
        Decimal::ZERO
    });

    Ok(compute_progress(budget.limit, spent))
}
