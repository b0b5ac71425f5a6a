use chrono::NaiveDate;
use uuid::Uuid;

use crate::DbConn;
use crate::{
    error::{Error, Result},
    models::budgets::{
        BudgetPeriod, BudgetResponse, BudgetWithCategory, CreateBudgetRequest, NewBudget,
        UpdateBudget, UpdateBudgetRequest,
    },
    queries::budgets,
    services::{categories, ownership::ensure_owner, progress},
    validation::{validate_date_range, validate_limit},
};

/// The acting user, as far as budget reads are concerned.
#[derive(Debug, Clone, Copy)]
pub struct BudgetViewer<'a> {
    pub user_id: Uuid,
    pub timezone: Option<&'a str>,
}

fn period_end(period: BudgetPeriod, start: NaiveDate) -> Result<NaiveDate> {
    period
        .end_date_from(start)
        .ok_or_else(|| Error::validation("start_date", "The start date is out of range"))
}

async fn with_progress(conn: &mut DbConn, row: BudgetWithCategory, timezone: Option<&str>) -> Result<BudgetResponse> {
    let progress = progress::calculate_progress(conn, &row.budget, timezone).await?;
    Ok(BudgetResponse {
        category: row.category_summary(),
        budget: row.budget,
        progress,
    })
}

async fn find_owned(conn: &mut DbConn, user_id: Uuid, id: Uuid) -> Result<BudgetWithCategory> {
    let row = budgets::get_budget_by_id(conn, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Budget with ID {} not found", id)))?;
    ensure_owner(user_id, &row)?;
    Ok(row)
}

pub async fn list_budgets(conn: &mut DbConn, viewer: BudgetViewer<'_>) -> Result<Vec<BudgetResponse>> {
    let rows = budgets::list_budgets(conn, viewer.user_id).await?;

    let mut responses = Vec::with_capacity(rows.len());
    for row in rows {
        responses.push(with_progress(conn, row, viewer.timezone).await?);
    }
    Ok(responses)
}

pub async fn get_budget(conn: &mut DbConn, viewer: BudgetViewer<'_>, id: Uuid) -> Result<BudgetResponse> {
    let row = find_owned(conn, viewer.user_id, id).await?;
    with_progress(conn, row, viewer.timezone).await
}

/// Creates a budget. Without an explicit end date the period decides it.
pub async fn create_budget(
    conn: &mut DbConn,
    viewer: BudgetViewer<'_>,
    request: CreateBudgetRequest,
) -> Result<BudgetResponse> {
    let limit = validate_limit("limit", request.limit)?;

    let end_date = match request.end_date {
        Some(end_date) => end_date,
        None => period_end(request.period, request.start_date)?,
    };
    validate_date_range(request.start_date, end_date)?;

    if let Some(category_id) = request.category_id {
        categories::ensure_assignable(conn, viewer.user_id, category_id).await?;
    }

    let id = budgets::create_budget(
        conn,
        NewBudget {
            user_id: viewer.user_id,
            category_id: request.category_id,
            limit,
            period: request.period,
            start_date: request.start_date,
            end_date,
        },
    )
    .await?;

    get_budget(conn, viewer, id).await
}

/// Resolves the end date after an update.
///
/// An explicit date wins. An explicit null, or a change of period or start
/// date without an end date, recomputes it from the period.
fn updated_end_date(current: &BudgetWithCategory, request: &UpdateBudgetRequest) -> Result<Option<NaiveDate>> {
    let period = request.period.unwrap_or(current.budget.period);
    let start = request.start_date.unwrap_or(current.budget.start_date);
    let schedule_changed = request.period.is_some_and(|p| p != current.budget.period)
        || request.start_date.is_some_and(|d| d != current.budget.start_date);

    let end = match request.end_date {
        Some(Some(end)) => Some(end),
        Some(None) => Some(period_end(period, start)?),
        None if schedule_changed => Some(period_end(period, start)?),
        None => current.budget.end_date,
    };

    if let Some(end) = end {
        validate_date_range(start, end)?;
    }
    Ok(end)
}

pub async fn update_budget(
    conn: &mut DbConn,
    viewer: BudgetViewer<'_>,
    id: Uuid,
    request: UpdateBudgetRequest,
) -> Result<BudgetResponse> {
    let current = find_owned(conn, viewer.user_id, id).await?;

    let limit = request
        .limit
        .map(|limit| validate_limit("limit", limit))
        .transpose()?;
    let end_date = updated_end_date(&current, &request)?;

    budgets::update_budget(
        conn,
        id,
        UpdateBudget {
            limit,
            period: request.period,
            start_date: request.start_date,
            end_date,
        },
    )
    .await?;

    get_budget(conn, viewer, id).await
}

pub async fn delete_budget(conn: &mut DbConn, user_id: Uuid, id: Uuid) -> Result<()> {
    find_owned(conn, user_id, id).await?;
    budgets::delete_budget(conn, id).await?;
    Ok(())
}
