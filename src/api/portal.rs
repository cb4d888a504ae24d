use crate::api::context::Portal;
use crate::api::handlers::{ok, ApiResponse};
use crate::api::{query_number, required, ApiQuery, AppState};
use crate::error::{LedgerResult, ValidationErrors};
use crate::models::{DateRangeSummary, MilkEntry};
use axum::{extract::State, Json};
use chrono::Local;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct EntriesParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct MonthParams {
    pub year: Option<String>,
    pub month: Option<String>,
}

impl MonthParams {
    fn year_month(&self) -> Result<(i32, u32), ValidationErrors> {
        let year = query_number("year", required("year", &self.year)?)?;
        let month = query_number("month", required("month", &self.month)?)?;
        Ok((year, month))
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub months: Option<String>,
}

/// GET /api/portal/entries?limit=
pub async fn my_entries(
    State(state): State<AppState>,
    Portal(who): Portal,
    ApiQuery(params): ApiQuery<EntriesParams>,
) -> LedgerResult<Json<ApiResponse<Vec<MilkEntry>>>> {
    let limit = params
        .limit
        .unwrap_or(state.config.ledger.portal_entries_limit);
    Ok(ok(state.portal.list_my_entries(who, limit).await?))
}

/// GET /api/portal/monthly?year=&month=
pub async fn monthly_entries(
    State(state): State<AppState>,
    Portal(who): Portal,
    ApiQuery(params): ApiQuery<MonthParams>,
) -> LedgerResult<Json<ApiResponse<Vec<MilkEntry>>>> {
    let (year, month) = params.year_month()?;
    Ok(ok(state.portal.monthly_entries(who, year, month).await?))
}

/// GET /api/portal/monthly/summary?year=&month=
pub async fn monthly_summary(
    State(state): State<AppState>,
    Portal(who): Portal,
    ApiQuery(params): ApiQuery<MonthParams>,
) -> LedgerResult<Json<ApiResponse<DateRangeSummary>>> {
    let (year, month) = params.year_month()?;
    Ok(ok(state.portal.monthly_summary(who, year, month).await?))
}

/// GET /api/portal/history?months=
pub async fn history(
    State(state): State<AppState>,
    Portal(who): Portal,
    ApiQuery(params): ApiQuery<HistoryParams>,
) -> LedgerResult<Json<ApiResponse<Vec<DateRangeSummary>>>> {
    let months = match params.months.as_deref() {
        Some(raw) => query_number("months", raw)?,
        None => state.config.ledger.history_months,
    };
    let today = Local::now().date_naive();
    Ok(ok(state
        .portal
        .historical_summaries(who, today, months)
        .await?))
}
