use crate::api::context::Tenant;
use crate::api::handlers::{ok, ApiResponse};
use crate::api::{query_date, query_number, required, ApiQuery, AppState};
use crate::error::LedgerResult;
use crate::models::{DailySummary, DateRangeSummary, MonthlySummary, WeeklySummary};
use axum::{extract::State, Json};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct DayParams {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeekParams {
    pub start: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MonthParams {
    pub year: Option<String>,
    pub month: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// GET /api/summary/daily?date=
pub async fn daily(
    State(state): State<AppState>,
    Tenant(dairy_id): Tenant,
    ApiQuery(params): ApiQuery<DayParams>,
) -> LedgerResult<Json<ApiResponse<DailySummary>>> {
    let date = query_date("date", required("date", &params.date)?)?;
    Ok(ok(state.summaries.daily(dairy_id, date).await?))
}

/// GET /api/summary/weekly?start=
pub async fn weekly(
    State(state): State<AppState>,
    Tenant(dairy_id): Tenant,
    ApiQuery(params): ApiQuery<WeekParams>,
) -> LedgerResult<Json<ApiResponse<WeeklySummary>>> {
    let start = query_date("start_date", required("start_date", &params.start)?)?;
    Ok(ok(state.summaries.weekly(dairy_id, start).await?))
}

/// GET /api/summary/monthly?year=&month=
pub async fn monthly(
    State(state): State<AppState>,
    Tenant(dairy_id): Tenant,
    ApiQuery(params): ApiQuery<MonthParams>,
) -> LedgerResult<Json<ApiResponse<MonthlySummary>>> {
    let year = query_number("year", required("year", &params.year)?)?;
    let month = query_number("month", required("month", &params.month)?)?;
    Ok(ok(state.summaries.monthly(dairy_id, year, month).await?))
}

/// GET /api/summary/range?start=&end=
pub async fn range(
    State(state): State<AppState>,
    Tenant(dairy_id): Tenant,
    ApiQuery(params): ApiQuery<RangeParams>,
) -> LedgerResult<Json<ApiResponse<DateRangeSummary>>> {
    let start = query_date("start_date", required("start_date", &params.start)?)?;
    let end = query_date("end_date", required("end_date", &params.end)?)?;
    Ok(ok(state.summaries.date_range(dairy_id, start, end).await?))
}
