//! Time-bucketed totals over milk entries.
//!
//! The free functions are pure: they take already-fetched entries and never
//! look at the store. Entries outside the requested window are ignored, so a
//! caller may pass a wider slice than needed. [`SummaryService`] only fetches
//! rows and hands them over.

use crate::db::DairyStore;
use crate::error::LedgerResult;
use crate::models::{
    DailySummary, DateRangeSummary, EntryFilter, MilkEntry, MonthlySummary, Summary, SummaryScope,
    Totals, WeeklySummary,
};
use crate::service::validation;
use chrono::{Datelike, NaiveDate};
use indexmap::IndexMap;
use std::sync::Arc;
use uuid::Uuid;

/// Days in a weekly bucket
pub const WEEK_DAYS: usize = 7;

/// Inclusive last day of the 7-day window starting at `start`
pub fn week_end(start: NaiveDate) -> NaiveDate {
    start.iter_days().take(WEEK_DAYS).last().unwrap_or(start)
}

/// Inclusive last day of the month starting at `first`
pub fn month_end(first: NaiveDate) -> NaiveDate {
    first
        .iter_days()
        .take_while(|d| d.month() == first.month())
        .last()
        .unwrap_or(first)
}

/// One bucket per day in [start, end], in date order, zero-filled
fn bucket_by_day<'a>(
    start: NaiveDate,
    end: NaiveDate,
    entries: impl IntoIterator<Item = &'a MilkEntry>,
) -> IndexMap<NaiveDate, Totals> {
    let mut buckets: IndexMap<NaiveDate, Totals> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|d| (d, Totals::default()))
        .collect();

    for entry in entries {
        if let Some(totals) = buckets.get_mut(&entry.date) {
            totals.add(entry);
        }
    }
    buckets
}

fn in_range(entry: &MilkEntry, start: NaiveDate, end: NaiveDate) -> bool {
    entry.date >= start && entry.date <= end
}

pub fn daily_summary(date: NaiveDate, entries: &[MilkEntry]) -> DailySummary {
    DailySummary::new(date, Totals::of(entries.iter().filter(|e| e.date == date)))
}

/// Totals only, no breakdown
pub fn date_range_summary(start: NaiveDate, end: NaiveDate, entries: &[MilkEntry]) -> DateRangeSummary {
    let totals = Totals::of(entries.iter().filter(|e| in_range(e, start, end)));
    DateRangeSummary {
        start_date: start,
        end_date: end,
        total_liters: totals.liters,
        total_amount: totals.amount,
        entry_count: totals.count,
    }
}

/// Week window [window_start, window_end] whose breakdown stops at `breakdown_end`.
fn week_summary(
    window_start: NaiveDate,
    window_end: NaiveDate,
    breakdown_end: NaiveDate,
    entries: &[MilkEntry],
) -> WeeklySummary {
    let buckets = bucket_by_day(window_start, breakdown_end, entries);

    let mut totals = Totals::default();
    let daily_breakdown = buckets
        .into_iter()
        .map(|(date, day)| {
            totals.merge(&day);
            DailySummary::new(date, day)
        })
        .collect();

    WeeklySummary {
        start_date: window_start,
        end_date: window_end,
        daily_breakdown,
        total_liters: totals.liters,
        total_amount: totals.amount,
        entry_count: totals.count,
    }
}

/// Seven days from `start`, every day present even when empty
pub fn weekly_summary(start: NaiveDate, entries: &[MilkEntry]) -> WeeklySummary {
    let end = week_end(start);
    week_summary(start, end, end, entries)
}

/// Calendar month split into 7-day weeks starting on the 1st.
///
/// The last week keeps its full 7-day window in `end_date` but its breakdown
/// and totals stop at the end of the month.
pub fn monthly_summary(first: NaiveDate, entries: &[MilkEntry]) -> MonthlySummary {
    let last = month_end(first);
    let in_month: Vec<MilkEntry> = entries
        .iter()
        .filter(|e| in_range(e, first, last))
        .cloned()
        .collect();

    let mut totals = Totals::default();
    let weekly_breakdown: Vec<WeeklySummary> = first
        .iter_days()
        .step_by(WEEK_DAYS)
        .take_while(|d| *d <= last)
        .map(|week_start| {
            let window_end = week_end(week_start);
            let week = week_summary(week_start, window_end, window_end.min(last), &in_month);
            totals.liters = &totals.liters + &week.total_liters;
            totals.amount = &totals.amount + &week.total_amount;
            totals.count += week.entry_count;
            week
        })
        .collect();

    MonthlySummary {
        year: first.year(),
        month: first.month(),
        weekly_breakdown,
        total_liters: totals.liters,
        total_amount: totals.amount,
        entry_count: totals.count,
    }
}

/// First day of the month `back` months before `today`'s month, `None` past chrono's range
pub fn months_before(today: NaiveDate, back: u32) -> Option<NaiveDate> {
    today
        .with_day(1)?
        .checked_sub_months(chrono::Months::new(back))
}

/// Reads entries from the store and buckets them per dairy
#[derive(Clone)]
pub struct SummaryService {
    store: Arc<dyn DairyStore>,
}

impl SummaryService {
    pub fn new(store: Arc<dyn DairyStore>) -> Self {
        Self { store }
    }

    async fn entries_between(
        &self,
        dairy_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LedgerResult<Vec<MilkEntry>> {
        let entries = self
            .store
            .list_entries(dairy_id, &EntryFilter::between(start, end))
            .await?;
        tracing::debug!(%dairy_id, %start, %end, rows = entries.len(), "entries fetched for summary");
        Ok(entries)
    }

    pub async fn daily(&self, dairy_id: Uuid, date: NaiveDate) -> LedgerResult<DailySummary> {
        let entries = self.entries_between(dairy_id, date, date).await?;
        Ok(daily_summary(date, &entries))
    }

    pub async fn weekly(&self, dairy_id: Uuid, start: NaiveDate) -> LedgerResult<WeeklySummary> {
        let entries = self.entries_between(dairy_id, start, week_end(start)).await?;
        Ok(weekly_summary(start, &entries))
    }

    pub async fn monthly(&self, dairy_id: Uuid, year: i32, month: u32) -> LedgerResult<MonthlySummary> {
        let first = validation::month_start(year, month)?;
        let entries = self.entries_between(dairy_id, first, month_end(first)).await?;
        Ok(monthly_summary(first, &entries))
    }

    pub async fn date_range(
        &self,
        dairy_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LedgerResult<DateRangeSummary> {
        validation::validate_range(start, end)?;
        let entries = self.entries_between(dairy_id, start, end).await?;
        Ok(date_range_summary(start, end, &entries))
    }

    pub async fn summarize(&self, dairy_id: Uuid, scope: SummaryScope) -> LedgerResult<Summary> {
        Ok(match scope {
            SummaryScope::Day { date } => Summary::Day(self.daily(dairy_id, date).await?),
            SummaryScope::Week { start } => Summary::Week(self.weekly(dairy_id, start).await?),
            SummaryScope::Month { year, month } => {
                Summary::Month(self.monthly(dairy_id, year, month).await?)
            }
            SummaryScope::Range { start, end } => {
                Summary::Range(self.date_range(dairy_id, start, end).await?)
            }
        })
    }
}
