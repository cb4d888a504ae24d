use crate::db::DairyStore;
use crate::error::{FieldError, LedgerResult, ValidationErrors};
use crate::models::{DateRangeSummary, EntryFilter, MilkEntry, PortalIdentity};
use crate::service::aggregator::{self, month_end, months_before};
use crate::service::validation;
use chrono::{Datelike, NaiveDate};
use futures::future::try_join_all;
use std::sync::Arc;

pub const DEFAULT_ENTRIES_LIMIT: i64 = 50;
pub const DEFAULT_HISTORY_MONTHS: u32 = 6;
/// Longest history a single request may ask for
pub const MAX_HISTORY_MONTHS: u32 = 120;

/// Read-only view of one customer's own deliveries
#[derive(Clone)]
pub struct PortalService {
    store: Arc<dyn DairyStore>,
}

impl PortalService {
    pub fn new(store: Arc<dyn DairyStore>) -> Self {
        Self { store }
    }

    fn filter(who: PortalIdentity, start: NaiveDate, end: NaiveDate) -> EntryFilter {
        EntryFilter::between(start, end).for_customer(who.customer_id)
    }

    /// Most recent entries first
    pub async fn list_my_entries(&self, who: PortalIdentity, limit: i64) -> LedgerResult<Vec<MilkEntry>> {
        let filter = EntryFilter::default()
            .for_customer(who.customer_id)
            .limit(limit.max(0));
        self.store.list_entries(who.dairy_id, &filter).await
    }

    pub async fn monthly_entries(
        &self,
        who: PortalIdentity,
        year: i32,
        month: u32,
    ) -> LedgerResult<Vec<MilkEntry>> {
        let first = validation::month_start(year, month)?;
        self.store
            .list_entries(who.dairy_id, &Self::filter(who, first, month_end(first)))
            .await
    }

    pub async fn monthly_summary(
        &self,
        who: PortalIdentity,
        year: i32,
        month: u32,
    ) -> LedgerResult<DateRangeSummary> {
        let first = validation::month_start(year, month)?;
        self.month_totals(who, first).await
    }

    async fn month_totals(&self, who: PortalIdentity, first: NaiveDate) -> LedgerResult<DateRangeSummary> {
        let last = month_end(first);
        let entries = self
            .store
            .list_entries(who.dairy_id, &Self::filter(who, first, last))
            .await?;
        Ok(aggregator::date_range_summary(first, last, &entries))
    }

    /// One summary per calendar month, `today`'s month first
    pub async fn historical_summaries(
        &self,
        who: PortalIdentity,
        today: NaiveDate,
        months_back: u32,
    ) -> LedgerResult<Vec<DateRangeSummary>> {
        if !(1..=MAX_HISTORY_MONTHS).contains(&months_back) {
            return Err(history_error(format!(
                "Months must be between 1 and {}",
                MAX_HISTORY_MONTHS
            ))
            .into());
        }
        let months = (0..months_back)
            .map(|i| months_before(today, i))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| history_error("History reaches past the supported calendar".to_string()))?;

        let summaries =
            try_join_all(months.into_iter().map(|first| self.month_totals(who, first))).await?;
        tracing::debug!(
            customer_id = %who.customer_id,
            months = summaries.len(),
            from = %today.with_day(1).unwrap_or(today),
            "portal history built"
        );
        Ok(summaries)
    }
}

fn history_error(message: String) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    errors.push(FieldError::new("months", validation::codes::INVALID_RANGE, message));
    errors
}
