use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::MilkEntry;

/// Running sums over a set of entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Totals {
    pub liters: BigDecimal,
    pub amount: BigDecimal,
    pub count: i64,
}

impl Default for Totals {
    fn default() -> Self {
        Self {
            liters: BigDecimal::zero(),
            amount: BigDecimal::zero(),
            count: 0,
        }
    }
}

impl Totals {
    pub fn add(&mut self, entry: &MilkEntry) {
        self.liters = &self.liters + &entry.liters;
        self.amount = &self.amount + &entry.amount;
        self.count += 1;
    }

    pub fn merge(&mut self, other: &Totals) {
        self.liters = &self.liters + &other.liters;
        self.amount = &self.amount + &other.amount;
        self.count += other.count;
    }

    pub fn of<'a>(entries: impl IntoIterator<Item = &'a MilkEntry>) -> Self {
        let mut totals = Totals::default();
        for entry in entries {
            totals.add(entry);
        }
        totals
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_liters: BigDecimal,
    pub total_amount: BigDecimal,
    pub entry_count: i64,
}

impl DailySummary {
    pub fn new(date: NaiveDate, totals: Totals) -> Self {
        Self {
            date,
            total_liters: totals.liters,
            total_amount: totals.amount,
            entry_count: totals.count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub daily_breakdown: Vec<DailySummary>,
    pub total_liters: BigDecimal,
    pub total_amount: BigDecimal,
    pub entry_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub weekly_breakdown: Vec<WeeklySummary>,
    pub total_liters: BigDecimal,
    pub total_amount: BigDecimal,
    pub entry_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRangeSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_liters: BigDecimal,
    pub total_amount: BigDecimal,
    pub entry_count: i64,
}

/// What to summarize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SummaryScope {
    Day { date: NaiveDate },
    Week { start: NaiveDate },
    Month { year: i32, month: u32 },
    Range { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Summary {
    Day(DailySummary),
    Week(WeeklySummary),
    Month(MonthlySummary),
    Range(DateRangeSummary),
}

impl Summary {
    pub fn total_liters(&self) -> &BigDecimal {
        match self {
            Summary::Day(s) => &s.total_liters,
            Summary::Week(s) => &s.total_liters,
            Summary::Month(s) => &s.total_liters,
            Summary::Range(s) => &s.total_liters,
        }
    }

    pub fn total_amount(&self) -> &BigDecimal {
        match self {
            Summary::Day(s) => &s.total_amount,
            Summary::Week(s) => &s.total_amount,
            Summary::Month(s) => &s.total_amount,
            Summary::Range(s) => &s.total_amount,
        }
    }

    pub fn entry_count(&self) -> i64 {
        match self {
            Summary::Day(s) => s.entry_count,
            Summary::Week(s) => s.entry_count,
            Summary::Month(s) => s.entry_count,
            Summary::Range(s) => s.entry_count,
        }
    }
}
