use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Collection shift (milk_shift)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "milk_shift", rename_all = "lowercase")]
pub enum Shift {
    Morning,
    Evening,
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shift::Morning => f.write_str("morning"),
            Shift::Evening => f.write_str("evening"),
        }
    }
}

/// One milk collection (milk_entries)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MilkEntry {
    pub id: Uuid,
    pub dairy_id: Uuid,
    pub customer_id: Uuid,
    pub date: NaiveDate,
    pub shift: Option<Shift>,
    pub fat: BigDecimal,
    pub snf: BigDecimal,
    pub liters: BigDecimal,
    /// Frozen at write time
    pub amount: BigDecimal,
    pub created_at: DateTime<Utc>,
}

/// Entry joined with the name of the customer who delivered it
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EntryWithCustomer {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub entry: MilkEntry,
    /// `None` only if the customer row is gone
    pub customer_name: Option<String>,
}

/// Raw entry request. Fields stay loose so every problem can be reported at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordEntryInput {
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub shift: Option<Shift>,
    pub fat: Option<BigDecimal>,
    pub snf: Option<BigDecimal>,
    pub liters: Option<BigDecimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEntryInput {
    pub fat: Option<BigDecimal>,
    pub snf: Option<BigDecimal>,
    pub liters: Option<BigDecimal>,
    pub shift: Option<Shift>,
}

/// Insert payload with the computed amount
#[derive(Debug, Clone)]
pub struct NewMilkEntry {
    pub customer_id: Uuid,
    pub date: NaiveDate,
    pub shift: Option<Shift>,
    pub fat: BigDecimal,
    pub snf: BigDecimal,
    pub liters: BigDecimal,
    pub amount: BigDecimal,
}

/// Full set of mutable columns written by an update
#[derive(Debug, Clone)]
pub struct EntryChanges {
    pub shift: Option<Shift>,
    pub fat: BigDecimal,
    pub snf: BigDecimal,
    pub liters: BigDecimal,
    pub amount: BigDecimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryOrder {
    /// date DESC, created_at DESC
    #[default]
    Newest,
    /// date ASC, created_at ASC
    Oldest,
}

/// Select filter over milk_entries. Date bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub customer_id: Option<Uuid>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub order: EntryOrder,
    pub limit: Option<i64>,
}

impl EntryFilter {
    pub fn on(date: NaiveDate) -> Self {
        Self::between(date, date)
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn for_customer(mut self, customer_id: Uuid) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn ordered(mut self, order: EntryOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// In-process equivalent of the SQL WHERE clause.
    pub fn matches(&self, entry: &MilkEntry) -> bool {
        self.customer_id.map_or(true, |c| entry.customer_id == c)
            && self.start.map_or(true, |s| entry.date >= s)
            && self.end.map_or(true, |e| entry.date <= e)
    }
}
