use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Price per liter for one (fat, snf) grid point (rates)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Rate {
    pub id: Uuid,
    pub dairy_id: Uuid,
    pub fat: BigDecimal,
    pub snf: BigDecimal,
    pub rate_per_liter: BigDecimal,
    pub created_at: DateTime<Utc>,
}

/// Upsert payload, keyed by (dairy, fat, snf)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRate {
    pub fat: BigDecimal,
    pub snf: BigDecimal,
    pub rate_per_liter: BigDecimal,
}

/// Outcome of a rate lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRate {
    pub rate_per_liter: BigDecimal,
    pub is_exact: bool,
    /// Grid point actually used
    pub fat: BigDecimal,
    pub snf: BigDecimal,
    /// |fat - requested fat| + |snf - requested snf|
    pub distance: BigDecimal,
}
