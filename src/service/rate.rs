use crate::db::DairyStore;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Rate, ResolvedRate, SetRate};
use crate::service::{amount, validation};
use bigdecimal::{BigDecimal, Zero};
use std::sync::Arc;
use uuid::Uuid;

/// Nearest grid point by |Δfat| + |Δsnf|.
///
/// Rates are scanned in ascending (fat, snf) order and only a strictly smaller
/// distance replaces the current pick, so ties resolve to the first point in
/// that order. An exact grid point always wins with distance zero.
/// Returns `None` only for an empty table.
pub fn nearest_rate(rates: &[Rate], fat: &BigDecimal, snf: &BigDecimal) -> Option<ResolvedRate> {
    let mut ordered: Vec<&Rate> = rates.iter().collect();
    ordered.sort_by(|a, b| a.fat.cmp(&b.fat).then_with(|| a.snf.cmp(&b.snf)));

    let mut best: Option<(&Rate, BigDecimal)> = None;
    for rate in ordered {
        let distance = (&rate.fat - fat).abs() + (&rate.snf - snf).abs();
        let closer = match &best {
            Some((_, min)) => distance < *min,
            None => true,
        };
        if closer {
            best = Some((rate, distance));
        }
    }

    best.map(|(rate, distance)| ResolvedRate {
        rate_per_liter: rate.rate_per_liter.clone(),
        is_exact: distance.is_zero(),
        fat: rate.fat.clone(),
        snf: rate.snf.clone(),
        distance,
    })
}

/// Rate table maintenance and price resolution for one store
#[derive(Clone)]
pub struct RateService {
    store: Arc<dyn DairyStore>,
}

impl RateService {
    pub fn new(store: Arc<dyn DairyStore>) -> Self {
        Self { store }
    }

    /// Insert or overwrite the price for a (fat, snf) point
    pub async fn set_rate(&self, dairy_id: Uuid, input: &SetRate) -> LedgerResult<Rate> {
        validation::validate_rate(input)?;
        let rate = self.store.upsert_rate(dairy_id, input).await?;
        tracing::info!(
            %dairy_id,
            fat = %rate.fat,
            snf = %rate.snf,
            rate_per_liter = %rate.rate_per_liter,
            "rate saved"
        );
        Ok(rate)
    }

    pub async fn list_rates(&self, dairy_id: Uuid) -> LedgerResult<Vec<Rate>> {
        self.store.list_rates(dairy_id).await
    }

    pub async fn delete_rate(&self, dairy_id: Uuid, id: Uuid) -> LedgerResult<()> {
        if !self.store.delete_rate(dairy_id, id).await? {
            return Err(LedgerError::not_found("rate", id));
        }
        tracing::info!(%dairy_id, rate_id = %id, "rate deleted");
        Ok(())
    }

    /// Exact match first, nearest neighbour otherwise. `None` means the dairy has no rates.
    pub async fn resolve(
        &self,
        dairy_id: Uuid,
        fat: &BigDecimal,
        snf: &BigDecimal,
    ) -> LedgerResult<Option<ResolvedRate>> {
        if let Some(rate) = self.store.find_rate(dairy_id, fat, snf).await? {
            return Ok(Some(ResolvedRate {
                rate_per_liter: rate.rate_per_liter,
                is_exact: true,
                fat: rate.fat,
                snf: rate.snf,
                distance: BigDecimal::zero(),
            }));
        }

        let rates = self.store.list_rates(dairy_id).await?;
        let resolved = nearest_rate(&rates, fat, snf);
        match &resolved {
            Some(r) => tracing::warn!(
                %dairy_id,
                requested_fat = %fat,
                requested_snf = %snf,
                used_fat = %r.fat,
                used_snf = %r.snf,
                distance = %r.distance,
                "no exact rate, using nearest"
            ),
            None => tracing::debug!(%dairy_id, "rate table is empty"),
        }
        Ok(resolved)
    }

    /// Rounded amount for a delivery, with the rate that priced it
    pub async fn calculate_amount(
        &self,
        dairy_id: Uuid,
        fat: &BigDecimal,
        snf: &BigDecimal,
        liters: &BigDecimal,
    ) -> LedgerResult<(BigDecimal, ResolvedRate)> {
        let resolved = self
            .resolve(dairy_id, fat, snf)
            .await?
            .ok_or_else(|| LedgerError::NoRateConfigured {
                fat: fat.clone(),
                snf: snf.clone(),
            })?;
        let amount = amount::line_amount(&resolved.rate_per_liter, liters);
        Ok((amount, resolved))
    }
}
