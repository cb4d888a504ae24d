use crate::db::DairyStore;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    EntryChanges, EntryFilter, EntryOrder, EntryWithCustomer, MilkEntry, NewMilkEntry,
    RecordEntryInput, UpdateEntryInput,
};
use crate::service::{export, validation, RateService};
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

/// Records milk collections and keeps each amount consistent with the rate
/// table as it stood when the entry was last written.
#[derive(Clone)]
pub struct EntryService {
    store: Arc<dyn DairyStore>,
    rates: RateService,
}

impl EntryService {
    pub fn new(store: Arc<dyn DairyStore>) -> Self {
        let rates = RateService::new(store.clone());
        Self { store, rates }
    }

    /// Validate, price and persist one collection.
    ///
    /// Field errors are reported before the store is touched. A dairy without
    /// any rate yields [`LedgerError::NoRateConfigured`].
    pub async fn record_entry(&self, dairy_id: Uuid, input: &RecordEntryInput) -> LedgerResult<MilkEntry> {
        let valid = validation::validate_entry(input)?;

        if self.store.get_customer(dairy_id, valid.customer_id).await?.is_none() {
            return Err(LedgerError::not_found("customer", valid.customer_id));
        }

        let (amount, resolved) = self
            .rates
            .calculate_amount(dairy_id, &valid.fat, &valid.snf, &valid.liters)
            .await?;

        let entry = self
            .store
            .insert_entry(
                dairy_id,
                &NewMilkEntry {
                    customer_id: valid.customer_id,
                    date: valid.date,
                    shift: valid.shift,
                    fat: valid.fat,
                    snf: valid.snf,
                    liters: valid.liters,
                    amount,
                },
            )
            .await?;

        tracing::info!(
            %dairy_id,
            entry_id = %entry.id,
            customer_id = %entry.customer_id,
            date = %entry.date,
            liters = %entry.liters,
            amount = %entry.amount,
            rate = %resolved.rate_per_liter,
            exact_rate = resolved.is_exact,
            "milk entry recorded"
        );
        Ok(entry)
    }

    /// Merge the changes, re-resolve the rate and recompute the amount from scratch
    pub async fn update_entry(
        &self,
        dairy_id: Uuid,
        id: Uuid,
        input: &UpdateEntryInput,
    ) -> LedgerResult<MilkEntry> {
        let existing = self.get_entry(dairy_id, id).await?;

        let fat = input.fat.clone().unwrap_or(existing.fat);
        let snf = input.snf.clone().unwrap_or(existing.snf);
        let liters = input.liters.clone().unwrap_or(existing.liters);
        validation::validate_measurements(Some(&fat), Some(&snf), Some(&liters))?;

        let (amount, resolved) = self
            .rates
            .calculate_amount(dairy_id, &fat, &snf, &liters)
            .await?;

        let changes = EntryChanges {
            shift: input.shift.or(existing.shift),
            fat,
            snf,
            liters,
            amount,
        };
        let entry = self
            .store
            .update_entry(dairy_id, id, &changes)
            .await?
            .ok_or_else(|| LedgerError::not_found("milk entry", id))?;

        tracing::info!(
            %dairy_id,
            entry_id = %id,
            amount = %entry.amount,
            rate = %resolved.rate_per_liter,
            exact_rate = resolved.is_exact,
            "milk entry updated"
        );
        Ok(entry)
    }

    pub async fn get_entry(&self, dairy_id: Uuid, id: Uuid) -> LedgerResult<MilkEntry> {
        self.store
            .get_entry(dairy_id, id)
            .await?
            .ok_or_else(|| LedgerError::not_found("milk entry", id))
    }

    /// All entries of one day, newest first, with who delivered them
    pub async fn list_by_date(
        &self,
        dairy_id: Uuid,
        date: NaiveDate,
    ) -> LedgerResult<Vec<EntryWithCustomer>> {
        self.store
            .list_entries_with_customer(dairy_id, &EntryFilter::on(date))
            .await
    }

    /// One customer's entries by date descending, optionally within [start, end]
    pub async fn list_by_customer(
        &self,
        dairy_id: Uuid,
        customer_id: Uuid,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> LedgerResult<Vec<MilkEntry>> {
        let filter = match range {
            Some((start, end)) => {
                validation::validate_range(start, end)?;
                EntryFilter::between(start, end)
            }
            None => EntryFilter::default(),
        }
        .for_customer(customer_id);
        self.store.list_entries(dairy_id, &filter).await
    }

    pub async fn delete_entry(&self, dairy_id: Uuid, id: Uuid) -> LedgerResult<()> {
        if !self.store.delete_entry(dairy_id, id).await? {
            return Err(LedgerError::not_found("milk entry", id));
        }
        tracing::info!(%dairy_id, entry_id = %id, "milk entry deleted");
        Ok(())
    }

    /// CSV statement of [start, end] in ascending date order
    pub async fn export_csv(
        &self,
        dairy_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        customer_id: Option<Uuid>,
    ) -> LedgerResult<Vec<u8>> {
        validation::validate_range(start, end)?;
        let mut filter = EntryFilter::between(start, end).ordered(EntryOrder::Oldest);
        filter.customer_id = customer_id;

        let entries = self.store.list_entries(dairy_id, &filter).await?;
        let mut out = Vec::new();
        export::write_entries_csv(&entries, &mut out)?;
        tracing::info!(%dairy_id, %start, %end, rows = entries.len(), "entries exported");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{NewCustomer, SetRate, Shift};
    use crate::service::validation::codes;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    struct Fixture {
        service: EntryService,
        rates: RateService,
        dairy_id: Uuid,
        customer_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let dairy = store.insert_dairy("Suresh Dairy", Uuid::new_v4()).await.unwrap();
        let customer = store
            .insert_customer(dairy.id, &NewCustomer { name: "Rajesh Kumar".into(), ..Default::default() })
            .await
            .unwrap();
        Fixture {
            service: EntryService::new(store.clone()),
            rates: RateService::new(store),
            dairy_id: dairy.id,
            customer_id: customer.id,
        }
    }

    impl Fixture {
        async fn rate(&self, fat: &str, snf: &str, price: &str) {
            self.rates
                .set_rate(
                    self.dairy_id,
                    &SetRate { fat: dec(fat), snf: dec(snf), rate_per_liter: dec(price) },
                )
                .await
                .unwrap();
        }

        fn input(&self, date: &str, fat: &str, snf: &str, liters: &str) -> RecordEntryInput {
            RecordEntryInput {
                customer_id: self.customer_id.to_string(),
                date: date.to_string(),
                shift: Some(Shift::Morning),
                fat: Some(dec(fat)),
                snf: Some(dec(snf)),
                liters: Some(dec(liters)),
            }
        }
    }

    #[tokio::test]
    async fn amount_uses_nearest_rate() {
        let f = fixture().await;
        f.rate("3.5", "8.5", "45.00").await;
        f.rate("4.0", "8.5", "48.00").await;

        let entry = f
            .service
            .record_entry(f.dairy_id, &f.input("2024-03-15", "3.8", "8.5", "10.5"))
            .await
            .unwrap();
        assert_eq!(entry.amount, dec("504.00"));
        assert_eq!(entry.shift, Some(Shift::Morning));
    }

    #[tokio::test]
    async fn amount_rounds_half_away_from_zero() {
        let f = fixture().await;
        f.rate("4.0", "8.5", "45.00").await;
        let entry = f
            .service
            .record_entry(f.dairy_id, &f.input("2024-03-15", "4.0", "8.5", "10.555"))
            .await
            .unwrap();
        assert_eq!(entry.amount, dec("474.98"));
    }

    #[tokio::test]
    async fn empty_rate_table_is_not_a_field_error() {
        let f = fixture().await;
        let err = f
            .service
            .record_entry(f.dairy_id, &f.input("2024-03-15", "4.0", "8.5", "10"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NoRateConfigured { .. }));
    }

    #[tokio::test]
    async fn validation_runs_before_rate_lookup() {
        let f = fixture().await;
        let err = f
            .service
            .record_entry(f.dairy_id, &f.input("", "16", "8.5", "0"))
            .await
            .unwrap_err();
        match err {
            LedgerError::Validation(errors) => {
                assert!(errors.has_code("fat", codes::INVALID_FAT));
                assert!(errors.has_code("liters", codes::INVALID_LITERS));
                assert!(errors.has_code("date", codes::REQUIRED));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_customer_is_not_found() {
        let f = fixture().await;
        f.rate("4.0", "8.5", "48.00").await;
        let mut input = f.input("2024-03-15", "4.0", "8.5", "10");
        input.customer_id = Uuid::new_v4().to_string();
        let err = f.service.record_entry(f.dairy_id, &input).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { entity: "customer", .. }));
    }

    #[tokio::test]
    async fn amount_is_frozen_until_the_entry_is_rewritten() {
        let f = fixture().await;
        f.rate("4.0", "8.5", "48.00").await;
        let entry = f
            .service
            .record_entry(f.dairy_id, &f.input("2024-03-15", "4.0", "8.5", "10"))
            .await
            .unwrap();

        f.rate("4.0", "8.5", "50.00").await;
        let stored = f.service.get_entry(f.dairy_id, entry.id).await.unwrap();
        assert_eq!(stored.amount, dec("480.00"));

        // liters-only change still reprices with the current rate
        let updated = f
            .service
            .update_entry(
                f.dairy_id,
                entry.id,
                &UpdateEntryInput { liters: Some(dec("12")), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(updated.liters, dec("12"));
        assert_eq!(updated.amount, dec("600.00"));
        assert_eq!(updated.shift, Some(Shift::Morning));
    }

    #[tokio::test]
    async fn update_validates_merged_values() {
        let f = fixture().await;
        f.rate("4.0", "8.5", "48.00").await;
        let entry = f
            .service
            .record_entry(f.dairy_id, &f.input("2024-03-15", "4.0", "8.5", "10"))
            .await
            .unwrap();

        let err = f
            .service
            .update_entry(
                f.dairy_id,
                entry.id,
                &UpdateEntryInput { snf: Some(dec("20")), ..Default::default() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(e) if e.has_code("snf", codes::INVALID_SNF)));

        let err = f
            .service
            .update_entry(f.dairy_id, Uuid::new_v4(), &UpdateEntryInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));
    }

    #[tokio::test]
    async fn listing_and_export() {
        let f = fixture().await;
        f.rate("4.0", "8.5", "48.00").await;
        for date in ["2024-03-14", "2024-03-15", "2024-03-15", "2024-03-20"] {
            f.service
                .record_entry(f.dairy_id, &f.input(date, "4.0", "8.5", "10"))
                .await
                .unwrap();
        }
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        assert_eq!(f.service.list_by_date(f.dairy_id, day).await.unwrap().len(), 2);

        let all = f.service.list_by_customer(f.dairy_id, f.customer_id, None).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].date, NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());

        let ranged = f
            .service
            .list_by_customer(
                f.dairy_id,
                f.customer_id,
                Some((NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(), day)),
            )
            .await
            .unwrap();
        assert_eq!(ranged.len(), 3);

        let csv = f
            .service
            .export_csv(f.dairy_id, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), day, None)
            .await
            .unwrap();
        let text = String::from_utf8(csv).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("2024-03-14,morning,"));
    }

    #[tokio::test]
    async fn delete_is_not_silent() {
        let f = fixture().await;
        f.rate("4.0", "8.5", "48.00").await;
        let entry = f
            .service
            .record_entry(f.dairy_id, &f.input("2024-03-15", "4.0", "8.5", "10"))
            .await
            .unwrap();

        f.service.delete_entry(f.dairy_id, entry.id).await.unwrap();
        assert!(matches!(
            f.service.delete_entry(f.dairy_id, entry.id).await,
            Err(LedgerError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn update_without_rates_keeps_the_stored_amount() {
        let f = fixture().await;
        f.rate("4.0", "8.5", "48.00").await;
        let entry = f
            .service
            .record_entry(f.dairy_id, &f.input("2024-03-15", "4.0", "8.5", "10"))
            .await
            .unwrap();

        for rate in f.rates.list_rates(f.dairy_id).await.unwrap() {
            f.rates.delete_rate(f.dairy_id, rate.id).await.unwrap();
        }

        let err = f
            .service
            .update_entry(
                f.dairy_id,
                entry.id,
                &UpdateEntryInput { liters: Some(dec("12")), ..Default::default() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NoRateConfigured { .. }));

        let stored = f.service.get_entry(f.dairy_id, entry.id).await.unwrap();
        assert_eq!(stored.liters, dec("10"));
        assert_eq!(stored.amount, dec("480.00"));
    }

    #[tokio::test]
    async fn day_listing_names_the_customer() {
        let f = fixture().await;
        f.rate("4.0", "8.5", "48.00").await;
        f.service
            .record_entry(f.dairy_id, &f.input("2024-03-15", "4.0", "8.5", "10"))
            .await
            .unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let rows = f.service.list_by_date(f.dairy_id, day).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].customer_name.as_deref(), Some("Rajesh Kumar"));
        assert_eq!(rows[0].entry.customer_id, f.customer_id);
    }

    #[tokio::test]
    async fn oversized_liters_never_reach_pricing() {
        let f = fixture().await;
        f.rate("4.0", "8.5", "48.00").await;
        for liters in ["1e-50000000", "1e1000000", "0.0001"] {
            let err = f
                .service
                .record_entry(f.dairy_id, &f.input("2024-03-15", "4.0", "8.5", liters))
                .await
                .unwrap_err();
            assert!(
                matches!(&err, LedgerError::Validation(e) if e.has_code("liters", codes::INVALID_LITERS)),
                "{liters}: {err:?}"
            );
        }
    }
}
