use crate::db::DairyStore;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    Customer, CustomerFilter, CustomerStatus, Dairy, EntryChanges, EntryFilter, EntryOrder,
    EntryWithCustomer, MilkEntry, NewCustomer, NewMilkEntry, NewProfile, Rate, SetRate, UpdateCustomer, UserProfile,
};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

/// In-process store with the same filtering and ordering rules as [`PgStore`].
///
/// Used by tests and by local runs without `DATABASE_URL`. Key and foreign-key
/// violations are reported as [`LedgerError::Store`] the way the database
/// would reject them.
///
/// [`PgStore`]: crate::db::PgStore
#[derive(Default)]
pub struct MemoryStore {
    dairies: DashMap<Uuid, Dairy>,
    profiles: DashMap<Uuid, UserProfile>,
    customers: DashMap<Uuid, Customer>,
    rates: DashMap<Uuid, Rate>,
    entries: DashMap<Uuid, MilkEntry>,
    /// Per-dairy guard held for the whole find-then-insert of a rate upsert
    rate_writers: DashMap<Uuid, ()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every dairy row, including ones left without an owner profile
    pub fn dairies(&self) -> Vec<Dairy> {
        self.dairies.iter().map(|d| d.value().clone()).collect()
    }

    /// Raw customer row regardless of status
    pub fn customer_row(&self, id: Uuid) -> Option<Customer> {
        self.customers.get(&id).map(|c| c.value().clone())
    }

    fn require_dairy(&self, dairy_id: Uuid) -> LedgerResult<()> {
        if self.dairies.contains_key(&dairy_id) {
            Ok(())
        } else {
            Err(LedgerError::Store(format!(
                "foreign key violation: dairy {dairy_id} does not exist"
            )))
        }
    }
}

#[async_trait]
impl DairyStore for MemoryStore {
    async fn insert_dairy(&self, name: &str, owner_id: Uuid) -> LedgerResult<Dairy> {
        let dairy = Dairy {
            id: Uuid::new_v4(),
            name: name.to_string(),
            owner_id,
            created_at: Utc::now(),
        };
        self.dairies.insert(dairy.id, dairy.clone());
        Ok(dairy)
    }

    async fn insert_profile(&self, profile: &NewProfile) -> LedgerResult<UserProfile> {
        self.require_dairy(profile.dairy_id)?;
        if self.profiles.contains_key(&profile.user_id) {
            return Err(LedgerError::Store(format!(
                "duplicate key value violates unique constraint \"users_pkey\" ({})",
                profile.user_id
            )));
        }
        let row = UserProfile {
            id: profile.user_id,
            dairy_id: profile.dairy_id,
            role: profile.role,
            customer_id: profile.customer_id,
            created_at: Utc::now(),
        };
        self.profiles.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_profile(&self, user_id: Uuid) -> LedgerResult<Option<UserProfile>> {
        Ok(self.profiles.get(&user_id).map(|p| p.value().clone()))
    }

    async fn insert_customer(&self, dairy_id: Uuid, input: &NewCustomer) -> LedgerResult<Customer> {
        self.require_dairy(dairy_id)?;
        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4(),
            dairy_id,
            name: input.name.clone(),
            phone: input.phone.clone(),
            address: input.address.clone(),
            status: CustomerStatus::Active,
            created_at: now,
            updated_at: now,
        };
        self.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn get_customer(&self, dairy_id: Uuid, id: Uuid) -> LedgerResult<Option<Customer>> {
        Ok(self
            .customers
            .get(&id)
            .filter(|c| c.dairy_id == dairy_id && c.status == CustomerStatus::Active)
            .map(|c| c.value().clone()))
    }

    async fn list_customers(
        &self,
        dairy_id: Uuid,
        filter: &CustomerFilter,
    ) -> LedgerResult<Vec<Customer>> {
        let needle = filter
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut rows: Vec<Customer> = self
            .customers
            .iter()
            .filter(|c| c.dairy_id == dairy_id && c.status == CustomerStatus::Active)
            .filter(|c| {
                needle
                    .as_deref()
                    .map_or(true, |n| c.name.to_lowercase().contains(n))
            })
            .map(|c| c.value().clone())
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));

        let offset = filter.offset.unwrap_or(0).max(0) as usize;
        let rows = rows.into_iter().skip(offset);
        Ok(match filter.limit {
            Some(limit) => rows.take(limit.max(0) as usize).collect(),
            None => rows.collect(),
        })
    }

    async fn update_customer(
        &self,
        dairy_id: Uuid,
        id: Uuid,
        changes: &UpdateCustomer,
    ) -> LedgerResult<Option<Customer>> {
        let Some(mut row) = self.customers.get_mut(&id) else {
            return Ok(None);
        };
        if row.dairy_id != dairy_id || row.status != CustomerStatus::Active {
            return Ok(None);
        }
        if let Some(name) = &changes.name {
            row.name = name.clone();
        }
        if let Some(phone) = &changes.phone {
            row.phone = Some(phone.clone());
        }
        if let Some(address) = &changes.address {
            row.address = Some(address.clone());
        }
        row.updated_at = Utc::now();
        Ok(Some(row.value().clone()))
    }

    async fn soft_delete_customer(&self, dairy_id: Uuid, id: Uuid) -> LedgerResult<bool> {
        let Some(mut row) = self.customers.get_mut(&id) else {
            return Ok(false);
        };
        if row.dairy_id != dairy_id || row.status != CustomerStatus::Active {
            return Ok(false);
        }
        row.status = CustomerStatus::Deleted;
        row.updated_at = Utc::now();
        Ok(true)
    }

    async fn upsert_rate(&self, dairy_id: Uuid, input: &SetRate) -> LedgerResult<Rate> {
        self.require_dairy(dairy_id)?;
        let _writer = self.rate_writers.entry(dairy_id).or_default();
        let existing = self
            .rates
            .iter()
            .find(|r| r.dairy_id == dairy_id && r.fat == input.fat && r.snf == input.snf)
            .map(|r| r.id);

        if let Some(id) = existing {
            if let Some(mut row) = self.rates.get_mut(&id) {
                row.rate_per_liter = input.rate_per_liter.clone();
                return Ok(row.value().clone());
            }
        }

        let rate = Rate {
            id: Uuid::new_v4(),
            dairy_id,
            fat: input.fat.clone(),
            snf: input.snf.clone(),
            rate_per_liter: input.rate_per_liter.clone(),
            created_at: Utc::now(),
        };
        self.rates.insert(rate.id, rate.clone());
        Ok(rate)
    }

    async fn find_rate(
        &self,
        dairy_id: Uuid,
        fat: &BigDecimal,
        snf: &BigDecimal,
    ) -> LedgerResult<Option<Rate>> {
        Ok(self
            .rates
            .iter()
            .find(|r| r.dairy_id == dairy_id && &r.fat == fat && &r.snf == snf)
            .map(|r| r.value().clone()))
    }

    async fn list_rates(&self, dairy_id: Uuid) -> LedgerResult<Vec<Rate>> {
        let mut rows: Vec<Rate> = self
            .rates
            .iter()
            .filter(|r| r.dairy_id == dairy_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| a.fat.cmp(&b.fat).then_with(|| a.snf.cmp(&b.snf)));
        Ok(rows)
    }

    async fn delete_rate(&self, dairy_id: Uuid, id: Uuid) -> LedgerResult<bool> {
        Ok(self
            .rates
            .remove_if(&id, |_, r| r.dairy_id == dairy_id)
            .is_some())
    }

    async fn insert_entry(&self, dairy_id: Uuid, entry: &NewMilkEntry) -> LedgerResult<MilkEntry> {
        self.require_dairy(dairy_id)?;
        let customer_known = self
            .customers
            .get(&entry.customer_id)
            .is_some_and(|c| c.dairy_id == dairy_id);
        if !customer_known {
            return Err(LedgerError::Store(format!(
                "foreign key violation: customer {} does not exist",
                entry.customer_id
            )));
        }

        let row = MilkEntry {
            id: Uuid::new_v4(),
            dairy_id,
            customer_id: entry.customer_id,
            date: entry.date,
            shift: entry.shift,
            fat: entry.fat.clone(),
            snf: entry.snf.clone(),
            liters: entry.liters.clone(),
            amount: entry.amount.clone(),
            created_at: Utc::now(),
        };
        self.entries.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_entry(&self, dairy_id: Uuid, id: Uuid) -> LedgerResult<Option<MilkEntry>> {
        Ok(self
            .entries
            .get(&id)
            .filter(|e| e.dairy_id == dairy_id)
            .map(|e| e.value().clone()))
    }

    async fn update_entry(
        &self,
        dairy_id: Uuid,
        id: Uuid,
        changes: &EntryChanges,
    ) -> LedgerResult<Option<MilkEntry>> {
        let Some(mut row) = self.entries.get_mut(&id) else {
            return Ok(None);
        };
        if row.dairy_id != dairy_id {
            return Ok(None);
        }
        row.shift = changes.shift;
        row.fat = changes.fat.clone();
        row.snf = changes.snf.clone();
        row.liters = changes.liters.clone();
        row.amount = changes.amount.clone();
        Ok(Some(row.value().clone()))
    }

    async fn delete_entry(&self, dairy_id: Uuid, id: Uuid) -> LedgerResult<bool> {
        Ok(self
            .entries
            .remove_if(&id, |_, e| e.dairy_id == dairy_id)
            .is_some())
    }

    async fn list_entries(&self, dairy_id: Uuid, filter: &EntryFilter) -> LedgerResult<Vec<MilkEntry>> {
        let mut rows: Vec<MilkEntry> = self
            .entries
            .iter()
            .filter(|e| e.dairy_id == dairy_id && filter.matches(e))
            .map(|e| e.value().clone())
            .collect();

        match filter.order {
            EntryOrder::Newest => rows.sort_by(|a, b| {
                b.date
                    .cmp(&a.date)
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
            EntryOrder::Oldest => rows.sort_by(|a, b| {
                a.date
                    .cmp(&b.date)
                    .then_with(|| a.created_at.cmp(&b.created_at))
            }),
        }

        if let Some(limit) = filter.limit {
            rows.truncate(limit.max(0) as usize);
        }
        Ok(rows)
    }

    async fn list_entries_with_customer(
        &self,
        dairy_id: Uuid,
        filter: &EntryFilter,
    ) -> LedgerResult<Vec<EntryWithCustomer>> {
        let rows = self.list_entries(dairy_id, filter).await?;
        Ok(rows
            .into_iter()
            .map(|entry| {
                let customer_name = self
                    .customers
                    .get(&entry.customer_id)
                    .filter(|c| c.dairy_id == dairy_id)
                    .map(|c| c.name.clone());
                EntryWithCustomer {
                    entry,
                    customer_name,
                }
            })
            .collect())
    }

    async fn ping(&self) -> LedgerResult<()> {
        Ok(())
    }
}
