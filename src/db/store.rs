use crate::db::queries;
use crate::error::LedgerResult;
use crate::models::{
    Customer, CustomerFilter, Dairy, EntryChanges, EntryFilter, EntryWithCustomer, MilkEntry,
    NewCustomer,
    NewMilkEntry, NewProfile, Rate, SetRate, UpdateCustomer, UserProfile,
};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Data-access seam for the ledger.
///
/// Every tenant-scoped call names its dairy explicitly; implementations must
/// never return rows of another dairy. Customer reads only ever see active
/// rows. Update and delete calls report "nothing matched" as `None` / `false`
/// and leave the not-found decision to the caller.
#[async_trait]
pub trait DairyStore: Send + Sync {
    async fn insert_dairy(&self, name: &str, owner_id: Uuid) -> LedgerResult<Dairy>;
    async fn insert_profile(&self, profile: &NewProfile) -> LedgerResult<UserProfile>;
    async fn get_profile(&self, user_id: Uuid) -> LedgerResult<Option<UserProfile>>;

    async fn insert_customer(&self, dairy_id: Uuid, input: &NewCustomer) -> LedgerResult<Customer>;
    async fn get_customer(&self, dairy_id: Uuid, id: Uuid) -> LedgerResult<Option<Customer>>;
    async fn list_customers(
        &self,
        dairy_id: Uuid,
        filter: &CustomerFilter,
    ) -> LedgerResult<Vec<Customer>>;
    async fn update_customer(
        &self,
        dairy_id: Uuid,
        id: Uuid,
        changes: &UpdateCustomer,
    ) -> LedgerResult<Option<Customer>>;
    async fn soft_delete_customer(&self, dairy_id: Uuid, id: Uuid) -> LedgerResult<bool>;

    async fn upsert_rate(&self, dairy_id: Uuid, input: &SetRate) -> LedgerResult<Rate>;
    async fn find_rate(
        &self,
        dairy_id: Uuid,
        fat: &BigDecimal,
        snf: &BigDecimal,
    ) -> LedgerResult<Option<Rate>>;
    /// Ascending (fat, snf)
    async fn list_rates(&self, dairy_id: Uuid) -> LedgerResult<Vec<Rate>>;
    async fn delete_rate(&self, dairy_id: Uuid, id: Uuid) -> LedgerResult<bool>;

    async fn insert_entry(&self, dairy_id: Uuid, entry: &NewMilkEntry) -> LedgerResult<MilkEntry>;
    async fn get_entry(&self, dairy_id: Uuid, id: Uuid) -> LedgerResult<Option<MilkEntry>>;
    async fn update_entry(
        &self,
        dairy_id: Uuid,
        id: Uuid,
        changes: &EntryChanges,
    ) -> LedgerResult<Option<MilkEntry>>;
    async fn delete_entry(&self, dairy_id: Uuid, id: Uuid) -> LedgerResult<bool>;
    async fn list_entries(&self, dairy_id: Uuid, filter: &EntryFilter) -> LedgerResult<Vec<MilkEntry>>;
    async fn list_entries_with_customer(
        &self,
        dairy_id: Uuid,
        filter: &EntryFilter,
    ) -> LedgerResult<Vec<EntryWithCustomer>>;

    async fn ping(&self) -> LedgerResult<()>;
}

/// PostgreSQL store backed by the sqlx pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DairyStore for PgStore {
    async fn insert_dairy(&self, name: &str, owner_id: Uuid) -> LedgerResult<Dairy> {
        Ok(queries::insert_dairy(&self.pool, name, owner_id).await?)
    }

    async fn insert_profile(&self, profile: &NewProfile) -> LedgerResult<UserProfile> {
        Ok(queries::insert_profile(&self.pool, profile).await?)
    }

    async fn get_profile(&self, user_id: Uuid) -> LedgerResult<Option<UserProfile>> {
        Ok(queries::get_profile(&self.pool, user_id).await?)
    }

    async fn insert_customer(&self, dairy_id: Uuid, input: &NewCustomer) -> LedgerResult<Customer> {
        Ok(queries::insert_customer(&self.pool, dairy_id, input).await?)
    }

    async fn get_customer(&self, dairy_id: Uuid, id: Uuid) -> LedgerResult<Option<Customer>> {
        Ok(queries::get_customer(&self.pool, dairy_id, id).await?)
    }

    async fn list_customers(
        &self,
        dairy_id: Uuid,
        filter: &CustomerFilter,
    ) -> LedgerResult<Vec<Customer>> {
        Ok(queries::list_customers(&self.pool, dairy_id, filter).await?)
    }

    async fn update_customer(
        &self,
        dairy_id: Uuid,
        id: Uuid,
        changes: &UpdateCustomer,
    ) -> LedgerResult<Option<Customer>> {
        Ok(queries::update_customer(&self.pool, dairy_id, id, changes).await?)
    }

    async fn soft_delete_customer(&self, dairy_id: Uuid, id: Uuid) -> LedgerResult<bool> {
        Ok(queries::soft_delete_customer(&self.pool, dairy_id, id).await?)
    }

    async fn upsert_rate(&self, dairy_id: Uuid, input: &SetRate) -> LedgerResult<Rate> {
        Ok(queries::upsert_rate(&self.pool, dairy_id, input).await?)
    }

    async fn find_rate(
        &self,
        dairy_id: Uuid,
        fat: &BigDecimal,
        snf: &BigDecimal,
    ) -> LedgerResult<Option<Rate>> {
        Ok(queries::find_rate(&self.pool, dairy_id, fat, snf).await?)
    }

    async fn list_rates(&self, dairy_id: Uuid) -> LedgerResult<Vec<Rate>> {
        Ok(queries::list_rates(&self.pool, dairy_id).await?)
    }

    async fn delete_rate(&self, dairy_id: Uuid, id: Uuid) -> LedgerResult<bool> {
        Ok(queries::delete_rate(&self.pool, dairy_id, id).await?)
    }

    async fn insert_entry(&self, dairy_id: Uuid, entry: &NewMilkEntry) -> LedgerResult<MilkEntry> {
        Ok(queries::insert_entry(&self.pool, dairy_id, entry).await?)
    }

    async fn get_entry(&self, dairy_id: Uuid, id: Uuid) -> LedgerResult<Option<MilkEntry>> {
        Ok(queries::get_entry(&self.pool, dairy_id, id).await?)
    }

    async fn update_entry(
        &self,
        dairy_id: Uuid,
        id: Uuid,
        changes: &EntryChanges,
    ) -> LedgerResult<Option<MilkEntry>> {
        Ok(queries::update_entry(&self.pool, dairy_id, id, changes).await?)
    }

    async fn delete_entry(&self, dairy_id: Uuid, id: Uuid) -> LedgerResult<bool> {
        Ok(queries::delete_entry(&self.pool, dairy_id, id).await?)
    }

    async fn list_entries(&self, dairy_id: Uuid, filter: &EntryFilter) -> LedgerResult<Vec<MilkEntry>> {
        Ok(queries::list_entries(&self.pool, dairy_id, filter).await?)
    }

    async fn list_entries_with_customer(
        &self,
        dairy_id: Uuid,
        filter: &EntryFilter,
    ) -> LedgerResult<Vec<EntryWithCustomer>> {
        Ok(queries::list_entries_with_customer(&self.pool, dairy_id, filter).await?)
    }

    async fn ping(&self) -> LedgerResult<()> {
        Ok(queries::ping(&self.pool).await?)
    }
}
