use crate::db::DairyStore;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Customer, CustomerFilter, NewCustomer, UpdateCustomer};
use crate::service::validation;
use std::sync::Arc;
use uuid::Uuid;

/// Default page cap for name search
pub const DEFAULT_SEARCH_LIMIT: i64 = 20;

/// Customer directory. Deleted customers are invisible to every read here.
#[derive(Clone)]
pub struct CustomerService {
    store: Arc<dyn DairyStore>,
    search_limit: i64,
}

fn clean_optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl CustomerService {
    pub fn new(store: Arc<dyn DairyStore>) -> Self {
        Self {
            store,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    pub fn with_search_limit(mut self, limit: i64) -> Self {
        self.search_limit = limit;
        self
    }

    pub async fn create(&self, dairy_id: Uuid, input: &NewCustomer) -> LedgerResult<Customer> {
        let name = validation::validate_customer_name(&input.name)?;
        let input = NewCustomer {
            name,
            phone: clean_optional(&input.phone),
            address: clean_optional(&input.address),
        };
        let customer = self.store.insert_customer(dairy_id, &input).await?;
        tracing::info!(%dairy_id, customer_id = %customer.id, "customer created");
        Ok(customer)
    }

    pub async fn get(&self, dairy_id: Uuid, id: Uuid) -> LedgerResult<Customer> {
        self.store
            .get_customer(dairy_id, id)
            .await?
            .ok_or_else(|| LedgerError::not_found("customer", id))
    }

    pub async fn list(&self, dairy_id: Uuid, filter: &CustomerFilter) -> LedgerResult<Vec<Customer>> {
        self.store.list_customers(dairy_id, filter).await
    }

    pub async fn search(&self, dairy_id: Uuid, query: &str) -> LedgerResult<Vec<Customer>> {
        let filter = CustomerFilter {
            search: Some(query.to_string()),
            limit: Some(self.search_limit),
            offset: None,
        };
        self.store.list_customers(dairy_id, &filter).await
    }

    pub async fn update(
        &self,
        dairy_id: Uuid,
        id: Uuid,
        changes: &UpdateCustomer,
    ) -> LedgerResult<Customer> {
        let name = match &changes.name {
            Some(name) => Some(validation::validate_customer_name(name)?),
            None => None,
        };
        let changes = UpdateCustomer {
            name,
            phone: changes.phone.as_ref().map(|p| p.trim().to_string()),
            address: changes.address.as_ref().map(|a| a.trim().to_string()),
        };
        let customer = self
            .store
            .update_customer(dairy_id, id, &changes)
            .await?
            .ok_or_else(|| LedgerError::not_found("customer", id))?;
        tracing::info!(%dairy_id, customer_id = %id, "customer updated");
        Ok(customer)
    }

    /// Soft delete; the row and its entries stay in the store
    pub async fn delete(&self, dairy_id: Uuid, id: Uuid) -> LedgerResult<()> {
        if !self.store.soft_delete_customer(dairy_id, id).await? {
            return Err(LedgerError::not_found("customer", id));
        }
        tracing::info!(%dairy_id, customer_id = %id, "customer deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::CustomerStatus;

    async fn setup() -> (Arc<MemoryStore>, CustomerService, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let dairy = store.insert_dairy("Suresh Dairy", Uuid::new_v4()).await.unwrap();
        let service = CustomerService::new(store.clone()).with_search_limit(2);
        (store, service, dairy.id)
    }

    fn named(name: &str) -> NewCustomer {
        NewCustomer {
            name: name.to_string(),
            phone: Some(" 9876543210 ".to_string()),
            address: Some("   ".to_string()),
        }
    }

    #[tokio::test]
    async fn create_trims_and_drops_blank_fields() {
        let (_, service, dairy_id) = setup().await;
        let customer = service.create(dairy_id, &named("  Rajesh Kumar ")).await.unwrap();
        assert_eq!(customer.name, "Rajesh Kumar");
        assert_eq!(customer.phone.as_deref(), Some("9876543210"));
        assert_eq!(customer.address, None);
        assert_eq!(customer.status, CustomerStatus::Active);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let (_, service, dairy_id) = setup().await;
        let err = service.create(dairy_id, &named(" ")).await.unwrap_err();
        assert!(matches!(err, LedgerError::Validation(e) if e.has_code("name", "INVALID_CUSTOMER_NAME")));
    }

    #[tokio::test]
    async fn soft_deleted_customers_disappear_from_reads() {
        let (store, service, dairy_id) = setup().await;
        let rajesh = service.create(dairy_id, &named("Rajesh Kumar")).await.unwrap();
        service.create(dairy_id, &named("Priya Sharma")).await.unwrap();

        service.delete(dairy_id, rajesh.id).await.unwrap();

        let all = service.list(dairy_id, &CustomerFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Priya Sharma");
        assert!(service.search(dairy_id, "rajesh").await.unwrap().is_empty());
        assert!(matches!(
            service.get(dairy_id, rajesh.id).await,
            Err(LedgerError::NotFound { entity: "customer", .. })
        ));

        // row is still there, only flagged
        assert_eq!(store.customer_row(rajesh.id).unwrap().status, CustomerStatus::Deleted);

        // second delete and updates fail instead of silently succeeding
        assert!(service.delete(dairy_id, rajesh.id).await.is_err());
        assert!(service
            .update(dairy_id, rajesh.id, &UpdateCustomer { name: Some("R".into()), ..Default::default() })
            .await
            .is_err());
    }

    #[tokio::test]
    async fn search_is_case_insensitive_sorted_and_capped() {
        let (_, service, dairy_id) = setup().await;
        for name in ["Suresh Patel", "Ramesh Patel", "Mahesh Patel", "Priya Sharma"] {
            service.create(dairy_id, &named(name)).await.unwrap();
        }

        let found = service.search(dairy_id, "PATEL").await.unwrap();
        let names: Vec<&str> = found.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Mahesh Patel", "Ramesh Patel"]);

        let page = service
            .list(
                dairy_id,
                &CustomerFilter { search: None, limit: Some(2), offset: Some(2) },
            )
            .await
            .unwrap();
        let names: Vec<&str> = page.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ramesh Patel", "Suresh Patel"]);
    }

    #[tokio::test]
    async fn update_keeps_absent_fields() {
        let (_, service, dairy_id) = setup().await;
        let customer = service.create(dairy_id, &named("Priya Sharma")).await.unwrap();
        let updated = service
            .update(
                dairy_id,
                customer.id,
                &UpdateCustomer { address: Some("Main Street, Town".into()), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Priya Sharma");
        assert_eq!(updated.phone.as_deref(), Some("9876543210"));
        assert_eq!(updated.address.as_deref(), Some("Main Street, Town"));
    }
}
