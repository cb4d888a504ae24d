use crate::db::DairyStore;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{NewProfile, PortalIdentity, Role, UserProfile};
use crate::service::validation;
use std::sync::Arc;
use uuid::Uuid;

/// Tenant onboarding and principal → tenant mapping.
///
/// The authenticated principal id comes from the identity provider; this
/// service only maintains the `dairies` and `users` rows.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn DairyStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn DairyStore>) -> Self {
        Self { store }
    }

    /// Create the dairy, then the owner's profile.
    ///
    /// The two inserts are not atomic. If the profile insert fails, the dairy
    /// row stays behind without an owner profile and the error is returned.
    pub async fn register_owner(&self, user_id: Uuid, dairy_name: &str) -> LedgerResult<UserProfile> {
        let name = validation::validate_dairy_name(dairy_name)?;
        let dairy = self.store.insert_dairy(&name, user_id).await?;
        tracing::info!(dairy_id = %dairy.id, %user_id, "dairy created");

        let profile = NewProfile {
            user_id,
            dairy_id: dairy.id,
            role: Role::Owner,
            customer_id: None,
        };
        match self.store.insert_profile(&profile).await {
            Ok(profile) => {
                tracing::info!(dairy_id = %dairy.id, %user_id, "owner profile created");
                Ok(profile)
            }
            Err(e) => {
                tracing::error!(
                    dairy_id = %dairy.id,
                    %user_id,
                    error = %e,
                    "owner profile creation failed, dairy left without a profile"
                );
                Err(e)
            }
        }
    }

    /// Give a customer a portal login inside its dairy
    pub async fn register_customer_login(
        &self,
        dairy_id: Uuid,
        user_id: Uuid,
        customer_id: Uuid,
    ) -> LedgerResult<UserProfile> {
        if self.store.get_customer(dairy_id, customer_id).await?.is_none() {
            return Err(LedgerError::not_found("customer", customer_id));
        }
        let profile = self
            .store
            .insert_profile(&NewProfile {
                user_id,
                dairy_id,
                role: Role::Customer,
                customer_id: Some(customer_id),
            })
            .await?;
        tracing::info!(%dairy_id, %user_id, %customer_id, "customer login created");
        Ok(profile)
    }

    pub async fn profile(&self, user_id: Uuid) -> LedgerResult<UserProfile> {
        self.store
            .get_profile(user_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("user profile", user_id))
    }

    /// Tenant and customer for a portal session
    pub async fn portal_identity(&self, user_id: Uuid) -> LedgerResult<PortalIdentity> {
        let profile = self.profile(user_id).await?;
        match (profile.role, profile.customer_id) {
            (Role::Customer, Some(customer_id)) => Ok(PortalIdentity {
                dairy_id: profile.dairy_id,
                customer_id,
            }),
            _ => Err(LedgerError::Forbidden("Not a customer account".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::NewCustomer;

    #[tokio::test]
    async fn owner_registration_links_profile_to_new_dairy() {
        let store = Arc::new(MemoryStore::new());
        let accounts = AccountService::new(store.clone());
        let user_id = Uuid::new_v4();

        let profile = accounts.register_owner(user_id, " Suresh Dairy ").await.unwrap();
        assert_eq!(profile.id, user_id);
        assert_eq!(profile.role, Role::Owner);

        let dairies = store.dairies();
        assert_eq!(dairies.len(), 1);
        assert_eq!(dairies[0].name, "Suresh Dairy");
        assert_eq!(dairies[0].id, profile.dairy_id);
        assert_eq!(dairies[0].owner_id, user_id);
    }

    #[tokio::test]
    async fn failed_profile_insert_leaves_the_dairy_behind() {
        let store = Arc::new(MemoryStore::new());
        let accounts = AccountService::new(store.clone());
        let user_id = Uuid::new_v4();

        accounts.register_owner(user_id, "First Dairy").await.unwrap();
        let err = accounts.register_owner(user_id, "Second Dairy").await.unwrap_err();

        assert!(matches!(err, LedgerError::Store(_)));
        // no compensating delete: the second dairy is orphaned
        assert_eq!(store.dairies().len(), 2);
    }

    #[tokio::test]
    async fn blank_dairy_name_creates_nothing() {
        let store = Arc::new(MemoryStore::new());
        let accounts = AccountService::new(store.clone());
        assert!(matches!(
            accounts.register_owner(Uuid::new_v4(), "  ").await,
            Err(LedgerError::Validation(_))
        ));
        assert!(store.dairies().is_empty());
    }

    #[tokio::test]
    async fn portal_identity_requires_customer_profile() {
        let store = Arc::new(MemoryStore::new());
        let accounts = AccountService::new(store.clone());
        let owner_id = Uuid::new_v4();
        let owner = accounts.register_owner(owner_id, "Suresh Dairy").await.unwrap();

        assert!(matches!(
            accounts.portal_identity(owner_id).await,
            Err(LedgerError::Forbidden(_))
        ));
        assert!(matches!(
            accounts.portal_identity(Uuid::new_v4()).await,
            Err(LedgerError::NotFound { .. })
        ));

        let customer = store
            .insert_customer(owner.dairy_id, &NewCustomer { name: "Priya".into(), ..Default::default() })
            .await
            .unwrap();
        let login = Uuid::new_v4();
        accounts
            .register_customer_login(owner.dairy_id, login, customer.id)
            .await
            .unwrap();

        let who = accounts.portal_identity(login).await.unwrap();
        assert_eq!(who.dairy_id, owner.dairy_id);
        assert_eq!(who.customer_id, customer.id);
    }
}
