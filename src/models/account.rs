use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Tenant (dairies)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Dairy {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Owner,
    Customer,
}

/// Maps an authenticated principal to its dairy (users)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub dairy_id: Uuid,
    pub role: Role,
    pub customer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub user_id: Uuid,
    pub dairy_id: Uuid,
    pub role: Role,
    pub customer_id: Option<Uuid>,
}

/// Tenant and customer a portal session acts as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortalIdentity {
    pub dairy_id: Uuid,
    pub customer_id: Uuid,
}
