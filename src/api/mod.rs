pub mod accounts;
pub mod context;
pub mod customers;
pub mod entries;
pub mod error;
pub mod handlers;
pub mod portal;
pub mod rates;
pub mod summary;

use crate::config::AppConfig;
use crate::db::DairyStore;
use crate::error::{FieldError, ValidationErrors};
use crate::service::{
    validation, AccountService, CustomerService, EntryService, PortalService, RateService,
    SummaryService,
};
use axum::{
    routing::{get, post, put},
    Router,
};
use chrono::NaiveDate;
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceBuilder;

pub use context::{ApiJson, ApiQuery};
pub use handlers::health_check;

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DairyStore>,
    pub config: Arc<AppConfig>,
    pub rates: Arc<RateService>,
    pub entries: Arc<EntryService>,
    pub customers: Arc<CustomerService>,
    pub summaries: Arc<SummaryService>,
    pub portal: Arc<PortalService>,
    pub accounts: Arc<AccountService>,
}

impl AppState {
    pub fn new(store: Arc<dyn DairyStore>, config: AppConfig) -> Self {
        let customers =
            CustomerService::new(store.clone()).with_search_limit(config.ledger.search_limit);
        Self {
            rates: Arc::new(RateService::new(store.clone())),
            entries: Arc::new(EntryService::new(store.clone())),
            customers: Arc::new(customers),
            summaries: Arc::new(SummaryService::new(store.clone())),
            portal: Arc::new(PortalService::new(store.clone())),
            accounts: Arc::new(AccountService::new(store.clone())),
            config: Arc::new(config),
            store,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let rate_routes = Router::new()
        .route("/api/rates", get(rates::list_rates).put(rates::set_rate))
        .route("/api/rates/resolve", get(rates::resolve_rate))
        .route("/api/rates/:id", axum::routing::delete(rates::delete_rate));

    let entry_routes = Router::new()
        .route("/api/entries", post(entries::record_entry).get(entries::list_entries))
        .route("/api/entries/export", get(entries::export_entries))
        .route(
            "/api/entries/:id",
            get(entries::get_entry)
                .patch(entries::update_entry)
                .delete(entries::delete_entry),
        );

    let customer_routes = Router::new()
        .route(
            "/api/customers",
            post(customers::create_customer).get(customers::list_customers),
        )
        .route("/api/customers/search", get(customers::search_customers))
        .route(
            "/api/customers/:id",
            get(customers::get_customer)
                .patch(customers::update_customer)
                .delete(customers::delete_customer),
        );

    let summary_routes = Router::new()
        .route("/api/summary/daily", get(summary::daily))
        .route("/api/summary/weekly", get(summary::weekly))
        .route("/api/summary/monthly", get(summary::monthly))
        .route("/api/summary/range", get(summary::range));

    let portal_routes = Router::new()
        .route("/api/portal/entries", get(portal::my_entries))
        .route("/api/portal/monthly", get(portal::monthly_entries))
        .route("/api/portal/monthly/summary", get(portal::monthly_summary))
        .route("/api/portal/history", get(portal::history));

    let account_routes = Router::new()
        .route("/api/accounts/owners", post(accounts::register_owner))
        .route("/api/accounts/customers", put(accounts::register_customer_login))
        .route("/api/accounts/:user_id", get(accounts::get_profile));

    Router::new()
        .route("/health", get(health_check))
        .merge(rate_routes)
        .merge(entry_routes)
        .merge(customer_routes)
        .merge(summary_routes)
        .merge(portal_routes)
        .merge(account_routes)
        .layer(ServiceBuilder::new())
        .with_state(state)
}

/// Parse a `YYYY-MM-DD` query value, reporting `INVALID_DATE` against `field`
pub(crate) fn query_date(field: &'static str, raw: &str) -> Result<NaiveDate, ValidationErrors> {
    validation::parse_date(raw).ok_or_else(|| {
        let mut errors = ValidationErrors::default();
        errors.push(FieldError::new(
            field,
            validation::codes::INVALID_DATE,
            format!("{} must be a date in YYYY-MM-DD format", field),
        ));
        errors
    })
}

/// Required query value
pub(crate) fn required<'a>(
    field: &'static str,
    value: &'a Option<String>,
) -> Result<&'a str, ValidationErrors> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => {
            let mut errors = ValidationErrors::default();
            errors.push(FieldError::new(
                field,
                validation::codes::REQUIRED,
                format!("{} is required", field),
            ));
            Err(errors)
        }
    }
}

/// Parse a whole-number query value, reporting `INVALID_TYPE` against `field`
pub(crate) fn query_number<T: FromStr>(field: &'static str, raw: &str) -> Result<T, ValidationErrors> {
    raw.trim().parse().map_err(|_| {
        let mut errors = ValidationErrors::default();
        errors.push(FieldError::new(
            field,
            validation::codes::INVALID_TYPE,
            format!("{} must be a whole number", field),
        ));
        errors
    })
}
