use crate::api::error::ErrorResponse;
use crate::error::{FieldError, LedgerError, ValidationErrors};
use crate::models::PortalIdentity;
use crate::service::validation::codes;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

pub const DAIRY_HEADER: &str = "x-dairy-id";
pub const CUSTOMER_HEADER: &str = "x-customer-id";

/// Missing or malformed identity header
#[derive(Debug)]
pub struct HeaderRejection {
    header: &'static str,
}

impl IntoResponse for HeaderRejection {
    fn into_response(self) -> Response {
        let body = ErrorResponse::new(
            "BAD_REQUEST",
            format!("Header {} must carry a UUID", self.header),
        );
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

fn uuid_header(parts: &Parts, header: &'static str) -> Result<Uuid, HeaderRejection> {
    parts
        .headers
        .get(header)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .ok_or(HeaderRejection { header })
}

/// Dairy the request acts on. Resolving it from a session is the auth layer's job.
#[derive(Debug, Clone, Copy)]
pub struct Tenant(pub Uuid);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Tenant {
    type Rejection = HeaderRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        uuid_header(parts, DAIRY_HEADER).map(Tenant)
    }
}

/// Dairy + customer for portal requests
#[derive(Debug, Clone, Copy)]
pub struct Portal(pub PortalIdentity);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Portal {
    type Rejection = HeaderRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Portal(PortalIdentity {
            dairy_id: uuid_header(parts, DAIRY_HEADER)?,
            customer_id: uuid_header(parts, CUSTOMER_HEADER)?,
        }))
    }
}

fn malformed(field: &'static str, detail: String) -> LedgerError {
    let mut errors = ValidationErrors::default();
    errors.push(FieldError::new(field, codes::INVALID_TYPE, detail));
    errors.into()
}

/// JSON body; a rejection is reported as a validation error on `body`
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = LedgerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(malformed("body", rejection.body_text())),
        }
    }
}

/// Query string; a rejection is reported as a validation error on `query`
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = LedgerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(rejection) => Err(malformed("query", rejection.body_text())),
        }
    }
}
