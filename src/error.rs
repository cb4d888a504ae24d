use bigdecimal::BigDecimal;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub code: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            code,
            message: message.into(),
        }
    }
}

/// All field errors collected for a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> Vec<&'static str> {
        self.0.iter().map(|e| e.field).collect()
    }

    pub fn has_code(&self, field: &str, code: &str) -> bool {
        self.0.iter().any(|e| e.field == field && e.code == code)
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join(", "))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Malformed or out-of-range input.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Well-formed input, but the dairy has no rates at all.
    #[error("No rate configured for FAT {fat} / SNF {snf}")]
    NoRateConfigured { fat: BigDecimal, snf: BigDecimal },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failure reported by a non-SQL store, carrying the store's message.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Export error: {0}")]
    Export(#[from] csv::Error),
}

impl From<ValidationErrors> for LedgerError {
    fn from(errors: ValidationErrors) -> Self {
        LedgerError::Validation(errors)
    }
}

impl LedgerError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        LedgerError::NotFound { entity, id }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
