//! Input checks shared by the services.
//!
//! Each check collects every problem it finds instead of stopping at the
//! first one, so a form can highlight all bad fields in one round trip.

use crate::error::{FieldError, ValidationErrors};
use crate::models::{RecordEntryInput, SetRate, Shift};
use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use uuid::Uuid;

pub mod codes {
    pub const REQUIRED: &str = "REQUIRED";
    pub const INVALID_TYPE: &str = "INVALID_TYPE";
    pub const INVALID_FAT: &str = "INVALID_FAT";
    pub const INVALID_SNF: &str = "INVALID_SNF";
    pub const INVALID_LITERS: &str = "INVALID_LITERS";
    pub const INVALID_DATE: &str = "INVALID_DATE";
    pub const INVALID_RATE: &str = "INVALID_RATE";
    pub const INVALID_CUSTOMER_NAME: &str = "INVALID_CUSTOMER_NAME";
    pub const INVALID_DAIRY_NAME: &str = "INVALID_DAIRY_NAME";
    pub const INVALID_RANGE: &str = "INVALID_RANGE";
    pub const INVALID_MONTH: &str = "INVALID_MONTH";
    pub const MISSING_RATE: &str = "MISSING_RATE";
}

/// Upper bound for FAT and SNF percentages
pub const MAX_COMPONENT: i32 = 15;

/// Column shapes of the schema, as `NUMERIC(precision, scale)`
pub const COMPONENT_NUMERIC: (u64, i64) = (4, 2);
pub const LITERS_NUMERIC: (u64, i64) = (9, 3);
pub const RATE_NUMERIC: (u64, i64) = (8, 2);

/// Entry input after every field has been checked and parsed
#[derive(Debug, Clone, PartialEq)]
pub struct ValidEntry {
    pub customer_id: Uuid,
    pub date: NaiveDate,
    pub shift: Option<Shift>,
    pub fat: BigDecimal,
    pub snf: BigDecimal,
    pub liters: BigDecimal,
}

/// Whether `value` fits a `NUMERIC(precision, scale)` column without rounding:
/// at most `scale` fractional digits (trailing zeros ignored) and at most
/// `precision - scale` integer digits.
pub fn fits_numeric(value: &BigDecimal, (precision, scale): (u64, i64)) -> bool {
    let (mut digits, mut exponent) = value.as_bigint_and_exponent();
    if digits.is_zero() {
        return exponent <= scale;
    }
    while exponent > scale {
        if !(digits.clone() % 10u32).is_zero() {
            return false;
        }
        digits = digits / 10u32;
        exponent -= 1;
    }
    let len = digits.to_string().trim_start_matches('-').len() as i64;
    len - exponent <= (precision as i64) - scale
}

fn within_component_range(value: &BigDecimal) -> bool {
    fits_numeric(value, COMPONENT_NUMERIC)
        && *value >= BigDecimal::zero()
        && *value <= BigDecimal::from(MAX_COMPONENT)
}

fn check_fat(errors: &mut ValidationErrors, fat: Option<&BigDecimal>) {
    match fat {
        None => errors.push(FieldError::new("fat", codes::REQUIRED, "FAT is required")),
        Some(v) if !within_component_range(v) => errors.push(FieldError::new(
            "fat",
            codes::INVALID_FAT,
            "FAT must be between 0 and 15 with at most 2 decimals",
        )),
        Some(_) => {}
    }
}

fn check_snf(errors: &mut ValidationErrors, snf: Option<&BigDecimal>) {
    match snf {
        None => errors.push(FieldError::new("snf", codes::REQUIRED, "SNF is required")),
        Some(v) if !within_component_range(v) => errors.push(FieldError::new(
            "snf",
            codes::INVALID_SNF,
            "SNF must be between 0 and 15 with at most 2 decimals",
        )),
        Some(_) => {}
    }
}

fn check_liters(errors: &mut ValidationErrors, liters: Option<&BigDecimal>) {
    match liters {
        None => errors.push(FieldError::new("liters", codes::REQUIRED, "Liters is required")),
        Some(v) if !fits_numeric(v, LITERS_NUMERIC) || *v <= BigDecimal::zero() => {
            errors.push(FieldError::new(
                "liters",
                codes::INVALID_LITERS,
                "Liters must be greater than 0, below 1000000, with at most 3 decimals",
            ))
        }
        Some(_) => {}
    }
}

/// FAT / SNF / liters checks, used on create and on the merged values of an update
pub fn validate_measurements(
    fat: Option<&BigDecimal>,
    snf: Option<&BigDecimal>,
    liters: Option<&BigDecimal>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_fat(&mut errors, fat);
    check_snf(&mut errors, snf);
    check_liters(&mut errors, liters);
    errors.into_result()
}

/// FAT / SNF checks for a bare rate lookup
pub fn validate_components(fat: &BigDecimal, snf: &BigDecimal) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_fat(&mut errors, Some(fat));
    check_snf(&mut errors, Some(snf));
    errors.into_result()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Checks a new entry before anything touches the store.
pub fn validate_entry(input: &RecordEntryInput) -> Result<ValidEntry, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    check_fat(&mut errors, input.fat.as_ref());
    check_snf(&mut errors, input.snf.as_ref());
    check_liters(&mut errors, input.liters.as_ref());

    let customer_id = if input.customer_id.trim().is_empty() {
        errors.push(FieldError::new("customer_id", codes::REQUIRED, "Customer is required"));
        None
    } else {
        let parsed = Uuid::parse_str(input.customer_id.trim()).ok();
        if parsed.is_none() {
            errors.push(FieldError::new(
                "customer_id",
                codes::INVALID_TYPE,
                "Customer id must be a UUID",
            ));
        }
        parsed
    };

    let date = if input.date.trim().is_empty() {
        errors.push(FieldError::new("date", codes::REQUIRED, "Date is required"));
        None
    } else {
        let parsed = parse_date(&input.date);
        if parsed.is_none() {
            errors.push(FieldError::new(
                "date",
                codes::INVALID_DATE,
                "Date must be formatted as YYYY-MM-DD",
            ));
        }
        parsed
    };

    match (customer_id, date, &input.fat, &input.snf, &input.liters) {
        (Some(customer_id), Some(date), Some(fat), Some(snf), Some(liters)) if errors.is_empty() => {
            Ok(ValidEntry {
                customer_id,
                date,
                shift: input.shift,
                fat: fat.clone(),
                snf: snf.clone(),
                liters: liters.clone(),
            })
        }
        _ => Err(errors),
    }
}

pub fn validate_rate(input: &SetRate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_fat(&mut errors, Some(&input.fat));
    check_snf(&mut errors, Some(&input.snf));
    if !fits_numeric(&input.rate_per_liter, RATE_NUMERIC)
        || input.rate_per_liter <= BigDecimal::zero()
    {
        errors.push(FieldError::new(
            "rate_per_liter",
            codes::INVALID_RATE,
            "Rate per liter must be greater than 0, below 1000000, with at most 2 decimals",
        ));
    }
    errors.into_result()
}

/// Trimmed, non-empty customer name
pub fn validate_customer_name(name: &str) -> Result<String, ValidationErrors> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        let mut errors = ValidationErrors::default();
        errors.push(FieldError::new(
            "name",
            codes::INVALID_CUSTOMER_NAME,
            "Customer name is required",
        ));
        return Err(errors);
    }
    Ok(trimmed.to_string())
}

pub fn validate_dairy_name(name: &str) -> Result<String, ValidationErrors> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        let mut errors = ValidationErrors::default();
        errors.push(FieldError::new(
            "dairy_name",
            codes::INVALID_DAIRY_NAME,
            "Dairy name is required",
        ));
        return Err(errors);
    }
    Ok(trimmed.to_string())
}

pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if start > end {
        errors.push(FieldError::new(
            "end_date",
            codes::INVALID_RANGE,
            "End date must not be before start date",
        ));
    }
    errors.into_result()
}

/// First day of the month, rejecting months outside 1..=12 and years chrono cannot represent
pub fn month_start(year: i32, month: u32) -> Result<NaiveDate, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if !(1..=12).contains(&month) {
        errors.push(FieldError::new(
            "month",
            codes::INVALID_MONTH,
            "Month must be between 1 and 12",
        ));
        return Err(errors);
    }
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        errors.push(FieldError::new("year", codes::INVALID_DATE, "Year is out of range"));
        errors
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn valid_input() -> RecordEntryInput {
        RecordEntryInput {
            customer_id: Uuid::new_v4().to_string(),
            date: "2024-03-15".to_string(),
            shift: Some(Shift::Morning),
            fat: Some(dec("4.0")),
            snf: Some(dec("8.5")),
            liters: Some(dec("10.5")),
        }
    }

    #[test]
    fn accepts_well_formed_entry() {
        let valid = validate_entry(&valid_input()).unwrap();
        assert_eq!(valid.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(valid.liters, dec("10.5"));
        assert_eq!(valid.shift, Some(Shift::Morning));
    }

    #[test]
    fn bounds_are_inclusive() {
        let mut input = valid_input();
        input.fat = Some(dec("0"));
        input.snf = Some(dec("15"));
        assert!(validate_entry(&input).is_ok());
    }

    #[test]
    fn reports_every_bad_field_together() {
        let input = RecordEntryInput {
            customer_id: String::new(),
            date: "  ".to_string(),
            shift: None,
            fat: Some(dec("15.1")),
            snf: Some(dec("-0.1")),
            liters: Some(dec("0")),
        };
        let errors = validate_entry(&input).unwrap_err();

        assert!(errors.has_code("fat", codes::INVALID_FAT));
        assert!(errors.has_code("snf", codes::INVALID_SNF));
        assert!(errors.has_code("liters", codes::INVALID_LITERS));
        assert!(errors.has_code("customer_id", codes::REQUIRED));
        assert!(errors.has_code("date", codes::REQUIRED));
        assert_eq!(errors.0.len(), 5);
    }

    #[test]
    fn missing_numbers_are_required() {
        let mut input = valid_input();
        input.fat = None;
        input.liters = None;
        let errors = validate_entry(&input).unwrap_err();
        assert_eq!(errors.fields(), vec!["fat", "liters"]);
        assert!(errors.has_code("fat", codes::REQUIRED));
    }

    #[test]
    fn malformed_identifiers_are_typed_errors() {
        let mut input = valid_input();
        input.customer_id = "not-a-uuid".to_string();
        input.date = "15/03/2024".to_string();
        let errors = validate_entry(&input).unwrap_err();
        assert!(errors.has_code("customer_id", codes::INVALID_TYPE));
        assert!(errors.has_code("date", codes::INVALID_DATE));
    }

    #[test]
    fn rate_must_be_positive() {
        let errors = validate_rate(&SetRate {
            fat: dec("3.5"),
            snf: dec("8.5"),
            rate_per_liter: dec("0"),
        })
        .unwrap_err();
        assert!(errors.has_code("rate_per_liter", codes::INVALID_RATE));
    }

    #[test]
    fn month_outside_calendar_is_rejected() {
        assert!(month_start(2024, 0).is_err());
        assert!(month_start(2024, 13).is_err());
        assert_eq!(
            month_start(2024, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );
    }

    #[test]
    fn customer_name_is_trimmed() {
        assert_eq!(validate_customer_name("  Priya ").unwrap(), "Priya");
        assert!(validate_customer_name("   ").is_err());
    }

    #[test]
    fn decimals_must_fit_their_columns() {
        let mut input = valid_input();
        input.fat = Some(dec("4.125"));
        input.snf = Some(dec("8.505"));
        input.liters = Some(dec("10.5555"));
        let errors = validate_entry(&input).unwrap_err();
        assert!(errors.has_code("fat", codes::INVALID_FAT));
        assert!(errors.has_code("snf", codes::INVALID_SNF));
        assert!(errors.has_code("liters", codes::INVALID_LITERS));

        let mut input = valid_input();
        input.fat = Some(dec("4.500"));
        input.liters = Some(dec("999999.999"));
        assert!(validate_entry(&input).is_ok());
    }

    #[test]
    fn extreme_exponents_are_rejected_quickly() {
        for raw in ["1e-50000000", "1e-200000", "1e1000000", "1000000"] {
            let mut input = valid_input();
            input.liters = Some(dec(raw));
            let errors = validate_entry(&input).unwrap_err();
            assert!(errors.has_code("liters", codes::INVALID_LITERS), "{raw}");
        }
    }

    #[test]
    fn rate_is_limited_to_cents() {
        for raw in ["45.555", "1000000", "1e-9000000"] {
            let errors = validate_rate(&SetRate {
                fat: dec("3.5"),
                snf: dec("8.5"),
                rate_per_liter: dec(raw),
            })
            .unwrap_err();
            assert!(errors.has_code("rate_per_liter", codes::INVALID_RATE), "{raw}");
        }
        assert!(validate_rate(&SetRate {
            fat: dec("3.5"),
            snf: dec("8.5"),
            rate_per_liter: dec("45.50"),
        })
        .is_ok());
    }

    #[test]
    fn fits_numeric_ignores_trailing_zeros() {
        assert!(fits_numeric(&dec("12.3400"), (4, 2)));
        assert!(fits_numeric(&dec("0"), (4, 2)));
        assert!(fits_numeric(&dec("-99.99"), (4, 2)));
        assert!(!fits_numeric(&dec("100"), (4, 2)));
        assert!(!fits_numeric(&dec("0.001"), (4, 2)));
        assert!(!fits_numeric(&dec("0e-40000000"), (4, 2)));
    }

    #[test]
    fn unrepresentable_year_is_not_a_month_error() {
        let errors = month_start(i32::MAX, 3).unwrap_err();
        assert!(errors.has_code("year", codes::INVALID_DATE));
    }
}
