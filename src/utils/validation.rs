//! Utilidades de validación
//!
//! Funciones helper usadas desde los `#[validate(custom = ...)]` de los DTOs
//! y desde los servicios.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use validator::ValidationError;

lazy_static! {
    // Formato de código postal del Reino Unido (incluye GIR 0AA)
    static ref UK_POSTCODE: Regex =
        Regex::new(r"(?i)^([A-Z]{1,2}[0-9][A-Z0-9]? ?[0-9][A-Z]{2}|GIR ?0AA)$").unwrap();
    static ref PHONE: Regex = Regex::new(r"^\+?[0-9][0-9 ()-]{8,18}[0-9]$").unwrap();
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea positivo
pub fn validate_positive<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value <= T::zero() {
        let mut error = ValidationError::new("positive");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea no negativo
pub fn validate_non_negative<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Adaptadores para `#[validate(custom = ...)]`, que recibe referencias
pub fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    validate_positive(*value)
}

pub fn non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    validate_non_negative(*value)
}

/// Validar formato de código postal UK
pub fn validate_postcode(value: &str) -> Result<(), ValidationError> {
    if !UK_POSTCODE.is_match(value.trim()) {
        let mut error = ValidationError::new("postcode");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de teléfono (básico)
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if !PHONE.is_match(value.trim()) {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Solo dígitos, para construir enlaces de chat (`wa.me/447700900123`)
pub fn normalize_phone(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validar formato de matrícula de vehículo
pub fn validate_registration(value: &str) -> Result<(), ValidationError> {
    let clean_plate = value.replace([' ', '-', '_'], "");
    if clean_plate.len() < 2 || clean_plate.len() > 8 || !clean_plate.chars().all(|c| c.is_ascii_alphanumeric()) {
        let mut error = ValidationError::new("registration");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postcodes() {
        assert!(validate_postcode("SW1A 1AA").is_ok());
        assert!(validate_postcode("m1 1ae").is_ok());
        assert!(validate_postcode("B338TH").is_ok());
        assert!(validate_postcode("12345").is_err());
    }

    #[test]
    fn test_positive_amount() {
        assert!(positive_amount(&Decimal::new(45000, 2)).is_ok());
        assert!(positive_amount(&Decimal::ZERO).is_err());
        assert!(positive_amount(&Decimal::new(-1, 0)).is_err());
        assert!(non_negative_amount(&Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_phone() {
        assert!(validate_phone("+44 7700 900123").is_ok());
        assert!(validate_phone("abc").is_err());
        assert_eq!(normalize_phone("+44 (0)7700-900123"), "4407700900123");
    }

    #[test]
    fn test_registration() {
        assert!(validate_registration("AB12 CDE").is_ok());
        assert!(validate_registration("!!").is_err());
    }
}
