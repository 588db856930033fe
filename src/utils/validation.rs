//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! y limpieza de valores monetarios copiados desde facturas.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use validator::ValidationError;

/// Validar y convertir string a fecha
pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        let mut error = ValidationError::new("date");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"YYYY-MM-DD".to_string());
        error
    })
}

/// Quita símbolos de moneda, separadores de miles y espacios de un valor pegado
pub fn clean_currency(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect()
}

/// Mayor valor que cabe en una columna `NUMERIC(14,2)`
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

pub fn amount_in_range(amount: &Decimal) -> bool {
    amount.abs() <= max_amount()
}

/// Interpreta un valor de factura pegado. `None` si lo que queda no es un
/// número o no cabe en la columna de valores.
pub fn parse_amount(value: &str) -> Option<Decimal> {
    let cleaned = clean_currency(value);
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
        .filter(amount_in_range)
}

/// Valor numérico tolerante: conserva solo dígitos y punto decimal; vacío o inválido es cero
pub fn lenient_amount(value: &str) -> Decimal {
    let kept: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    Decimal::from_str(&kept)
        .ok()
        .filter(amount_in_range)
        .unwrap_or(Decimal::ZERO)
}

/// La parte entera tiene más dígitos de los que admite `NUMERIC(14,2)`
pub fn exceeds_amount_column(value: &str) -> bool {
    let integer = value.split('.').next().unwrap_or_default();
    integer.chars().filter(char::is_ascii_digit).count() > 12
}

/// Conserva únicamente los dígitos (entrada manual de valores)
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}
