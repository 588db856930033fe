//! Pegado mágico
//!
//! Extrae códigos de factura, total y nombre de cliente de un bloque de
//! texto copiado de cualquier sistema de facturación.

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::utils::errors::{validation_error, AppError, AppResult};
use crate::utils::validation::parse_amount;

pub const NO_INVOICE_DATA_MESSAGE: &str =
    "No se detectaron datos de facturación válidos en el texto.";

const OBSERVATIONS_SNIPPET_CHARS: usize = 200;

/// Datos detectados en el texto
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ParsedInvoiceData {
    pub invoices: Vec<String>,
    pub total_value: Decimal,
    pub client_name: String,
    /// Primeros caracteres del texto original
    pub observations: String,
}

pub struct MagicPasteParser {
    invoice: Regex,
    total: Regex,
    client: Regex,
}

impl MagicPasteParser {
    pub fn new() -> AppResult<Self> {
        Ok(Self {
            invoice: compile(r"(?i)Factura\s*[:#]?\s*([0-9A-Z-]+)")?,
            total: compile(r"(?i)Total\s*[:$]?\s*([\d,.]+)")?,
            client: compile(r"(?i)Cliente\s*:?\s*([A-Z ]+)")?,
        })
    }

    pub fn parse(&self, text: &str) -> AppResult<ParsedInvoiceData> {
        let invoices: Vec<String> = self
            .invoice
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .collect();

        let total_value = self
            .total
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| parse_amount(m.as_str()))
            .unwrap_or(Decimal::ZERO);

        if invoices.is_empty() && total_value.is_zero() {
            return Err(validation_error("text", NO_INVOICE_DATA_MESSAGE));
        }

        let client_name = self
            .client
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();

        Ok(ParsedInvoiceData {
            invoices,
            total_value,
            client_name,
            observations: text.chars().take(OBSERVATIONS_SNIPPET_CHARS).collect(),
        })
    }
}

fn compile(pattern: &str) -> AppResult<Regex> {
    Regex::new(pattern).map_err(|e| AppError::Internal(format!("Regex inválida: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_invoices_total_and_client() {
        let parser = MagicPasteParser::new().unwrap();
        let text = "Factura: FV-1001\nFactura # FV-1002\nTotal: 45,500.00\nCliente: Ana Perez";
        let data = parser.parse(text).unwrap();

        assert_eq!(data.invoices, vec!["FV-1001", "FV-1002"]);
        assert_eq!(data.total_value, Decimal::new(4550000, 2));
        assert_eq!(data.client_name, "Ana Perez");
        assert_eq!(data.observations, text);
    }

    #[test]
    fn invoice_match_is_case_insensitive() {
        let parser = MagicPasteParser::new().unwrap();
        let data = parser.parse("factura fv-77 sin total").unwrap();
        assert_eq!(data.invoices, vec!["fv-77"]);
        assert_eq!(data.total_value, Decimal::ZERO);
        assert_eq!(data.client_name, "");
    }

    #[test]
    fn total_alone_is_enough() {
        let parser = MagicPasteParser::new().unwrap();
        let data = parser.parse("TOTAL 12000").unwrap();
        assert!(data.invoices.is_empty());
        assert_eq!(data.total_value, Decimal::from(12000));
    }

    #[test]
    fn nothing_detected_is_a_validation_error() {
        let parser = MagicPasteParser::new().unwrap();
        let err = parser.parse("hola mundo").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn observations_are_truncated() {
        let parser = MagicPasteParser::new().unwrap();
        let text = format!("Factura: A1 {}", "x".repeat(500));
        let data = parser.parse(&text).unwrap();
        assert_eq!(data.observations.chars().count(), 200);
    }

    #[test]
    fn client_name_stops_at_line_end() {
        let parser = MagicPasteParser::new().unwrap();
        let data = parser.parse("Cliente: Luis Rojas\nTotal: 9000").unwrap();
        assert_eq!(data.client_name, "Luis Rojas");
    }
}
