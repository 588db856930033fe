//! Flujo de captura de pedidos
//!
//! Secuencia lineal de pegado `INV1_CODE → INV1_VALUE → INV2_CODE →
//! INV2_VALUE → DONE` para dos facturas, más cliente, tipo de entrega,
//! dirección y observaciones. Mientras escucha, cada foco de ventana lee el
//! portapapeles a través de un [`ClipboardReader`] inyectado; los campos
//! manuales siempre están disponibles como alternativa.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Client, DeliveryType, InvoiceLine, NewOrder, Order, OrderStatus};
use crate::repositories::OrderStore;
use crate::utils::errors::{validation_error, AppError, AppResult};
use crate::utils::validation::{
    amount_in_range, clean_currency, digits_only, exceeds_amount_column, lenient_amount,
    parse_amount,
};

pub const SAVE_VALIDATION_MESSAGE: &str =
    "Por favor completa el nombre del cliente y verifica los valores.";

/// Paso actual del pegado secuencial
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PasteStep {
    Inv1Code,
    Inv1Value,
    Inv2Code,
    Inv2Value,
    Done,
}

impl PasteStep {
    pub fn label(self) -> &'static str {
        match self {
            PasteStep::Inv1Code => "Copia Código Factura 1",
            PasteStep::Inv1Value => "Copia Valor Factura 1",
            PasteStep::Inv2Code => "Copia Código Factura 2",
            PasteStep::Inv2Value => "Copia Valor Factura 2",
            PasteStep::Done => "Proceso Completado",
        }
    }
}

/// El portapapeles no pudo leerse (permiso denegado, sin foco, etc.)
#[derive(Debug, Clone, thiserror::Error)]
#[error("Portapapeles no disponible: {0}")]
pub struct ClipboardUnavailable(pub String);

/// Capacidad de lectura del portapapeles del operador
#[async_trait]
pub trait ClipboardReader: Send + Sync {
    async fn read(&self) -> Result<String, ClipboardUnavailable>;
}

/// Resultado de lectura que el navegador ya obtuvo al recuperar el foco
#[derive(Debug, Clone)]
pub struct BrowserClipboard {
    text: Option<String>,
}

impl BrowserClipboard {
    pub fn new(text: Option<String>, denied: bool) -> Self {
        Self {
            text: if denied { None } else { text },
        }
    }
}

#[async_trait]
impl ClipboardReader for BrowserClipboard {
    async fn read(&self) -> Result<String, ClipboardUnavailable> {
        self.text
            .clone()
            .ok_or_else(|| ClipboardUnavailable("permiso denegado".to_string()))
    }
}

/// Qué pasó con un evento de foco
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FocusOutcome {
    /// No se escucha o el flujo terminó
    NotListening,
    /// La lectura falló y se ignoró
    Unavailable,
    /// Mismo texto que el último consumido
    Duplicate,
    /// Texto entregado al paso actual
    Consumed { advanced: bool },
}

#[derive(Debug, Clone, Serialize)]
pub struct IntakeFlow {
    pub public_id: String,
    pub step: PasteStep,
    pub listening: bool,
    #[serde(skip)]
    last_clipboard: String,
    pub invoices: [InvoiceLine; 2],
    pub delivery_type: DeliveryType,
    pub selected_client: Option<Client>,
    pub client_name: String,
    pub delivery_address: String,
    pub observations: String,
}

impl IntakeFlow {
    /// Formulario vacío; la escucha arranca sola
    pub fn new(public_id: String) -> Self {
        Self {
            public_id,
            step: PasteStep::Inv1Code,
            listening: true,
            last_clipboard: String::new(),
            invoices: Default::default(),
            delivery_type: DeliveryType::Domicilio,
            selected_client: None,
            client_name: String::new(),
            delivery_address: String::new(),
            observations: String::new(),
        }
    }

    /// Entrega un texto al paso actual. Devuelve `true` si el paso avanzó.
    pub fn step_complete(&mut self, text: &str) -> bool {
        let next = match self.step {
            PasteStep::Inv1Code | PasteStep::Inv2Code => {
                if text.is_empty() {
                    return false;
                }
                let slot = if self.step == PasteStep::Inv1Code { 0 } else { 1 };
                self.invoices[slot].code = text.to_string();
                if slot == 0 {
                    PasteStep::Inv1Value
                } else {
                    PasteStep::Inv2Value
                }
            }
            PasteStep::Inv1Value | PasteStep::Inv2Value => {
                if parse_amount(text).is_none() {
                    debug!("📋 Valor no numérico ignorado en {:?}", self.step);
                    return false;
                }
                let slot = if self.step == PasteStep::Inv1Value { 0 } else { 1 };
                self.invoices[slot].value = clean_currency(text);
                if slot == 0 {
                    PasteStep::Inv2Code
                } else {
                    PasteStep::Done
                }
            }
            PasteStep::Done => return false,
        };

        self.step = next;
        if next == PasteStep::Done {
            self.listening = false;
        }
        true
    }

    /// Evento de foco de ventana: lee el portapapeles si corresponde
    pub async fn on_focus(&mut self, reader: &dyn ClipboardReader) -> FocusOutcome {
        if !self.listening || self.step == PasteStep::Done {
            return FocusOutcome::NotListening;
        }

        self.accept_clipboard(reader.read().await)
    }

    /// Entrega una lectura de portapapeles ya resuelta al paso actual
    pub fn accept_clipboard(&mut self, read: Result<String, ClipboardUnavailable>) -> FocusOutcome {
        if !self.listening || self.step == PasteStep::Done {
            return FocusOutcome::NotListening;
        }

        let text = match read {
            Ok(text) => text,
            Err(e) => {
                debug!("📋 {}", e);
                return FocusOutcome::Unavailable;
            }
        };

        if text == self.last_clipboard {
            return FocusOutcome::Duplicate;
        }

        let advanced = self.step_complete(text.trim());
        self.last_clipboard = text;
        FocusOutcome::Consumed { advanced }
    }

    pub fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
    }

    pub fn set_invoice_code(&mut self, index: usize, text: &str) -> AppResult<()> {
        self.invoice_mut(index)?.code = text.to_uppercase();
        Ok(())
    }

    /// Entrada manual: solo se conservan los dígitos
    pub fn set_invoice_value(&mut self, index: usize, text: &str) -> AppResult<()> {
        let value = checked_value(digits_only(text))?;
        self.invoice_mut(index)?.value = value;
        Ok(())
    }

    /// Valor tal como viene de una factura: sin `$`, comas ni espacios
    pub fn paste_invoice_value(&mut self, index: usize, text: &str) -> AppResult<()> {
        let value = checked_value(clean_currency(text))?;
        self.invoice_mut(index)?.value = value;
        Ok(())
    }

    pub fn select_client(&mut self, client: Client) {
        self.client_name = client.full_name.clone();
        if let Some(address) = client.address.as_ref().filter(|a| !a.is_empty()) {
            self.delivery_address = address.clone();
        }
        self.selected_client = Some(client);
    }

    pub fn clear_client(&mut self) {
        self.selected_client = None;
        self.client_name.clear();
        self.delivery_address.clear();
    }

    pub fn set_client_name(&mut self, name: &str) {
        self.client_name = name.to_string();
    }

    pub fn set_delivery_type(&mut self, delivery_type: DeliveryType) {
        self.delivery_type = delivery_type;
    }

    pub fn set_delivery_address(&mut self, address: &str) {
        self.delivery_address = address.to_uppercase();
    }

    pub fn set_observations(&mut self, observations: &str) {
        self.observations = observations.to_uppercase();
    }

    /// Suma de ambas facturas; vacío o ilegible cuenta como cero
    pub fn total_value(&self) -> Decimal {
        self.invoices
            .iter()
            .map(|line| lenient_amount(&line.value))
            .try_fold(Decimal::ZERO, |total, value| total.checked_add(value))
            .unwrap_or(Decimal::ZERO)
    }

    pub fn final_observations(&self) -> String {
        if self.delivery_type == DeliveryType::Domicilio && !self.delivery_address.is_empty() {
            format!("[ENTREGA EN: {}] {}", self.delivery_address, self.observations)
                .trim()
                .to_string()
        } else {
            self.observations.clone()
        }
    }

    /// Valida el formulario y arma el registro a insertar, sin mutar nada
    pub fn prepare_order(&self) -> AppResult<NewOrder> {
        let total = self.total_value();
        if self.client_name.is_empty() || total <= Decimal::ZERO || !amount_in_range(&total) {
            return Err(validation_error("client_name", SAVE_VALIDATION_MESSAGE));
        }

        Ok(NewOrder {
            public_id: self.public_id.clone(),
            client_name: self.client_name.clone(),
            total_value: total,
            observations: self.final_observations(),
            status: OrderStatus::Tomado,
            delivery_type: self.delivery_type,
            invoices: self.invoices.to_vec(),
        })
    }

    /// Un solo insert. Si falla, el formulario queda intacto para reintentar.
    pub async fn save(&self, orders: &dyn OrderStore) -> AppResult<Order> {
        let order = self.prepare_order()?;
        orders.insert(&order).await
    }

    /// Todo vuelve al estado inicial con un código nuevo
    pub fn reset(&mut self, public_id: String) {
        *self = Self::new(public_id);
    }

    fn invoice_mut(&mut self, index: usize) -> AppResult<&mut InvoiceLine> {
        self.invoices
            .get_mut(index)
            .ok_or_else(|| AppError::BadRequest(format!("Factura {} no existe", index + 1)))
    }
}

fn checked_value(value: String) -> AppResult<String> {
    if exceeds_amount_column(&value) {
        return Err(validation_error("value", "El valor de la factura es demasiado grande"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryStore;
    use chrono::Utc;
    use std::str::FromStr;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct ScriptedClipboard(Mutex<Vec<Result<String, ClipboardUnavailable>>>);

    impl ScriptedClipboard {
        fn new(reads: Vec<Result<String, ClipboardUnavailable>>) -> Self {
            let mut reads = reads;
            reads.reverse();
            Self(Mutex::new(reads))
        }
    }

    #[async_trait]
    impl ClipboardReader for ScriptedClipboard {
        async fn read(&self) -> Result<String, ClipboardUnavailable> {
            self.0
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(ClipboardUnavailable("vacío".into())))
        }
    }

    fn client(address: Option<&str>) -> Client {
        Client {
            id: Uuid::new_v4(),
            first_name: Some("ANA".into()),
            last_name: Some("PEREZ".into()),
            full_name: "ANA PEREZ".into(),
            phone: Some("3001234567".into()),
            document_id: None,
            email: None,
            address: address.map(str::to_string),
            notes: None,
            total_orders: 0,
            last_order_date: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn full_paste_sequence_reaches_done_and_stops_listening() {
        let mut flow = IntakeFlow::new("PED-0001A".into());
        assert!(flow.step_complete("FV-100"));
        assert!(flow.step_complete("$ 1,000"));
        assert!(flow.step_complete("FV-101"));
        assert!(flow.step_complete("2500.50"));

        assert_eq!(flow.step, PasteStep::Done);
        assert!(!flow.listening);
        assert_eq!(flow.invoices[0].value, "1000");
        assert_eq!(flow.total_value(), Decimal::from_str("3500.50").unwrap());
        assert!(!flow.step_complete("otra cosa"));
    }

    #[test]
    fn unparsable_value_does_not_advance() {
        let mut flow = IntakeFlow::new("PED-0001A".into());
        flow.step_complete("FV-100");
        assert!(!flow.step_complete("abc"));
        assert_eq!(flow.step, PasteStep::Inv1Value);
        assert_eq!(flow.invoices[0].value, "");
    }

    #[test]
    fn oversized_values_are_rejected_everywhere() {
        let huge = "79228162514264337593543950335";
        let mut flow = IntakeFlow::new("PED-0001A".into());
        assert!(flow.step_complete("F1"));
        assert!(!flow.step_complete(huge));
        assert_eq!(flow.step, PasteStep::Inv1Value);

        assert!(flow.set_invoice_value(0, huge).is_err());
        assert!(flow.paste_invoice_value(1, &format!("$ {huge}")).is_err());
        assert_eq!(flow.invoices[0].value, "");

        flow.invoices[0].value = huge.into();
        flow.invoices[1].value = huge.into();
        assert_eq!(flow.total_value(), Decimal::ZERO);
    }

    #[test]
    fn total_above_column_limit_cannot_be_saved() {
        let mut flow = IntakeFlow::new("PED-0001A".into());
        flow.set_client_name("ANA PEREZ");
        flow.set_invoice_value(0, "999999999999").unwrap();
        flow.set_invoice_value(1, "999999999999").unwrap();
        assert!(matches!(flow.prepare_order(), Err(AppError::Validation(_))));
    }

    #[test]
    fn empty_code_does_not_advance() {
        let mut flow = IntakeFlow::new("PED-0001A".into());
        assert!(!flow.step_complete(""));
        assert_eq!(flow.step, PasteStep::Inv1Code);
    }

    #[test]
    fn total_counts_missing_invoice_as_zero() {
        let mut flow = IntakeFlow::new("PED-0001A".into());
        flow.invoices[0].value = "$ 50,000".into();
        assert_eq!(flow.total_value(), Decimal::from(50000));
    }

    #[test]
    fn delivery_address_prefixes_observations() {
        let mut flow = IntakeFlow::new("PED-0001A".into());
        flow.set_delivery_address("cl 10 #5-20");
        flow.set_observations("fragil");
        assert_eq!(flow.final_observations(), "[ENTREGA EN: CL 10 #5-20] FRAGIL");

        flow.set_observations("");
        assert_eq!(flow.final_observations(), "[ENTREGA EN: CL 10 #5-20]");

        flow.set_delivery_type(DeliveryType::Tienda);
        assert_eq!(flow.final_observations(), "");
    }

    #[test]
    fn manual_entry_normalizes_fields() {
        let mut flow = IntakeFlow::new("PED-0001A".into());
        flow.set_invoice_code(1, "fv-9").unwrap();
        flow.set_invoice_value(1, "$ 12.300").unwrap();
        assert_eq!(flow.invoices[1].code, "FV-9");
        assert_eq!(flow.invoices[1].value, "12300");
        assert!(flow.set_invoice_code(2, "x").is_err());
    }

    #[test]
    fn selecting_client_fills_name_and_address() {
        let mut flow = IntakeFlow::new("PED-0001A".into());
        flow.set_delivery_address("CALLE VIEJA");
        flow.select_client(client(None));
        assert_eq!(flow.client_name, "ANA PEREZ");
        assert_eq!(flow.delivery_address, "CALLE VIEJA");

        flow.select_client(client(Some("CRA 7 #1-1")));
        assert_eq!(flow.delivery_address, "CRA 7 #1-1");

        flow.clear_client();
        assert!(flow.selected_client.is_none());
        assert_eq!(flow.client_name, "");
        assert_eq!(flow.delivery_address, "");
    }

    #[test]
    fn prepare_rejects_missing_client_or_zero_total() {
        let mut flow = IntakeFlow::new("PED-0001A".into());
        flow.invoices[0].value = "1000".into();
        assert!(matches!(flow.prepare_order(), Err(AppError::Validation(_))));

        flow.set_client_name("ANA PEREZ");
        flow.invoices[0].value = "0".into();
        assert!(flow.prepare_order().is_err());

        flow.invoices[0].value = "1000".into();
        let order = flow.prepare_order().unwrap();
        assert_eq!(order.status, OrderStatus::Tomado);
        assert_eq!(order.total_value, Decimal::from(1000));
        assert_eq!(order.invoices.len(), 2);
    }

    #[tokio::test]
    async fn save_without_client_never_calls_store() {
        let store = MemoryStore::new();
        let mut flow = IntakeFlow::new("PED-0001A".into());
        flow.invoices[0].value = "1000".into();
        assert!(flow.save(&store).await.is_err());
        assert_eq!(store.order_insert_calls(), 0);
    }

    #[tokio::test]
    async fn failed_save_keeps_form_populated() {
        let store = MemoryStore::new();
        store.fail_writes(true);
        let mut flow = IntakeFlow::new("PED-0001A".into());
        flow.set_client_name("ANA PEREZ");
        flow.invoices[0].value = "1000".into();

        let err = flow.save(&store).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(flow.client_name, "ANA PEREZ");
        assert_eq!(store.order_insert_calls(), 1);

        store.fail_writes(false);
        let order = flow.save(&store).await.unwrap();
        assert_eq!(order.public_id, "PED-0001A");
    }

    #[tokio::test]
    async fn focus_feeds_clipboard_and_skips_duplicates() {
        let mut flow = IntakeFlow::new("PED-0001A".into());
        let reader = ScriptedClipboard::new(vec![
            Ok(" FV-1 ".into()),
            Ok(" FV-1 ".into()),
            Err(ClipboardUnavailable("denegado".into())),
            Ok("$ 2,000".into()),
        ]);

        assert_eq!(flow.on_focus(&reader).await, FocusOutcome::Consumed { advanced: true });
        assert_eq!(flow.invoices[0].code, "FV-1");
        assert_eq!(flow.on_focus(&reader).await, FocusOutcome::Duplicate);
        assert_eq!(flow.on_focus(&reader).await, FocusOutcome::Unavailable);
        assert_eq!(flow.step, PasteStep::Inv1Value);
        assert_eq!(flow.on_focus(&reader).await, FocusOutcome::Consumed { advanced: true });
        assert_eq!(flow.step, PasteStep::Inv2Code);
    }

    #[test]
    fn resolved_reads_follow_focus_rules() {
        let mut flow = IntakeFlow::new("PED-0001A".into());
        assert_eq!(
            flow.accept_clipboard(Ok("FV-7".into())),
            FocusOutcome::Consumed { advanced: true }
        );
        assert_eq!(flow.accept_clipboard(Ok("FV-7".into())), FocusOutcome::Duplicate);
        assert_eq!(
            flow.accept_clipboard(Err(ClipboardUnavailable("denegado".into()))),
            FocusOutcome::Unavailable
        );

        flow.set_listening(false);
        assert_eq!(flow.accept_clipboard(Ok("$ 900".into())), FocusOutcome::NotListening);
        assert_eq!(flow.step, PasteStep::Inv1Value);
    }

    #[tokio::test]
    async fn focus_is_ignored_when_paused() {
        let mut flow = IntakeFlow::new("PED-0001A".into());
        flow.set_listening(false);
        let reader = BrowserClipboard::new(Some("FV-1".into()), false);
        assert_eq!(flow.on_focus(&reader).await, FocusOutcome::NotListening);
        assert_eq!(flow.step, PasteStep::Inv1Code);
    }

    #[tokio::test]
    async fn denied_browser_clipboard_is_swallowed() {
        let mut flow = IntakeFlow::new("PED-0001A".into());
        let reader = BrowserClipboard::new(Some("FV-1".into()), true);
        assert_eq!(flow.on_focus(&reader).await, FocusOutcome::Unavailable);
        assert_eq!(flow.step, PasteStep::Inv1Code);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut flow = IntakeFlow::new("PED-0001A".into());
        flow.step_complete("FV-1");
        flow.set_client_name("ANA");
        flow.set_delivery_type(DeliveryType::Tienda);
        flow.set_listening(false);

        flow.reset("PED-0002A".into());
        assert_eq!(flow.public_id, "PED-0002A");
        assert_eq!(flow.step, PasteStep::Inv1Code);
        assert!(flow.listening);
        assert_eq!(flow.delivery_type, DeliveryType::Domicilio);
        assert_eq!(flow.client_name, "");
        assert_eq!(flow.invoices[0].code, "");
    }

    #[test]
    fn steps_serialize_like_the_form() {
        assert_eq!(serde_json::to_string(&PasteStep::Inv1Code).unwrap(), "\"INV1_CODE\"");
        assert_eq!(serde_json::to_string(&PasteStep::Done).unwrap(), "\"DONE\"");
    }
}
