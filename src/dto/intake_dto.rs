use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::DeliveryType;
use crate::services::intake_flow::{FocusOutcome, IntakeFlow};

// Estado del formulario de captura más los valores derivados
#[derive(Debug, Clone, Serialize)]
pub struct IntakeSnapshot {
    pub id: Uuid,
    #[serde(flatten)]
    pub flow: IntakeFlow,
    pub step_label: &'static str,
    pub total_value: Decimal,
    pub final_observations: String,
}

impl IntakeSnapshot {
    pub fn new(id: Uuid, flow: &IntakeFlow) -> Self {
        Self {
            id,
            step_label: flow.step.label(),
            total_value: flow.total_value(),
            final_observations: flow.final_observations(),
            flow: flow.clone(),
        }
    }
}

// Resultado de la lectura del portapapeles hecha por el navegador al recuperar el foco
#[derive(Debug, Default, Deserialize)]
pub struct FocusRequest {
    #[serde(default)]
    pub clipboard: Option<String>,
    #[serde(default)]
    pub denied: bool,
}

#[derive(Debug, Serialize)]
pub struct FocusResponse {
    pub outcome: FocusOutcome,
    pub intake: IntakeSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceEdit {
    pub index: usize,
    pub code: Option<String>,
    pub value: Option<String>,
}

// Edición manual; solo se aplican los campos presentes
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateIntakeRequest {
    pub invoices: Vec<InvoiceEdit>,
    pub client_id: Option<Uuid>,
    pub clear_client: bool,
    pub client_name: Option<String>,
    pub delivery_type: Option<DeliveryType>,
    pub delivery_address: Option<String>,
    pub observations: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListeningRequest {
    pub listening: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MagicPasteRequest {
    #[validate(length(min = 1, max = 20000, message = "El texto pegado está vacío"))]
    pub text: String,
}
