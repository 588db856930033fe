use tracing::info;
use uuid::Uuid;

use crate::dto::intake_dto::{FocusRequest, FocusResponse, IntakeSnapshot, UpdateIntakeRequest};
use crate::dto::order_dto::{CreateOrderRequest, OrderView};
use crate::services::intake_flow::{BrowserClipboard, ClipboardReader, IntakeFlow};
use crate::services::magic_paste::ParsedInvoiceData;
use crate::services::order_code::new_order_code;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppResult};

pub struct IntakeController {
    state: AppState,
}

impl IntakeController {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn open(&self) -> IntakeSnapshot {
        let (id, flow) = self.state.open_intake(IntakeFlow::new(new_order_code())).await;
        IntakeSnapshot::new(id, &flow)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<IntakeSnapshot> {
        let flow = self.state.intake_snapshot(id).await?;
        Ok(IntakeSnapshot::new(id, &flow))
    }

    pub async fn focus(&self, id: Uuid, request: FocusRequest) -> AppResult<FocusResponse> {
        // La lectura se resuelve antes de tomar el lock de los formularios
        let read = BrowserClipboard::new(request.clipboard, request.denied)
            .read()
            .await;
        let (outcome, flow) = self
            .state
            .with_intake(id, |flow| Ok(flow.accept_clipboard(read)))
            .await?;

        Ok(FocusResponse {
            outcome,
            intake: IntakeSnapshot::new(id, &flow),
        })
    }

    pub async fn update(&self, id: Uuid, request: UpdateIntakeRequest) -> AppResult<IntakeSnapshot> {
        // El cliente se resuelve antes de tomar el lock del formulario
        let client = match request.client_id {
            Some(client_id) => Some(
                self.state
                    .stores
                    .clients
                    .find_by_id(client_id)
                    .await?
                    .ok_or_else(|| not_found_error("Client", &client_id.to_string()))?,
            ),
            None => None,
        };

        let (_, flow) = self
            .state
            .with_intake(id, move |flow| {
                for edit in &request.invoices {
                    if let Some(code) = &edit.code {
                        flow.set_invoice_code(edit.index, code)?;
                    }
                    if let Some(value) = &edit.value {
                        flow.set_invoice_value(edit.index, value)?;
                    }
                }
                if request.clear_client {
                    flow.clear_client();
                }
                if let Some(client) = client {
                    flow.select_client(client);
                }
                if let Some(name) = &request.client_name {
                    flow.set_client_name(name);
                }
                if let Some(delivery_type) = request.delivery_type {
                    flow.set_delivery_type(delivery_type);
                }
                if let Some(address) = &request.delivery_address {
                    flow.set_delivery_address(address);
                }
                if let Some(observations) = &request.observations {
                    flow.set_observations(observations);
                }
                Ok(())
            })
            .await?;

        Ok(IntakeSnapshot::new(id, &flow))
    }

    pub async fn set_listening(&self, id: Uuid, listening: bool) -> AppResult<IntakeSnapshot> {
        let (_, flow) = self
            .state
            .with_intake(id, |flow| {
                flow.set_listening(listening);
                Ok(())
            })
            .await?;
        Ok(IntakeSnapshot::new(id, &flow))
    }

    pub async fn reset(&self, id: Uuid) -> AppResult<IntakeSnapshot> {
        let code = new_order_code();
        let (_, flow) = self
            .state
            .with_intake(id, |flow| {
                flow.reset(code);
                Ok(())
            })
            .await?;
        Ok(IntakeSnapshot::new(id, &flow))
    }

    /// Guarda el pedido; si falla el formulario queda abierto para reintentar
    pub async fn save(&self, id: Uuid) -> AppResult<OrderView> {
        let flow = self.state.intake_snapshot(id).await?;
        let order = flow.save(self.state.stores.orders.as_ref()).await?;
        self.state.close_intake(id).await;
        info!("✅ Pedido {} guardado para {}", order.public_id, order.client_name);
        Ok(OrderView::from(order))
    }

    /// Pedido con el formulario completo en una sola llamada
    pub async fn create_order(&self, request: CreateOrderRequest) -> AppResult<OrderView> {
        let mut flow = IntakeFlow::new(new_order_code());
        for (index, invoice) in request.invoices.iter().enumerate() {
            flow.set_invoice_code(index, &invoice.code)?;
            flow.paste_invoice_value(index, &invoice.value)?;
        }

        if let Some(client_id) = request.client_id {
            let client = self
                .state
                .stores
                .clients
                .find_by_id(client_id)
                .await?
                .ok_or_else(|| not_found_error("Client", &client_id.to_string()))?;
            flow.select_client(client);
        }
        if !request.client_name.is_empty() {
            flow.set_client_name(&request.client_name);
        }
        flow.set_delivery_type(request.delivery_type);
        if !request.delivery_address.is_empty() {
            flow.set_delivery_address(&request.delivery_address);
        }
        flow.set_observations(&request.observations);

        let order = flow.save(self.state.stores.orders.as_ref()).await?;
        info!("✅ Pedido {} creado para {}", order.public_id, order.client_name);
        Ok(OrderView::from(order))
    }

    pub fn magic_paste(&self, text: &str) -> AppResult<ParsedInvoiceData> {
        self.state.magic_paste.parse(text)
    }
}
