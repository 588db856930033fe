use std::convert::Infallible;

use axum::response::sse::Event;
use chrono::NaiveDate;
use futures::stream::{self, Stream};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::dto::order_dto::{BoardSnapshot, OrderView};
use crate::models::OrderChange;
use crate::repositories::Stores;
use crate::services::dispatch_board::{self, DispatchBoard};
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct OrderController {
    stores: Stores,
}

impl OrderController {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn load_board(&self, date: NaiveDate) -> AppResult<DispatchBoard> {
        DispatchBoard::load(
            self.stores.orders.as_ref(),
            self.stores.drivers.as_ref(),
            date,
        )
        .await
    }

    pub async fn board(&self, date: NaiveDate) -> AppResult<BoardSnapshot> {
        let board = self.load_board(date).await?;
        Ok(BoardSnapshot::from(&board))
    }

    pub async fn advance(&self, id: Uuid) -> AppResult<OrderView> {
        let order = dispatch_board::advance_order(self.stores.orders.as_ref(), id).await?;
        Ok(OrderView::from(order))
    }

    pub async fn assign_driver(&self, id: Uuid, driver_id: Option<Uuid>) -> AppResult<OrderView> {
        let order =
            dispatch_board::assign_order_driver(self.stores.orders.as_ref(), id, driver_id).await?;
        Ok(OrderView::from(order))
    }
}

struct LiveBoard {
    board: DispatchBoard,
    stores: Stores,
    changes: broadcast::Receiver<OrderChange>,
    initial_sent: bool,
}

fn snapshot_event(board: &DispatchBoard) -> Event {
    match Event::default()
        .event("snapshot")
        .json_data(BoardSnapshot::from(board))
    {
        Ok(event) => event,
        Err(e) => {
            warn!("⚠️ No se pudo serializar el tablero: {}", e);
            Event::default().event("error").data(e.to_string())
        }
    }
}

/// Stream SSE: un `snapshot` al conectar y otro tras cada cambio aplicado
pub async fn live_board(
    state: &AppState,
    date: NaiveDate,
) -> AppResult<impl Stream<Item = Result<Event, Infallible>>> {
    // Suscribirse antes de cargar para no perder cambios intermedios
    let changes = state.changes.subscribe();
    let board = OrderController::new(state.stores.clone())
        .load_board(date)
        .await?
        .with_insert_delay(state.config.insert_display_delay());

    let live = LiveBoard {
        board,
        stores: state.stores.clone(),
        changes,
        initial_sent: false,
    };

    Ok(stream::unfold(live, |mut live| async move {
        if !live.initial_sent {
            live.initial_sent = true;
            let event = snapshot_event(&live.board);
            return Some((Ok(event), live));
        }

        loop {
            match live.changes.recv().await {
                Ok(change) => {
                    let orders = live.stores.orders.clone();
                    match live
                        .board
                        .apply_change(orders.as_ref(), &change, dispatch_board::today())
                        .await
                    {
                        Ok(true) => {
                            let event = snapshot_event(&live.board);
                            return Some((Ok(event), live));
                        }
                        Ok(false) => continue,
                        Err(e) => warn!("⚠️ Error aplicando cambio al tablero: {}", e),
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!("📡 Tablero atrasado {} cambios, recargando", skipped);
                    let orders = live.stores.orders.clone();
                    if let Err(e) = live.board.refetch(orders.as_ref()).await {
                        warn!("⚠️ Error recargando tablero: {}", e);
                        continue;
                    }
                    let event = snapshot_event(&live.board);
                    return Some((Ok(event), live));
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }))
}
