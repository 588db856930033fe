//! Feed de cambios de pedidos
//!
//! Un trigger en `orders` publica `pg_notify('orders_changes', {type, record})`.
//! Esta tarea escucha el canal con `PgListener` y reparte cada notificación a
//! los suscriptores en proceso mediante un canal `broadcast`.

use std::time::Duration;

use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::models::OrderChange;

pub const ORDERS_CHANNEL: &str = "orders_changes";

const CHANNEL_CAPACITY: usize = 256;
const LISTENER_PAUSE: Duration = Duration::from_secs(1);

/// Canal de difusión de cambios; cada tablero en vivo se suscribe por separado
pub fn channel() -> broadcast::Sender<OrderChange> {
    broadcast::channel(CHANNEL_CAPACITY).0
}

/// Interpreta el payload JSON emitido por el trigger
pub fn parse_notification(payload: &str) -> Option<OrderChange> {
    match serde_json::from_str::<OrderChange>(payload) {
        Ok(change) => Some(change),
        Err(e) => {
            warn!("⚠️ Notificación de pedidos ilegible: {}", e);
            None
        }
    }
}

/// Lanza la tarea que escucha PostgreSQL y reenvía al canal
pub async fn spawn_listener(
    pool: &PgPool,
    sender: broadcast::Sender<OrderChange>,
) -> Result<JoinHandle<()>, sqlx::Error> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen(ORDERS_CHANNEL).await?;
    info!("📡 Escuchando cambios de pedidos en '{}'", ORDERS_CHANNEL);

    Ok(tokio::spawn(async move {
        loop {
            match listener.recv().await {
                Ok(notification) => {
                    if let Some(change) = parse_notification(notification.payload()) {
                        debug!("📡 Cambio de pedido {:?}", change.kind);
                        // Sin tableros abiertos no hay receptores
                        let _ = sender.send(change);
                    }
                }
                Err(e) => {
                    error!("❌ Error en el listener de pedidos: {}", e);
                    tokio::time::sleep(LISTENER_PAUSE).await;
                }
            }
        }
    }))
}
