//! Tablero de despacho
//!
//! Pedidos de un día con sus estadísticas, avance de estado
//! `TOMADO → DESPACHO → ENTREGADO` y asignación de domiciliario. El tablero
//! reacciona al feed de cambios: inserciones del día se anteponen tras un
//! pequeño retardo, cualquier otro cambio fuerza una recarga.

use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{ChangeKind, DeliveryDriver, Order, OrderChange, OrderStatus};
use crate::repositories::{DriverStore, OrderStore};
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Retardo por defecto antes de mostrar un pedido recién insertado
pub const INSERT_DISPLAY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BoardStats {
    pub total: usize,
    pub despacho: usize,
    pub entregados: usize,
    /// Suma de `total_value` de los pedidos entregados
    pub recaudado: Decimal,
}

/// Reacción del tablero ante una notificación de cambio
#[derive(Debug, Clone, PartialEq)]
pub enum BoardAction {
    Prepend { order: Order, delay: Duration },
    Refetch,
    Ignore,
}

/// Límites `[00:00:00, 23:59:59.999]` hora local del día dado
pub fn day_bounds(date: NaiveDate) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let to_utc = |time: NaiveTime| {
        Local
            .from_local_datetime(&date.and_time(time))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| AppError::BadRequest(format!("Fecha local inválida: {}", date)))
    };

    let invalid_time = || AppError::Internal("hora de corte inválida".to_string());
    let start_time = NaiveTime::from_hms_opt(0, 0, 0).ok_or_else(invalid_time)?;
    let end_time = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).ok_or_else(invalid_time)?;
    Ok((to_utc(start_time)?, to_utc(end_time)?))
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Siguiente estado permitido; `None` para pedidos terminados
pub fn transition_for(order: &Order) -> Option<OrderStatus> {
    order.status.next()
}

pub fn can_assign_driver(order: &Order) -> bool {
    order.accepts_driver()
}

/// Avanza un pedido un solo paso. Sin token de concurrencia: gana la última escritura.
pub async fn advance_order(orders: &dyn OrderStore, id: Uuid) -> AppResult<Order> {
    let mut order = orders
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found_error("Order", &id.to_string()))?;

    let next = transition_for(&order).ok_or_else(|| {
        AppError::Conflict(format!(
            "El pedido {} ya está en estado final {}",
            order.public_id,
            order.status.as_str()
        ))
    })?;

    orders.update_status(id, next).await?;
    info!("🚚 Pedido {} → {}", order.public_id, next.as_str());

    order.status = next;
    Ok(order)
}

/// Asigna (o retira con `None`) el domiciliario de un pedido
pub async fn assign_order_driver(
    orders: &dyn OrderStore,
    id: Uuid,
    driver_id: Option<Uuid>,
) -> AppResult<Order> {
    let order = orders
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found_error("Order", &id.to_string()))?;
    ensure_accepts_driver(&order)?;

    orders.set_driver(id, driver_id).await?;
    info!("🛵 Pedido {} asignado a {:?}", order.public_id, driver_id);

    orders
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found_error("Order", &id.to_string()))
}

fn ensure_accepts_driver(order: &Order) -> AppResult<()> {
    if can_assign_driver(order) {
        Ok(())
    } else {
        Err(AppError::Conflict(format!(
            "El pedido {} no admite domiciliario",
            order.public_id
        )))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchBoard {
    date: NaiveDate,
    orders: Vec<Order>,
    active_drivers: Vec<DeliveryDriver>,
    #[serde(skip)]
    insert_delay: Duration,
}

impl DispatchBoard {
    /// Carga los pedidos del día y los domiciliarios activos
    pub async fn load(
        orders: &dyn OrderStore,
        drivers: &dyn DriverStore,
        date: NaiveDate,
    ) -> AppResult<Self> {
        let mut board = Self {
            date,
            orders: Vec::new(),
            active_drivers: drivers.list_active().await?,
            insert_delay: INSERT_DISPLAY_DELAY,
        };
        board.refetch(orders).await?;
        Ok(board)
    }

    pub fn with_insert_delay(mut self, delay: Duration) -> Self {
        self.insert_delay = delay;
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn active_drivers(&self) -> &[DeliveryDriver] {
        &self.active_drivers
    }

    pub async fn refetch(&mut self, orders: &dyn OrderStore) -> AppResult<()> {
        let (start, end) = day_bounds(self.date)?;
        self.orders = orders.list_created_between(start, end).await?;
        debug!("📋 Tablero {} recargado: {} pedidos", self.date, self.orders.len());
        Ok(())
    }

    pub async fn refresh_drivers(&mut self, drivers: &dyn DriverStore) -> AppResult<()> {
        self.active_drivers = drivers.list_active().await?;
        Ok(())
    }

    /// Estadísticas derivadas de los pedidos visibles
    pub fn stats(&self) -> BoardStats {
        self.orders.iter().fold(BoardStats::default(), |mut stats, order| {
            stats.total += 1;
            match order.status {
                OrderStatus::Despacho => stats.despacho += 1,
                OrderStatus::Entregado => {
                    stats.entregados += 1;
                    stats.recaudado += order.total_value;
                }
                _ => {}
            }
            stats
        })
    }

    pub async fn advance(&mut self, orders: &dyn OrderStore, id: Uuid) -> AppResult<()> {
        let updated = advance_order(orders, id).await?;
        if let Some(order) = self.orders.iter_mut().find(|o| o.id == id) {
            order.status = updated.status;
        }
        Ok(())
    }

    /// Cambio optimista; si el backend falla se restaura el domiciliario anterior
    pub async fn assign_driver(
        &mut self,
        orders: &dyn OrderStore,
        id: Uuid,
        driver_id: Option<Uuid>,
    ) -> AppResult<()> {
        let driver_name = driver_id.and_then(|driver_id| {
            self.active_drivers
                .iter()
                .find(|d| d.id == driver_id)
                .map(|d| d.full_name.clone())
        });

        let order = self
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| not_found_error("Order", &id.to_string()))?;
        ensure_accepts_driver(order)?;

        let previous = (order.driver_id, order.driver_name.clone());
        order.driver_id = driver_id;
        order.driver_name = driver_name;

        if let Err(e) = orders.set_driver(id, driver_id).await {
            warn!("⚠️ Asignación revertida para pedido {}: {}", id, e);
            if let Some(order) = self.orders.iter_mut().find(|o| o.id == id) {
                order.driver_id = previous.0;
                order.driver_name = previous.1;
            }
            return Err(e);
        }
        Ok(())
    }

    /// Decide qué hacer con una notificación; el payload de UPDATE/DELETE se descarta
    pub fn plan_change(&self, change: &OrderChange, today: NaiveDate) -> BoardAction {
        match (change.kind, &change.order) {
            (ChangeKind::Insert, Some(order)) if self.date == today => BoardAction::Prepend {
                order: order.clone(),
                delay: self.insert_delay,
            },
            (ChangeKind::Insert, _) => BoardAction::Ignore,
            _ => BoardAction::Refetch,
        }
    }

    pub fn prepend(&mut self, order: Order) {
        if self.orders.iter().any(|o| o.id == order.id) {
            return;
        }
        self.orders.insert(0, order);
    }

    /// Aplica una notificación completa, incluido el retardo de inserción.
    /// Devuelve `true` si el contenido visible pudo cambiar.
    pub async fn apply_change(
        &mut self,
        orders: &dyn OrderStore,
        change: &OrderChange,
        today: NaiveDate,
    ) -> AppResult<bool> {
        match self.plan_change(change, today) {
            BoardAction::Prepend { order, delay } => {
                tokio::time::sleep(delay).await;
                self.prepend(order);
                Ok(true)
            }
            BoardAction::Refetch => {
                self.refetch(orders).await?;
                Ok(true)
            }
            BoardAction::Ignore => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeliveryType, InvoiceLine, NewDriver, NewOrder};
    use crate::repositories::MemoryStore;
    use chrono::Duration as ChronoDuration;

    fn new_order(client: &str, total: i64, delivery_type: DeliveryType) -> NewOrder {
        NewOrder {
            public_id: "PED-0001A".to_string(),
            client_name: client.to_string(),
            total_value: Decimal::from(total),
            observations: String::new(),
            status: OrderStatus::Tomado,
            delivery_type,
            invoices: vec![InvoiceLine::default(), InvoiceLine::default()],
        }
    }

    fn noon(date: NaiveDate) -> DateTime<Utc> {
        Local
            .from_local_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
            .unwrap()
            .with_timezone(&Utc)
    }

    async fn driver(store: &MemoryStore, name: &str) -> DeliveryDriver {
        DriverStore::insert(
            store,
            &NewDriver {
                full_name: name.to_string(),
                phone: None,
                vehicle_plate: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn loads_only_orders_of_the_selected_day() {
        let store = MemoryStore::new();
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        store.insert_order_at(&new_order("AYER", 1, DeliveryType::Tienda), noon(day) - ChronoDuration::days(1));
        let first = store.insert_order_at(&new_order("UNO", 1, DeliveryType::Tienda), noon(day));
        let second = store.insert_order_at(
            &new_order("DOS", 1, DeliveryType::Tienda),
            noon(day) + ChronoDuration::hours(1),
        );

        let board = DispatchBoard::load(&store, &store, day).await.unwrap();
        let ids: Vec<Uuid> = board.orders().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn stats_only_collect_delivered_orders() {
        let store = MemoryStore::new();
        let day = today();
        let a = store.insert_order_at(&new_order("A", 10_000, DeliveryType::Domicilio), noon(day));
        let b = store.insert_order_at(&new_order("B", 20_000, DeliveryType::Domicilio), noon(day));
        store.insert_order_at(&new_order("C", 5_000, DeliveryType::Tienda), noon(day));

        let mut board = DispatchBoard::load(&store, &store, day).await.unwrap();
        board.advance(&store, a.id).await.unwrap();
        board.advance(&store, b.id).await.unwrap();
        board.advance(&store, b.id).await.unwrap();

        let stats = board.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.despacho, 1);
        assert_eq!(stats.entregados, 1);
        assert_eq!(stats.recaudado, Decimal::from(20_000));
    }

    #[tokio::test]
    async fn delivered_orders_cannot_advance() {
        let store = MemoryStore::new();
        let order = store.insert_order_at(&new_order("A", 1, DeliveryType::Tienda), Utc::now());
        assert_eq!(advance_order(&store, order.id).await.unwrap().status, OrderStatus::Despacho);
        assert_eq!(advance_order(&store, order.id).await.unwrap().status, OrderStatus::Entregado);
        assert!(matches!(advance_order(&store, order.id).await, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn driver_gate_follows_delivery_type_and_status() {
        let store = MemoryStore::new();
        let pickup = store.insert_order_at(&new_order("A", 1, DeliveryType::Tienda), Utc::now());
        let home = store.insert_order_at(&new_order("B", 1, DeliveryType::Domicilio), Utc::now());
        let juan = driver(&store, "JUAN").await;

        assert!(!can_assign_driver(&pickup));
        assert!(can_assign_driver(&home));
        assert!(matches!(
            assign_order_driver(&store, pickup.id, Some(juan.id)).await,
            Err(AppError::Conflict(_))
        ));

        let assigned = assign_order_driver(&store, home.id, Some(juan.id)).await.unwrap();
        assert_eq!(assigned.driver_name.as_deref(), Some("JUAN"));

        advance_order(&store, home.id).await.unwrap();
        let delivered = advance_order(&store, home.id).await.unwrap();
        assert!(!can_assign_driver(&delivered));
    }

    #[tokio::test]
    async fn failed_assignment_rolls_back() {
        let store = MemoryStore::new();
        let order = store.insert_order_at(&new_order("A", 1, DeliveryType::Domicilio), noon(today()));
        let juan = driver(&store, "JUAN").await;
        let pedro = driver(&store, "PEDRO").await;

        let mut board = DispatchBoard::load(&store, &store, today()).await.unwrap();
        board.assign_driver(&store, order.id, Some(juan.id)).await.unwrap();
        assert_eq!(board.orders()[0].driver_name.as_deref(), Some("JUAN"));

        store.fail_writes(true);
        assert!(board.assign_driver(&store, order.id, Some(pedro.id)).await.is_err());
        assert_eq!(board.orders()[0].driver_id, Some(juan.id));
        assert_eq!(board.orders()[0].driver_name.as_deref(), Some("JUAN"));
    }

    #[tokio::test]
    async fn unassigning_clears_driver() {
        let store = MemoryStore::new();
        let order = store.insert_order_at(&new_order("A", 1, DeliveryType::Domicilio), noon(today()));
        let juan = driver(&store, "JUAN").await;

        let mut board = DispatchBoard::load(&store, &store, today()).await.unwrap();
        board.assign_driver(&store, order.id, Some(juan.id)).await.unwrap();
        board.assign_driver(&store, order.id, None).await.unwrap();
        assert_eq!(board.orders()[0].driver_id, None);
        assert_eq!(board.orders()[0].driver_name, None);
    }

    #[tokio::test]
    async fn inserts_are_prepended_only_for_today() {
        let store = MemoryStore::new();
        let day = today();
        let board = DispatchBoard::load(&store, &store, day).await.unwrap();
        let order = store.insert_order_at(&new_order("A", 1, DeliveryType::Tienda), Utc::now());
        let insert = OrderChange {
            kind: ChangeKind::Insert,
            order: Some(order.clone()),
        };

        assert_eq!(
            board.plan_change(&insert, day),
            BoardAction::Prepend {
                order,
                delay: INSERT_DISPLAY_DELAY
            }
        );
        assert_eq!(
            board.plan_change(&insert, day + ChronoDuration::days(1)),
            BoardAction::Ignore
        );

        let update = OrderChange {
            kind: ChangeKind::Update,
            order: None,
        };
        assert_eq!(board.plan_change(&update, day), BoardAction::Refetch);
    }

    #[tokio::test]
    async fn update_notification_refetches() {
        let store = MemoryStore::new();
        let day = today();
        let order = store.insert_order_at(&new_order("A", 1, DeliveryType::Tienda), noon(day));
        let mut board = DispatchBoard::load(&store, &store, day)
            .await
            .unwrap()
            .with_insert_delay(Duration::ZERO);

        store.update_status(order.id, OrderStatus::Despacho).await.unwrap();
        let change = OrderChange {
            kind: ChangeKind::Update,
            order: None,
        };
        assert!(board.apply_change(&store, &change, day).await.unwrap());
        assert_eq!(board.orders()[0].status, OrderStatus::Despacho);
    }

    #[tokio::test]
    async fn insert_notification_is_prepended_after_delay_once() {
        let store = MemoryStore::new();
        let day = today();
        let existing = store.insert_order_at(&new_order("A", 1, DeliveryType::Tienda), noon(day));
        let mut board = DispatchBoard::load(&store, &store, day)
            .await
            .unwrap()
            .with_insert_delay(Duration::from_millis(20));

        let order = store.insert_order_at(&new_order("B", 2, DeliveryType::Tienda), Utc::now());
        let insert = OrderChange {
            kind: ChangeKind::Insert,
            order: Some(order.clone()),
        };

        let started = std::time::Instant::now();
        assert!(board.apply_change(&store, &insert, day).await.unwrap());
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert_eq!(board.orders()[0].id, order.id);
        assert_eq!(board.orders()[1].id, existing.id);

        board.apply_change(&store, &insert, day).await.unwrap();
        assert_eq!(board.orders().len(), 2);
    }

    #[tokio::test]
    async fn insert_for_another_day_leaves_board_untouched() {
        let store = MemoryStore::new();
        let day = today();
        let mut board = DispatchBoard::load(&store, &store, day)
            .await
            .unwrap()
            .with_insert_delay(Duration::ZERO);
        let order = store.insert_order_at(&new_order("A", 1, DeliveryType::Tienda), Utc::now());
        let insert = OrderChange {
            kind: ChangeKind::Insert,
            order: Some(order),
        };

        let tomorrow = day + ChronoDuration::days(1);
        assert!(!board.apply_change(&store, &insert, tomorrow).await.unwrap());
        assert!(board.orders().is_empty());
    }

    #[test]
    fn day_bounds_cover_the_whole_local_day() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let (start, end) = day_bounds(day).unwrap();
        assert_eq!(start.with_timezone(&Local).date_naive(), day);
        assert_eq!(end.with_timezone(&Local).date_naive(), day);
        assert_eq!((end - start).num_milliseconds(), 24 * 3600 * 1000 - 1);
    }
}
