//! Almacén en memoria
//!
//! Implementa todos los traits de repositorio sobre vectores protegidos por
//! `Mutex`. Lo usan las pruebas de componentes y de rutas; permite simular
//! fallas de escritura del backend y publica cambios de pedidos igual que el
//! trigger de PostgreSQL.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::client_repository::DUPLICATE_PHONE_MESSAGE;
use super::{ClientStore, DriverStore, OrderStore, ProfileStore};
use crate::models::{
    ChangeKind, Client, DeliveryDriver, NewClient, NewDriver, NewOrder, NewProfile, Order,
    OrderChange, OrderStatus, Profile, UserRole,
};
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Default)]
pub struct MemoryStore {
    orders: Mutex<Vec<Order>>,
    clients: Mutex<Vec<Client>>,
    drivers: Mutex<Vec<DeliveryDriver>>,
    profiles: Mutex<Vec<Profile>>,
    fail_writes: AtomicBool,
    client_searches: AtomicUsize,
    order_inserts: AtomicUsize,
    changes: Option<broadcast::Sender<OrderChange>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publica INSERT/UPDATE de pedidos en el canal dado
    pub fn with_changes(mut self, sender: broadcast::Sender<OrderChange>) -> Self {
        self.changes = Some(sender);
        self
    }

    /// A partir de ahora toda escritura falla como lo haría el backend
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn client_search_calls(&self) -> usize {
        self.client_searches.load(Ordering::SeqCst)
    }

    pub fn order_insert_calls(&self) -> usize {
        self.order_inserts.load(Ordering::SeqCst)
    }

    /// Inserta un pedido con fecha de creación explícita
    pub fn insert_order_at(&self, order: &NewOrder, created_at: DateTime<Utc>) -> Order {
        let created = Order {
            id: Uuid::new_v4(),
            public_id: order.public_id.clone(),
            client_name: order.client_name.clone(),
            total_value: order.total_value,
            observations: Some(order.observations.clone()),
            status: order.status,
            delivery_type: order.delivery_type,
            invoices_data: Json(order.invoices.clone()),
            created_at,
            driver_id: None,
            driver_name: None,
        };
        lock(&self.orders).push(created.clone());
        self.publish(ChangeKind::Insert, Some(created.clone()));
        created
    }

    /// Inserta un perfil directamente, sin pasar por el hash de contraseña
    pub fn seed_profile(&self, email: &str, full_name: &str, role: UserRole) -> Profile {
        let profile = Profile {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: String::new(),
            full_name: full_name.to_string(),
            role,
            is_active: true,
            updated_at: Utc::now(),
        };
        lock(&self.profiles).push(profile.clone());
        profile
    }

    fn check_writes(&self) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::Protocol(
                "simulated backend failure".to_string(),
            )));
        }
        Ok(())
    }

    fn publish(&self, kind: ChangeKind, order: Option<Order>) {
        if let Some(sender) = &self.changes {
            // Sin suscriptores el envío falla; no es un error
            let _ = sender.send(OrderChange { kind, order });
        }
    }

    fn with_driver_name(&self, mut order: Order) -> Order {
        order.driver_name = order.driver_id.and_then(|driver_id| {
            lock(&self.drivers)
                .iter()
                .find(|d| d.id == driver_id)
                .map(|d| d.full_name.clone())
        });
        order
    }

    fn update_order<F>(&self, id: Uuid, apply: F) -> AppResult<()>
    where
        F: FnOnce(&mut Order),
    {
        self.check_writes()?;
        let updated = {
            let mut orders = lock(&self.orders);
            let order = orders
                .iter_mut()
                .find(|o| o.id == id)
                .ok_or_else(|| not_found_error("Order", &id.to_string()))?;
            apply(order);
            order.clone()
        };
        self.publish(ChangeKind::Update, Some(updated));
        Ok(())
    }

    fn update_profile<F>(&self, id: Uuid, apply: F) -> AppResult<()>
    where
        F: FnOnce(&mut Profile),
    {
        self.check_writes()?;
        let mut profiles = lock(&self.profiles);
        let profile = profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found_error("Profile", &id.to_string()))?;
        apply(profile);
        profile.updated_at = Utc::now();
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack
        .map(|h| h.to_lowercase().contains(needle))
        .unwrap_or(false)
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, order: &NewOrder) -> AppResult<Order> {
        self.order_inserts.fetch_add(1, Ordering::SeqCst);
        self.check_writes()?;
        Ok(self.insert_order_at(order, Utc::now()))
    }

    async fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Order>> {
        let mut orders: Vec<Order> = lock(&self.orders)
            .iter()
            .filter(|o| o.created_at >= start && o.created_at <= end)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders.into_iter().map(|o| self.with_driver_name(o)).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        let found = lock(&self.orders).iter().find(|o| o.id == id).cloned();
        Ok(found.map(|o| self.with_driver_name(o)))
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> AppResult<()> {
        self.update_order(id, |order| order.status = status)
    }

    async fn set_driver(&self, id: Uuid, driver_id: Option<Uuid>) -> AppResult<()> {
        self.update_order(id, |order| order.driver_id = driver_id)
    }
}

#[async_trait]
impl ClientStore for MemoryStore {
    async fn search(&self, term: &str, limit: i64) -> AppResult<Vec<Client>> {
        self.client_searches.fetch_add(1, Ordering::SeqCst);
        let needle = term.to_lowercase();
        Ok(lock(&self.clients)
            .iter()
            .filter(|c| {
                contains_ignore_case(Some(&c.full_name), &needle)
                    || contains_ignore_case(c.phone.as_deref(), &needle)
                    || contains_ignore_case(c.document_id.as_deref(), &needle)
            })
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Client>> {
        Ok(lock(&self.clients).iter().find(|c| c.id == id).cloned())
    }

    async fn insert(&self, client: &NewClient) -> AppResult<Client> {
        self.check_writes()?;
        let mut clients = lock(&self.clients);
        if let Some(phone) = &client.phone {
            if clients.iter().any(|c| c.phone.as_ref() == Some(phone)) {
                return Err(AppError::Conflict(DUPLICATE_PHONE_MESSAGE.to_string()));
            }
        }
        let created = Client {
            id: Uuid::new_v4(),
            first_name: Some(client.first_name.clone()),
            last_name: Some(client.last_name.clone()),
            full_name: client.full_name.clone(),
            phone: client.phone.clone(),
            document_id: client.document_id.clone(),
            email: client.email.clone(),
            address: client.address.clone(),
            notes: client.notes.clone(),
            total_orders: 0,
            last_order_date: None,
            created_at: Utc::now(),
        };
        clients.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl DriverStore for MemoryStore {
    async fn list_all(&self) -> AppResult<Vec<DeliveryDriver>> {
        let mut drivers = lock(&self.drivers).clone();
        drivers.sort_by(|a, b| {
            b.is_active
                .cmp(&a.is_active)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(drivers)
    }

    async fn list_active(&self) -> AppResult<Vec<DeliveryDriver>> {
        let mut drivers: Vec<DeliveryDriver> = lock(&self.drivers)
            .iter()
            .filter(|d| d.is_active)
            .cloned()
            .collect();
        drivers.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(drivers)
    }

    async fn insert(&self, driver: &NewDriver) -> AppResult<DeliveryDriver> {
        self.check_writes()?;
        let created = DeliveryDriver {
            id: Uuid::new_v4(),
            full_name: driver.full_name.clone(),
            phone: driver.phone.clone(),
            vehicle_plate: driver.vehicle_plate.clone(),
            is_active: true,
            created_at: Utc::now(),
        };
        lock(&self.drivers).push(created.clone());
        Ok(created)
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> AppResult<()> {
        self.check_writes()?;
        let mut drivers = lock(&self.drivers);
        let driver = drivers
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| not_found_error("Driver", &id.to_string()))?;
        driver.is_active = is_active;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Profile>> {
        Ok(lock(&self.profiles).iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Profile>> {
        Ok(lock(&self.profiles)
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<Profile>> {
        let mut profiles = lock(&self.profiles).clone();
        profiles.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(profiles)
    }

    async fn insert(&self, profile: &NewProfile) -> AppResult<Profile> {
        self.check_writes()?;
        let mut profiles = lock(&self.profiles);
        if profiles.iter().any(|p| p.email.eq_ignore_ascii_case(&profile.email)) {
            return Err(AppError::Conflict("El email ya está registrado".to_string()));
        }
        let created = Profile {
            id: Uuid::new_v4(),
            email: profile.email.clone(),
            password_hash: profile.password_hash.clone(),
            full_name: profile.full_name.clone(),
            role: profile.role,
            is_active: true,
            updated_at: Utc::now(),
        };
        profiles.push(created.clone());
        Ok(created)
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> AppResult<()> {
        self.update_profile(id, |p| p.role = role)
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> AppResult<()> {
        self.update_profile(id, |p| p.is_active = is_active)
    }
}
