use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};

use fast_order::config::database::DatabaseConfig;
use fast_order::config::environment::EnvironmentConfig;
use fast_order::database::DatabaseConnection;
use fast_order::repositories::Stores;
use fast_order::services::{auth_service, change_feed};
use fast_order::state::{AppState, INTAKE_MAX_IDLE_HOURS};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();
    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(config.tracing_level())
        .init();

    info!("🛵 Fast Order - Captura y despacho de pedidos");
    info!("============================================");

    // Inicializar base de datos
    let db_config = DatabaseConfig::new(&config.database_url);
    let db_connection = match DatabaseConnection::new(&db_config).await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };
    let pool = db_connection.pool().clone();

    // Feed de cambios de pedidos
    let changes = change_feed::channel();
    let listener_handle = change_feed::spawn_listener(&pool, changes.clone()).await?;

    let stores = Stores::postgres(pool);
    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        let profiles = stores.profiles.as_ref();
        if let Err(e) = auth_service::bootstrap_admin(profiles, email, password).await {
            warn!("⚠️ No se pudo crear el administrador inicial: {}", e);
        }
    }

    let app_state = AppState::new(config.clone(), stores, changes)?;

    // Limpieza periódica de sesiones expiradas y formularios abandonados
    let cleanup_state = app_state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(600));
        loop {
            interval.tick().await;
            let removed = cleanup_state.sessions.cleanup_expired().await;
            if removed > 0 {
                info!("🧹 {} sesiones expiradas eliminadas", removed);
            }
            let stale = cleanup_state
                .cleanup_stale_intakes(chrono::Duration::hours(INTAKE_MAX_IDLE_HOURS))
                .await;
            if stale > 0 {
                info!("🧹 {} formularios abandonados descartados", stale);
            }
        }
    });

    let app = fast_order::build_router(app_state);
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Estado del servicio");
    info!("🔑 Autenticación:");
    info!("   POST /api/auth/login - Login");
    info!("   POST /api/auth/logout - Cerrar sesión");
    info!("   GET  /api/auth/me - Operador actual");
    info!("📝 Captura:");
    info!("   POST /api/intake - Abrir formulario");
    info!("   GET  /api/intake/:id - Estado del formulario");
    info!("   PATCH /api/intake/:id - Editar campos");
    info!("   POST /api/intake/:id/focus - Foco de ventana con portapapeles");
    info!("   POST /api/intake/:id/listening - Pausar o reanudar escucha");
    info!("   POST /api/intake/:id/reset - Reiniciar formulario");
    info!("   POST /api/intake/:id/save - Guardar pedido");
    info!("   POST /api/intake/magic-paste - Pegado mágico de facturas");
    info!("📦 Tablero de despacho:");
    info!("   GET  /api/orders?date= - Pedidos del día");
    info!("   GET  /api/orders/live?date= - Tablero en vivo (SSE)");
    info!("   POST /api/orders - Crear pedido completo");
    info!("   POST /api/orders/:id/advance - Avanzar estado");
    info!("   PUT  /api/orders/:id/driver - Asignar domiciliario");
    info!("👥 Clientes:");
    info!("   GET  /api/clients/search?q= - Buscar clientes");
    info!("   GET  /api/clients/prefill?q= - Prellenar nombre");
    info!("   POST /api/clients - Crear cliente");
    info!("   POST /api/registro - Registro público");
    info!("🛵 Domiciliarios:");
    info!("   GET  /api/drivers - Listar domiciliarios");
    info!("   GET  /api/drivers/active - Domiciliarios activos");
    info!("   POST /api/drivers - Crear domiciliario");
    info!("   POST /api/drivers/:id/toggle - Activar o desactivar");
    info!("🛡️ Administración:");
    info!("   GET  /api/admin/users - Listar usuarios");
    info!("   POST /api/admin/users/:id/toggle-role - Cambiar rol");
    info!("   POST /api/admin/users/:id/toggle-active - Activar o desactivar");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let service = app.into_make_service_with_connect_info::<SocketAddr>();
    if let Err(e) = axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
    }

    listener_handle.abort();
    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
