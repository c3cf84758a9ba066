use anyhow::Context as _;
use sea_orm::Database;
use tracing::{info, warn};

use slotbook_core::config::Config as _;
use slotbook_core::tracing::init_tracing;

use slotbook_reservations::config::{ReservationsConfig, StoreBackend};
use slotbook_reservations::infra::Store;
use slotbook_reservations::infra::db::DbStore;
use slotbook_reservations::infra::memory::MemoryStore;
use slotbook_reservations::router::{RouterOptions, build_router};
use slotbook_reservations::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ReservationsConfig::from_env().context("load configuration")?;
    init_tracing(config.log_format);

    let store = match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;
            let db = Database::connect(url)
                .await
                .context("connect to database")?;
            Store::Db(DbStore {
                db,
                lock_timeout: config.lock_timeout(),
            })
        }
        StoreBackend::Memory => {
            warn!("using in-memory store; data is lost on restart");
            Store::Memory(MemoryStore::new(config.lock_timeout()))
        }
    };

    let state = AppState {
        store,
        seed_staff: config.seed_staff(),
    };
    if config.enable_initialize {
        warn!("POST /initialize is enabled");
    }
    let router = build_router(
        state,
        RouterOptions {
            enable_initialize: config.enable_initialize,
        },
    );

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    info!("reservations service listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("reservations service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
