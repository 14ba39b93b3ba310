//! API server entry point.

use std::sync::Arc;

use api::config::Config;
use order_store::{InMemoryOrderRepository, OrderRepository, PostgresOrderRepository};
use saga::{GrpcIdentityValidator, HttpStockCatalogClient};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

async fn order_repository(config: &Config) -> Arc<dyn OrderRepository> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, orders are kept in memory");
        return Arc::new(InMemoryOrderRepository::new());
    };

    let repo = PostgresOrderRepository::connect(database_url, config.collaborator_timeout)
        .await
        .expect("failed to connect to PostgreSQL");
    repo.run_migrations()
        .await
        .expect("failed to run migrations");
    tracing::info!("connected to PostgreSQL");
    Arc::new(repo)
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Wire collaborators
    let orders = order_repository(&config).await;
    let identity = GrpcIdentityValidator::connect_lazy(
        &config.user_service_addr,
        config.collaborator_timeout,
    )
    .expect("invalid USER_SERVICE_ADDR");
    let catalog = HttpStockCatalogClient::new(
        &config.product_service_base_url,
        config.collaborator_timeout,
    )
    .expect("invalid PRODUCT_SERVICE_BASEURL");
    tracing::info!(
        identity = %config.user_service_addr,
        catalog = %config.product_service_base_url,
        timeout_ms = config.collaborator_timeout.as_millis() as u64,
        "collaborators configured"
    );

    let state = api::create_state(
        orders,
        Arc::new(identity),
        Arc::new(catalog),
        config.collaborator_timeout,
    );

    // 4. Build the application
    let app = api::create_app(state, metrics_handle);

    // 5. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
