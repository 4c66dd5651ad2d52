use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dealer_portal_backend::clients::HttpDealerApi;
use dealer_portal_backend::config::AppConfig;
use dealer_portal_backend::domain::{CalendarService, PaymentService};
use dealer_portal_backend::rest::{self, AppState};
use dealer_portal_backend::storage::{SessionRepository, YamlConnection};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    info!(
        "Starting dealer portal backend against {}",
        config.dealer_api_base_url
    );

    let connection = YamlConnection::new(&config.data_dir)?;
    let sessions = Arc::new(SessionRepository::new(connection));
    let api = Arc::new(HttpDealerApi::new(config.dealer_api_base_url.clone()));

    let calendar_service = Arc::new(CalendarService::new());
    let payment_service = Arc::new(PaymentService::new(
        api.clone(),
        sessions,
        config.reconciliation_policy,
    ));

    let state = AppState::new(calendar_service, payment_service, api);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = rest::router(state).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
