use std::sync::Arc;

use ordersystem::config::ServerConfig;
use ordersystem::net::reqwest_transport::ReqwestTransport;
use ordersystem::pages::{self, PagesState};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };
    let transport = match ReqwestTransport::new() {
        Ok(transport) => transport,
        Err(e) => {
            tracing::error!(error = %e, "http client init failed");
            std::process::exit(1);
        }
    };

    let state = PagesState {
        config: config.client.clone(),
        transport: Arc::new(transport),
        pkg_dir: config.site_root.join("pkg"),
    };
    let app = pages::router(state);

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, port = config.port, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(port = config.port, api = %config.client.api_base_url, "ordersystem listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server failed");
    }
}
