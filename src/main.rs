use std::net::SocketAddr;

use dotenvy::dotenv;
use rollcall::logging::{init_tracing, shutdown_tracer};
use rollcall::metrics::{init_metrics, metrics_app};
use rollcall::middleware::rate_limit::spawn_limiter_pruning;
use rollcall::router::init_router;
use rollcall::state::init_app_state;
use rollcall_config::ServerConfig;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let server = ServerConfig::from_env();

    let state = match init_app_state(&server).await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to initialize application state");
            std::process::exit(1);
        }
    };

    if let Some(handle) = init_metrics() {
        let metrics_address = server.metrics_address();
        tokio::spawn(async move {
            match tokio::net::TcpListener::bind(&metrics_address).await {
                Ok(listener) => {
                    info!("Metrics available at http://{}/metrics", metrics_address);
                    if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                        error!(error = %e, "Metrics server stopped");
                    }
                }
                Err(e) => {
                    error!(error = %e, address = %metrics_address, "Failed to bind metrics server")
                }
            }
        });
    }

    if state.rate_limit_config.enabled {
        spawn_limiter_pruning(state.auth_limiter.clone());
    }

    let app = init_router(state);
    let address = server.bind_address();

    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, %address, "Failed to bind server");
            std::process::exit(1);
        }
    };

    info!("Server running on http://{}", address);
    info!("Swagger UI available at http://{}/swagger-ui", address);
    info!("Scalar UI available at http://{}/scalar", address);

    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    if let Err(e) = result {
        error!(error = %e, "Server error");
    }

    shutdown_tracer().await;
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
