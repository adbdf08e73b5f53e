use axum::{
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use pettycash_rs::{
    config::Config,
    db::init_pool,
    health::health,
    routes::approve::approve_bill,
    routes::bills::{add_bill, create_bill_batch},
    routes::cancel::{cancel_bill, cancel_bill_by_user, generate_cancel_otp},
    routes::forwarding::{send_to_admin, send_to_tally},
    routes::passbook::{add_cash, store_transitions},
    routes::reissue::update_batch,
    routes::voucher::get_voucher,
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    tracing::info!("Starting petty cash service...");

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration from environment");

    tracing::info!(
        "Configuration loaded: host={}, port={}",
        config.host,
        config.port
    );

    // Database connection
    tracing::info!("Connecting to database...");
    let pool = init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    sqlx::migrate!("./db/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Build the application router
    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/bills", post(create_bill_batch))
        .route("/api/bills/addbill", post(add_bill))
        .route("/api/bills/approve/{voucher}", put(approve_bill))
        .route("/api/bills/generateCancelOtp/{voucher}", post(generate_cancel_otp))
        .route("/api/bills/cancel/{voucher}", put(cancel_bill))
        .route("/api/bills/cancel-by-user/{voucher}", put(cancel_bill_by_user))
        .route("/api/bills/update-batch/{voucher}", put(update_batch))
        .route("/api/bills/send-to-admin", post(send_to_admin))
        .route("/api/bills/send-to-tally", post(send_to_tally))
        .route("/api/bills/voucher/{voucher}", get(get_voucher))
        .route("/api/passbook", post(add_cash))
        .route("/api/passbook/store/{store_id}", get(store_transitions))
        .with_state(Arc::new(pool.clone()))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        );

    // Bind to the configured address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Petty cash service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    // Start the server
    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
