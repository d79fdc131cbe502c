use std::env;

use auction_results::AsyncAuctionResults;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut builder = AsyncAuctionResults::builder();
    if let Ok(path) = env::var("AUCTION_DB") {
        builder = builder.database_path(path);
    }
    if let Ok(url) = env::var("RETRIEVER_URL") {
        builder = builder.retriever_url(url);
    }

    let client = builder
        .build()
        .await
        .expect("Failed to open auction results store");
    tracing::info!("Results store ready.");

    let app = auction_results::server::router(client).layer(CorsLayer::permissive());

    let addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "Listening.");
    axum::serve(listener, app).await.expect("Server error");
}
