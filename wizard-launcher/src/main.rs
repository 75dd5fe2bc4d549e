mod cli;

use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use tower_http::services::ServeDir;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = cli::Cli::parse();
    let config = cli.app_config();
    for (name, missing) in [
        ("GROQ_API_KEY", config.groq_api_key.is_none()),
        ("EXA_API_KEY", config.exa_api_key.is_none()),
        ("RUNWARE_API_KEY", config.runware_api_key.is_none()),
    ] {
        if missing {
            tracing::warn!("{} is not set; requests that need it will fail", name);
        }
    }

    let router = match &cli.static_dir {
        Some(dir) => Router::new().fallback_service(ServeDir::new(dir)),
        None => Router::new(),
    };
    let router = backend::init(router, config);

    let addr = SocketAddr::new(cli.host, cli.port);
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
