#[cfg(feature = "http-server")]
mod api; // HTTP routes
mod config;
mod error;
mod models;
mod services;

use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;

use config::Config;
use services::{CarbonEstimator, OpenRouterService};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before the logger so RUST_LOG can live there too
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("🚀 Starting Carbon Footprint Estimator...");

    let config = Config::from_env()?;
    let estimator = build_estimator(&config)?;

    #[cfg(feature = "http-server")]
    serve(config, estimator).await?;

    #[cfg(not(feature = "http-server"))]
    estimate_args(estimator).await?;

    Ok(())
}

/// The estimator is only built when a credential exists; without one the
/// estimate routes answer with a configuration error.
fn build_estimator(config: &Config) -> Result<Option<Arc<CarbonEstimator>>> {
    let Some(api_key) = config.openrouter_api_key.clone() else {
        log::warn!("⚠️ OPENROUTER_API_KEY not set, estimate requests will be rejected");
        return Ok(None);
    };

    let backend = OpenRouterService::new(
        api_key,
        config.openrouter_model.clone(),
        &config.openrouter_base_url,
        config.openrouter_timeout,
    )?;
    log::info!("✅ OpenRouter service initialized with model: {}", backend.model());

    Ok(Some(Arc::new(CarbonEstimator::new(Arc::new(backend)))))
}

#[cfg(feature = "http-server")]
async fn serve(config: Config, estimator: Option<Arc<CarbonEstimator>>) -> Result<()> {
    let app = api::create_router(
        api::AppState {
            estimator,
            ping_message: config.ping_message.clone(),
        },
        config.static_dir.as_deref(),
    );

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("🌐 HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            log::info!("🛑 Shutting down...");
        })
        .await?;

    Ok(())
}

/// Without the HTTP server, estimate each command-line argument and print JSON.
#[cfg(not(feature = "http-server"))]
async fn estimate_args(estimator: Option<Arc<CarbonEstimator>>) -> Result<()> {
    let estimator =
        estimator.ok_or_else(|| anyhow::anyhow!("OPENROUTER_API_KEY must be set"))?;

    for dish in std::env::args().skip(1) {
        let dish = dish.trim();
        if dish.is_empty() {
            continue;
        }
        let result = estimator.estimate_from_text(dish).await;
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}
