use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tokio::net::TcpListener;
use traffic_classifier::{
    config::AppConfig,
    model::{loader::ArtifactLocator, store::ArtifactStore},
    predictor::Predictor,
    server,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Init
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "traffic_classifier=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    let metrics = PrometheusBuilder::new().install_recorder()?;

    // 2. Load Config
    let config = AppConfig::load()?;

    // 3. Artifacts are resolved per request (or once, when cached)
    let locator = ArtifactLocator::new(&config.artifacts);
    let [primary, fallback] = locator.candidates(&config.artifacts.classifier_file);
    tracing::info!(
        primary = %primary.display(),
        fallback = %fallback.display(),
        cache = config.artifacts.cache,
        "artifact search paths"
    );
    let store = ArtifactStore::new(locator, config.artifacts.cache);
    let predictor = Predictor::new(Arc::new(store));

    // 4. Create Router
    let app = server::routes::create_router(predictor, Some(metrics));

    // 5. Bind & Serve
    let listener =
        TcpListener::bind(format!("{}:{}", config.server.host, config.server.port)).await?;
    tracing::info!(
        "ML service listening on http://{}:{}",
        config.server.host,
        config.server.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}
