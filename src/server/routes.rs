use crate::predictor::Predictor;
use crate::server::{handlers, types::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn create_router(predictor: Predictor, metrics: Option<PrometheusHandle>) -> Router {
    let with_metrics = metrics.is_some();
    let state = Arc::new(AppState {
        predictor: Arc::new(predictor),
        metrics,
    });

    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/predict", post(handlers::predict));

    if with_metrics {
        router = router.route("/metrics", get(handlers::render_metrics));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
