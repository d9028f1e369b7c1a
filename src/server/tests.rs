mod router_tests {
    use crate::fixtures;
    use crate::model::{loader::ArtifactLocator, store::ArtifactStore};
    use crate::predictor::Predictor;
    use crate::server::{handlers, routes, types::HealthResponse};
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt; // for `app.oneshot()`

    fn app_for(base: &Path) -> Router {
        let locator = ArtifactLocator::new(&fixtures::artifact_config(base));
        let predictor = Predictor::new(Arc::new(ArtifactStore::new(locator, false)));
        routes::create_router(predictor, None)
    }

    fn app_with_artifacts() -> (TempDir, Router) {
        let dir = TempDir::new().unwrap();
        fixtures::write_artifacts(&dir.path().join("models"));
        let app = app_for(dir.path());
        (dir, app)
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_check_handler() {
        let response = handlers::health_check().await;
        assert_eq!(response.0, HealthResponse::HEALTHY);
    }

    #[tokio::test]
    async fn test_health_route_without_artifacts() {
        let dir = TempDir::new().unwrap();
        let request = Request::get("/health").body(Body::empty()).unwrap();

        let (status, body) = send(app_for(dir.path()), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"status": "healthy", "message": "ML service is running"})
        );
    }

    #[tokio::test]
    async fn test_predict_example() {
        let (_dir, app) = app_with_artifacts();
        let request = post_json(r#"{"csv_data": "f1,f2\n1.0,2.0\n3.0,4.0\n"}"#);

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "predictions": [
                    {"index": 0, "category": 0, "label": "Streaming"},
                    {"index": 1, "category": 3, "label": "Web"}
                ],
                "categoryCounts": [
                    {"category": "Streaming", "count": 1},
                    {"category": "Web", "count": 1}
                ],
                "message": "Predictions completed successfully"
            })
        );
    }

    #[tokio::test]
    async fn test_predict_missing_csv_data() {
        let (_dir, app) = app_with_artifacts();

        let (status, body) = send(app, post_json(r#"{"rows": []}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No CSV data provided"}));
    }

    #[tokio::test]
    async fn test_predict_empty_object() {
        let (_dir, app) = app_with_artifacts();

        let (status, body) = send(app, post_json("{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No CSV data provided"}));
    }

    #[tokio::test]
    async fn test_predict_without_artifacts() {
        let dir = TempDir::new().unwrap();
        let request = post_json(r#"{"csv_data": "f1,f2\n1,2\n"}"#);

        let (status, body) = send(app_for(dir.path()), request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error = body["error"].as_str().unwrap();
        assert!(error.starts_with("Prediction failed: Model files not found"), "{}", error);
    }

    #[tokio::test]
    async fn test_predict_shape_mismatch() {
        let (_dir, app) = app_with_artifacts();
        let request = post_json(r#"{"csv_data": "f1,f2,f3\n1,2,3\n"}"#);

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"error": "Prediction failed: X has 3 features, but StandardScaler is expecting 2 features as input."})
        );
    }

    #[tokio::test]
    async fn test_predict_null_csv_data() {
        let (_dir, app) = app_with_artifacts();

        let (status, body) = send(app, post_json(r#"{"csv_data": null}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"error": "Prediction failed: No columns to parse from file"})
        );
    }

    #[tokio::test]
    async fn test_predict_malformed_json_is_service_error() {
        let (_dir, app) = app_with_artifacts();

        let (status, body) = send(app, post_json("{not json")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error = body["error"].as_str().unwrap();
        assert!(error.starts_with("Service error: "), "{}", error);
    }

    #[tokio::test]
    async fn test_predict_wrong_content_type_is_service_error() {
        let (_dir, app) = app_with_artifacts();
        let request = Request::post("/predict")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from(r#"{"csv_data": "f1,f2\n1,2\n"}"#))
            .unwrap();

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().starts_with("Service error: "));
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let (_dir, app) = app_with_artifacts();
        let request = Request::get("/health")
            .header(header::ORIGIN, "https://dashboard.example.com")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_metrics_route_absent_without_handle() {
        let (_dir, app) = app_with_artifacts();
        let request = Request::get("/metrics").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
