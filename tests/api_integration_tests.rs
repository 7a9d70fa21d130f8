// API Integration Tests
//
// Purpose: Exercise every endpoint through the router with an in-memory model
// Run with: cargo test --features api --test api_integration_tests

#[cfg(feature = "api")]
mod api_tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use fertilizer_advisor::training::{train, Dataset, TrainingConfig};
    use fertilizer_advisor::{create_router, AppState, Classifier, ReferenceData};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt; // for oneshot

    // Helper: two-class dataset separable on nitrogen
    fn dataset() -> Dataset {
        let mut ds = Dataset::default();
        for i in 0..30 {
            let j = (i % 6) as f64;
            ds.rows.push([6.3 + j * 0.05, 10.0 + j, 40.0 + j, 40.0 + j, 50.0]);
            ds.labels.push("Urea".to_string());
            ds.rows.push([6.8 + j * 0.05, 90.0 + j, 12.0 + j, 40.0 + j, 50.0]);
            ds.labels.push("DAP".to_string());
        }
        ds
    }

    // Helper: Create test app, optionally with a trained classifier
    fn create_test_app(with_model: bool) -> axum::Router {
        let classifier: Option<Arc<dyn Classifier>> = if with_model {
            let config = TrainingConfig { samples_per_class: 40, n_estimators: 15, ..TrainingConfig::default() };
            Some(Arc::new(train(&dataset(), &config).unwrap()))
        } else {
            None
        };
        let state = AppState::new(ReferenceData::builtin().unwrap(), classifier);
        create_router(state)
    }

    // Helper: Parse JSON response
    async fn json_response(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        serde_json::from_slice(&body).expect("Failed to parse JSON")
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    // =========================================================================
    // Section 1: Liveness
    // =========================================================================

    #[tokio::test]
    async fn test_home() {
        let response = create_test_app(false).oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Fertilizer Recommendation API is Running!");
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = create_test_app(true).oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
        assert_eq!(body["model_loaded"], true);
        assert_eq!(body["model_classes"], json!(["DAP", "Urea"]));
    }

    #[tokio::test]
    async fn test_health_check_without_model() {
        let response = create_test_app(false).oneshot(get("/health")).await.unwrap();
        let body = json_response(response).await;
        assert_eq!(body["model_loaded"], false);
        assert!(body["model_classes"].is_null());
    }

    // =========================================================================
    // Section 1b: Startup loading
    // =========================================================================

    #[tokio::test]
    async fn test_load_with_broken_model_disables_inference() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        std::fs::write(&model_path, "{\"format_version\": 1").unwrap();

        let state = AppState::load(model_path.to_str().unwrap(), None).unwrap();
        assert!(state.classifier.is_none());

        let response = create_router(state)
            .oneshot(post_json("/recommend", json!({"pH": 6.4, "N": 12, "P": 42, "K": 41, "Moisture": 50})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_load_with_missing_model_keeps_reference() {
        let state = AppState::load("/nonexistent/fertilizer_model.json", None).unwrap();
        assert!(state.classifier.is_none());
        assert!(state.reference.crop("Rice").is_ok());
    }

    #[test]
    fn test_load_with_invalid_reference_fails() {
        let dir = tempfile::tempdir().unwrap();
        let reference_path = dir.path().join("reference.json");
        std::fs::write(&reference_path, "{not json").unwrap();

        let result = AppState::load("/nonexistent/fertilizer_model.json", reference_path.to_str());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_with_missing_reference_fails() {
        assert!(AppState::load("/nonexistent/fertilizer_model.json", Some("/nonexistent/reference.json")).is_err());
    }

    // =========================================================================
    // Section 2: Inference boundary
    // =========================================================================

    #[tokio::test]
    async fn test_recommend_success() {
        let response = create_test_app(true)
            .oneshot(post_json("/recommend", json!({"pH": 6.4, "N": 12, "P": 42, "K": 41, "Moisture": 50})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_response(response).await;
        assert_eq!(body["recommended_fertilizer"], "Urea");
    }

    #[tokio::test]
    async fn test_recommend_is_deterministic() {
        let app = create_test_app(true);
        let reading = json!({"pH": 6.6, "N": 50, "P": 25, "K": 40, "Moisture": 50});

        let first = json_response(app.clone().oneshot(post_json("/recommend", reading.clone())).await.unwrap()).await;
        let second = json_response(app.oneshot(post_json("/recommend", reading)).await.unwrap()).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_recommend_missing_field() {
        let response = create_test_app(true)
            .oneshot(post_json("/recommend", json!({"pH": 6.4, "N": 12, "P": 42, "Moisture": 50})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_response(response).await;
        assert!(body["error"].as_str().unwrap().contains('K'));
    }

    #[tokio::test]
    async fn test_recommend_empty_body() {
        let response = create_test_app(true)
            .oneshot(post_json("/recommend", json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_response(response).await;
        assert_eq!(body["error"], "Invalid input");
    }

    #[tokio::test]
    async fn test_recommend_without_model() {
        let response = create_test_app(false)
            .oneshot(post_json("/recommend", json!({"pH": 6.4, "N": 12, "P": 42, "K": 41, "Moisture": 50})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_response(response).await;
        assert!(body["error"].is_string());
    }

    // =========================================================================
    // Section 3: Reference data
    // =========================================================================

    #[tokio::test]
    async fn test_list_crops() {
        let response = create_test_app(false).oneshot(get("/api/crops")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        let data = body["data"].as_array().unwrap();
        assert_eq!(body["rows"].as_u64().unwrap() as usize, data.len());
        assert!(data.iter().any(|c| c["name"] == "Rice"));
    }

    #[tokio::test]
    async fn test_get_crop() {
        let response = create_test_app(false).oneshot(get("/api/crops/rice")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["target_n"], 120.0);
    }

    #[tokio::test]
    async fn test_get_unknown_crop() {
        let response = create_test_app(false).oneshot(get("/api/crops/Quinoa")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = json_response(response).await;
        assert!(body["error"].as_str().unwrap().contains("Quinoa"));
    }

    #[tokio::test]
    async fn test_list_fertilizers() {
        let response = create_test_app(false).oneshot(get("/api/fertilizers")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        let nitrogen = body["data"]["N"].as_array().unwrap();
        assert!(nitrogen.iter().any(|p| p["name"] == "Urea" && p["content_fraction"] == 0.46));
    }

    // =========================================================================
    // Section 4: Nutrient plan
    // =========================================================================

    #[tokio::test]
    async fn test_analysis_rice_example() {
        let response = create_test_app(true)
            .oneshot(post_json(
                "/api/analysis",
                json!({
                    "crop": "Rice",
                    "soil": {"pH": 6.0, "N": 20, "P": 80, "K": 10, "Moisture": 50}
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_response(response).await;

        assert_eq!(body["deficit"]["N"], 100.0);
        assert_eq!(body["deficit"]["P"], 0.0);

        let dosages = body["dosages"].as_array().unwrap();
        let urea = dosages.iter().find(|d| d["product"] == "Urea").unwrap();
        assert_eq!(urea["dosage_kg_per_ha"], 217.4);

        assert_eq!(body["ph"]["status"], "optimal");
        assert!(body["recommended_fertilizer"].is_string());
    }

    #[tokio::test]
    async fn test_analysis_with_weather_caveats() {
        let response = create_test_app(false)
            .oneshot(post_json(
                "/api/analysis",
                json!({
                    "crop": "Wheat",
                    "soil": {"pH": 6.5, "N": 20, "P": 20, "K": 20, "Moisture": 50},
                    "weather": {"temperature_c": 36.0, "humidity_pct": 40.0, "rain_probability_pct": 90.0}
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_response(response).await;

        let kinds: Vec<&str> = body["caveats"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|c| c["advisory_type"].as_str())
            .collect();
        assert!(kinds.contains(&"rain_runoff"));
        assert!(kinds.contains(&"heat_volatilisation"));
        // No model loaded: plan still computed
        assert!(body["recommended_fertilizer"].is_null());
    }

    #[tokio::test]
    async fn test_analysis_unknown_crop() {
        let response = create_test_app(true)
            .oneshot(post_json(
                "/api/analysis",
                json!({"crop": "Quinoa", "soil": {"pH": 6.0, "N": 20, "P": 80, "K": 10, "Moisture": 50}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_analysis_out_of_range_weather() {
        let response = create_test_app(false)
            .oneshot(post_json(
                "/api/analysis",
                json!({
                    "crop": "Rice",
                    "soil": {"pH": 6.0, "N": 20, "P": 80, "K": 10, "Moisture": 50},
                    "weather": {"temperature_c": 25.0, "rain_probability_pct": 120.0, "wind_speed_kmh": -3.0}
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_response(response).await;
        assert!(body["error"].as_str().unwrap().contains("rain_probability_pct"));
    }

    #[tokio::test]
    async fn test_analysis_invalid_reading() {
        let response = create_test_app(true)
            .oneshot(post_json(
                "/api/analysis",
                json!({"crop": "Rice", "soil": {"pH": 6.0, "N": -20, "P": 80, "K": 10, "Moisture": 50}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
