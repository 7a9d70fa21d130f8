// Axum API Server Module
//
// Purpose: HTTP surface over the classifier (inference boundary) and the
// nutrient-plan calculations. Shared state is immutable after startup.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::classifier::{Classifier, ModelArtifact};
use crate::error::AdvisorError;
use crate::nutrients::NutrientPlan;
use crate::reference::ReferenceData;
use crate::soil::{Nutrient, SoilReading};
use crate::weather::CurrentConditions;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub reference: Arc<ReferenceData>,
    /// None when no model could be loaded; inference then answers 503
    pub classifier: Option<Arc<dyn Classifier>>,
}

impl AppState {
    pub fn new(reference: ReferenceData, classifier: Option<Arc<dyn Classifier>>) -> Self {
        Self {
            reference: Arc::new(reference),
            classifier,
        }
    }

    /// Load reference tables and the model artifact.
    ///
    /// Invalid reference data aborts startup. A missing or broken model only
    /// disables `/recommend`; the nutrient endpoints keep working.
    pub fn load(model_path: &str, reference_path: Option<&str>) -> anyhow::Result<Self> {
        let reference = match reference_path {
            Some(path) => {
                tracing::info!("Loading reference data from {}", path);
                ReferenceData::from_json_file(std::path::Path::new(path))?
            }
            None => {
                tracing::info!("Using built-in reference data");
                ReferenceData::builtin()?
            }
        };
        tracing::info!(
            "Reference data {}: {} crops",
            reference.version(),
            reference.crops().count()
        );

        let classifier: Option<Arc<dyn Classifier>> =
            match ModelArtifact::load(std::path::Path::new(model_path)) {
                Ok(model) => {
                    tracing::info!(
                        "Loaded model from {} ({} classes, {} trees)",
                        model_path,
                        model.classes.len(),
                        model.forest.n_trees()
                    );
                    Some(Arc::new(model))
                }
                Err(e) => {
                    tracing::warn!("Classifier unavailable, /recommend disabled: {}: {}", model_path, e);
                    None
                }
            };

        Ok(Self::new(reference, classifier))
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))

        // Inference boundary
        .route("/recommend", post(recommend_fertilizer))

        // Reference data (JSON)
        .route("/api/crops", get(list_crops))
        .route("/api/crops/:name", get(get_crop))
        .route("/api/fertilizers", get(list_fertilizers))

        // Nutrient plan
        .route("/api/analysis", post(analyze))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn home() -> &'static str {
    "Fertilizer Recommendation API is Running!"
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "model_loaded": state.classifier.is_some(),
        "model_classes": state.classifier.as_ref().map(|c| c.labels()),
        "reference_version": state.reference.version(),
    }))
}

async fn recommend_fertilizer(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let data = parse_body(&body)?;
    let reading = SoilReading::from_json(&data)?;

    let classifier = state
        .classifier
        .as_ref()
        .ok_or_else(|| AdvisorError::ClassifierUnavailable("no trained model loaded".to_string()))?;

    let label = classifier.predict(&reading)?;
    tracing::debug!("Recommendation for {:?}: {}", reading, label);

    Ok(Json(serde_json::json!({ "recommended_fertilizer": label })))
}

async fn list_crops(State(state): State<AppState>) -> Json<Value> {
    let crops: Vec<_> = state.reference.crops().collect();
    Json(serde_json::json!({
        "version": state.reference.version(),
        "rows": crops.len(),
        "data": crops,
    }))
}

async fn get_crop(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, AppError> {
    let crop = state.reference.crop(&name)?;
    Ok(Json(serde_json::to_value(crop).map_err(AdvisorError::from)?))
}

async fn list_fertilizers(State(state): State<AppState>) -> Json<Value> {
    let mut grouped = serde_json::Map::new();
    for nutrient in Nutrient::ALL {
        grouped.insert(
            nutrient.symbol().to_string(),
            serde_json::json!(state.reference.fertilizers_for(nutrient)),
        );
    }
    Json(serde_json::json!({
        "version": state.reference.version(),
        "data": grouped,
    }))
}

/// Body: `{"crop": "Rice", "soil": {pH, N, P, K, Moisture}, "weather": {...}?}`
async fn analyze(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let data = parse_body(&body)?;

    let crop = data
        .get("crop")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::BadRequest("'crop' must be a string".to_string()))?;

    let soil = data
        .get("soil")
        .ok_or_else(|| AppError::BadRequest("'soil' is missing".to_string()))?;
    let reading = SoilReading::from_json(soil)?;

    let weather: Option<CurrentConditions> = match data.get("weather") {
        None | Some(Value::Null) => None,
        Some(w) => Some(
            serde_json::from_value(w.clone())
                .map_err(|e| AppError::BadRequest(format!("invalid weather record: {}", e)))?,
        ),
    };

    let plan = NutrientPlan::build(&reading, crop, &state.reference, weather.as_ref())?;

    // The classifier is advisory here; the plan stands without it
    let recommended = state.classifier.as_ref().and_then(|c| match c.predict(&reading) {
        Ok(label) => Some(label),
        Err(e) => {
            tracing::warn!("Classifier failed during analysis: {}", e);
            None
        }
    });

    tracing::info!(
        "Analysis for {}: N={:.1} P={:.1} K={:.1} deficit, {} caveats",
        plan.crop,
        plan.deficit.nitrogen,
        plan.deficit.phosphorus,
        plan.deficit.potassium,
        plan.caveats.len()
    );

    let mut result = serde_json::to_value(&plan).map_err(AdvisorError::from)?;
    result["recommended_fertilizer"] = serde_json::json!(recommended);
    Ok(Json(result))
}

/// Parse a JSON body. Empty bodies and empty objects are "Invalid input".
fn parse_body(body: &[u8]) -> Result<Value, AppError> {
    let invalid = || AppError::BadRequest("Invalid input".to_string());
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(invalid());
    }
    let value: Value = serde_json::from_slice(body).map_err(|_| invalid())?;
    match &value {
        Value::Object(map) if map.is_empty() => Err(invalid()),
        Value::Null => Err(invalid()),
        _ => Ok(value),
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Unavailable(String),
    Internal(String),
}

impl From<AdvisorError> for AppError {
    fn from(err: AdvisorError) -> Self {
        let message = err.to_string();
        match err {
            AdvisorError::InvalidReading { .. } | AdvisorError::InvalidConditions { .. } => {
                AppError::BadRequest(message)
            }
            AdvisorError::UnknownCrop(_) => AppError::NotFound(message),
            AdvisorError::ClassifierUnavailable(_) => AppError::Unavailable(message),
            AdvisorError::InvalidContentFraction { .. }
            | AdvisorError::InvalidReference(_)
            | AdvisorError::Model(_)
            | AdvisorError::Io(_)
            | AdvisorError::Json(_) => {
                tracing::error!("Internal error: {}", message);
                AppError::Internal(message)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
