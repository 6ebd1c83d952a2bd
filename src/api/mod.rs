use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::{config::AppConfig, db::DBLayer, error::ApiError};

pub mod auth;
pub mod devices;
pub mod extract;
pub mod types;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DBLayer>,
    pub jwt_secret: String,
    pub api_keys: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(db: Arc<DBLayer>, config: &AppConfig) -> Self {
        Self {
            db,
            jwt_secret: config.jwt_secret.clone(),
            api_keys: Arc::new(config.api_keys.clone()),
        }
    }
}

/// Full HTTP surface: device routes behind the API key check, a JSON 404
/// for everything else, request tracing and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(devices::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}

pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(provided) = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
    else {
        return Err(ApiError::InvalidApiKey);
    };

    if !state.api_keys.iter().any(|key| key == provided) {
        warn!(path = %req.uri().path(), "rejected request with unknown api key");
        return Err(ApiError::InvalidApiKey);
    }

    Ok(next.run(req).await)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Page not found.".into())
}
