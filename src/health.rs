use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::settings::{mask, Settings};

pub fn health(settings: &Settings) -> Value {
    json!({
        "status": "ok",
        "has_token": settings.bot_token().is_some(),
        "has_base_url": settings.base_url().is_some(),
    })
}

pub fn env_probe(settings: &Settings) -> Value {
    json!({
        "TELEGRAM_TOKEN_in_env": settings.telegram_token.is_some(),
        "TOKEN_in_env": settings.token.is_some(),
        "BASE_URL_in_env": settings.base_url.is_some(),
        "PORT": settings.port,
        "TOKEN_masked": mask(settings.bot_token()),
        "BASE_URL": settings.base_url(),
    })
}

/// `GET /` and `GET /__env`.
pub fn router(settings: Arc<Settings>) -> Router {
    let env_settings = settings.clone();
    Router::new()
        .route("/", get(move || async move { Json(health(&settings)) }))
        .route(
            "/__env",
            get(move || async move { Json(env_probe(&env_settings)) }),
        )
}
