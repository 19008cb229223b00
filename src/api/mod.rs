//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer", get(status_handler))
        .route("/timer/toggle", post(toggle_handler))
        .route("/timer/reset", post(reset_handler))
        .route("/timer/mode/:mode", post(switch_mode_handler))
        .route("/settings", get(get_settings_handler).put(update_settings_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::state::{timer_store::tests::store_with, TimerSettings};

    fn app() -> (Router, Arc<AppState>) {
        let (store, _, _) = store_with(TimerSettings::default(), None);
        let state = Arc::new(AppState::new(store, 20554, "127.0.0.1".to_string()));
        (create_router(Arc::clone(&state)), state)
    }

    async fn call(router: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = router.oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn status_reports_paused_focus() {
        let (router, _) = app();
        let (status, body) = call(router, Method::GET, "/timer", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timer"]["mode"], "focus");
        assert_eq!(body["timer"]["remaining_seconds"], 1500);
        assert_eq!(body["timer"]["display"], "25:00");
        assert_eq!(body["timer"]["session_number"], 1);
        assert_eq!(body["port"], 20554);
    }

    #[tokio::test]
    async fn toggle_starts_and_pauses() {
        let (router, state) = app();
        let (status, body) = call(router.clone(), Method::POST, "/timer/toggle", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "running");
        assert!(state.driver.is_active());

        let (_, body) = call(router, Method::POST, "/timer/toggle", None).await;
        assert_eq!(body["status"], "paused");
        assert!(!state.driver.is_active());
    }

    #[tokio::test]
    async fn switch_mode_accepts_wire_names_only() {
        let (router, _) = app();
        let (status, body) =
            call(router.clone(), Method::POST, "/timer/mode/long-break", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timer"]["mode"], "long-break");
        assert_eq!(body["timer"]["remaining_seconds"], 900);

        let (status, body) = call(router, Method::POST, "/timer/mode/nap", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn settings_round_trip_through_put_and_get() {
        let (router, _) = app();
        let settings = json!({
            "focusDuration": 30,
            "shortBreakDuration": 6,
            "longBreakDuration": 20,
            "autoStartBreaks": true,
            "autoStartPomodoros": false,
            "alarmSound": "gentle"
        });

        let (status, body) =
            call(router.clone(), Method::PUT, "/settings", Some(settings.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timer"]["remaining_seconds"], 1800);

        let (status, body) = call(router, Method::GET, "/settings", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, settings);
    }

    #[tokio::test]
    async fn zero_duration_settings_are_rejected() {
        let (router, state) = app();
        let settings = json!({
            "focusDuration": 0,
            "shortBreakDuration": 5,
            "longBreakDuration": 15,
            "autoStartBreaks": false,
            "autoStartPomodoros": false,
            "alarmSound": "bell"
        });

        let (status, _) = call(router, Method::PUT, "/settings", Some(settings)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.store.settings().unwrap(), TimerSettings::default());
    }

    #[tokio::test]
    async fn reset_after_switch_keeps_mode() {
        let (router, _) = app();
        call(router.clone(), Method::POST, "/timer/mode/short-break", None).await;
        let (_, body) = call(router, Method::POST, "/timer/reset", None).await;
        assert_eq!(body["timer"]["mode"], "short-break");
        assert_eq!(body["timer"]["remaining_seconds"], 300);
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (router, _) = app();
        let (status, body) = call(router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
