//! HTTP control surface
//!
//! The routes consumed by the presentation layer. Upgrades are not
//! triggered here; that path is operator-only via the CLI.

use std::sync::Arc;

use axum::extract::{Query, RawForm, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use roost_core::{ActionError, KioskConfig, LogError};

use crate::input::InputError;
use crate::state::HostState;

/// Default tail length when `lines` is not given
const DEFAULT_LOG_LINES: usize = 200;

/// Build the control-surface router
pub fn router(state: Arc<HostState>) -> Router {
    Router::new()
        .route("/getconfig", get(get_config))
        .route("/setconfig", post(set_config))
        .route("/simulatekey", get(simulate_key))
        .route("/maintenance", get(maintenance))
        .route("/logs", get(get_logs))
        .with_state(state)
}

/// Serve the control surface until the token is cancelled
pub async fn run(state: Arc<HostState>, cancel: CancellationToken) -> anyhow::Result<()> {
    let bind_address = state.config.bind_address.clone();
    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!("Control surface listening on http://{}", bind_address);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;

    Ok(())
}

async fn get_config(State(state): State<Arc<HostState>>) -> Response {
    match state.store.get() {
        Ok(config) => Json(config).into_response(),
        Err(e) => {
            tracing::error!("Failed to read kiosk config: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn set_config(State(state): State<Arc<HostState>>, RawForm(body): RawForm) -> Response {
    // The presentation layer consumes the result token off the redirect URL
    let failed = || Redirect::to("/?result=failed").into_response();

    let pairs: Vec<(String, String)> = match serde_urlencoded::from_bytes(&body) {
        Ok(pairs) => pairs,
        Err(e) => {
            tracing::warn!("Rejected malformed setconfig body: {}", e);
            return failed();
        }
    };

    let current = match state.store.get() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to read current kiosk config: {}", e);
            return failed();
        }
    };

    let candidate = match KioskConfig::from_form(&current, &pairs) {
        Ok(candidate) => candidate,
        Err(e) => {
            tracing::warn!("Rejected kiosk config submission: {}", e);
            return failed();
        }
    };

    if let Err(e) = state.store.save(&candidate) {
        tracing::error!("Failed to persist kiosk config: {}", e);
        return failed();
    }

    Redirect::to("/?result=success").into_response()
}

#[derive(Deserialize)]
struct KeyParams {
    key: String,
}

async fn simulate_key(
    State(state): State<Arc<HostState>>,
    Query(params): Query<KeyParams>,
) -> Response {
    match state.keys.inject(&params.key).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e @ InputError::UnknownKey(_)) => {
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!("Key injection failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[derive(Deserialize)]
struct ActionParams {
    action: String,
}

async fn maintenance(
    State(state): State<Arc<HostState>>,
    Query(params): Query<ActionParams>,
) -> Response {
    match state.dispatcher.dispatch(&params.action).await {
        Ok(action) => {
            tracing::info!("Maintenance action requested: {}", action);
            StatusCode::OK.into_response()
        }
        Err(e @ ActionError::Unknown(_)) => {
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!("Maintenance action failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[derive(Deserialize)]
struct LogsParams {
    service: String,
    lines: Option<usize>,
}

async fn get_logs(
    State(state): State<Arc<HostState>>,
    Query(params): Query<LogsParams>,
) -> Response {
    let lines = params.lines.unwrap_or(DEFAULT_LOG_LINES);
    match state.logs.tail(&params.service, lines).await {
        Ok(lines) => Json(lines).into_response(),
        Err(e @ LogError::UnknownService(_)) => {
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!("Log tail failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    use roost_core::config::LogSourceConfig;
    use roost_core::{ConfigStore, HostConfig};

    use crate::actions::{Dispatcher, SystemControl};
    use crate::input::KeyInjector;
    use crate::logs::{LogAggregator, LogProvider};

    struct NoopControl;

    #[async_trait]
    impl SystemControl for NoopControl {
        async fn reboot(&self) -> Result<(), ActionError> {
            Ok(())
        }
        async fn restart_unit(&self, _unit: &str) -> Result<(), ActionError> {
            Ok(())
        }
        async fn clear_browser_data(&self) -> Result<(), ActionError> {
            Ok(())
        }
    }

    struct NoopInjector;

    #[async_trait]
    impl KeyInjector for NoopInjector {
        async fn inject(&self, key: &str) -> Result<(), InputError> {
            if crate::input::is_valid_key(key) {
                Ok(())
            } else {
                Err(InputError::UnknownKey(key.to_string()))
            }
        }
    }

    struct EmptyProvider;

    #[async_trait]
    impl LogProvider for EmptyProvider {
        async fn unit_tail(&self, _unit: &str, _lines: usize) -> Result<Vec<String>, LogError> {
            Ok(vec![])
        }
        async fn process_snapshot(&self) -> Result<Vec<String>, LogError> {
            Ok(vec![])
        }
    }

    fn test_state(dir: &tempfile::TempDir) -> Arc<HostState> {
        let store = Arc::new(ConfigStore::new(dir.path().join("kiosk.toml")));
        store.load_or_init().unwrap();

        let mut sources = HashMap::new();
        sources.insert("kiosk".to_string(), LogSourceConfig::new("kiosk", 100));

        Arc::new(HostState::new(
            HostConfig::default(),
            store,
            Dispatcher::new(Arc::new(NoopControl)),
            LogAggregator::new(sources, Arc::new(EmptyProvider)),
            Arc::new(NoopInjector),
        ))
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }

    #[tokio::test]
    async fn test_getconfig_returns_json() {
        let dir = tempfile::tempdir().unwrap();
        let response = get_config(State(test_state(&dir))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_setconfig_success_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let body = "display_name=lobby&screen_brightness=64";
        let response = set_config(State(state.clone()), RawForm(body.into())).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/?result=success");
        assert_eq!(state.store.get().unwrap().display_name, "lobby");
    }

    #[tokio::test]
    async fn test_setconfig_unknown_key_leaves_document() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let before = state.store.get().unwrap();

        let response = set_config(State(state.clone()), RawForm("surprise=1".into())).await;

        assert_eq!(location(&response), "/?result=failed");
        assert_eq!(state.store.load().unwrap(), before);
    }

    #[tokio::test]
    async fn test_setconfig_out_of_range_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let response =
            set_config(State(state.clone()), RawForm("screen_brightness=999".into())).await;

        assert_eq!(location(&response), "/?result=failed");
        assert_eq!(state.store.load().unwrap().screen_brightness, 128);
    }

    #[tokio::test]
    async fn test_simulatekey_unknown_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let response = simulate_key(
            State(test_state(&dir)),
            Query(KeyParams {
                key: "F5".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_maintenance_unknown_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let response = maintenance(
            State(test_state(&dir)),
            Query(ActionParams {
                action: "self-destruct".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_logs_unknown_service() {
        let dir = tempfile::tempdir().unwrap();
        let response = get_logs(
            State(test_state(&dir)),
            Query(LogsParams {
                service: "mystery".to_string(),
                lines: None,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
