//! HTTP server for the advisory API.
//!
//! This module provides:
//! - Shared application state holding the store and every scoring path
//! - The axum router with CORS, tracing and body-limit middleware
//! - Request handlers (see [`handlers`])

mod handlers;

pub use handlers::*;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::advisor::SessionAdvisor;
use crate::config::{Config, ServerConfig};
use crate::engines::{PmEngine, QnaEngine, TestCaseEngine};
use crate::storage::Storage;
use crate::vision::VisualDiffDetector;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Injected store for sessions, defects and snapshots.
    pub storage: Arc<dyn Storage>,
    /// Session-tracked scoring paths.
    pub advisor: SessionAdvisor,
    pub testcase_engine: TestCaseEngine,
    pub qna_engine: QnaEngine,
    pub pm_engine: PmEngine,
    /// Screenshot comparison with defect logging.
    pub detector: VisualDiffDetector,
}

impl AppState {
    /// Create new application state around a store
    pub fn new(config: Config, storage: Arc<dyn Storage>) -> Self {
        info!(
            cors_origins = ?config.server.cors_origins,
            max_upload_bytes = config.limits.max_upload_bytes,
            "AppState initializing"
        );

        Self {
            advisor: SessionAdvisor::new(Arc::clone(&storage)),
            detector: VisualDiffDetector::new(Arc::clone(&storage)),
            testcase_engine: TestCaseEngine::new(),
            qna_engine: QnaEngine::new(),
            pm_engine: PmEngine::new(),
            config,
            storage,
        }
    }
}

/// Shared application state handle
pub type SharedState = Arc<AppState>;

/// Build the router with every route and middleware layer.
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.server);
    let body_limit = DefaultBodyLimit::max(state.config.limits.max_upload_bytes);

    Router::new()
        .route("/", get(health_handler))
        // Session-tracked paths
        .route("/generate-testcases", post(generate_testcases_handler))
        .route("/generate-qa", post(generate_qa_handler))
        .route("/generate-pm", post(generate_pm_handler))
        // Composed engines
        .route("/engines/testcases", post(engine_testcases_handler))
        .route("/engines/qa", post(engine_qa_handler))
        .route("/engines/pm", post(engine_pm_handler))
        // Defect management
        .route("/log-defect", post(log_defect_handler))
        .route("/defect-dashboard/:session_id", get(defect_dashboard_handler))
        .route("/compare-ui", post(compare_ui_handler))
        // Project baselines
        .route("/project-snapshots", post(project_snapshot_handler))
        .route("/industry-baseline/:industry", get(industry_baseline_handler))
        // Documents
        .route("/extract-text", post(extract_text_handler))
        .with_state(state)
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    if server.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, LimitsConfig, LogFormat, LoggingConfig};
    use crate::storage::SqliteStorage;
    use std::path::PathBuf;

    fn create_test_config() -> Config {
        Config {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                path: PathBuf::from(":memory:"),
                max_connections: 5,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Pretty,
            },
            limits: LimitsConfig::default(),
        }
    }

    async fn create_state() -> AppState {
        let storage = SqliteStorage::new_in_memory().await.unwrap();
        AppState::new(create_test_config(), Arc::new(storage))
    }

    #[tokio::test]
    async fn test_app_state_shares_storage() {
        let state = create_state().await;
        let shared: SharedState = Arc::new(state);

        // advisor and detector each hold a handle
        assert_eq!(Arc::strong_count(&shared.storage), 3);

        let shared2 = Arc::clone(&shared);
        assert_eq!(Arc::strong_count(&shared), 2);
        drop(shared2);
        assert_eq!(Arc::strong_count(&shared), 1);
    }

    #[tokio::test]
    async fn test_app_state_config_access() {
        let state = create_state().await;
        assert_eq!(state.config.database.max_connections, 5);
        assert_eq!(state.config.limits.context_char_limit, 50_000);
    }

    #[tokio::test]
    async fn test_build_router_with_permissive_cors() {
        let mut state = create_state().await;
        state.config.server.cors_origins = vec!["*".to_string()];
        let _router = build_router(Arc::new(state));
    }
}
