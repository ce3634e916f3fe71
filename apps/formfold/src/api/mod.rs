//! # Formfold HTTP API Module
//!
//! This module implements the form-editing HTTP API server using axum.
//!
//! ## Endpoints
//!
//! - `GET  /health` - Health check
//! - `GET  /outline` - Form structure
//! - `POST /fieldset` - Create a fieldset
//! - `POST /edit` - Edit a fieldset (tagged operation union)
//! - `POST /node` - Add a field or note
//! - `POST /node/remove` - Remove a node
//! - `POST /check` - Identifier availability / reserved-word check
//! - `POST /enumerate` - Enumerate a fieldset's contents
//! - `POST /candidates` - Conditional-field candidate list
//! - `POST /plan` - Render sequence, optionally against a submission
//! - `POST /export` - Export the definition (base64 binary format)
//! - `POST /save` - Write the definition back to the server's file
//!
//! ## Security Configuration
//!
//! - CORS origins and the rate limit come from the resolved server config
//!   (`formfold.toml` + `FORMFOLD_*` environment overrides)
//! - `FORMFOLD_API_KEY`: if set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

// Re-exports for external use
pub use auth::get_api_key_from_env;
pub use middleware::create_rate_limiter;
// Re-export handlers and types for integration tests (via `formfold::api::*`)
#[allow(unused_imports)]
pub use handlers::{
    add_node_handler, candidates_handler, check_handler, create_fieldset_handler, edit_handler,
    enumerate_handler, export_handler, health_handler, outline_handler, plan_handler,
    remove_node_handler, save_handler,
};
#[allow(unused_imports)]
pub use types::{
    AddNodeRequest, CandidateJson, CandidatesRequest, CandidatesResponse, CheckRequest,
    CheckResponse, CreateFieldsetRequest, EditOp, EditRequest, EnumerateRequest,
    EnumerateResponse, ExportResponse, HealthResponse, ItemJson, MarkerJson, MutationResponse,
    NodeSpec, OptionSpec, OutlineNode, OutlineResponse, PlanRequest, PlanResponse, RemoveRequest,
    StepJson,
};

use crate::config::ServerConfig;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use formfold_core::{Form, FormError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the form under edit.
#[derive(Clone)]
pub struct AppState {
    /// The form definition being edited.
    pub form: Arc<RwLock<Form>>,
    /// Definition file for `/save`; `None` disables saving.
    pub path: Option<PathBuf>,
}

impl AppState {
    /// Create new app state without a backing file.
    #[must_use]
    pub fn new(form: Form) -> Self {
        Self {
            form: Arc::new(RwLock::new(form)),
            path: None,
        }
    }

    /// Create new app state backed by a definition file.
    #[must_use]
    pub fn with_path(form: Form, path: PathBuf) -> Self {
        Self {
            form: Arc::new(RwLock::new(form)),
            path: Some(path),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from the resolved server configuration.
///
/// - `"*"`: allows all origins (development mode - use with caution!)
/// - unset: defaults to localhost only (restrictive default)
/// - otherwise: parses a comma-separated list of allowed origins
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    match config.cors_origins.as_deref() {
        Some("*") => {
            // Explicit wildcard - warn about security implications
            tracing::warn!(
                "CORS: Allowing ALL origins (cors_origins = \"*\"). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            // Parse comma-separated origins
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            // No configuration - default to localhost only (restrictive)
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = vec![
        "http://localhost:3000".parse::<HeaderValue>().ok(),
        "http://localhost:8080".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:3000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:8080".parse::<HeaderValue>().ok(),
    ];
    let origins: Vec<HeaderValue> = localhost_origins.into_iter().flatten().collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. CORS - handles preflight requests
/// 2. Tracing - logs all requests
/// 3. Rate Limiting - protects against DoS (if enabled)
/// 4. Authentication - validates API key (if configured)
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = build_cors_layer(config);

    // Check if rate limiting is enabled
    let rate_limiter = if config.rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", config.rate_limit);
        Some(create_rate_limiter(config.rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    // Check if authentication is enabled
    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - all endpoints are publicly accessible! \
             Set FORMFOLD_API_KEY environment variable to enable authentication."
        );
    }

    // Build base router with routes
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/outline", get(handlers::outline_handler))
        .route("/fieldset", post(handlers::create_fieldset_handler))
        .route("/edit", post(handlers::edit_handler))
        .route("/node", post(handlers::add_node_handler))
        .route("/node/remove", post(handlers::remove_node_handler))
        .route("/check", post(handlers::check_handler))
        .route("/enumerate", post(handlers::enumerate_handler))
        .route("/candidates", post(handlers::candidates_handler))
        .route("/plan", post(handlers::plan_handler))
        .route("/export", post(handlers::export_handler))
        .route("/save", post(handlers::save_handler));

    // Apply authentication middleware (innermost - runs last on request)
    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    // Apply rate limiting middleware
    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    // Apply CORS, body limit, and tracing (outermost layers)
    router
        .layer(axum::extract::DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(config: &ServerConfig, state: AppState) -> Result<(), FormError> {
    let router = create_router(state, config);
    let addr = config.bind_addr();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| FormError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Formfold HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| FormError::IoError(format!("Server error: {}", e)))
}
