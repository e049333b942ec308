//! Thoughtlog API - REST server
//!
//! Journal endpoints for users, thoughts and reasons, plus health,
//! readiness, Prometheus metrics and OpenAPI docs.

pub mod audit;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod validation;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::get,
    Router,
};
use state::AppState;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI document for every public endpoint
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Thoughtlog API",
        description = "Personal journal of thoughts, feelings and the reasons behind them"
    ),
    paths(
        handlers::health::health_check,
        handlers::health::readiness_check,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::change_password,
        handlers::auth::change_email,
        handlers::users::get_users,
        handlers::users::get_user,
        handlers::users::delete_user,
        handlers::users::delete_self,
        handlers::users::update_name,
        handlers::thoughts::create_thought,
        handlers::thoughts::get_thoughts,
        handlers::thoughts::get_thought,
        handlers::thoughts::update_thought,
        handlers::thoughts::delete_thoughts,
        handlers::thoughts::delete_thought,
        handlers::thoughts::add_reason,
        handlers::thoughts::clear_reasons,
        handlers::thoughts::remove_reason,
        handlers::profiles::my_profile,
        handlers::profiles::get_profile,
    ),
    components(schemas(
        error::MessageResponse,
        handlers::health::HealthResponse,
        handlers::health::ReadinessResponse,
        handlers::auth::TokenResponse,
        handlers::users::UsersResponse,
        handlers::users::UserResponse,
        handlers::thoughts::ThoughtsResponse,
        handlers::profiles::MyProfileResponse,
        handlers::profiles::PublicProfileResponse,
        validation::RegisterRequest,
        validation::LoginRequest,
        validation::ThoughtRequest,
        validation::PasswordUpdateRequest,
        validation::EmailUpdateRequest,
        validation::NameUpdateRequest,
        validation::ReasonRequest,
        thoughtlog_core::UserSummary,
        thoughtlog_core::UserProfile,
        thoughtlog_core::PublicProfile,
        thoughtlog_core::Thought,
        thoughtlog_core::Reason,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness and readiness"),
        (name = "auth", description = "Registration, login and credential changes"),
        (name = "users", description = "User administration"),
        (name = "thoughts", description = "Thoughts and their reasons"),
        (name = "profiles", description = "User profiles"),
    )
)]
pub struct ApiDoc;

/// Registers the `auth-token` header scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "auth_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(auth::TOKEN_HEADER))),
            );
        }
    }
}

/// Build the full application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::health::prometheus_metrics))
        .nest("/api", routes::api_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::metrics_middleware,
        ))
        .layer(axum::middleware::from_fn(
            middleware::request_logging_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Permissive CORS when no origins are configured, otherwise an allow-list
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(auth::TOKEN_HEADER),
        ])
}

/// Helpers for integration tests: in-memory store, fast password hashing
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use super::*;
    use thoughtlog_core::AppConfig;
    use thoughtlog_store::MemoryStore;

    /// Default configuration with cheap password hashing
    pub fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.hash_memory_kib = 1024;
        config.auth.hash_iterations = 1;
        config.auth.hash_parallelism = 1;
        config
    }

    /// Application state over a fresh in-memory store
    pub fn test_state() -> Arc<AppState> {
        let store = Arc::new(MemoryStore::new());
        Arc::new(AppState::new(test_config(), store).expect("metrics registry"))
    }

    /// Router plus the state behind it, so tests can seed the store directly
    pub fn create_router_for_testing() -> (Router, Arc<AppState>) {
        let state = test_state();
        (create_router(state.clone()), state)
    }
}
