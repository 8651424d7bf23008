/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use feedbackhub_api::{app::AppState, config::Config};
/// use feedbackhub_shared::ai::DisabledDrafter;
/// use feedbackhub_shared::store::memory::MemoryStore;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), Arc::new(DisabledDrafter), config);
/// let app = feedbackhub_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{get, patch, post},
    Router,
};
use feedbackhub_shared::ai::AiDrafter;
use feedbackhub_shared::auth::identity::{authenticate, bearer_token};
use feedbackhub_shared::store::Store;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend
    pub store: Arc<dyn Store>,

    /// AI drafting provider
    pub ai: Arc<dyn AiDrafter>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn Store>, ai: Arc<dyn AiDrafter>, config: Config) -> Self {
        Self {
            store,
            ai,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health                          # public
/// ├── /auth                                 # public
/// │   ├── POST /register
/// │   └── POST /login
/// ├── /users                                # bearer
/// │   ├── GET /me
/// │   └── GET /employees
/// ├── /teams
/// │   ├── GET  /                            # public
/// │   ├── POST /                            # manager
/// │   ├── GET  /me                          # manager
/// │   ├── GET  /me/stats                    # manager
/// │   ├── POST /me/members/:user_id         # manager
/// │   └── POST /:team_id/members/:user_id   # manager
/// ├── /feedback                             # bearer, role checked per operation
/// │   ├── POST   /
/// │   ├── GET    /
/// │   ├── POST   /request
/// │   ├── GET    /export/pdf
/// │   ├── GET    /:id
/// │   ├── PUT    /:id
/// │   ├── DELETE /:id
/// │   ├── PATCH  /:id/acknowledge
/// │   ├── POST   /:id/comments
/// │   └── GET    /:id/comments
/// ├── /tags
/// │   ├── GET  /                            # public
/// │   └── POST /                            # manager
/// ├── /notifications                        # bearer
/// │   ├── GET   /
/// │   └── PATCH /:id/read
/// └── /ai                                   # bearer / manager
///     ├── POST /suggest-feedback
///     ├── POST /rephrase
///     ├── POST /suggest-tags
///     └── POST /generate-feedback
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (bearer routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/teams", get(routes::teams::list_teams))
        .route("/tags", get(routes::tags::list_tags));

    let protected_routes = Router::new()
        .route("/users/me", get(routes::users::me))
        .route("/users/employees", get(routes::users::unassigned_employees))
        .route("/teams", post(routes::teams::create_team))
        .route("/teams/me", get(routes::teams::my_team))
        .route("/teams/me/stats", get(routes::teams::team_stats))
        .route(
            "/teams/me/members/:user_id",
            post(routes::teams::add_member_to_own_team),
        )
        .route(
            "/teams/:team_id/members/:user_id",
            post(routes::teams::add_member),
        )
        .route(
            "/feedback",
            post(routes::feedback::create_feedback).get(routes::feedback::list_feedback),
        )
        .route("/feedback/request", post(routes::feedback::request_feedback))
        .route("/feedback/export/pdf", get(routes::feedback::export_pdf))
        .route(
            "/feedback/:id",
            get(routes::feedback::get_feedback)
                .put(routes::feedback::update_feedback)
                .delete(routes::feedback::delete_feedback),
        )
        .route(
            "/feedback/:id/acknowledge",
            patch(routes::feedback::acknowledge_feedback),
        )
        .route(
            "/feedback/:id/comments",
            post(routes::feedback::add_comment).get(routes::feedback::list_comments),
        )
        .route("/tags", post(routes::tags::create_tags))
        .route("/notifications", get(routes::notifications::list_notifications))
        .route(
            "/notifications/:id/read",
            patch(routes::notifications::mark_read),
        )
        .route("/ai/suggest-feedback", post(routes::ai::suggest_feedback))
        .route("/ai/rephrase", post(routes::ai::rephrase))
        .route("/ai/suggest-tags", post(routes::ai::suggest_tags))
        .route("/ai/generate-feedback", post(routes::ai::generate_feedback))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_layer));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Resolves the bearer token to a user and injects its
/// [`UserIdentity`](feedbackhub_shared::models::user::UserIdentity) into
/// request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let token = bearer_token(auth_header)?.to_string();

    let user = authenticate(state.store.as_ref(), &token, state.jwt_secret()).await?;
    tracing::debug!(user_id = %user.id, role = %user.role, "Request authenticated");

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
