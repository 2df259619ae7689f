use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::Store;
use crate::handlers::{protected, public};
use crate::middleware::resolve_requester;
use crate::services::MediaStore;

/// Shared per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub media: MediaStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        Self {
            store,
            media: MediaStore::new(&config.media.root),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let media_route = format!("/{}", state.config.media.url.trim_matches('/'));
    let media_files = ServeDir::new(state.media.root());

    let mut app = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(user_routes())
        .merge(catalog_routes())
        .merge(recipe_routes())
        .layer(from_fn_with_state(state.clone(), resolve_requester))
        .nest_service(&media_route, media_files)
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes));

    if state.config.security.enable_cors {
        app = app.layer(cors_layer(&state.config));
    }
    if state.config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    app.with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
    }
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/token/login", post(public::auth::login))
        .route("/api/auth/token/logout", post(protected::auth::logout))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(public::users::list).post(public::users::register))
        .route("/api/users/me", get(protected::users::me))
        .route("/api/users/set_password", post(protected::users::set_password))
        .route("/api/users/subscriptions", get(protected::users::subscriptions))
        .route("/api/users/:id", get(public::users::detail))
        .route(
            "/api/users/:id/subscribe",
            post(protected::users::subscribe).delete(protected::users::unsubscribe),
        )
}

fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tags", get(public::catalog::list_tags))
        .route("/api/tags/:id", get(public::catalog::get_tag))
        .route("/api/ingredients", get(public::catalog::list_ingredients))
        .route("/api/ingredients/:id", get(public::catalog::get_ingredient))
}

fn recipe_routes() -> Router<AppState> {
    use protected::{recipes, relations, shopping_list};

    Router::new()
        .route("/api/recipes", get(public::recipes::list).post(recipes::create))
        .route("/api/recipes/download_shopping_cart", get(shopping_list::download))
        .route(
            "/api/recipes/:id",
            get(public::recipes::detail).patch(recipes::update).delete(recipes::delete),
        )
        .route(
            "/api/recipes/:id/favorite",
            post(relations::add_favorite).delete(relations::remove_favorite),
        )
        .route(
            "/api/recipes/:id/shopping_cart",
            post(relations::add_to_cart).delete(relations::remove_from_cart),
        )
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Foodgram API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/api/auth/token/login, /api/auth/token/logout",
                "users": "/api/users[/:id], /api/users/me, /api/users/subscriptions, /api/users/:id/subscribe",
                "catalog": "/api/tags[/:id], /api/ingredients[/:id]",
                "recipes": "/api/recipes[/:id], /api/recipes/:id/favorite, /api/recipes/:id/shopping_cart",
                "shopping_list": "/api/recipes/download_shopping_cart",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
