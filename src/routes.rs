use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::AppState;

fn cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}

pub fn create_router(state: AppState) -> Router {
    // Sign-in endpoints: 20 requests per 60 seconds per client
    let auth_limiter = RateLimiter::new(20, Duration::from_secs(60));

    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route_layer(middleware::from_fn_with_state(
            auth_limiter,
            rate_limit_middleware,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .route("/session", get(handlers::session::current))
        .route("/session/stream", get(handlers::session::stream))
        .route("/navigate", get(handlers::pages::navigate))
        .route(
            "/applications",
            get(handlers::applications::list_mine).post(handlers::applications::create),
        )
        .route("/applications/stream", get(handlers::applications::stream_mine))
        .route("/tasks", get(handlers::checklist::list_tasks))
        .route("/tasks/stream", get(handlers::checklist::stream_tasks))
        .route("/tasks/:id/toggle", patch(handlers::checklist::toggle_task))
        .route("/documents", get(handlers::checklist::list_documents))
        .route("/documents/stream", get(handlers::checklist::stream_documents))
        .route(
            "/documents/:id/toggle",
            patch(handlers::checklist::toggle_document),
        )
        .route("/global-events", get(handlers::events::list_global))
        .route("/global-events/stream", get(handlers::events::stream_global))
        .route("/public-events", get(handlers::events::list_public))
        .route("/public-events/stream", get(handlers::events::stream_public))
        .route(
            "/chat/messages",
            get(handlers::chat::list_own).post(handlers::chat::send_own),
        )
        .route("/chat/messages/stream", get(handlers::chat::stream_own))
        .route("/inquiries", post(handlers::inquiries::create));

    let admin_routes = Router::new()
        .route("/users", get(handlers::admin::list_users))
        .route("/users/stream", get(handlers::admin::stream_users))
        .route("/users/:id/role", patch(handlers::admin::update_role))
        .route("/stats", get(handlers::admin::stats))
        .route("/inquiries", get(handlers::inquiries::list))
        .route("/inquiries/stream", get(handlers::inquiries::stream))
        .route("/applications", get(handlers::applications::list_all))
        .route("/applications/stream", get(handlers::applications::stream_all))
        .route(
            "/applications/:id/status",
            patch(handlers::applications::update_status),
        )
        .route(
            "/global-events",
            get(handlers::events::admin_list_global).post(handlers::events::create_global),
        )
        .route(
            "/global-events/stream",
            get(handlers::events::admin_stream_global),
        )
        .route("/global-events/:id", delete(handlers::events::delete_global))
        .route(
            "/public-events",
            get(handlers::events::admin_list_public).post(handlers::events::create_public),
        )
        .route(
            "/public-events/stream",
            get(handlers::events::admin_stream_public),
        )
        .route("/public-events/:id", delete(handlers::events::delete_public))
        .route("/public-events/:id/approve", post(handlers::events::approve))
        .route("/public-events/:id/reject", post(handlers::events::reject))
        .route(
            "/conversations/:user_id/messages",
            get(handlers::chat::admin_list).post(handlers::chat::admin_send),
        )
        .route(
            "/conversations/:user_id/messages/stream",
            get(handlers::chat::admin_stream),
        );

    let cors = cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .nest("/admin", admin_routes)
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "ok"
}
