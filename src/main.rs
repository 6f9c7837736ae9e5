use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use elevateflow_api::config::Config;
use elevateflow_api::platform::remote::RemoteStore;
use elevateflow_api::{routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let config = Arc::new(config);

    let platform = Arc::new(RemoteStore::new(&config)?);
    info!("Platform client configured for {}", config.platform_base_url);

    let state = AppState {
        store: platform.clone(),
        identity: platform.clone(),
        billing: platform,
        config: config.clone(),
    };

    // CORS: allow the configured app origin. Localhost is always allowed for
    // local development.
    let cors_origin = {
        let base = config.app_base_url.clone();
        AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            let o = match origin.to_str() {
                Ok(s) => s,
                Err(_) => return false,
            };
            if o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") {
                return true;
            }
            o == base
        })
    };

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_origin(cors_origin);

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        // Auth
        .route("/auth/me", get(routes::auth::me))
        .route("/auth/logout", post(routes::auth::logout))
        // Admin
        .route("/admin/overview", get(routes::admin::overview))
        .route("/admin/coaches", get(routes::admin::list_coaches))
        .route(
            "/admin/coaches/{id}",
            put(routes::admin::manage_coach).delete(routes::admin::delete_coach),
        )
        .route(
            "/admin/coaches/{id}/preview",
            get(routes::admin::preview_coach),
        )
        // Coach
        .route("/coach/dashboard", get(routes::coach::dashboard))
        .route("/coach/clients", post(routes::coach::create_client))
        .route(
            "/coach/clients/{id}",
            put(routes::coach::update_client).delete(routes::coach::delete_client),
        )
        .route("/coach/messages", get(routes::coach::list_messages))
        // Client
        .route("/client/dashboard", get(routes::client::dashboard))
        .route("/client/messages", post(routes::client::contact_coach))
        // Billing
        .route(
            "/billing/checkout-session",
            post(routes::billing::create_checkout_session),
        )
        .route(
            "/billing/portal-session",
            post(routes::billing::create_portal_session),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("ElevateFlow API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
