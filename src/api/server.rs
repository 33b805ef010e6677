//! HTTP API server

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::{require_auth, AuthService, SessionIssuer, TokenKey};
use crate::config::Config;
use crate::error::Result;
use crate::store::{self, Store};

use super::{resources, routes};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub key: Arc<TokenKey>,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>, key: TokenKey) -> Self {
        let key = Arc::new(key);
        let auth = AuthService::new(store.clone(), SessionIssuer::new(key.clone()));
        Self {
            config,
            store,
            key,
            auth,
        }
    }

    /// Load the token key and open the configured store
    pub async fn from_config(config: Config) -> Result<Self> {
        let key = TokenKey::from_config(&config.auth)?;
        let store = store::open(&config).await?;
        Ok(Self::new(config, store, key))
    }
}

pub type SharedState = Arc<AppState>;

/// Run the HTTP API server
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    let state = Arc::new(AppState::from_config(config).await?);

    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: SharedState) -> Router {
    let gate = middleware::from_fn_with_state(state.key.clone(), require_auth);

    let protected = Router::new()
        .route("/account-info", get(routes::account_info))
        // Cities
        .route("/cities", get(resources::list_cities))
        .route("/city", post(resources::create_city))
        .route(
            "/city/{id}",
            get(resources::get_city)
                .put(resources::update_city)
                .delete(resources::delete_city),
        )
        // Customers
        .route("/customers", get(resources::list_customers))
        .route("/customer", post(resources::create_customer))
        .route(
            "/customer/{id}",
            get(resources::get_customer)
                .put(resources::update_customer)
                .delete(resources::delete_customer),
        )
        // Bookings
        .route(
            "/booking",
            get(resources::list_bookings).post(resources::create_booking),
        )
        .route(
            "/booking/{customer_id}",
            get(resources::list_customer_bookings),
        )
        // Admins
        .route(
            "/admin",
            get(resources::list_admins).post(resources::create_admin),
        )
        .route(
            "/admin/{id}",
            get(resources::get_admin)
                .put(resources::update_admin)
                .delete(resources::delete_admin),
        )
        .route_layer(gate.clone());

    // Destinations are readable without a token
    let public = Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/register", post(routes::register))
        .route("/login", post(routes::login))
        .route(
            "/destination",
            get(resources::list_destinations)
                .merge(post(resources::create_destination).route_layer(gate.clone())),
        )
        .route(
            "/destination/{id}",
            get(resources::get_destination).merge(
                put(resources::update_destination)
                    .delete(resources::delete_destination)
                    .route_layer(gate),
            ),
        );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE]);

    Router::new()
        .merge(public)
        .merge(protected)
        .nest_service("/uploads", ServeDir::new(&state.config.server.uploads_dir))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
