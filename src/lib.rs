use axum::extract::State;
use axum::{Router, middleware};
use std::sync::Arc;

pub mod api;
pub mod app_env;
pub mod db;
pub mod domain;
pub mod dto;
pub mod external_connections;
pub mod logging;
pub mod persistence;
pub mod routing_utils;

/// Data shared by every request handler
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
    /// When set, every to-do route requires HTTP basic credentials matching a stored user
    pub require_auth: bool,
}

pub type AppState = State<Arc<SharedData>>;

/// Assembles the full application router: the versioned to-do API, its documentation,
/// and request tracing
pub fn build_router(shared_data: Arc<SharedData>) -> Router {
    let mut todo_routes = api::todo::todo_routes();
    if shared_data.require_auth {
        todo_routes = todo_routes.route_layer(middleware::from_fn_with_state(
            shared_data.clone(),
            api::auth::require_basic_auth,
        ));
    }

    let router = Router::new()
        .merge(todo_routes)
        .merge(api::swagger_main::build_documentation())
        .with_state(shared_data);

    logging::attach_tracing_http(router)
}
