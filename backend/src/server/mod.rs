//! HTTP server assembly: shared state, routes and the listener.

mod config;
mod state_builders;

pub use config::{AppSettings, ServerConfig};
pub use state_builders::build_http_state;

use std::net::SocketAddr;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};

use docvault::Trace;
#[cfg(debug_assertions)]
use docvault::doc::ApiDoc;
use docvault::inbound::http::health::{HealthState, health, live, ready};
use docvault::inbound::http::state::HttpState;
use docvault::inbound::http::{api_scope, json_config};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// State handed to every worker's `App`.
#[derive(Clone)]
pub struct Routes {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

impl Routes {
    pub fn new(health_state: web::Data<HealthState>, http_state: web::Data<HttpState>) -> Self {
        Self {
            health_state,
            http_state,
        }
    }

    /// Mount the versioned API, the probes and (in debug builds) Swagger UI.
    fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.health_state.clone())
            .app_data(self.http_state.clone())
            .app_data(json_config())
            .service(api_scope())
            .service(health)
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        cfg.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }
}

/// Bind `bind_addr` and start serving.
///
/// Readiness flips only after the bind succeeds. Signal handling is left to
/// the caller, which marks the service unhealthy before stopping it.
///
/// # Errors
/// Returns the bind error when the address is unavailable.
pub fn create_server(routes: Routes, bind_addr: SocketAddr) -> std::io::Result<Server> {
    let health_state = routes.health_state.clone();
    let server = HttpServer::new(move || {
        let routes = routes.clone();
        App::new()
            .wrap(Trace)
            .configure(move |cfg| routes.register(cfg))
    })
    .bind(bind_addr)?
    .disable_signals()
    .run();

    health_state.mark_ready();
    Ok(server)
}
