//! HTTP inbound adapter exposing REST endpoints.

pub mod documents;
pub mod envelope;
pub mod error;
pub mod health;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

use actix_web::{Scope, web};

pub use error::ApiResult;

/// All versioned API endpoints, mounted under `/v1`.
///
/// Handlers expect [`state::HttpState`] as app data and, for readable JSON
/// rejections, [`json_config`].
///
/// # Examples
/// ```
/// use actix_web::App;
/// use docvault::inbound::http::{api_scope, json_config};
///
/// let app = App::new().app_data(json_config()).service(api_scope());
/// ```
pub fn api_scope() -> Scope {
    web::scope("/v1")
        .service(users::register)
        .service(users::login)
        .service(users::session)
        .service(users::update_profile)
        .service(documents::create_document)
        .service(documents::list_documents)
        .service(documents::get_document)
        .service(documents::update_document)
        .service(documents::delete_document)
}

/// JSON extractor settings rendering rejections in the error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(error::json_error_handler)
}
