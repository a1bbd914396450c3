//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every HTTP handler under [`crate::inbound::http`]
//! together with the response schemas and the bearer token security scheme.
//! Debug builds serve it through Swagger UI; `cargo run --bin openapi-dump`
//! prints it for external tooling.

use crate::domain::{ErrorCode, UserProfile};
use crate::inbound::http::documents::{CreateDocumentForm, DocumentBody};
use crate::inbound::http::envelope::{EnvelopeStatus, ErrorBodySchema};
use crate::inbound::http::health::HealthReport;
use crate::inbound::http::users::{
    AccountSessionBody, LoginRequest, RegisterRequest, SessionBody,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Register the `Authorization: Bearer <jwt>` scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Token returned by POST /v1/auth/register or POST /v1/auth/login.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Docvault API",
        description = "Per-user document storage with bearer token sessions."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::session,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::documents::create_document,
        crate::inbound::http::documents::list_documents,
        crate::inbound::http::documents::get_document,
        crate::inbound::http::documents::update_document,
        crate::inbound::http::documents::delete_document,
        crate::inbound::http::health::health,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        AccountSessionBody,
        SessionBody,
        UserProfile,
        DocumentBody,
        CreateDocumentForm,
        EnvelopeStatus,
        ErrorBodySchema,
        ErrorCode,
        HealthReport,
    )),
    tags(
        (name = "auth", description = "Registration, login and session"),
        (name = "documents", description = "Document upload and management"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::openapi::{get_property, unwrap_object_schema};
    use rstest::rstest;

    #[rstest]
    #[case("/v1/auth/register")]
    #[case("/v1/auth/login")]
    #[case("/v1/auth/session")]
    #[case("/v1/auth/profile")]
    #[case("/v1/documents")]
    #[case("/v1/documents/{documentId}")]
    #[case("/health")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "{path} missing");
    }

    #[test]
    fn document_update_lists_patch_and_put() {
        let doc = ApiDoc::openapi();
        let item = doc
            .paths
            .paths
            .get("/v1/documents/{documentId}")
            .expect("document item path");
        assert!(item.patch.is_some());
        assert!(item.put.is_some());
        assert!(item.delete.is_some());
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearerAuth"));
    }

    #[test]
    fn error_body_uses_camel_case() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        let schema = components.schemas.get("ErrorBody").expect("ErrorBody schema");
        let object = unwrap_object_schema(schema, "ErrorBody");
        get_property(object, "code");
        get_property(object, "traceId");
    }

    #[rstest]
    #[case("createdAt")]
    #[case("updatedAt")]
    fn document_timestamps_are_date_time_strings(#[case] field: &str) {
        use utoipa::openapi::schema::{KnownFormat, SchemaFormat};

        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        let schema = components
            .schemas
            .get("DocumentBody")
            .expect("DocumentBody schema");
        let object = unwrap_object_schema(schema, "DocumentBody");
        let property = unwrap_object_schema(get_property(object, field), field);
        assert_eq!(
            property.format,
            Some(SchemaFormat::KnownFormat(KnownFormat::DateTime))
        );
    }
}
