//! OpenAPI document for the HTTP surface, served through Swagger UI at
//! `/docs`.

use utoipa::OpenApi;

use crate::api::handlers::{auth, contact, health, messages, settings};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "vetrina",
        description = "Marketing site backend: contact form intake, site settings, and the admin moderation API."
    ),
    paths(
        health::health,
        contact::submit,
        settings::analytics,
        settings::get,
        settings::put,
        auth::login::login,
        auth::session::verify,
        auth::session::logout,
        auth::password::change_password,
        messages::list,
        messages::detail,
        messages::update,
    ),
    components(schemas(
        health::Health,
        contact::ContactRequest,
        contact::ContactResponse,
        settings::SettingValue,
        settings::PutRequest,
        auth::types::LoginRequest,
        auth::types::LoginResponse,
        auth::types::UserProfile,
        auth::types::VerifyResponse,
        auth::types::LogoutResponse,
        auth::types::ChangePasswordRequest,
        auth::types::OkResponse,
        auth::types::ErrorResponse,
        messages::Message,
        messages::Pagination,
        messages::InboxStats,
        messages::ListResponse,
        messages::UpdateRequest,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "contact", description = "Public contact form"),
        (name = "settings", description = "Site settings key/value store"),
        (name = "auth", description = "Admin session management"),
        (name = "messages", description = "Admin contact message inbox")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_has_all_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/health",
            "/api/contact",
            "/api/settings/analytics",
            "/api/admin/login",
            "/api/admin/logout",
            "/api/admin/verify",
            "/api/admin/change-password",
            "/api/admin/messages",
            "/api/admin/messages/{id}",
            "/api/admin/settings",
        ] {
            assert!(paths.contains_key(path), "missing path: {path}");
        }
    }
}
