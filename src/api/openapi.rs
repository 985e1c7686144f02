use super::{
    error::Message,
    handlers::{admin, directory, health, login, register, session},
};
use crate::directory::{AdminOverview, DirectoryEntry, MemberRecord};
use utoipa::{
    openapi::{
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
        Contact, License, Tag,
    },
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        register::register,
        login::login,
        session::session,
        session::logout,
        directory::directory,
        admin::admin_login,
        admin::admin_logout,
        admin::list_users,
        admin::set_active,
        admin::delete_user,
    ),
    components(schemas(
        Message,
        DirectoryEntry,
        MemberRecord,
        AdminOverview,
        health::Health,
        register::RegisterRequest,
        login::LoginRequest,
        login::LoginResponse,
        session::SessionResponse,
        admin::AdminLoginRequest,
        admin::AdminLoginResponse,
        admin::ActiveRequest,
    )),
    modifiers(&AdminBearer)
)]
struct ApiDoc;

struct AdminBearer;

impl Modify for AdminBearer {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

/// The `OpenAPI` document served at `/api-docs/openapi.json`.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();

    // Use Cargo.toml metadata instead of the utoipa crate info defaults.
    spec.info.title = env!("CARGO_PKG_NAME").to_string();
    spec.info.version = env!("CARGO_PKG_VERSION").to_string();
    spec.info.description = optional_str(env!("CARGO_PKG_DESCRIPTION")).map(str::to_string);
    spec.info.contact = cargo_contact();
    spec.info.license = cargo_license();

    spec.tags = Some(vec![
        tag("auth", "Registration, login and session liveness"),
        tag("directory", "Alumni directory for signed-in members"),
        tag("admin", "Account activation and removal"),
        tag("health", "Service and store health"),
    ]);

    spec
}

fn tag(name: &str, description: &str) -> Tag {
    let mut tag = Tag::new(name);
    tag.description = Some(description.to_string());
    tag
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `;` separated and may include "Name <email>".
    let authors = env!("CARGO_PKG_AUTHORS");
    let primary = authors.split(';').next().map(str::trim)?;
    if primary.is_empty() {
        return None;
    }

    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    Some(license)
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    if let Some(start) = author.find('<') {
        let name = author[..start].trim();
        let email = author[start + 1..].trim_end_matches('>').trim();
        let name = if name.is_empty() { None } else { Some(name) };
        let email = if email.is_empty() { None } else { Some(email) };
        (name, email)
    } else {
        let name = author.trim();
        (if name.is_empty() { None } else { Some(name) }, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let spec = openapi();
        assert_eq!(spec.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(spec.info.version, env!("CARGO_PKG_VERSION"));

        let contact = spec.info.contact;
        assert!(contact.is_some());
        if let Some(contact) = contact {
            assert_eq!(contact.name.as_deref(), Some("Team Ankur"));
            assert_eq!(contact.email.as_deref(), Some("team@ankur.dev"));
        }

        let license = spec.info.license;
        assert!(license.is_some());
        if let Some(license) = license {
            assert_eq!(license.name, "BSD-3-Clause");
            assert_eq!(license.identifier.as_deref(), Some("BSD-3-Clause"));
        }
    }

    #[test]
    fn openapi_tags_and_paths() {
        let spec = openapi();
        let tags = spec.tags.clone().unwrap_or_default();
        for name in ["auth", "directory", "admin", "health"] {
            assert!(tags.iter().any(|tag| tag.name == name), "missing tag {name}");
        }
        for path in [
            "/health",
            "/v1/register",
            "/v1/login",
            "/v1/session",
            "/v1/logout",
            "/v1/directory",
            "/v1/admin/login",
            "/v1/admin/users",
            "/v1/admin/users/{email}",
            "/v1/admin/users/{email}/active",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing path {path}");
        }
    }

    #[test]
    fn parse_author_variants() {
        assert_eq!(
            parse_author("Team Ankur <team@ankur.dev>"),
            (Some("Team Ankur"), Some("team@ankur.dev"))
        );
        assert_eq!(parse_author("Team Ankur"), (Some("Team Ankur"), None));
        assert_eq!(parse_author("<team@ankur.dev>"), (None, Some("team@ankur.dev")));
    }

    #[test]
    fn bearer_scheme_registered() {
        let spec = openapi();
        let schemes = spec
            .components
            .map(|components| components.security_schemes)
            .unwrap_or_default();
        assert!(schemes.contains_key("bearer"));
    }
}
