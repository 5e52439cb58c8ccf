//! # Vetrina (Marketing Site Backend)
//!
//! `vetrina` is the backend glue for a small marketing website. It serves the
//! public contact form, a settings key-value store, and the `/api/admin/*`
//! surface used by the site's moderation dashboard.
//!
//! ## Authentication
//!
//! Administrators authenticate with email and password. Passwords are stored
//! as `salt:digest` strings (hex salt, hex SHA-256 of `password || salt`).
//! Successful logins mint an opaque session identifier delivered in a
//! `session` cookie (`HttpOnly; Secure; SameSite=Strict`) with a fixed 7-day
//! TTL. Sessions are not renewed on use; expiry is checked at validation
//! time, and expired rows are simply ignored until an external sweep removes
//! them.
//!
//! Every protected handler runs the same guard before any other work: the
//! cookie header is parsed, the session row is looked up, and the request is
//! rejected with `401 {"error": "Unauthorized"}` unless the session exists
//! and has not expired. Login failures are indistinguishable between unknown
//! email and wrong password to prevent account enumeration.
//!
//! ## Site gate
//!
//! An optional HTTP Basic Auth gate can wrap the whole site (useful for
//! staging environments). Credentials are injected via CLI/env configuration,
//! never embedded in source.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
