//! Auth configuration shared across handlers.

use secrecy::{ExposeSecret, SecretString};

use super::password::constant_time_eq;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    site_base_url: String,
    session_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(site_base_url: String) -> Self {
        Self {
            site_base_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    pub(crate) fn site_base_url(&self) -> &str {
        &self.site_base_url
    }

    pub(crate) fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }
}

/// Credentials for the site-wide basic-auth gate. Injected at startup, never
/// embedded in source.
#[derive(Debug)]
pub struct GateConfig {
    username: String,
    password: SecretString,
}

impl GateConfig {
    #[must_use]
    pub fn new(username: String, password: SecretString) -> Self {
        Self { username, password }
    }

    /// Constant-time comparison of both parts so username probing leaks as
    /// little as the password check does.
    pub(crate) fn matches(&self, username: &str, password: &str) -> bool {
        let user_ok = constant_time_eq(self.username.as_bytes(), username.as_bytes());
        let pass_ok = constant_time_eq(self.password.expose_secret().as_bytes(), password.as_bytes());
        user_ok && pass_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new("https://vetrina.dev".to_string());
        assert_eq!(config.site_base_url(), "https://vetrina.dev");
        assert_eq!(config.session_ttl_seconds(), DEFAULT_SESSION_TTL_SECONDS);
        assert_eq!(config.session_ttl_seconds(), 604_800);

        let config = config.with_session_ttl_seconds(3600);
        assert_eq!(config.session_ttl_seconds(), 3600);
    }

    #[test]
    fn gate_config_matches_exact_credentials_only() {
        let gate = GateConfig::new("staging".to_string(), SecretString::from("hunter2"));
        assert!(gate.matches("staging", "hunter2"));
        assert!(!gate.matches("staging", "hunter3"));
        assert!(!gate.matches("Staging", "hunter2"));
        assert!(!gate.matches("", ""));
    }
}
