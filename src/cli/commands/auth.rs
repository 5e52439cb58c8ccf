//! Auth-related CLI arguments: session TTL, site origin, and the optional
//! basic-auth gate in front of the whole site.

use anyhow::Result;
use clap::{Arg, Command};
use secrecy::SecretString;

pub const ARG_SITE_BASE_URL: &str = "site-base-url";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_GATE_USERNAME: &str = "gate-username";
pub const ARG_GATE_PASSWORD: &str = "gate-password";

// 7 days, matching the session cookie Max-Age.
const DEFAULT_SESSION_TTL_SECONDS: &str = "604800";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SITE_BASE_URL)
                .long(ARG_SITE_BASE_URL)
                .help("Base URL the site is served from (used as the CORS origin)")
                .default_value("http://localhost:8788")
                .env("VETRINA_SITE_BASE_URL"),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Admin session lifetime in seconds")
                .default_value(DEFAULT_SESSION_TTL_SECONDS)
                .env("VETRINA_SESSION_TTL_SECONDS")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_GATE_USERNAME)
                .long(ARG_GATE_USERNAME)
                .help("Username for the site-wide basic-auth gate (gate disabled when unset)")
                .env("VETRINA_GATE_USERNAME")
                .requires(ARG_GATE_PASSWORD),
        )
        .arg(
            Arg::new(ARG_GATE_PASSWORD)
                .long(ARG_GATE_PASSWORD)
                .help("Password for the site-wide basic-auth gate")
                .env("VETRINA_GATE_PASSWORD")
                .requires(ARG_GATE_USERNAME),
        )
}

#[derive(Debug)]
pub struct Options {
    pub site_base_url: String,
    pub session_ttl_seconds: i64,
    pub gate_username: Option<String>,
    pub gate_password: Option<SecretString>,
}

impl Options {
    /// Extract auth options from parsed matches.
    ///
    /// # Errors
    /// Returns an error if the session TTL is not positive.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let site_base_url = matches
            .get_one::<String>(ARG_SITE_BASE_URL)
            .cloned()
            .unwrap_or_else(|| "http://localhost:8788".to_string());

        let session_ttl_seconds = matches
            .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
            .copied()
            .unwrap_or(604_800);
        anyhow::ensure!(
            session_ttl_seconds > 0,
            "--{ARG_SESSION_TTL_SECONDS} must be positive"
        );

        let gate_username = matches.get_one::<String>(ARG_GATE_USERNAME).cloned();
        let gate_password = matches
            .get_one::<String>(ARG_GATE_PASSWORD)
            .map(|password| SecretString::from(password.clone()));

        Ok(Self {
            site_base_url,
            session_ttl_seconds,
            gate_username,
            gate_password,
        })
    }
}
