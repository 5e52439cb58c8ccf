//! Command-line argument dispatch.
//!
//! This module maps validated CLI arguments to the appropriate action: the
//! API server, or the `hash-password` utility.

use crate::cli::actions::{Action, hash_password, server};
use crate::cli::commands::{ARG_PASSWORD, CMD_HASH_PASSWORD, auth};
use anyhow::{Context, Result};

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    if let Some((CMD_HASH_PASSWORD, sub)) = matches.subcommand() {
        let password = sub
            .get_one::<String>(ARG_PASSWORD)
            .cloned()
            .context("missing required argument: password")?;
        return Ok(Action::HashPassword(hash_password::Args { password }));
    }

    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(server::Args {
        port,
        dsn,
        site_base_url: auth_opts.site_base_url,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        gate_username: auth_opts.gate_username,
        gate_password: auth_opts.gate_password,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::actions::Action;

    #[test]
    fn server_action_carries_auth_options() {
        temp_env::with_vars(
            [
                ("VETRINA_DSN", None::<&str>),
                ("VETRINA_GATE_USERNAME", None::<&str>),
                ("VETRINA_GATE_PASSWORD", None::<&str>),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec![
                    "vetrina",
                    "--dsn",
                    "postgres://user@localhost:5432/vetrina",
                    "--site-base-url",
                    "https://vetrina.dev",
                    "--session-ttl-seconds",
                    "3600",
                ]);
                let action = handler(&matches).expect("dispatch failed");
                let Action::Server(args) = action else {
                    panic!("expected server action");
                };
                assert_eq!(args.port, 8080);
                assert_eq!(args.dsn, "postgres://user@localhost:5432/vetrina");
                assert_eq!(args.site_base_url, "https://vetrina.dev");
                assert_eq!(args.session_ttl_seconds, 3600);
                assert!(args.gate_username.is_none());
            },
        );
    }

    #[test]
    fn hash_password_action() {
        temp_env::with_vars([("VETRINA_DSN", None::<&str>)], || {
            let command = crate::cli::commands::new();
            let matches =
                command.get_matches_from(vec!["vetrina", "hash-password", "secret1"]);
            let action = handler(&matches).expect("dispatch failed");
            let Action::HashPassword(args) = action else {
                panic!("expected hash-password action");
            };
            assert_eq!(args.password, "secret1");
        });
    }

    #[test]
    fn session_ttl_must_be_positive() {
        temp_env::with_vars([("VETRINA_SESSION_TTL_SECONDS", None::<&str>)], || {
            let command = crate::cli::commands::new();
            let matches = command.get_matches_from(vec![
                "vetrina",
                "--dsn",
                "postgres://user@localhost:5432/vetrina",
                "--session-ttl-seconds",
                "0",
            ]);
            assert!(handler(&matches).is_err());
        });
    }
}
