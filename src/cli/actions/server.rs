use crate::api;
use crate::api::handlers::auth::{AuthConfig, GateConfig};
use anyhow::Result;
use secrecy::SecretString;

/// Validated arguments for the server action.
#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub site_base_url: String,
    pub session_ttl_seconds: i64,
    pub gate_username: Option<String>,
    pub gate_password: Option<SecretString>,
}

/// Start the API server.
///
/// # Errors
/// Returns an error if the server fails to start.
pub async fn handle(args: Args) -> Result<()> {
    let auth_config = AuthConfig::new(args.site_base_url)
        .with_session_ttl_seconds(args.session_ttl_seconds);

    // Gate is enabled only when both credentials are injected.
    let gate = match (args.gate_username, args.gate_password) {
        (Some(username), Some(password)) => Some(GateConfig::new(username, password)),
        _ => None,
    };

    api::new(args.port, args.dsn, auth_config, gate).await
}
