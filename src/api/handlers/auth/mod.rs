//! Auth handlers and supporting modules.
//!
//! The guard in [`session`] is shared by every protected handler: it parses
//! the `session` cookie, looks the session up, and produces a verdict before
//! the handler does anything else. Login failures and invalid sessions are
//! reported with deliberately generic bodies so clients cannot probe which
//! accounts exist.

pub(crate) mod gate;
pub(crate) mod login;
pub(crate) mod password;
pub(crate) mod session;
mod state;
mod storage;
pub(crate) mod types;
mod utils;

pub use state::{AuthConfig, GateConfig};
pub(crate) use utils::{extract_client_ip, normalize_email, valid_email};
