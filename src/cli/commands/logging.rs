//! Verbosity flag shared by every vetrina subcommand.
//!
//! `-v` occurrences stack up to TRACE. `VETRINA_LOG_LEVEL` accepts either a
//! count or a level name, so deployments can set `info` directly instead of
//! counting flags.

use clap::{Arg, Command, builder::ValueParser};

pub const ARG_VERBOSITY: &str = "verbosity";

/// Accept a level name (case-insensitive) or a numeric count up to 5.
fn parse_log_level(level: &str) -> std::result::Result<u8, String> {
    match level.to_lowercase().as_str() {
        "error" => Ok(0),
        "warn" => Ok(1),
        "info" => Ok(2),
        "debug" => Ok(3),
        "trace" => Ok(4),
        other => match other.parse::<u8>() {
            Ok(count) if count <= 5 => Ok(count),
            _ => Err("invalid log level".to_string()),
        },
    }
}

#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(|level: &str| parse_log_level(level))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("VETRINA_LOG_LEVEL")
            .global(true)
            .action(clap::ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}

#[cfg(test)]
mod tests {
    use super::parse_log_level;

    #[test]
    fn parse_accepts_names_and_counts() {
        assert_eq!(parse_log_level("error"), Ok(0));
        assert_eq!(parse_log_level("WARN"), Ok(1));
        assert_eq!(parse_log_level("Info"), Ok(2));
        assert_eq!(parse_log_level("debug"), Ok(3));
        assert_eq!(parse_log_level("trace"), Ok(4));
        assert_eq!(parse_log_level("0"), Ok(0));
        assert_eq!(parse_log_level("5"), Ok(5));
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert!(parse_log_level("6").is_err());
        assert!(parse_log_level("verbose").is_err());
        assert!(parse_log_level("-1").is_err());
        assert!(parse_log_level("").is_err());
    }
}
