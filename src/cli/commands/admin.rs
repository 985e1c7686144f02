use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_ADMIN_USERNAME: &str = "admin-username";
pub const ARG_ADMIN_PASSWORD: &str = "admin-password";
pub const ARG_ADMIN_TOKEN_TTL_SECONDS: &str = "admin-token-ttl-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ADMIN_USERNAME)
                .long(ARG_ADMIN_USERNAME)
                .help("Admin login name")
                .env("ANKUR_ADMIN_USERNAME")
                .default_value("admin"),
        )
        .arg(
            Arg::new(ARG_ADMIN_PASSWORD)
                .long(ARG_ADMIN_PASSWORD)
                .help("Admin password")
                .env("ANKUR_ADMIN_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_ADMIN_TOKEN_TTL_SECONDS)
                .long(ARG_ADMIN_TOKEN_TTL_SECONDS)
                .help("Lifetime of an admin grant in seconds")
                .env("ANKUR_ADMIN_TOKEN_TTL_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub username: String,
    pub password: SecretString,
    pub token_ttl_seconds: u64,
}

impl Options {
    /// Read the admin arguments.
    ///
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let username = matches
            .get_one::<String>(ARG_ADMIN_USERNAME)
            .cloned()
            .context("missing required argument: --admin-username")?;
        let password = matches
            .get_one::<String>(ARG_ADMIN_PASSWORD)
            .cloned()
            .map(SecretString::from)
            .context("missing required argument: --admin-password")?;
        let token_ttl_seconds = matches
            .get_one::<u64>(ARG_ADMIN_TOKEN_TTL_SECONDS)
            .copied()
            .unwrap_or(3600);

        Ok(Self {
            username,
            password,
            token_ttl_seconds,
        })
    }
}
