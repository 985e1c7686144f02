use anyhow::{anyhow, Result};
use clap::{builder::PossibleValuesParser, Arg, ArgAction, ArgMatches, Command};

use crate::api::LoginPolicy;

pub const ARG_SESSION_COOKIE_SECURE: &str = "session-cookie-secure";
pub const ARG_LOGIN_POLICY: &str = "login-policy";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_COOKIE_SECURE)
                .long(ARG_SESSION_COOKIE_SECURE)
                .help("Mark session cookies Secure (serve over HTTPS)")
                .env("ANKUR_SESSION_COOKIE_SECURE")
                .action(ArgAction::Set)
                .num_args(0..=1)
                .default_value("false")
                .default_missing_value("true")
                .value_parser(clap::value_parser!(bool)),
        )
        .arg(
            Arg::new(ARG_LOGIN_POLICY)
                .long(ARG_LOGIN_POLICY)
                .help("What a login does when the account is signed in elsewhere")
                .env("ANKUR_LOGIN_POLICY")
                .default_value(LoginPolicy::Takeover.as_str())
                .ignore_case(true)
                .value_parser(PossibleValuesParser::new(LoginPolicy::VARIANTS)),
        )
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Browser frontend base URL; enables CORS with credentials for its origin")
                .env("ANKUR_FRONTEND_BASE_URL"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub cookie_secure: bool,
    pub login_policy: LoginPolicy,
    pub frontend_base_url: Option<String>,
}

impl Options {
    /// Read the session arguments.
    ///
    /// # Errors
    /// Returns an error if the login policy does not parse.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let cookie_secure = matches
            .get_one::<bool>(ARG_SESSION_COOKIE_SECURE)
            .copied()
            .unwrap_or(false);
        let login_policy = matches
            .get_one::<String>(ARG_LOGIN_POLICY)
            .map_or(Ok(LoginPolicy::default()), |value| value.parse())
            .map_err(|err: String| anyhow!(err))?;
        let frontend_base_url = matches.get_one::<String>(ARG_FRONTEND_BASE_URL).cloned();

        Ok(Self {
            cookie_secure,
            login_policy,
            frontend_base_url,
        })
    }
}
