//! Maps validated CLI arguments to the action to run.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{admin, session, ARG_DSN, ARG_PORT};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;

    let admin_opts = admin::Options::parse(matches)?;
    let session_opts = session::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        admin_username: admin_opts.username,
        admin_password: admin_opts.password,
        admin_token_ttl_seconds: admin_opts.token_ttl_seconds,
        session_cookie_secure: session_opts.cookie_secure,
        login_policy: session_opts.login_policy,
        frontend_base_url: session_opts.frontend_base_url,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::LoginPolicy;
    use secrecy::ExposeSecret;

    #[test]
    fn builds_server_args_from_env() {
        temp_env::with_vars(
            [
                ("ANKUR_DSN", Some("memory://")),
                ("ANKUR_PORT", Some("3000")),
                ("ANKUR_ADMIN_USERNAME", Some("warden")),
                ("ANKUR_ADMIN_PASSWORD", Some("s3cret")),
                ("ANKUR_LOGIN_POLICY", Some("reject")),
                ("ANKUR_SESSION_COOKIE_SECURE", None),
                ("ANKUR_FRONTEND_BASE_URL", None),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec!["ankur"]);
                let action = handler(&matches);
                assert!(action.is_ok());
                if let Ok(Action::Server(args)) = action {
                    assert_eq!(args.port, 3000);
                    assert_eq!(args.dsn, "memory://");
                    assert_eq!(args.admin_username, "warden");
                    assert_eq!(args.admin_password.expose_secret(), "s3cret");
                    assert_eq!(args.login_policy, LoginPolicy::Reject);
                    assert!(!args.session_cookie_secure);
                    assert_eq!(args.frontend_base_url, None);
                }
            },
        );
    }

    #[test]
    fn args_debug_redacts_password() {
        temp_env::with_vars(
            [
                ("ANKUR_DSN", Some("memory://")),
                ("ANKUR_ADMIN_PASSWORD", Some("do-not-print")),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec!["ankur"]);
                if let Ok(action) = handler(&matches) {
                    let debug = format!("{action:?}");
                    assert!(!debug.contains("do-not-print"));
                } else {
                    panic!("handler failed");
                }
            },
        );
    }
}
