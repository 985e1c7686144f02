//! # Ankur (alumni directory)
//!
//! Registration, login and a members-only directory for an alumni network.
//!
//! ## Accounts
//!
//! Accounts are keyed by a normalized email (trimmed and lowercased). Passwords
//! are kept as a SHA-256 hex digest. New accounts start active; an admin can
//! deactivate or delete them.
//!
//! ## Single active session
//!
//! Each account has at most one live session token. A new login issues a fresh
//! token and the previous one stops validating, so the older device is signed
//! out on its next request. A deployment can instead refuse the second login
//! (see [`api::LoginPolicy`]).
//!
//! ## Privacy
//!
//! Signed-in members see name, batch, profession, email and year of passout
//! only. Phone, address and password digests never leave the admin surface,
//! and digests never leave the store.

pub mod api;
pub mod cli;
pub mod directory;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
