//! Command handlers.

pub mod add;
pub mod check;
pub mod entries;
pub mod status;
pub mod watch;

use gatus_core::CoreError;

use crate::error::CliError;

/// Setup failures name the entry title; report the server URL instead.
fn setup_error(err: CoreError, url: &str) -> CliError {
    match err {
        CoreError::NotReady { source, .. } => CliError::from_kind(source.kind, url, source.message),
        other => other.into(),
    }
}
