//! `check` handler: probe `api/v1/config` on a server.

use gatus_api::{ServerConfig, StatusClient};
use gatus_core::{FlowInput, Transport};
use serde::Serialize;

use crate::cli::{CheckArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct CheckView {
    url: String,
    verify_ssl: bool,
    #[serde(flatten)]
    server: ServerConfig,
}

fn detail(v: &CheckView) -> String {
    format!(
        "Gatus at {} is reachable\n  verify ssl:    {}\n  oidc:          {}\n  authenticated: {}",
        v.url, v.verify_ssl, v.server.oidc, v.server.authenticated
    )
}

pub async fn handle(args: CheckArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let settings = config::settings(global, &cfg)?;

    let (url, verify_ssl) = match args.url {
        Some(raw) => {
            let input = FlowInput::new("check", raw.as_str(), !args.no_verify_ssl);
            let url = input.parsed_url().ok_or_else(|| CliError::Validation {
                field: "url".into(),
                reason: format!("not an http(s) URL: {raw}"),
            })?;
            (url, input.verify_ssl)
        }
        None => {
            let entry = config::active_entry(global, &cfg)?;
            (entry.url, entry.verify_ssl)
        }
    };

    let transport = Transport::new()?;
    let client = StatusClient::new(url.clone(), verify_ssl, &transport).with_timeout(settings.request_timeout);
    let server = client
        .fetch_config()
        .await
        .map_err(|e| CliError::from_kind(e.kind(), url.as_str(), e.to_string()))?;

    let view = CheckView {
        url: url.to_string(),
        verify_ssl,
        server,
    };
    let out = output::render_single(global.output, &view, detail, |v| v.url.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
