//! `add` / `remove` handlers: entry management through the config flow.

use gatus_core::{ConfigFlow, FlowInput, FlowResult, Transport};
use tracing::debug;

use crate::cli::{AddArgs, GlobalOpts, RemoveArgs};
use crate::config;
use crate::error::CliError;

pub async fn add(args: AddArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_file(global);
    let mut cfg = config::load(global)?;
    let settings = config::settings(global, &cfg)?;

    let flow = ConfigFlow::new(Transport::new()?)
        .with_configured(cfg.unique_ids())
        .with_timeout(settings.request_timeout);

    let input = FlowInput::new(args.name, args.url, !args.no_verify_ssl);
    let unique_id = input.unique_id();
    let url = input.url.clone();

    match flow.step_user(Some(input)).await {
        FlowResult::CreateEntry { title, data } => {
            let id = cfg.add_entry(data)?;
            config::save_config_to(&cfg, &path)?;
            debug!(%id, path = %path.display(), "entry saved");
            if !global.quiet {
                eprintln!("Added entry '{id}' ({title})");
            }
            Ok(())
        }
        FlowResult::Abort { reason } => {
            debug!(%reason, "flow aborted");
            Err(CliError::AlreadyConfigured { unique_id })
        }
        FlowResult::Form { errors, .. } => match errors.values().next() {
            Some(err) => Err(CliError::from_flow(*err, &url)),
            None => Err(CliError::Validation {
                field: "input".into(),
                reason: "the config flow asked for input again".into(),
            }),
        },
    }
}

pub fn remove(args: &RemoveArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_file(global);
    let mut cfg = config::load(global)?;

    let removed = cfg.remove_entry(&args.id)?;
    config::save_config_to(&cfg, &path)?;
    if !global.quiet {
        eprintln!("Removed entry '{}' ({})", args.id, removed.name);
    }
    Ok(())
}
