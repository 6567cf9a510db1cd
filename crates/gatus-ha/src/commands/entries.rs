//! `entries` handler.

use serde::Serialize;
use tabled::Tabled;

use crate::cli::GlobalOpts;
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

// ── View / table row ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EntryView {
    id: String,
    name: String,
    url: String,
    verify_ssl: bool,
    default: bool,
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Verify SSL")]
    verify_ssl: String,
    #[tabled(rename = "Default")]
    default: String,
}

impl From<&EntryView> for EntryRow {
    fn from(e: &EntryView) -> Self {
        Self {
            id: e.id.clone(),
            name: e.name.clone(),
            url: e.url.clone(),
            verify_ssl: if e.verify_ssl { "yes" } else { "no" }.into(),
            default: if e.default { "*" } else { "" }.into(),
        }
    }
}

fn views(cfg: &Config) -> Vec<EntryView> {
    cfg.entries
        .iter()
        .map(|(id, p)| EntryView {
            id: id.clone(),
            name: p.name.clone(),
            url: p.url.clone(),
            verify_ssl: p.verify_ssl,
            default: cfg.default_entry.as_deref() == Some(id.as_str()),
        })
        .collect()
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let data = views(&cfg);
    let out = output::render_list(global.output, &data, |e| EntryRow::from(e), |e| e.id.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
