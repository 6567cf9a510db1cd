//! `status` handler: one setup cycle, print every sensor.

use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use gatus_core::{
    EntityRegistry, GatusRuntime, RegisteredEntity, SensorAttributes, SensorSink, TokioScheduler,
    Transport, setup_entry,
};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{GlobalOpts, StatusArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── View / table row ────────────────────────────────────────────────

/// One sensor as printed by `status` and `watch`.
#[derive(Debug, Clone, Serialize)]
pub struct SensorView {
    pub entity_id: String,
    pub unique_id: String,
    pub name: String,
    pub state: &'static str,
    pub attributes: Option<SensorAttributes>,
}

impl From<&RegisteredEntity> for SensorView {
    fn from(e: &RegisteredEntity) -> Self {
        Self {
            entity_id: e.registration.entity_id.clone(),
            unique_id: e.registration.unique_id.clone(),
            name: e.registration.name.clone(),
            state: e.state.as_ref().map_or("unknown", |s| s.state_str()),
            attributes: e.state.as_ref().and_then(|s| s.attributes.clone()),
        }
    }
}

#[derive(Tabled)]
pub struct SensorRow {
    #[tabled(rename = "Entity")]
    entity_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Response")]
    response: String,
    #[tabled(rename = "Last checked")]
    last_checked: String,
    #[tabled(rename = "Errors")]
    errors: String,
}

impl SensorRow {
    pub fn new(v: &SensorView, color: bool) -> Self {
        let attrs = v.attributes.as_ref();
        Self {
            entity_id: v.entity_id.clone(),
            name: v.name.clone(),
            group: attrs.map(|a| a.group.clone()).unwrap_or_default(),
            state: output::paint_state(v.state, color),
            response: attrs.map(|a| format_response(a.response_time)).unwrap_or_default(),
            last_checked: attrs.map(|a| format_checked(&a.last_checked)).unwrap_or_default(),
            errors: attrs.map(|a| a.errors.join("; ")).unwrap_or_default(),
        }
    }
}

fn format_response(ns: u64) -> String {
    format!("{:.1} ms", Duration::from_nanos(ns).as_secs_f64() * 1000.0)
}

fn format_checked(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map_or_else(|_| raw.to_string(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

pub fn is_down(v: &SensorView) -> bool {
    v.state != "on"
}

/// Views of every registered sensor, in the order the server lists them.
pub fn server_order(runtime: &GatusRuntime, registry: &EntityRegistry) -> Vec<SensorView> {
    runtime
        .sensors()
        .iter()
        .filter_map(|sensor| registry.get(sensor.entity_id()))
        .map(|entity| SensorView::from(&entity))
        .collect()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: StatusArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let entry = config::active_entry(global, &cfg)?;
    let settings = config::settings(global, &cfg)?;
    let url = entry.url.to_string();

    let transport = Transport::new()?;
    let registry = Arc::new(EntityRegistry::new());
    let runtime = setup_entry(
        entry,
        &transport,
        Arc::new(TokioScheduler::new()),
        Arc::clone(&registry) as Arc<dyn SensorSink>,
        settings,
    )
    .await
    .map_err(|e| super::setup_error(e, &url))?;

    let views: Vec<SensorView> = server_order(&runtime, &registry)
        .into_iter()
        .filter(|v| !args.down || is_down(v))
        .collect();
    runtime.unload().await;

    let color = output::should_color(global.color);
    let out = output::render_list(global.output, &views, |v| SensorRow::new(v, color), |v| {
        v.entity_id.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
