//! `watch` handler: keep an entry running and print state transitions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use gatus_core::{
    EntityRegistration, EntityRegistry, SensorSink, SensorState, TokioScheduler, Transport,
    UpdateFailed, setup_entry,
};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::status::{SensorRow, server_order};

/// Forwards every state write to the watch loop, one message per cycle.
struct WatchSink {
    registry: EntityRegistry,
    cycles: mpsc::UnboundedSender<Vec<SensorState>>,
}

impl SensorSink for WatchSink {
    fn add_entities(&self, entities: Vec<EntityRegistration>) {
        self.registry.add_entities(entities);
    }

    fn write_states(&self, states: &[SensorState]) {
        self.registry.write_states(states);
        let _ = self.cycles.send(states.to_vec());
    }

    fn update_failed(&self, err: &UpdateFailed) {
        warn!(kind = %err.kind, "{err}");
        self.registry.update_failed(err);
    }

    fn remove_entities(&self, entity_ids: &[String]) {
        self.registry.remove_entities(entity_ids);
    }
}

/// One observed state change.
#[derive(Debug, Serialize)]
struct Transition {
    at: String,
    entity_id: String,
    from: Option<&'static str>,
    to: &'static str,
}

impl Transition {
    fn line(&self, color: bool) -> String {
        format!(
            "{}  {}  {} -> {}",
            self.at,
            self.entity_id,
            self.from.map_or_else(|| "new".to_string(), |s| output::paint_state(s, color)),
            output::paint_state(self.to, color),
        )
    }
}

/// Compare a cycle's states with the previous ones and record the new
/// state strings.
fn diff(prev: &mut HashMap<String, &'static str>, states: &[SensorState], at: &str) -> Vec<Transition> {
    let mut out = Vec::new();
    for s in states {
        let to = s.state_str();
        let from = prev.insert(s.entity_id.clone(), to);
        if from != Some(to) {
            out.push(Transition {
                at: at.to_string(),
                entity_id: s.entity_id.clone(),
                from,
                to,
            });
        }
    }
    out
}

fn emit(transitions: &[Transition], global: &GlobalOpts, color: bool) -> Result<(), CliError> {
    for t in transitions {
        let line = match global.output {
            OutputFormat::Json | OutputFormat::JsonCompact => {
                serde_json::to_string(t).map_err(|e| CliError::Render(e.to_string()))?
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(&[t]).map_err(|e| CliError::Render(e.to_string()))?
            }
            OutputFormat::Plain => format!("{} {}", t.entity_id, t.to),
            OutputFormat::Table => t.line(color),
        };
        output::print_output(line.trim_end(), global.quiet);
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let entry = config::active_entry(global, &cfg)?;
    let mut settings = config::settings(global, &cfg)?;
    if let Some(secs) = args.interval {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "interval".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        settings.update_interval = Duration::from_secs(secs);
    }
    let url = entry.url.to_string();
    let title = entry.title.clone();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let sink = Arc::new(WatchSink {
        registry: EntityRegistry::new(),
        cycles: tx,
    });

    let shutdown = CancellationToken::new();
    let runtime = setup_entry(
        entry,
        &Transport::new()?,
        Arc::new(TokioScheduler::with_parent(shutdown.clone())),
        Arc::clone(&sink) as Arc<dyn SensorSink>,
        settings,
    )
    .await
    .map_err(|e| super::setup_error(e, &url))?;

    let color = output::should_color(global.color);
    let mut prev: HashMap<String, &'static str> = HashMap::new();

    // The setup cycle: print the full picture once.
    if let Some(initial) = rx.recv().await {
        let _ = diff(&mut prev, &initial, "");
        let views = server_order(&runtime, &sink.registry);
        let out = output::render_list(global.output, &views, |v| SensorRow::new(v, color), |v| {
            format!("{} {}", v.entity_id, v.state)
        })?;
        output::print_output(&out, global.quiet);
    }
    if !global.quiet && matches!(global.output, OutputFormat::Table) {
        eprintln!(
            "Watching {title} every {}s (Ctrl-C to stop)",
            settings.update_interval.as_secs()
        );
    }

    let mut cycles = 0u64;
    loop {
        if args.count.is_some_and(|n| cycles >= n) {
            break;
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break;
            }
            states = rx.recv() => {
                let Some(states) = states else { break };
                cycles += 1;
                let at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
                emit(&diff(&mut prev, &states, &at), global, color)?;
            }
        }
    }

    shutdown.cancel();
    runtime.unload().await;
    Ok(())
}
