//! soundstage - positional sound controls for entity-component scenes
//!
//! Headless runner: loads a scene, replays a click script against it and
//! reports the resulting audio commands.

mod config;
mod scene_loader;

use anyhow::{Context, Result};
use config::SceneConfig;
use scene_loader::{build_scene, LoadedScene};
use soundstage_audio::SoundControl;
use soundstage_testkit::{EventRecord, JsonlSink};
use std::{env, path::PathBuf};
use tracing::{info, warn};

fn main() -> Result<()> {
    // INFO by default; override via RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting soundstage v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    let config = match &cli.scene {
        Some(path) => SceneConfig::load_from_path(path),
        None => SceneConfig::load(),
    };
    let clicks = if cli.clicks.is_empty() {
        config.clicks.clone()
    } else {
        cli.clicks.clone()
    };

    let mut loaded = build_scene(&config)?;
    report_helpers(&loaded);

    let mut sink = cli
        .event_log
        .as_ref()
        .map(JsonlSink::create)
        .transpose()
        .context("failed to open event log")?;

    // Setup commands (source creation, autoplay) are reported as step 0.
    flush_commands(&loaded, 0, sink.as_mut())?;

    for (index, name) in clicks.iter().enumerate() {
        let step = index as u64 + 1;
        match loaded.click(name) {
            Ok(invoked) => info!(step, target = %name, invoked, "click"),
            Err(err) => warn!(step, "{err:#}"),
        }
        flush_commands(&loaded, step, sink.as_mut())?;
    }

    info!(
        clicks = clicks.len(),
        entities = loaded.entities.len(),
        "click script finished"
    );
    Ok(())
}

fn flush_commands(loaded: &LoadedScene, step: u64, sink: Option<&mut JsonlSink>) -> Result<()> {
    let commands = loaded.log.commands();
    loaded.log.clear();
    for command in &commands {
        info!(step, ?command, "audio");
    }
    if let Some(sink) = sink {
        for command in &commands {
            sink.write(&EventRecord {
                step,
                kind: "audio",
                payload: command,
            })?;
        }
    }
    Ok(())
}

fn report_helpers(loaded: &LoadedScene) {
    for (name, entity) in &loaded.entities {
        let Some(control) = loaded.scene.world().get::<SoundControl>(*entity) else {
            continue;
        };
        match control.helper() {
            Some(helper) => {
                let angles = helper.angles();
                info!(
                    entity = %name,
                    range = helper.range(),
                    inner = angles.inner_deg,
                    outer = angles.outer_deg,
                    vertices = helper.geometry().vertex_count(),
                    outer_visible = helper.outer_visible(),
                    "cone helper"
                );
            }
            None => info!(entity = %name, "sound control without cone helper"),
        }
    }
}

#[derive(Debug, Default)]
struct CliOptions {
    scene: Option<PathBuf>,
    clicks: Vec<String>,
    event_log: Option<PathBuf>,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--scene" => {
                    if let Some(path) = args.next() {
                        opts.scene = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--scene requires a file path");
                    }
                }
                "--click" => {
                    if let Some(name) = args.next() {
                        opts.clicks.push(name);
                    } else {
                        tracing::error!("--click requires an entity name");
                    }
                }
                "--event-log" => {
                    if let Some(path) = args.next() {
                        opts.event_log = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--event-log requires a file path");
                    }
                }
                other => {
                    tracing::warn!(arg = other, "Ignoring unknown CLI argument");
                }
            }
        }

        opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliOptions {
        CliOptions::parse(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn parses_repeated_clicks_in_order() {
        let opts = parse(&["--click", "band", "--scene", "s.toml", "--click", "drums"]);
        assert_eq!(opts.clicks, vec!["band".to_string(), "drums".to_string()]);
        assert_eq!(opts.scene, Some(PathBuf::from("s.toml")));
        assert_eq!(opts.event_log, None);
    }

    #[test]
    fn missing_values_and_unknown_flags_are_ignored() {
        let opts = parse(&["--verbose", "--event-log"]);
        assert!(opts.clicks.is_empty());
        assert_eq!(opts.event_log, None);
    }
}
