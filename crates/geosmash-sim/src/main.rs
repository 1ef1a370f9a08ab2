//! # GeoSmash Sim
//!
//! Headless match runner. Loads a tuning file and a stage, lets scripted
//! bots play for a fixed number of frames and prints what happened. Used to
//! smoke test parameter changes without a renderer.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod bot;
mod summary;

use std::path::PathBuf;
use std::sync::Arc;

use ahash::AHashMap;
use anyhow::{bail, Context, Result};
use clap::Parser;
use geosmash_combat::{Arena, FighterConfig, FighterKind, HazardParams, MatchRules, StageLayout};
use geosmash_common::{Ownership, ParamTable, PlayerId, TeamId};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::bot::Bot;
use crate::summary::MatchSummary;

/// Headless GeoSmash match runner
#[derive(Parser, Debug)]
#[command(name = "geosmash-sim")]
#[command(about = "Run a scripted GeoSmash match and print the outcome")]
struct Args {
    /// Tuning file (TOML, or legacy `key value` text)
    #[arg(long, default_value = "assets/params.toml")]
    params: PathBuf,

    /// Stage file (TOML)
    #[arg(long, default_value = "assets/stage.toml")]
    stage: PathBuf,

    /// Frames to simulate before calling the match
    #[arg(long, default_value_t = 3600)]
    frames: u64,

    /// Seconds per frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Lives per fighter
    #[arg(long, default_value_t = 3)]
    lives: u32,

    /// Fighter types, one per player
    #[arg(long, value_delimiter = ',', default_value = "charlie,stickman")]
    fighters: Vec<String>,

    /// Seconds between volcano eruptions (0 disables hazards)
    #[arg(long, default_value_t = 0.0)]
    hazard_interval: f32,

    /// Emit logs and the summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json)?;

    let summary = run(&args)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{summary}");
    }
    Ok(())
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::default().add_directive("geosmash=info".parse()?),
    };
    tracing_subscriber::registry()
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(filter)
        .init();
    Ok(())
}

fn run(args: &Args) -> Result<MatchSummary> {
    if args.dt <= 0.0 {
        bail!("--dt must be positive, got {}", args.dt);
    }
    if args.fighters.len() < 2 {
        bail!("need at least two fighters, got {}", args.fighters.len());
    }

    let table = ParamTable::load(&args.params)
        .with_context(|| format!("failed to load params from {}", args.params.display()))?;
    let stage = StageLayout::load(&args.stage)
        .with_context(|| format!("failed to load stage from {}", args.stage.display()))?;

    let rules = MatchRules {
        lives: args.lives,
        hazard_interval: args.hazard_interval,
        ..MatchRules::default()
    };
    let mut arena = Arena::new(stage, rules);
    if args.hazard_interval > 0.0 {
        let hazard = HazardParams::load(&table).context("stage hazards need volcanoHazard.*")?;
        arena = arena.with_hazards(hazard);
    }

    let mut configs: AHashMap<FighterKind, Arc<FighterConfig>> = AHashMap::new();
    let mut bots = Vec::with_capacity(args.fighters.len());
    let mut roster = Vec::with_capacity(args.fighters.len());
    for (slot, name) in args.fighters.iter().enumerate() {
        let kind = FighterKind::from_name(name)?;
        let config = match configs.get(&kind) {
            Some(config) => Arc::clone(config),
            None => {
                let config = Arc::new(
                    FighterConfig::load(&table, kind)
                        .with_context(|| format!("incomplete parameters for {kind}"))?,
                );
                configs.insert(kind, Arc::clone(&config));
                config
            }
        };
        let player = PlayerId::new(slot as i32);
        let id = arena.add_fighter(config, Ownership::new(player, TeamId::new(slot as i32)));
        bots.push(Bot::new(id, player, slot as u64 * 7));
        roster.push((id, kind));
    }

    info!(
        "Running {} frames with {} fighters",
        args.frames,
        roster.len()
    );
    let mut summary = MatchSummary::default();
    let mut inputs = AHashMap::with_capacity(bots.len());
    for _ in 0..args.frames {
        inputs.clear();
        for bot in &mut bots {
            let pad = *bot.think(&arena);
            inputs.insert(bot.player(), pad);
        }
        let report = arena.step(&inputs, args.dt);
        summary.record(&report);

        let drained = arena.bus().drain();
        if !drained.is_empty() {
            debug!("frame {}: {} side-channel events", report.frame, drained.len());
        }
        if arena.is_over() {
            info!("Match decided on frame {}", report.frame);
            break;
        }
    }

    summary.finish(&arena, &roster);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(frames: u64) -> Args {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..");
        Args {
            params: root.join("assets/params.toml"),
            stage: root.join("assets/stage.toml"),
            frames,
            dt: 1.0 / 60.0,
            lives: 1,
            fighters: vec!["charlie".into(), "stickman".into()],
            hazard_interval: 2.0,
            json: false,
        }
    }

    #[test]
    fn test_short_match_runs() {
        let summary = run(&args(600)).expect("match runs");
        assert!(summary.frames > 0 && summary.frames <= 600);
        assert_eq!(summary.players.len(), 2);
        assert!(serde_json::to_string(&summary).is_ok());
    }

    #[test]
    fn test_rejects_unknown_fighter() {
        let mut bad = args(10);
        bad.fighters = vec!["charlie".into(), "mario".into()];
        assert!(run(&bad).is_err());
    }

    #[test]
    fn test_reports_missing_params_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut bad = args(10);
        bad.params = dir.path().join("missing.toml");
        let err = run(&bad).expect_err("missing file");
        assert!(format!("{err:#}").contains("failed to load params"));
    }
}
