//! Match outcome reporting.

use std::fmt;

use geosmash_combat::{Arena, FighterKind, FrameReport, KnockOut, Stat};
use geosmash_common::{EntityId, PlayerId};
use serde::Serialize;

/// Per-player line of the summary.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerLine {
    pub player: PlayerId,
    pub fighter: FighterKind,
    pub lives: u32,
    pub damage: f32,
    pub kills: f32,
    pub deaths: f32,
    pub suicides: f32,
    pub damage_given: f32,
    pub max_kill_streak: f32,
    /// Finishing place, zero while still standing
    pub place: f32,
}

/// Everything the runner prints once the match stops.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchSummary {
    pub frames: u64,
    pub finished: bool,
    pub hits: usize,
    pub clashes: usize,
    pub kos: Vec<KnockOut>,
    pub players: Vec<PlayerLine>,
}

impl MatchSummary {
    /// Folds one frame into the running totals.
    pub fn record(&mut self, report: &FrameReport) {
        self.frames = report.frame;
        self.hits += report.hits.len();
        self.clashes += report.clashes.len();
        self.kos.extend_from_slice(&report.kos);
    }

    /// Reads final fighter state and stats out of the arena.
    pub fn finish(&mut self, arena: &Arena, roster: &[(EntityId, FighterKind)]) {
        self.finished = arena.is_over();
        let stats = arena.stats();
        self.players = roster
            .iter()
            .filter_map(|&(id, kind)| arena.fighter(id).map(|f| (f, kind)))
            .map(|(fighter, kind)| {
                let player = fighter.player();
                PlayerLine {
                    player,
                    fighter: kind,
                    lives: fighter.lives(),
                    damage: fighter.damage(),
                    kills: stats.get(player, Stat::Kills),
                    deaths: stats.get(player, Stat::Deaths),
                    suicides: stats.get(player, Stat::Suicides),
                    damage_given: stats.get(player, Stat::DamageGiven),
                    max_kill_streak: stats.get(player, Stat::MaxKillStreak),
                    place: stats.get(player, Stat::Place),
                }
            })
            .collect();
    }
}

impl fmt::Display for MatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = if self.finished { "decided" } else { "time out" };
        writeln!(f, "=== Match {outcome} after {} frames ===", self.frames)?;
        writeln!(f, "hits: {}  clashes: {}  knockouts: {}", self.hits, self.clashes, self.kos.len())?;
        for line in &self.players {
            writeln!(
                f,
                "  {:?} {:<9} lives {}  damage {:>5.1}  K/D {}/{}  SD {}  dealt {:.1}{}",
                line.player,
                line.fighter.to_string(),
                line.lives,
                line.damage,
                line.kills,
                line.deaths,
                line.suicides,
                line.damage_given,
                if line.place > 0.0 {
                    format!("  place {}", line.place)
                } else {
                    String::new()
                },
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates() {
        let mut summary = MatchSummary::default();
        let report = FrameReport {
            frame: 3,
            clashes: vec![(EntityId::from_raw(1), EntityId::from_raw(2))],
            ..FrameReport::default()
        };
        summary.record(&report);
        summary.record(&FrameReport { frame: 4, ..report });

        assert_eq!(summary.frames, 4);
        assert_eq!(summary.clashes, 2);
        assert_eq!(summary.hits, 0);
        let text = summary.to_string();
        assert!(text.contains("time out after 4 frames"));
    }
}
