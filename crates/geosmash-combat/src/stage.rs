//! Stage geometry seen by the combat core.
//!
//! Fighters only ever talk to the stage through [`StageQuery`]: the ground
//! box, platforms, the kill box and ledge bookkeeping. [`StageLayout`] is the
//! serde-backed implementation used by the arena.

use std::fs;
use std::path::Path;

use geosmash_common::Rect;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CombatError, CombatResult};

/// Index of a ledge within a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgeId(pub usize);

/// Grabbable stage corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ledge {
    /// Corner position
    pub pos: Vec2,
    /// Side of the stage the ledge faces (-1 left, +1 right)
    pub dir: f32,
    /// Whether a fighter is hanging on it
    #[serde(default)]
    pub occupied: bool,
}

/// Read access to the stage plus ledge occupancy.
pub trait StageQuery {
    /// Main ground box.
    fn ground(&self) -> Rect;

    /// Pass-through platforms.
    fn platforms(&self) -> &[Rect];

    /// Fighters whose center leaves this box are knocked out.
    fn kill_box(&self) -> Rect;

    /// Closest unoccupied ledge to `pos`.
    fn nearest_free_ledge(&self, pos: Vec2) -> Option<(LedgeId, Ledge)>;

    /// Marks a ledge as taken or free.
    fn set_ledge_occupied(&mut self, id: LedgeId, occupied: bool);
}

/// Complete stage description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageLayout {
    /// Main ground box
    pub ground: Rect,
    /// Pass-through platforms
    #[serde(default)]
    pub platforms: Vec<Rect>,
    /// Kill box
    pub kill_box: Rect,
    /// Respawn points, assigned to players round-robin
    #[serde(default)]
    pub respawn_points: Vec<Vec2>,
    /// Explicit ledges; the ground's top corners when empty
    #[serde(default)]
    pub ledges: Vec<Ledge>,
    /// Places where volcano hazards erupt
    #[serde(default)]
    pub hazard_sites: Vec<Vec2>,
}

impl StageLayout {
    /// Builds a stage with ledges on both top corners of the ground.
    #[must_use]
    pub fn from_ground(ground: Rect, kill_box: Rect) -> Self {
        Self {
            ground,
            platforms: Vec::new(),
            kill_box,
            respawn_points: Vec::new(),
            ledges: corner_ledges(ground),
            hazard_sites: Vec::new(),
        }
    }

    /// Adds a platform.
    #[must_use]
    pub fn with_platform(mut self, platform: Rect) -> Self {
        self.platforms.push(platform);
        self
    }

    /// Adds a respawn point.
    #[must_use]
    pub fn with_respawn_point(mut self, point: Vec2) -> Self {
        self.respawn_points.push(point);
        self
    }

    /// Adds a hazard site.
    #[must_use]
    pub fn with_hazard_site(mut self, site: Vec2) -> Self {
        self.hazard_sites.push(site);
        self
    }

    /// Parses a stage from TOML.
    pub fn from_toml_str(contents: &str) -> CombatResult<Self> {
        let mut layout: Self = toml::from_str(contents)?;
        if layout.ledges.is_empty() {
            layout.ledges = corner_ledges(layout.ground);
        }
        layout.validate()?;
        debug!(
            "Parsed stage with {} platforms and {} ledges",
            layout.platforms.len(),
            layout.ledges.len()
        );
        Ok(layout)
    }

    /// Loads a stage file.
    pub fn load<P: AsRef<Path>>(path: P) -> CombatResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let layout = Self::from_toml_str(&contents)?;
        info!("Loaded stage from {}", path.display());
        Ok(layout)
    }

    /// Checks that the boxes are usable.
    pub fn validate(&self) -> CombatResult<()> {
        for (name, rect) in std::iter::once(("ground", &self.ground))
            .chain(std::iter::once(("kill_box", &self.kill_box)))
            .chain(self.platforms.iter().map(|p| ("platform", p)))
        {
            if rect.w <= 0.0 || rect.h <= 0.0 {
                return Err(CombatError::Stage(format!("{name} has non-positive size")));
            }
        }
        if !self.kill_box.contains(&self.ground) {
            return Err(CombatError::Stage(
                "kill box must contain the ground".to_string(),
            ));
        }
        if self.ledges.iter().any(|l| l.dir != 1.0 && l.dir != -1.0) {
            return Err(CombatError::Stage("ledge dir must be 1 or -1".to_string()));
        }
        Ok(())
    }

    /// Respawn point for a player slot.
    #[must_use]
    pub fn respawn_point(&self, slot: usize) -> Vec2 {
        if self.respawn_points.is_empty() {
            Vec2::new(self.ground.x, self.ground.top() + self.ground.h)
        } else {
            self.respawn_points[slot % self.respawn_points.len()]
        }
    }

    /// Ledge by id.
    #[must_use]
    pub fn ledge(&self, id: LedgeId) -> Option<&Ledge> {
        self.ledges.get(id.0)
    }
}

impl StageQuery for StageLayout {
    fn ground(&self) -> Rect {
        self.ground
    }

    fn platforms(&self) -> &[Rect] {
        &self.platforms
    }

    fn kill_box(&self) -> Rect {
        self.kill_box
    }

    fn nearest_free_ledge(&self, pos: Vec2) -> Option<(LedgeId, Ledge)> {
        self.ledges
            .iter()
            .enumerate()
            .filter(|(_, ledge)| !ledge.occupied)
            .min_by(|(_, a), (_, b)| a.pos.distance(pos).total_cmp(&b.pos.distance(pos)))
            .map(|(index, ledge)| (LedgeId(index), *ledge))
    }

    fn set_ledge_occupied(&mut self, id: LedgeId, occupied: bool) {
        if let Some(ledge) = self.ledges.get_mut(id.0) {
            ledge.occupied = occupied;
        }
    }
}

fn corner_ledges(ground: Rect) -> Vec<Ledge> {
    vec![
        Ledge {
            pos: Vec2::new(ground.left(), ground.top()),
            dir: -1.0,
            occupied: false,
        },
        Ledge {
            pos: Vec2::new(ground.right(), ground.top()),
            dir: 1.0,
            occupied: false,
        },
    ]
}
