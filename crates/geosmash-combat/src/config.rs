//! Per-fighter configuration.
//!
//! Everything a fighter reads while simulating is resolved here, once, from
//! the parameter table. A [`FighterConfig`] bundles:
//! - movement tunables (`<fighter>.walkSpeed`, `<fighter>.airAccel`, ...)
//! - shield, dodge, ledge and grab blocks (`<fighter>.shield.*`, ...)
//! - throw and counter blocks
//! - the special-move tunables of the fighter type
//! - the global `input.*` thresholds and `fighter.*` rules
//! - the attack catalog, one prototype per [`MoveId`]
//!
//! A missing key fails [`FighterConfig::load`]; nothing is looked up by name
//! once a match is running.

use ahash::AHashMap;
use geosmash_common::{Ownership, ParamResult, ParamScope, ParamTable, Rect};
use glam::Vec2;
use tracing::info;

use crate::attack::{unit_direction, SimpleAttack};
use crate::controller::InputThresholds;
use crate::error::{CombatError, CombatResult};
use crate::fighter_attack::FighterAttack;
use crate::moves::{FighterKind, MoveId};

/// Ground and air movement tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movement {
    /// Walking speed at full stick
    pub walk_speed: f32,
    /// Running speed
    pub dash_speed: f32,
    /// Delay between a dash flick and running
    pub dash_startup_time: f32,
    /// Lockout after turning around or stopping a run
    pub dash_change_time: f32,
    /// Minimum run length before the run can be dropped
    pub min_dash_time: f32,
    /// Jump squat length
    pub jump_startup_time: f32,
    /// Full jump vertical speed
    pub jump_speed: f32,
    /// Short hop vertical speed
    pub hop_speed: f32,
    /// Air jump vertical speed
    pub second_jump_speed: f32,
    /// Horizontal air speed that drift cannot exceed
    pub jump_air_speed: f32,
    /// Drift acceleration
    pub air_force: f32,
    /// Gravity
    pub air_accel: f32,
    /// Drift acceleration while stunned
    pub air_di: f32,
    /// Air jumps before landing
    pub max_air_jumps: u32,
    /// Fast fall terminal velocity
    pub fast_fall_max_speed: f32,
    /// Fall speed above which the initial fast fall kick applies
    pub fast_fall_max_initial_speed: f32,
    /// Initial fast fall kick
    pub fast_fall_initial_speed: f32,
    /// Extra gravity while fast falling
    pub fast_fall_accel: f32,
    /// Lag after landing from the air
    pub landing_cooldown_time: f32,
    /// Multiplier applied to received knockback
    pub kb_scaling: f32,
}

impl Movement {
    fn load(scope: &ParamScope<'_>) -> ParamResult<Self> {
        Ok(Self {
            walk_speed: scope.param("walkSpeed")?,
            dash_speed: scope.param("dashSpeed")?,
            dash_startup_time: scope.param("dashStartupTime")?,
            dash_change_time: scope.param("dashChangeTime")?,
            min_dash_time: scope.param("minDashTime")?,
            jump_startup_time: scope.param("jumpStartupTime")?,
            jump_speed: scope.param("jumpSpeed")?,
            hop_speed: scope.param("hopSpeed")?,
            second_jump_speed: scope.param("secondJumpSpeed")?,
            jump_air_speed: scope.param("jumpAirSpeed")?,
            air_force: scope.param("airForce")?,
            air_accel: scope.param("airAccel")?,
            air_di: scope.param("airDI")?,
            max_air_jumps: scope.param("maxAirJumps")?.max(0.0) as u32,
            fast_fall_max_speed: scope.param("fastFallMaxSpeed")?,
            fast_fall_max_initial_speed: scope.param("fastFallMaxInitialSpeed")?,
            fast_fall_initial_speed: scope.param("fastFallInitialSpeed")?,
            fast_fall_accel: scope.param("fastFallAccel")?,
            landing_cooldown_time: scope.param("landingCooldownTime")?,
            kb_scaling: scope.param("kbscaling")?,
        })
    }
}

/// `shield.*`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShieldParams {
    /// Full shield health
    pub max_health: f32,
    /// Regeneration per second, applied every frame including while blocking
    pub regen: f32,
    /// Change per second while blocking (negative)
    pub degen: f32,
    /// Shield raise time
    pub startup: f32,
    /// Lag after lowering the shield
    pub cooldown: f32,
    /// Daze after the shield breaks
    pub daze_time: f32,
    /// Block stun relative to hit stun
    pub stun_factor: f32,
}

impl ShieldParams {
    fn load(scope: &ParamScope<'_>) -> ParamResult<Self> {
        Ok(Self {
            max_health: scope.positive("maxHealth")?,
            regen: scope.param("regen")?,
            degen: scope.param("degen")?,
            startup: scope.param("startup")?,
            cooldown: scope.param("cooldown")?,
            daze_time: scope.param("dazeTime")?,
            stun_factor: scope.param("stunFactor")?,
        })
    }
}

/// `stepdodge.*`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDodgeParams {
    /// Invincible window
    pub invinc_time: f32,
    /// Lag after the window
    pub cooldown: f32,
}

/// `dodge.*`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DodgeParams {
    /// Roll length
    pub duration: f32,
    /// Lag after the roll
    pub cooldown: f32,
    /// Invincible window from the start of the roll
    pub invinc_time: f32,
    /// Roll speed
    pub speed: f32,
}

/// `ledgeGrab.*`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgeGrabParams {
    /// Maximum distance to a grabbable ledge
    pub dist: f32,
    /// Hurtbox while hanging
    pub hb_size: Vec2,
    /// Invincibility on grab
    pub grab_invinc_time: f32,
    /// Time before ledge options are accepted
    pub input_delay: f32,
    /// Invincibility during the ledge attack
    pub attack_invinc: f32,
    /// Time after a drop before the ledge can be grabbed again
    pub drop_time: f32,
    /// Lag after standing up
    pub wakeup_time: f32,
    /// Invincibility while standing up
    pub wake_up_invinc: f32,
}

impl LedgeGrabParams {
    fn load(scope: &ParamScope<'_>) -> ParamResult<Self> {
        Ok(Self {
            dist: scope.positive("dist")?,
            hb_size: scope.vec2("hbwidth", "hbheight")?,
            grab_invinc_time: scope.param("grabInvincTime")?,
            input_delay: scope.param("inputDelay")?,
            attack_invinc: scope.param("attackInvinc")?,
            drop_time: scope.param("dropTime")?,
            wakeup_time: scope.param("wakeupTime")?,
            wake_up_invinc: scope.param("wakeUpInvinc")?,
        })
    }
}

/// `grabState.*`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrabParams {
    /// How long a victim can be held
    pub hold_time: f32,
    /// Lag after letting go
    pub release_cooldown: f32,
    /// Velocity damping while grabbing
    pub speed_damping: f32,
}

/// One throw (`frontThrow.*`, `backThrow.*`, `upThrow.*`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowSpec {
    /// Unit knockback direction, facing right
    pub kb_dir: Vec2,
    /// Knockback at zero damage
    pub kb_base: f32,
    /// Knockback added per point of damage
    pub kb_scaling: f32,
    /// Damage dealt
    pub damage: f32,
    /// Base stun
    pub stun: f32,
}

impl ThrowSpec {
    fn load(scope: &ParamScope<'_>) -> ParamResult<Self> {
        Ok(Self {
            kb_dir: unit_direction(scope, "knockbackx", "knockbacky")?,
            kb_base: scope.param("kbbase")?,
            kb_scaling: scope.param("kbscaling")?,
            damage: scope.param("damage")?,
            stun: scope.param("stun")?,
        })
    }

    /// Builds the throw as thrown by a grabber facing `dir`.
    #[must_use]
    pub fn attack(&self, dir: f32, at: Rect, owner: Ownership) -> SimpleAttack {
        SimpleAttack::new(
            self.kb_dir * Vec2::new(dir, 1.0),
            self.kb_base,
            self.kb_scaling,
            self.damage,
            self.stun,
        )
        .with_priority(0.0)
        .with_hitbox(at)
        .with_origin(-dir)
        .with_owner(owner)
    }
}

/// The three throws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowParams {
    /// Throw toward the facing
    pub front: ThrowSpec,
    /// Throw away from the facing
    pub back: ThrowSpec,
    /// Throw upward
    pub up: ThrowSpec,
}

/// `counterSpecial.*` plus the counter attack's knockback scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterParams {
    /// Time before the counter window opens
    pub startup: f32,
    /// Counter window
    pub duration: f32,
    /// Lag after the window
    pub cooldown: f32,
    /// Counter knockback per point of incoming damage
    pub kb_scaling: f32,
}

impl CounterParams {
    /// End of the counter window.
    #[must_use]
    pub fn window_end(&self) -> f32 {
        self.startup + self.duration
    }

    /// Total length of the counter stance.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.startup + self.duration + self.cooldown
    }
}

/// Tunables of the fighter type's special states.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpecialParams {
    /// charlie
    Charlie {
        /// Up special velocity while the hitbox is out, facing right
        launch: Vec2,
        /// Side special speed while the hitbox is out
        dash_xvel: f32,
        /// Side special airborne speed after the hitbox closes
        dash_end_xvel: f32,
    },
    /// stickman
    Stickman {
        /// Teleport distance
        teleport_dist: f32,
        /// Speed kept after a teleport
        teleport_momentum: f32,
        /// Hop speed after the neutral special
        hop_speed: f32,
    },
}

impl SpecialParams {
    fn load(kind: FighterKind, scope: &ParamScope<'_>) -> ParamResult<Self> {
        Ok(match kind {
            FighterKind::Charlie => {
                let dash = scope.scoped("dashSpecialState");
                Self::Charlie {
                    launch: scope.scoped("upSpecialAttack").vec2("xvel", "yvel")?,
                    dash_xvel: dash.param("xvel")?,
                    dash_end_xvel: dash.param("endxvel")?,
                }
            }
            FighterKind::Stickman => {
                let up = scope.scoped("upSpecialAttack");
                Self::Stickman {
                    teleport_dist: up.param("dist")?,
                    teleport_momentum: up.param("momentum")?,
                    hop_speed: scope.scoped("neutralSpecialAttack").param("speed")?,
                }
            }
        })
    }
}

/// Global fighter rules (`fighter.*`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FighterRules {
    /// Respawn platform time before stick input releases the fighter
    pub min_respawn_time: f32,
    /// Respawn platform time before the fighter drops automatically
    pub max_respawn_time: f32,
    /// Downward speed needed to ground bounce
    pub gb_thresh: f32,
    /// Velocity kept on a ground bounce
    pub gb_vel_damping: f32,
    /// Stun time kept on a ground bounce
    pub gb_stun_damping: f32,
}

impl FighterRules {
    /// Reads the `fighter.*` section.
    pub fn load(table: &ParamTable) -> ParamResult<Self> {
        let scope = table.scoped("fighter");
        Ok(Self {
            min_respawn_time: scope.param("minRespawnTime")?,
            max_respawn_time: scope.param("maxRespawnTime")?,
            gb_thresh: scope.param("gbThresh")?,
            gb_vel_damping: scope.param("gbVelDamping")?,
            gb_stun_damping: scope.param("gbStunDamping")?,
        })
    }
}

/// Fully resolved configuration of one fighter type.
#[derive(Debug, Clone)]
pub struct FighterConfig {
    /// Fighter type
    pub kind: FighterKind,
    /// Nominal hurtbox size (`w`, `h`)
    pub size: Vec2,
    /// Movement tunables
    pub movement: Movement,
    /// Shield
    pub shield: ShieldParams,
    /// Step dodge
    pub step_dodge: StepDodgeParams,
    /// Roll
    pub dodge: DodgeParams,
    /// Ledge hanging
    pub ledge_grab: LedgeGrabParams,
    /// Holding a grabbed fighter
    pub grab: GrabParams,
    /// Throws
    pub throws: ThrowParams,
    /// Counter stance
    pub counter: CounterParams,
    /// Special-move tunables
    pub special: SpecialParams,
    /// Stick thresholds
    pub input: InputThresholds,
    /// Respawn and ground bounce rules
    pub rules: FighterRules,
    attacks: AHashMap<MoveId, FighterAttack>,
}

impl FighterConfig {
    /// Resolves the configuration of `kind` from `table`.
    pub fn load(table: &ParamTable, kind: FighterKind) -> CombatResult<Self> {
        let scope = table.scoped(kind.prefix());

        let mut attacks = AHashMap::with_capacity(MoveId::ALL.len());
        for id in MoveId::ALL {
            attacks.insert(id, FighterAttack::load(kind, id, &scope)?);
        }

        let step = scope.scoped("stepdodge");
        let dodge = scope.scoped("dodge");
        let grab = scope.scoped("grabState");
        let counter = scope.scoped("counterSpecial");

        let config = Self {
            kind,
            size: Vec2::new(scope.positive("w")?, scope.positive("h")?),
            movement: Movement::load(&scope)?,
            shield: ShieldParams::load(&scope.scoped("shield"))?,
            step_dodge: StepDodgeParams {
                invinc_time: step.param("invincTime")?,
                cooldown: step.param("cooldown")?,
            },
            dodge: DodgeParams {
                duration: dodge.positive("duration")?,
                cooldown: dodge.param("cooldown")?,
                invinc_time: dodge.param("invincTime")?,
                speed: dodge.param("speed")?,
            },
            ledge_grab: LedgeGrabParams::load(&scope.scoped("ledgeGrab"))?,
            grab: GrabParams {
                hold_time: grab.param("holdTime")?,
                release_cooldown: grab.param("releaseCooldown")?,
                speed_damping: grab.param("speedDamping")?,
            },
            throws: ThrowParams {
                front: ThrowSpec::load(&scope.scoped("frontThrow"))?,
                back: ThrowSpec::load(&scope.scoped("backThrow"))?,
                up: ThrowSpec::load(&scope.scoped("upThrow"))?,
            },
            counter: CounterParams {
                startup: counter.param("startup")?,
                duration: counter.param("duration")?,
                cooldown: counter.param("cooldown")?,
                kb_scaling: scope.scoped("counterAttack").param("kbscaling")?,
            },
            special: SpecialParams::load(kind, &scope)?,
            input: InputThresholds::load(table)?,
            rules: FighterRules::load(table)?,
            attacks,
        };

        info!("Loaded {} with {} attacks", kind, config.attacks.len());
        Ok(config)
    }

    /// Catalog prototype of a move.
    pub fn attack(&self, id: MoveId) -> CombatResult<&FighterAttack> {
        self.attacks.get(&id).ok_or_else(|| CombatError::UnknownAttack {
            name: id.key().to_string(),
        })
    }

    /// Fresh copy of a move, ready to start.
    pub fn instantiate(&self, id: MoveId) -> CombatResult<FighterAttack> {
        self.attack(id).cloned()
    }
}
