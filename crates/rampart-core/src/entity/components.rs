//! Typed component records for each entity kind.
//!
//! Every entity carries a [`Transform`] plus exactly one of the state records
//! below. The records replace attribute bags: every field is explicit and
//! there are no "default if missing" lookups.
//!
//! Coordinate convention: right-handed, +Y up, forward is `-Z` in local space.

use std::collections::BTreeMap;
use std::fmt;

use bitflags::bitflags;
use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::EntityId;
use crate::config::{PlayerConfig, WeaponConfig};

/// Local-space forward axis.
pub const FORWARD: Vec3 = Vec3::NEG_Z;

/// Returns a rotation whose forward axis points along `direction` with no roll.
///
/// Falls back to the shortest-arc rotation when `direction` is (nearly)
/// vertical, and to identity when it is zero.
#[must_use]
pub fn look_rotation(direction: Vec3) -> Quat {
    let Some(dir) = direction.try_normalize() else {
        return Quat::IDENTITY;
    };
    if dir.cross(Vec3::Y).length_squared() < 1e-6 {
        return Quat::from_rotation_arc(FORWARD, dir);
    }
    let back = -dir;
    let right = Vec3::Y.cross(back).normalize();
    let up = back.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, back)).normalize()
}

// =============================================================================
// Transform
// =============================================================================

/// World-space pose of an entity.
///
/// The host runtime is authoritative for transforms; the core writes back the
/// poses it simulates (enemy movement, projectile flight, aim assist) and the
/// host may overwrite them through `Simulation::sync_transform`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// World position.
    pub position: Vec3,
    /// World orientation.
    pub orientation: Quat,
}

impl Transform {
    /// Creates a transform at `position` with identity orientation.
    #[must_use]
    pub const fn at(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
        }
    }

    /// Creates a transform at `position` facing `target`.
    #[must_use]
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            orientation: look_rotation(target - position),
        }
    }

    /// Unit forward vector in world space.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.orientation * FORWARD).normalize_or_zero()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

// =============================================================================
// Status Flags
// =============================================================================

bitflags! {
    /// Per-enemy status bits consumed by the host for visualization.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct StatusFlags: u8 {
        /// Took damage this tick. Cleared at the start of the next step.
        const DAMAGED = 1 << 0;
        /// Health reached zero. Never cleared.
        const DEAD = 1 << 1;
    }
}

// =============================================================================
// Enemy
// =============================================================================

/// Enemy type classification.
///
/// The kind feeds target-priority weighting, lock-on difficulty, and the stat
/// multipliers applied on top of the wave's difficulty snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Fast, fragile and hard to lock.
    Drone,
    /// Baseline infantry.
    Soldier,
    /// Slow and heavy. Easy to lock, high priority.
    Brute,
}

impl EnemyKind {
    /// All kinds in spawn-table order.
    pub const ALL: [Self; 3] = [Self::Drone, Self::Soldier, Self::Brute];

    /// Target-priority score in `[0, 1]`.
    #[must_use]
    pub const fn priority(self) -> f32 {
        match self {
            Self::Drone => 0.4,
            Self::Soldier => 0.6,
            Self::Brute => 0.9,
        }
    }

    /// Lock-on difficulty in `[0, 1]`. Higher slows lock progression.
    #[must_use]
    pub const fn lock_difficulty(self) -> f32 {
        match self {
            Self::Drone => 0.6,
            Self::Soldier => 0.25,
            Self::Brute => 0.1,
        }
    }

    /// Multiplier on the wave's enemy health.
    #[must_use]
    pub const fn health_scale(self) -> f32 {
        match self {
            Self::Drone => 0.6,
            Self::Soldier => 1.0,
            Self::Brute => 2.5,
        }
    }

    /// Multiplier on the wave's enemy damage.
    #[must_use]
    pub const fn damage_scale(self) -> f32 {
        match self {
            Self::Drone => 0.5,
            Self::Soldier => 1.0,
            Self::Brute => 2.0,
        }
    }

    /// Multiplier on the wave's enemy speed.
    #[must_use]
    pub const fn speed_scale(self) -> f32 {
        match self {
            Self::Drone => 1.8,
            Self::Soldier => 1.0,
            Self::Brute => 0.6,
        }
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drone => write!(f, "Drone"),
            Self::Soldier => write!(f, "Soldier"),
            Self::Brute => write!(f, "Brute"),
        }
    }
}

/// Result of applying damage to an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Health dropped but the enemy survived.
    Hit,
    /// This hit took the enemy to zero health.
    Killed,
    /// The enemy was already dead; nothing changed.
    Ignored,
}

/// Combat state of a single enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyState {
    /// Type classification.
    pub kind: EnemyKind,
    /// Movement speed (units/s).
    pub speed: f32,
    /// Current health, always in `[0, max_health]`.
    health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Damage dealt per attack.
    pub attack_damage: f32,
    /// Maximum distance to the player for an attack.
    pub attack_range: f32,
    /// Minimum seconds between attacks.
    pub attack_cooldown: f32,
    /// Simulation time of the last attack.
    pub last_attack_time: Option<f64>,
    /// Cleared permanently when health reaches zero.
    alive: bool,
    /// Target-priority score used by targeting.
    pub priority: f32,
    /// Lock-on difficulty used by targeting.
    pub lock_difficulty: f32,
    /// Turn rate toward the player (1/s, slerp factor).
    pub turn_rate: f32,
    /// Transient and permanent status bits.
    pub status: StatusFlags,
}

impl EnemyState {
    /// Creates a living enemy of `kind` at full health.
    #[must_use]
    pub fn new(kind: EnemyKind, max_health: f32, attack_damage: f32, speed: f32) -> Self {
        let max_health = max_health.max(1.0);
        Self {
            kind,
            speed: speed.max(0.0),
            health: max_health,
            max_health,
            attack_damage: attack_damage.max(0.0),
            attack_range: 2.5,
            attack_cooldown: 1.5,
            last_attack_time: None,
            alive: true,
            priority: kind.priority(),
            lock_difficulty: kind.lock_difficulty(),
            turn_rate: 4.0,
            status: StatusFlags::empty(),
        }
    }

    /// Sets attack range and cooldown.
    #[must_use]
    pub fn with_attack(mut self, range: f32, cooldown: f32) -> Self {
        self.attack_range = range.max(0.0);
        self.attack_cooldown = cooldown.max(0.0);
        self
    }

    /// Sets current health, clamped to `[0, max_health]`.
    ///
    /// Setting zero health on a living enemy does not kill it; death only
    /// happens through [`EnemyState::apply_damage`].
    #[must_use]
    pub fn with_health(mut self, health: f32) -> Self {
        self.health = health.clamp(0.0, self.max_health);
        self
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Whether the enemy is alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// `health / max_health` in `[0, 1]`.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    /// Applies damage, clamping health at zero.
    ///
    /// Returns [`DamageOutcome::Killed`] exactly once, on the hit that takes the
    /// enemy to zero health. Damage to a dead enemy is ignored.
    pub fn apply_damage(&mut self, amount: f32) -> DamageOutcome {
        if !self.alive {
            return DamageOutcome::Ignored;
        }
        self.health = (self.health - amount.max(0.0)).max(0.0);
        self.status.insert(StatusFlags::DAMAGED);
        if self.health <= 0.0 {
            self.alive = false;
            self.status.insert(StatusFlags::DEAD);
            DamageOutcome::Killed
        } else {
            DamageOutcome::Hit
        }
    }

    /// Whether the attack cooldown has elapsed at `time`.
    #[must_use]
    pub fn attack_ready(&self, time: f64) -> bool {
        self.last_attack_time
            .map_or(true, |last| time - last >= f64::from(self.attack_cooldown))
    }
}

// =============================================================================
// Player
// =============================================================================

/// The single player record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// World pose, pushed by the host.
    pub transform: Transform,
    health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Simulation time of the last damage taken.
    pub last_damage_time: Option<f64>,
    /// Set on the tick the player is hit; cleared at the start of the next step.
    pub damage_flash: bool,
}

impl PlayerState {
    /// Creates a player at full health.
    #[must_use]
    pub fn new(transform: Transform, config: &PlayerConfig) -> Self {
        Self {
            transform,
            health: config.max_health,
            max_health: config.max_health,
            last_damage_time: None,
            damage_flash: false,
        }
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Whether health has reached zero.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Applies damage at `time`, clamping at zero.
    pub fn take_damage(&mut self, amount: f32, time: f64) {
        self.health = (self.health - amount.max(0.0)).max(0.0);
        self.last_damage_time = Some(time);
        self.damage_flash = true;
    }

    /// Heals by `amount`, clamping at `max_health`.
    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount.max(0.0)).min(self.max_health);
    }

    /// Restores full health and clears damage history.
    pub fn reset(&mut self) {
        self.health = self.max_health;
        self.last_damage_time = None;
        self.damage_flash = false;
    }
}

// =============================================================================
// Weapon
// =============================================================================

/// Which enemy kind a weapon prefers when scoring targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TypeFilter {
    /// No preference.
    #[default]
    Any,
    /// Prefer this kind.
    Only(EnemyKind),
}

/// Lock-on tuning for a weapon with targeting capability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetingProfile {
    /// Maximum distance for acquiring a new target (the lock radius).
    pub lock_distance: f32,
    /// Lock progression speed multiplier.
    pub lock_speed: f32,
    /// Preferred enemy kind.
    pub preferred: TypeFilter,
    /// Whether aim assist rotates the weapon toward its target.
    pub aim_assist: bool,
    /// Aim-assist strength multiplier.
    pub assist_strength: f32,
    /// Minimum `dot(forward, toEnemy)` for a candidate; enemies further
    /// off-axis are excluded.
    pub min_facing_dot: f32,
}

impl Default for TargetingProfile {
    fn default() -> Self {
        Self {
            lock_distance: 40.0,
            lock_speed: 1.0,
            preferred: TypeFilter::Any,
            aim_assist: true,
            assist_strength: 1.0,
            min_facing_dot: 0.0,
        }
    }
}

/// Lock-on state of one weapon. At most one target at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetLock {
    /// Currently selected target.
    pub target: Option<EntityId>,
    /// Lock progress in `[0, 1]`.
    pub progress: f32,
    /// Set once progress reaches 1 on the current target.
    pub locked: bool,
    /// Simulation time the current lock completed.
    pub locked_at: Option<f64>,
    /// Simulation time of the last target evaluation.
    pub last_evaluation: Option<f64>,
    /// Time of the last lock cue per target, pruned once the cooldown lapses.
    pub cued: BTreeMap<EntityId, f64>,
}

impl TargetLock {
    /// Switches to `target`, resetting progress and the locked flag.
    pub fn retarget(&mut self, target: EntityId) {
        self.target = Some(target);
        self.progress = 0.0;
        self.locked = false;
        self.locked_at = None;
    }

    /// Drops the target entirely.
    pub fn clear(&mut self) {
        self.target = None;
        self.progress = 0.0;
        self.locked = false;
        self.locked_at = None;
    }
}

/// Targeting capability attached to a weapon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Targeting {
    /// Tuning.
    pub profile: TargetingProfile,
    /// Live lock state.
    pub lock: TargetLock,
}

impl Targeting {
    /// Creates targeting with a fresh lock.
    #[must_use]
    pub fn new(profile: TargetingProfile) -> Self {
        Self {
            profile,
            lock: TargetLock::default(),
        }
    }
}

/// Weapon state: magazine, timing, bombs, and optional targeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponState {
    ammo: u32,
    /// Magazine size.
    pub max_ammo: u32,
    /// Damage carried by each projectile.
    pub damage: f32,
    /// Minimum seconds between shots.
    pub fire_rate: f32,
    /// Projectile speed (units/s).
    pub projectile_speed: f32,
    /// Projectile lifetime (s).
    pub projectile_lifetime: f32,
    /// Set while a reload is pending.
    pub reloading: bool,
    /// Seconds a reload takes.
    pub reload_duration: f32,
    /// Simulation time of the last shot.
    pub last_fire_time: Option<f64>,
    /// Bomb / special charges.
    pub bomb_count: u32,
    /// Lock-on capability, if any.
    pub targeting: Option<Targeting>,
}

impl WeaponState {
    /// Builds a full, idle weapon from configuration. No targeting.
    #[must_use]
    pub fn from_config(config: &WeaponConfig) -> Self {
        Self {
            ammo: config.max_ammo,
            max_ammo: config.max_ammo,
            damage: config.damage,
            fire_rate: config.fire_rate,
            projectile_speed: config.projectile_speed,
            projectile_lifetime: config.projectile_lifetime,
            reloading: false,
            reload_duration: config.reload_duration,
            last_fire_time: None,
            bomb_count: config.initial_bombs,
            targeting: None,
        }
    }

    /// Attaches targeting capability.
    #[must_use]
    pub fn with_targeting(mut self, profile: TargetingProfile) -> Self {
        self.targeting = Some(Targeting::new(profile));
        self
    }

    /// Sets the rounds in the magazine, clamped to `max_ammo`.
    #[must_use]
    pub fn with_ammo(mut self, ammo: u32) -> Self {
        self.ammo = ammo.min(self.max_ammo);
        self
    }

    /// Rounds in the magazine, always in `[0, max_ammo]`.
    #[must_use]
    pub const fn ammo(&self) -> u32 {
        self.ammo
    }

    /// Removes one round. Returns `false` if the magazine was empty.
    pub fn consume_round(&mut self) -> bool {
        if self.ammo == 0 {
            return false;
        }
        self.ammo -= 1;
        true
    }

    /// Fills the magazine.
    pub fn refill(&mut self) {
        self.ammo = self.max_ammo;
    }

    /// Whether the fire-rate gate is open at `time`.
    #[must_use]
    pub fn fire_ready(&self, time: f64) -> bool {
        self.last_fire_time
            .map_or(true, |last| time - last >= f64::from(self.fire_rate))
    }

    /// Seconds until the fire-rate gate opens, zero if already open.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn cooldown_remaining(&self, time: f64) -> f32 {
        self.last_fire_time.map_or(0.0, |last| {
            (f64::from(self.fire_rate) - (time - last)).max(0.0) as f32
        })
    }
}

// =============================================================================
// Projectile
// =============================================================================

/// In-flight projectile state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileState {
    /// Damage applied on hit.
    pub damage: f32,
    /// Speed (units/s).
    pub speed: f32,
    /// Unit direction of travel.
    pub direction: Vec3,
    /// Seconds before expiry.
    pub lifetime: f32,
    /// Seconds since launch.
    pub age: f32,
    /// Weapon that fired this projectile.
    pub owner: EntityId,
    /// Whether this is a guided (homing) projectile.
    pub guided: bool,
    /// Homing target; cleared when the target becomes invalid.
    pub homing_target: Option<EntityId>,
}

impl ProjectileState {
    /// Creates an unguided projectile.
    #[must_use]
    pub fn new(owner: EntityId, direction: Vec3, speed: f32, damage: f32, lifetime: f32) -> Self {
        Self {
            damage,
            speed,
            direction: direction.try_normalize().unwrap_or(FORWARD),
            lifetime,
            age: 0.0,
            owner,
            guided: false,
            homing_target: None,
        }
    }

    /// Makes this a guided projectile homing on `target`.
    #[must_use]
    pub fn homing(mut self, target: EntityId) -> Self {
        self.guided = true;
        self.homing_target = Some(target);
        self
    }

    /// Whether the projectile has outlived its lifetime.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.age >= self.lifetime
    }
}

// =============================================================================
// Tests
// =============================================================================
