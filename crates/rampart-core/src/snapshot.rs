//! Read-only views for the host and UI layer.
//!
//! Snapshots are plain serializable copies. Holding one never borrows the
//! simulation.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::entity::{EnemyKind, Entity, EntityId, PlayerState, StatusFlags, WeaponState};
use crate::state::GameState;

/// `{score, wave, kills, playing, game_over}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Total score.
    pub score: u64,
    /// Current wave.
    pub wave: u32,
    /// Enemies killed.
    pub kills: u32,
    /// Whether a run is in progress.
    pub playing: bool,
    /// Whether the player has died.
    pub game_over: bool,
}

impl From<&GameState> for GameSnapshot {
    fn from(game: &GameState) -> Self {
        Self {
            score: game.score,
            wave: game.wave,
            kills: game.kills,
            playing: game.playing,
            game_over: game.game_over,
        }
    }
}

/// `{ammo, max_ammo, reloading, bomb_count}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponSnapshot {
    /// Rounds in the magazine.
    pub ammo: u32,
    /// Magazine size.
    pub max_ammo: u32,
    /// Whether a reload is pending.
    pub reloading: bool,
    /// Bomb charges.
    pub bomb_count: u32,
}

impl From<&WeaponState> for WeaponSnapshot {
    fn from(weapon: &WeaponState) -> Self {
        Self {
            ammo: weapon.ammo(),
            max_ammo: weapon.max_ammo,
            reloading: weapon.reloading,
            bomb_count: weapon.bomb_count,
        }
    }
}

/// `{health, max_health}` plus the one-tick damage flash.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Current health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Hit this tick.
    pub damage_flash: bool,
}

impl From<&PlayerState> for PlayerSnapshot {
    fn from(player: &PlayerState) -> Self {
        Self {
            health: player.health(),
            max_health: player.max_health,
            damage_flash: player.damage_flash,
        }
    }
}

/// Per-weapon lock-on view: `{locked, lock_progress, target_position}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LockSnapshot {
    /// Current target, if any.
    pub target: Option<EntityId>,
    /// Whether the lock is complete.
    pub locked: bool,
    /// Lock progress in `[0, 1]`.
    pub lock_progress: f32,
    /// World position of a living target.
    pub target_position: Option<Vec3>,
}

impl LockSnapshot {
    /// Builds the lock view for `weapon`. `None` if it has no targeting.
    #[must_use]
    pub fn for_weapon(arena: &Arena, weapon: EntityId) -> Option<Self> {
        let lock = &arena.get(weapon)?.as_weapon()?.targeting.as_ref()?.lock;
        let target_position = lock
            .target
            .and_then(|t| arena.get(t))
            .filter(|e| e.is_living_enemy())
            .map(|e| e.transform().position);
        Some(Self {
            target: lock.target,
            locked: lock.locked,
            lock_progress: lock.progress,
            target_position,
        })
    }
}

/// Per-enemy combat view for visualization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    /// Enemy id.
    pub id: EntityId,
    /// Kind.
    pub kind: EnemyKind,
    /// Current health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Whether it is alive.
    pub alive: bool,
    /// Took damage this tick.
    pub damaged: bool,
    /// World position.
    pub position: Vec3,
    /// World orientation.
    pub orientation: Quat,
}

impl EnemySnapshot {
    /// Builds the view for `entity`. `None` if it is not an enemy.
    #[must_use]
    pub fn from_entity(entity: &Entity) -> Option<Self> {
        let enemy = entity.as_enemy()?;
        Some(Self {
            id: entity.id(),
            kind: enemy.kind,
            health: enemy.health(),
            max_health: enemy.max_health,
            alive: enemy.is_alive(),
            damaged: enemy.status.contains(StatusFlags::DAMAGED),
            position: entity.transform().position,
            orientation: entity.transform().orientation,
        })
    }
}
