//! # Rampart Core
//!
//! Deterministic combat core for Rampart, an arcade wave-defense shooter.
//!
//! The host runtime owns rendering, input and physics. This crate owns the
//! combat rules: enemy waves, enemy behavior, weapon lock-on and aim assist,
//! projectile flight and damage, and score.
//!
//! ## Architecture
//!
//! - **Entities**: weapons, enemies and projectiles in an id-ordered [`Arena`]
//! - **Systems**: wave director, enemy controller, targeting engine and
//!   projectile engine, run in that order every step
//! - **Timeline**: delayed actions (reload completion, next wave) driven by
//!   simulation time
//! - **Events**: everything the host should react to, drained once per frame
//!
//! ## Usage
//!
//! ```
//! use glam::Vec3;
//! use rampart_core::{CombatConfig, EnemyKind, Simulation, TargetingProfile, Transform};
//!
//! let mut sim = Simulation::new(CombatConfig::default(), 7);
//! sim.spawn_player(Transform::default());
//! let weapon = sim.spawn_weapon(Transform::default(), Some(TargetingProfile::default()));
//! sim.start();
//!
//! let enemy = sim.spawn_enemy(EnemyKind::Drone, Transform::at(Vec3::new(0.0, 0.0, -15.0)));
//! sim.step(1.0 / 60.0);
//!
//! let lock = sim.lock_snapshot(weapon).unwrap();
//! assert_eq!(lock.target, Some(enemy));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod config;
pub mod damage;
pub mod entity;
pub mod error;
pub mod events;
pub mod simulation;
pub mod snapshot;
pub mod state;
pub mod systems;
pub mod timeline;
pub mod weapon;
pub mod world;

#[cfg(test)]
mod tests;

pub use arena::Arena;
pub use config::CombatConfig;
pub use entity::{EnemyKind, EntityId, TargetingProfile, Transform, TypeFilter};
pub use error::{CombatError, CombatResult, ConfigError, SystemError};
pub use events::{CombatEvent, TimedEvent};
pub use simulation::Simulation;
pub use snapshot::{EnemySnapshot, GameSnapshot, LockSnapshot, PlayerSnapshot, WeaponSnapshot};
pub use weapon::FireOutcome;
