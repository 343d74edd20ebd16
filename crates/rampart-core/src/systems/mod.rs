//! Combat systems run once per simulation step.
//!
//! Systems are the write phase of a step. Each one reads and mutates the
//! shared [`World`] and never calls another system directly; all coordination
//! happens through entity state, the timeline and the pending-removal queue.
//!
//! # Execution Order
//!
//! The simulation runs them strictly in this order:
//!
//! 1. [`WaveDirector`]: spawn decisions and the wave state machine
//! 2. [`EnemyController`]: enemy movement, attacks, player regeneration
//! 3. [`TargetingEngine`]: target selection, lock progression, aim assist
//! 4. [`ProjectileEngine`]: projectile motion, collision, damage
//!
//! # Invariants
//!
//! - Systems MUST NOT despawn entities; they call
//!   [`Arena::mark_for_removal`](crate::arena::Arena::mark_for_removal)
//! - Systems MUST iterate entities in id order
//! - A missing singleton is reported as [`SystemError`] and never panics

mod enemy;
mod projectile;
mod targeting;
mod wave;

pub use enemy::EnemyController;
pub use projectile::ProjectileEngine;
pub use targeting::{aim_direction, score_candidate, TargetingEngine};
pub use wave::{build_enemy, difficulty_for, spawn_interval, WaveDirector};

use crate::config::CombatConfig;
use crate::error::SystemError;
use crate::world::{Clock, World};

/// A per-step combat system.
///
/// # Implementation Guidelines
///
/// 1. **Determinism**: Given the same world and clock, a system must produce
///    identical results. Use id-ordered iteration and the world's seeded RNG.
///
/// 2. **Recoverable failures**: Return [`SystemError`] when a required
///    singleton is absent. The simulation logs it and runs the next system.
///
/// 3. **Stale references**: An id that no longer resolves to a live entity is
///    "no target", not an error.
///
/// # Example
///
/// ```
/// use rampart_core::config::CombatConfig;
/// use rampart_core::error::SystemError;
/// use rampart_core::systems::CombatSystem;
/// use rampart_core::world::{Clock, World};
///
/// struct ScoreTicker;
///
/// impl CombatSystem for ScoreTicker {
///     fn name(&self) -> &'static str {
///         "score_ticker"
///     }
///
///     fn run(
///         &self,
///         world: &mut World,
///         _config: &CombatConfig,
///         _clock: Clock,
///     ) -> Result<(), SystemError> {
///         world.game.score += 1;
///         Ok(())
///     }
/// }
///
/// let mut world = World::new(0);
/// ScoreTicker.run(&mut world, &CombatConfig::default(), Clock::new(0.0, 0.1)).unwrap();
/// assert_eq!(world.game.score, 1);
/// ```
pub trait CombatSystem: Send + Sync {
    /// Name used for tracing spans and log fields.
    fn name(&self) -> &'static str;

    /// Runs one step of this system.
    ///
    /// # Errors
    ///
    /// [`SystemError`] if a required singleton is missing. The step continues
    /// with the next system.
    fn run(&self, world: &mut World, config: &CombatConfig, clock: Clock)
        -> Result<(), SystemError>;
}

/// The four combat systems in execution order.
#[must_use]
pub fn default_systems() -> Vec<Box<dyn CombatSystem>> {
    vec![
        Box::new(WaveDirector::new()),
        Box::new(EnemyController::new()),
        Box::new(TargetingEngine::new()),
        Box::new(ProjectileEngine::new()),
    ]
}
