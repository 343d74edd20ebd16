//! Error types.
//!
//! Three families:
//! - [`SystemError`]: a system could not run this tick. Always non-fatal; the
//!   simulation logs it and moves on to the next system.
//! - [`CombatError`]: a host command (fire, reload, bomb) was rejected.
//! - [`ConfigError`]: configuration failed to parse or validate.

use thiserror::Error;

use crate::entity::{EntityId, EntityTag};

/// A system skipped its work for one tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SystemError {
    /// No player record has been registered.
    #[error("player record missing")]
    MissingPlayer,
    /// No wave state exists yet.
    #[error("wave state missing")]
    MissingWaveState,
}

/// A host command could not be carried out.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CombatError {
    /// The id does not refer to a live entity.
    #[error("entity not found: {0:?}")]
    UnknownEntity(EntityId),
    /// The id refers to an entity of the wrong kind.
    #[error("entity {id:?} is a {actual}, not a weapon")]
    NotAWeapon {
        /// Entity that was addressed.
        id: EntityId,
        /// Its actual kind.
        actual: EntityTag,
    },
    /// The fire-rate gate is still closed.
    #[error("weapon on cooldown: {remaining}s remaining")]
    OnCooldown {
        /// Seconds until the weapon may fire again.
        remaining: f32,
    },
    /// A reload is already in progress.
    #[error("weapon is reloading")]
    Reloading,
    /// No bomb charges left.
    #[error("no bomb charges left")]
    NoBombs,
    /// The game is not running (not started, or over).
    #[error("simulation is not running")]
    NotRunning,
    /// The action needs the player record.
    #[error(transparent)]
    System(#[from] SystemError),
}

/// Result type for host commands.
pub type CombatResult<T> = Result<T, CombatError>;

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document was malformed.
    #[error("failed to parse combat config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is out of its valid domain.
    #[error("invalid combat config: {field} {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}
