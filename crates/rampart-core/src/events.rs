//! Outbound combat events.
//!
//! Systems record what happened during a tick into the [`EventLog`]; the host
//! drains it after each step to drive visuals, audio and UI. Events never
//! feed back into the simulation.
//!
//! # Usage
//!
//! ```
//! use rampart_core::events::{CombatEvent, EventLog};
//!
//! let mut log = EventLog::new();
//! log.record(3, 0.3, CombatEvent::WaveStarted { wave: 1, enemies_to_spawn: 4 });
//!
//! let events = log.take_events();
//! assert_eq!(events.len(), 1);
//! assert!(log.is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::entity::{EnemyKind, EntityId};

/// Something the host may want to react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// A wave began spawning.
    WaveStarted {
        /// Wave number.
        wave: u32,
        /// Enemies it will spawn.
        enemies_to_spawn: u32,
    },
    /// An enemy was created.
    EnemySpawned {
        /// New enemy.
        enemy: EntityId,
        /// Its kind.
        kind: EnemyKind,
    },
    /// Every enemy of the wave was eliminated.
    WaveCompleted {
        /// Wave number.
        wave: u32,
        /// Score bonus awarded.
        bonus: u64,
    },
    /// An enemy hit the player.
    PlayerDamaged {
        /// Attacking enemy.
        attacker: EntityId,
        /// Damage applied.
        amount: f32,
        /// Player health afterward.
        health: f32,
    },
    /// The player's health reached zero.
    GameOver {
        /// Final score.
        score: u64,
        /// Wave reached.
        wave: u32,
        /// Total kills.
        kills: u32,
    },
    /// A weapon selected a different target (or none).
    TargetChanged {
        /// Weapon.
        weapon: EntityId,
        /// New target.
        target: Option<EntityId>,
    },
    /// Lock-on completed. Emitted at most once per `lock_cue_cooldown` per target.
    LockAcquired {
        /// Weapon.
        weapon: EntityId,
        /// Locked target.
        target: EntityId,
    },
    /// A projectile was launched.
    ProjectileFired {
        /// Firing weapon.
        weapon: EntityId,
        /// New projectile.
        projectile: EntityId,
        /// Whether it is guided.
        guided: bool,
    },
    /// A projectile reached the end of its lifetime.
    ProjectileExpired {
        /// Projectile.
        projectile: EntityId,
    },
    /// An enemy took damage.
    EnemyHit {
        /// Enemy.
        enemy: EntityId,
        /// Damage applied.
        amount: f32,
        /// Health afterward.
        health: f32,
    },
    /// An enemy died. Fired exactly once per enemy; hook for death effects.
    EnemyKilled {
        /// Enemy.
        enemy: EntityId,
        /// Its kind.
        kind: EnemyKind,
        /// Score awarded.
        score: u64,
    },
    /// A reload began.
    ReloadStarted {
        /// Weapon.
        weapon: EntityId,
    },
    /// A reload finished and the magazine is full.
    ReloadFinished {
        /// Weapon.
        weapon: EntityId,
    },
    /// A bomb went off.
    BombDetonated {
        /// Weapon that spent the charge.
        weapon: EntityId,
        /// Enemies caught in the blast.
        hits: usize,
    },
    /// A bomb charge was granted.
    BombAwarded {
        /// Weapon receiving the charge.
        weapon: EntityId,
        /// Charges afterward.
        bomb_count: u32,
    },
    /// An entity was removed from the store; the host should detach it.
    EntityRemoved {
        /// Removed entity.
        entity: EntityId,
    },
}

/// A [`CombatEvent`] stamped with when it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    /// Tick the event was recorded on.
    pub tick: u64,
    /// Simulation time the event was recorded at.
    pub time: f64,
    /// The event.
    pub event: CombatEvent,
}

/// Append-only log drained by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<TimedEvent>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn record(&mut self, tick: u64, time: f64, event: CombatEvent) {
        self.events.push(TimedEvent { tick, time, event });
    }

    /// Drains and returns all recorded events in recording order.
    pub fn take_events(&mut self) -> Vec<TimedEvent> {
        std::mem::take(&mut self.events)
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
