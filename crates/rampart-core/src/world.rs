//! Shared tick context.
//!
//! [`World`] bundles everything the combat systems read and write during a
//! step: the entity store, the singleton player and wave records, game state,
//! scheduled actions, the outbound event log and the seeded RNG. Systems take
//! `&mut World` and borrow disjoint fields, so there is no runtime lookup of
//! sibling systems and no interior mutability.

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::arena::Arena;
use crate::entity::PlayerState;
use crate::error::SystemError;
use crate::events::{CombatEvent, EventLog};
use crate::state::{GameState, WaveState};
use crate::timeline::Timeline;

/// Simulation clock for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    /// Monotonic simulation time in seconds, after this step's advance.
    pub time: f64,
    /// Seconds covered by this step.
    pub dt: f32,
}

impl Clock {
    /// Creates a clock reading.
    #[must_use]
    pub const fn new(time: f64, dt: f32) -> Self {
        Self { time, dt }
    }
}

/// Mutable state shared by the combat systems.
#[derive(Debug, Clone)]
pub struct World {
    /// Weapons, enemies and projectiles.
    pub arena: Arena,
    /// The single player record, once registered.
    pub player: Option<PlayerState>,
    /// Current wave, once the first wave has started.
    pub wave: Option<WaveState>,
    /// Score and run flags.
    pub game: GameState,
    /// Pending scheduled actions.
    pub timeline: Timeline,
    /// Events recorded for the host.
    pub events: EventLog,
    pub(crate) rng: ChaCha8Rng,
}

impl World {
    /// Creates an empty world with an RNG seeded from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            arena: Arena::new(),
            player: None,
            wave: None,
            game: GameState::default(),
            timeline: Timeline::new(),
            events: EventLog::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Records an event stamped with the current tick and `time`.
    pub fn emit(&mut self, time: f64, event: CombatEvent) {
        let tick = self.arena.current_tick();
        self.events.record(tick, time, event);
    }

    /// Returns the player record.
    ///
    /// # Errors
    ///
    /// [`SystemError::MissingPlayer`] if no player is registered.
    pub fn player(&self) -> Result<&PlayerState, SystemError> {
        self.player.as_ref().ok_or(SystemError::MissingPlayer)
    }

    /// Returns the player record mutably.
    ///
    /// # Errors
    ///
    /// [`SystemError::MissingPlayer`] if no player is registered.
    pub fn player_mut(&mut self) -> Result<&mut PlayerState, SystemError> {
        self.player.as_mut().ok_or(SystemError::MissingPlayer)
    }

    /// Player world position.
    ///
    /// # Errors
    ///
    /// [`SystemError::MissingPlayer`] if no player is registered.
    pub fn player_position(&self) -> Result<Vec3, SystemError> {
        self.player().map(|p| p.transform.position)
    }
}
