//! Simulation orchestrator.
//!
//! [`Simulation`] owns the [`World`], the configuration and the ordered list
//! of combat systems, and drives one step per host frame:
//!
//! 1. **RESET**: clear one-tick feedback flags from the previous step
//! 2. **TIMELINE**: fire scheduled actions that are now due
//! 3. **SYSTEMS**: run wave, enemy, targeting and projectile systems in order
//! 4. **CLEANUP**: despawn everything marked for removal, advance the tick
//!
//! # Determinism
//!
//! Given the same seed, configuration and sequence of host calls, the
//! simulation produces identical results:
//! - Entities are iterated in id order (via `BTreeMap`)
//! - All randomness comes from one `ChaCha8Rng` seeded at construction
//! - Delayed actions run on simulation time, never wall-clock time
//!
//! # Example
//!
//! ```
//! use rampart_core::config::CombatConfig;
//! use rampart_core::entity::Transform;
//! use rampart_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new(CombatConfig::default(), 42);
//! sim.spawn_player(Transform::default());
//! let weapon = sim.spawn_weapon(Transform::default(), None);
//! sim.start();
//!
//! for _ in 0..60 {
//!     sim.step(1.0 / 60.0);
//! }
//!
//! assert_eq!(sim.tick(), 60);
//! assert!(sim.weapon_snapshot(weapon).is_some());
//! ```

use std::fmt;

use tracing::{debug, info, trace, trace_span};

use crate::arena::Arena;
use crate::config::CombatConfig;
use crate::entity::{
    EnemyKind, EnemyState, EntityId, EntityInner, EntityTag, PlayerState, StatusFlags,
    TargetingProfile, Transform, WeaponState,
};
use crate::error::{CombatError, CombatResult, SystemError};
use crate::events::{CombatEvent, TimedEvent};
use crate::snapshot::{EnemySnapshot, GameSnapshot, LockSnapshot, PlayerSnapshot, WeaponSnapshot};
use crate::state::GameState;
use crate::systems::{build_enemy, default_systems, difficulty_for, CombatSystem, WaveDirector};
use crate::timeline::ScheduledAction;
use crate::weapon::{self, FireOutcome};
use crate::world::{Clock, World};

// =============================================================================
// Simulation
// =============================================================================

/// The combat simulation.
pub struct Simulation {
    /// Shared state the systems operate on.
    world: World,
    /// Tuning.
    config: CombatConfig,
    /// Systems in execution order.
    systems: Vec<Box<dyn CombatSystem>>,
    /// Monotonic simulation time in seconds.
    time: f64,
    /// Seed the RNG was created from.
    seed: u64,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("world", &self.world)
            .field("config", &self.config)
            .field("systems", &format!("[{} systems]", self.systems.len()))
            .field("time", &self.time)
            .field("seed", &self.seed)
            .finish()
    }
}

impl Simulation {
    /// Creates an idle simulation with the default systems.
    ///
    /// Nothing advances until [`Simulation::start`] is called.
    ///
    /// ```
    /// use rampart_core::config::CombatConfig;
    /// use rampart_core::simulation::Simulation;
    ///
    /// let sim = Simulation::new(CombatConfig::default(), 12345);
    /// assert_eq!(sim.tick(), 0);
    /// assert_eq!(sim.seed(), 12345);
    /// assert!(!sim.is_running());
    /// ```
    #[must_use]
    pub fn new(config: CombatConfig, seed: u64) -> Self {
        Self {
            world: World::new(seed),
            config,
            systems: default_systems(),
            time: 0.0,
            seed,
        }
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Starts (or restarts) a run.
    ///
    /// Resets score and flags, restores the player to full health, refills
    /// weapons, removes leftover enemies and projectiles, drops pending
    /// scheduled actions and schedules wave 1 after `first_wave_delay`.
    pub fn start(&mut self) {
        self.world.game = GameState {
            playing: true,
            ..GameState::default()
        };
        self.world.wave = None;
        self.world.timeline.clear();
        if let Some(player) = self.world.player.as_mut() {
            player.reset();
        }

        let ids: Vec<EntityId> = self.world.arena.entity_ids_sorted().collect();
        for id in ids {
            let Some(entity) = self.world.arena.get_mut(id) else {
                continue;
            };
            match entity.tag() {
                EntityTag::Weapon => {
                    if let Some(weapon) = entity.as_weapon_mut() {
                        weapon.refill();
                        weapon.reloading = false;
                        weapon.last_fire_time = None;
                        if let Some(targeting) = weapon.targeting.as_mut() {
                            targeting.lock.clear();
                            targeting.lock.last_evaluation = None;
                        }
                    }
                }
                EntityTag::Enemy | EntityTag::Projectile => {
                    self.world.arena.mark_for_removal(id);
                }
            }
        }
        self.sweep();

        self.world.timeline.schedule(
            self.time + f64::from(self.config.wave.first_wave_delay),
            ScheduledAction::StartWave { wave: 1 },
        );
        info!(time = self.time, "run started");
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// A no-op unless the run is in progress. Negative or non-finite `dt` is
    /// treated as zero.
    pub fn step(&mut self, dt: f32) {
        if !self.world.game.is_running() {
            trace!("step skipped, simulation not running");
            return;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.time += f64::from(dt);
        let clock = Clock::new(self.time, dt);

        // PHASE 1: RESET one-tick feedback
        self.clear_transient_flags();

        // PHASE 2: TIMELINE
        for action in self.world.timeline.drain_due(self.time) {
            self.dispatch(action);
        }

        // PHASE 3: SYSTEMS
        for system in &self.systems {
            let _span = trace_span!("system", name = system.name()).entered();
            if let Err(error) = system.run(&mut self.world, &self.config, clock) {
                debug!(system = system.name(), %error, "system skipped this tick");
            }
        }

        // PHASE 4: CLEANUP
        self.sweep();
        self.world.arena.advance_tick();
    }

    fn clear_transient_flags(&mut self) {
        for entity in self.world.arena.entities_sorted_mut() {
            if let Some(enemy) = entity.as_enemy_mut() {
                enemy.status.remove(StatusFlags::DAMAGED);
            }
        }
        if let Some(player) = self.world.player.as_mut() {
            player.damage_flash = false;
        }
    }

    fn dispatch(&mut self, action: ScheduledAction) {
        match action {
            ScheduledAction::ReloadComplete { weapon } => {
                weapon::complete_reload(&mut self.world, weapon, self.time);
            }
            ScheduledAction::StartWave { wave } => {
                WaveDirector::start_wave(&mut self.world, &self.config, wave, self.time);
            }
        }
    }

    /// Despawns entities marked for removal and reports them to the host.
    fn sweep(&mut self) {
        for entity in self.world.arena.drain_removals() {
            self.world.emit(self.time, CombatEvent::EntityRemoved { entity });
        }
    }

    // -------------------------------------------------------------------------
    // Entity creation and host sync
    // -------------------------------------------------------------------------

    /// Registers the player, replacing any existing record.
    pub fn spawn_player(&mut self, transform: Transform) {
        self.world.player = Some(PlayerState::new(transform, &self.config.player));
    }

    /// Spawns a weapon with the configured loadout and optional targeting.
    pub fn spawn_weapon(
        &mut self,
        transform: Transform,
        targeting: Option<TargetingProfile>,
    ) -> EntityId {
        let mut weapon = WeaponState::from_config(&self.config.weapon);
        if let Some(profile) = targeting {
            weapon = weapon.with_targeting(profile);
        }
        self.insert_weapon(weapon, transform)
    }

    /// Spawns a weapon from an explicit state.
    pub fn insert_weapon(&mut self, weapon: WeaponState, transform: Transform) -> EntityId {
        let id = self.world.arena.spawn(EntityInner::Weapon(weapon), transform);
        debug!(weapon = %id, "weapon spawned");
        id
    }

    /// Spawns an enemy of `kind` scaled to the current wave.
    ///
    /// Host-spawned enemies count toward wave completion like any other.
    pub fn spawn_enemy(&mut self, kind: EnemyKind, transform: Transform) -> EntityId {
        let difficulty = self
            .world
            .wave
            .as_ref()
            .map_or_else(|| difficulty_for(&self.config, 0), |w| w.difficulty);
        let enemy = build_enemy(&self.config, kind, difficulty);
        self.insert_enemy(enemy, transform)
    }

    /// Spawns an enemy from an explicit state.
    pub fn insert_enemy(&mut self, enemy: EnemyState, transform: Transform) -> EntityId {
        let kind = enemy.kind;
        let id = self.world.arena.spawn(EntityInner::Enemy(enemy), transform);
        self.world.emit(self.time, CombatEvent::EnemySpawned { enemy: id, kind });
        id
    }

    /// Marks an entity for removal at the end of the next step.
    ///
    /// # Errors
    ///
    /// [`CombatError::UnknownEntity`] if `id` is not live.
    pub fn mark_for_removal(&mut self, id: EntityId) -> CombatResult<()> {
        if self.world.arena.get(id).is_none() {
            return Err(CombatError::UnknownEntity(id));
        }
        self.world.arena.mark_for_removal(id);
        Ok(())
    }

    /// Overwrites an entity's pose with the host's authoritative transform.
    ///
    /// # Errors
    ///
    /// [`CombatError::UnknownEntity`] if `id` is not live.
    pub fn sync_transform(&mut self, id: EntityId, transform: Transform) -> CombatResult<()> {
        if self.world.arena.set_transform(id, transform) {
            Ok(())
        } else {
            Err(CombatError::UnknownEntity(id))
        }
    }

    /// Overwrites the player's pose.
    ///
    /// # Errors
    ///
    /// [`CombatError::System`] if no player is registered.
    pub fn sync_player_transform(&mut self, transform: Transform) -> CombatResult<()> {
        self.world.player_mut()?.transform = transform;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Fires `weapon` at the current simulation time.
    ///
    /// # Errors
    ///
    /// See [`weapon::fire`].
    pub fn fire_weapon(&mut self, weapon: EntityId) -> CombatResult<FireOutcome> {
        weapon::fire(&mut self.world, weapon, self.time)
    }

    /// Starts a reload on `weapon`. Returns `false` if the magazine was full.
    ///
    /// # Errors
    ///
    /// See [`weapon::reload`].
    pub fn reload_weapon(&mut self, weapon: EntityId) -> CombatResult<bool> {
        weapon::reload(&mut self.world, weapon, self.time)
    }

    /// Detonates a bomb charge from `weapon`. Returns the number of enemies hit.
    ///
    /// # Errors
    ///
    /// See [`weapon::detonate_bomb`].
    pub fn detonate_bomb(&mut self, weapon: EntityId) -> CombatResult<usize> {
        weapon::detonate_bomb(&mut self.world, &self.config, weapon, self.time)
    }

    /// Drains the events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<TimedEvent> {
        self.world.events.take_events()
    }

    // -------------------------------------------------------------------------
    // Snapshots
    // -------------------------------------------------------------------------

    /// Score, wave, kills and run flags.
    #[must_use]
    pub fn game_snapshot(&self) -> GameSnapshot {
        GameSnapshot::from(&self.world.game)
    }

    /// Player health, if a player is registered.
    #[must_use]
    pub fn player_snapshot(&self) -> Option<PlayerSnapshot> {
        self.world.player.as_ref().map(PlayerSnapshot::from)
    }

    /// Magazine and bomb state of `weapon`.
    #[must_use]
    pub fn weapon_snapshot(&self, weapon: EntityId) -> Option<WeaponSnapshot> {
        self.world
            .arena
            .get(weapon)
            .and_then(|e| e.as_weapon())
            .map(WeaponSnapshot::from)
    }

    /// Lock-on state of `weapon`, if it has targeting.
    #[must_use]
    pub fn lock_snapshot(&self, weapon: EntityId) -> Option<LockSnapshot> {
        LockSnapshot::for_weapon(&self.world.arena, weapon)
    }

    /// Every enemy still in the store, in id order.
    #[must_use]
    pub fn enemy_snapshots(&self) -> Vec<EnemySnapshot> {
        self.world
            .arena
            .entities_sorted()
            .filter_map(EnemySnapshot::from_entity)
            .collect()
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Returns the shared world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Returns the shared world mutably.
    #[must_use]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Returns the entity store.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.world.arena
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Current simulation time in seconds.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of completed steps.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.world.arena.current_tick()
    }

    /// Seed the RNG was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether the run is in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.world.game.is_running()
    }

    /// Player lookup for callers that need the typed error.
    ///
    /// # Errors
    ///
    /// [`SystemError::MissingPlayer`] if no player is registered.
    pub fn player(&self) -> Result<&PlayerState, SystemError> {
        self.world.player()
    }
}
