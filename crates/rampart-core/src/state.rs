//! Singleton game records: overall game state and the current wave.

use serde::{Deserialize, Serialize};

/// Score, progress, and run flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Total score.
    pub score: u64,
    /// Current wave number (0 before the first wave starts).
    pub wave: u32,
    /// Enemies killed.
    pub kills: u32,
    /// Set by `start`, cleared on game over.
    pub playing: bool,
    /// Set once the player's health reaches zero.
    pub game_over: bool,
}

impl GameState {
    /// Whether the simulation should advance.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.playing && !self.game_over
    }
}

/// Round state machine: `Idle -> Spawning -> Draining -> Complete -> Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WavePhase {
    /// Waiting for the wave to be started.
    #[default]
    Idle,
    /// Spawning enemies on the interval.
    Spawning,
    /// All enemies spawned; waiting for them to die.
    Draining,
    /// All enemies dead; the next wave is scheduled. Held for one tick,
    /// then the director returns to `Idle`.
    Complete,
}

/// Enemy stats for the current wave, before kind multipliers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// Enemy health.
    pub enemy_health: f32,
    /// Enemy attack damage.
    pub enemy_damage: f32,
    /// Enemy speed.
    pub enemy_speed: f32,
}

/// Wave progress.
///
/// Invariant: `enemies_spawned <= enemies_to_spawn`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveState {
    /// Wave number, starting at 1.
    pub wave: u32,
    /// Enemies this wave will spawn.
    pub enemies_to_spawn: u32,
    /// Enemies spawned so far.
    pub enemies_spawned: u32,
    /// Seconds between spawns.
    pub spawn_interval: f32,
    /// Simulation time of the last spawn.
    pub last_spawn_time: Option<f64>,
    /// State-machine phase.
    pub phase: WavePhase,
    /// Stats snapshot for this wave.
    pub difficulty: Difficulty,
}

impl WaveState {
    /// Whether every enemy of this wave has been spawned.
    #[must_use]
    pub fn fully_spawned(&self) -> bool {
        self.enemies_spawned >= self.enemies_to_spawn
    }

    /// Whether the spawn interval has elapsed at `time`.
    #[must_use]
    pub fn spawn_due(&self, time: f64) -> bool {
        self.last_spawn_time
            .map_or(true, |last| time - last >= f64::from(self.spawn_interval))
    }
}
