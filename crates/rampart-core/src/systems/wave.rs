//! Wave director: spawn pacing and the wave state machine.
//!
//! Each wave moves through `Idle -> Spawning -> Draining -> Complete -> Idle`. A
//! completed wave awards a bonus and schedules the next wave on the timeline,
//! so progression is endless.
//!
//! Enemies are placed on an even fan in front of the player, at a distance
//! that grows with the wave number.

use glam::{Quat, Vec3};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::{debug, info, trace};

use crate::config::CombatConfig;
use crate::entity::components::{FORWARD, Transform};
use crate::entity::{EnemyKind, EnemyState, EntityInner};
use crate::error::SystemError;
use crate::events::CombatEvent;
use crate::state::{Difficulty, WavePhase, WaveState};
use crate::timeline::ScheduledAction;
use crate::world::{Clock, World};

use super::CombatSystem;

/// Drives wave spawning and completion.
#[derive(Debug, Clone, Default)]
pub struct WaveDirector;

impl WaveDirector {
    /// Creates a new wave director.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Starts wave `wave` at `time`.
    ///
    /// Returns `false` without changing anything if a wave is still spawning
    /// or draining, which makes a stale scheduled start a no-op.
    pub fn start_wave(world: &mut World, config: &CombatConfig, wave: u32, time: f64) -> bool {
        if matches!(
            world.wave.as_ref().map(|w| w.phase),
            Some(WavePhase::Spawning | WavePhase::Draining)
        ) {
            debug!(wave, "wave start ignored, previous wave still active");
            return false;
        }

        let extra = world.rng.gen_range(0..=config.wave.max_extra_enemies);
        let enemies_to_spawn = config.wave.base_enemies + wave / 2 + extra;
        let state = WaveState {
            wave,
            enemies_to_spawn,
            enemies_spawned: 0,
            spawn_interval: spawn_interval(config, wave),
            last_spawn_time: None,
            phase: WavePhase::Spawning,
            difficulty: difficulty_for(config, wave),
        };

        info!(
            wave,
            enemies_to_spawn,
            spawn_interval = state.spawn_interval,
            enemy_health = state.difficulty.enemy_health,
            "wave started"
        );
        world.wave = Some(state);
        world.game.wave = wave;
        world.emit(time, CombatEvent::WaveStarted { wave, enemies_to_spawn });
        true
    }

    fn spawn_tick(world: &mut World, config: &CombatConfig, time: f64) -> Result<(), SystemError> {
        let Some(wave) = world.wave.as_ref() else {
            return Err(SystemError::MissingWaveState);
        };

        if !wave.fully_spawned() && wave.spawn_due(time) {
            let player = world.player()?.transform;
            let index = wave.enemies_spawned;
            let (to_spawn, number, difficulty) =
                (wave.enemies_to_spawn, wave.wave, wave.difficulty);

            let kind = choose_kind(&mut world.rng, number);
            let position = fan_position(config, &player, index, to_spawn, number);
            let enemy = build_enemy(config, kind, difficulty);
            let id = world
                .arena
                .spawn(EntityInner::Enemy(enemy), Transform::looking_at(position, player.position));

            debug!(enemy = %id, %kind, wave = number, index, "enemy spawned");
            world.emit(time, CombatEvent::EnemySpawned { enemy: id, kind });

            if let Some(wave) = world.wave.as_mut() {
                wave.enemies_spawned += 1;
                wave.last_spawn_time = Some(time);
            }
        }

        if let Some(wave) = world.wave.as_mut() {
            if wave.fully_spawned() {
                trace!(wave = wave.wave, "wave draining");
                wave.phase = WavePhase::Draining;
            }
        }
        Ok(())
    }

    fn drain_tick(world: &mut World, config: &CombatConfig, time: f64) {
        if world.arena.living_enemy_count() > 0 {
            return;
        }
        let Some(wave) = world.wave.as_mut() else {
            return;
        };
        wave.phase = WavePhase::Complete;
        let number = wave.wave;
        let bonus = config.wave.completion_bonus_per_wave * u64::from(number);

        world.game.score += bonus;
        world.timeline.schedule(
            time + f64::from(config.wave.next_wave_delay),
            ScheduledAction::StartWave { wave: number + 1 },
        );
        info!(wave = number, bonus, score = world.game.score, "wave complete");
        world.emit(time, CombatEvent::WaveCompleted { wave: number, bonus });
    }
}

impl CombatSystem for WaveDirector {
    fn name(&self) -> &'static str {
        "wave_director"
    }

    fn run(
        &self,
        world: &mut World,
        config: &CombatConfig,
        clock: Clock,
    ) -> Result<(), SystemError> {
        let phase = world
            .wave
            .as_ref()
            .map(|w| w.phase)
            .ok_or(SystemError::MissingWaveState)?;

        match phase {
            WavePhase::Idle => Ok(()),
            WavePhase::Complete => {
                if let Some(wave) = world.wave.as_mut() {
                    trace!(wave = wave.wave, "wave idle");
                    wave.phase = WavePhase::Idle;
                }
                Ok(())
            }
            WavePhase::Spawning => Self::spawn_tick(world, config, clock.time),
            WavePhase::Draining => {
                Self::drain_tick(world, config, clock.time);
                Ok(())
            }
        }
    }
}

// =============================================================================
// Difficulty Curve
// =============================================================================

/// Enemy stats for wave `wave`, scaled linearly from the base values.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn difficulty_for(config: &CombatConfig, wave: u32) -> Difficulty {
    let n = wave as f32;
    Difficulty {
        enemy_health: config.enemy.base_health + config.wave.health_per_wave * n,
        enemy_damage: config.enemy.base_damage + config.wave.damage_per_wave * n,
        enemy_speed: config.enemy.base_speed + config.wave.speed_per_wave * n,
    }
}

/// Seconds between spawns for wave `wave`, never below the configured floor.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn spawn_interval(config: &CombatConfig, wave: u32) -> f32 {
    (config.wave.base_spawn_interval - config.wave.spawn_interval_step * wave as f32)
        .max(config.wave.min_spawn_interval)
}

/// Builds an enemy of `kind` from the wave's difficulty snapshot.
#[must_use]
pub fn build_enemy(config: &CombatConfig, kind: EnemyKind, difficulty: Difficulty) -> EnemyState {
    let mut enemy = EnemyState::new(
        kind,
        difficulty.enemy_health * kind.health_scale(),
        difficulty.enemy_damage * kind.damage_scale(),
        difficulty.enemy_speed * kind.speed_scale(),
    )
    .with_attack(config.enemy.attack_range, config.enemy.attack_cooldown);
    enemy.turn_rate = config.enemy.turn_rate;
    enemy
}

/// Picks an enemy kind. Brutes become more common as waves progress.
#[allow(clippy::cast_precision_loss)]
fn choose_kind(rng: &mut impl Rng, wave: u32) -> EnemyKind {
    let weights = [3.0, 5.0, 0.5 + 0.5 * wave as f32];
    WeightedIndex::new(weights)
        .map(|dist| EnemyKind::ALL[dist.sample(rng)])
        .unwrap_or(EnemyKind::Soldier)
}

/// Spawn point `index` of `count` on the fan in front of the player.
#[allow(clippy::cast_precision_loss)]
fn fan_position(
    config: &CombatConfig,
    player: &Transform,
    index: u32,
    count: u32,
    wave: u32,
) -> Vec3 {
    let fan = config.wave.spawn_fan_angle;
    let slot = (index as f32 + 0.5) / count.max(1) as f32;
    let angle = -fan / 2.0 + fan * slot;

    let forward = player.forward();
    let flat = Vec3::new(forward.x, 0.0, forward.z).try_normalize().unwrap_or(FORWARD);
    let direction = Quat::from_rotation_y(angle) * flat;
    let radius = config.wave.spawn_radius + config.wave.spawn_radius_per_wave * wave as f32;

    player.position + direction * radius
}
