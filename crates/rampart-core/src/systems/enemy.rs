//! Enemy controller: movement, attacks and player regeneration.
//!
//! Per living enemy, in id order:
//!
//! 1. Turn toward the player at the enemy's turn rate.
//! 2. Advance on the ground plane until just inside attack range.
//! 3. Attack if in range, facing the player, and off cooldown.
//!
//! After the enemy pass the player regenerates if undamaged for long enough.
//! The attack that takes the player to zero health ends the game.

use glam::Vec3;
use tracing::{debug, info, trace};

use crate::config::CombatConfig;
use crate::entity::components::look_rotation;
use crate::entity::EntityId;
use crate::error::SystemError;
use crate::events::CombatEvent;
use crate::world::{Clock, World};

use super::CombatSystem;

/// Moves enemies and resolves their attacks on the player.
#[derive(Debug, Clone, Default)]
pub struct EnemyController;

impl EnemyController {
    /// Creates a new enemy controller.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Moves and turns one enemy. Returns its distance and facing to the player.
    fn advance(
        world: &mut World,
        config: &CombatConfig,
        id: EntityId,
        player_pos: Vec3,
        dt: f32,
    ) -> Option<(f32, f32)> {
        let entity = world.arena.get_mut(id)?;
        let (speed, turn_rate, attack_range) = {
            let enemy = entity.as_enemy()?;
            (enemy.speed, enemy.turn_rate, enemy.attack_range)
        };

        let transform = entity.transform_mut();
        let to_player = player_pos - transform.position;
        let flat = Vec3::new(to_player.x, 0.0, to_player.z);

        if flat.length_squared() > 1e-8 {
            let desired = look_rotation(flat);
            transform.orientation = transform
                .orientation
                .slerp(desired, (turn_rate * dt).clamp(0.0, 1.0))
                .normalize();
        }

        let stop_distance = attack_range * config.enemy.stop_distance_factor;
        let flat_distance = flat.length();
        if flat_distance > stop_distance {
            let step = (speed * dt).min(flat_distance - stop_distance);
            transform.position += flat / flat_distance * step;
        }

        let to_player = player_pos - transform.position;
        let distance = to_player.length();
        let facing = transform.forward().dot(to_player.normalize_or_zero());
        world.arena.update_spatial(id);
        Some((distance, facing))
    }

    /// Applies an attack from `id` if every attack condition holds.
    fn try_attack(
        world: &mut World,
        config: &CombatConfig,
        id: EntityId,
        distance: f32,
        facing: f32,
        time: f64,
    ) -> Result<(), SystemError> {
        let Some(enemy) = world.arena.get_mut(id).and_then(|e| e.as_enemy_mut()) else {
            return Ok(());
        };
        if !enemy.is_alive()
            || distance > enemy.attack_range
            || facing < config.enemy.attack_facing_dot
            || !enemy.attack_ready(time)
        {
            return Ok(());
        }
        enemy.last_attack_time = Some(time);
        let amount = enemy.attack_damage;

        let player = world.player.as_mut().ok_or(SystemError::MissingPlayer)?;
        player.take_damage(amount, time);
        let health = player.health();
        let dead = player.is_dead();

        debug!(attacker = %id, amount, health, "player damaged");
        world.emit(time, CombatEvent::PlayerDamaged { attacker: id, amount, health });

        if dead && !world.game.game_over {
            world.game.game_over = true;
            world.game.playing = false;
            info!(
                score = world.game.score,
                wave = world.game.wave,
                kills = world.game.kills,
                "game over"
            );
            world.emit(
                time,
                CombatEvent::GameOver {
                    score: world.game.score,
                    wave: world.game.wave,
                    kills: world.game.kills,
                },
            );
        }
        Ok(())
    }

    fn regenerate(
        world: &mut World,
        config: &CombatConfig,
        clock: Clock,
    ) -> Result<(), SystemError> {
        let player = world.player_mut()?;
        if player.is_dead() || player.health() >= player.max_health {
            return Ok(());
        }
        let rested = player
            .last_damage_time
            .map_or(true, |last| clock.time - last > f64::from(config.player.regen_delay));
        if rested {
            player.heal(config.player.regen_rate * clock.dt);
            trace!(health = player.health(), "player regenerating");
        }
        Ok(())
    }
}

impl CombatSystem for EnemyController {
    fn name(&self) -> &'static str {
        "enemy_controller"
    }

    fn run(
        &self,
        world: &mut World,
        config: &CombatConfig,
        clock: Clock,
    ) -> Result<(), SystemError> {
        let player_pos = world.player_position()?;
        let enemies: Vec<EntityId> = world.arena.living_enemies().map(|e| e.id()).collect();

        for id in enemies {
            if world.game.game_over {
                break;
            }
            let Some((distance, facing)) = Self::advance(world, config, id, player_pos, clock.dt)
            else {
                continue;
            };
            Self::try_attack(world, config, id, distance, facing, clock.time)?;
        }

        Self::regenerate(world, config, clock)
    }
}
