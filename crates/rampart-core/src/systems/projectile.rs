//! Projectile engine: flight, homing, collision and damage.
//!
//! Per projectile, in id order:
//!
//! 1. Age it; an expired projectile is queued for removal and skipped.
//! 2. Guided projectiles blend their direction toward a living homing target.
//!    A target that died or vanished is dropped and flight continues straight.
//! 3. Advance by `direction * speed * dt`.
//! 4. Sphere test against living enemies in id order. The first hit applies
//!    damage and consumes the projectile.

use tracing::trace;

use crate::config::CombatConfig;
use crate::damage::{damage_enemy, DamageCause};
use crate::entity::components::look_rotation;
use crate::entity::{EntityId, EntityTag, Transform};
use crate::error::SystemError;
use crate::events::CombatEvent;
use crate::world::{Clock, World};

use super::CombatSystem;

/// Flight outcome for one projectile this tick.
enum Flight {
    Expired,
    Moved {
        position: glam::Vec3,
        guided: bool,
        damage: f32,
        owner: EntityId,
    },
}

/// Advances projectiles and resolves their hits.
#[derive(Debug, Clone, Default)]
pub struct ProjectileEngine;

impl ProjectileEngine {
    /// Creates a new projectile engine.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn fly(world: &mut World, config: &CombatConfig, id: EntityId, dt: f32) -> Option<Flight> {
        // Homing target position, read before the projectile is borrowed mutably.
        let homing = world
            .arena
            .get(id)?
            .as_projectile()?
            .homing_target
            .map(|t| {
                world
                    .arena
                    .get(t)
                    .filter(|e| e.is_living_enemy())
                    .map(|e| e.transform().position)
            });

        let entity = world.arena.get_mut(id)?;
        let position = entity.transform().position;
        let projectile = entity.as_projectile_mut()?;

        projectile.age += dt;
        if projectile.expired() {
            return Some(Flight::Expired);
        }

        if projectile.guided {
            match homing {
                Some(Some(target)) => {
                    if let Some(to_target) = (target - position).try_normalize() {
                        let blend = (config.projectile.homing_strength * dt).clamp(0.0, 1.0);
                        let turned = projectile.direction.lerp(to_target, blend);
                        projectile.direction =
                            turned.try_normalize().unwrap_or(projectile.direction);
                    }
                }
                Some(None) => {
                    trace!(projectile = %id, "homing target lost");
                    projectile.homing_target = None;
                }
                None => {}
            }
        }

        let direction = projectile.direction;
        let moved = position + direction * projectile.speed * dt;
        let flight = Flight::Moved {
            position: moved,
            guided: projectile.guided,
            damage: projectile.damage,
            owner: projectile.owner,
        };
        world.arena.set_transform(
            id,
            Transform {
                position: moved,
                orientation: look_rotation(direction),
            },
        );
        Some(flight)
    }
}

impl CombatSystem for ProjectileEngine {
    fn name(&self) -> &'static str {
        "projectile_engine"
    }

    fn run(
        &self,
        world: &mut World,
        config: &CombatConfig,
        clock: Clock,
    ) -> Result<(), SystemError> {
        for id in world.arena.ids_with_tag(EntityTag::Projectile) {
            if world.arena.is_pending_removal(id) {
                continue;
            }
            let Some(flight) = Self::fly(world, config, id, clock.dt) else {
                continue;
            };

            let (position, guided, damage, owner) = match flight {
                Flight::Expired => {
                    world.arena.mark_for_removal(id);
                    world.emit(clock.time, CombatEvent::ProjectileExpired { projectile: id });
                    continue;
                }
                Flight::Moved {
                    position,
                    guided,
                    damage,
                    owner,
                } => (position, guided, damage, owner),
            };

            let radius = if guided {
                config.projectile.guided_hit_radius
            } else {
                config.projectile.hit_radius
            };
            let hit = world
                .arena
                .living_enemies()
                .find(|e| e.transform().position.distance(position) < radius)
                .map(|e| e.id());

            if let Some(enemy) = hit {
                trace!(projectile = %id, enemy = %enemy, damage, "projectile hit");
                world.arena.mark_for_removal(id);
                let cause = DamageCause::Projectile { owner };
                damage_enemy(world, config, enemy, damage, cause, clock.time);
            }
        }
        Ok(())
    }
}
