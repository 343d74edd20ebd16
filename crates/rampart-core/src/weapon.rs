//! Weapon actions: fire, reload and bomb.
//!
//! These are the host-facing commands behind
//! [`Simulation::fire_weapon`](crate::simulation::Simulation::fire_weapon) and
//! friends. They act on the world immediately; reload completion is deferred
//! through the timeline.
//!
//! Firing an empty magazine starts a reload instead of shooting. The shot that
//! empties the magazine never triggers a reload by itself.

use tracing::debug;

use crate::config::CombatConfig;
use crate::damage::{damage_enemy, DamageCause};
use crate::entity::components::look_rotation;
use crate::entity::{DamageOutcome, EntityId, EntityInner, ProjectileState, Transform, WeaponState};
use crate::error::{CombatError, CombatResult};
use crate::events::CombatEvent;
use crate::timeline::ScheduledAction;
use crate::world::World;

/// Result of a successful fire command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// A projectile was launched.
    Fired {
        /// The new projectile.
        projectile: EntityId,
        /// Whether it homes on the weapon's locked target.
        guided: bool,
    },
    /// The magazine was empty; a reload started instead.
    ReloadStarted,
}

fn ensure_running(world: &World) -> CombatResult<()> {
    if world.game.is_running() {
        Ok(())
    } else {
        Err(CombatError::NotRunning)
    }
}

fn weapon_mut(world: &mut World, id: EntityId) -> CombatResult<&mut WeaponState> {
    let entity = world.arena.get_mut(id).ok_or(CombatError::UnknownEntity(id))?;
    let actual = entity.tag();
    entity
        .as_weapon_mut()
        .ok_or(CombatError::NotAWeapon { id, actual })
}

/// Flags `weapon` as reloading and schedules completion.
fn begin_reload(world: &mut World, id: EntityId, time: f64) -> CombatResult<()> {
    let weapon = weapon_mut(world, id)?;
    weapon.reloading = true;
    let done_at = time + f64::from(weapon.reload_duration);

    world
        .timeline
        .schedule(done_at, ScheduledAction::ReloadComplete { weapon: id });
    debug!(weapon = %id, done_at, "reload started");
    world.emit(time, CombatEvent::ReloadStarted { weapon: id });
    Ok(())
}

/// Fires `weapon` at `time`.
///
/// A locked weapon whose target is still alive launches a guided projectile
/// homing on that target.
///
/// # Errors
///
/// - [`CombatError::NotRunning`] if the game is not running
/// - [`CombatError::UnknownEntity`] / [`CombatError::NotAWeapon`] for a bad id
/// - [`CombatError::Reloading`] while a reload is pending
/// - [`CombatError::OnCooldown`] if the fire-rate gate is closed
pub fn fire(world: &mut World, id: EntityId, time: f64) -> CombatResult<FireOutcome> {
    ensure_running(world)?;

    let weapon = weapon_mut(world, id)?;
    if weapon.reloading {
        return Err(CombatError::Reloading);
    }
    if weapon.ammo() == 0 {
        begin_reload(world, id, time)?;
        return Ok(FireOutcome::ReloadStarted);
    }
    if !weapon.fire_ready(time) {
        return Err(CombatError::OnCooldown {
            remaining: weapon.cooldown_remaining(time),
        });
    }

    weapon.consume_round();
    weapon.last_fire_time = Some(time);
    let (damage, speed, lifetime) =
        (weapon.damage, weapon.projectile_speed, weapon.projectile_lifetime);
    let lock = weapon
        .targeting
        .as_ref()
        .filter(|t| t.lock.locked)
        .and_then(|t| t.lock.target);

    let origin = world.arena.get(id).map(|e| *e.transform()).unwrap_or_default();
    let direction = origin.forward();
    let mut projectile = ProjectileState::new(id, direction, speed, damage, lifetime);
    if let Some(target) = lock.filter(|t| world.arena.is_living_enemy(*t)) {
        projectile = projectile.homing(target);
    }
    let guided = projectile.guided;

    let transform = Transform {
        position: origin.position,
        orientation: look_rotation(projectile.direction),
    };
    let projectile_id = world.arena.spawn(EntityInner::Projectile(projectile), transform);

    debug!(weapon = %id, projectile = %projectile_id, guided, "weapon fired");
    world.emit(
        time,
        CombatEvent::ProjectileFired {
            weapon: id,
            projectile: projectile_id,
            guided,
        },
    );
    Ok(FireOutcome::Fired {
        projectile: projectile_id,
        guided,
    })
}

/// Starts a reload on `weapon` at `time`.
///
/// Returns `Ok(false)` without doing anything if the magazine is already full.
///
/// # Errors
///
/// - [`CombatError::NotRunning`] if the game is not running
/// - [`CombatError::UnknownEntity`] / [`CombatError::NotAWeapon`] for a bad id
/// - [`CombatError::Reloading`] if a reload is already pending
pub fn reload(world: &mut World, id: EntityId, time: f64) -> CombatResult<bool> {
    ensure_running(world)?;
    let weapon = weapon_mut(world, id)?;
    if weapon.reloading {
        return Err(CombatError::Reloading);
    }
    if weapon.ammo() >= weapon.max_ammo {
        return Ok(false);
    }
    begin_reload(world, id, time)?;
    Ok(true)
}

/// Finishes a scheduled reload.
///
/// A no-op if the weapon no longer exists or is no longer reloading, so a
/// stale completion can never revive or refill anything.
pub fn complete_reload(world: &mut World, id: EntityId, time: f64) {
    let Ok(weapon) = weapon_mut(world, id) else {
        debug!(weapon = %id, "stale reload completion ignored");
        return;
    };
    if !weapon.reloading {
        return;
    }
    weapon.refill();
    weapon.reloading = false;
    debug!(weapon = %id, ammo = weapon.ammo(), "reload finished");
    world.emit(time, CombatEvent::ReloadFinished { weapon: id });
}

/// Spends one bomb charge from `weapon`, damaging every living enemy within
/// the blast radius of the player. Returns the number of enemies hit.
///
/// # Errors
///
/// - [`CombatError::NotRunning`] if the game is not running
/// - [`CombatError::UnknownEntity`] / [`CombatError::NotAWeapon`] for a bad id
/// - [`CombatError::NoBombs`] if no charges are left
/// - [`CombatError::System`] if no player is registered
pub fn detonate_bomb(
    world: &mut World,
    config: &CombatConfig,
    id: EntityId,
    time: f64,
) -> CombatResult<usize> {
    ensure_running(world)?;
    let center = world.player_position()?;
    let weapon = weapon_mut(world, id)?;
    if weapon.bomb_count == 0 {
        return Err(CombatError::NoBombs);
    }
    weapon.bomb_count -= 1;

    let caught: Vec<EntityId> = world
        .arena
        .spatial()
        .query_radius(center, config.bomb.radius)
        .into_iter()
        .filter(|e| world.arena.is_living_enemy(*e))
        .collect();

    let hits = caught
        .into_iter()
        .map(|enemy| {
            damage_enemy(world, config, enemy, config.bomb.damage, DamageCause::Bomb, time)
        })
        .filter(|outcome| *outcome != DamageOutcome::Ignored)
        .count();

    debug!(weapon = %id, hits, "bomb detonated");
    world.emit(time, CombatEvent::BombDetonated { weapon: id, hits });
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlayerConfig, WeaponConfig};
    use crate::entity::{EnemyKind, EnemyState, EntityTag, PlayerState, TargetingProfile};
    use glam::Vec3;

    fn running_world() -> World {
        let mut world = World::new(0);
        world.game.playing = true;
        world.player = Some(PlayerState::new(Transform::default(), &PlayerConfig::default()));
        world
    }

    fn spawn_weapon(world: &mut World, state: WeaponState) -> EntityId {
        world.arena.spawn(EntityInner::Weapon(state), Transform::default())
    }

    fn weapon(world: &World, id: EntityId) -> &WeaponState {
        world.arena.get(id).and_then(|e| e.as_weapon()).unwrap()
    }

    mod fire_tests {
        use super::*;

        #[test]
        fn last_round_then_reload() {
            let mut world = running_world();
            let state = WeaponState::from_config(&WeaponConfig::default()).with_ammo(1);
            let id = spawn_weapon(&mut world, state);

            let outcome = fire(&mut world, id, 0.0).unwrap();
            assert!(matches!(outcome, FireOutcome::Fired { guided: false, .. }));
            assert_eq!(weapon(&world, id).ammo(), 0);
            assert!(!weapon(&world, id).reloading);

            assert_eq!(fire(&mut world, id, 0.0).unwrap(), FireOutcome::ReloadStarted);
            assert!(weapon(&world, id).reloading);
            assert_eq!(world.arena.ids_with_tag(EntityTag::Projectile).len(), 1);
        }

        #[test]
        fn projectile_leaves_along_forward() {
            let mut world = running_world();
            let id = world.arena.spawn(
                EntityInner::Weapon(WeaponState::from_config(&WeaponConfig::default())),
                Transform::looking_at(Vec3::new(1.0, 2.0, 3.0), Vec3::new(11.0, 2.0, 3.0)),
            );
            let FireOutcome::Fired { projectile, .. } = fire(&mut world, id, 0.0).unwrap() else {
                panic!("expected a shot");
            };
            let entity = world.arena.get(projectile).unwrap();
            assert_eq!(entity.transform().position, Vec3::new(1.0, 2.0, 3.0));
            let state = entity.as_projectile().unwrap();
            assert!((state.direction - Vec3::X).length() < 1e-5);
            assert_eq!(state.owner, id);
        }

        #[test]
        fn fire_rate_is_enforced() {
            let mut world = running_world();
            let id = spawn_weapon(&mut world, WeaponState::from_config(&WeaponConfig::default()));
            fire(&mut world, id, 1.0).unwrap();
            let err = fire(&mut world, id, 1.05).unwrap_err();
            assert!(matches!(err, CombatError::OnCooldown { remaining } if remaining > 0.0));
            assert!(fire(&mut world, id, 1.2).is_ok());
        }

        #[test]
        fn rejected_while_reloading_or_not_running() {
            let mut world = running_world();
            let state = WeaponState::from_config(&WeaponConfig::default()).with_ammo(0);
            let id = spawn_weapon(&mut world, state);
            fire(&mut world, id, 0.0).unwrap();
            assert_eq!(fire(&mut world, id, 5.0).unwrap_err(), CombatError::Reloading);

            world.game.game_over = true;
            assert_eq!(fire(&mut world, id, 5.0).unwrap_err(), CombatError::NotRunning);
        }

        #[test]
        fn bad_ids_are_rejected() {
            let mut world = running_world();
            let enemy = world.arena.spawn(
                EntityInner::Enemy(EnemyState::new(EnemyKind::Drone, 10.0, 1.0, 1.0)),
                Transform::default(),
            );
            assert_eq!(
                fire(&mut world, enemy, 0.0).unwrap_err(),
                CombatError::NotAWeapon {
                    id: enemy,
                    actual: EntityTag::Enemy
                }
            );
            let missing = EntityId::new(1_000);
            assert_eq!(
                fire(&mut world, missing, 0.0).unwrap_err(),
                CombatError::UnknownEntity(missing)
            );
        }

        #[test]
        fn locked_weapon_fires_guided() {
            let mut world = running_world();
            let enemy = world.arena.spawn(
                EntityInner::Enemy(EnemyState::new(EnemyKind::Brute, 100.0, 1.0, 1.0)),
                Transform::at(Vec3::new(0.0, 0.0, -10.0)),
            );
            let mut state = WeaponState::from_config(&WeaponConfig::default())
                .with_targeting(TargetingProfile::default());
            if let Some(targeting) = state.targeting.as_mut() {
                targeting.lock.retarget(enemy);
                targeting.lock.progress = 1.0;
                targeting.lock.locked = true;
            }
            let id = spawn_weapon(&mut world, state);

            let FireOutcome::Fired { projectile, guided } = fire(&mut world, id, 0.0).unwrap()
            else {
                panic!("expected a shot");
            };
            assert!(guided);
            let homing = world
                .arena
                .get(projectile)
                .and_then(|e| e.as_projectile())
                .unwrap()
                .homing_target;
            assert_eq!(homing, Some(enemy));
        }
    }

    mod reload_tests {
        use super::*;

        #[test]
        fn completion_refills_once() {
            let mut world = running_world();
            let state = WeaponState::from_config(&WeaponConfig::default()).with_ammo(3);
            let id = spawn_weapon(&mut world, state);
            assert!(reload(&mut world, id, 0.0).unwrap());
            assert_eq!(reload(&mut world, id, 0.1).unwrap_err(), CombatError::Reloading);

            assert!(world.timeline.drain_due(1.0).is_empty());
            let due = world.timeline.drain_due(1.5);
            assert_eq!(due, vec![ScheduledAction::ReloadComplete { weapon: id }]);

            complete_reload(&mut world, id, 1.5);
            assert_eq!(weapon(&world, id).ammo(), weapon(&world, id).max_ammo);
            assert!(!weapon(&world, id).reloading);
        }

        #[test]
        fn full_magazine_is_a_noop() {
            let mut world = running_world();
            let id = spawn_weapon(&mut world, WeaponState::from_config(&WeaponConfig::default()));
            assert!(!reload(&mut world, id, 0.0).unwrap());
            assert!(world.timeline.is_empty());
        }

        #[test]
        fn stale_completion_is_ignored() {
            let mut world = running_world();
            let state = WeaponState::from_config(&WeaponConfig::default()).with_ammo(0);
            let id = spawn_weapon(&mut world, state);
            complete_reload(&mut world, id, 0.0);
            assert_eq!(weapon(&world, id).ammo(), 0);

            world.arena.despawn(id);
            complete_reload(&mut world, id, 0.0);
            assert!(world.arena.get(id).is_none());
        }
    }

    mod bomb_tests {
        use super::*;

        #[test]
        fn blast_hits_enemies_in_radius() {
            let config = CombatConfig::default();
            let mut world = running_world();
            let id = spawn_weapon(&mut world, WeaponState::from_config(&WeaponConfig::default()));
            let near = world.arena.spawn(
                EntityInner::Enemy(EnemyState::new(EnemyKind::Soldier, 50.0, 1.0, 1.0)),
                Transform::at(Vec3::new(0.0, 0.0, -5.0)),
            );
            let far = world.arena.spawn(
                EntityInner::Enemy(EnemyState::new(EnemyKind::Soldier, 50.0, 1.0, 1.0)),
                Transform::at(Vec3::new(0.0, 0.0, -50.0)),
            );

            assert_eq!(detonate_bomb(&mut world, &config, id, 0.0).unwrap(), 1);
            assert!(!world.arena.is_living_enemy(near));
            assert!(world.arena.is_living_enemy(far));
            assert_eq!(world.game.kills, 1);
            assert_eq!(weapon(&world, id).bomb_count, 0);

            assert_eq!(
                detonate_bomb(&mut world, &config, id, 0.0).unwrap_err(),
                CombatError::NoBombs
            );
        }

        #[test]
        fn needs_a_player() {
            let config = CombatConfig::default();
            let mut world = running_world();
            world.player = None;
            let id = spawn_weapon(&mut world, WeaponState::from_config(&WeaponConfig::default()));
            let err = detonate_bomb(&mut world, &config, id, 0.0).unwrap_err();
            assert_eq!(err, CombatError::System(crate::error::SystemError::MissingPlayer));
            assert_eq!(weapon(&world, id).bomb_count, 1);
        }
    }
}
