//! Enemy damage and death handling.
//!
//! Every path that hurts an enemy (projectile hits, bomb blasts) goes through
//! [`damage_enemy`], so death bookkeeping happens in exactly one place:
//!
//! - Health is clamped at zero and the enemy flagged `DAMAGED` for the tick.
//! - On the killing hit the enemy is marked dead, score and kills are awarded,
//!   an `EnemyKilled` event is recorded and the entity is queued for removal.
//! - Projectile kills count toward bomb charges for the firing weapon.
//!
//! Dead enemies are ignored, so a kill is never counted twice.

use tracing::debug;

use crate::config::CombatConfig;
use crate::entity::{DamageOutcome, EntityId};
use crate::events::CombatEvent;
use crate::world::World;

/// What dealt the damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageCause {
    /// A projectile hit.
    Projectile {
        /// Weapon that fired the projectile.
        owner: EntityId,
    },
    /// A bomb blast.
    Bomb,
}

/// Applies `amount` damage to `enemy` and handles a resulting death.
///
/// Returns [`DamageOutcome::Ignored`] if `enemy` is missing, not an enemy,
/// or already dead.
pub fn damage_enemy(
    world: &mut World,
    config: &CombatConfig,
    enemy: EntityId,
    amount: f32,
    cause: DamageCause,
    time: f64,
) -> DamageOutcome {
    let Some(state) = world.arena.get_mut(enemy).and_then(|e| e.as_enemy_mut()) else {
        return DamageOutcome::Ignored;
    };
    let outcome = state.apply_damage(amount);
    let health = state.health();
    let kind = state.kind;

    if outcome == DamageOutcome::Ignored {
        return outcome;
    }
    world.emit(time, CombatEvent::EnemyHit { enemy, amount, health });

    if outcome == DamageOutcome::Killed {
        let score = config.scoring.kill_score;
        world.game.score += score;
        world.game.kills += 1;
        world.arena.mark_for_removal(enemy);
        debug!(enemy = %enemy, %kind, kills = world.game.kills, "enemy killed");
        world.emit(time, CombatEvent::EnemyKilled { enemy, kind, score });

        if let DamageCause::Projectile { owner } = cause {
            award_bomb_charge(world, config, owner, time);
        }
    }
    outcome
}

/// Grants `owner` a bomb charge when the kill count lands on a multiple of
/// `kills_per_charge`, up to `max_charges`.
fn award_bomb_charge(world: &mut World, config: &CombatConfig, owner: EntityId, time: f64) {
    let per_charge = config.bomb.kills_per_charge.max(1);
    if world.game.kills % per_charge != 0 {
        return;
    }
    let Some(weapon) = world.arena.get_mut(owner).and_then(|e| e.as_weapon_mut()) else {
        return;
    };
    if weapon.bomb_count >= config.bomb.max_charges {
        return;
    }
    weapon.bomb_count += 1;
    let bomb_count = weapon.bomb_count;
    debug!(weapon = %owner, bomb_count, "bomb charge awarded");
    world.emit(time, CombatEvent::BombAwarded { weapon: owner, bomb_count });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeaponConfig;
    use crate::entity::{EnemyKind, EnemyState, EntityInner, StatusFlags, Transform, WeaponState};

    fn world_with_enemy(health: f32) -> (World, EntityId) {
        let mut world = World::new(0);
        let enemy = world.arena.spawn(
            EntityInner::Enemy(EnemyState::new(EnemyKind::Soldier, health, 5.0, 1.0)),
            Transform::default(),
        );
        (world, enemy)
    }

    mod kill_tests {
        use super::*;

        #[test]
        fn lethal_hit_awards_once() {
            let config = CombatConfig::default();
            let (mut world, enemy) = world_with_enemy(30.0);
            let cause = DamageCause::Bomb;

            let first = damage_enemy(&mut world, &config, enemy, 40.0, cause, 1.0);
            let second = damage_enemy(&mut world, &config, enemy, 40.0, cause, 1.0);
            assert_eq!(first, DamageOutcome::Killed);
            assert_eq!(second, DamageOutcome::Ignored);

            assert_eq!(world.game.score, 100);
            assert_eq!(world.game.kills, 1);
            assert!(world.arena.is_pending_removal(enemy));

            let killed = world
                .events
                .events()
                .iter()
                .filter(|e| matches!(e.event, CombatEvent::EnemyKilled { .. }))
                .count();
            assert_eq!(killed, 1);
        }

        #[test]
        fn non_lethal_hit_flags_damaged() {
            let config = CombatConfig::default();
            let (mut world, enemy) = world_with_enemy(100.0);
            let outcome = damage_enemy(&mut world, &config, enemy, 10.0, DamageCause::Bomb, 0.0);
            assert_eq!(outcome, DamageOutcome::Hit);

            let state = world.arena.get(enemy).and_then(|e| e.as_enemy()).unwrap();
            assert_eq!(state.health(), 90.0);
            assert!(state.status.contains(StatusFlags::DAMAGED));
            assert_eq!(world.game.score, 0);
        }

        #[test]
        fn missing_target_is_ignored() {
            let config = CombatConfig::default();
            let mut world = World::new(0);
            let outcome =
                damage_enemy(&mut world, &config, EntityId::new(5), 10.0, DamageCause::Bomb, 0.0);
            assert_eq!(outcome, DamageOutcome::Ignored);
            assert!(world.events.is_empty());
        }
    }

    mod bomb_award_tests {
        use super::*;

        #[test]
        fn projectile_kills_grant_capped_charges() {
            let mut config = CombatConfig::default();
            config.bomb.kills_per_charge = 2;
            config.bomb.max_charges = 2;

            let mut world = World::new(0);
            let weapon = world.arena.spawn(
                EntityInner::Weapon(WeaponState::from_config(&WeaponConfig {
                    initial_bombs: 0,
                    ..WeaponConfig::default()
                })),
                Transform::default(),
            );

            for _ in 0..8 {
                let enemy = world.arena.spawn(
                    EntityInner::Enemy(EnemyState::new(EnemyKind::Drone, 1.0, 1.0, 1.0)),
                    Transform::default(),
                );
                damage_enemy(
                    &mut world,
                    &config,
                    enemy,
                    10.0,
                    DamageCause::Projectile { owner: weapon },
                    0.0,
                );
            }

            let bombs = world.arena.get(weapon).and_then(|e| e.as_weapon()).unwrap().bomb_count;
            assert_eq!(bombs, 2);
        }

        #[test]
        fn bomb_kills_do_not_grant_charges() {
            let mut config = CombatConfig::default();
            config.bomb.kills_per_charge = 1;
            let (mut world, enemy) = world_with_enemy(1.0);
            damage_enemy(&mut world, &config, enemy, 10.0, DamageCause::Bomb, 0.0);
            assert!(!world
                .events
                .events()
                .iter()
                .any(|e| matches!(e.event, CombatEvent::BombAwarded { .. })));
        }
    }
}
