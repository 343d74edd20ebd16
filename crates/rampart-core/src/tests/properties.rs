//! Property tests for the clamping and dead-enemy exclusion invariants.

use glam::Vec3;
use proptest::prelude::*;

use crate::config::{CombatConfig, PlayerConfig};
use crate::entity::{DamageOutcome, EnemyKind, EnemyState, PlayerState, Transform, WeaponState};

use super::helpers::{armed_sim, place_enemy, running_sim, weapon, FRAME};

/// Host commands applied to a weapon in random order.
#[derive(Debug, Clone)]
enum Command {
    Fire,
    Reload,
    Step(usize),
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        3 => Just(Command::Fire),
        1 => Just(Command::Reload),
        2 => (1usize..30).prop_map(Command::Step),
    ]
}

fn kind() -> impl Strategy<Value = EnemyKind> {
    prop_oneof![
        Just(EnemyKind::Drone),
        Just(EnemyKind::Soldier),
        Just(EnemyKind::Brute),
    ]
}

proptest! {
    #[test]
    fn enemy_health_stays_clamped(
        max_health in 1.0f32..500.0,
        hits in prop::collection::vec(-100.0f32..400.0, 1..20),
    ) {
        let mut enemy = EnemyState::new(EnemyKind::Soldier, max_health, 1.0, 1.0);
        let mut killed = 0;
        for amount in hits {
            let was_alive = enemy.is_alive();
            let outcome = enemy.apply_damage(amount);
            prop_assert!(enemy.health() >= 0.0);
            prop_assert!(enemy.health() <= enemy.max_health);
            if !was_alive {
                prop_assert_eq!(outcome, DamageOutcome::Ignored);
            }
            if outcome == DamageOutcome::Killed {
                killed += 1;
            }
        }
        prop_assert!(killed <= 1);
        prop_assert_eq!(enemy.is_alive(), enemy.health() > 0.0);
    }

    #[test]
    fn player_health_stays_clamped(
        changes in prop::collection::vec((any::<bool>(), 0.0f32..250.0), 1..30),
    ) {
        let mut player = PlayerState::new(Transform::default(), &PlayerConfig::default());
        for (damage, amount) in changes {
            if damage {
                player.take_damage(amount, 0.0);
            } else {
                player.heal(amount);
            }
            prop_assert!((0.0..=player.max_health).contains(&player.health()));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ammo_never_leaves_range(
        start in 0u32..40,
        commands in prop::collection::vec(command(), 1..40),
    ) {
        let mut sim = running_sim(1);
        let config = CombatConfig::default();
        let state = WeaponState::from_config(&config.weapon).with_ammo(start);
        let id = sim.insert_weapon(state, Transform::default());

        for command in commands {
            match command {
                Command::Fire => {
                    let _ = sim.fire_weapon(id);
                }
                Command::Reload => {
                    let _ = sim.reload_weapon(id);
                }
                Command::Step(frames) => {
                    for _ in 0..frames {
                        sim.step(FRAME);
                    }
                }
            }
            let state = weapon(&sim, id);
            prop_assert!(state.ammo() <= state.max_ammo);
            prop_assert_eq!(sim.weapon_snapshot(id).map(|s| s.ammo), Some(state.ammo()));
        }
    }

    #[test]
    fn dead_enemies_never_become_targets(
        enemies in prop::collection::vec(
            (kind(), -30.0f32..30.0, -35.0f32..-1.0, any::<bool>()),
            1..8,
        ),
    ) {
        let (mut sim, gun) = armed_sim(2);
        let mut dead = Vec::new();
        for (kind, x, z, is_dead) in enemies {
            let id = place_enemy(&mut sim, kind, Vec3::new(x, 0.0, z), 50.0);
            if is_dead {
                let arena = &mut sim.world_mut().arena;
                if let Some(enemy) = arena.get_mut(id).and_then(|e| e.as_enemy_mut()) {
                    enemy.apply_damage(1_000.0);
                }
                dead.push(id);
            }
        }

        for _ in 0..12 {
            sim.step(FRAME);
            let lock = sim.lock_snapshot(gun).unwrap();
            if let Some(target) = lock.target {
                prop_assert!(!dead.contains(&target));
                prop_assert!(sim.arena().is_living_enemy(target));
            }
        }
    }
}
