//! Test helper functions for setting up simulations and entities.
//!
//! This module provides factory functions and setup utilities that make
//! writing tests more ergonomic and consistent.

use glam::Vec3;

use crate::config::CombatConfig;
use crate::damage::{damage_enemy, DamageCause};
use crate::entity::{EnemyKind, EnemyState, EntityId, TargetingProfile, Transform, WeaponState};
use crate::events::{CombatEvent, TimedEvent};
use crate::simulation::Simulation;

/// Standard frame step.
pub const FRAME: f32 = 1.0 / 60.0;

// =============================================================================
// Logging
// =============================================================================

/// Installs a test-writer subscriber so `tracing` output shows up for failing
/// tests. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

// =============================================================================
// Scenario Setup
// =============================================================================

/// A started simulation with the player at the origin facing -Z.
pub fn running_sim(seed: u64) -> Simulation {
    init_tracing();
    let mut sim = Simulation::new(CombatConfig::default(), seed);
    sim.spawn_player(Transform::default());
    sim.start();
    sim
}

/// A started simulation plus a weapon at the origin with lock-on targeting.
pub fn armed_sim(seed: u64) -> (Simulation, EntityId) {
    let mut sim = running_sim(seed);
    let weapon = sim.spawn_weapon(Transform::default(), Some(TargetingProfile::default()));
    (sim, weapon)
}

/// Inserts an enemy with explicit stats at `position`, facing the origin.
pub fn place_enemy(sim: &mut Simulation, kind: EnemyKind, position: Vec3, health: f32) -> EntityId {
    let enemy = EnemyState::new(kind, health, 5.0, 1.0);
    sim.insert_enemy(enemy, Transform::looking_at(position, Vec3::ZERO))
}

/// Kills `enemy` through the regular damage path.
pub fn kill(sim: &mut Simulation, enemy: EntityId) {
    let config = sim.config().clone();
    let time = sim.time();
    damage_enemy(sim.world_mut(), &config, enemy, 1.0e6, DamageCause::Bomb, time);
}

// =============================================================================
// Stepping
// =============================================================================

/// Steps `count` frames of [`FRAME`].
pub fn step_frames(sim: &mut Simulation, count: usize) {
    for _ in 0..count {
        sim.step(FRAME);
    }
}

/// Steps frames until `done` holds, up to `max_frames`. Returns whether it did.
pub fn step_until(
    sim: &mut Simulation,
    max_frames: usize,
    mut done: impl FnMut(&Simulation) -> bool,
) -> bool {
    for _ in 0..max_frames {
        if done(sim) {
            return true;
        }
        sim.step(FRAME);
    }
    done(sim)
}

// =============================================================================
// Inspection
// =============================================================================

/// Returns the weapon record for `id`.
///
/// # Panics
///
/// Panics if `id` is not a live weapon.
pub fn weapon(sim: &Simulation, id: EntityId) -> &WeaponState {
    sim.arena()
        .get(id)
        .and_then(|e| e.as_weapon())
        .expect("weapon should exist")
}

/// Returns the enemy record for `id`, if still present.
pub fn enemy(sim: &Simulation, id: EntityId) -> Option<&EnemyState> {
    sim.arena().get(id).and_then(|e| e.as_enemy())
}

/// Returns the world position of `id`.
///
/// # Panics
///
/// Panics if `id` is not live.
pub fn position(sim: &Simulation, id: EntityId) -> Vec3 {
    sim.arena().get(id).expect("entity should exist").transform().position
}

/// Counts events matching `predicate`.
pub fn count_events(events: &[TimedEvent], predicate: impl Fn(&CombatEvent) -> bool) -> usize {
    events.iter().filter(|e| predicate(&e.event)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_sim_is_running_with_player() {
        let sim = running_sim(1);
        assert!(sim.is_running());
        assert!(sim.player_snapshot().is_some());
    }

    #[test]
    fn armed_sim_weapon_has_targeting() {
        let (sim, id) = armed_sim(1);
        assert!(weapon(&sim, id).targeting.is_some());
    }

    #[test]
    fn kill_marks_enemy_dead() {
        let mut sim = running_sim(1);
        let id = place_enemy(&mut sim, EnemyKind::Soldier, Vec3::new(0.0, 0.0, -10.0), 30.0);
        kill(&mut sim, id);
        assert!(!enemy(&sim, id).unwrap().is_alive());
        assert_eq!(sim.game_snapshot().kills, 1);
    }

    #[test]
    fn step_until_stops_early() {
        let mut sim = running_sim(1);
        assert!(step_until(&mut sim, 10, |s| s.tick() >= 3));
        assert_eq!(sim.tick(), 3);
    }
}
