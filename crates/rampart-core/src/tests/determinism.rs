//! Determinism verification tests.
//!
//! These tests verify that the simulation produces identical results when:
//! - Started with the same seed
//! - Given identical inputs
//!
//! This is critical for:
//! - Replay systems
//! - Debug reproducibility

use crate::entity::{EntityId, TargetingProfile, Transform};
use crate::events::TimedEvent;
use crate::simulation::Simulation;
use crate::snapshot::{EnemySnapshot, GameSnapshot};

use super::helpers::{running_sim, FRAME};

/// Everything observable after a scripted run.
#[derive(Debug, PartialEq)]
struct RunRecord {
    events: Vec<TimedEvent>,
    game: GameSnapshot,
    enemies: Vec<EnemySnapshot>,
}

/// Plays a fixed script: a targeting weapon fires every 20 frames and
/// reloads whenever it runs dry.
fn scripted_run(seed: u64, frames: usize) -> RunRecord {
    let mut sim = running_sim(seed);
    let gun = sim.spawn_weapon(Transform::default(), Some(TargetingProfile::default()));
    let mut events = Vec::new();

    for frame in 0..frames {
        if frame % 20 == 0 {
            let _ = sim.fire_weapon(gun);
        }
        sim.step(FRAME);
        events.extend(sim.take_events());
    }

    RunRecord {
        events,
        game: sim.game_snapshot(),
        enemies: sim.enemy_snapshots(),
    }
}

fn spawned_ids(sim: &Simulation) -> Vec<EntityId> {
    sim.enemy_snapshots().iter().map(|e| e.id).collect()
}

// =============================================================================
// Same Seed, Same Result
// =============================================================================

#[test]
fn same_seed_produces_identical_runs() {
    let a = scripted_run(42, 60 * 20);
    let b = scripted_run(42, 60 * 20);

    assert!(!a.events.is_empty());
    assert_eq!(a, b);
}

#[test]
fn repeated_runs_agree_across_seeds() {
    for seed in [0, 1, 7, 1_000, u64::MAX] {
        assert_eq!(scripted_run(seed, 60 * 8), scripted_run(seed, 60 * 8), "seed {seed}");
    }
}

#[test]
fn enemy_ids_and_positions_match() {
    let mut a = running_sim(99);
    let mut b = running_sim(99);
    for _ in 0..(60 * 6) {
        a.step(FRAME);
        b.step(FRAME);
    }

    assert!(!spawned_ids(&a).is_empty());
    assert_eq!(spawned_ids(&a), spawned_ids(&b));
    for (x, y) in a.enemy_snapshots().iter().zip(b.enemy_snapshots().iter()) {
        assert_eq!(x.position, y.position);
        assert_eq!(x.orientation, y.orientation);
        assert_eq!(x.kind, y.kind);
    }
}

#[test]
fn restart_replays_the_same_clock() {
    let mut sim = running_sim(3);
    for _ in 0..(60 * 3) {
        sim.step(FRAME);
    }
    let first_wave_at = sim
        .take_events()
        .iter()
        .find(|e| matches!(e.event, crate::events::CombatEvent::WaveStarted { wave: 1, .. }))
        .map(|e| e.time);
    assert!(first_wave_at.is_some());

    // Restart keeps simulation time monotonic; wave 1 is rescheduled relative
    // to the restart time.
    let restart_time = sim.time();
    sim.start();
    for _ in 0..(60 * 3) {
        sim.step(FRAME);
    }
    let second_wave_at = sim
        .take_events()
        .iter()
        .find(|e| matches!(e.event, crate::events::CombatEvent::WaveStarted { wave: 1, .. }))
        .map(|e| e.time)
        .unwrap();
    assert!(second_wave_at >= restart_time + 2.0 - f64::from(FRAME));
}
