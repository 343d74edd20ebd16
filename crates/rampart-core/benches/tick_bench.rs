use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use glam::{Quat, Vec3};
use rampart_core::entity::{EnemyState, EntityInner, ProjectileState};
use rampart_core::{CombatConfig, EnemyKind, Simulation, TargetingProfile, Transform};

/// A running simulation with a ring of enemies, several targeting weapons and
/// a cloud of projectiles in flight. The player cannot die, so stepping never
/// stops.
fn populated(enemies: usize, projectiles: usize) -> Simulation {
    let mut config = CombatConfig::default();
    config.player.max_health = 1.0e9;
    let mut sim = Simulation::new(config, 2024);
    sim.spawn_player(Transform::default());
    sim.start();

    let mut weapons = Vec::new();
    for i in 0..4 {
        let x = (i as f32 - 1.5) * 2.0;
        let transform = Transform::at(Vec3::new(x, 0.0, 0.0));
        weapons.push(sim.spawn_weapon(transform, Some(TargetingProfile::default())));
    }

    for i in 0..enemies {
        let angle = i as f32 / enemies as f32 * std::f32::consts::TAU;
        let radius = 10.0 + (i % 5) as f32 * 5.0;
        let position = Vec3::new(angle.sin() * radius, 0.0, -angle.cos() * radius);
        let kind = EnemyKind::ALL[i % 3];
        let enemy = EnemyState::new(kind, 1.0e6, 5.0, 1.5);
        sim.insert_enemy(enemy, Transform::looking_at(position, Vec3::ZERO));
    }

    for i in 0..projectiles {
        let owner = weapons[i % weapons.len()];
        let direction = Quat::from_rotation_y(i as f32 * 0.1) * Vec3::NEG_Z;
        let state = ProjectileState::new(owner, direction, 40.0, 1.0, 3.0);
        sim.world_mut()
            .arena
            .spawn(EntityInner::Projectile(state), Transform::at(Vec3::ZERO));
    }
    sim
}

fn bench_tick_small_wave(c: &mut Criterion) {
    c.bench_function("tick_small_wave", |b| {
        b.iter_batched(
            || populated(8, 16),
            |mut sim| {
                sim.step(black_box(1.0 / 60.0));
                sim
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_tick_large_wave(c: &mut Criterion) {
    c.bench_function("tick_large_wave", |b| {
        b.iter_batched(
            || populated(64, 128),
            |mut sim| {
                sim.step(black_box(1.0 / 60.0));
                sim
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_steady_state(c: &mut Criterion) {
    // Long-running arena; enemies are too tough to die during the bench.
    let mut sim = populated(32, 0);

    c.bench_function("tick_steady_state", |b| {
        b.iter(|| {
            sim.step(black_box(1.0 / 60.0));
        })
    });
}

criterion_group!(benches, bench_tick_small_wave, bench_tick_large_wave, bench_steady_state);
criterion_main!(benches);
