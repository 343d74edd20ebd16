//! Targeting engine: target selection, lock-on progression and aim assist.
//!
//! Target evaluation runs on a fixed simulation-time cadence per weapon
//! (`evaluation_interval`), not every tick. An evaluation is a two-phase
//! decision:
//!
//! 1. **Keep**: a current target that is alive and inside the hysteresis band
//!    (`lock_distance * keep_range_factor`) is kept outright.
//! 2. **Scan**: otherwise every living enemy inside `lock_distance` and the
//!    facing cone is scored with [`score_candidate`]; the highest score wins
//!    and ties go to the lowest id.
//!
//! The phases are deliberately not merged into one comparable score: a held
//! target is never displaced by a better fresh candidate while it stays valid.
//!
//! An evaluation is forced early when the held target stops being a living
//! enemy. Aim assist runs every tick.

use glam::Vec3;
use tracing::{debug, trace};

use crate::arena::Arena;
use crate::config::{CombatConfig, TargetingConfig};
use crate::entity::components::look_rotation;
use crate::entity::{EnemyState, EntityId, Targeting, Transform, TypeFilter};
use crate::error::SystemError;
use crate::events::CombatEvent;
use crate::world::{Clock, World};

use super::CombatSystem;

/// Slack on the evaluation cadence so `f32` intervals line up with `f64` time.
const CADENCE_EPSILON: f64 = 1e-6;

/// Scores a candidate enemy for a weapon.
///
/// `facing_dot` is `dot(weapon_forward, direction_to_enemy)`. Higher is
/// better. The type preference multiplies the whole score.
#[must_use]
pub fn score_candidate(
    facing_dot: f32,
    distance: f32,
    lock_distance: f32,
    enemy: &EnemyState,
    preferred: TypeFilter,
    config: &TargetingConfig,
) -> f32 {
    let range = lock_distance.max(f32::EPSILON);
    let score = (facing_dot + 1.0) * 15.0
        + (1.0 - distance / range) * 20.0
        + enemy.priority * 10.0
        - enemy.lock_difficulty * 5.0
        + (1.0 - enemy.health_fraction()) * 8.0;

    let preference = match preferred {
        TypeFilter::Any => 1.0,
        TypeFilter::Only(kind) if kind == enemy.kind => config.preferred_bonus,
        TypeFilter::Only(_) => config.non_preferred_penalty,
    };
    score * preference
}

/// Outcome of one target evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Selection {
    /// The held target passed the validity check.
    Keep(EntityId),
    /// A fresh scan picked this candidate with this score.
    Pick(EntityId, f32),
    /// No candidate qualified.
    Nothing,
}

/// Selects targets, progresses lock-on and applies aim assist.
#[derive(Debug, Clone, Default)]
pub struct TargetingEngine;

impl TargetingEngine {
    /// Creates a new targeting engine.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Runs the keep/scan decision for one weapon.
    fn select(
        arena: &Arena,
        config: &TargetingConfig,
        weapon: &Transform,
        targeting: &Targeting,
    ) -> Selection {
        let profile = &targeting.profile;

        if let Some(current) = targeting.lock.target {
            let held = arena
                .get(current)
                .filter(|e| e.is_living_enemy())
                .map(|e| e.transform().position);
            if let Some(pos) = held {
                let keep_range = profile.lock_distance * config.keep_range_factor;
                if weapon.position.distance(pos) <= keep_range {
                    return Selection::Keep(current);
                }
            }
        }

        let forward = weapon.forward();
        let mut best: Option<(EntityId, f32)> = None;
        for entity in arena.living_enemies() {
            let Some(enemy) = entity.as_enemy() else {
                continue;
            };
            let to_enemy = entity.transform().position - weapon.position;
            let distance = to_enemy.length();
            if distance > profile.lock_distance {
                continue;
            }
            let facing = forward.dot(to_enemy.normalize_or_zero());
            if facing < profile.min_facing_dot {
                continue;
            }
            let score = score_candidate(
                facing,
                distance,
                profile.lock_distance,
                enemy,
                profile.preferred,
                config,
            );
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((entity.id(), score));
            }
        }

        best.map_or(Selection::Nothing, |(id, score)| Selection::Pick(id, score))
    }

    /// Evaluates one weapon: selection, lock progression and cue.
    #[allow(clippy::cast_possible_truncation)]
    fn evaluate(world: &mut World, config: &CombatConfig, weapon_id: EntityId, time: f64) {
        let Some((transform, targeting)) = targeting_of(&world.arena, weapon_id) else {
            return;
        };

        let force = targeting.lock.target.is_some_and(|t| !world.arena.is_living_enemy(t));
        let interval = f64::from(config.targeting.evaluation_interval);
        let due = targeting
            .lock
            .last_evaluation
            .map_or(true, |last| time - last + CADENCE_EPSILON >= interval);
        if !due && !force {
            return;
        }
        let elapsed = targeting
            .lock
            .last_evaluation
            .map_or(0.0, |last| (time - last).max(0.0) as f32);

        let selection = Self::select(&world.arena, &config.targeting, &transform, &targeting);
        let difficulty = match selection {
            Selection::Keep(id) | Selection::Pick(id, _) => world
                .arena
                .get(id)
                .and_then(|e| e.as_enemy())
                .map_or(0.0, |e| e.lock_difficulty),
            Selection::Nothing => 0.0,
        };

        let mut changed: Option<Option<EntityId>> = None;
        let mut cue: Option<EntityId> = None;
        {
            let Some(lock_state) = world
                .arena
                .get_mut(weapon_id)
                .and_then(|e| e.as_weapon_mut())
                .and_then(|w| w.targeting.as_mut())
            else {
                return;
            };
            let profile = lock_state.profile;
            let lock = &mut lock_state.lock;
            lock.last_evaluation = Some(time);

            let selected = match selection {
                Selection::Keep(id) => {
                    let score = config.targeting.keep_score;
                    trace!(weapon = %weapon_id, target = %id, score, "target kept");
                    Some(id)
                }
                Selection::Pick(id, score) => {
                    trace!(weapon = %weapon_id, target = %id, score, "candidate selected");
                    Some(id)
                }
                Selection::Nothing => None,
            };

            match selected {
                None => {
                    if lock.target.is_some() {
                        changed = Some(None);
                    }
                    lock.clear();
                }
                Some(id) if lock.target != Some(id) => {
                    lock.retarget(id);
                    changed = Some(Some(id));
                }
                Some(id) => {
                    let rate = profile.lock_speed
                        * (1.0 - difficulty * config.targeting.difficulty_slowdown)
                        * config.targeting.lock_rate_scale;
                    lock.progress = (lock.progress + elapsed * rate.max(0.0)).clamp(0.0, 1.0);

                    if lock.progress >= 1.0 && !lock.locked {
                        lock.locked = true;
                        lock.locked_at = Some(time);
                        let cooldown = f64::from(config.targeting.lock_cue_cooldown);
                        lock.cued.retain(|_, at| time - *at < cooldown);
                        if !lock.cued.contains_key(&id) {
                            lock.cued.insert(id, time);
                            cue = Some(id);
                        }
                    }
                }
            }
        }

        if let Some(target) = changed {
            trace!(weapon = %weapon_id, ?target, "target changed");
            world.emit(time, CombatEvent::TargetChanged { weapon: weapon_id, target });
        }
        if let Some(target) = cue {
            debug!(weapon = %weapon_id, target = %target, "lock acquired");
            world.emit(time, CombatEvent::LockAcquired { weapon: weapon_id, target });
        }
    }

    /// Rotates the weapon toward its target, scaled by lock progress.
    fn assist(world: &mut World, config: &TargetingConfig, weapon_id: EntityId, dt: f32) {
        let Some((transform, targeting)) = targeting_of(&world.arena, weapon_id) else {
            return;
        };
        if !targeting.profile.aim_assist {
            return;
        }
        let Some(target_pos) = targeting
            .lock
            .target
            .and_then(|t| world.arena.get(t))
            .filter(|e| e.is_living_enemy())
            .map(|e| e.transform().position)
        else {
            return;
        };

        let factor = if targeting.lock.locked {
            config.locked_assist_factor
        } else {
            targeting.lock.progress
        };
        let rate = config.aim_assist_rate * targeting.profile.assist_strength;
        let t = (rate * factor * dt).clamp(0.0, 1.0);
        let to_target = target_pos - transform.position;
        if t <= 0.0 || to_target.length_squared() < 1e-8 {
            return;
        }

        let desired = look_rotation(to_target);
        let aimed = Transform {
            position: transform.position,
            orientation: transform.orientation.slerp(desired, t).normalize(),
        };
        world.arena.set_transform(weapon_id, aimed);
    }
}

impl CombatSystem for TargetingEngine {
    fn name(&self) -> &'static str {
        "targeting_engine"
    }

    fn run(
        &self,
        world: &mut World,
        config: &CombatConfig,
        clock: Clock,
    ) -> Result<(), SystemError> {
        let weapons: Vec<EntityId> = world
            .arena
            .entities_sorted()
            .filter(|e| e.as_weapon().is_some_and(|w| w.targeting.is_some()))
            .map(|e| e.id())
            .collect();

        for id in weapons {
            Self::evaluate(world, config, id, clock.time);
            Self::assist(world, &config.targeting, id, clock.dt);
        }
        Ok(())
    }
}

/// Transform and a copy of the targeting state of a targeting weapon.
fn targeting_of(arena: &Arena, weapon_id: EntityId) -> Option<(Transform, Targeting)> {
    let entity = arena.get(weapon_id)?;
    let targeting = entity.as_weapon()?.targeting.clone()?;
    Some((*entity.transform(), targeting))
}

/// Direction from a weapon to its current target, if it has a living one.
#[must_use]
pub fn aim_direction(arena: &Arena, weapon_id: EntityId) -> Option<Vec3> {
    let weapon = arena.get(weapon_id)?;
    let target = weapon.as_weapon()?.targeting.as_ref()?.lock.target?;
    let target = arena.get(target).filter(|e| e.is_living_enemy())?;
    (target.transform().position - weapon.transform().position).try_normalize()
}
