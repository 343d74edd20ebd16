//! Combat tuning.
//!
//! [`CombatConfig`] groups one section per subsystem. Every section implements
//! `Default` with the shipped tuning, and every field is `#[serde(default)]`,
//! so a JSON document only needs to name the values it overrides.
//!
//! ```
//! use rampart_core::config::CombatConfig;
//!
//! let config = CombatConfig::from_json_str(r#"{ "wave": { "base_enemies": 5 } }"#).unwrap();
//! assert_eq!(config.wave.base_enemies, 5);
//! assert_eq!(config.scoring.kill_score, 100);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Player health and regeneration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Maximum (and starting) health.
    pub max_health: f32,
    /// Seconds without damage before regeneration starts.
    pub regen_delay: f32,
    /// Health regenerated per second.
    pub regen_rate: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            regen_delay: 3.0,
            regen_rate: 10.0,
        }
    }
}

/// Default weapon loadout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    /// Magazine size.
    pub max_ammo: u32,
    /// Damage per projectile.
    pub damage: f32,
    /// Minimum seconds between shots.
    pub fire_rate: f32,
    /// Seconds a reload takes.
    pub reload_duration: f32,
    /// Projectile speed (units/s).
    pub projectile_speed: f32,
    /// Projectile lifetime (s).
    pub projectile_lifetime: f32,
    /// Bomb charges at startup.
    pub initial_bombs: u32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            max_ammo: 30,
            damage: 40.0,
            fire_rate: 0.15,
            reload_duration: 1.5,
            projectile_speed: 40.0,
            projectile_lifetime: 3.0,
            initial_bombs: 1,
        }
    }
}

/// Wave sizing, pacing and difficulty scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Enemies in every wave before scaling.
    pub base_enemies: u32,
    /// Upper bound (inclusive) of the random extra enemies per wave.
    pub max_extra_enemies: u32,
    /// Delay before wave 1 after `start`.
    pub first_wave_delay: f32,
    /// Delay between a wave completing and the next one starting.
    pub next_wave_delay: f32,
    /// Spawn interval for wave 0.
    pub base_spawn_interval: f32,
    /// Spawn interval reduction per wave.
    pub spawn_interval_step: f32,
    /// Spawn interval floor.
    pub min_spawn_interval: f32,
    /// Enemy health added per wave.
    pub health_per_wave: f32,
    /// Enemy damage added per wave.
    pub damage_per_wave: f32,
    /// Enemy speed added per wave.
    pub speed_per_wave: f32,
    /// Score bonus per wave number on completion.
    pub completion_bonus_per_wave: u64,
    /// Spawn distance from the player for wave 0.
    pub spawn_radius: f32,
    /// Spawn distance added per wave.
    pub spawn_radius_per_wave: f32,
    /// Width of the spawn fan in front of the player (radians).
    pub spawn_fan_angle: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            base_enemies: 3,
            max_extra_enemies: 2,
            first_wave_delay: 2.0,
            next_wave_delay: 3.0,
            base_spawn_interval: 2.0,
            spawn_interval_step: 0.1,
            min_spawn_interval: 0.5,
            health_per_wave: 8.0,
            damage_per_wave: 1.5,
            speed_per_wave: 0.05,
            completion_bonus_per_wave: 50,
            spawn_radius: 18.0,
            spawn_radius_per_wave: 0.5,
            spawn_fan_angle: std::f32::consts::FRAC_PI_3 * 2.0,
        }
    }
}

/// Base enemy stats and behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Health before wave scaling and kind multipliers.
    pub base_health: f32,
    /// Attack damage before wave scaling and kind multipliers.
    pub base_damage: f32,
    /// Speed before wave scaling and kind multipliers.
    pub base_speed: f32,
    /// Attack range.
    pub attack_range: f32,
    /// Seconds between attacks.
    pub attack_cooldown: f32,
    /// Minimum `dot(forward, toPlayer)` for an enemy to attack.
    pub attack_facing_dot: f32,
    /// Turn rate toward the player (slerp factor per second).
    pub turn_rate: f32,
    /// Enemies stop advancing at `attack_range * stop_distance_factor`.
    pub stop_distance_factor: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            base_health: 30.0,
            base_damage: 8.0,
            base_speed: 1.5,
            attack_range: 2.5,
            attack_cooldown: 1.5,
            attack_facing_dot: 0.5,
            turn_rate: 4.0,
            stop_distance_factor: 0.8,
        }
    }
}

/// Target selection, lock-on and aim assist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingConfig {
    /// Seconds of simulation time between target evaluations.
    pub evaluation_interval: f32,
    /// A held target is kept while within `lock_distance * keep_range_factor`.
    pub keep_range_factor: f32,
    /// Score assigned to a kept target. Reported only; the keep decision does
    /// not compare it against fresh candidates.
    pub keep_score: f32,
    /// Global multiplier on lock progression.
    pub lock_rate_scale: f32,
    /// How much enemy lock difficulty slows progression.
    pub difficulty_slowdown: f32,
    /// Minimum seconds between lock cues for the same target.
    pub lock_cue_cooldown: f32,
    /// Base aim-assist slerp rate.
    pub aim_assist_rate: f32,
    /// Aim-assist factor once locked (otherwise current progress is used).
    pub locked_assist_factor: f32,
    /// Score multiplier for the weapon's preferred kind.
    pub preferred_bonus: f32,
    /// Score multiplier for other kinds when a preference is set.
    pub non_preferred_penalty: f32,
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            evaluation_interval: 0.1,
            keep_range_factor: 1.2,
            keep_score: 1_000.0,
            lock_rate_scale: 2.0,
            difficulty_slowdown: 0.7,
            lock_cue_cooldown: 2.0,
            aim_assist_rate: 3.0,
            locked_assist_factor: 1.5,
            preferred_bonus: 1.5,
            non_preferred_penalty: 0.5,
        }
    }
}

/// Projectile collision and homing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Hit radius for unguided projectiles.
    pub hit_radius: f32,
    /// Hit radius for guided projectiles.
    pub guided_hit_radius: f32,
    /// Homing turn strength (lerp factor per second).
    pub homing_strength: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            hit_radius: 0.6,
            guided_hit_radius: 1.2,
            homing_strength: 6.0,
        }
    }
}

/// Score awards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Score per enemy killed.
    pub kill_score: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { kill_score: 100 }
    }
}

/// Bomb / special charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BombConfig {
    /// Damage to every enemy in the blast.
    pub damage: f32,
    /// Blast radius around the player.
    pub radius: f32,
    /// A charge is granted every this many projectile kills.
    pub kills_per_charge: u32,
    /// Charge cap.
    pub max_charges: u32,
}

impl Default for BombConfig {
    fn default() -> Self {
        Self {
            damage: 200.0,
            radius: 12.0,
            kills_per_charge: 25,
            max_charges: 3,
        }
    }
}

/// Complete combat configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Player section.
    pub player: PlayerConfig,
    /// Default weapon loadout.
    pub weapon: WeaponConfig,
    /// Wave section.
    pub wave: WaveConfig,
    /// Enemy section.
    pub enemy: EnemyConfig,
    /// Targeting section.
    pub targeting: TargetingConfig,
    /// Projectile section.
    pub projectile: ProjectileConfig,
    /// Scoring section.
    pub scoring: ScoringConfig,
    /// Bomb section.
    pub bomb: BombConfig,
}

fn require(ok: bool, field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason })
    }
}

impl CombatConfig {
    /// Parses a JSON document and validates it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed JSON, [`ConfigError::Invalid`] if a
    /// value is out of range.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value against its valid domain.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        const POSITIVE: &str = "must be positive";
        const NON_NEGATIVE: &str = "must not be negative";

        require(self.player.max_health > 0.0, "player.max_health", POSITIVE)?;
        require(self.player.regen_delay >= 0.0, "player.regen_delay", NON_NEGATIVE)?;
        require(self.player.regen_rate >= 0.0, "player.regen_rate", NON_NEGATIVE)?;

        require(self.weapon.max_ammo > 0, "weapon.max_ammo", POSITIVE)?;
        require(self.weapon.fire_rate >= 0.0, "weapon.fire_rate", NON_NEGATIVE)?;
        require(self.weapon.reload_duration >= 0.0, "weapon.reload_duration", NON_NEGATIVE)?;
        require(self.weapon.projectile_speed > 0.0, "weapon.projectile_speed", POSITIVE)?;
        require(self.weapon.projectile_lifetime > 0.0, "weapon.projectile_lifetime", POSITIVE)?;

        require(self.wave.min_spawn_interval > 0.0, "wave.min_spawn_interval", POSITIVE)?;
        require(
            self.wave.base_spawn_interval >= self.wave.min_spawn_interval,
            "wave.base_spawn_interval",
            "must not be below wave.min_spawn_interval",
        )?;
        require(self.wave.next_wave_delay >= 0.0, "wave.next_wave_delay", NON_NEGATIVE)?;
        require(self.wave.first_wave_delay >= 0.0, "wave.first_wave_delay", NON_NEGATIVE)?;
        require(self.wave.spawn_radius > 0.0, "wave.spawn_radius", POSITIVE)?;

        require(self.enemy.base_health > 0.0, "enemy.base_health", POSITIVE)?;
        require(self.enemy.attack_range > 0.0, "enemy.attack_range", POSITIVE)?;
        require(
            (-1.0..=1.0).contains(&self.enemy.attack_facing_dot),
            "enemy.attack_facing_dot",
            "must be within [-1, 1]",
        )?;

        require(
            self.targeting.evaluation_interval > 0.0,
            "targeting.evaluation_interval",
            POSITIVE,
        )?;
        require(
            self.targeting.keep_range_factor >= 1.0,
            "targeting.keep_range_factor",
            "must be at least 1",
        )?;

        require(self.projectile.hit_radius > 0.0, "projectile.hit_radius", POSITIVE)?;
        require(
            self.projectile.guided_hit_radius >= self.projectile.hit_radius,
            "projectile.guided_hit_radius",
            "must not be below projectile.hit_radius",
        )?;
        require(
            self.projectile.homing_strength >= 0.0,
            "projectile.homing_strength",
            NON_NEGATIVE,
        )?;

        require(self.bomb.radius > 0.0, "bomb.radius", POSITIVE)?;
        require(self.bomb.kills_per_charge > 0, "bomb.kills_per_charge", POSITIVE)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        CombatConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = CombatConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CombatConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config =
            CombatConfig::from_json_str(r#"{ "targeting": { "evaluation_interval": 0.25 } }"#)
                .unwrap();
        assert_eq!(config.targeting.evaluation_interval, 0.25);
        assert_eq!(config.targeting.keep_range_factor, 1.2);
        assert_eq!(config.player, PlayerConfig::default());
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = CombatConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn guided_radius_below_regular_is_rejected() {
        let err = CombatConfig::from_json_str(
            r#"{ "projectile": { "hit_radius": 1.0, "guided_hit_radius": 0.5 } }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "projectile.guided_hit_radius",
                ..
            }
        ));
    }

    #[test]
    fn spawn_interval_floor_is_enforced() {
        let mut config = CombatConfig::default();
        config.wave.min_spawn_interval = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn serialization_roundtrip() {
        let config = CombatConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(CombatConfig::from_json_str(&json).unwrap(), config);
    }
}
