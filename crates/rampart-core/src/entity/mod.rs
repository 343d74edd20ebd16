//! Entity types for the combat entity store.
//!
//! This module provides the core entity types:
//! - [`EntityId`]: Stable identifier for entities
//! - [`EntityTag`]: Kind classification used for queries
//! - [`EntityInner`]: Type-safe storage for kind-specific state
//! - [`Entity`]: The complete entity container (id, kind state, transform)
//!
//! The player is not an entity; it is a singleton record owned by
//! [`World`](crate::world::World).
//!
//! # Example
//!
//! ```
//! use rampart_core::entity::{Entity, EntityId, EntityInner, EntityTag};
//! use rampart_core::entity::components::{EnemyKind, EnemyState, Transform};
//!
//! let enemy = Entity::new(
//!     EntityId::new(42),
//!     EntityInner::Enemy(EnemyState::new(EnemyKind::Soldier, 30.0, 5.0, 1.0)),
//!     Transform::default(),
//! );
//!
//! assert_eq!(enemy.id().as_u64(), 42);
//! assert_eq!(enemy.tag(), EntityTag::Enemy);
//! ```

pub mod components;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use components::{
    DamageOutcome, EnemyKind, EnemyState, PlayerState, ProjectileState, StatusFlags, TargetLock,
    Targeting, TargetingProfile, Transform, TypeFilter, WeaponState,
};

/// Unique identifier for an entity.
///
/// `EntityId` is a newtype wrapper around `u64`. Ids are assigned
/// monotonically by the arena and never reused, so a stale id can only ever
/// miss; it can never alias a newer entity.
///
/// # Ordering
///
/// Entity IDs are ordered by their numeric value, which is used to ensure
/// deterministic iteration order across all entities.
///
/// # Example
///
/// ```
/// use rampart_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Entity kind tag.
///
/// Derived from the [`EntityInner`] variant, so the two can never disagree.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// A player weapon (gun, launcher).
    Weapon,
    /// A hostile unit.
    Enemy,
    /// An in-flight round or missile.
    Projectile,
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weapon => write!(f, "Weapon"),
            Self::Enemy => write!(f, "Enemy"),
            Self::Projectile => write!(f, "Projectile"),
        }
    }
}

/// Type-safe storage for kind-specific state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityInner {
    /// Weapon state.
    Weapon(WeaponState),
    /// Enemy state.
    Enemy(EnemyState),
    /// Projectile state.
    Projectile(ProjectileState),
}

impl EntityInner {
    /// Returns the corresponding `EntityTag` for this inner storage.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        match self {
            Self::Weapon(_) => EntityTag::Weapon,
            Self::Enemy(_) => EntityTag::Enemy,
            Self::Projectile(_) => EntityTag::Projectile,
        }
    }
}

/// A complete entity in the combat store.
///
/// # Invariants
///
/// - The `EntityId` is unique within an arena
/// - The tag always matches the inner variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    inner: EntityInner,
    transform: Transform,
}

impl Entity {
    /// Creates a new entity.
    #[must_use]
    pub const fn new(id: EntityId, inner: EntityInner, transform: Transform) -> Self {
        Self {
            id,
            inner,
            transform,
        }
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's kind tag.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        self.inner.tag()
    }

    /// Returns a reference to the kind-specific state.
    #[must_use]
    pub const fn inner(&self) -> &EntityInner {
        &self.inner
    }

    /// Returns the world transform.
    #[must_use]
    pub const fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Returns the world transform mutably.
    ///
    /// Position changes made through this reference must be followed by
    /// [`Arena::update_spatial`](crate::arena::Arena::update_spatial).
    #[must_use]
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Returns the weapon state if this is a weapon.
    #[must_use]
    pub const fn as_weapon(&self) -> Option<&WeaponState> {
        match &self.inner {
            EntityInner::Weapon(w) => Some(w),
            _ => None,
        }
    }

    /// Returns mutable weapon state if this is a weapon.
    #[must_use]
    pub fn as_weapon_mut(&mut self) -> Option<&mut WeaponState> {
        match &mut self.inner {
            EntityInner::Weapon(w) => Some(w),
            _ => None,
        }
    }

    /// Returns the enemy state if this is an enemy.
    #[must_use]
    pub const fn as_enemy(&self) -> Option<&EnemyState> {
        match &self.inner {
            EntityInner::Enemy(e) => Some(e),
            _ => None,
        }
    }

    /// Returns mutable enemy state if this is an enemy.
    #[must_use]
    pub fn as_enemy_mut(&mut self) -> Option<&mut EnemyState> {
        match &mut self.inner {
            EntityInner::Enemy(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the projectile state if this is a projectile.
    #[must_use]
    pub const fn as_projectile(&self) -> Option<&ProjectileState> {
        match &self.inner {
            EntityInner::Projectile(p) => Some(p),
            _ => None,
        }
    }

    /// Returns mutable projectile state if this is a projectile.
    #[must_use]
    pub fn as_projectile_mut(&mut self) -> Option<&mut ProjectileState> {
        match &mut self.inner {
            EntityInner::Projectile(p) => Some(p),
            _ => None,
        }
    }

    /// Returns `true` if this is an enemy that is still alive.
    #[must_use]
    pub fn is_living_enemy(&self) -> bool {
        self.as_enemy().is_some_and(EnemyState::is_alive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod entity_id_tests {
        use super::*;

        #[test]
        fn new_creates_id_with_value() {
            let id = EntityId::new(42);
            assert_eq!(id.as_u64(), 42);
        }

        #[test]
        fn ordering() {
            let mut ids = vec![EntityId::new(3), EntityId::new(1), EntityId::new(2)];
            ids.sort();
            assert_eq!(ids, vec![EntityId::new(1), EntityId::new(2), EntityId::new(3)]);
        }

        #[test]
        fn conversions() {
            let id: EntityId = 7u64.into();
            let raw: u64 = id.into();
            assert_eq!(raw, 7);
            assert_eq!(format!("{id:?}"), "EntityId(7)");
            assert_eq!(format!("{id}"), "7");
        }
    }

    mod entity_tests {
        use super::*;
        use crate::config::WeaponConfig;
        use glam::Vec3;

        fn enemy(id: u64) -> Entity {
            Entity::new(
                EntityId::new(id),
                EntityInner::Enemy(EnemyState::new(EnemyKind::Drone, 10.0, 1.0, 1.0)),
                Transform::at(Vec3::ONE),
            )
        }

        #[test]
        fn tag_follows_inner() {
            let weapon = Entity::new(
                EntityId::new(0),
                EntityInner::Weapon(WeaponState::from_config(&WeaponConfig::default())),
                Transform::default(),
            );
            assert_eq!(weapon.tag(), EntityTag::Weapon);
            assert!(weapon.as_weapon().is_some());
            assert!(weapon.as_enemy().is_none());
            assert!(!weapon.is_living_enemy());
        }

        #[test]
        fn living_enemy_tracks_death() {
            let mut e = enemy(1);
            assert!(e.is_living_enemy());
            e.as_enemy_mut().unwrap().apply_damage(100.0);
            assert!(!e.is_living_enemy());
            assert!(e.as_enemy().is_some());
        }

        #[test]
        fn transform_is_mutable() {
            let mut e = enemy(1);
            e.transform_mut().position = Vec3::new(5.0, 0.0, 0.0);
            assert_eq!(e.transform().position, Vec3::new(5.0, 0.0, 0.0));
        }

        #[test]
        fn serialization_roundtrip() {
            let e = enemy(9);
            let json = serde_json::to_string(&e).unwrap();
            let back: Entity = serde_json::from_str(&json).unwrap();
            assert_eq!(back, e);
        }
    }
}
