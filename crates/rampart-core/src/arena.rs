//! Arena: the combat entity store.
//!
//! The Arena is the container for all weapons, enemies and projectiles. It provides:
//! - Entity storage with deterministic iteration order (`BTreeMap`)
//! - Spatial indexing for proximity queries
//! - Entity lifecycle management (spawn, deferred removal, despawn)
//!
//! # Architecture
//!
//! The Arena uses a `BTreeMap` for entity storage so iteration order is the
//! id order. Entity IDs are monotonically increasing and never reused, which
//! makes "scan order" well-defined for tie-breaks and keeps stale ids harmless.
//!
//! # Deferred Removal
//!
//! Systems never despawn while iterating. They call
//! [`Arena::mark_for_removal`]; the simulation drains the queue with
//! [`Arena::drain_removals`] at the end of the tick.
//!
//! # Spatial Index Synchronization
//!
//! The spatial index is NOT automatically synchronized when a position is
//! changed through [`Entity::transform_mut`]. Call [`Arena::update_spatial`]
//! afterward, or use [`Arena::set_transform`], which does both.
//!
//! # Example
//!
//! ```
//! use rampart_core::arena::Arena;
//! use rampart_core::entity::{EntityInner, EnemyKind, EnemyState, Transform};
//! use glam::Vec3;
//!
//! let mut arena = Arena::new();
//! let enemy = EnemyState::new(EnemyKind::Soldier, 30.0, 5.0, 1.0);
//! let id = arena.spawn(EntityInner::Enemy(enemy), Transform::at(Vec3::new(1.0, 0.0, 2.0)));
//!
//! let nearby = arena.spatial().query_radius(Vec3::ZERO, 5.0);
//! assert!(nearby.contains(&id));
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, EntityInner, EntityTag, Transform};

// =============================================================================
// Spatial Index
// =============================================================================

/// Simple spatial index for proximity queries.
///
/// Positions are kept in a `HashMap`; radius queries are a full scan.
/// Enemy counts per wave are small, so this is adequate.
///
/// # Note on `HashMap` Usage
///
/// The non-deterministic iteration order of `HashMap` never leaks out:
/// [`SpatialIndex::query_radius`] sorts its results by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpatialIndex {
    positions: HashMap<EntityId, Vec3>,
}

impl SpatialIndex {
    /// Creates a new empty spatial index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
        }
    }

    /// Inserts or updates an entity's position in the index.
    pub fn insert(&mut self, id: EntityId, pos: Vec3) {
        self.positions.insert(id, pos);
    }

    /// Removes an entity from the spatial index.
    pub fn remove(&mut self, id: EntityId) {
        self.positions.remove(&id);
    }

    /// Returns the position of an entity, if known.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<Vec3> {
        self.positions.get(&id).copied()
    }

    /// Queries for entities within `radius` of `center` (inclusive).
    ///
    /// Returns entity IDs sorted by ID.
    #[must_use]
    pub fn query_radius(&self, center: Vec3, radius: f32) -> Vec<EntityId> {
        let radius_sq = radius * radius;
        let mut results: Vec<EntityId> = self
            .positions
            .iter()
            .filter(|(_, pos)| center.distance_squared(**pos) <= radius_sq)
            .map(|(id, _)| *id)
            .collect();

        results.sort();
        results
    }

    /// Returns the number of entities in the spatial index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if the spatial index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Combat entity store.
///
/// # Example
///
/// ```
/// use rampart_core::arena::Arena;
/// use rampart_core::entity::{EntityInner, EnemyKind, EnemyState, Transform};
///
/// let mut arena = Arena::new();
/// let a = arena.spawn(
///     EntityInner::Enemy(EnemyState::new(EnemyKind::Drone, 10.0, 1.0, 1.0)),
///     Transform::default(),
/// );
/// let b = arena.spawn(
///     EntityInner::Enemy(EnemyState::new(EnemyKind::Brute, 10.0, 1.0, 1.0)),
///     Transform::default(),
/// );
///
/// let ids: Vec<_> = arena.entity_ids_sorted().collect();
/// assert_eq!(ids, vec![a, b]);
///
/// arena.mark_for_removal(a);
/// assert!(arena.get(a).is_some());
/// assert_eq!(arena.drain_removals(), vec![a]);
/// assert!(arena.get(a).is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arena {
    /// Monotonically increasing entity ID counter.
    next_id: u64,
    /// Entity storage with deterministic iteration order.
    entities: BTreeMap<EntityId, Entity>,
    /// Spatial index for proximity queries.
    spatial: SpatialIndex,
    /// Entities flagged for removal at the end of the tick.
    pending_removal: BTreeSet<EntityId>,
    /// Current simulation tick.
    tick: u64,
}

impl Arena {
    /// Creates a new empty arena at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a new entity and returns its id.
    ///
    /// The entity is added to both the entity map and the spatial index.
    pub fn spawn(&mut self, inner: EntityInner, transform: Transform) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;

        self.spatial.insert(id, transform.position);
        self.entities.insert(id, Entity::new(id, inner, transform));
        id
    }

    /// Removes an entity immediately.
    ///
    /// Simulation code should prefer [`Arena::mark_for_removal`]; this is the
    /// primitive the end-of-tick sweep uses.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.spatial.remove(id);
        self.pending_removal.remove(&id);
        self.entities.remove(&id)
    }

    /// Flags an entity for removal at the end of the tick.
    ///
    /// Returns `false` if the entity does not exist or is already flagged.
    pub fn mark_for_removal(&mut self, id: EntityId) -> bool {
        if !self.entities.contains_key(&id) {
            return false;
        }
        self.pending_removal.insert(id)
    }

    /// Whether an entity is flagged for removal.
    #[must_use]
    pub fn is_pending_removal(&self, id: EntityId) -> bool {
        self.pending_removal.contains(&id)
    }

    /// Number of entities flagged for removal.
    #[must_use]
    pub fn pending_removal_count(&self) -> usize {
        self.pending_removal.len()
    }

    /// Despawns every flagged entity, returning their ids in id order.
    pub fn drain_removals(&mut self) -> Vec<EntityId> {
        let ids: Vec<EntityId> = std::mem::take(&mut self.pending_removal).into_iter().collect();
        for id in &ids {
            self.spatial.remove(*id);
            self.entities.remove(id);
        }
        ids
    }

    /// Returns a reference to an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns a mutable reference to an entity by ID.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Returns an iterator over entity IDs in deterministic (sorted) order.
    pub fn entity_ids_sorted(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Returns an iterator over entities in deterministic (sorted by ID) order.
    pub fn entities_sorted(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Returns an iterator over mutable entities in deterministic order.
    pub fn entities_sorted_mut(&mut self) -> impl Iterator<Item = &mut Entity> + '_ {
        self.entities.values_mut()
    }

    /// Collects the ids of all entities with `tag`, in id order.
    #[must_use]
    pub fn ids_with_tag(&self, tag: EntityTag) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.tag() == tag)
            .map(Entity::id)
            .collect()
    }

    /// Iterates living enemies in id order.
    pub fn living_enemies(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values().filter(|e| e.is_living_enemy())
    }

    /// Number of living enemies.
    #[must_use]
    pub fn living_enemy_count(&self) -> usize {
        self.living_enemies().count()
    }

    /// Whether `id` refers to an enemy that exists and is alive.
    #[must_use]
    pub fn is_living_enemy(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(Entity::is_living_enemy)
    }

    /// Replaces an entity's transform and syncs the spatial index.
    ///
    /// Returns `false` if the entity does not exist.
    pub fn set_transform(&mut self, id: EntityId, transform: Transform) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };
        *entity.transform_mut() = transform;
        self.spatial.insert(id, transform.position);
        true
    }

    /// Returns the number of entities in the arena.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the arena has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns a reference to the spatial index.
    #[must_use]
    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// Returns the current simulation tick.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Advances the simulation tick counter.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }

    /// Updates the spatial index for an entity.
    ///
    /// Call this after modifying an entity's position to keep the spatial
    /// index in sync.
    pub fn update_spatial(&mut self, id: EntityId) {
        if let Some(entity) = self.entities.get(&id) {
            self.spatial.insert(id, entity.transform().position);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
