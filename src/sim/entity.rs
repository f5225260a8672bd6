//! Dynamic actors and the registry that owns them
//!
//! Removal is lazy: killing an entity only sets `dead`. Iteration skips dead
//! entries, and the registry is compacted once per tick after every
//! interaction has been evaluated, so indices stay stable within a tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Body;

/// Cosmetic variant of a ground enemy (behaviour is identical)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnemyVariant {
    #[default]
    Goomba,
    Koopa,
    Rex,
}

/// Entity type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    GroundEnemy(EnemyVariant),
    Mushroom,
    FireFlower,
    Fireball,
    /// The flag on the goal pole, animated during the completion sequence
    Flag,
}

impl EntityKind {
    pub fn is_enemy(self) -> bool {
        matches!(self, EntityKind::GroundEnemy(_))
    }

    pub fn is_pickup(self) -> bool {
        matches!(self, EntityKind::Mushroom | EntityKind::FireFlower)
    }
}

/// Horizontal facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// -1 for left, +1 for right
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Facing from a signed direction (non-negative is right)
    pub fn from_sign(sign: f32) -> Self {
        if sign < 0.0 { Facing::Left } else { Facing::Right }
    }
}

/// Behaviour-specific state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Behavior {
    #[default]
    Active,
    /// Rising out of a block; inert until the countdown expires
    Spawning { frames_left: u32 },
}

pub type EntityId = u32;

/// A dynamic actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub body: Body,
    pub facing: Facing,
    pub behavior: Behavior,
    /// Lazy-removal marker
    pub dead: bool,
}

impl Entity {
    /// Create an entity with id 0; the registry assigns the real id on spawn
    pub fn new(kind: EntityKind, pos: Vec2, size: Vec2) -> Self {
        Self {
            id: 0,
            kind,
            body: Body::new(pos, size),
            facing: Facing::Right,
            behavior: Behavior::Active,
            dead: false,
        }
    }

    pub fn is_spawning(&self) -> bool {
        matches!(self.behavior, Behavior::Spawning { .. })
    }
}

/// Ordered owner of every live entity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
    next_id: EntityId,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    /// Append an entity, assigning it a fresh id
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        entity.id = id;
        self.entities.push(entity);
        id
    }

    /// Append an entity keeping its authored id (level load). Later spawns
    /// never reuse it.
    pub fn insert(&mut self, entity: Entity) {
        self.next_id = self.next_id.max(entity.id + 1);
        self.entities.push(entity);
    }

    pub fn alive(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| !e.dead)
    }

    pub fn for_each_alive(&mut self, mut f: impl FnMut(&mut Entity)) {
        for entity in self.entities.iter_mut().filter(|e| !e.dead) {
            f(entity);
        }
    }

    pub fn count_alive(&self, kind: EntityKind) -> usize {
        self.alive().filter(|e| e.kind == kind).count()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Drop dead entities. Only call between ticks' interaction passes.
    pub fn compact(&mut self) {
        self.entities.retain(|e| !e.dead);
    }

    /// Every slot, including dead ones not yet compacted
    pub fn slots(&self) -> &[Entity] {
        &self.entities
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
