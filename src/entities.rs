//! Tanks and projectiles.

use heapless::Vec;

use crate::{
    config::{
        HIT_BOX,
        MAX_PROJECTILES,
    },
    direction::Direction,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Owner {
    /// Fired by the player; hurts the enemy.
    Friendly,
    /// Fired by the enemy; hurts the player.
    Hostile,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Projectile {
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
    pub owner: Owner,
    pub speed: i32,
}

impl Projectile {
    pub fn advance(&mut self) {
        let (dx, dy) = self.direction.step(self.speed);
        self.x += dx;
        self.y += dy;
    }

    pub const fn is_inside(&self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.x < width && self.y >= 0 && self.y < height
    }

    /// Axis-aligned box test against a tank centred at `(x, y)`.
    pub const fn hits(&self, x: i32, y: i32) -> bool {
        (self.x - x).abs() < HIT_BOX && (self.y - y).abs() < HIT_BOX
    }
}

/// Projectiles in flight, oldest first.
///
/// Full pools drop new shots. Removal keeps the remaining projectiles in
/// their original order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectilePool {
    live: Vec<Projectile, MAX_PROJECTILES>,
}

impl ProjectilePool {
    pub const fn new() -> Self {
        Self { live: Vec::new() }
    }

    /// Add a projectile. Returns `false` (and drops it) when the pool is full.
    pub fn try_spawn(&mut self, projectile: Projectile) -> bool {
        self.live.push(projectile).is_ok()
    }

    pub fn remove(&mut self, index: usize) -> Projectile {
        self.live.remove(index)
    }

    /// Keep only the projectiles for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&Projectile) -> bool) {
        self.live.retain(keep);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.live.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Projectile> {
        self.live.iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&Projectile> {
        self.live.get(index)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.live.is_full()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Player {
    pub x: i32,
    pub y: i32,
    pub facing: Direction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Enemy {
    pub x: i32,
    pub y: i32,
    pub facing: Direction,
    /// Ticks between shots.
    pub cooldown_limit: u32,
    /// Saturates at `cooldown_limit`.
    pub ticks_since_fired: u32,
    pub alive: bool,
}

impl Enemy {
    pub const fn new(x: i32, y: i32, cooldown_limit: u32) -> Self {
        Self {
            x,
            y,
            facing: Direction::Left,
            cooldown_limit,
            ticks_since_fired: 0,
            alive: true,
        }
    }

    /// Advance the fire timer; true once a shot is due.
    pub fn tick_cooldown(&mut self) -> bool {
        self.ticks_since_fired = (self.ticks_since_fired + 1).min(self.cooldown_limit);
        self.ticks_since_fired >= self.cooldown_limit
    }
}
