//! One round of play: the player's tank, one enemy tank and the projectiles
//! between them.
//!
//! A [`Session`] is created when the Playing scene starts and dropped at game
//! over. It never touches hardware; input arrives as a [`TickInput`] and the
//! renderer diffs [`Session::snapshot`]s taken before and after each tick.

use rand::{
    Rng,
    SeedableRng,
    rngs::SmallRng,
};

use crate::{
    config::{
        Difficulty,
        FIRE_COOLDOWN,
        GameConfig,
        HOSTILE_PROJECTILE_SPEED,
        MAX_TILT,
    },
    direction::Direction,
    entities::{
        Enemy,
        Owner,
        Player,
        Projectile,
        ProjectilePool,
    },
    remote::Button,
};

// ── Playfield margins ───────────────────────────────────────────────────────
const PLAYER_MARGIN: i32 = 4;
/// Keeps the player clear of the score bar.
const PLAYER_TOP: i32 = 12;
const SPAWN_LEFT: i32 = 8;
const SPAWN_TOP: i32 = 16;
const SPAWN_MARGIN: i32 = 4;

/// Accelerometer reading for one tick, in raw sensor counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tilt {
    pub x: i8,
    pub y: i8,
}

impl Tilt {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// Pixels to move this tick, each axis clamped to `±MAX_TILT`.
    pub fn clamped(self) -> (i32, i32) {
        (
            i32::from(self.x).clamp(-MAX_TILT, MAX_TILT),
            i32::from(self.y).clamp(-MAX_TILT, MAX_TILT),
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickInput {
    /// A debounced press, if one arrived this tick.
    pub press: Option<Button>,
    pub tilt: Tilt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    Continue,
    /// A hostile projectile reached the player.
    PlayerHit,
}

/// Everything the renderer needs to erase and redraw a tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub player: Player,
    pub enemy: Enemy,
    pub projectiles: ProjectilePool,
    pub score: u32,
}

pub struct Session {
    pub player: Player,
    pub enemy: Enemy,
    pub projectiles: ProjectilePool,
    pub score: u32,
    difficulty: Difficulty,
    width: i32,
    height: i32,
    /// Ticks since the player's last shot, saturating at `FIRE_COOLDOWN`.
    player_cooldown: u32,
    respawn_pending: bool,
    rng: SmallRng,
}

impl Session {
    /// Start a round with the player centred and an enemy at a random spot.
    pub fn new(config: &GameConfig, difficulty: Difficulty, seed: u64) -> Self {
        let mut session = Self {
            player: Player {
                x: config.width / 2,
                y: config.height / 2,
                facing: Direction::UpRight,
            },
            enemy: Enemy::new(0, 0, difficulty.enemy_cooldown()),
            projectiles: ProjectilePool::new(),
            score: 0,
            difficulty,
            width: config.width,
            height: config.height,
            player_cooldown: FIRE_COOLDOWN,
            respawn_pending: false,
            rng: SmallRng::seed_from_u64(seed),
        };
        session.spawn_enemy();
        session
    }

    /// Replace the enemy with one at a fixed position.
    pub fn place_enemy(&mut self, x: i32, y: i32) {
        self.enemy = Enemy::new(x, y, self.difficulty.enemy_cooldown());
        self.enemy.facing = Direction::towards((x, y), (self.player.x, self.player.y));
        self.respawn_pending = false;
    }

    pub const fn respawn_pending(&self) -> bool {
        self.respawn_pending
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            player: self.player,
            enemy: self.enemy,
            projectiles: self.projectiles.clone(),
            score: self.score,
        }
    }

    /// Advance the round by one tick.
    pub fn tick(&mut self, input: TickInput) -> TickOutcome {
        if self.respawn_pending {
            self.spawn_enemy();
        }

        self.player_cooldown = (self.player_cooldown + 1).min(FIRE_COOLDOWN);
        match input.press {
            Some(Button::Left) => self.player.facing = self.player.facing.rotated_ccw(),
            Some(Button::Right) => self.player.facing = self.player.facing.rotated_cw(),
            Some(Button::Fire) => self.player_fire(),
            _ => {}
        }

        let (width, height) = (self.width, self.height);
        for projectile in self.projectiles.iter_mut() {
            projectile.advance();
        }
        self.projectiles.retain(|p| p.is_inside(width, height));

        self.update_enemy();
        self.move_player(input.tilt);
        self.resolve_hits()
    }

    fn player_fire(&mut self) {
        if self.player_cooldown < FIRE_COOLDOWN {
            return;
        }
        let shot = Projectile {
            x: self.player.x,
            y: self.player.y,
            direction: self.player.facing,
            owner: Owner::Friendly,
            speed: self.difficulty.projectile_speed(),
        };
        if self.projectiles.try_spawn(shot) {
            debug!("player fired {}", self.player.facing);
            self.player_cooldown = 0;
        }
    }

    fn update_enemy(&mut self) {
        if !self.enemy.alive {
            return;
        }
        let due = self.enemy.tick_cooldown();
        self.enemy.facing =
            Direction::towards((self.enemy.x, self.enemy.y), (self.player.x, self.player.y));

        if due {
            let shot = Projectile {
                x: self.enemy.x,
                y: self.enemy.y,
                direction: self.enemy.facing,
                owner: Owner::Hostile,
                speed: HOSTILE_PROJECTILE_SPEED,
            };
            if self.projectiles.try_spawn(shot) {
                self.enemy.ticks_since_fired = 0;
            }
        }
    }

    fn move_player(&mut self, tilt: Tilt) {
        let (dx, dy) = tilt.clamped();
        self.player.x = (self.player.x + dx).clamp(PLAYER_MARGIN, self.width - PLAYER_MARGIN);
        self.player.y = (self.player.y - dy).clamp(PLAYER_TOP, self.height - PLAYER_MARGIN);
    }

    fn resolve_hits(&mut self) -> TickOutcome {
        let mut i = 0;
        while let Some(projectile) = self.projectiles.get(i).copied() {
            match projectile.owner {
                Owner::Hostile if projectile.hits(self.player.x, self.player.y) => {
                    self.projectiles.remove(i);
                    info!("player hit, final score {=u32}", self.score);
                    return TickOutcome::PlayerHit;
                }
                Owner::Friendly
                    if self.enemy.alive && projectile.hits(self.enemy.x, self.enemy.y) =>
                {
                    self.projectiles.remove(i);
                    self.enemy.alive = false;
                    self.respawn_pending = true;
                    self.score += 1;
                    debug!("enemy destroyed, score {=u32}", self.score);
                }
                _ => i += 1,
            }
        }
        TickOutcome::Continue
    }

    fn spawn_enemy(&mut self) {
        let x = self.rng.gen_range(SPAWN_LEFT..self.width - SPAWN_MARGIN);
        let y = self.rng.gen_range(SPAWN_TOP..self.height - SPAWN_MARGIN);
        self.place_enemy(x, y);
        debug!("enemy spawned at ({=i32}, {=i32})", x, y);
    }
}
