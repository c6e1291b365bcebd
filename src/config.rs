//! Game-wide settings and tuning.

use crate::ir::PulsePolicy;

// ── Timing ──────────────────────────────────────────────────────────────────

/// Length of one simulation tick in milliseconds.
pub const TICK_MS: u64 = 40;

/// The IR watchdog abandons a partial frame after this long without an edge.
pub const WATCHDOG_MS: u64 = 40;

// ── Tuning ──────────────────────────────────────────────────────────────────

/// Ticks the player has to wait between shots.
pub const FIRE_COOLDOWN: u32 = 25;
/// Projectiles in flight at once, both owners combined.
pub const MAX_PROJECTILES: usize = 5;
/// Half-width of the square hit box used for all collisions.
pub const HIT_BOX: i32 = 8;
/// Accelerometer readings are clamped to `[-MAX_TILT, MAX_TILT]` pixels per tick.
pub const MAX_TILT: i32 = 3;
/// Speed of enemy projectiles, independent of difficulty.
pub const HOSTILE_PROJECTILE_SPEED: i32 = 10;

/// Runtime settings shared by the scenes and the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GameConfig {
    /// Playfield width in pixels.
    pub width: i32,
    /// Playfield height in pixels.
    pub height: i32,
    /// Name submitted alongside a new high score.
    pub player_name: &'static str,
    /// How the IR decoder treats pulse widths outside both bit windows.
    pub pulse_policy: PulsePolicy,
}

impl GameConfig {
    pub const DEFAULT: Self = Self {
        width: 128,
        height: 128,
        player_name: "nadav",
        pulse_policy: PulsePolicy::Lenient,
    };

    #[must_use]
    pub const fn with_player_name(mut self, name: &'static str) -> Self {
        self.player_name = name;
        self
    }

    #[must_use]
    pub const fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub const fn with_pulse_policy(mut self, policy: PulsePolicy) -> Self {
        self.pulse_policy = policy;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Enemy fire rate and player projectile speed, chosen in the difficulty menu.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Ticks an enemy waits between shots.
    pub const fn enemy_cooldown(self) -> u32 {
        match self {
            Self::Easy => 25,
            Self::Medium => 15,
            Self::Hard => 5,
        }
    }

    /// Pixels per tick travelled by the player's projectiles.
    pub const fn projectile_speed(self) -> i32 {
        match self {
            Self::Easy => 10,
            Self::Medium => 15,
            Self::Hard => 25,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "EASY",
            Self::Medium => "MEDIUM",
            Self::Hard => "HARD",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_table() {
        let table = Difficulty::ALL.map(|d| (d.enemy_cooldown(), d.projectile_speed()));
        assert_eq!(table, [(25, 10), (15, 15), (5, 25)]);
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = GameConfig::DEFAULT
            .with_size(160, 120)
            .with_player_name("ace")
            .with_pulse_policy(PulsePolicy::Strict);
        assert_eq!((config.width, config.height), (160, 120));
        assert_eq!(config.player_name, "ace");
        assert_eq!(config.pulse_policy, PulsePolicy::Strict);
        assert_eq!(GameConfig::default(), GameConfig::DEFAULT);
    }
}
