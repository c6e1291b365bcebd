//! Eight-way compass directions in screen space.
//!
//! Angles are counter-clockwise degrees with 0 pointing right and 90
//! pointing up (towards smaller `y`).

use core::f64::consts::PI;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Right,
    UpRight,
    Up,
    UpLeft,
    Left,
    DownLeft,
    Down,
    DownRight,
}

impl Direction {
    /// Counter-clockwise order starting at `Right`.
    pub const ALL: [Self; 8] = [
        Self::Right,
        Self::UpRight,
        Self::Up,
        Self::UpLeft,
        Self::Left,
        Self::DownLeft,
        Self::Down,
        Self::DownRight,
    ];

    const fn index(self) -> usize {
        self as usize
    }

    pub const fn degrees(self) -> u16 {
        self.index() as u16 * 45
    }

    pub const fn from_degrees(degrees: u16) -> Option<Self> {
        if degrees % 45 != 0 || degrees >= 360 {
            return None;
        }
        Some(Self::ALL[(degrees / 45) as usize])
    }

    /// One step counter-clockwise (+45°).
    pub const fn rotated_ccw(self) -> Self {
        Self::ALL[(self.index() + 1) % 8]
    }

    /// One step clockwise (−45°).
    pub const fn rotated_cw(self) -> Self {
        Self::ALL[(self.index() + 7) % 8]
    }

    /// Nearest compass direction to a bearing in degrees.
    ///
    /// Each direction owns the half-open sector `[d - 22.5, d + 22.5)`, so
    /// 22.5° maps to `UpRight` and 359.9° wraps to `Right`.
    pub fn from_bearing(degrees: f64) -> Self {
        let normalized = libm::fmod(degrees, 360.0);
        let normalized = if normalized < 0.0 { normalized + 360.0 } else { normalized };
        let sector = libm::floor((normalized + 22.5) / 45.0) as usize % 8;
        Self::ALL[sector]
    }

    /// Bearing from `from` to `to`, both in screen coordinates.
    pub fn towards(from: (i32, i32), to: (i32, i32)) -> Self {
        let dx = f64::from(to.0 - from.0);
        // Screen y grows downwards; flip it so 90° is up.
        let dy = f64::from(from.1 - to.1);
        Self::from_bearing(libm::atan2(dy, dx) * 180.0 / PI)
    }

    /// Per-tick displacement at `speed`, truncated towards zero.
    pub fn step(self, speed: i32) -> (i32, i32) {
        let radians = f64::from(self.degrees()) * PI / 180.0;
        let speed = f64::from(speed);
        let dx = (speed * libm::cos(radians)) as i32;
        let dy = (speed * libm::sin(radians)) as i32;
        (dx, -dy)
    }

    /// Unit offset of the cannon tip, as drawn on screen.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Right => (1, 0),
            Self::UpRight => (1, -1),
            Self::Up => (0, -1),
            Self::UpLeft => (-1, -1),
            Self::Left => (-1, 0),
            Self::DownLeft => (-1, 1),
            Self::Down => (0, 1),
            Self::DownRight => (1, 1),
        }
    }
}
