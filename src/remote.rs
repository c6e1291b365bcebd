//! Maps decoded command words to game buttons.
//!
//! Only four codes of the remote are meaningful; everything else is
//! [`Button::Unknown`]. The remote keeps repeating a code while a key is
//! held, so callers turn levels into presses with a [`ButtonLatch`].

use crate::ir::RemoteFrame;

// ── Remote command codes ────────────────────────────────────────────────────

/// Sent between presses by the stock remote.
pub const CODE_BLANK: u32 = 4_211_384_160;
pub const CODE_LEFT: u32 = 3_125_124_960;
pub const CODE_FIRE: u32 = 4_010_844_000;
pub const CODE_RIGHT: u32 = 3_994_132_320;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    None,
    Left,
    Right,
    Fire,
    Unknown,
}

impl Button {
    pub const fn from_code(code: u32) -> Self {
        match code {
            CODE_BLANK => Self::None,
            CODE_LEFT => Self::Left,
            CODE_FIRE => Self::Fire,
            CODE_RIGHT => Self::Right,
            _ => Self::Unknown,
        }
    }

    /// True for the buttons the game reacts to.
    pub const fn is_press(self) -> bool {
        matches!(self, Self::Left | Self::Right | Self::Fire)
    }
}

impl From<RemoteFrame> for Button {
    fn from(frame: RemoteFrame) -> Self {
        Self::from_code(frame.code())
    }
}

impl From<Option<RemoteFrame>> for Button {
    fn from(frame: Option<RemoteFrame>) -> Self {
        frame.map_or(Self::None, Self::from)
    }
}

/// Edge detector for repeated remote codes.
///
/// A button fires on the first tick it is seen; it fires again only after a
/// tick without any recognised button.
#[derive(Clone, Copy, Debug, Default)]
pub struct ButtonLatch {
    held: bool,
}

impl ButtonLatch {
    pub const fn new() -> Self {
        Self { held: false }
    }

    /// Feed this tick's button; returns it only if it is a fresh press.
    pub fn update(&mut self, button: Button) -> Option<Button> {
        if !button.is_press() {
            self.held = false;
            return None;
        }
        if self.held {
            return None;
        }
        self.held = true;
        Some(button)
    }

    pub const fn is_held(&self) -> bool {
        self.held
    }
}
