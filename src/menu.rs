//! Three-entry menus navigated with Left/Right and confirmed with Fire.

use crate::remote::Button;

/// Entries are numbered from 1.
pub const MENU_ENTRIES: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuEvent {
    /// Selection changed; only these two rows need redrawing.
    Moved { from: usize, to: usize },
    Confirmed(usize),
    /// Nothing changed.
    Idle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Menu {
    pub title: &'static str,
    pub labels: [&'static str; MENU_ENTRIES],
    selected: usize,
}

impl Menu {
    pub const fn new(title: &'static str, labels: [&'static str; MENU_ENTRIES]) -> Self {
        Self {
            title,
            labels,
            selected: 1,
        }
    }

    /// Start with `entry` highlighted (clamped to the valid range).
    #[must_use]
    pub fn with_selected(mut self, entry: usize) -> Self {
        self.selected = entry.clamp(1, MENU_ENTRIES);
        self
    }

    pub const fn selected(&self) -> usize {
        self.selected
    }

    pub fn handle(&mut self, press: Button) -> MenuEvent {
        let from = self.selected;
        let to = match press {
            Button::Left => from.saturating_sub(1).max(1),
            Button::Right => (from + 1).min(MENU_ENTRIES),
            Button::Fire => return MenuEvent::Confirmed(from),
            Button::None | Button::Unknown => return MenuEvent::Idle,
        };
        if to == from {
            return MenuEvent::Idle;
        }
        self.selected = to;
        MenuEvent::Moved { from, to }
    }
}
