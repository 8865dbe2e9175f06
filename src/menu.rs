//! Sign selection menu state

/// Open/closed state of the sign menu
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuState {
    open: bool,
}

impl MenuState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Flip open/closed; returns the new state
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }
}
