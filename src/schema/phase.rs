use serde::{Deserialize, Serialize};

/// Session-level state of a play-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppPhase {
    /// Player identity is being entered.
    #[default]
    Setup,
    Playing,
    Paused,
    Menu,
    /// No scene is left to show.
    Complete,
}

impl AppPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Menu => "menu",
            Self::Complete => "complete",
        }
    }

    /// Paused and menu phases suspend turn processing.
    pub fn accepts_turns(&self) -> bool {
        !matches!(self, Self::Paused | Self::Menu)
    }

    pub fn is_suspended(&self) -> bool {
        !self.accepts_turns()
    }
}
