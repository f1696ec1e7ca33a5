use serde::{Deserialize, Serialize};

pub const DEFAULT_PLAYER_AGE: u32 = 18;

/// Identity attributes of the person playing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub age: u32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: DEFAULT_PLAYER_AGE,
        }
    }
}

/// A single typed write to one player attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerUpdate {
    Name(String),
    Age(u32),
}

impl Player {
    pub fn apply(&mut self, update: PlayerUpdate) {
        match update {
            PlayerUpdate::Name(name) => self.name = name.trim().to_string(),
            PlayerUpdate::Age(age) => self.age = age,
        }
    }

    /// True once a non-blank name has been entered.
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let player = Player::default();
        assert_eq!(player.name, "");
        assert_eq!(player.age, 18);
        assert!(!player.has_name());
    }

    #[test]
    fn updates_are_typed() {
        let mut player = Player::default();
        player.apply(PlayerUpdate::Name("  Aiko ".to_string()));
        player.apply(PlayerUpdate::Age(24));
        assert_eq!(player.name, "Aiko");
        assert_eq!(player.age, 24);
        assert!(player.has_name());
    }

    #[test]
    fn blank_name_does_not_count() {
        let mut player = Player::default();
        player.apply(PlayerUpdate::Name("   ".to_string()));
        assert!(!player.has_name());
    }
}
