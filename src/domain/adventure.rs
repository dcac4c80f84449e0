//! Role-play game state: health, inventory, location, game-over flag

use serde::{Deserialize, Serialize};

pub const MAX_HEALTH: i32 = 100;

/// Outcome of a health update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthOutcome {
    pub health: i32,
    /// True when this update drove health to zero
    pub died: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdventureState {
    pub health: i32,
    pub inventory: Vec<String>,
    pub location: String,
    pub turn_count: u64,
    pub is_game_over: bool,
}

impl Default for AdventureState {
    fn default() -> Self {
        Self {
            health: MAX_HEALTH,
            inventory: vec!["Flashlight".to_string(), "Datapad".to_string()],
            location: "Neon Alley".to_string(),
            turn_count: 0,
            is_game_over: false,
        }
    }
}

impl AdventureState {
    /// Apply a health delta, clamped to [0, 100]. Reaching exactly zero
    /// sets `is_game_over`, which stays set for the rest of the session.
    pub fn apply_health(&mut self, delta: i32) -> HealthOutcome {
        self.health = (self.health.saturating_add(delta)).clamp(0, MAX_HEALTH);
        let died = self.health == 0 && !self.is_game_over;
        if self.health == 0 {
            self.is_game_over = true;
        }
        self.bump_turn();
        HealthOutcome {
            health: self.health,
            died,
        }
    }

    /// Inventory is a plain list; carrying duplicates is allowed.
    pub fn add_item(&mut self, item: &str) {
        self.inventory.push(item.to_string());
        self.bump_turn();
    }

    /// Remove one matching item. Returns false when nothing matched.
    pub fn remove_item(&mut self, item: &str) -> bool {
        let Some(pos) = self
            .inventory
            .iter()
            .position(|held| held.eq_ignore_ascii_case(item))
        else {
            return false;
        };
        self.inventory.remove(pos);
        self.bump_turn();
        true
    }

    /// Spoken status line
    pub fn status_line(&self) -> String {
        format!(
            "LOCATION: {} | HP: {} | INVENTORY: {}",
            self.location,
            self.health,
            self.inventory.join(", ")
        )
    }

    fn bump_turn(&mut self) {
        self.turn_count += 1;
    }
}
