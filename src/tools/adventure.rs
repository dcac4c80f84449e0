//! Game-master tools: dice, inventory, health, status

use super::{Tool, ToolOutput};
use crate::domain::adventure::AdventureState;
use crate::persist::JsonStore;
use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

pub const GAME_STATE_KEY: &str = "game_state";

const GAME_ALREADY_OVER: &str =
    "The game has already ended. Nothing in the world can change now.";

/// State shared by the game tools. Mutating tools refuse once the game
/// is over; the read-only status tool still answers so the narrator can
/// deliver an epilogue.
pub struct GameTable {
    state: Mutex<AdventureState>,
    store: JsonStore,
}

impl GameTable {
    pub fn new(state: AdventureState, store: JsonStore) -> Self {
        Self {
            state: Mutex::new(state),
            store,
        }
    }

    pub fn status_line(&self) -> String {
        self.state.lock().unwrap().status_line()
    }

    #[cfg(test)]
    pub fn state_snapshot(&self) -> AdventureState {
        self.state.lock().unwrap().clone()
    }

    fn flush(&self, state: &AdventureState) -> Result<(), String> {
        self.store
            .save(GAME_STATE_KEY, state)
            .map_err(|e| format!("Could not save the game: {e}"))
    }
}

pub struct RollDiceTool;

#[derive(Debug, Deserialize)]
struct RollInput {
    action_description: String,
}

#[async_trait]
impl Tool for RollDiceTool {
    fn name(&self) -> &str {
        "roll_dice"
    }

    fn description(&self) -> String {
        "Roll a d20 when the player attempts something risky (fighting, jumping, hacking)."
            .to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "action_description": {"type": "string"}
            },
            "required": ["action_description"]
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        let input: RollInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return ToolOutput::error(format!("Invalid input: {e}")),
        };
        let roll = rand::thread_rng().gen_range(1..=20);
        let result = if roll < 10 { "FAIL" } else { "SUCCESS" };
        tracing::info!(roll, result, action = %input.action_description, "dice rolled");
        ToolOutput::success(format!(
            "ACTION: {}. RESULT: Dice Roll: {roll}/20 ({result}).",
            input.action_description
        ))
    }
}

pub struct UpdateInventoryTool(pub Arc<GameTable>);

#[derive(Debug, Deserialize)]
struct InventoryInput {
    item: String,
    action: InventoryAction,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum InventoryAction {
    Add,
    Remove,
}

#[async_trait]
impl Tool for UpdateInventoryTool {
    fn name(&self) -> &str {
        "update_inventory"
    }

    fn description(&self) -> String {
        "Add or remove an item from the player inventory.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "item": {"type": "string"},
                "action": {"type": "string", "enum": ["add", "remove"]}
            },
            "required": ["item", "action"]
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        let input: InventoryInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return ToolOutput::error(format!("Invalid input: {e}")),
        };

        let table = &self.0;
        let mut state = table.state.lock().unwrap();
        if state.is_game_over {
            return ToolOutput::error(GAME_ALREADY_OVER);
        }

        let msg = match input.action {
            InventoryAction::Add => {
                state.add_item(&input.item);
                format!("Added {} to inventory.", input.item)
            }
            InventoryAction::Remove => {
                if state.remove_item(&input.item) {
                    format!("Removed {} from inventory.", input.item)
                } else {
                    format!("Could not find {}.", input.item)
                }
            }
        };

        if let Err(e) = table.flush(&state) {
            return ToolOutput::error(e);
        }
        ToolOutput::success(msg)
    }
}

pub struct UpdateHealthTool(pub Arc<GameTable>);

#[derive(Debug, Deserialize)]
struct HealthInput {
    amount: i32,
}

#[async_trait]
impl Tool for UpdateHealthTool {
    fn name(&self) -> &str {
        "update_health"
    }

    fn description(&self) -> String {
        "Change player health: negative for damage, positive for healing.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "amount": {"type": "integer"}
            },
            "required": ["amount"]
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        let input: HealthInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return ToolOutput::error(format!("Invalid input: {e}")),
        };

        let table = &self.0;
        let mut state = table.state.lock().unwrap();
        if state.is_game_over {
            return ToolOutput::error(GAME_ALREADY_OVER);
        }

        let outcome = state.apply_health(input.amount);
        if let Err(e) = table.flush(&state) {
            return ToolOutput::error(e);
        }

        if outcome.died {
            return ToolOutput::terminal(
                "Your vision blurs as the neon lights fade to black. You collapse on the \
                 rain-slicked pavement. GAME OVER.",
            );
        }
        ToolOutput::success(format!(
            "Health changed by {}. Current HP: {}",
            input.amount, outcome.health
        ))
    }
}

pub struct CheckStatusTool(pub Arc<GameTable>);

#[async_trait]
impl Tool for CheckStatusTool {
    fn name(&self) -> &str {
        "check_status"
    }

    fn description(&self) -> String {
        "Get current health, location, and inventory.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {}, "required": []})
    }

    async fn run(&self, _input: Value) -> ToolOutput {
        ToolOutput::success(self.0.status_line())
    }
}
