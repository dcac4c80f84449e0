//! Cyberpunk role-play game master

use super::{App, AppError};
use crate::domain::adventure::AdventureState;
use crate::persist::JsonStore;
use crate::session::Session;
use crate::tools::adventure::{
    CheckStatusTool, GameTable, RollDiceTool, UpdateHealthTool, UpdateInventoryTool,
    GAME_STATE_KEY,
};
use crate::tools::ToolRegistry;
use std::sync::Arc;

pub fn build(store: &JsonStore) -> Result<App, AppError> {
    let state: AdventureState = store.load_or_default(GAME_STATE_KEY);
    let fresh_game = state.turn_count == 0;
    let status = state.status_line();

    let prompt = format!(
        "You are the Game Master (GM) for a Cyberpunk RPG.\n\
         SETTING: Neo-Tokyo, Year 2099. Rain-slicked streets, neon lights, corrupt corps.\n\n\
         RULES:\n\
         1. Describe the scene vividly but briefly (2-3 sentences).\n\
         2. Ask \"What do you do?\" at the end of every turn.\n\
         3. If the player tries something risky, CALL THE 'roll_dice' TOOL.\n\
         \x20  - If the result is FAIL -> Describe a bad outcome (and maybe reduce health).\n\
         \x20  - If SUCCESS -> Describe a cool victory.\n\
         4. Track items using 'update_inventory'.\n\
         5. If Health reaches 0, the game ends.\n\n\
         You must check the player's status at the start of every turn to see what they have.\n\
         PLAYER STATUS: {status}"
    );

    let greeting = if fresh_game {
        "You wake up in a rainy alleyway in Neo-Tokyo. Your head hurts. You check your \
         pockets and find a Flashlight and a Datapad. A Cyber-cop is walking towards you. \
         What do you do?"
            .to_string()
    } else {
        format!("Welcome back to Neo-Tokyo. {status}. What do you want to do next?")
    };

    let table = Arc::new(GameTable::new(state, store.clone()));
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(RollDiceTool));
    registry.register(Arc::new(UpdateInventoryTool(table.clone())));
    registry.register(Arc::new(UpdateHealthTool(table.clone())));
    registry.register(Arc::new(CheckStatusTool(table)));

    Ok(App {
        session: Session::new(prompt),
        registry,
        greeting,
        voice_id: "en-US-natalie".to_string(),
        exit_phrases: vec!["exit".to_string(), "save".to_string()],
        farewell: "Game saved. See you next time, runner.".to_string(),
        router: None,
    })
}
