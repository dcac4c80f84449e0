//! Wellness companion tool: daily check-in logging

use super::{Tool, ToolOutput};
use crate::domain::wellness::CheckIn;
use crate::persist::JsonStore;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub const WELLNESS_LOG_KEY: &str = "wellness_log";

pub struct WellnessJournal {
    store: JsonStore,
}

impl WellnessJournal {
    pub fn new(store: JsonStore) -> Self {
        Self { store }
    }

    /// Most recent entry, if any — seeds the next session's prompt.
    pub fn last_entry(&self) -> Option<CheckIn> {
        self.store.load_log(WELLNESS_LOG_KEY).into_iter().last()
    }
}

pub struct LogCheckInTool(pub Arc<WellnessJournal>);

#[derive(Debug, Deserialize)]
struct CheckInInput {
    mood: String,
    energy_level: String,
    goals: Vec<String>,
    summary: String,
}

#[async_trait]
impl Tool for LogCheckInTool {
    fn name(&self) -> &str {
        "log_daily_checkin"
    }

    fn description(&self) -> String {
        "Save the user's mood, energy, and goals to the wellness journal once they \
         confirm the summary."
            .to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "mood": {"type": "string", "description": "User's current mood (e.g. Energetic, Anxious)"},
                "energy_level": {"type": "string", "description": "Low, Medium, or High"},
                "goals": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "List of 1-3 simple goals for the day"
                },
                "summary": {"type": "string", "description": "A brief, supportive summary of the conversation."}
            },
            "required": ["mood", "energy_level", "goals", "summary"]
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        let input: CheckInInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return ToolOutput::error(format!("Invalid input: {e}")),
        };

        let entry = CheckIn {
            mood: input.mood,
            energy_level: input.energy_level,
            goals: input.goals,
            summary: input.summary,
            date: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        };
        if let Err(e) = self.0.store.append(WELLNESS_LOG_KEY, entry) {
            return ToolOutput::error(format!("Could not save the check-in: {e}"));
        }
        tracing::info!("check-in logged");
        ToolOutput::terminal("I've logged that for you. Have a wonderful day!")
    }
}
