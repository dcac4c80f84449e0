//! Daily wellness check-in entries

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub mood: String,
    pub energy_level: String,
    pub goals: Vec<String>,
    pub summary: String,
    pub date: String,
}

impl CheckIn {
    /// Prompt context recalling the previous session.
    pub fn recall_context(&self) -> String {
        format!(
            "CONTEXT FROM LAST SESSION ({}):\n\
             - User was feeling: {}\n\
             - Energy was: {}\n\
             - Past Goals: {}\n\n\
             INSTRUCTION: Start by briefly mentioning their last check-in \
             (e.g., \"Last time you were feeling... how is today?\")",
            self.date,
            self.mood,
            self.energy_level,
            self.goals.join(", ")
        )
    }
}
