//! Wellness companion: mood check-in with memory of the last session

use super::{App, AppError};
use crate::persist::JsonStore;
use crate::session::Session;
use crate::tools::wellness::{LogCheckInTool, WellnessJournal};
use crate::tools::ToolRegistry;
use std::sync::Arc;

const BASE_PROMPT: &str = "\
You are a supportive, grounded Health & Wellness Companion.
Your goal is to check in on the user's mood and help them set 1-3 simple goals.

GUIDELINES:
1. Be empathetic but NOT a doctor. Do not diagnose.
2. Keep advice small and actionable (e.g., \"Take a 5-min walk\", \"Drink water\").
3. Ask: \"How are you feeling?\" and \"What are your goals for today?\"
4. Once you have the Mood, Energy, and Goals, SUMMARIZE them back to the user.
5. After the user confirms the summary, call the 'log_daily_checkin' function.";

pub fn build(store: &JsonStore) -> Result<App, AppError> {
    let journal = Arc::new(WellnessJournal::new(store.clone()));

    let prompt = match journal.last_entry() {
        Some(last) => format!("{BASE_PROMPT}\n\n{}", last.recall_context()),
        None => format!(
            "{BASE_PROMPT}\n\nINSTRUCTION: This is your first meeting. Introduce yourself warmly."
        ),
    };

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(LogCheckInTool(journal)));

    Ok(App {
        session: Session::new(prompt),
        registry,
        greeting: "Hi, I'm your wellness companion. How are you feeling today?".to_string(),
        voice_id: "en-US-natalie".to_string(),
        // the check-in tool ends the session
        exit_phrases: vec![],
        farewell: "Take care of yourself. Goodbye.".to_string(),
        router: None,
    })
}
