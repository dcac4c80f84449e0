//! Bank fraud-alert verification desk
//!
//! The security code stays in the case record; the prompt only carries
//! the transaction facts, and verification happens inside the
//! `verify_identity` handler.

use super::{App, AppError};
use crate::domain::fraud::CaseBook;
use crate::persist::JsonStore;
use crate::session::Session;
use crate::tools::fraud::{CaseDesk, ResolveCaseTool, VerifyIdentityTool, CASES_KEY};
use crate::tools::ToolRegistry;
use std::sync::Arc;

pub fn build(store: &JsonStore, username: &str) -> Result<App, AppError> {
    // Seed sample cases on first run
    if !store.exists(CASES_KEY) {
        store.save(CASES_KEY, &CaseBook::sample())?;
    }
    let cases: CaseBook = store.load_or_default(CASES_KEY);

    let desk = CaseDesk::open(username, cases, store.clone())
        .ok_or_else(|| AppError::UnknownCase(username.to_string()))?;
    let desk = Arc::new(desk);

    let prompt = format!(
        "You are a Fraud Prevention Officer at 'Murf Bank'.\n\
         You are calling customer '{username}'.\n\n\
         CASE DETAILS:\n{details}\n\n\
         FLOW:\n\
         1. Introduce yourself and say you are calling about suspicious activity.\n\
         2. VERIFICATION: Ask the user for their 4-digit Security Code, then call the \
         'verify_identity' tool with exactly what they said. The tool decides; never \
         guess the code yourself.\n\
         3. If verified, read the transaction details (Merchant, Amount, Location).\n\
         4. Ask \"Did you authorize this transaction?\"\n\
         \x20  - If YES: call 'resolve_case' with status 'safe'.\n\
         \x20  - If NO: call 'resolve_case' with status 'fraudulent'.",
        details = desk.case_summary(),
    );

    let greeting = format!(
        "Hello, this is the Fraud Department at Murf Bank. Am I speaking with {username}?"
    );

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(VerifyIdentityTool(desk.clone())));
    registry.register(Arc::new(ResolveCaseTool(desk)));

    Ok(App {
        session: Session::new(prompt),
        registry,
        greeting,
        voice_id: "en-US-terrell".to_string(),
        exit_phrases: vec!["bye".to_string()],
        farewell: "Goodbye.".to_string(),
        router: None,
    })
}
