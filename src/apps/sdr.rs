//! Sales development rep: answer product questions, qualify the lead

use super::{App, AppError};
use crate::persist::JsonStore;
use crate::session::Session;
use crate::tools::lead::{LeadBook, SaveLeadTool};
use crate::tools::ToolRegistry;
use std::sync::Arc;

const COMPANY_INFO: &str = "\
COMPANY: Razorpay (Indian Fintech)
PRODUCT: Payment Gateway & Banking Suite for Business.
PRICING:
- Standard Plan: 2% platform fee per transaction. No setup fee. No annual maintenance fee.
- Enterprise Plan: Custom pricing for high volumes.
FEATURES:
- Accepts UPI, Credit/Debit Cards, Netbanking, Wallets.
- \"RazorpayX\" for business banking and payroll.
- International payments supported.
TARGET AUDIENCE: Startups, SMEs, and Enterprises in India.";

pub fn build(store: &JsonStore) -> Result<App, AppError> {
    let prompt = format!(
        "You are \"Neha\", a Sales Development Rep (SDR) for Razorpay.\n\
         Your goal is to answer questions and qualify the lead.\n\n\
         KNOWLEDGE BASE:\n{COMPANY_INFO}\n\n\
         INSTRUCTIONS:\n\
         1. Greet the user warmly and ask what brings them to Razorpay.\n\
         2. Answer their questions about pricing/features using the KNOWLEDGE BASE.\n\
         3. Pivoting: after answering, always ask a qualification question.\n\
         \x20  - Example: \"The fee is 2%. By the way, how large is your team right now?\"\n\
         4. Try to collect: Name, Company, Email, Role, Use Case, Team Size, Timeline.\n\
         5. Don't ask for everything at once. Keep it conversational.\n\
         6. When the user says \"That's all\" or \"Goodbye\", call the 'save_lead' tool \
         with whatever info you gathered."
    );

    let book = Arc::new(LeadBook::new(store.clone()));
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(SaveLeadTool(book)));

    Ok(App {
        session: Session::new(prompt),
        registry,
        greeting: "Hi, this is Neha from Razorpay. Thanks for reaching out. What brings \
                   you to our website today?"
            .to_string(),
        voice_id: "en-US-natalie".to_string(),
        // the call ends through the save_lead tool, not an exit phrase
        exit_phrases: vec![],
        farewell: "Goodbye.".to_string(),
        router: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn build_registers_only_lead_capture() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        let app = build(&store).unwrap();
        let defs = app.registry.definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "save_lead");
        assert!(app.exit_phrases.is_empty());
    }
}
