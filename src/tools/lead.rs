//! Lead capture tool for the sales-development app

use super::{Tool, ToolOutput};
use crate::domain::lead::Lead;
use crate::persist::JsonStore;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const LEADS_KEY: &str = "leads";

/// Per-session ledger guard: the lead record is written exactly once.
pub struct LeadBook {
    store: JsonStore,
    finalized: AtomicBool,
}

impl LeadBook {
    pub fn new(store: JsonStore) -> Self {
        Self {
            store,
            finalized: AtomicBool::new(false),
        }
    }
}

pub struct SaveLeadTool(pub Arc<LeadBook>);

#[async_trait]
impl Tool for SaveLeadTool {
    fn name(&self) -> &str {
        "save_lead"
    }

    fn description(&self) -> String {
        "Call this when the conversation ends to save the lead details gathered so far."
            .to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "description": "Prospect's name"},
                "company": {"type": "string", "description": "Prospect's company name"},
                "email": {"type": "string", "description": "Email address"},
                "role": {"type": "string", "description": "Job title/Role"},
                "use_case": {"type": "string", "description": "Why they need the product"},
                "team_size": {"type": "string", "description": "Number of employees"},
                "timeline": {"type": "string", "description": "When they want to start (Now, Soon, Later)"}
            },
            "required": ["name", "company"]
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        let mut lead: Lead = match serde_json::from_value(input) {
            Ok(lead) => lead,
            Err(e) => return ToolOutput::error(format!("Invalid input: {e}")),
        };

        let book = &self.0;
        if book.finalized.swap(true, Ordering::SeqCst) {
            return ToolOutput::error("This lead has already been saved.");
        }

        lead.timestamp = Some(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
        let summary = lead.summary();
        if let Err(e) = book.store.append(LEADS_KEY, lead) {
            // allow a later retry if the write itself failed
            book.finalized.store(false, Ordering::SeqCst);
            return ToolOutput::error(format!("Could not save the lead: {e}"));
        }
        tracing::info!("lead captured");
        ToolOutput::terminal(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn book() -> (TempDir, Arc<LeadBook>) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        (dir, Arc::new(LeadBook::new(store)))
    }

    #[tokio::test]
    async fn lead_is_appended_and_terminates_the_call() {
        let (dir, book) = book();
        let save = SaveLeadTool(book);
        let out = save
            .run(json!({
                "name": "Priya",
                "company": "Acme",
                "use_case": "payroll",
                "timeline": "Now"
            }))
            .await;
        assert!(out.terminal);
        assert!(out.output.contains("Priya"));

        let leads: Vec<Lead> = JsonStore::open(dir.path()).unwrap().load_log(LEADS_KEY);
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].company.as_deref(), Some("Acme"));
        assert!(leads[0].timestamp.is_some());
    }

    #[tokio::test]
    async fn finalize_is_idempotent() {
        let (dir, book) = book();
        let save = SaveLeadTool(book);
        let args = json!({"name": "Priya", "company": "Acme"});
        let first = save.run(args.clone()).await;
        assert!(first.terminal);
        let second = save.run(args).await;
        assert!(!second.success);

        let leads: Vec<Lead> = JsonStore::open(dir.path()).unwrap().load_log(LEADS_KEY);
        assert_eq!(leads.len(), 1, "no second record appended");
    }

    #[tokio::test]
    async fn existing_log_is_preserved() {
        let (dir, book) = book();
        let store = JsonStore::open(dir.path()).unwrap();
        store
            .append(
                LEADS_KEY,
                Lead {
                    name: Some("Earlier".into()),
                    company: Some("Oldco".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let save = SaveLeadTool(book);
        save.run(json!({"name": "Priya", "company": "Acme"})).await;

        let leads: Vec<Lead> = store.load_log(LEADS_KEY);
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].name.as_deref(), Some("Earlier"));
        assert_eq!(leads[1].name.as_deref(), Some("Priya"), "newest last");
    }
}
