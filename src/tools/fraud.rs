//! Fraud-desk tools: identity verification and case resolution
//!
//! The security-code comparison happens here, in the handler, against
//! the stored record — the secret never travels through the prompt. A
//! mismatch is a hard failure branch closing the case, not a retry.

use super::{Tool, ToolOutput};
use crate::domain::fraud::{CaseBook, CaseStatus};
use crate::persist::JsonStore;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

pub const CASES_KEY: &str = "fraud_cases";

/// The open case under review plus the book it persists into
pub struct CaseDesk {
    username: String,
    cases: Mutex<CaseBook>,
    store: JsonStore,
}

impl CaseDesk {
    /// Returns None when the username has no case on file.
    pub fn open(username: &str, cases: CaseBook, store: JsonStore) -> Option<Self> {
        cases.get(username)?;
        Some(Self {
            username: username.to_string(),
            cases: Mutex::new(cases),
            store,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Transaction facts for the system prompt (the security code is
    /// deliberately not included).
    pub fn case_summary(&self) -> String {
        let cases = self.cases.lock().unwrap();
        let case = cases.get(&self.username).expect("case checked at open");
        format!(
            "- Card Ending: {}\n- Merchant: {}\n- Amount: {}\n- Location: {}\n- When: {}",
            case.card_last4, case.merchant, case.amount, case.location, case.timestamp
        )
    }

    #[cfg(test)]
    pub fn status(&self) -> CaseStatus {
        self.cases.lock().unwrap().get(&self.username).unwrap().status
    }

    fn flush(&self, cases: &CaseBook) -> Result<(), String> {
        self.store
            .save(CASES_KEY, cases)
            .map_err(|e| format!("Could not save the case file: {e}"))
    }
}

pub struct VerifyIdentityTool(pub Arc<CaseDesk>);

#[derive(Debug, Deserialize)]
struct VerifyInput {
    code: String,
}

#[async_trait]
impl Tool for VerifyIdentityTool {
    fn name(&self) -> &str {
        "verify_identity"
    }

    fn description(&self) -> String {
        "Check the 4-digit security code the customer just spoke. A wrong code ends \
         the call immediately."
            .to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "code": {"type": "string", "description": "The code as spoken by the customer"}
            },
            "required": ["code"]
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        let input: VerifyInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return ToolOutput::error(format!("Invalid input: {e}")),
        };

        let desk = &self.0;
        let mut cases = desk.cases.lock().unwrap();
        let case = cases.get_mut(&desk.username).expect("case checked at open");

        if case.status.is_terminal() {
            return ToolOutput::error("This case has already been closed.");
        }

        if case.code_matches(input.code.trim()) {
            tracing::info!(username = %desk.username, "identity verified");
            return ToolOutput::success(
                "Identity verified. Proceed to read the transaction details.",
            );
        }

        case.close(CaseStatus::FailedVerification);
        if let Err(e) = desk.flush(&cases) {
            return ToolOutput::error(e);
        }
        tracing::warn!(username = %desk.username, "verification failed, case closed");
        ToolOutput::terminal(
            "I'm sorry, that code does not match our records. For your security I cannot \
             continue this call. Please visit your nearest branch. Goodbye.",
        )
    }
}

pub struct ResolveCaseTool(pub Arc<CaseDesk>);

#[derive(Debug, Deserialize)]
struct ResolveInput {
    status: ResolvedStatus,
    reason: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ResolvedStatus {
    Safe,
    Fraudulent,
}

#[async_trait]
impl Tool for ResolveCaseTool {
    fn name(&self) -> &str {
        "resolve_case"
    }

    fn description(&self) -> String {
        "Record the customer's answer about the transaction and close the case. \
         Only call after identity has been verified."
            .to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "status": {"type": "string", "enum": ["safe", "fraudulent"]},
                "reason": {"type": "string", "description": "Brief note on why this status was chosen"}
            },
            "required": ["status", "reason"]
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        let input: ResolveInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return ToolOutput::error(format!("Invalid input: {e}")),
        };

        let desk = &self.0;
        let mut cases = desk.cases.lock().unwrap();
        let case = cases.get_mut(&desk.username).expect("case checked at open");

        let status = match input.status {
            ResolvedStatus::Safe => CaseStatus::Safe,
            ResolvedStatus::Fraudulent => CaseStatus::Fraudulent,
        };
        if !case.close(status) {
            return ToolOutput::error("This case has already been closed.");
        }
        if let Err(e) = desk.flush(&cases) {
            return ToolOutput::error(e);
        }
        tracing::info!(
            username = %desk.username,
            status = ?status,
            reason = %input.reason,
            "case closed"
        );

        match input.status {
            ResolvedStatus::Safe => ToolOutput::terminal(
                "Thank you. I've marked the transaction as authorized and your card stays \
                 active. Have a good day. Goodbye.",
            ),
            ResolvedStatus::Fraudulent => ToolOutput::terminal(
                "Understood. I've marked the transaction as fraudulent and blocked your \
                 card. A replacement is on its way. Goodbye.",
            ),
        }
    }
}
