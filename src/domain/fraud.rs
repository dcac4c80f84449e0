//! Fraud case records and their one-way status transitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Pending,
    Safe,
    Fraudulent,
    FailedVerification,
}

impl CaseStatus {
    /// Terminal statuses cannot be left again within a call.
    pub fn is_terminal(self) -> bool {
        self != CaseStatus::Pending
    }
}

/// A pre-existing fraud case row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub username: String,
    pub security_code: String,
    pub card_last4: String,
    pub merchant: String,
    pub amount: String,
    pub location: String,
    pub timestamp: String,
    pub status: CaseStatus,
}

impl CaseRecord {
    /// Exact string comparison against the stored secret. Any mismatch
    /// is a hard failure branch, not a retry.
    pub fn code_matches(&self, spoken: &str) -> bool {
        self.security_code == spoken
    }

    /// One-way transition: only a pending case can move to a terminal
    /// status. Returns false (and leaves the record untouched) when the
    /// case is already closed.
    pub fn close(&mut self, status: CaseStatus) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = status;
        true
    }
}

/// All known cases, keyed by username
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseBook {
    cases: BTreeMap<String, CaseRecord>,
}

impl CaseBook {
    pub fn get(&self, username: &str) -> Option<&CaseRecord> {
        self.cases.get(username)
    }

    pub fn get_mut(&mut self, username: &str) -> Option<&mut CaseRecord> {
        self.cases.get_mut(username)
    }

    pub fn insert(&mut self, record: CaseRecord) {
        self.cases.insert(record.username.clone(), record);
    }

    /// Sample cases seeded on first run.
    pub fn sample() -> Self {
        let mut book = Self::default();
        book.insert(CaseRecord {
            username: "john_doe".into(),
            security_code: "1234".into(),
            card_last4: "4242".into(),
            merchant: "Apple Store".into(),
            amount: "$999.00".into(),
            location: "New York, NY".into(),
            timestamp: "Today, 2:30 PM".into(),
            status: CaseStatus::Pending,
        });
        book.insert(CaseRecord {
            username: "jane_smith".into(),
            security_code: "9797".into(),
            card_last4: "8888".into(),
            merchant: "Unknown Crypto Site".into(),
            amount: "$5000.00".into(),
            location: "Lagos, Nigeria".into(),
            timestamp: "Yesterday, 3:00 AM".into(),
            status: CaseStatus::Pending,
        });
        book
    }
}
