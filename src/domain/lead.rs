//! Sales lead record, captured once at the end of a qualification call

use serde::{Deserialize, Serialize};

/// Optional fields accumulate conversationally; the record itself is
/// written exactly once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub name: Option<String>,
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Lead {
    /// Spoken confirmation summarizing what was captured.
    pub fn summary(&self) -> String {
        format!(
            "Thanks {}. I've noted that you are from {} and you are looking at us for {}. \
             I have your timeline as {}. Our sales team will email you at {} shortly.",
            self.name.as_deref().unwrap_or("there"),
            self.company.as_deref().unwrap_or("your company"),
            self.use_case.as_deref().unwrap_or("payments"),
            self.timeline.as_deref().unwrap_or("undecided"),
            self.email.as_deref().unwrap_or("your email"),
        )
    }
}
