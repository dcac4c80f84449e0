//! Conversation session: ordered message history plus mode/topic tags
//!
//! The history is append-only — no message is ever removed or
//! reordered, so the backend always sees a faithful transcript and
//! tool-result back-references resolve. The one sanctioned edit is the
//! mode switch, which replaces the system message at index 0 in place.

use crate::llm::{ChatMessage, Role};
use uuid::Uuid;

/// Prompt builder for a mode router: (mode, topic) -> system prompt
pub type PromptFn = Box<dyn Fn(&str, Option<&str>) -> String + Send + Sync>;

pub struct Session {
    id: String,
    messages: Vec<ChatMessage>,
    mode: Option<String>,
    topic: Option<String>,
}

impl Session {
    /// Start a session with its opening system prompt at index 0.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            messages: vec![ChatMessage::system(system_prompt)],
            mode: None,
            topic: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Immutable view of the history for transmission to the backend.
    pub fn snapshot(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn mode(&self) -> Option<&str> {
        self.mode.as_deref()
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.topic = Some(topic.into());
    }

    /// Switch conversational mode: replace the system message at index 0
    /// with one reflecting the new mode/topic, and append a one-shot
    /// system note so the next assistant turn acknowledges the switch
    /// without re-deriving it from the full history.
    pub fn switch_mode(&mut self, mode: impl Into<String>, system_prompt: impl Into<String>) {
        let mode = mode.into();
        self.messages[0] = ChatMessage::system(system_prompt);
        let note = match &self.topic {
            Some(topic) => format!("User switched to {mode} mode. Topic is {topic}. Start immediately."),
            None => format!("User switched to {mode} mode. Start immediately."),
        };
        self.append(ChatMessage::system(note));
        tracing::info!(session = %self.id, mode = %mode, "mode switched");
        self.mode = Some(mode);
    }

    /// Tag the session with its starting mode without touching history.
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    /// True when every `tool` message references a tool invocation
    /// emitted by an earlier assistant message.
    #[allow(dead_code)] // invariant check, exercised by tests
    pub fn tool_back_references_resolve(&self) -> bool {
        let mut seen: Vec<&str> = Vec::new();
        for msg in &self.messages {
            match msg.role {
                Role::Assistant => {
                    seen.extend(msg.tool_calls.iter().map(|c| c.id.as_str()));
                }
                Role::Tool => {
                    let Some(id) = msg.tool_call_id.as_deref() else {
                        return false;
                    };
                    if !seen.contains(&id) {
                        return false;
                    }
                }
                _ => {}
            }
        }
        true
    }
}

/// One selectable conversational mode
pub struct ModeDef {
    pub name: String,
    pub keywords: Vec<String>,
    /// Voice to speak with while this mode is active
    pub voice: Option<String>,
}

/// Result of a successful mode switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSwitch {
    pub mode: String,
    pub voice: Option<String>,
}

/// Keyword-driven mode and topic routing for multi-persona sessions.
///
/// Keywords resolve against a finite table, exact match before
/// substring, so short mode names never mis-trigger inside longer
/// words.
pub struct ModeRouter {
    modes: Vec<ModeDef>,
    /// (keyword, canonical topic)
    topics: Vec<(String, String)>,
    prompt: PromptFn,
}

impl ModeRouter {
    pub fn new(modes: Vec<ModeDef>, topics: Vec<(String, String)>, prompt: PromptFn) -> Self {
        Self {
            modes,
            topics,
            prompt,
        }
    }

    /// Inspect an utterance before the turn runs: update the topic tag,
    /// and switch modes when a mode keyword appears. Returns the switch
    /// when one happened.
    pub fn apply(&self, user_text: &str, session: &mut Session) -> Option<ModeSwitch> {
        let lowered = user_text.to_lowercase();

        if let Some((_, topic)) = self
            .topics
            .iter()
            .find(|(keyword, _)| lowered.split_whitespace().any(|w| w == keyword))
            .or_else(|| {
                self.topics
                    .iter()
                    .find(|(keyword, _)| lowered.contains(keyword.as_str()))
            })
        {
            session.set_topic(topic.clone());
        }

        let hit = self
            .modes
            .iter()
            .find(|m| m.keywords.iter().any(|k| lowered.trim() == k))
            .or_else(|| {
                self.modes
                    .iter()
                    .find(|m| m.keywords.iter().any(|k| lowered.contains(k.as_str())))
            })?;

        if session.mode() == Some(hit.name.as_str()) {
            return None;
        }

        let prompt = (self.prompt)(&hit.name, session.topic());
        session.switch_mode(hit.name.clone(), prompt);
        Some(ModeSwitch {
            mode: hit.name.clone(),
            voice: hit.voice.clone(),
        })
    }
}
