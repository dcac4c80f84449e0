//! Active-recall tutor with three personas: learn, quiz, teach-back
//!
//! The only tool-free app; what it exercises is mode switching — each
//! persona swaps the system prompt and the speaking voice mid-session.

use super::App;
use crate::session::{ModeDef, ModeRouter, Session};
use crate::tools::ToolRegistry;

const COURSE_CONTENT: &str = "\
[
  {\"topic\": \"Variables\", \"summary\": \"A variable is a named box that stores a value. \
Assigning replaces the contents; reading leaves them alone.\"},
  {\"topic\": \"Loops\", \"summary\": \"A loop repeats a block of code: 'for' walks a known \
sequence, 'while' repeats until its condition turns false.\"}
]";

fn system_prompt(mode: &str, topic: Option<&str>) -> String {
    let topic = topic.unwrap_or("General Programming");
    let base = format!(
        "You are an Active Recall Tutor. The user is currently studying: {topic}. \
         Here is the course content: {COURSE_CONTENT}"
    );

    match mode {
        "learn" => format!(
            "{base}\n\
             MODE: LEARN\n\
             GOAL: Explain concepts clearly.\n\
             INSTRUCTIONS:\n\
             1. If the topic is 'General', ask them to choose Variables or Loops.\n\
             2. If a topic is selected, explain it simply using the 'summary' in the content.\n\
             3. Ask if they are ready for a quiz."
        ),
        "quiz" => format!(
            "{base}\n\
             MODE: QUIZ\n\
             GOAL: Test the user's knowledge on {topic}.\n\
             INSTRUCTIONS:\n\
             1. Ask a specific question about {topic} based on the content.\n\
             2. Wait for their answer.\n\
             3. Tell them if they are right or wrong."
        ),
        "teach_back" => format!(
            "{base}\n\
             MODE: TEACH-BACK\n\
             GOAL: Rate the user's explanation of {topic}.\n\
             INSTRUCTIONS:\n\
             1. Ask the user to explain {topic} back to you.\n\
             2. Grade their explanation on a scale of 1-10.\n\
             3. Give constructive feedback."
        ),
        _ => format!(
            "{base}\nYou are a helpful receptionist. Ask the user to choose a mode: \
             Learn, Quiz, or Teach-Back."
        ),
    }
}

pub fn build() -> App {
    let session = Session::new(system_prompt("greeting", None)).with_mode("greeting");

    let router = ModeRouter::new(
        vec![
            ModeDef {
                name: "learn".into(),
                keywords: vec!["learn".into()],
                voice: Some("en-US-ken".into()),
            },
            ModeDef {
                name: "quiz".into(),
                keywords: vec!["quiz".into()],
                voice: Some("en-US-amara".into()),
            },
            ModeDef {
                name: "teach_back".into(),
                keywords: vec!["teach".into(), "back".into()],
                voice: Some("en-US-maverick".into()),
            },
        ],
        vec![
            ("loop".into(), "Loops".into()),
            ("variable".into(), "Variables".into()),
        ],
        Box::new(|mode, topic| system_prompt(mode, topic)),
    );

    App {
        session,
        // no tools: this app is pure conversation with mode routing
        registry: ToolRegistry::new(),
        greeting: "Welcome to the Active Recall Coach. Would you like to start with \
                   Learn, Quiz, or Teach-Back mode?"
            .to_string(),
        voice_id: "en-US-ken".to_string(),
        exit_phrases: vec!["bye".to_string(), "goodbye".to_string()],
        farewell: "Great session. Goodbye!".to_string(),
        router: Some(router),
    }
}
