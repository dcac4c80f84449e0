//! Turn orchestrator and session loop
//!
//! One conversational turn runs to completion — reasoning, sequential
//! tool dispatch, the optional finalizing backend call — before the
//! next user input is accepted. Every failure inside a turn degrades
//! (error tool message, canned fallback reply) rather than aborting
//! the session; the process only exits on an explicit end-of-session
//! condition.

use crate::llm::{ChatMessage, ChatRequest, LlmService, ToolDefinition};
use crate::session::{ModeRouter, Session};
use crate::speech::{SpeechToText, TextToSpeech};
use crate::tools::{ToolOutput, ToolRegistry};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Reply spoken when the reasoning backend is unreachable; the turn is
/// lost but the session survives.
const FALLBACK_REPLY: &str =
    "Sorry, I'm having trouble thinking right now. Could you say that again?";

/// Outcome of one user-input-to-reply cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Normal reply; the loop keeps going
    Reply(String),
    /// A terminal tool result ended the session; speak this and stop
    Terminated(String),
}

pub struct Orchestrator {
    llm: Arc<dyn LlmService>,
    registry: ToolRegistry,
    session: Session,
    /// Static for the session; computed once at construction
    definitions: Vec<ToolDefinition>,
}

impl Orchestrator {
    pub fn new(llm: Arc<dyn LlmService>, registry: ToolRegistry, session: Session) -> Self {
        let definitions = registry.definitions();
        Self {
            llm,
            registry,
            session,
            definitions,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Drive one turn: append the user's words, reason, dispatch any
    /// tool invocations in order, and produce the reply to speak.
    pub async fn run_turn(&mut self, user_text: &str) -> TurnOutcome {
        self.session.append(ChatMessage::user(user_text));

        tracing::debug!(phase = "reasoning", "turn started");
        let request = ChatRequest::new(self.session.snapshot().to_vec(), self.definitions.clone());
        let response = match self.llm.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    transport = e.kind.is_transport(),
                    "reasoning call failed, substituting fallback reply"
                );
                self.session.append(ChatMessage::assistant(FALLBACK_REPLY));
                return TurnOutcome::Reply(FALLBACK_REPLY.to_string());
            }
        };

        if !response.has_tool_calls() {
            let reply = if response.text().is_empty() {
                FALLBACK_REPLY.to_string()
            } else {
                response.text().to_string()
            };
            self.session.append(ChatMessage::assistant(reply.clone()));
            return TurnOutcome::Reply(reply);
        }

        // The assistant's tool-call message goes into history first so
        // the tool results that follow have something to reference.
        tracing::debug!(phase = "executing_tools", count = response.tool_calls.len());
        let invocations = response.tool_calls.clone();
        self.session.append(ChatMessage::assistant_tool_calls(
            response.text(),
            invocations.clone(),
        ));

        let mut executed: HashSet<String> = HashSet::new();
        let mut terminal: Option<String> = None;

        for (index, invocation) in invocations.iter().enumerate() {
            // At-most-once per invocation id within a turn
            if !executed.insert(invocation.id.clone()) {
                self.session.append(ChatMessage::tool_result(
                    &invocation.id,
                    "Error: duplicate tool invocation id; not executed.",
                ));
                continue;
            }

            let output = match self.registry.dispatch(invocation).await {
                Ok(output) => output,
                Err(e) => {
                    tracing::warn!(tool = %invocation.name, error = %e, "tool dispatch failed");
                    ToolOutput::error(format!("Error: {e}"))
                }
            };
            self.session
                .append(ChatMessage::tool_result(&invocation.id, &output.output));

            if output.terminal {
                // Remaining invocations are folded in as skipped so every
                // back-reference still resolves, then the session ends.
                for skipped in &invocations[index + 1..] {
                    self.session.append(ChatMessage::tool_result(
                        &skipped.id,
                        "Skipped: the session ended before this tool ran.",
                    ));
                }
                terminal = Some(output.output);
                break;
            }
        }

        if let Some(text) = terminal {
            return TurnOutcome::Terminated(text);
        }

        // Finalizing call: updated history, no forced tool use; its
        // plain-text content becomes the reply.
        tracing::debug!(phase = "finalizing");
        let request = ChatRequest::finalizing(self.session.snapshot().to_vec());
        let reply = match self.llm.complete(&request).await {
            Ok(response) if !response.text().is_empty() => response.text().to_string(),
            Ok(_) => {
                tracing::warn!("finalizing call returned no content");
                FALLBACK_REPLY.to_string()
            }
            Err(e) => {
                tracing::error!(error = %e, kind = ?e.kind, "finalizing call failed, substituting fallback reply");
                FALLBACK_REPLY.to_string()
            }
        };
        self.session.append(ChatMessage::assistant(reply.clone()));
        TurnOutcome::Reply(reply)
    }
}

/// Options for the outer session loop
pub struct LoopOptions {
    pub greeting: String,
    pub voice_id: String,
    pub exit_phrases: Vec<String>,
    pub farewell: String,
    pub listen_timeout: Duration,
    pub silence_threshold: Duration,
}

/// Speak with the text-to-speech collaborator; failures are logged and
/// swallowed so they never abort the turn. This is the single decision
/// point for playback transport errors.
async fn speak_best_effort(tts: &dyn TextToSpeech, text: &str, voice_id: &str) {
    if let Err(e) = tts.speak(text, voice_id).await {
        tracing::warn!(error = %e, "speech output failed, continuing without audio");
    }
}

fn is_exit_phrase(text: &str, phrases: &[String]) -> bool {
    let lowered = text.to_lowercase();
    phrases.iter().any(|phrase| lowered.contains(phrase.as_str()))
}

/// Run a session from greeting to termination: listen, check exit
/// phrases between turns, run the turn, speak the reply. A mode router,
/// when present, inspects each utterance before the turn and may swap
/// the system prompt and speaking voice.
pub async fn run_session(
    mut orchestrator: Orchestrator,
    stt: &dyn SpeechToText,
    tts: &dyn TextToSpeech,
    options: LoopOptions,
    router: Option<ModeRouter>,
) {
    let mut voice = options.voice_id.clone();

    speak_best_effort(tts, &options.greeting, &voice).await;
    orchestrator
        .session_mut()
        .append(ChatMessage::assistant(&options.greeting));

    loop {
        let heard = match stt
            .listen(options.listen_timeout, options.silence_threshold)
            .await
        {
            Ok(heard) => heard,
            Err(e) => {
                tracing::warn!(error = %e, "speech input failed, treating as no input");
                None
            }
        };
        // No input this turn is a no-op, not an error
        let Some(user_text) = heard else {
            tracing::debug!("no input this turn");
            continue;
        };

        // Cancellation is coarse: the termination phrase is only checked
        // here, between turns
        if is_exit_phrase(&user_text, &options.exit_phrases) {
            speak_best_effort(tts, &options.farewell, &voice).await;
            tracing::info!(session = %orchestrator.session().id(), "session ended by user");
            return;
        }

        if let Some(router) = router.as_ref() {
            if let Some(switch) = router.apply(&user_text, orchestrator.session_mut()) {
                if let Some(new_voice) = switch.voice {
                    voice = new_voice;
                }
            }
        }

        match orchestrator.run_turn(&user_text).await {
            TurnOutcome::Reply(reply) => {
                speak_best_effort(tts, &reply, &voice).await;
            }
            TurnOutcome::Terminated(text) => {
                speak_best_effort(tts, &text, &voice).await;
                tracing::info!(session = %orchestrator.session().id(), "session ended by tool result");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatResponse, LlmError, Role, ToolInvocation, Usage};
    use crate::tools::Tool;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Mock backend returning queued responses, recording each request
    struct MockLlm {
        responses: Mutex<Vec<Result<ChatResponse, LlmError>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl MockLlm {
        fn new() -> Self {
            Self {
                responses: Mutex::new(Vec::new()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn queue_text(&self, text: &str) {
            self.queue(Ok(ChatResponse {
                content: Some(text.to_string()),
                tool_calls: vec![],
                usage: Usage::default(),
            }));
        }

        fn queue_tool_calls(&self, calls: Vec<ToolInvocation>) {
            self.queue(Ok(ChatResponse {
                content: None,
                tool_calls: calls,
                usage: Usage::default(),
            }));
        }

        fn queue(&self, response: Result<ChatResponse, LlmError>) {
            self.responses.lock().unwrap().push(response);
        }

        fn recorded_requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmService for MockLlm {
        async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(LlmError::network("no mock response queued"));
            }
            responses.remove(0)
        }

        fn model_id(&self) -> &str {
            "mock-model"
        }
    }

    /// Counter tool recording how many times it ran
    struct CountingTool {
        runs: Arc<Mutex<Vec<Value>>>,
        terminal: bool,
    }

    #[async_trait]
    impl Tool for CountingTool {
        fn name(&self) -> &str {
            "counting"
        }

        fn description(&self) -> String {
            "Counts invocations".to_string()
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {}, "required": []})
        }

        async fn run(&self, input: Value) -> ToolOutput {
            self.runs.lock().unwrap().push(input);
            if self.terminal {
                ToolOutput::terminal("All done. Goodbye.")
            } else {
                ToolOutput::success("counted")
            }
        }
    }

    fn invocation(id: &str, name: &str) -> ToolInvocation {
        ToolInvocation {
            id: id.into(),
            name: name.into(),
            arguments: json!({}),
        }
    }

    fn orchestrator_with(
        llm: Arc<MockLlm>,
        terminal: bool,
    ) -> (Orchestrator, Arc<Mutex<Vec<Value>>>) {
        let runs = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(CountingTool {
            runs: runs.clone(),
            terminal,
        }));
        let session = Session::new("You are a test assistant.");
        (Orchestrator::new(llm, registry, session), runs)
    }

    #[tokio::test]
    async fn plain_reply_needs_one_backend_call() {
        let llm = Arc::new(MockLlm::new());
        llm.queue_text("Hello there!");
        let (mut orch, _runs) = orchestrator_with(llm.clone(), false);

        let outcome = orch.run_turn("hi").await;
        assert_eq!(outcome, TurnOutcome::Reply("Hello there!".into()));
        assert_eq!(llm.recorded_requests().len(), 1);

        let roles: Vec<Role> = orch.session().snapshot().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn tool_turn_makes_finalizing_call_without_tools() {
        let llm = Arc::new(MockLlm::new());
        llm.queue_tool_calls(vec![invocation("call_1", "counting")]);
        llm.queue_text("I counted that for you.");
        let (mut orch, runs) = orchestrator_with(llm.clone(), false);

        let outcome = orch.run_turn("count something").await;
        assert_eq!(outcome, TurnOutcome::Reply("I counted that for you.".into()));
        assert_eq!(runs.lock().unwrap().len(), 1);

        let requests = llm.recorded_requests();
        assert_eq!(requests.len(), 2);
        assert!(!requests[0].tools.is_empty(), "first call offers tools");
        assert!(requests[1].tools.is_empty(), "finalizing call offers none");

        // assistant tool-call message precedes the tool result
        let messages = orch.session().snapshot();
        let assistant_idx = messages
            .iter()
            .position(|m| !m.tool_calls.is_empty())
            .unwrap();
        let tool_idx = messages.iter().position(|m| m.role == Role::Tool).unwrap();
        assert!(assistant_idx < tool_idx);
        assert!(orch.session().tool_back_references_resolve());
    }

    #[tokio::test]
    async fn multiple_invocations_run_in_order() {
        let llm = Arc::new(MockLlm::new());
        llm.queue_tool_calls(vec![
            ToolInvocation {
                id: "call_1".into(),
                name: "counting".into(),
                arguments: json!({"step": 1}),
            },
            ToolInvocation {
                id: "call_2".into(),
                name: "counting".into(),
                arguments: json!({"step": 2}),
            },
        ]);
        llm.queue_text("Done twice.");
        let (mut orch, runs) = orchestrator_with(llm, false);

        orch.run_turn("go").await;
        let runs = runs.lock().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0]["step"], 1);
        assert_eq!(runs[1]["step"], 2);
    }

    #[tokio::test]
    async fn unknown_tool_yields_error_message_and_session_continues() {
        let llm = Arc::new(MockLlm::new());
        llm.queue_tool_calls(vec![invocation("call_1", "no_such_tool")]);
        llm.queue_text("Something went sideways, sorry.");
        let (mut orch, _runs) = orchestrator_with(llm.clone(), false);

        let outcome = orch.run_turn("do the thing").await;
        assert!(matches!(outcome, TurnOutcome::Reply(_)));

        let tool_msg = orch
            .session()
            .snapshot()
            .iter()
            .find(|m| m.role == Role::Tool)
            .unwrap();
        assert!(tool_msg.content.contains("Unknown tool"));
        assert!(orch.session().tool_back_references_resolve());
        // finalizing call still happened
        assert_eq!(llm.recorded_requests().len(), 2);
    }

    #[tokio::test]
    async fn terminal_tool_skips_finalizing_call_and_remaining_tools() {
        let llm = Arc::new(MockLlm::new());
        llm.queue_tool_calls(vec![
            invocation("call_1", "counting"),
            invocation("call_2", "counting"),
        ]);
        let (mut orch, runs) = orchestrator_with(llm.clone(), true);

        let outcome = orch.run_turn("finish up").await;
        assert_eq!(outcome, TurnOutcome::Terminated("All done. Goodbye.".into()));
        assert_eq!(runs.lock().unwrap().len(), 1, "second tool never ran");
        assert_eq!(llm.recorded_requests().len(), 1, "no finalizing call");

        // the skipped invocation still has a resolving tool message
        let messages = orch.session().snapshot();
        let skipped = messages
            .iter()
            .find(|m| m.tool_call_id.as_deref() == Some("call_2"))
            .unwrap();
        assert!(skipped.content.contains("Skipped"));
        assert!(orch.session().tool_back_references_resolve());
    }

    #[tokio::test]
    async fn duplicate_invocation_ids_execute_at_most_once() {
        let llm = Arc::new(MockLlm::new());
        llm.queue_tool_calls(vec![
            invocation("call_dup", "counting"),
            invocation("call_dup", "counting"),
        ]);
        llm.queue_text("ok");
        let (mut orch, runs) = orchestrator_with(llm, false);

        orch.run_turn("go").await;
        assert_eq!(runs.lock().unwrap().len(), 1);

        let duplicates: Vec<_> = orch
            .session()
            .snapshot()
            .iter()
            .filter(|m| m.tool_call_id.as_deref() == Some("call_dup"))
            .collect();
        assert_eq!(duplicates.len(), 2, "both invocations get a tool message");
        assert!(duplicates[1].content.contains("duplicate"));
    }

    #[tokio::test]
    async fn backend_failure_substitutes_canned_reply() {
        let llm = Arc::new(MockLlm::new());
        llm.queue(Err(LlmError::network("connection refused")));
        let (mut orch, _runs) = orchestrator_with(llm, false);

        let outcome = orch.run_turn("hello?").await;
        assert_eq!(outcome, TurnOutcome::Reply(FALLBACK_REPLY.into()));
        // history still records what was spoken
        assert_eq!(
            orch.session().snapshot().last().unwrap().content,
            FALLBACK_REPLY
        );
    }

    #[tokio::test]
    async fn finalizing_failure_substitutes_canned_reply() {
        let llm = Arc::new(MockLlm::new());
        llm.queue_tool_calls(vec![invocation("call_1", "counting")]);
        llm.queue(Err(LlmError::server_error("500")));
        let (mut orch, runs) = orchestrator_with(llm, false);

        let outcome = orch.run_turn("go").await;
        assert_eq!(outcome, TurnOutcome::Reply(FALLBACK_REPLY.into()));
        assert_eq!(runs.lock().unwrap().len(), 1, "the tool still ran");
    }

    #[test]
    fn exit_phrases_match_case_insensitively() {
        let phrases = vec!["bye".to_string(), "goodbye".to_string()];
        assert!(is_exit_phrase("Okay BYE now", &phrases));
        assert!(is_exit_phrase("goodbye!", &phrases));
        assert!(!is_exit_phrase("buy milk", &phrases));
    }

    // ------------------------------------------------------------------
    // Session loop
    // ------------------------------------------------------------------

    use crate::speech::SpeechError;

    /// Scripted microphone: yields the queued utterances, then EOF-style
    /// silence forever
    struct ScriptedMic {
        utterances: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedMic {
        fn speaking(lines: &[Option<&str>]) -> Self {
            Self {
                utterances: Mutex::new(
                    lines.iter().map(|l| l.map(String::from)).collect(),
                ),
            }
        }
    }

    #[async_trait]
    impl SpeechToText for ScriptedMic {
        async fn listen(
            &self,
            _timeout: Duration,
            _silence_threshold: Duration,
        ) -> Result<Option<String>, SpeechError> {
            let mut utterances = self.utterances.lock().unwrap();
            if utterances.is_empty() {
                // a real session would keep waiting; tests must not
                panic!("session loop outlived the script");
            }
            Ok(utterances.remove(0))
        }
    }

    /// Speaker that records every line, optionally failing each time
    struct RecordingSpeaker {
        spoken: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl RecordingSpeaker {
        fn new(fail: bool) -> Self {
            Self {
                spoken: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl TextToSpeech for RecordingSpeaker {
        async fn speak(&self, text: &str, voice_id: &str) -> Result<(), SpeechError> {
            self.spoken
                .lock()
                .unwrap()
                .push((voice_id.to_string(), text.to_string()));
            if self.fail {
                Err(SpeechError::Service {
                    status: 500,
                    body: "synthetic outage".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn loop_options() -> LoopOptions {
        LoopOptions {
            greeting: "Welcome!".into(),
            voice_id: "en-US-natalie".into(),
            exit_phrases: vec!["bye".into()],
            farewell: "Goodbye!".into(),
            listen_timeout: Duration::from_secs(1),
            silence_threshold: Duration::from_millis(500),
        }
    }

    #[tokio::test]
    async fn loop_greets_replies_and_ends_on_exit_phrase() {
        let llm = Arc::new(MockLlm::new());
        llm.queue_text("Nice to meet you.");
        let (orch, _runs) = orchestrator_with(llm, false);

        // silence first: the no-input turn is a no-op, not an error
        let mic = ScriptedMic::speaking(&[None, Some("hello"), Some("ok bye")]);
        let speaker = RecordingSpeaker::new(false);

        run_session(orch, &mic, &speaker, loop_options(), None).await;

        let spoken = speaker.spoken.lock().unwrap();
        let lines: Vec<&str> = spoken.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(lines, vec!["Welcome!", "Nice to meet you.", "Goodbye!"]);
    }

    #[tokio::test]
    async fn loop_stops_after_terminal_tool_result() {
        let llm = Arc::new(MockLlm::new());
        llm.queue_tool_calls(vec![invocation("call_1", "counting")]);
        let (orch, _runs) = orchestrator_with(llm, true);

        let mic = ScriptedMic::speaking(&[Some("finish my order")]);
        let speaker = RecordingSpeaker::new(false);

        run_session(orch, &mic, &speaker, loop_options(), None).await;

        let spoken = speaker.spoken.lock().unwrap();
        assert_eq!(spoken.last().unwrap().1, "All done. Goodbye.");
    }

    #[tokio::test]
    async fn speech_output_failures_never_abort_the_session() {
        let llm = Arc::new(MockLlm::new());
        llm.queue_text("Still here.");
        let (orch, _runs) = orchestrator_with(llm, false);

        let mic = ScriptedMic::speaking(&[Some("hello"), Some("bye")]);
        let speaker = RecordingSpeaker::new(true);

        // completes normally despite every speak() failing
        run_session(orch, &mic, &speaker, loop_options(), None).await;
        assert_eq!(speaker.spoken.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn router_switches_voice_for_subsequent_replies() {
        use crate::session::{ModeDef, ModeRouter};

        let llm = Arc::new(MockLlm::new());
        llm.queue_text("Quiz time. First question...");
        let (orch, _runs) = orchestrator_with(llm, false);

        let router = ModeRouter::new(
            vec![ModeDef {
                name: "quiz".into(),
                keywords: vec!["quiz".into()],
                voice: Some("en-US-amara".into()),
            }],
            vec![],
            Box::new(|mode, _| format!("MODE: {mode}")),
        );

        let mic = ScriptedMic::speaking(&[Some("let's do a quiz"), Some("bye")]);
        let speaker = RecordingSpeaker::new(false);

        run_session(orch, &mic, &speaker, loop_options(), Some(router)).await;

        let spoken = speaker.spoken.lock().unwrap();
        assert_eq!(spoken[0].0, "en-US-natalie", "greeting uses the default voice");
        assert_eq!(spoken[1].0, "en-US-amara", "reply uses the quiz voice");
    }
}
