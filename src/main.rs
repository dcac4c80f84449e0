//! parlance - voice-driven conversational demos
//!
//! A set of tool-augmented dialogue agents (grocery ordering, wellness
//! check-ins, fraud verification, lead qualification, role-play gaming,
//! tutoring) sharing one turn orchestrator.

mod apps;
mod config;
mod domain;
mod llm;
mod orchestrator;
mod persist;
mod session;
mod speech;
mod tools;

use config::Config;
use llm::{LlmService, LoggingService, OpenAiService};
use orchestrator::{run_session, LoopOptions, Orchestrator};
use persist::JsonStore;
use speech::{ConsoleVoice, MurfSpeech, TextToSpeech};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parlance=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let mut args = std::env::args().skip(1);
    let app_name = args.next().unwrap_or_else(|| "grocer".to_string());
    let extra = args.next();

    let api_key = config
        .openai_api_key
        .clone()
        .ok_or("OPENAI_API_KEY is not set (put it in .env or the environment)")?;

    let store = JsonStore::open(&config.data_dir)?;
    tracing::info!(data_dir = %config.data_dir.display(), app = %app_name, "starting session");

    let app = apps::build(&app_name, &store, extra.as_deref())?;

    let backend: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(OpenAiService::new(
        api_key,
        config.model.clone(),
        config.openai_base_url.as_deref(),
    ))));
    tracing::info!(model = %backend.model_id(), "reasoning backend ready");

    let console = ConsoleVoice;
    let murf: Option<MurfSpeech> = config
        .murf_api_key
        .clone()
        .map(|key| MurfSpeech::new(key, config.data_dir.join("response.mp3")));
    if murf.is_none() {
        tracing::warn!("MURF_API_KEY not set, replies will be printed instead of spoken");
    }
    let tts: &dyn TextToSpeech = match &murf {
        Some(murf) => murf,
        None => &console,
    };

    let options = LoopOptions {
        greeting: app.greeting.clone(),
        voice_id: app.voice_id.clone(),
        exit_phrases: app.exit_phrases.clone(),
        farewell: app.farewell.clone(),
        listen_timeout: config.listen_timeout,
        silence_threshold: config.silence_threshold,
    };

    let orchestrator = Orchestrator::new(backend, app.registry, app.session);
    run_session(orchestrator, &console, tts, options, app.router).await;

    Ok(())
}
