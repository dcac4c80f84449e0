//! Demo application wiring
//!
//! Each application assembles the same parts a different way: a system
//! prompt, a tool registry over its domain state, a greeting, a voice,
//! and the phrases that end the call.

mod coach;
mod fraud_desk;
mod gamemaster;
mod grocer;
mod sdr;
mod wellness;

use crate::persist::JsonStore;
use crate::session::{ModeRouter, Session};
use crate::tools::ToolRegistry;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unknown application '{0}' (known: grocer, gamemaster, fraud, sdr, wellness, coach)")]
    UnknownApp(String),
    #[error("no fraud case on file for '{0}'")]
    UnknownCase(String),
    #[error(transparent)]
    Store(#[from] crate::persist::StoreError),
}

/// A fully wired demo application
pub struct App {
    pub session: Session,
    pub registry: ToolRegistry,
    pub greeting: String,
    pub voice_id: String,
    pub exit_phrases: Vec<String>,
    pub farewell: String,
    pub router: Option<ModeRouter>,
}

/// Build an application by name. `extra` carries the optional second
/// CLI argument (the fraud desk uses it as the case username).
pub fn build(name: &str, store: &JsonStore, extra: Option<&str>) -> Result<App, AppError> {
    match name {
        "grocer" => grocer::build(store),
        "gamemaster" => gamemaster::build(store),
        "fraud" => fraud_desk::build(store, extra.unwrap_or("john_doe")),
        "sdr" => sdr::build(store),
        "wellness" => wellness::build(store),
        "coach" => Ok(coach::build()),
        other => Err(AppError::UnknownApp(other.to_string())),
    }
}
