//! Application state
//!
//! Shared state across all handlers.

use std::sync::Arc;

use coaching_agent_agent::CoachingEngine;
use coaching_agent_config::Settings;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Resolved configuration
    pub config: Arc<Settings>,
    /// The conversation flow engine
    pub engine: Arc<CoachingEngine>,
}

impl AppState {
    pub fn new(config: Settings, engine: Arc<CoachingEngine>) -> Self {
        Self {
            config: Arc::new(config),
            engine,
        }
    }
}
