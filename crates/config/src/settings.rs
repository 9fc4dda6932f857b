//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Runtime environment enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Language model configuration
    #[serde(default)]
    pub llm: LlmSettings,

    /// Conversation engine tuning parameters
    #[serde(default)]
    pub engine: EngineParams,

    /// Persistence configuration
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS origin checking (false allows all origins, dev only)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins; empty defaults to localhost:3000
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Language model configuration
///
/// When `api_key` resolves to nothing the engine runs entirely on the
/// fallback responder and every envelope carries `demo_mode = true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// OpenAI-compatible API endpoint
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API key; falls back to the OPENAI_API_KEY environment variable
    #[serde(default = "default_api_key")]
    pub api_key: Option<String>,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds; on expiry the turn falls back
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key: default_api_key(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl LlmSettings {
    /// Whether a model backend should be constructed at all
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Conversation engine tuning parameters
///
/// The depth thresholds drive stage progression when no content trigger
/// fires first: a session reaches Reflection at `reflection_depth` user
/// messages, ActionPlanning at `action_planning_depth`, FollowUp at
/// `follow_up_depth`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineParams {
    /// User-message depth that forces Exploration -> Reflection
    #[serde(default = "default_reflection_depth")]
    pub reflection_depth: usize,

    /// User-message depth that forces Reflection -> ActionPlanning
    #[serde(default = "default_action_planning_depth")]
    pub action_planning_depth: usize,

    /// User-message depth that forces ActionPlanning -> FollowUp
    #[serde(default = "default_follow_up_depth")]
    pub follow_up_depth: usize,

    /// Trailing history window (messages) for theme mention counting
    #[serde(default = "default_mention_window")]
    pub mention_window: usize,

    /// How many recently emitted fallback responses to remember per session
    #[serde(default = "default_recent_response_memory")]
    pub recent_response_memory: usize,

    /// How many trailing history messages to send to the language model
    #[serde(default = "default_llm_history_window")]
    pub llm_history_window: usize,

    /// Follow-up questions attached to each reply
    #[serde(default = "default_questions_per_reply")]
    pub questions_per_reply: usize,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            reflection_depth: default_reflection_depth(),
            action_planning_depth: default_action_planning_depth(),
            follow_up_depth: default_follow_up_depth(),
            mention_window: default_mention_window(),
            recent_response_memory: default_recent_response_memory(),
            llm_history_window: default_llm_history_window(),
            questions_per_reply: default_questions_per_reply(),
        }
    }
}

/// Persistence configuration (SQLite)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Enable SQLite persistence (false = in-memory only)
    #[serde(default)]
    pub enabled: bool,

    /// Path to the SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            database_path: default_database_path(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    30
}

fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key() -> Option<String> {
    std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty())
}

fn default_max_tokens() -> usize {
    300
}

fn default_temperature() -> f32 {
    0.7
}

fn default_llm_timeout() -> u64 {
    15
}

fn default_reflection_depth() -> usize {
    5
}

fn default_action_planning_depth() -> usize {
    7
}

fn default_follow_up_depth() -> usize {
    9
}

fn default_mention_window() -> usize {
    8
}

fn default_recent_response_memory() -> usize {
    3
}

fn default_llm_history_window() -> usize {
    6
}

fn default_questions_per_reply() -> usize {
    2
}

fn default_database_path() -> String {
    "coaching_sessions.db".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_engine()?;
        self.validate_llm()?;
        Ok(())
    }

    fn validate_engine(&self) -> Result<(), ConfigError> {
        let engine = &self.engine;

        if engine.reflection_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.reflection_depth".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        // Thresholds must be strictly ordered or the stage machine would
        // skip stages on a single message.
        if engine.action_planning_depth <= engine.reflection_depth {
            return Err(ConfigError::InvalidValue {
                field: "engine.action_planning_depth".to_string(),
                message: format!(
                    "Must be greater than reflection_depth ({})",
                    engine.reflection_depth
                ),
            });
        }

        if engine.follow_up_depth <= engine.action_planning_depth {
            return Err(ConfigError::InvalidValue {
                field: "engine.follow_up_depth".to_string(),
                message: format!(
                    "Must be greater than action_planning_depth ({})",
                    engine.action_planning_depth
                ),
            });
        }

        if engine.mention_window == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.mention_window".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if engine.recent_response_memory == 0 || engine.recent_response_memory > 10 {
            return Err(ConfigError::InvalidValue {
                field: "engine.recent_response_memory".to_string(),
                message: "Must be between 1 and 10".to_string(),
            });
        }

        if engine.questions_per_reply == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.questions_per_reply".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        let llm = &self.llm;

        if !(0.0..=2.0).contains(&llm.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "llm.temperature".to_string(),
                message: format!("Must be between 0.0 and 2.0, got {}", llm.temperature),
            });
        }

        if llm.timeout_secs == 0 || llm.timeout_secs > 120 {
            return Err(ConfigError::InvalidValue {
                field: "llm.timeout_secs".to_string(),
                message: "Must be between 1 and 120 seconds".to_string(),
            });
        }

        if llm.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.max_tokens".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Load settings from files and environment
///
/// Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("COACHING_AGENT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.engine.reflection_depth, 5);
        assert_eq!(settings.engine.action_planning_depth, 7);
        assert_eq!(settings.engine.follow_up_depth, 9);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_depth_thresholds_must_be_ordered() {
        let mut settings = Settings::default();
        settings.engine.action_planning_depth = 4; // below reflection_depth
        assert!(settings.validate().is_err());

        settings.engine.action_planning_depth = 7;
        settings.engine.follow_up_depth = 7; // equal is also invalid
        assert!(settings.validate().is_err());

        settings.engine.follow_up_depth = 9;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_llm_validation() {
        let mut settings = Settings::default();
        settings.llm.temperature = 3.0;
        assert!(settings.validate().is_err());

        settings.llm.temperature = 0.7;
        settings.llm.timeout_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_llm_is_configured() {
        let mut llm = LlmSettings::default();
        llm.api_key = None;
        assert!(!llm.is_configured());

        llm.api_key = Some(String::new());
        assert!(!llm.is_configured());

        llm.api_key = Some("sk-test".to_string());
        assert!(llm.is_configured());
    }
}
