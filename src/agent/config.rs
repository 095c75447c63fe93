//! Bridge Configuration
//!
//! Where the agent lives and how the bridge logs.

use std::env;

use crate::logging::LoggingConfig;

use super::loader::AgentLocation;

/// Environment variable overriding the agent location (`module:variable`)
pub const AGENT_PATH_ENV: &str = "JUPYTER_AGENT_PATH";

/// Module loaded when nothing else is configured
pub const DEFAULT_MODULE: &str = "my_agent";

/// Configuration for an `AgentWrapper`
///
/// Use the builder pattern to configure the bridge:
///
/// ```ignore
/// let config = BridgeConfig::new()
///     .with_default_module("research_agent")
///     .with_agent_path_override("research_agent:graph");
/// ```
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Module to load when no override is set
    pub default_module: String,

    /// Export to bind; `None` tries `agent` then `graph`
    pub default_variable: Option<String>,

    /// Raw `module:variable` override, usually from `JUPYTER_AGENT_PATH`
    pub agent_path_override: Option<String>,

    /// Logging setup
    pub logging: LoggingConfig,
}

impl BridgeConfig {
    /// Create a configuration with defaults and no override
    pub fn new() -> Self {
        Self {
            default_module: DEFAULT_MODULE.to_string(),
            default_variable: None,
            agent_path_override: None,
            logging: LoggingConfig::default(),
        }
    }

    /// Build a configuration from the process environment
    ///
    /// A `.env` file in the working directory (or a parent) is loaded first;
    /// variables already set in the environment win.
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("Failed to load .env file: {}", e),
        }

        Self {
            agent_path_override: env::var(AGENT_PATH_ENV).ok().filter(|v| !v.is_empty()),
            logging: LoggingConfig::from_env(),
            ..Self::new()
        }
    }

    /// Set the module loaded when no override is set
    pub fn with_default_module(mut self, module: impl Into<String>) -> Self {
        self.default_module = module.into();
        self
    }

    /// Set the export bound when no override is set
    pub fn with_default_variable(mut self, variable: impl Into<String>) -> Self {
        self.default_variable = Some(variable.into());
        self
    }

    /// Set the raw `module:variable` override
    pub fn with_agent_path_override(mut self, path: impl Into<String>) -> Self {
        self.agent_path_override = Some(path.into());
        self
    }

    /// Set the logging configuration
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Resolve the agent location, falling back on malformed overrides
    pub fn location(&self) -> AgentLocation {
        AgentLocation::resolve(
            &self.default_module,
            self.default_variable.as_deref(),
            self.agent_path_override.as_deref(),
        )
    }

    /// Message reported when no agent could be loaded
    pub fn not_loaded_message(&self) -> String {
        match &self.agent_path_override {
            Some(path) => format!("Agent not loaded. Check {}: {}", AGENT_PATH_ENV, path),
            None => format!(
                "Agent not loaded. Please create {} with your agent or set {}.",
                self.default_module, AGENT_PATH_ENV
            ),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_location() {
        let config = BridgeConfig::new();
        assert_eq!(config.location(), AgentLocation::new("my_agent"));
    }

    #[test]
    fn test_override_location() {
        let config = BridgeConfig::new().with_agent_path_override("team.agents:reviewer");
        assert_eq!(
            config.location(),
            AgentLocation::new("team.agents").with_variable("reviewer")
        );
    }

    #[test]
    fn test_malformed_override_falls_back() {
        let config = BridgeConfig::new()
            .with_default_variable("graph")
            .with_agent_path_override("team.agents");
        assert_eq!(
            config.location(),
            AgentLocation::new("my_agent").with_variable("graph")
        );
    }

    #[test]
    fn test_not_loaded_messages() {
        assert_eq!(
            BridgeConfig::new().not_loaded_message(),
            "Agent not loaded. Please create my_agent with your agent or set JUPYTER_AGENT_PATH."
        );
        assert_eq!(
            BridgeConfig::new()
                .with_agent_path_override("x:y")
                .not_loaded_message(),
            "Agent not loaded. Check JUPYTER_AGENT_PATH: x:y"
        );
    }
}
