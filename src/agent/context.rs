//! BridgeContext - owner of the process's single agent wrapper
//!
//! The host creates one context at startup and passes it to whatever serves
//! requests. The wrapper is built (and the agent loaded) on first use and
//! reused afterwards; `reset` drops it so the next access loads afresh.

use super::config::BridgeConfig;
use super::loader::ModuleRegistry;
use super::wrapper::AgentWrapper;

/// Lazily initialized holder for one [`AgentWrapper`]
pub struct BridgeContext {
    config: BridgeConfig,
    registry: ModuleRegistry,
    wrapper: Option<AgentWrapper>,
}

impl BridgeContext {
    /// Create a context; nothing is loaded until [`wrapper`](Self::wrapper)
    pub fn new(config: BridgeConfig, registry: ModuleRegistry) -> Self {
        Self {
            config,
            registry,
            wrapper: None,
        }
    }

    /// Get the wrapper, creating it on first use
    pub fn wrapper(&mut self) -> &mut AgentWrapper {
        let config = &self.config;
        let registry = &self.registry;
        self.wrapper.get_or_insert_with(|| {
            tracing::debug!("Creating agent wrapper");
            AgentWrapper::new(config.clone(), registry.clone())
        })
    }

    /// Check if the wrapper has been created
    pub fn is_initialized(&self) -> bool {
        self.wrapper.is_some()
    }

    /// Drop the wrapper; the next access creates a new one
    pub fn reset(&mut self) {
        if self.wrapper.take().is_some() {
            tracing::debug!("Agent wrapper reset");
        }
    }

    /// Register or replace a module; takes effect after `reset` or `reload`
    pub fn registry_mut(&mut self) -> &mut ModuleRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}
