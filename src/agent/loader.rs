//! Agent loading
//!
//! Agents are published by *modules*: named factories registered in a
//! [`ModuleRegistry`] that build an [`AgentModule`] of named exports. An
//! [`AgentLocation`] (`module:variable`) picks the export to bind. Without
//! an explicit variable the loader tries `agent`, then `graph`.
//!
//! ```ignore
//! let mut registry = ModuleRegistry::new();
//! registry.register("my_agent", || {
//!     Ok(AgentModule::new().with_export("agent", Arc::new(MyAgent::new()?)))
//! });
//!
//! let mut loader = AgentLoader::new(registry, AgentLocation::new("my_agent"));
//! let agent = loader.load()?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::{BridgeError, BridgeResult};

use super::capability::Agent;

/// Export names tried when no variable is given
pub const DEFAULT_EXPORTS: &[&str] = &["agent", "graph"];

/// Where to find the agent: a module and an optional export name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentLocation {
    pub module: String,
    pub variable: Option<String>,
}

impl AgentLocation {
    /// Location with no explicit export name
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            variable: None,
        }
    }

    /// Set the export name
    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        let variable = variable.into();
        self.variable = if variable.is_empty() {
            None
        } else {
            Some(variable)
        };
        self
    }

    /// Parse `module:variable`, splitting on the first colon
    pub fn parse(path: &str) -> Option<Self> {
        let (module, variable) = path.split_once(':')?;
        Some(Self::new(module).with_variable(variable))
    }

    /// Pick the location from defaults and an optional override
    ///
    /// A malformed override is logged and ignored.
    pub fn resolve(
        default_module: &str,
        default_variable: Option<&str>,
        agent_path: Option<&str>,
    ) -> Self {
        let defaults = || {
            let location = Self::new(default_module);
            match default_variable {
                Some(variable) => location.with_variable(variable),
                None => location,
            }
        };

        let Some(path) = agent_path else {
            return defaults();
        };

        match Self::parse(path) {
            Some(location) => {
                tracing::info!("Using agent from environment: {}", location);
                location
            }
            None => {
                tracing::warn!(
                    "Agent path override should be 'module:variable', got: {}; using default: {}",
                    path,
                    default_module
                );
                defaults()
            }
        }
    }
}

impl fmt::Display for AgentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variable {
            Some(variable) => write!(f, "{}:{}", self.module, variable),
            None => write!(f, "{}", self.module),
        }
    }
}

/// Named agent exports of a module
#[derive(Clone, Default)]
pub struct AgentModule {
    exports: HashMap<String, Arc<dyn Agent>>,
}

impl AgentModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an export
    pub fn with_export(mut self, name: impl Into<String>, agent: Arc<dyn Agent>) -> Self {
        self.exports.insert(name.into(), agent);
        self
    }

    /// Look up an export
    pub fn get(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.exports.get(name).cloned()
    }

    /// Export names, sorted
    pub fn export_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.exports.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for AgentModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentModule")
            .field("exports", &self.export_names())
            .finish()
    }
}

/// Factory that builds a module's exports
pub type ModuleFactory = Arc<dyn Fn() -> anyhow::Result<AgentModule> + Send + Sync>;

/// Registry of importable agent modules
///
/// `import` builds a module once and caches it; `reload` rebuilds it.
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    factories: HashMap<String, ModuleFactory>,
    imported: HashMap<String, AgentModule>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module factory, replacing any previous one
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> anyhow::Result<AgentModule> + Send + Sync + 'static,
    {
        let name = name.into();
        self.imported.remove(&name);
        self.factories.insert(name, Arc::new(factory));
    }

    /// Register a module with a single agent export
    pub fn register_agent(
        &mut self,
        module: impl Into<String>,
        export: impl Into<String>,
        agent: Arc<dyn Agent>,
    ) {
        let export = export.into();
        self.register(module, move || {
            Ok(AgentModule::new().with_export(export.clone(), agent.clone()))
        });
    }

    /// Check if a module has been imported
    pub fn is_imported(&self, name: &str) -> bool {
        self.imported.contains_key(name)
    }

    /// Import a module, building it on first use
    pub fn import(&mut self, name: &str) -> BridgeResult<&AgentModule> {
        if !self.imported.contains_key(name) {
            let module = self.build(name)?;
            self.imported.insert(name.to_string(), module);
        }
        self.imported
            .get(name)
            .ok_or_else(|| BridgeError::ModuleNotFound(name.to_string()))
    }

    /// Rebuild a module from its factory
    pub fn reload(&mut self, name: &str) -> BridgeResult<&AgentModule> {
        self.imported.remove(name);
        tracing::debug!("Reloading agent module {}", name);
        self.import(name)
    }

    fn build(&self, name: &str) -> BridgeResult<AgentModule> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| BridgeError::ModuleNotFound(name.to_string()))?;
        factory().map_err(|e| BridgeError::ModuleImportFailed {
            module: name.to_string(),
            reason: format!("{:#}", e),
        })
    }
}

/// Resolves an [`AgentLocation`] against a [`ModuleRegistry`]
pub struct AgentLoader {
    registry: ModuleRegistry,
    location: AgentLocation,
}

impl AgentLoader {
    pub fn new(registry: ModuleRegistry, location: AgentLocation) -> Self {
        Self { registry, location }
    }

    pub fn location(&self) -> &AgentLocation {
        &self.location
    }

    /// Import the module (cached) and bind the agent
    pub fn load(&mut self) -> BridgeResult<Arc<dyn Agent>> {
        let module = self.registry.import(&self.location.module)?;
        let agent = bind(&self.location, module)?;
        tracing::info!("Loaded agent from {}", describe_binding(&self.location, module));
        Ok(agent)
    }

    /// Rebuild the module and bind again
    pub fn reload(&mut self) -> BridgeResult<Arc<dyn Agent>> {
        if self.registry.is_imported(&self.location.module) {
            self.registry.reload(&self.location.module)?;
        }
        self.load()
    }
}

fn describe_binding(location: &AgentLocation, module: &AgentModule) -> String {
    let export = match &location.variable {
        Some(variable) => variable.as_str(),
        None => DEFAULT_EXPORTS
            .iter()
            .copied()
            .find(|name| module.get(name).is_some())
            .unwrap_or("agent"),
    };
    format!("{}.{}", location.module, export)
}

fn bind(location: &AgentLocation, module: &AgentModule) -> BridgeResult<Arc<dyn Agent>> {
    match &location.variable {
        Some(variable) => module
            .get(variable)
            .ok_or_else(|| BridgeError::AttributeMissing {
                module: location.module.clone(),
                attribute: variable.clone(),
            }),
        None => DEFAULT_EXPORTS
            .iter()
            .find_map(|name| module.get(name))
            .ok_or_else(|| BridgeError::NoDefaultExport(location.module.clone())),
    }
}
