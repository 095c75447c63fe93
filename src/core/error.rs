//! Bridge error types

use thiserror::Error;

/// Errors that can occur while loading or driving an agent
#[derive(Error, Debug)]
pub enum BridgeError {
    /// No module factory registered under this name
    #[error("Could not import agent module '{0}': no such module")]
    ModuleNotFound(String),

    /// The module factory itself failed
    #[error("Could not import agent module '{module}': {reason}")]
    ModuleImportFailed {
        /// Module name
        module: String,
        /// Failure reported by the factory
        reason: String,
    },

    /// An explicitly named export is missing from the module
    #[error("Module {module} does not have '{attribute}' attribute")]
    AttributeMissing {
        /// Module name
        module: String,
        /// Requested export
        attribute: String,
    },

    /// Neither `agent` nor `graph` is exported
    #[error("Module {0} does not have 'agent' or 'graph' attribute")]
    NoDefaultExport(String),

    /// No agent handle is loaded
    #[error("{0}")]
    AgentNotLoaded(String),
}

impl BridgeError {
    /// Whether this error happened while importing (as opposed to binding)
    pub fn is_import_error(&self) -> bool {
        matches!(
            self,
            BridgeError::ModuleNotFound(_) | BridgeError::ModuleImportFailed { .. }
        )
    }
}

/// Result type alias for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
