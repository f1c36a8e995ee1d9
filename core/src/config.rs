//! Client configuration.
//!
//! Read-only once the client is constructed; there is no process-wide state.

use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080";

/// Literal argument that switches on request echoing.
pub const DEBUG_ARG: &str = "debug";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URI of the controller's REST interface.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Echo every request URI (and write payload) through `tracing`.
    #[serde(default)]
    pub debug: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            debug: false,
        }
    }
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            debug: false,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// `true` iff the first argument after the program name is exactly `debug`.
    pub fn debug_requested<I, S>(args: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        args.into_iter()
            .nth(1)
            .is_some_and(|arg| arg.as_ref() == DEBUG_ARG)
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
