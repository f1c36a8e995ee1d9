//! CLI error types with miette diagnostics.
//!
//! Maps `ApiError` into user-facing errors with a hint about what to check.

use miette::Diagnostic;
use thiserror::Error;

use ryu_core::ApiError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
    pub const REJECTED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("Could not reach the controller at {endpoint}")]
    #[diagnostic(
        code(ryu::connection_failed),
        help(
            "Check that ryu-manager is running with ryu.app.ofctl_rest loaded.\n\
             Endpoint: {endpoint}\n\
             Override with --endpoint or RYU_ENDPOINT."
        )
    )]
    ConnectionFailed {
        endpoint: String,
        #[source]
        source: ApiError,
    },

    #[error("The controller answered with a body that is not JSON")]
    #[diagnostic(
        code(ryu::bad_response),
        help(
            "This usually means the datapath id is unknown.\n\
             Run `ryu-rest switches` to list connected switches."
        )
    )]
    BadResponse {
        #[source]
        source: ApiError,
    },

    #[error("Invalid JSON in {what}")]
    #[diagnostic(code(ryu::invalid_json))]
    InvalidJson {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    #[diagnostic(code(ryu::usage))]
    Usage(String),

    #[error("The controller rejected the request")]
    #[diagnostic(
        code(ryu::rejected),
        help("Run again with `debug` as the first argument to see the URI and payload sent.")
    )]
    Rejected,

    #[error("No switches are connected to the controller")]
    #[diagnostic(code(ryu::no_switches))]
    NoSwitches,

    #[error("Config file not found: {path}")]
    #[diagnostic(code(ryu::config_not_found))]
    ConfigNotFound { path: String },

    #[error("Config loading failed: {0}")]
    #[diagnostic(code(ryu::config))]
    Config(Box<figment::Error>),

    #[error("Could not write output: {0}")]
    #[diagnostic(code(ryu::io))]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Translate a client error, keeping the endpoint for the hint.
    pub fn from_api(endpoint: &str, err: ApiError) -> Self {
        if err.is_transport() {
            Self::ConnectionFailed {
                endpoint: endpoint.to_string(),
                source: err,
            }
        } else {
            Self::BadResponse { source: err }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Rejected => exit_code::REJECTED,
            Self::InvalidJson { .. }
            | Self::Usage(_)
            | Self::ConfigNotFound { .. }
            | Self::Config(_) => exit_code::USAGE,
            Self::BadResponse { .. } | Self::NoSwitches | Self::Io(_) => exit_code::GENERAL,
        }
    }
}
