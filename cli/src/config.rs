//! Layered configuration: defaults, TOML file, `RYU_*` environment, flags.
//!
//! Core never sees these layers; it receives a finished `ClientConfig`.

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use ryu_core::ClientConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "ryu-rest.toml";

pub const ENV_PREFIX: &str = "RYU_";

/// Resolve the client configuration.
///
/// Precedence, lowest first: built-in defaults, config file, `RYU_ENDPOINT` /
/// `RYU_DEBUG`, `--endpoint`. The literal `debug` argument can only switch
/// debugging on.
pub fn resolve(global: &GlobalOpts, debug_arg: bool) -> Result<ClientConfig, CliError> {
    let mut config: ClientConfig = figment(global.config.as_deref())?.extract()?;
    if let Some(endpoint) = &global.endpoint {
        config.endpoint.clone_from(endpoint);
    }
    config.debug |= debug_arg;
    Ok(config)
}

fn figment(explicit: Option<&Path>) -> Result<Figment, CliError> {
    let base = Figment::from(Serialized::defaults(ClientConfig::default()));
    let with_file = match explicit {
        Some(path) if !path.exists() => {
            return Err(CliError::ConfigNotFound {
                path: path.display().to_string(),
            })
        }
        Some(path) => base.merge(Toml::file(path)),
        None => base.merge(Toml::file(DEFAULT_CONFIG_FILE)),
    };
    Ok(with_file.merge(Env::prefixed(ENV_PREFIX).only(&["endpoint", "debug"])))
}
