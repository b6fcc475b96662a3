//! CLI configuration, a thin wrapper around `billdesk_config`.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` overrides (--server, --timeout, --insecure).

use std::time::Duration;

use billdesk_core::{ConsoleConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use billdesk_config::{
    Config, Profile, check_min_call_balance, config_path, load_config, parse_server,
    profile_to_console_config, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the console configuration: profile first, flags on top.
///
/// Without a matching profile, `--server` alone is enough. An explicitly
/// named profile that doesn't exist is an error.
pub fn resolve_console_config(global: &GlobalOpts) -> Result<ConsoleConfig, CliError> {
    let cfg = load_config()?;
    let name = active_profile_name(global, &cfg);

    let mut resolved = match (cfg.profile(&name), global.server.as_deref()) {
        (Some(profile), server) => {
            let mut profile = profile.clone();
            if let Some(server) = server {
                profile.server = server.to_owned();
            }
            profile_to_console_config(&profile, &cfg.defaults)?
        }
        (None, _) if global.profile.is_some() => {
            return Err(profile_not_found(&name, &cfg));
        }
        (None, Some(server)) => {
            let mut console = ConsoleConfig::new(parse_server(server)?);
            console.timeout = Duration::from_secs(cfg.defaults.timeout);
            console.stale_time = Duration::from_secs(cfg.defaults.stale_secs);
            console
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(secs) = global.timeout {
        resolved.timeout = Duration::from_secs(secs);
    }
    if global.insecure {
        resolved.tls = TlsVerification::DangerAcceptInvalid;
    }
    Ok(resolved)
}

pub fn profile_not_found(name: &str, cfg: &Config) -> CliError {
    let names = cfg.profile_names();
    CliError::ProfileNotFound {
        name: name.into(),
        available: if names.is_empty() {
            "(none)".into()
        } else {
            names.join(", ")
        },
    }
}
