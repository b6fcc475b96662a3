//! Config subcommand handlers.

use dialoguer::{Confirm, Input};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// The effective configuration as it would be written to disk.
fn format_config(cfg: &Config) -> Result<String, CliError> {
    Ok(toml::to_string_pretty(cfg)?.trim_end().to_owned())
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn parse_value<T: std::str::FromStr>(field: &str, value: &str, hint: &str) -> Result<T, CliError> {
    value.trim().parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: hint.into(),
    })
}

/// Apply `key = value` to a profile.
fn set_profile_key(profile: &mut Profile, key: &str, value: &str) -> Result<(), CliError> {
    match key {
        "server" => {
            config::parse_server(value)?;
            profile.server = value.trim().to_owned();
        }
        "timeout" => {
            profile.timeout = Some(parse_value(key, value, "must be a number (seconds)")?);
        }
        "stale_secs" | "stale-secs" => {
            profile.stale_secs = Some(parse_value(key, value, "must be a number (seconds)")?);
        }
        "min_call_balance" | "min-call-balance" => {
            let min: f64 = parse_value(key, value, "must be a number")?;
            profile.min_call_balance = Some(config::check_min_call_balance(min)?);
        }
        "insecure" => {
            profile.insecure = Some(parse_value(key, value, "must be 'true' or 'false'")?);
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: server, timeout, \
                     stale_secs, min_call_balance, insecure, ca_cert"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("billdesk configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let mut cfg = config::load_config()?;

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            if cfg.profiles.contains_key(&profile_name)
                && !Confirm::new()
                    .with_prompt(format!("Profile '{profile_name}' exists. Overwrite?"))
                    .default(false)
                    .interact()
                    .map_err(prompt_err)?
            {
                return Ok(());
            }

            let server: String = Input::new()
                .with_prompt("Billing backend URL")
                .default("http://localhost:8080".into())
                .validate_with(|input: &String| {
                    config::parse_server(input)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })
                .interact_text()
                .map_err(prompt_err)?;

            let min_call_balance: f64 = Input::new()
                .with_prompt("Minimum balance to start a call")
                .default(0.0)
                .validate_with(|v: &f64| {
                    config::check_min_call_balance(*v)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })
                .interact_text()
                .map_err(prompt_err)?;

            let profile = Profile {
                server,
                min_call_balance: Some(min_call_balance),
                ..Profile::default()
            };
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());

            let path = config::save_config(&cfg)?;
            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: billdesk users list");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let detail = format_config(&cfg)?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |_| detail.clone(),
                |_| config::config_path().display().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config()?;
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_profile_key(profile, &key, &value)?;

            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} on profile '{profile_name}'");
            }
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config()?;
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: billdesk config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;
            if !cfg.profiles.contains_key(&name) {
                return Err(config::profile_not_found(&name, &cfg));
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_profile_key_validates_values() {
        let mut profile = Profile::default();
        assert!(set_profile_key(&mut profile, "server", "http://localhost:9000").is_ok());
        assert_eq!(profile.server, "http://localhost:9000");

        assert!(set_profile_key(&mut profile, "min-call-balance", "2.5").is_ok());
        assert_eq!(profile.min_call_balance, Some(2.5));

        assert!(set_profile_key(&mut profile, "min_call_balance", "-10").is_err());
        assert!(set_profile_key(&mut profile, "min_call_balance", "inf").is_err());
        assert_eq!(profile.min_call_balance, Some(2.5));

        assert!(set_profile_key(&mut profile, "server", "ftp://nope").is_err());
        assert!(set_profile_key(&mut profile, "timeout", "soon").is_err());
        assert!(set_profile_key(&mut profile, "colour", "red").is_err());
        assert_eq!(profile.server, "http://localhost:9000");
    }

    #[test]
    fn format_config_lists_profiles() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                server: "http://10.0.0.5:8080".into(),
                insecure: Some(true),
                ..Profile::default()
            },
        );
        let text = format_config(&cfg).unwrap();
        assert!(text.contains("[profiles.lab]"));
        assert!(text.contains("server = \"http://10.0.0.5:8080\""));
        assert!(text.contains("insecure = true"));
    }

    #[test]
    fn format_config_is_valid_toml_for_odd_values() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                server: r#"http://host/"quoted"\path"#.into(),
                ..Profile::default()
            },
        );
        let text = format_config(&cfg).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.profiles, cfg.profiles);
    }
}
