//! Config subcommand handlers.

use std::fmt::Write as _;

use campusdesk_core::DEFAULT_BASE_URL;
use campusdesk_core::table::PAGE_SIZE_OPTIONS;
use dialoguer::{Confirm, Input, Select};

use super::util::prompt_err;
use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const VALID_KEYS: &str = "api_url, email, token, token_env, timeout, page_size";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with plaintext tokens masked.
fn redacted(cfg: &Config) -> Config {
    let mut out = cfg.clone();
    for profile in out.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some("****".into());
        }
    }
    out
}

/// TOML-like rendering for the table format.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(default) = &cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "page_size = {}", cfg.defaults.page_size);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        if let Some(url) = &p.api_url {
            let _ = writeln!(out, "api_url = \"{url}\"");
        }
        if let Some(email) = &p.email {
            let _ = writeln!(out, "email = \"{email}\"");
        }
        if let Some(token) = &p.token {
            let _ = writeln!(out, "token = \"{token}\"");
        }
        if let Some(env) = &p.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(size) = p.page_size {
            let _ = writeln!(out, "page_size = {size}");
        }
    }

    out.trim_end().to_owned()
}

fn validate_url(value: &str) -> Result<(), CliError> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| CliError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL '{value}': {e}"),
        })
}

/// Seconds, or a humantime duration such as `45s` / `2m`.
fn parse_timeout(value: &str) -> Result<u64, CliError> {
    value
        .parse::<u64>()
        .or_else(|_| humantime::parse_duration(value).map(|d| d.as_secs()))
        .map_err(|_| CliError::Validation {
            field: "timeout".into(),
            reason: "must be seconds or a duration like '30s'".into(),
        })
}

/// Apply one `config set` assignment to a profile.
fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "api_url" | "api-url" => {
            validate_url(&value)?;
            profile.api_url = Some(value);
        }
        "email" => profile.email = Some(value),
        "token" => profile.token = Some(value),
        "token_env" | "token-env" => profile.token_env = Some(value),
        "timeout" => profile.timeout = Some(parse_timeout(&value)?),
        "page_size" | "page-size" => {
            let size = value
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| CliError::Validation {
                    field: "page_size".into(),
                    reason: "must be a positive number".into(),
                })?;
            profile.page_size = Some(size);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!("unknown config key '{other}'. Valid keys: {VALID_KEYS}"),
            });
        }
    }
    Ok(())
}

fn profile_not_found(cfg: &Config, name: String) -> CliError {
    let available: Vec<_> = cfg.profiles.keys().cloned().collect();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(global.output, &cfg, format_config, |c| {
                c.profiles.keys().cloned().collect::<Vec<_>>().join("\n")
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            set_key(cfg.profile_mut(&profile_name), &key, value)?;
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} on profile '{profile_name}'");
            }
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.active_profile_name(None);
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: campusdesk config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if *name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ──────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(&cfg, name));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}

// ── Init wizard ─────────────────────────────────────────────────────

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path();
    let mut cfg = config::load_config_or_default();

    eprintln!("campusdesk setup\n");

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default(config::active_profile_name(global, &cfg))
        .interact_text()
        .map_err(prompt_err)?;

    if cfg.profiles.contains_key(&profile_name)
        && !Confirm::new()
            .with_prompt(format!("Profile '{profile_name}' exists. Replace it?"))
            .default(false)
            .interact()
            .map_err(prompt_err)?
    {
        eprintln!("Aborted.");
        return Ok(());
    }

    let api_url: String = Input::new()
        .with_prompt("API base URL")
        .default(DEFAULT_BASE_URL.to_owned())
        .validate_with(|v: &String| validate_url(v).map_err(|e| e.to_string()))
        .interact_text()
        .map_err(prompt_err)?;

    let email: String = Input::new()
        .with_prompt("Login email (optional)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;

    let sizes: Vec<String> = PAGE_SIZE_OPTIONS.iter().map(ToString::to_string).collect();
    let size_index = Select::new()
        .with_prompt("Rows per page")
        .items(&sizes)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let profile = Profile {
        api_url: (api_url != DEFAULT_BASE_URL).then_some(api_url),
        email: (!email.trim().is_empty()).then(|| email.trim().to_owned()),
        page_size: PAGE_SIZE_OPTIONS.get(size_index).copied(),
        ..Profile::default()
    };
    cfg.profiles.insert(profile_name.clone(), profile);

    let make_default = cfg.profiles.len() == 1
        || Confirm::new()
            .with_prompt(format!("Make '{profile_name}' the default profile?"))
            .default(true)
            .interact()
            .map_err(prompt_err)?;
    if make_default {
        cfg.default_profile = Some(profile_name.clone());
    }

    config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", path.display());
    eprintln!("  Profile: {profile_name}");
    eprintln!("\n  Sign in: campusdesk login --profile {profile_name}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_validates_values() {
        let mut p = Profile::default();
        set_key(&mut p, "api-url", "http://localhost:8000/api/".into()).unwrap();
        set_key(&mut p, "timeout", "2m".into()).unwrap();
        set_key(&mut p, "page_size", "20".into()).unwrap();
        assert_eq!(p.api_url.as_deref(), Some("http://localhost:8000/api/"));
        assert_eq!(p.timeout, Some(120));
        assert_eq!(p.page_size, Some(20));

        assert!(set_key(&mut p, "api_url", "not a url".into()).is_err());
        assert!(set_key(&mut p, "page_size", "0".into()).is_err());
        assert!(set_key(&mut p, "colour", "red".into()).is_err());
    }

    #[test]
    fn show_masks_tokens() {
        let mut cfg = Config::default();
        cfg.profile_mut("ci").token = Some("secret-token".into());
        let shown = format_config(&redacted(&cfg));
        assert!(shown.contains("[profiles.ci]"));
        assert!(shown.contains("token = \"****\""));
        assert!(!shown.contains("secret-token"));
    }
}
