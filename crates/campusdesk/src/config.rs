//! CLI configuration: thin wrapper around `campusdesk_config`.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--api-url, --token, --timeout).

use secrecy::SecretString;

use campusdesk_core::ControllerConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use campusdesk_config::{
    Config, Defaults, Profile, clear_token, config_path, load_config_or_default, save_config,
    store_token,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Translate a `Profile` + global flags into a `ControllerConfig`.
///
/// Flags (and their env vars) win over profile values, which win over the
/// built-in defaults.
pub fn resolve_profile(
    cfg: &Config,
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<ControllerConfig, CliError> {
    let url = global
        .api_url
        .as_deref()
        .or(profile.api_url.as_deref())
        .unwrap_or(campusdesk_core::DEFAULT_BASE_URL);
    let base = ControllerConfig::new(url).map_err(|e| CliError::Validation {
        field: "api_url".into(),
        reason: e.to_string(),
    })?;

    let token = match &global.token {
        Some(token) => Some(SecretString::from(token.clone())),
        None => campusdesk_config::resolve_token(profile, profile_name),
    };

    let timeout = global.timeout.unwrap_or_else(|| cfg.timeout(profile));

    Ok(base.with_token(token).with_timeout(timeout))
}

/// Rows per page: `--limit`, else the profile's page size.
pub fn page_size(cfg: &Config, profile: &Profile, limit: Option<u64>) -> u64 {
    limit.map_or_else(
        || u64::try_from(cfg.page_size(profile)).unwrap_or(u64::MAX),
        |l| l.max(1),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use clap::Parser;
    use secrecy::ExposeSecret;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["campusdesk"];
        argv.extend_from_slice(args);
        argv.push("whoami");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn profile() -> Profile {
        Profile {
            api_url: Some("http://profile.test/api/".into()),
            token: Some("from-profile".into()),
            timeout: Some(12),
            ..Profile::default()
        }
    }

    #[test]
    fn flags_override_profile() {
        let cfg = Config::default();
        let opts = global(&[
            "--api-url",
            "http://flag.test/api/",
            "--token",
            "from-flag",
            "--timeout",
            "2m",
        ]);
        let resolved = resolve_profile(&cfg, &profile(), "ci", &opts).unwrap();
        assert_eq!(resolved.api_url.as_str(), "http://flag.test/api/");
        assert_eq!(resolved.token.unwrap().expose_secret(), "from-flag");
        assert_eq!(resolved.timeout, Duration::from_secs(120));
    }

    #[test]
    fn profile_values_without_flags() {
        let cfg = Config::default();
        let resolved = resolve_profile(&cfg, &profile(), "ci", &global(&[])).unwrap();
        assert_eq!(resolved.api_url.as_str(), "http://profile.test/api/");
        assert_eq!(resolved.timeout, Duration::from_secs(12));
    }

    #[test]
    fn limit_falls_back_to_profile_page_size() {
        let cfg = Config::default();
        let mut p = Profile::default();
        assert_eq!(page_size(&cfg, &p, None), 10);
        p.page_size = Some(30);
        assert_eq!(page_size(&cfg, &p, None), 30);
        assert_eq!(page_size(&cfg, &p, Some(0)), 1);
    }
}
