//! `campusdesk-tui`: terminal dashboard for campus facilities administration.
//!
//! Built on [ratatui](https://ratatui.rs). A navigation tree on the left
//! mirrors the web sidebar (dashboard, campuses with their blocks and
//! buildings, settings pages); the right pane shows the selected screen.
//!
//! Logs are written to a file (default `/tmp/campusdesk-tui.log`) to avoid
//! corrupting the terminal UI.

mod action;
mod app;
mod component;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use campusdesk_config::{self as config, Config, Profile};
use campusdesk_core::{Controller, ControllerConfig};

use crate::app::App;

/// Terminal dashboard for campuses, buildings, rooms and their settings.
#[derive(Parser, Debug)]
#[command(name = "campusdesk-tui", version, about)]
struct Cli {
    /// Config profile to use
    #[arg(short, long, env = "CAMPUSDESK_PROFILE")]
    profile: Option<String>,

    /// API base URL (overrides the profile)
    #[arg(short = 'u', long, env = "CAMPUSDESK_API_URL")]
    api_url: Option<String>,

    /// Request timeout, e.g. `30s` (overrides the profile)
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Log file path (defaults to /tmp/campusdesk-tui.log)
    #[arg(long, default_value = "/tmp/campusdesk-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. Nothing may be logged to stdout/stderr while
/// the terminal is in raw mode. Hold the guard until exit so logs flush.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "campusdesk_tui={log_level},campusdesk_core={log_level},campusdesk_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("campusdesk-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Controller settings: profile values, then command-line overrides.
fn controller_config(
    cli: &Cli,
    cfg: &Config,
    profile: &Profile,
    profile_name: &str,
) -> Result<ControllerConfig> {
    let mut out = match cli.api_url.as_deref() {
        Some(url) => ControllerConfig::new(url)?
            .with_token(config::resolve_token(profile, profile_name))
            .with_timeout(cfg.timeout(profile)),
        None => config::profile_to_controller_config(cfg, profile, profile_name)?,
    };
    if let Some(timeout) = cli.timeout {
        out = out.with_timeout(timeout);
    }
    Ok(out)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let cfg = config::load_config_or_default();
    let profile_name = cfg.active_profile_name(cli.profile.as_deref());
    let profile = cfg.profile_or_default(&profile_name);
    let controller = Controller::new(controller_config(&cli, &cfg, &profile, &profile_name)?)?;

    info!(
        url = %controller.config().api_url,
        profile = %profile_name,
        authenticated = controller.is_authenticated(),
        "starting campusdesk-tui"
    );

    let mut app = App::new(
        controller,
        profile_name,
        profile.email.clone(),
        cfg.page_size(&profile),
    );
    app.run().await?;

    Ok(())
}
