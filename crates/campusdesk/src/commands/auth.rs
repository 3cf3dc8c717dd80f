//! Session commands: login, logout, whoami.

use std::io::BufRead;

use campusdesk_core::{AuthUser, Campus, Notice, PageRequest};
use dialoguer::Input;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::Context;
use super::util::{self, prompt_err};
use crate::cli::LoginArgs;
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Login ───────────────────────────────────────────────────────────

pub async fn login(ctx: &Context<'_>, args: LoginArgs) -> Result<(), CliError> {
    let email = match args.email.or_else(|| ctx.profile.email.clone()) {
        Some(email) => email,
        None if util::interactive() => Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(prompt_err)?,
        None => {
            return Err(CliError::Validation {
                field: "email".into(),
                reason: "pass --email when not running interactively".into(),
            });
        }
    };
    let password = read_password(args.password_stdin)?;

    let pb = util::spinner("Signing in...", ctx.global);
    let result = ctx.controller.login(&email, &password).await;
    pb.finish_and_clear();
    let session = result.map_err(|e| ctx.fail(e))?;

    if args.print_token {
        output::print_output(session.token.expose_secret(), false);
    } else if let Err(e) = config::store_token(&ctx.profile_name, &session.token) {
        output::print_notice(
            &Notice::warning(format!(
                "Could not store the token in the system keyring ({e}). \
                 Re-run with --print-token and export CAMPUSDESK_TOKEN instead."
            )),
            ctx.color,
            ctx.global.quiet,
        );
    }

    remember_email(ctx, &email)?;

    output::print_notice(
        &Notice::success(format!("Logged in as {}", session.user.name)),
        ctx.color,
        ctx.global.quiet,
    );
    if !args.print_token {
        let out = output::render_single(ctx.global.output, &session.user, user_detail, |u| {
            u.email.clone()
        });
        output::print_output(&out, ctx.global.quiet);
    }
    Ok(())
}

fn read_password(from_stdin: bool) -> Result<SecretString, CliError> {
    let password = if from_stdin {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        line.trim_end_matches(['\r', '\n']).to_owned()
    } else if util::interactive() {
        rpassword::prompt_password("Password: ")?
    } else {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "use --password-stdin when not running interactively".into(),
        });
    };
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "Password is required".into(),
        });
    }
    Ok(SecretString::from(password))
}

/// Keep the login email on the profile so the next login can skip it.
fn remember_email(ctx: &Context<'_>, email: &str) -> Result<(), CliError> {
    if ctx.profile.email.as_deref() == Some(email) {
        return Ok(());
    }
    let mut cfg = config::load_config_or_default();
    cfg.profile_mut(&ctx.profile_name).email = Some(email.to_owned());
    config::save_config(&cfg)?;
    Ok(())
}

fn user_detail(user: &AuthUser) -> String {
    output::render_pairs([
        ("ID", user.id.to_string()),
        ("Name", user.name.clone()),
        ("Email", user.email.clone()),
        (
            "Role",
            user.role
                .as_ref()
                .map_or_else(|| "N/A".into(), |r| r.name.clone()),
        ),
    ])
}

// ── Logout ──────────────────────────────────────────────────────────

pub fn logout(ctx: &Context<'_>) -> Result<(), CliError> {
    ctx.controller.logout();
    let notice = if config::clear_token(&ctx.profile_name)? {
        Notice::success(format!("Logged out of profile '{}'", ctx.profile_name))
    } else {
        Notice::info(format!("No stored session for profile '{}'", ctx.profile_name))
    };
    output::print_notice(&notice, ctx.color, ctx.global.quiet);
    Ok(())
}

// ── Whoami ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Identity {
    profile: String,
    api_url: String,
    email: Option<String>,
    authenticated: bool,
}

/// Check the stored token with a one-row request and describe the session.
pub async fn whoami(ctx: &Context<'_>) -> Result<(), CliError> {
    ctx.controller
        .list::<Campus>(PageRequest::first(1), &[])
        .await
        .map_err(|e| ctx.fail(e))?;

    let identity = Identity {
        profile: ctx.profile_name.clone(),
        api_url: ctx.api_url().to_owned(),
        email: ctx.profile.email.clone(),
        authenticated: true,
    };
    let out = output::render_single(
        ctx.global.output,
        &identity,
        |i| {
            output::render_pairs([
                ("Profile", i.profile.clone()),
                ("API", i.api_url.clone()),
                ("Email", i.email.clone().unwrap_or_else(|| "N/A".into())),
                ("Session", "active".to_owned()),
            ])
        },
        |i| i.profile.clone(),
    );
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}
