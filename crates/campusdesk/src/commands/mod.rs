//! Command dispatch: bridges CLI args -> core Controller -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod overview;
pub mod resource;
pub mod util;

use campusdesk_core::{
    Block, Building, Campus, Controller, Department, DepartmentType, EntityId, Role, Room,
    RoomFacility, RoomType, User,
};

use crate::cli::{Command, GlobalOpts, ResourceCommand};
use crate::config::{Config, Profile};
use crate::error::CliError;

/// Everything a controller-bound command needs.
pub struct Context<'a> {
    pub controller: Controller,
    pub global: &'a GlobalOpts,
    pub config: Config,
    pub profile_name: String,
    pub profile: Profile,
    pub color: bool,
}

impl Context<'_> {
    /// Rows per page for list commands.
    pub fn page_size(&self, limit: Option<u64>) -> u64 {
        crate::config::page_size(&self.config, &self.profile, limit)
    }

    /// Base URL, for connection diagnostics.
    pub fn api_url(&self) -> &str {
        self.controller.config().api_url.as_str()
    }

    /// Attach the base URL to connection failures.
    pub fn fail(&self, err: campusdesk_core::CoreError) -> CliError {
        CliError::from_core(err, self.api_url())
    }

    /// Fail early, before any request, when no token is available.
    pub fn require_session(&self) -> Result<(), CliError> {
        if self.controller.is_authenticated() {
            Ok(())
        } else {
            Err(CliError::NoSession {
                profile: self.profile_name.clone(),
            })
        }
    }
}

/// Convert a CLI id argument.
pub fn entity_id(raw: u64) -> Result<EntityId, CliError> {
    EntityId::new(raw).ok_or_else(|| CliError::Validation {
        field: "id".into(),
        reason: "must be a positive integer".into(),
    })
}

/// Whether a command talks to the backend with a session.
fn needs_session(cmd: &Command) -> bool {
    let resource =
        |args: &crate::cli::ResourceArgs| !matches!(args.command, ResourceCommand::Fields);
    match cmd {
        Command::Login(_) | Command::Logout | Command::Config(_) | Command::Completions(_) => {
            false
        }
        Command::Campus(args)
        | Command::Block(args)
        | Command::Building(args)
        | Command::Room(args)
        | Command::RoomType(args)
        | Command::RoomFacility(args)
        | Command::DepartmentType(args)
        | Command::Department(args)
        | Command::Role(args)
        | Command::User(args) => resource(args),
        _ => true,
    }
}

/// Dispatch a controller-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context<'_>) -> Result<(), CliError> {
    if needs_session(&cmd) {
        ctx.require_session()?;
    }

    match cmd {
        Command::Login(args) => auth::login(ctx, args).await,
        Command::Logout => auth::logout(ctx),
        Command::Whoami => auth::whoami(ctx).await,
        Command::Dashboard => overview::dashboard(ctx).await,
        Command::Menu { page } => overview::menu(ctx, page).await,
        Command::Permissions { grouped } => overview::permissions(ctx, grouped).await,
        Command::Rooms { building, list } => overview::rooms(ctx, building, list).await,
        Command::Campus(args) => resource::handle::<Campus>(ctx, args).await,
        Command::Block(args) => resource::handle::<Block>(ctx, args).await,
        Command::Building(args) => resource::handle::<Building>(ctx, args).await,
        Command::Room(args) => resource::handle::<Room>(ctx, args).await,
        Command::RoomType(args) => resource::handle::<RoomType>(ctx, args).await,
        Command::RoomFacility(args) => resource::handle::<RoomFacility>(ctx, args).await,
        Command::DepartmentType(args) => resource::handle::<DepartmentType>(ctx, args).await,
        Command::Department(args) => resource::handle::<Department>(ctx, args).await,
        Command::Role(args) => resource::handle::<Role>(ctx, args).await,
        Command::User(args) => resource::handle::<User>(ctx, args).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions run without a controller".into(),
        )),
    }
}
