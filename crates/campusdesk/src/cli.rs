//! Clap derive structures for the `campusdesk` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// campusdesk -- manage campus facilities from the command line
#[derive(Debug, Parser)]
#[command(
    name = "campusdesk",
    version,
    about = "Manage campus facilities from the command line",
    long_about = "Administer campuses, blocks, buildings and rooms, plus the\n\
        reference data around them (room types, facilities, departments,\n\
        roles and users) through the facilities REST API.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', env = "CAMPUSDESK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, env = "CAMPUSDESK_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token (overrides the stored session)
    #[arg(long, env = "CAMPUSDESK_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CAMPUSDESK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout (e.g. "30s", "2m")
    #[arg(
        long,
        env = "CAMPUSDESK_TIMEOUT",
        value_parser = humantime::parse_duration,
        global = true
    )]
    pub timeout: Option<Duration>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session token
    Login(LoginArgs),

    /// Forget the stored session token
    Logout,

    /// Show who the stored token belongs to
    Whoami,

    /// Show campus, block and building totals
    #[command(alias = "dash")]
    Dashboard,

    /// Print the navigation menu with the campus tree
    Menu {
        /// Campus page to load into the tree
        #[arg(long, default_value = "1")]
        page: u64,
    },

    /// List the permissions granted across all roles
    #[command(alias = "perms")]
    Permissions {
        /// Group permissions by the resource they apply to
        #[arg(long, short = 'g')]
        grouped: bool,
    },

    /// List the rooms of one building
    Rooms {
        /// Building ID
        #[arg(long, short = 'b')]
        building: u64,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Manage campuses
    #[command(alias = "campuses")]
    Campus(ResourceArgs),

    /// Manage blocks
    #[command(alias = "blocks")]
    Block(ResourceArgs),

    /// Manage buildings
    #[command(alias = "buildings")]
    Building(ResourceArgs),

    /// Manage rooms
    Room(ResourceArgs),

    /// Manage room types
    #[command(alias = "room-types")]
    RoomType(ResourceArgs),

    /// Manage room facilities
    #[command(alias = "room-facilities")]
    RoomFacility(ResourceArgs),

    /// Manage department types
    #[command(alias = "department-types")]
    DepartmentType(ResourceArgs),

    /// Manage departments
    #[command(alias = "departments")]
    Department(ResourceArgs),

    /// Manage roles
    #[command(alias = "roles")]
    Role(ResourceArgs),

    /// Manage users
    #[command(alias = "users")]
    User(ResourceArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Login ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (prompted when omitted)
    #[arg(long, short = 'e')]
    pub email: Option<String>,

    /// Read the password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,

    /// Print the token instead of storing it in the keyring
    #[arg(long)]
    pub print_token: bool,
}

// ── Shared List Arguments ────────────────────────────────────────────

/// Paging, search and sort arguments shared by every list command.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Page to fetch (1-based)
    #[arg(long, default_value = "1")]
    pub page: u64,

    /// Rows per page (defaults to the profile's page size)
    #[arg(long, short = 'l')]
    pub limit: Option<u64>,

    /// Fetch every page
    #[arg(long, short = 'a')]
    pub all: bool,

    /// Only show rows containing this text in any column
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Sort by column id (see `fields`)
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Extra query parameter sent to the API
    #[arg(long, short = 'f', value_name = "KEY=VALUE")]
    pub filter: Vec<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RESOURCES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ResourceArgs {
    #[command(subcommand)]
    pub command: ResourceCommand,
}

#[derive(Debug, Subcommand)]
pub enum ResourceCommand {
    /// List one page of rows
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one row
    Get {
        /// Row ID
        id: u64,
    },

    /// Create a new row
    #[command(alias = "add")]
    Create(FormArgs),

    /// Change an existing row
    #[command(alias = "edit")]
    Update {
        /// Row ID
        id: u64,

        #[command(flatten)]
        form: FormArgs,
    },

    /// Delete a row
    #[command(alias = "rm")]
    Delete {
        /// Row ID
        id: u64,
    },

    /// Describe the form fields and table columns
    Fields,
}

/// Field input for create and update.
#[derive(Debug, Args)]
pub struct FormArgs {
    /// Set a field (repeatable), e.g. --set name="Main Campus"
    #[arg(long = "set", short = 'S', value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Read field values from a JSON object
    #[arg(long, value_name = "PATH")]
    pub from_file: Option<PathBuf>,

    /// Never prompt for missing fields
    #[arg(long)]
    pub no_prompt: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Display the resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Key (api_url, email, token_env, timeout, page_size)
        key: String,
        /// Value to assign
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Make a profile the default
    Use {
        /// Profile name
        name: String,
    },

    /// Print the config file location
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
