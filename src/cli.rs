//! Command-line interface.
//!
//! Each subcommand maps onto one client operation and prints the result as
//! pretty JSON on stdout.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use crate::api::auth;
use crate::api::{
    CreateIssueOptions, FindIssuesOptions, HttpTransport, ListOptions, TrackerClient,
};
use crate::config::{Config, Profile, TOKEN_ENV_VAR};
use crate::error::{AppError, Result};

/// Web UI host used by `issue open`.
const WEB_URL: &str = "https://tracker.yandex.ru";

/// Yandex Tracker from the command line.
#[derive(Debug, Parser)]
#[command(name = "ytrack", version, about)]
pub struct Cli {
    /// Profile to use (defaults to settings.default_profile).
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Log every request and response.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Path to the configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read and patch tickets.
    #[command(subcommand)]
    Ticket(TicketCommand),
    /// Show the authenticated user.
    Myself,
    /// Create, search and view issues.
    #[command(subcommand)]
    Issue(IssueCommand),
    /// Manage stored tokens.
    #[command(subcommand)]
    Auth(AuthCommand),
    /// Manage profiles.
    #[command(subcommand)]
    Profile(ProfileCommand),
}

#[derive(Debug, Subcommand)]
pub enum TicketCommand {
    /// Get a ticket as raw JSON.
    Get { key: String },
    /// Set ticket fields.
    Patch {
        key: String,
        /// Fields to set, as name=value.
        #[arg(required = true, value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// List ticket comments.
    Comments { key: String },
}

#[derive(Debug, Subcommand)]
pub enum IssueCommand {
    /// Get an issue.
    Get { key: String },
    /// Create an issue.
    Create(CreateArgs),
    /// Search for issues.
    Find(FindArgs),
    /// Open an issue in the browser.
    Open { key: String },
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub queue: String,
    #[arg(long)]
    pub summary: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long = "type")]
    pub issue_type: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long)]
    pub assignee: Option<String>,
    #[arg(long)]
    pub parent: Option<String>,
}

impl From<CreateArgs> for CreateIssueOptions {
    fn from(args: CreateArgs) -> Self {
        CreateIssueOptions {
            queue: args.queue,
            summary: args.summary,
            description: args.description,
            issue_type: args.issue_type,
            priority: args.priority,
            assignee: args.assignee,
            parent: args.parent,
            ..Default::default()
        }
    }
}

#[derive(Debug, Args)]
pub struct FindArgs {
    #[arg(long)]
    pub queue: Option<String>,
    /// Query language expression.
    #[arg(long)]
    pub query: Option<String>,
    /// Issue keys to fetch.
    #[arg(long = "key")]
    pub keys: Vec<String>,
    #[arg(long)]
    pub per_page: Option<u32>,
    #[arg(long)]
    pub page: Option<u32>,
}

impl FindArgs {
    fn split(self) -> (FindIssuesOptions, ListOptions) {
        let opts = FindIssuesOptions {
            queue: self.queue,
            query: self.query,
            keys: self.keys,
            ..Default::default()
        };
        let list_opts = ListOptions {
            per_page: self.per_page,
            page: self.page,
        };
        (opts, list_opts)
    }
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Store a token for a profile in the OS keyring.
    Login {
        profile: String,
        /// Full Authorization value, e.g. "OAuth y0_...".
        #[arg(long)]
        token: String,
    },
    /// Remove a profile's token from the OS keyring.
    Logout { profile: String },
    /// Report whether a token is stored for a profile.
    Status { profile: String },
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Add or replace a profile.
    Add {
        name: String,
        #[arg(long, conflicts_with = "cloud_org_id", required_unless_present = "cloud_org_id")]
        org_id: Option<String>,
        #[arg(long)]
        cloud_org_id: Option<String>,
        /// Make this the default profile.
        #[arg(long)]
        default: bool,
    },
    /// List configured profiles.
    List,
}

/// Parse a `name=value` pair.
fn parse_field(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got '{}'", s)),
    }
}

/// Find the token for a profile: environment first, then the keyring.
pub fn resolve_token(profile_name: &str) -> Result<String> {
    if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
        if !token.is_empty() {
            debug!("Using token from {}", TOKEN_ENV_VAR);
            return Ok(token);
        }
    }
    Ok(auth::get_token(profile_name)?)
}

/// The configuration file a command runs against.
#[derive(Debug)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub config: Config,
}

impl LoadedConfig {
    /// Whether request diagnostics are on, from `--debug` or `settings.debug`.
    pub fn debug_enabled(&self, cli_debug: bool) -> bool {
        cli_debug || self.config.settings.debug
    }
}

/// Load the configuration named by `--config`, or the default file.
///
/// Runs before logging is set up so the config can turn on debug output.
pub fn load_config(cli: &Cli) -> Result<LoadedConfig> {
    let path = match cli.config {
        Some(ref path) => path.clone(),
        None => Config::default_path()?,
    };
    let config = Config::load_from(&path)?;
    Ok(LoadedConfig { path, config })
}

/// Run a parsed command line against a loaded configuration.
pub async fn run(cli: Cli, loaded: LoadedConfig) -> Result<()> {
    let debug = loaded.debug_enabled(cli.debug);
    let LoadedConfig { path, mut config } = loaded;

    match cli.command {
        Command::Auth(cmd) => run_auth(cmd),
        Command::Profile(cmd) => run_profile(cmd, &mut config, &path),
        Command::Issue(IssueCommand::Open { key }) => {
            let url = web_url(&key);
            info!(url = %url, "Opening issue in browser");
            open::that(&url)?;
            Ok(())
        }
        command => {
            let profile = config.select_profile(cli.profile.as_deref())?;
            let client = build_client(profile, debug)?;
            run_api(command, &client).await
        }
    }
}

/// Browser URL of an issue, with the key encoded as one path segment.
fn web_url(key: &str) -> String {
    format!("{}/{}", WEB_URL, urlencoding::encode(key))
}

fn build_client(profile: &Profile, debug: bool) -> Result<TrackerClient> {
    let token = resolve_token(&profile.name)?;
    let transport = HttpTransport::new()?;
    info!(profile = %profile.name, "Creating Tracker client");
    Ok(TrackerClient::with_transport(&profile.credentials(&token), transport).with_debug(debug))
}

async fn run_api(command: Command, client: &TrackerClient) -> Result<()> {
    match command {
        Command::Ticket(TicketCommand::Get { key }) => print_json(&client.get_ticket(&key).await?),
        Command::Ticket(TicketCommand::Patch { key, fields }) => {
            let changes: BTreeMap<String, String> = fields.into_iter().collect();
            print_json(&client.patch_ticket(&key, &changes).await?)
        }
        Command::Ticket(TicketCommand::Comments { key }) => {
            print_json(&client.get_ticket_comments(&key).await?)
        }
        Command::Myself => print_json(&client.myself().await?),
        Command::Issue(IssueCommand::Get { key }) => {
            let (issue, _) = client.get_issue(&key).await?;
            print_json(&issue)
        }
        Command::Issue(IssueCommand::Create(args)) => {
            let (issue, _) = client.create_issue(&args.into()).await?;
            print_json(&issue)
        }
        Command::Issue(IssueCommand::Find(args)) => {
            let (opts, list_opts) = args.split();
            let (issues, response) = client.find_issues(&opts, Some(&list_opts)).await?;
            if let Some(total) = response.headers().get("x-total-count") {
                debug!(total = ?total, "Search total");
            }
            print_json(&issues)
        }
        Command::Issue(IssueCommand::Open { .. }) | Command::Auth(_) | Command::Profile(_) => {
            Err(AppError::usage("command does not call the API"))
        }
    }
}

fn run_auth(cmd: AuthCommand) -> Result<()> {
    match cmd {
        AuthCommand::Login { profile, token } => {
            auth::store_token(&profile, &token)?;
            println!("Token stored for profile '{}'", profile);
        }
        AuthCommand::Logout { profile } => {
            auth::delete_token(&profile)?;
            println!("Token removed for profile '{}'", profile);
        }
        AuthCommand::Status { profile } => {
            let state = if auth::has_token(&profile) {
                "stored"
            } else {
                "missing"
            };
            println!("{}: token {}", profile, state);
        }
    }
    Ok(())
}

fn run_profile(cmd: ProfileCommand, config: &mut Config, path: &std::path::Path) -> Result<()> {
    match cmd {
        ProfileCommand::Add {
            name,
            org_id,
            cloud_org_id,
            default,
        } => {
            config.upsert_profile(Profile::new(name.clone(), org_id, cloud_org_id))?;
            if default {
                config.settings.default_profile = Some(name.clone());
            }
            config.save_to(path)?;
            println!("Profile '{}' saved", name);
        }
        ProfileCommand::List => {
            for profile in &config.profiles {
                let marker = if config.settings.default_profile.as_deref()
                    == Some(profile.name.as_str())
                {
                    "*"
                } else {
                    " "
                };
                let org = match (&profile.org_id, &profile.cloud_org_id) {
                    (_, Some(cloud)) => format!("cloud org {}", cloud),
                    (Some(org), None) => format!("org {}", org),
                    (None, None) => "no org".to_string(),
                };
                println!("{} {} ({})", marker, profile.name, org);
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{}", json);
    Ok(())
}
