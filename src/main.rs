use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

use issueboard::config::Config;
use issueboard::logging::{LogConfig, init_logging};
use issueboard_common::{GroupBy, ScopeKind, ScopeRef};

mod cmd;

#[derive(Parser)]
#[command(name = "issueboard")]
#[command(version, about = "Per-scope issue filters, query parameters and board grouping")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Local filter file for workspace virtual views. Overrides issueboard.toml.
    #[arg(long, global = true)]
    pub state_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show or update a scope's filters
    Filters {
        #[command(subcommand)]
        command: FiltersCommands,
    },
    /// Print the query parameters applied for a scope's current layout
    Params {
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Group issues from a JSON file into board columns
    Group {
        /// JSON array of issues
        #[arg(long)]
        issues: PathBuf,
        /// JSON object with states, labels, members and projects
        #[arg(long)]
        columns: PathBuf,
        #[arg(long)]
        group_by: Option<GroupBy>,
        #[arg(long)]
        sub_group_by: Option<GroupBy>,
        /// Keep columns (and swimlane cells) with no issues
        #[arg(long)]
        show_empty: bool,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
pub enum FiltersCommands {
    /// Fetch and print the normalized filters
    Show {
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Apply a partial update and print the resulting filters
    Set {
        #[command(flatten)]
        scope: ScopeArgs,
        /// filters, display_filters or display_properties
        #[arg(long)]
        update: String,
        /// JSON object with the keys to change
        payload: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default issueboard.toml file
    Init,
}

#[derive(Args, Clone)]
pub struct ScopeArgs {
    /// project, module, cycle, project-view or workspace-view
    #[arg(long)]
    pub kind: ScopeKind,
    #[arg(long)]
    pub workspace: String,
    #[arg(long)]
    pub project: Option<String>,
    /// Scope id (module, cycle or view id, or a virtual view such as all-issues).
    /// Defaults to the project id for project scopes.
    #[arg(long)]
    pub scope: Option<String>,
}

impl ScopeArgs {
    pub fn to_scope_ref(&self) -> Result<ScopeRef> {
        if self.kind.requires_project() && self.project.is_none() {
            anyhow::bail!("--project is required for {} scopes", self.kind);
        }
        let scope = match (&self.scope, self.kind) {
            (Some(scope), _) => scope.clone(),
            (None, ScopeKind::Project) => self.project.clone().unwrap_or_default(),
            (None, kind) => anyhow::bail!("--scope is required for {} scopes", kind),
        };
        Ok(ScopeRef::new(
            &self.workspace,
            self.project.as_deref(),
            &scope,
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let config = Config::with_cli_args(project_dir, cli.state_file.clone())?;

    let base_level = config
        .toml
        .logging
        .level
        .parse()
        .unwrap_or(tracing::Level::INFO);
    init_logging(
        &LogConfig::from_verbosity(base_level, cli.verbose)
            .with_format(config.toml.logging.format)
            .with_ansi(std::io::stderr().is_terminal()),
    );

    match &cli.command {
        Commands::Filters { command } => match command {
            FiltersCommands::Show { scope } => cmd::cmd_filters_show(&config, scope).await?,
            FiltersCommands::Set {
                scope,
                update,
                payload,
            } => cmd::cmd_filters_set(&config, scope, update, payload).await?,
        },
        Commands::Params { scope } => cmd::cmd_params(&config, scope).await?,
        Commands::Group {
            issues,
            columns,
            group_by,
            sub_group_by,
            show_empty,
        } => cmd::cmd_group(issues, columns, *group_by, *sub_group_by, *show_empty)?,
        Commands::Config { command } => cmd::cmd_config(&config, command.clone())?,
    }

    Ok(())
}
