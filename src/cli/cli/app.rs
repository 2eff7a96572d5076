use crate::cli::cli::commands::*;
use crate::cli::config::Config;
use crate::cli::error::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::path::PathBuf;

/// Browse uv-installed tools, keep reusable cases and bind them to keys
#[derive(Parser)]
#[command(name = "toolcase", author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Custom data directory path
    #[arg(long, global = true, env = "TOOLCASE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show installed tools with their cases
    List(ListCommand),

    /// Search commands and cases
    Search(SearchCommand),

    /// Manage cases attached to commands
    Case {
        #[command(subcommand)]
        action: CaseAction,
    },

    /// Run a case
    Run(RunCommand),

    /// Recently run cases
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Favorite cases
    Favorite {
        #[command(subcommand)]
        action: FavoriteAction,
    },

    /// Key bindings for cases
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Custom folders of cases
    Folder {
        #[command(subcommand)]
        action: FolderAction,
    },

    /// Export or import all settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Serve the keybinding panel protocol on stdin/stdout
    Panel,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

impl Cli {
    /// Tracing filter implied by the verbosity flags
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        // Config lives in the data directory given on the command line, else the default one
        let config_path = match &self.data_dir {
            Some(dir) => dir.join("config.toml"),
            None => Config::default_path()?,
        };
        let config = Config::load_from_file(&config_path)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "using default configuration");
                Config::default()
            })
            .merge_with_cli_args(&self);

        if !config.output.color {
            colored::control::set_override(false);
        }

        // Set up data directory (prefer CLI arg, then config, then default)
        let data_dir: PathBuf = match config.data_dir.clone() {
            Some(dir) => {
                if !dir.exists() {
                    std::fs::create_dir_all(&dir)?;
                }
                dir
            }
            None => crate::cli::ensure_data_dir()?,
        };

        let ctx = Context::new(data_dir, config);

        match self.command {
            Commands::List(cmd) => cmd.execute(&ctx).await,
            Commands::Search(cmd) => cmd.execute(&ctx).await,
            Commands::Case { action } => action.execute(&ctx).await,
            Commands::Run(cmd) => cmd.execute(&ctx).await,
            Commands::History { action } => action.execute(&ctx).await,
            Commands::Favorite { action } => action.execute(&ctx).await,
            Commands::Key { action } => action.execute(&ctx).await,
            Commands::Folder { action } => action.execute(&ctx).await,
            Commands::Settings { action } => action.execute(&ctx).await,
            Commands::Panel => run_panel(&ctx).await,
            Commands::Completion { shell } => {
                generate_completion(shell);
                Ok(())
            }
            Commands::Config { action } => action.execute(&config_path, &ctx.config).await,
        }
    }
}

/// Generate shell completion script
fn generate_completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}
