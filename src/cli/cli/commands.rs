use crate::cli::config::Config;
use crate::cli::error::{InteractiveError, Result};
use crate::cli::keybindings::{JsonKeybindingsFile, KeybindingAction};
use crate::cli::output::{self, OutputStyle};
use crate::cli::panel;
use crate::cli::settings::{SettingsBundle, DEFAULT_EXPORT_FILE};
use crate::cli::workspace::{Workspace, WorkspaceOptions};
use crate::cli::STATE_FILE;
use crate::core::storage::JsonFileStore;
use crate::core::{Case, CommandKey};
use crate::runtime::{CaseRunner, ShellRunner, ToolLister, UvToolLister};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::BufReader;

/// Everything a subcommand needs to open the workspace and talk to the outside
pub struct Context {
    pub data_dir: PathBuf,
    pub config: Config,
    pub lister: Arc<dyn ToolLister>,
    pub runner: Arc<dyn CaseRunner>,
}

impl Context {
    pub fn new(data_dir: PathBuf, config: Config) -> Self {
        let lister = Arc::new(UvToolLister::new(config.tool()));
        let runner = Arc::new(ShellRunner::new(config.shell.clone()));
        Self {
            data_dir,
            config,
            lister,
            runner,
        }
    }

    pub fn with_lister(mut self, lister: Arc<dyn ToolLister>) -> Self {
        self.lister = lister;
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn CaseRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn style(&self) -> OutputStyle {
        OutputStyle::from(&self.config.output)
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(STATE_FILE)
    }

    /// Open the persisted stores without listing tools
    pub async fn open_workspace(&self) -> Result<Workspace> {
        let store = Arc::new(JsonFileStore::open(self.state_path()).await);
        let external = Arc::new(JsonKeybindingsFile::new(
            self.config.keybindings_path(&self.data_dir),
        ));
        let options = WorkspaceOptions {
            keybinding_action: KeybindingAction {
                command: self.config.keybindings.command.clone(),
                when: self.config.keybindings.when.clone(),
            },
        };
        Workspace::load(store, external, options).await
    }

    /// Open the workspace and load the catalog. A listing failure is printed
    /// as a warning and leaves the catalog empty.
    pub async fn open_with_catalog(&self) -> Result<Workspace> {
        let mut workspace = self.open_workspace().await?;
        let outcome = workspace.refresh(self.lister.as_ref()).await?;
        if let Some(warning) = outcome.warning {
            eprintln!("{}", self.style().warning(&warning));
        }
        if outcome.seeded > 0 {
            println!(
                "{}",
                self.style()
                    .notice(&format!("Added {} default --help cases", outcome.seeded))
            );
        }
        Ok(workspace)
    }
}

/// A case identified by its name and command string
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CaseArgs {
    /// Case name
    pub name: String,

    /// Command string the case runs
    pub command: String,
}

impl CaseArgs {
    pub fn case(&self) -> Case {
        Case::new(self.name.clone(), self.command.clone())
    }
}

/// Show the tool catalog with history, favorites and folders
#[derive(Args, Debug, Clone)]
pub struct ListCommand {
    /// Only show packages whose label contains this text
    #[arg(short, long)]
    pub filter: Option<String>,
}

impl ListCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let workspace = ctx.open_with_catalog().await?;
        let style = ctx.style();

        match &self.filter {
            None => print!("{}", output::render_tree(&workspace, &style)),
            Some(filter) => {
                let needle = filter.to_lowercase();
                let mut shown = 0;
                for package in &workspace.catalog().packages {
                    if !package.label.to_lowercase().contains(&needle) {
                        continue;
                    }
                    shown += 1;
                    println!("{}", style.heading(&package.label));
                    for command in &package.commands {
                        println!("  {}", command.label);
                        for case in workspace.cases().cases_for(&command.key) {
                            println!(
                                "    {}",
                                style.case_line(case, workspace.keybindings().key_for(case))
                            );
                        }
                    }
                }
                if shown == 0 {
                    println!("{}", style.notice(&format!("No packages match '{}'", filter)));
                }
            }
        }
        Ok(())
    }
}

/// Search command labels, case names and case commands
#[derive(Args, Debug, Clone)]
pub struct SearchCommand {
    /// Text to look for (case-insensitive)
    pub term: String,
}

impl SearchCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let mut workspace = ctx.open_with_catalog().await?;
        let style = ctx.style();

        if workspace.search(&self.term).is_empty() {
            println!("{}", style.notice(&format!("No matches for '{}'", self.term)));
        } else {
            print!("{}", output::render_tree(&workspace, &style));
        }
        Ok(())
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum CaseAction {
    /// Attach a case to an installed command
    Add {
        /// Package name (or its full listing label)
        package: String,

        /// Command within the package
        tool_command: String,

        #[command(flatten)]
        case: CaseArgs,
    },

    /// Delete a case from its command
    Remove {
        #[command(flatten)]
        case: CaseArgs,
    },

    /// List stored cases by command key
    List {
        /// Only show cases of this command key (`package::command`)
        key: Option<String>,
    },
}

impl CaseAction {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let style = ctx.style();
        match self {
            CaseAction::Add {
                package,
                tool_command,
                case,
            } => {
                let mut workspace = ctx.open_with_catalog().await?;
                let key = workspace.resolve_command(package, tool_command)?;
                workspace.add_case(&key, &case.name, &case.command).await?;
                println!("{}", style.success(&format!("Added case '{}' to {}", case.name, key)));
            }
            CaseAction::Remove { case } => {
                let mut workspace = ctx.open_workspace().await?;
                if workspace.delete_case(&case.case()).await? {
                    println!("{}", style.success(&format!("Removed case '{}'", case.name)));
                } else {
                    println!("{}", style.notice(&format!("No case '{}' stored", case.name)));
                }
            }
            CaseAction::List { key } => {
                let workspace = ctx.open_workspace().await?;
                let entries = workspace.cases().entries();
                let wanted = key.as_deref().map(CommandKey::from);
                let mut current: Option<&CommandKey> = None;
                let mut shown = 0;
                for entry in &entries {
                    if wanted.as_ref().is_some_and(|k| k != &entry.command_key) {
                        continue;
                    }
                    if current != Some(&entry.command_key) {
                        println!("{}", style.heading(entry.command_key.as_str()));
                        current = Some(&entry.command_key);
                    }
                    let case = Case::from(entry.case.clone());
                    println!(
                        "  {}",
                        style.case_line(&case, workspace.keybindings().key_for(&case))
                    );
                    shown += 1;
                }
                if shown == 0 {
                    println!("{}", style.notice("No cases stored"));
                }
            }
        }
        Ok(())
    }
}

/// Run a case through the shell and record it in the history
#[derive(Args, Debug, Clone)]
pub struct RunCommand {
    #[command(flatten)]
    pub case: CaseArgs,
}

impl RunCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let mut workspace = ctx.open_workspace().await?;
        let case = self.case.case();
        println!("{}", ctx.style().notice(&format!("$ {}", case.command)));
        workspace.run_case(&case, ctx.runner.as_ref()).await
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum HistoryAction {
    /// Show recently run cases, most recent first
    List,

    /// Forget one case
    Remove {
        #[command(flatten)]
        case: CaseArgs,
    },

    /// Forget every case
    Clear,
}

impl HistoryAction {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let mut workspace = ctx.open_workspace().await?;
        let style = ctx.style();
        match self {
            HistoryAction::List => {
                print!(
                    "{}",
                    output::render_cases(
                        workspace.history().entries(),
                        &workspace,
                        &style,
                        "No cases run yet"
                    )
                );
            }
            HistoryAction::Remove { case } => {
                if workspace.remove_from_history(&case.case()).await? {
                    println!("{}", style.success(&format!("Removed '{}' from history", case.name)));
                } else {
                    println!("{}", style.notice(&format!("'{}' is not in the history", case.name)));
                }
            }
            HistoryAction::Clear => {
                workspace.clear_history().await?;
                println!("{}", style.success("History cleared"));
            }
        }
        Ok(())
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum FavoriteAction {
    /// Mark a case as favorite
    Add {
        #[command(flatten)]
        case: CaseArgs,
    },

    /// Unmark a favorite
    Remove {
        #[command(flatten)]
        case: CaseArgs,
    },

    /// Show favorites
    List,

    /// Remove every favorite
    Clear,
}

impl FavoriteAction {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let mut workspace = ctx.open_workspace().await?;
        let style = ctx.style();
        match self {
            FavoriteAction::Add { case } => {
                if workspace.add_favorite(&case.case()).await? {
                    println!("{}", style.success(&format!("Added '{}' to favorites", case.name)));
                } else {
                    println!("{}", style.notice(&format!("'{}' is already a favorite", case.name)));
                }
            }
            FavoriteAction::Remove { case } => {
                if workspace.remove_favorite(&case.case()).await? {
                    println!(
                        "{}",
                        style.success(&format!("Removed '{}' from favorites", case.name))
                    );
                } else {
                    println!("{}", style.notice(&format!("'{}' is not a favorite", case.name)));
                }
            }
            FavoriteAction::List => {
                print!(
                    "{}",
                    output::render_cases(
                        workspace.favorites().entries(),
                        &workspace,
                        &style,
                        "No favorites yet"
                    )
                );
            }
            FavoriteAction::Clear => {
                workspace.clear_favorites().await?;
                println!("{}", style.success("Favorites cleared"));
            }
        }
        Ok(())
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum KeyAction {
    /// Bind a key combination to a case
    Bind {
        /// Key combination, e.g. ctrl+shift+1
        key: String,

        #[command(flatten)]
        case: CaseArgs,
    },

    /// Remove a key binding
    Unbind {
        key: String,
    },

    /// Show key bindings
    List,

    /// Print the external keybinding list as JSON
    Snippet,

    /// Run the case bound to a key
    Run {
        key: String,
    },
}

impl KeyAction {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let mut workspace = ctx.open_workspace().await?;
        let style = ctx.style();
        match self {
            KeyAction::Bind { key, case } => {
                workspace.bind_key(key, &case.case()).await?;
                println!("{}", style.success(&format!("Bound {} to '{}'", key.trim(), case.name)));
            }
            KeyAction::Unbind { key } => {
                if workspace.unbind_key(key).await? {
                    println!("{}", style.success(&format!("Unbound {}", key)));
                } else {
                    println!("{}", style.notice(&format!("{} is not bound", key)));
                }
            }
            KeyAction::List => {
                if workspace.keybindings().is_empty() {
                    println!("{}", style.notice("No key bindings"));
                }
                for (key, case) in workspace.keybindings().bindings() {
                    println!(
                        "{:<20} {}",
                        style.key_label(key),
                        style.case_line(case, None)
                    );
                }
            }
            KeyAction::Snippet => {
                println!("{}", workspace.keybindings().snippet().await?);
            }
            KeyAction::Run { key } => {
                let case = workspace.run_keybinding(key, ctx.runner.as_ref()).await?;
                tracing::debug!(key = %key, case = %case, "ran bound case");
            }
        }
        Ok(())
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum FolderAction {
    /// Create an empty folder
    Create { name: String },

    /// Delete a folder and its case list
    Delete { name: String },

    /// Put a case in a folder
    Add {
        folder: String,

        #[command(flatten)]
        case: CaseArgs,
    },

    /// Take a case out of a folder
    Remove {
        folder: String,

        #[command(flatten)]
        case: CaseArgs,
    },

    /// Show folders and their cases
    List,
}

impl FolderAction {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let mut workspace = ctx.open_workspace().await?;
        let style = ctx.style();
        match self {
            FolderAction::Create { name } => {
                workspace.create_folder(name).await?;
                println!("{}", style.success(&format!("Created folder '{}'", name.trim())));
            }
            FolderAction::Delete { name } => {
                if workspace.delete_folder(name).await? {
                    println!("{}", style.success(&format!("Deleted folder '{}'", name)));
                } else {
                    println!("{}", style.notice(&format!("No folder named '{}'", name)));
                }
            }
            FolderAction::Add { folder, case } => {
                if workspace.add_to_folder(folder, &case.case()).await? {
                    println!("{}", style.success(&format!("Added '{}' to {}", case.name, folder)));
                } else {
                    println!("{}", style.notice(&format!("'{}' is already in {}", case.name, folder)));
                }
            }
            FolderAction::Remove { folder, case } => {
                if workspace.remove_from_folder(folder, &case.case()).await? {
                    println!(
                        "{}",
                        style.success(&format!("Removed '{}' from {}", case.name, folder))
                    );
                } else {
                    println!("{}", style.notice(&format!("'{}' is not in {}", case.name, folder)));
                }
            }
            FolderAction::List => {
                if workspace.folders().folders().is_empty() {
                    println!("{}", style.notice("No folders"));
                }
                for folder in workspace.folders().folders() {
                    println!("{}", style.heading(&folder.folder_name));
                    for data in &folder.cases {
                        let case = Case::from(data.clone());
                        println!(
                            "  {}",
                            style.case_line(&case, workspace.keybindings().key_for(&case))
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsAction {
    /// Write every store to one JSON file
    Export {
        /// Destination file
        #[arg(default_value = DEFAULT_EXPORT_FILE)]
        path: PathBuf,
    },

    /// Replace stores with the sections of an exported file
    Import {
        /// Exported settings file
        path: PathBuf,
    },
}

impl SettingsAction {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let style = ctx.style();
        match self {
            SettingsAction::Export { path } => {
                let workspace = ctx.open_workspace().await?;
                workspace.export_bundle().write_to(path).await?;
                println!(
                    "{}",
                    style.success(&format!("Settings exported to {}", path.display()))
                );
            }
            SettingsAction::Import { path } => {
                // A document that fails to parse must leave every store untouched
                let bundle = SettingsBundle::read_from(path).await?;
                let sections = bundle.sections().join(", ");
                let mut workspace = ctx.open_workspace().await?;
                workspace.import_bundle(bundle).await?;
                println!("{}", style.success(&format!("Imported {}", sections)));
            }
        }
        Ok(())
    }
}

/// Serve the keybinding panel protocol on stdin/stdout
pub async fn run_panel(ctx: &Context) -> Result<()> {
    let mut workspace = ctx.open_workspace().await?;
    panel::serve_lines(
        &mut workspace,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key, e.g. output.color or keybindings.path
        key: String,
        /// Configuration value
        value: String,
    },

    /// Show configuration file path
    Path,
}

impl ConfigAction {
    pub async fn execute(&self, config_path: &Path, config: &Config) -> Result<()> {
        match self {
            ConfigAction::Show => {
                let content = toml::to_string_pretty(config).map_err(|e| {
                    InteractiveError::configuration(format!("Failed to serialize config: {}", e))
                })?;
                print!("{}", content);
            }
            ConfigAction::Set { key, value } => {
                let mut stored = Config::load_from_file(config_path)?;
                stored.set_value(key, value)?;
                stored.save_to_file(config_path)?;
                println!("Set {} = {}", key, value);
            }
            ConfigAction::Path => {
                println!("{}", config_path.display());
            }
        }
        Ok(())
    }
}
