//! Stores, workspace and command-line surface of toolcase.
//! ## Usage
//!
//! ```bash
//! # Show installed tools with their cases
//! toolcase list
//!
//! # Attach a case to a command
//! toolcase case add ruff ruff "check src" "ruff check src"
//!
//! # Run it (records it in the history)
//! toolcase run "check src" "ruff check src"
//!
//! # Bind it to a key
//! toolcase key bind ctrl+shift+1 "check src" "ruff check src"
//!
//! # Move everything to another machine
//! toolcase settings export toolcase-settings.json
//! ```

pub mod cases;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod favorites;
pub mod folders;
pub mod history;
pub mod keybindings;
pub mod output;
pub mod panel;
pub mod search;
pub mod settings;
pub mod workspace;


// Re-export commonly used types
pub use error::{InteractiveError, Result, UserFriendlyError};

/// Version information for the toolcase CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the persisted state document inside the data directory
pub const STATE_FILE: &str = "state.json";

/// Default directory for storing toolcase state
pub fn default_data_dir() -> std::path::PathBuf {
    directories::ProjectDirs::from("", "", "toolcase")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            // Fallback to home directory if project dirs not available
            dirs::home_dir()
                .unwrap_or_else(|| std::path::PathBuf::from("."))
                .join(".toolcase")
        })
}

/// Initialize the data directory if it doesn't exist
pub fn ensure_data_dir() -> Result<std::path::PathBuf> {
    let data_dir = default_data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
    }
    Ok(data_dir)
}
