use thiserror::Error;

/// Errors raised by the domain layer
#[derive(Error, Debug)]
pub enum Error {
    #[error("Tool listing failed: {0}")]
    ToolListing(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Keybinding configuration error: {0}")]
    KeybindingConfig(String),

    #[error("Process error: {0}")]
    Process(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a tool listing error
    pub fn tool_listing<S: Into<String>>(msg: S) -> Self {
        Self::ToolListing(msg.into())
    }

    /// Create a storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a keybinding configuration error
    pub fn keybinding_config<S: Into<String>>(msg: S) -> Self {
        Self::KeybindingConfig(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
