use thiserror::Error;

/// Error type for the toolcase stores and CLI
#[derive(Error, Debug)]
pub enum InteractiveError {
    #[error("Key {0} is already in use")]
    KeyInUse(String),

    #[error("Keybinding not found: {0}")]
    KeybindingNotFound(String),

    #[error("Case not found: {0}")]
    CaseNotFound(String),

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Import failed: {0}")]
    Import(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] crate::core::error::Error),
}

impl InteractiveError {
    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an import error
    pub fn import<S: Into<String>>(msg: S) -> Self {
        Self::Import(msg.into())
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether the error leaves every store untouched
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::KeyInUse(_)
                | Self::KeybindingNotFound(_)
                | Self::CaseNotFound(_)
                | Self::CommandNotFound(_)
                | Self::FolderNotFound(_)
                | Self::InvalidInput(_)
                | Self::Import(_)
        )
    }

    /// Get user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::KeyInUse(key) => {
                format!("Key '{}' is already bound. Run 'toolcase key unbind {}' first or pick another key.", key, key)
            }
            Self::KeybindingNotFound(key) => {
                format!("No case is bound to '{}'. Run 'toolcase key list' to see bindings.", key)
            }
            Self::CommandNotFound(cmd) => {
                format!("Command '{}' not found. Run 'toolcase list' to see installed tools.", cmd)
            }
            Self::FolderNotFound(name) => {
                format!("Folder '{}' not found. Run 'toolcase folder list' to see folders.", name)
            }
            Self::Import(msg) => {
                format!("Import failed, nothing was changed: {}", msg)
            }
            Self::Core(crate::core::error::Error::ToolNotFound(tool)) => {
                format!("Could not find '{}' on PATH. Install uv or set tool_command in the config.", tool)
            }
            _ => self.to_string(),
        }
    }
}

/// Convenient result type for the toolcase CLI
pub type Result<T> = std::result::Result<T, InteractiveError>;

/// Trait for converting errors to user-friendly messages
pub trait UserFriendlyError {
    fn user_message(&self) -> String;
}

impl UserFriendlyError for InteractiveError {
    fn user_message(&self) -> String {
        self.user_message()
    }
}
