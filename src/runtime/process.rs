use crate::core::error::{Error, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Source of the raw tool listing
#[async_trait]
pub trait ToolLister: Send + Sync {
    /// Raw stdout of the listing command
    async fn list(&self) -> Result<String>;
}

/// Runs `<tool> tool list`
#[derive(Debug, Clone)]
pub struct UvToolLister {
    tool: String,
}

impl UvToolLister {
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }
}

#[async_trait]
impl ToolLister for UvToolLister {
    async fn list(&self) -> Result<String> {
        let binary = which::which(&self.tool).map_err(|e| {
            Error::ToolNotFound(format!("{} ({})", self.tool, e))
        })?;
        debug!(binary = %binary.display(), "listing installed tools");

        let output = Command::new(&binary)
            .args(["tool", "list"])
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::tool_listing(format!(
                "`{} tool list` exited with {}: {}",
                self.tool,
                output.status,
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| Error::tool_listing(format!("listing is not valid UTF-8: {}", e)))
    }
}

/// Fixed listing text, for tests and offline use
#[derive(Debug, Clone, Default)]
pub struct StaticToolLister {
    listing: Option<String>,
}

impl StaticToolLister {
    pub fn new(listing: impl Into<String>) -> Self {
        Self {
            listing: Some(listing.into()),
        }
    }

    /// A lister whose invocation always fails
    pub fn failing() -> Self {
        Self { listing: None }
    }
}

#[async_trait]
impl ToolLister for StaticToolLister {
    async fn list(&self) -> Result<String> {
        self.listing
            .clone()
            .ok_or_else(|| Error::tool_listing("listing unavailable"))
    }
}

/// Executes a case's command string
#[async_trait]
pub trait CaseRunner: Send + Sync {
    async fn run(&self, command: &str) -> Result<()>;
}

/// Runs command strings through the platform shell with inherited stdio
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
}

impl ShellRunner {
    pub fn new(shell: Option<String>) -> Self {
        let shell = shell.unwrap_or_else(|| {
            if cfg!(windows) {
                "cmd".to_string()
            } else {
                "sh".to_string()
            }
        });
        Self { shell }
    }

    fn flag(&self) -> &'static str {
        if self.shell.eq_ignore_ascii_case("cmd") || self.shell.ends_with("cmd.exe") {
            "/C"
        } else {
            "-c"
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl CaseRunner for ShellRunner {
    async fn run(&self, command: &str) -> Result<()> {
        info!(shell = %self.shell, command, "running case");
        let status = Command::new(&self.shell)
            .arg(self.flag())
            .arg(command)
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Process(format!("`{}` exited with {}", command, status)))
        }
    }
}
