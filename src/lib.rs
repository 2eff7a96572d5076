//! # toolcase
//!
//! Organizes the tools installed through `uv tool install` into a browsable
//! catalog and lets you attach reusable invocations ("cases") to every command.
//! Recently run cases, favorites and keybindings are persisted between runs and
//! can be moved between machines as a single JSON bundle.
//!
//! The crate is split the same way the binary is layered:
//!
//! - [`core`]: the catalog parser, the case value types, the key-value
//!   persistence seam and the typed change events.
//! - [`runtime`]: the processes the workspace reaches out to (the tool listing
//!   and the shell that runs a case).
//! - `cli` (feature `cli`, on by default): the stores, the workspace that wires
//!   them together, and the command-line surface.
//!
//! ```rust,no_run
//! # #[cfg(feature = "cli")]
//! # async fn demo() -> toolcase::cli::Result<()> {
//! use std::sync::Arc;
//! use toolcase::cli::keybindings::MemoryKeybindingConfig;
//! use toolcase::cli::workspace::{Workspace, WorkspaceOptions};
//! use toolcase::core::storage::MemoryStore;
//! use toolcase::runtime::UvToolLister;
//!
//! let mut workspace = Workspace::load(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(MemoryKeybindingConfig::default()),
//!     WorkspaceOptions::default(),
//! )
//! .await?;
//! workspace.refresh(&UvToolLister::new("uv")).await?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod runtime;

#[cfg(feature = "cli")]
pub mod cli;

pub use crate::core::{Case, CaseData, CaseRole, Catalog, CommandKey, Error, Result};
