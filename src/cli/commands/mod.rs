//! Command discovery
//!
//! This module handles:
//! - Invoking the tool listing through a [`ToolLister`]
//! - Parsing the listing into a [`Catalog`]
//! - Turning listing failures into a non-fatal warning and an empty catalog

use crate::core::{parse_listing, Catalog};
use crate::runtime::ToolLister;
use tracing::{info, warn};

/// Result of one discovery pass
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub catalog: Catalog,
    /// Set when the listing could not be obtained
    pub warning: Option<String>,
}

/// Command discovery service
pub struct CommandDiscovery<'a> {
    lister: &'a dyn ToolLister,
}

impl<'a> CommandDiscovery<'a> {
    /// Create a new command discovery service
    pub fn new(lister: &'a dyn ToolLister) -> Self {
        Self { lister }
    }

    /// Discover all installed commands. Never fails: a listing error yields
    /// an empty catalog with a warning.
    pub async fn discover_commands(&self) -> Discovery {
        let listing = match self.lister.list().await {
            Ok(listing) => listing,
            Err(e) => {
                warn!(error = %e, "failed to load tool listing");
                return Discovery {
                    catalog: Catalog::empty(),
                    warning: Some(format!("Failed to load command list: {}", e)),
                };
            }
        };

        let catalog = parse_listing(&listing);
        for key in catalog.duplicate_keys() {
            warn!(key = %key, "several commands share a command key, their cases are merged");
        }
        info!(
            packages = catalog.packages.len(),
            commands = catalog.command_count(),
            "catalog loaded"
        );

        Discovery {
            catalog,
            warning: None,
        }
    }
}
