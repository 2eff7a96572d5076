//! Keybinding management panel
//!
//! A line-oriented JSON channel: every inbound message is applied to the
//! workspace and answered with the full panel state, so the other side never
//! has to patch its view.
//!
//! Inbound: `{"command": "bind", "key", "caseName", "caseCommand"}` or
//! `{"command": "unbind", "key"}`.

use crate::cli::error::Result;
use crate::cli::workspace::Workspace;
use crate::core::Case;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum PanelMessage {
    #[serde(rename_all = "camelCase")]
    Bind {
        #[serde(default)]
        key: String,
        case_name: String,
        case_command: String,
    },
    Unbind { key: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelRow {
    pub case_name: String,
    pub case_command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelState {
    pub rows: Vec<PanelRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Current state: one row per known case with its bound key
pub fn render(workspace: &Workspace) -> PanelState {
    let rows = workspace
        .all_known_cases()
        .into_iter()
        .map(|data| {
            let key = workspace
                .keybindings()
                .key_for(&Case::from(data.clone()))
                .map(str::to_string);
            PanelRow {
                case_name: data.case_name,
                case_command: data.case_command,
                key,
            }
        })
        .collect();

    PanelState { rows, notice: None }
}

/// Apply one message and return the new state.
///
/// Rejections (an occupied key) are reported in `notice` rather than as
/// errors; only storage failures are returned as `Err`.
pub async fn handle(workspace: &mut Workspace, message: PanelMessage) -> Result<PanelState> {
    let notice = match message {
        PanelMessage::Bind { key, .. } if key.trim().is_empty() => None,
        PanelMessage::Bind {
            key,
            case_name,
            case_command,
        } => {
            let case = Case::new(case_name, case_command);
            match workspace.bind_key(&key, &case).await {
                Ok(()) => None,
                Err(e) if e.is_rejection() => Some(e.user_message()),
                Err(e) => return Err(e),
            }
        }
        PanelMessage::Unbind { key } => {
            workspace.unbind_key(&key).await?;
            None
        }
    };

    Ok(PanelState {
        notice,
        ..render(workspace)
    })
}

/// Serve the panel protocol until `input` is exhausted.
///
/// The initial state is written before any message is read. Lines that do not
/// decode are answered with the unchanged state and a notice.
pub async fn serve_lines<R, W>(workspace: &mut Workspace, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    write_state(&mut output, &render(workspace)).await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let state = match serde_json::from_str::<PanelMessage>(&line) {
            Ok(message) => {
                debug!(?message, "panel message");
                handle(workspace, message).await?
            }
            Err(e) => {
                warn!(error = %e, "ignoring malformed panel message");
                PanelState {
                    notice: Some(format!("Unrecognized message: {}", e)),
                    ..render(workspace)
                }
            }
        };
        write_state(&mut output, &state).await?;
    }

    Ok(())
}

async fn write_state<W: AsyncWrite + Unpin>(output: &mut W, state: &PanelState) -> Result<()> {
    let mut line = serde_json::to_string(state)?;
    line.push('\n');
    output.write_all(line.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}
