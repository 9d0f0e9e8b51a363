//! # Caja Commands
//!
//! Status, open, close and the daily summary of the cash register.
//!
//! ## Caja Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────────┐   abrir (confirm)    ┌──────────┐                        │
//! │   │ Cerrada  │ ───────────────────► │ Abierta  │ ──► ventas posibles    │
//! │   └──────────┘ ◄─────────────────── └──────────┘                        │
//! │                  cerrar (summary + confirm,                             │
//! │                  refused with a sale in progress)                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use huevo_client::Notice;

use super::{text, unknown, Args, CommandResult, Reply, Shell};
use crate::render;

pub async fn run(shell: &mut Shell, name: &str, _args: &mut Args) -> CommandResult {
    match name {
        "caja" => status(shell).await,
        "abrir" => open(shell).await,
        "cerrar" => close(shell).await,
        "resumen" => summary(shell).await,
        other => Err(unknown(other)),
    }
}

async fn status(shell: &mut Shell) -> CommandResult {
    let state = shell.pos().caja().refresh().await?;
    text(render::caja_status(state))
}

async fn open(shell: &mut Shell) -> CommandResult {
    let now = shell.clock().now();
    match shell.pos().caja().open(shell.prompter(), now).await? {
        Some(id_caja) => {
            shell.notify(Notice::success(format!("Caja #{id_caja} abierta.")));
            text(render::caja_status(shell.pos().caja().state().await))
        }
        None => Ok(Reply::Nothing),
    }
}

async fn close(shell: &mut Shell) -> CommandResult {
    let now = shell.clock().now();
    let pos = shell.pos();
    if pos.caja().close(pos.sale(), shell.prompter(), now).await? {
        shell.notify(Notice::success("Caja cerrada."));
        text(render::caja_status(pos.caja().state().await))
    } else {
        Ok(Reply::Nothing)
    }
}

async fn summary(shell: &mut Shell) -> CommandResult {
    let summary = shell.pos().caja().summary().await?;
    text(render::caja_summary(&summary))
}
