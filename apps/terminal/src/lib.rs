//! # Huevo Santo Terminal Library
//!
//! Operator-facing front end of the POS. Reads one command per line,
//! checks the route guard, calls `huevo-client`, and prints the result.
//!
//! ## Module Organization
//! ```text
//! huevo_terminal/
//! ├── lib.rs          ◄─── You are here (startup & read loop)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── nav.rs      ◄─── Current screen and route guard
//! │   └── workspace.rs◄─── Catalog cache, combo draft, filters
//! ├── commands/
//! │   ├── mod.rs      ◄─── Shell, command table, argument parsing
//! │   ├── session.rs  ◄─── login, logout, registrar, ir
//! │   ├── caja.rs     ◄─── abrir, cerrar, resumen
//! │   ├── sale.rs     ◄─── agregar, cobrar, cancelar, historial
//! │   ├── promo.rs    ◄─── promos, aplicar, combos
//! │   ├── stock.rs    ◄─── stock, alta, ajustar, compra, historia
//! │   ├── reports.rs  ◄─── pnl, rentabilidad, reposicion, ventas
//! │   └── ledger.rs   ◄─── gastos, sueldos
//! ├── io.rs           ◄─── stdin prompts and console toasts
//! ├── render.rs       ◄─── Text tables for every screen
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Screen Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One shell, many screens                              │
//! │                                                                         │
//! │   "/"  login ──────► "/ventas"  (any user) ──► cart, caja, promos       │
//! │          │                                                              │
//! │          └─────────► "/admin"   (admin)   ──► stock, compras, reports,  │
//! │                                               gastos, historial         │
//! │                                                                         │
//! │   Each command belongs to a screen. Running it checks the guard and     │
//! │   moves the shell to that screen, the way a click on a tab would.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod io;
pub mod render;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use huevo_client::{ClientConfig, PosClient};
use tokio::io::BufReader;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use commands::{Clock, Reply, Shell};
use error::ApiError;
use io::{ConsoleNotifier, LineInput, LinePrompter};

/// Runs the terminal until `salir` or end of input.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Terminal Startup                                  │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, written to stderr             │
/// │     • Default: info,huevo=debug, can be overridden with RUST_LOG        │
/// │                                                                         │
/// │  2. Load Config ──────────────────────────────────────────────────────► │
/// │     • --config <path>, or the platform config dir                       │
/// │     • HUEVO_* environment overrides                                     │
/// │                                                                         │
/// │  3. Connect ──────────────────────────────────────────────────────────► │
/// │     • WebSocket transport, session cache file                           │
/// │                                                                         │
/// │  4. Land ─────────────────────────────────────────────────────────────► │
/// │     • Cached session: /admin or /ventas, otherwise /                    │
/// │                                                                         │
/// │  5. Read loop ────────────────────────────────────────────────────────► │
/// │     • One command per line, prompts share the same input                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting Huevo Santo POS terminal");

    let config_path = config_path_from_args(std::env::args().skip(1))?;
    let config = ClientConfig::load_or_default(config_path);
    info!(url = %config.backend.url, store = %config.store.name, "Config loaded");

    let pos = PosClient::connect(config).await?;

    let input = Arc::new(LineInput::new(BufReader::new(tokio::io::stdin())));
    let mut shell = Shell::new(
        pos.clone(),
        Arc::new(LinePrompter::new(input.clone())),
        Arc::new(ConsoleNotifier),
        Clock::System,
    );

    println!("{}", shell.start().await);

    loop {
        print!("{}> ", shell.nav().current());
        std::io::stdout().flush()?;

        let Some(line) = input.next_line().await? else {
            break;
        };
        match shell.execute(&line).await {
            Reply::Text(text) => println!("{text}"),
            Reply::Nothing => {}
            Reply::Quit => break,
        }
    }

    pos.shutdown().await?;
    info!("Terminal closed");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=huevo_client=trace` - Show every frame of the transport
/// - Default: `info,huevo=debug`
///
/// Logs go to stderr so they never mix with the screens on stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,huevo=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads `--config <path>` from the command line.
fn config_path_from_args(args: impl IntoIterator<Item = String>) -> Result<Option<PathBuf>, ApiError> {
    let mut args = args.into_iter();
    let mut path = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let value = args
                    .next()
                    .ok_or_else(|| ApiError::usage("--config requiere una ruta."))?;
                path = Some(PathBuf::from(value));
            }
            other => return Err(ApiError::usage(format!("Argumento desconocido: {other}"))),
        }
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_config_path_from_args() {
        assert_eq!(config_path_from_args(args(&[])).unwrap(), None);
        assert_eq!(
            config_path_from_args(args(&["--config", "/tmp/pos.toml"])).unwrap(),
            Some(PathBuf::from("/tmp/pos.toml"))
        );
        assert!(config_path_from_args(args(&["--config"])).is_err());
        assert!(config_path_from_args(args(&["--verbose"])).is_err());
    }
}
