//! # Huevo Santo POS Terminal Entry Point
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Huevo Santo POS Terminal                         │
//! │                                                                         │
//! │  stdin ──► Shell (commands/) ──► huevo-client services ──► backend     │
//! │                 │                                                       │
//! │                 └──► render.rs ──► stdout        tracing ──► stderr     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load config (file, then `HUEVO_*` env overrides)
//! 3. Connect to the backend
//! 4. Resolve the session and land on the right screen
//! 5. Read commands until `salir` or end of input

#[tokio::main]
async fn main() {
    if let Err(e) = huevo_terminal::run().await {
        eprintln!("huevo-pos: {e}");
        std::process::exit(1);
    }
}
