//! # State Module
//!
//! What the terminal remembers between two commands. Authoritative data
//! (cart, caja, session) lives in `huevo-client`; this is screen state only.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────┐        ┌───────────────────────────────────┐  │
//! │  │      NavState        │        │            Workspace              │  │
//! │  │                      │        │                                   │  │
//! │  │  current Route       │        │  catalog seen so far (by id)      │  │
//! │  │  guard + redirects   │        │  last stock query / page          │  │
//! │  │                      │        │  combo draft                      │  │
//! │  │                      │        │  report filter, ledger period     │  │
//! │  └──────────────────────┘        └───────────────────────────────────┘  │
//! │                                                                         │
//! │  Both are reset on logout.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod nav;
mod workspace;

pub use nav::NavState;
pub use workspace::{StockQuery, Workspace};
