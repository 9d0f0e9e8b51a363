//! # huevo-client: Backend Client for the Huevo Santo POS
//!
//! Every call that leaves the terminal goes through this crate. The backend
//! owns persistence and aggregation; the services here validate input with
//! `huevo-core`, send named commands, and keep the little state a screen
//! needs (session, caja status, sale draft).
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           PosClient                                     │
//! │                                                                         │
//! │  ┌────────┐ ┌────────┐ ┌────────┐ ┌────────┐ ┌────────┐ ┌──────────┐   │
//! │  │  auth  │ │  caja  │ │  sale  │ │ stock  │ │ promo  │ │ reports  │   │
//! │  └───┬────┘ └───┬────┘ └───┬────┘ └───┬────┘ └───┬────┘ └────┬─────┘   │
//! │      │          │          │          │          │           │         │
//! │      │   ┌──────┴──────────┴──────────┴──────────┴───────────┘         │
//! │      │   │                                       ┌────────┐            │
//! │      │   │                                       │ ledger │            │
//! │      │   │                                       └───┬────┘            │
//! │      ▼   ▼                                           ▼                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  CommandClient (invoke.rs): typed args/replies, timeout, busy   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ dyn CommandTransport                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │  WsTransport (transport.rs): request ids, pending replies, ping │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ SessionUpdated                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │  SessionStore (session.rs): cache file + change broadcast       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`] - TOML configuration with env overrides
//! - [`error`] - Client error types
//! - [`protocol`] - Wire frames of the command channel
//! - [`transport`] - `CommandTransport` trait and the WebSocket transport
//! - [`invoke`] - Typed command calls, liveness timeout, busy flags
//! - [`session`] - Session resolution and persistence
//! - [`notify`] - Toasts and confirmation prompts
//! - [`auth`] - Login, logout, registration, user pickers
//! - [`caja`] - Cash register status, open and close
//! - [`sale`] - Sale draft, cart, payments, today's history
//! - [`stock`] - Product catalog, stock updates, purchases, history
//! - [`promo`] - Combo promotions
//! - [`reports`] - Admin dashboards
//! - [`ledger`] - Expenses and payroll
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use huevo_client::{ClientConfig, PosClient};
//!
//! let config = ClientConfig::load_or_default(None);
//! let pos = PosClient::connect(config).await?;
//! let route = pos.auth().login("ana", "1234").await?;
//! pos.caja().refresh().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod caja;
pub mod config;
pub mod error;
pub mod invoke;
pub mod ledger;
pub mod notify;
pub mod promo;
pub mod protocol;
pub mod reports;
pub mod sale;
pub mod session;
pub mod stock;
pub mod transport;

#[cfg(test)]
mod fake;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use auth::AuthService;
pub use caja::CajaService;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use invoke::{BusyFlag, CommandClient};
pub use ledger::LedgerService;
pub use notify::{ChannelNotifier, ConfirmRequest, Notice, NoticeLevel, Notifier, Prompter};
pub use promo::PromoService;
pub use reports::ReportsService;
pub use sale::SaleService;
pub use session::{FileStorage, MemoryStorage, SessionEvent, SessionStore};
pub use stock::StockService;
pub use transport::{BackendEvent, CommandTransport, ConnectionState, TransportConfig, WsTransport};

use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

// =============================================================================
// PosClient
// =============================================================================

/// Every service wired to one transport and one session store.
#[derive(Clone)]
pub struct PosClient {
    config: ClientConfig,
    client: CommandClient,
    transport: Option<WsTransport>,
    session: SessionStore,
    auth: AuthService,
    caja: CajaService,
    sale: SaleService,
    stock: StockService,
    promo: PromoService,
    reports: ReportsService,
    ledger: LedgerService,
}

impl PosClient {
    /// Validates `config`, connects to the backend and opens the session file.
    pub async fn connect(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let transport = WsTransport::connect(TransportConfig::from(&config.backend)).await?;

        let session = match config.session.resolved_path() {
            Some(path) => {
                debug!(path = %path.display(), "Session file");
                SessionStore::new(Arc::new(FileStorage::new(path)))
            }
            None => {
                warn!("No data directory, session kept in memory");
                SessionStore::in_memory()
            }
        };
        watch_session_events(transport.subscribe_events(), session.clone());

        let mut pos = Self::with_transport(config, Arc::new(transport.clone()), session);
        pos.transport = Some(transport);
        info!(store = %pos.config.store.name, "POS client ready");
        Ok(pos)
    }

    /// Builds the services over any transport.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn CommandTransport>,
        session: SessionStore,
    ) -> Self {
        let client = CommandClient::new(transport).with_call_timeout(config.backend.call_timeout());
        let caja = CajaService::new(client.clone());
        PosClient {
            auth: AuthService::new(client.clone(), session.clone()),
            sale: SaleService::new(client.clone(), caja.clone()),
            stock: StockService::new(client.clone(), config.stock.clone()),
            promo: PromoService::new(client.clone()),
            reports: ReportsService::new(client.clone()),
            ledger: LedgerService::new(client.clone()),
            caja,
            client,
            transport: None,
            session,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn client(&self) -> &CommandClient {
        &self.client
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn caja(&self) -> &CajaService {
        &self.caja
    }

    pub fn sale(&self) -> &SaleService {
        &self.sale
    }

    pub fn stock(&self) -> &StockService {
        &self.stock
    }

    pub fn promo(&self) -> &PromoService {
        &self.promo
    }

    pub fn reports(&self) -> &ReportsService {
        &self.reports
    }

    pub fn ledger(&self) -> &LedgerService {
        &self.ledger
    }

    /// Connection state; always connected for injected transports.
    pub async fn connection_state(&self) -> ConnectionState {
        match &self.transport {
            Some(transport) => transport.state().await,
            None => ConnectionState::Connected,
        }
    }

    pub async fn shutdown(&self) -> ClientResult<()> {
        match &self.transport {
            Some(transport) => transport.shutdown().await,
            None => Ok(()),
        }
    }
}

/// Invalidates the session whenever the backend reports a change, so the
/// next guard check asks `session_info` again.
pub fn watch_session_events(
    mut events: broadcast::Receiver<BackendEvent>,
    session: SessionStore,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(BackendEvent::SessionUpdated) => {
                    debug!("Backend session updated");
                    session.invalidate().await;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Session events lagged");
                    session.invalidate().await;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeBackend;
    use crate::notify::AutoConfirm;
    use chrono::NaiveDate;
    use huevo_core::sale::{Payment, SaleState};
    use huevo_core::session::{Resolution, Role, Route, Session};
    use huevo_core::types::PaymentMethod;
    use huevo_core::Money;

    #[tokio::test]
    async fn test_session_event_invalidates_store() {
        let session = SessionStore::in_memory();
        session.set(Session::new(1, Role::Operador)).await.unwrap();

        let (tx, rx) = broadcast::channel(4);
        let watcher = watch_session_events(rx, session.clone());
        tx.send(BackendEvent::SessionUpdated).unwrap();
        drop(tx);
        watcher.await.unwrap();

        assert_eq!(session.get().await, Resolution::Loading);
    }

    #[tokio::test]
    async fn test_operator_day() {
        let fake = FakeBackend::new();
        fake.add_user("ana", "1234", "operador");
        let p = fake.add_product("P001", "Maple blanco", 10, 125, 80);
        let pos = PosClient::with_transport(
            ClientConfig::default(),
            Arc::new(fake.clone()),
            SessionStore::in_memory(),
        );
        let now = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();

        assert_eq!(pos.auth().login("ana", "1234").await.unwrap(), Route::Ventas);
        pos.caja().open(&AutoConfirm(true), now).await.unwrap();

        let cart = pos.sale().add_item(p, 2).await.unwrap();
        assert_eq!(cart.total, Money::from_pesos(250));
        let total = pos
            .sale()
            .finalize(vec![Payment::new(PaymentMethod::Efectivo, Money::from_pesos(250))])
            .await
            .unwrap();
        assert_eq!(total, Money::from_pesos(250));
        pos.sale().acknowledge().await.unwrap();
        assert_eq!(pos.sale().state().await, SaleState::NoSale);
        assert_eq!(fake.stock_of(p), Some(8));

        assert!(pos.auth().logout(pos.caja()).await.is_err());
        assert!(pos.caja().close(pos.sale(), &AutoConfirm(true), now).await.unwrap());
        pos.auth().logout(pos.caja()).await.unwrap();
        assert!(!pos.session().current().await.is_authenticated());
        assert_eq!(pos.connection_state().await, ConnectionState::Connected);
    }
}
