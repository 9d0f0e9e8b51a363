//! # Caja Service
//!
//! Cash-register status, open and close.
//!
//! ## User Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Caja Lifecycle                                  │
//! │                                                                         │
//! │  start ──► caja_esta_abierta ──► Closed │ Open                         │
//! │                                                                         │
//! │  Closed ── confirm "¿Abrir la caja? (dd/mm/yyyy hh:mm)" ──►            │
//! │            caja_abrir ──► caja_esta_abierta ──► Open                   │
//! │                                                                         │
//! │  Open ── draft has lines? ──► refuse (SaleInProgress)                  │
//! │       ── caja_resumen_diario (shown in the prompt)                     │
//! │       ── confirm "¿Cerrar la caja? (…)"                                │
//! │       ── draft has lines? (re-check) ──► refuse                        │
//! │       ── caja_cerrar ──► caja_esta_abierta ──► Closed                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The state shown is always the last `caja_esta_abierta` answer.

use chrono::NaiveDateTime;
use huevo_core::caja::{confirmation_text, CajaAction, CajaIdReply, CajaState, CajaSummary};
use huevo_core::CajaId;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::ClientResult;
use crate::invoke::{BusyFlag, CommandClient, NoArgs};
use crate::notify::{ConfirmRequest, Prompter};
use crate::sale::SaleService;

#[derive(Clone)]
pub struct CajaService {
    client: CommandClient,
    state: Arc<RwLock<CajaState>>,
    busy: BusyFlag,
}

impl CajaService {
    pub fn new(client: CommandClient) -> Self {
        CajaService {
            client,
            state: Arc::new(RwLock::new(CajaState::Closed)),
            busy: BusyFlag::new(),
        }
    }

    /// Last known state.
    pub async fn state(&self) -> CajaState {
        *self.state.read().await
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Fetches `caja_esta_abierta` and stores the answer.
    pub async fn refresh(&self) -> ClientResult<CajaState> {
        debug!("caja status command");
        let abierta: bool = self.client.call("caja_esta_abierta", &NoArgs {}).await?;
        let state = CajaState::from_status(abierta);
        *self.state.write().await = state;
        Ok(state)
    }

    pub async fn summary(&self) -> ClientResult<CajaSummary> {
        self.client.call("caja_resumen_diario", &NoArgs {}).await
    }

    /// Opens the register after confirmation.
    ///
    /// Returns `None` when the operator declines.
    pub async fn open(&self, prompter: &dyn Prompter, now: NaiveDateTime) -> ClientResult<Option<CajaId>> {
        let request = ConfirmRequest::new("Abrir caja", confirmation_text(CajaAction::Abrir, now))
            .with_label("Abrir");
        if !prompter.confirm(&request).await {
            return Ok(None);
        }

        let _busy = self.busy.acquire("Apertura de caja")?;
        let reply: CajaIdReply = self
            .client
            .call("caja_abrir", &NoArgs {})
            .await
            .map_err(|e| e.classify_caja())?;
        let id = reply.id();
        self.refresh().await?;

        info!(id_caja = id, "Caja opened");
        Ok(Some(id))
    }

    /// Closes the register after confirmation.
    ///
    /// Refused while the sale draft has lines, both before the prompt and
    /// right after it. Returns `false` when the operator declines.
    pub async fn close(
        &self,
        sale: &SaleService,
        prompter: &dyn Prompter,
        now: NaiveDateTime,
    ) -> ClientResult<bool> {
        self.state().await.ensure_can_close(&sale.state().await)?;

        let mut message = confirmation_text(CajaAction::Cerrar, now);
        match self.summary().await {
            Ok(summary) => {
                message.push_str(&format!(
                    "\nVentas: {} · Total: {}",
                    summary.cantidad_ventas, summary.total_general
                ));
                for medio in &summary.por_medio {
                    message.push_str(&format!("\n  {}: {}", medio.label(), medio.total_medio));
                }
            }
            Err(e) => {
                warn!(error = %e, "Daily summary unavailable");
                message.push_str("\nResumen del día no disponible.");
            }
        }
        let request = ConfirmRequest::new("Cerrar caja", message)
            .with_label("Cerrar")
            .danger();
        if !prompter.confirm(&request).await {
            return Ok(false);
        }

        self.state().await.ensure_can_close(&sale.state().await)?;

        let _busy = self.busy.acquire("Cierre de caja")?;
        self.client
            .call_unit("caja_cerrar", &NoArgs {})
            .await
            .map_err(|e| e.classify_caja())?;
        self.refresh().await?;

        info!("Caja closed");
        Ok(true)
    }
}
