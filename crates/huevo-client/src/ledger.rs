//! # Ledger Service
//!
//! Expense (gastos) and payroll (sueldos) entries.
//!
//! ## User Workflow
//! ```text
//! period / filter change
//!      │
//!      ├──► gasto_listar_por_periodo {filtro}  ──┐
//!      │                                          ├── tokio::join! ──► (rows, total)
//!      └──► gasto_total_por_periodo  {input}   ──┘
//!
//! new entry ──► plan_expense ──► gasto_registrar {input} ──► caller refreshes
//! ```
//!
//! The total is always the backend's; rows are never summed here.

use huevo_core::ledger::{
    plan_expense, plan_payroll, ExpenseCategory, ExpenseDraft, ExpenseFilter, ExpenseRow,
    LedgerTotalInput, PayrollDraft, PayrollFilter, PayrollRow, TotalReply,
};
use huevo_core::report::DateRange;
use huevo_core::{Money, UserId};
use serde::Serialize;
use tracing::info;

use crate::error::ClientResult;
use crate::invoke::{BusyFlag, CommandClient, Input};

#[derive(Serialize)]
struct Filtro<'a, T> {
    filtro: &'a T,
}

#[derive(Clone)]
pub struct LedgerService {
    client: CommandClient,
    saving: BusyFlag,
}

impl LedgerService {
    pub fn new(client: CommandClient) -> Self {
        LedgerService {
            client,
            saving: BusyFlag::new(),
        }
    }

    pub async fn register_expense(&self, draft: &ExpenseDraft) -> ClientResult<i64> {
        let input = plan_expense(draft)?;
        let _busy = self.saving.acquire("Registro de gasto")?;
        let id: i64 = self.client.call("gasto_registrar", &Input::new(&input)).await?;
        info!(id_gasto = id, categoria = %input.categoria, monto = %input.monto, "Expense registered");
        Ok(id)
    }

    pub async fn register_payroll(&self, draft: &PayrollDraft) -> ClientResult<i64> {
        let input = plan_payroll(draft)?;
        let _busy = self.saving.acquire("Registro de sueldo")?;
        let id: i64 = self.client.call("sueldo_registrar", &Input::new(&input)).await?;
        info!(
            id_sueldo = id,
            id_usuario_destino = input.id_usuario_destino,
            monto = %input.monto,
            "Payroll payment registered"
        );
        Ok(id)
    }

    /// Rows and backend total of the expenses in `period`.
    pub async fn expenses(
        &self,
        period: &DateRange,
        categoria: Option<ExpenseCategory>,
    ) -> ClientResult<(Vec<ExpenseRow>, Money)> {
        let filtro = ExpenseFilter::new(period, categoria);
        let total_input = LedgerTotalInput::from(&filtro);
        let list_args = Filtro { filtro: &filtro };
        let total_args = Input::new(&total_input);
        let (rows, total) = tokio::join!(
            self.client.call::<_, Vec<ExpenseRow>>("gasto_listar_por_periodo", &list_args),
            self.client.call::<_, TotalReply>("gasto_total_por_periodo", &total_args),
        );
        Ok((rows?, total?.total))
    }

    /// Rows and backend total of the payroll payments in `period`.
    pub async fn payroll(
        &self,
        period: &DateRange,
        id_usuario_destino: Option<UserId>,
    ) -> ClientResult<(Vec<PayrollRow>, Money)> {
        let filtro = PayrollFilter::new(period, id_usuario_destino);
        let total_input = LedgerTotalInput::from(&filtro);
        let list_args = Filtro { filtro: &filtro };
        let total_args = Input::new(&total_input);
        let (rows, total) = tokio::join!(
            self.client.call::<_, Vec<PayrollRow>>("sueldo_listar_por_periodo", &list_args),
            self.client.call::<_, TotalReply>("sueldo_total_por_periodo", &total_args),
        );
        Ok((rows?, total?.total))
    }
}
