//! # Ledger Commands
//!
//! Business expenses and payroll payments for `/admin/gastos`. Both lists
//! share one period, month-to-date unless changed with `periodo-gastos`.
//!
//! ```text
//! /admin/gastos> gasto 45000 alquiler Local octubre
//! [ok] Gasto #18 registrado.
//! ── Gastos 2026-10-01 → 2026-10-19 ──────────
//! 2026-10-19 09:30  Alquiler    Local octubre          $ 45.000
//! Total: $ 45.000
//! ```

use huevo_client::Notice;
use huevo_core::ledger::{ExpenseCategory, ExpenseDraft, PayrollDraft};
use huevo_core::report::DateRange;

use super::{text, unknown, Args, CommandResult, Shell};
use crate::render;

pub async fn run(shell: &mut Shell, name: &str, args: &mut Args) -> CommandResult {
    match name {
        "gastos" => expenses(shell, args).await,
        "gasto" => register_expense(shell, args).await,
        "sueldos" => payroll(shell, args).await,
        "sueldo" => register_payroll(shell, args).await,
        "periodo-gastos" => period(shell, args),
        "empleados" => employees(shell).await,
        other => Err(unknown(other)),
    }
}

/// `gastos [categoría]`
async fn expenses(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let categoria: Option<ExpenseCategory> = args.opt_parse()?;
    show_expenses(shell, categoria).await
}

async fn show_expenses(shell: &Shell, categoria: Option<ExpenseCategory>) -> CommandResult {
    let period = shell.workspace().ledger_period;
    let (rows, total) = shell.pos().ledger().expenses(&period, categoria).await?;
    text(render::expenses(&period, &rows, total))
}

/// `gasto <monto> <categoría> <descripción…>`
async fn register_expense(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let monto = args.money("Monto")?;
    let draft = ExpenseDraft {
        categoria: args.opt().unwrap_or_default(),
        descripcion: args.rest().unwrap_or_default(),
        monto,
    };
    let id = shell.pos().ledger().register_expense(&draft).await?;
    shell.notify(Notice::success(format!("Gasto #{id} registrado.")));
    show_expenses(shell, None).await
}

/// `sueldos [id_usuario]`
async fn payroll(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let id_usuario = args.opt_int("Empleado")?;
    show_payroll(shell, id_usuario).await
}

async fn show_payroll(shell: &Shell, id_usuario: Option<i64>) -> CommandResult {
    let period = shell.workspace().ledger_period;
    let (rows, total) = shell.pos().ledger().payroll(&period, id_usuario).await?;
    text(render::payroll(&period, &rows, total))
}

/// `sueldo <id_usuario> <monto> <descripción…>`
async fn register_payroll(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let id_usuario_destino = args.opt_int("Empleado destino")?;
    let monto = args.opt_money("Monto")?.unwrap_or_default();
    let draft = PayrollDraft {
        descripcion: args.rest().unwrap_or_default(),
        monto,
        id_usuario_destino,
    };
    let id = shell.pos().ledger().register_payroll(&draft).await?;
    shell.notify(Notice::success(format!("Sueldo #{id} registrado.")));
    show_payroll(shell, None).await
}

/// `periodo-gastos <desde> <hasta>`
fn period(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let range = DateRange::new(args.date("Desde")?, args.date("Hasta")?)?;
    shell.workspace_mut().ledger_period = range;
    text(format!("Período de gastos: {range}"))
}

async fn employees(shell: &mut Shell) -> CommandResult {
    let users = shell.pos().auth().employee_options().await?;
    text(render::users("Empleados", &users))
}
