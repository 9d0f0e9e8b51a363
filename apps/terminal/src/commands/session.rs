//! # Session Commands
//!
//! Login, logout, registration and navigation.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   "/" ──login──► session_info ──► admin?  ──yes──► "/admin"             │
//! │    ▲                                 │                                  │
//! │    │                                 └──no───► "/ventas"                │
//! │    │                                                                    │
//! │    └──logout◄── caja closed? ──no──► [aviso] Cerrá la caja…             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use huevo_client::Notice;
use huevo_core::session::{RegisterForm, Route};
use tracing::info;

use super::{text, unknown, Args, CommandResult, Shell};
use crate::error::ApiError;
use crate::render;
use crate::state::Workspace;

pub async fn run(shell: &mut Shell, name: &str, args: &mut Args) -> CommandResult {
    match name {
        "login" => login(shell, args).await,
        "logout" => logout(shell).await,
        "registrar" => register(shell, args).await,
        "quien" => whoami(shell).await,
        "ir" => go(shell, args).await,
        other => Err(unknown(other)),
    }
}

/// Logs in and moves to the landing screen.
///
/// ## User Workflow
/// ```text
/// /> login ana 1234
/// [ok] Hola, sesión iniciada.
/// Pantalla /ventas · ● Caja abierta
/// ```
async fn login(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let usuario = args.opt().unwrap_or_default();
    let password = args.opt().unwrap_or_default();

    let landing = shell.pos().auth().login(&usuario, &password).await?;
    let route = shell.navigate(landing).await;
    shell.notify(Notice::success("Hola, sesión iniciada."));

    let mut body = format!("Pantalla {route}");
    if route == Route::Ventas {
        let caja = shell.pos().caja().state().await;
        body.push_str(&format!(" · {}", render::caja_status(caja)));
    }
    text(body)
}

async fn logout(shell: &mut Shell) -> CommandResult {
    shell.pos().auth().logout(shell.pos().caja()).await?;
    *shell.workspace_mut() = Workspace::new(shell.clock().today());
    let route = shell.navigate(Route::Login).await;
    shell.notify(Notice::success("Sesión cerrada."));
    text(format!("Pantalla {route}"))
}

/// `registrar <usuario> <contraseña> <confirmación> <nombre…>`
async fn register(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let form = RegisterForm {
        nombre_usuario: args.opt().unwrap_or_default(),
        password: args.opt().unwrap_or_default(),
        confirmacion: args.opt().unwrap_or_default(),
        nombre: args.rest().unwrap_or_default(),
    };
    let id = shell.pos().auth().register(&form).await?;
    info!(id_usuario = id, "Operator account created from terminal");
    shell.notify(Notice::success(format!("Usuario #{id} creado.")));
    text("Ya podés iniciar sesión con `login`.")
}

async fn whoami(shell: &mut Shell) -> CommandResult {
    let session = shell.pos().session().resolve(shell.pos().client()).await;
    text(render::whoami(&session, shell.nav().current()))
}

/// `ir <ruta>`: navigates the way a link would, following guard redirects.
async fn go(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let path = args.text("Ruta")?;
    let target = Route::parse(&path)
        .ok_or_else(|| ApiError::usage(format!("Ruta desconocida: {path}")))?;

    let route = shell.navigate(target).await;
    if route != target {
        shell.notify(Notice::warning(format!("Sin permiso para {target}.")));
    }
    text(format!("Pantalla {route}: {}", screen_title(route)))
}

fn screen_title(route: Route) -> &'static str {
    match route {
        Route::Login => "Inicio de sesión",
        Route::Registrar => "Registro de usuario",
        Route::Ventas => "Ventas",
        Route::Admin(section) => section.title(),
    }
}
