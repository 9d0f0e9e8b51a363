//! # Terminal Commands Module
//!
//! Every line the operator types is one command. The table below names
//! each command, the screen it belongs to, and the group that runs it.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (Shell, table, argument parsing)
//! ├── session.rs  ◄─── login, logout, registrar, quien, ir
//! ├── caja.rs     ◄─── caja, abrir, cerrar, resumen
//! ├── sale.rs     ◄─── buscar, agregar, cantidad, quitar, cobrar, ...
//! ├── promo.rs    ◄─── promos, aplicar, combo-*
//! ├── stock.rs    ◄─── stock, alta, ajustar, merma, compra, historia
//! ├── reports.rs  ◄─── inicio, pnl, rentabilidad, ventas, dia
//! └── ledger.rs   ◄─── gastos, gasto, sueldos, sueldo
//! ```
//!
//! ## How a Line Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  "agregar 12 3"                                                         │
//! │         │ tokenize (double quotes group words)                          │
//! │         ▼                                                               │
//! │  COMMANDS lookup ──► unknown? ──► [aviso] Comando desconocido           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Scope check: Screen(/ventas)                                           │
//! │    NavState::authorize ──► not allowed? ──► [error] Sin permiso         │
//! │    NavState::set(/ventas), refresh caja on entry                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  sale::run(shell, "agregar", args)                                      │
//! │    Result<Reply, ApiError>                                              │
//! │         │                                                               │
//! │         ├── Ok(Reply::Text) ──► printed                                 │
//! │         └── Err(ApiError)   ──► toast via Notifier                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod caja;
pub mod ledger;
pub mod promo;
pub mod reports;
pub mod sale;
pub mod session;
pub mod stock;

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime};
use huevo_client::{Notice, Notifier, PosClient, Prompter};
use huevo_core::session::{landing_route, AdminSection, Route};
use huevo_core::validation::{parse_date, parse_int, parse_money};
use huevo_core::{Money, ProductId, StockItem, StockListQuery, ValidationError};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::render;
use crate::state::{NavState, Workspace};

/// Products fetched when a command names one that is not cached.
const CATALOG_LIMIT: u32 = 1000;

pub type CommandResult = Result<Reply, ApiError>;

/// What the read loop does after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Nothing,
    Quit,
}

/// Source of "now" for confirmations and default report ranges.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    System,
    Fixed(NaiveDateTime),
}

impl Clock {
    pub fn now(&self) -> NaiveDateTime {
        match self {
            Clock::System => Local::now().naive_local(),
            Clock::Fixed(at) => *at,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

// =============================================================================
// Command Table
// =============================================================================

/// Where a command may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Anyone, logged in or not.
    Public,
    /// Any logged-in user; the screen does not change.
    Authenticated,
    /// Any admin screen; the screen does not change.
    AdminAny,
    /// Moves the shell to this screen first.
    Screen(Route),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Shell,
    Session,
    Caja,
    Sale,
    Promo,
    Stock,
    Reports,
    Ledger,
}

#[derive(Debug, Clone, Copy)]
pub struct CommandDef {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
    pub scope: Scope,
    pub group: Group,
}

const fn cmd(
    name: &'static str,
    usage: &'static str,
    summary: &'static str,
    scope: Scope,
    group: Group,
) -> CommandDef {
    CommandDef {
        name,
        usage,
        summary,
        scope,
        group,
    }
}

const VENTAS: Scope = Scope::Screen(Route::Ventas);
const fn admin(section: AdminSection) -> Scope {
    Scope::Screen(Route::Admin(section))
}

pub const COMMANDS: &[CommandDef] = &[
    cmd("ayuda", "ayuda [comando]", "Lista los comandos de la pantalla", Scope::Public, Group::Shell),
    cmd("salir", "salir", "Cierra la terminal", Scope::Public, Group::Shell),
    // Session
    cmd("login", "login <usuario> <contraseña>", "Inicia sesión", Scope::Public, Group::Session),
    cmd("logout", "logout", "Cierra la sesión (con la caja cerrada)", Scope::Authenticated, Group::Session),
    cmd(
        "registrar",
        "registrar <usuario> <contraseña> <confirmación> <nombre…>",
        "Crea una cuenta de operador",
        Scope::Screen(Route::Registrar),
        Group::Session,
    ),
    cmd("quien", "quien", "Muestra la sesión actual", Scope::Public, Group::Session),
    cmd("ir", "ir <ruta>", "Navega a /ventas, /admin, /admin/stock, …", Scope::Public, Group::Session),
    // Caja
    cmd("caja", "caja", "Estado de la caja", VENTAS, Group::Caja),
    cmd("abrir", "abrir", "Abre la caja", VENTAS, Group::Caja),
    cmd("cerrar", "cerrar", "Cierra la caja", VENTAS, Group::Caja),
    cmd("resumen", "resumen", "Resumen diario de cajas", VENTAS, Group::Caja),
    // Sale
    cmd("buscar", "buscar [texto…]", "Busca productos activos", VENTAS, Group::Sale),
    cmd("agregar", "agregar <id_producto> [cantidad]", "Agrega un producto a la venta", VENTAS, Group::Sale),
    cmd("cantidad", "cantidad <id_item> <cantidad>", "Cambia la cantidad de una línea", VENTAS, Group::Sale),
    cmd("quitar", "quitar <id_item>", "Quita una línea", VENTAS, Group::Sale),
    cmd("carrito", "carrito", "Muestra (y recarga) el carrito", VENTAS, Group::Sale),
    cmd(
        "cobrar",
        "cobrar <medio[:ref]> [monto] [<medio[:ref]> <monto>]",
        "Cobra la venta (hasta dos medios)",
        VENTAS,
        Group::Sale,
    ),
    cmd("nueva", "nueva", "Deja lista la pantalla para otra venta", VENTAS, Group::Sale),
    cmd("cancelar", "cancelar", "Cancela la venta en curso", VENTAS, Group::Sale),
    cmd("historial", "historial", "Ventas de hoy", VENTAS, Group::Sale),
    // Promotions on the sale screen
    cmd("promos", "promos", "Promos activas", VENTAS, Group::Promo),
    cmd("promo", "promo <id_combo>", "Detalle de una promo", VENTAS, Group::Promo),
    cmd("aplicar", "aplicar <id_combo> [precio]", "Aplica una promo a la venta", VENTAS, Group::Promo),
    // Promotions admin
    cmd("combos", "combos", "Todas las promos", admin(AdminSection::Promociones), Group::Promo),
    cmd(
        "combo-item",
        "combo-item <id_producto> [cantidad]",
        "Suma o quita un producto de la promo nueva",
        admin(AdminSection::Promociones),
        Group::Promo,
    ),
    cmd("combo-ver", "combo-ver", "Muestra la promo en armado", admin(AdminSection::Promociones), Group::Promo),
    cmd(
        "combo-crear",
        "combo-crear <precio_pack> <nombre…>",
        "Guarda la promo en armado",
        admin(AdminSection::Promociones),
        Group::Promo,
    ),
    cmd(
        "combo-borrar",
        "combo-borrar <id_combo>",
        "Desactiva una promo",
        admin(AdminSection::Promociones),
        Group::Promo,
    ),
    // Stock
    cmd("stock", "stock [texto…]", "Productos activos", admin(AdminSection::Stock), Group::Stock),
    cmd("stock-todos", "stock-todos [texto…]", "Productos activos e inactivos", admin(AdminSection::Stock), Group::Stock),
    cmd("mas", "mas", "Página siguiente del listado", admin(AdminSection::Stock), Group::Stock),
    cmd(
        "alta",
        "alta <código> <precio_venta> <costo> <stock_inicial> <unitario|cajon> <nombre…>",
        "Crea un producto",
        admin(AdminSection::Stock),
        Group::Stock,
    ),
    cmd("ajustar", "ajustar <id> <delta> [nota…]", "Suma o resta stock", admin(AdminSection::Stock), Group::Stock),
    cmd("fijar", "fijar <id> <cantidad> [nota…]", "Fija el stock", admin(AdminSection::Stock), Group::Stock),
    cmd("precio", "precio <id> <precio_venta>", "Cambia el precio de venta", admin(AdminSection::Stock), Group::Stock),
    cmd("costo", "costo <id> <costo>", "Cambia el costo", admin(AdminSection::Stock), Group::Stock),
    cmd(
        "actualizar",
        "actualizar <id> <delta|fijar> <cantidad> <precio_venta> <costo> [nota…]",
        "Cantidad y precios en un paso",
        admin(AdminSection::Stock),
        Group::Stock,
    ),
    cmd("activar", "activar <id>", "Reactiva un producto", admin(AdminSection::Stock), Group::Stock),
    cmd("desactivar", "desactivar <id>", "Desactiva un producto", admin(AdminSection::Stock), Group::Stock),
    cmd(
        "merma",
        "merma <id> <cantidad> <merma|vencimiento|rotura|robo> [observación…]",
        "Registra una merma",
        admin(AdminSection::Stock),
        Group::Stock,
    ),
    cmd(
        "reposicion-modo",
        "reposicion-modo <id> <unitario|cajon> [factor]",
        "Unidad de reposición del producto",
        admin(AdminSection::Stock),
        Group::Stock,
    ),
    cmd("historia", "historia <id>", "Movimientos y precios del producto", admin(AdminSection::Stock), Group::Stock),
    cmd(
        "compra",
        "compra <id> <cantidad> <costo_unitario> [mantener] [referencia…]",
        "Compra por unidad",
        admin(AdminSection::Compras),
        Group::Stock,
    ),
    cmd(
        "compra-cajon",
        "compra-cajon <id> <MAPLE|CAJON> <cantidad> <costo_total>",
        "Compra por maple o cajón",
        admin(AdminSection::Compras),
        Group::Stock,
    ),
    // Reports
    cmd("inicio", "inicio", "Resumen del día para el admin", admin(AdminSection::Home), Group::Reports),
    cmd(
        "periodo",
        "periodo <hoy|esta_semana|este_mes|todo> | periodo <desde> <hasta>",
        "Rango de los reportes",
        Scope::AdminAny,
        Group::Reports,
    ),
    cmd("agrupar", "agrupar <dia|semana|mes|total>", "Agrupación del estado de resultados", Scope::AdminAny, Group::Reports),
    cmd("pnl", "pnl [id_usuario]", "Estado de resultados", admin(AdminSection::Pnl), Group::Reports),
    cmd("rentabilidad", "rentabilidad", "Rentabilidad por producto", admin(AdminSection::Rentabilidad), Group::Reports),
    cmd(
        "negocio",
        "negocio [desde hasta]",
        "Rentabilidad del negocio (mes actual)",
        admin(AdminSection::RentabilidadNegocio),
        Group::Reports,
    ),
    cmd("stock-reporte", "stock-reporte [todos]", "Inventario valorizado", admin(AdminSection::StockReporte), Group::Reports),
    cmd("reposicion", "reposicion", "Vendido en el período, en unidad de reposición", admin(AdminSection::Reposicion), Group::Reports),
    cmd("dia", "dia [fecha] [id_usuario]", "Ventas y cajas de un día", admin(AdminSection::Historial), Group::Reports),
    cmd(
        "ventas",
        "ventas [desde hasta] [usuario=<id>] [estado=<estado>] [medio=<medio>]",
        "Listado de ventas",
        admin(AdminSection::Historial),
        Group::Reports,
    ),
    cmd("ventas-mas", "ventas-mas", "Página siguiente de ventas", admin(AdminSection::Historial), Group::Reports),
    cmd("venta", "venta <id_venta>", "Detalle de una venta", admin(AdminSection::Historial), Group::Reports),
    cmd("operadores", "operadores", "Usuarios operadores", admin(AdminSection::Historial), Group::Reports),
    // Ledger
    cmd("gastos", "gastos [categoría]", "Gastos del período", admin(AdminSection::Gastos), Group::Ledger),
    cmd(
        "gasto",
        "gasto <monto> <Alquiler|Servicios|Impuestos|Otros> <descripción…>",
        "Registra un gasto",
        admin(AdminSection::Gastos),
        Group::Ledger,
    ),
    cmd("sueldos", "sueldos [id_usuario]", "Sueldos pagados en el período", admin(AdminSection::Gastos), Group::Ledger),
    cmd(
        "sueldo",
        "sueldo <id_usuario> <monto> <descripción…>",
        "Registra un pago de sueldo",
        admin(AdminSection::Gastos),
        Group::Ledger,
    ),
    cmd(
        "periodo-gastos",
        "periodo-gastos <desde> <hasta>",
        "Rango de gastos y sueldos",
        admin(AdminSection::Gastos),
        Group::Ledger,
    ),
    cmd("empleados", "empleados", "Empleados para sueldos", admin(AdminSection::Gastos), Group::Ledger),
];

pub fn find_command(name: &str) -> Option<&'static CommandDef> {
    COMMANDS.iter().find(|def| def.name == name)
}

// =============================================================================
// Arguments
// =============================================================================

/// Splits a line on whitespace. Double quotes keep words together.
pub fn tokenize(line: &str) -> Result<Vec<String>, ApiError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut pending = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                pending = true;
            }
            c if c.is_whitespace() && !quoted => {
                if pending {
                    tokens.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if quoted {
        return Err(ApiError::usage("Comillas sin cerrar."));
    }
    if pending {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Positional arguments of one command, consumed left to right.
#[derive(Debug, Clone, Default)]
pub struct Args {
    tokens: VecDeque<String>,
}

fn required(field: &str) -> ApiError {
    ValidationError::Required {
        field: field.to_string(),
    }
    .into()
}

impl Args {
    pub fn new(tokens: Vec<String>) -> Self {
        Args {
            tokens: tokens.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn peek(&self) -> Option<&str> {
        self.tokens.front().map(String::as_str)
    }

    pub fn opt(&mut self) -> Option<String> {
        self.tokens.pop_front()
    }

    pub fn text(&mut self, field: &str) -> Result<String, ApiError> {
        self.opt().ok_or_else(|| required(field))
    }

    pub fn int(&mut self, field: &str) -> Result<i64, ApiError> {
        Ok(parse_int(field, &self.text(field)?)?)
    }

    pub fn opt_int(&mut self, field: &str) -> Result<Option<i64>, ApiError> {
        self.opt().map(|raw| parse_int(field, &raw)).transpose().map_err(Into::into)
    }

    pub fn money(&mut self, field: &str) -> Result<Money, ApiError> {
        Ok(parse_money(field, &self.text(field)?)?)
    }

    pub fn opt_money(&mut self, field: &str) -> Result<Option<Money>, ApiError> {
        self.opt().map(|raw| parse_money(field, &raw)).transpose().map_err(Into::into)
    }

    pub fn date(&mut self, field: &str) -> Result<NaiveDate, ApiError> {
        Ok(parse_date(field, &self.text(field)?)?)
    }

    pub fn parse<T>(&mut self, field: &str) -> Result<T, ApiError>
    where
        T: FromStr<Err = ValidationError>,
    {
        Ok(self.text(field)?.parse::<T>()?)
    }

    pub fn opt_parse<T>(&mut self) -> Result<Option<T>, ApiError>
    where
        T: FromStr<Err = ValidationError>,
    {
        Ok(self.opt().map(|raw| raw.parse::<T>()).transpose()?)
    }

    /// Takes the next token only if it equals `flag`.
    pub fn flag(&mut self, flag: &str) -> bool {
        if self.tokens.front().is_some_and(|t| t.eq_ignore_ascii_case(flag)) {
            self.tokens.pop_front();
            true
        } else {
            false
        }
    }

    /// Removes `key=value` options anywhere in the list.
    pub fn options(&mut self) -> Vec<(String, String)> {
        let mut options = Vec::new();
        self.tokens.retain(|token| match token.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                options.push((key.to_lowercase(), value.to_string()));
                false
            }
            _ => true,
        });
        options
    }

    /// Remaining tokens joined with spaces, if any.
    pub fn rest(&mut self) -> Option<String> {
        if self.tokens.is_empty() {
            return None;
        }
        let joined = self.tokens.drain(..).collect::<Vec<_>>().join(" ");
        Some(joined)
    }

    pub fn rest_required(&mut self, field: &str) -> Result<String, ApiError> {
        self.rest()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| required(field))
    }
}

// =============================================================================
// Shell
// =============================================================================

/// One operator session at the terminal.
pub struct Shell {
    pos: PosClient,
    nav: NavState,
    workspace: Workspace,
    prompter: Arc<dyn Prompter>,
    notifier: Arc<dyn Notifier>,
    clock: Clock,
}

impl Shell {
    pub fn new(
        pos: PosClient,
        prompter: Arc<dyn Prompter>,
        notifier: Arc<dyn Notifier>,
        clock: Clock,
    ) -> Self {
        let workspace = Workspace::new(clock.today());
        Shell {
            pos,
            nav: NavState::new(),
            workspace,
            prompter,
            notifier,
            clock,
        }
    }

    pub fn pos(&self) -> &PosClient {
        &self.pos
    }

    pub fn nav(&self) -> &NavState {
        &self.nav
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspace
    }

    pub fn prompter(&self) -> &dyn Prompter {
        self.prompter.as_ref()
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    /// Resolves the session and lands on the matching screen.
    pub async fn start(&mut self) -> String {
        let session = self.pos.session().resolve(self.pos.client()).await;
        let target = if session.is_authenticated() {
            landing_route(session.rol)
        } else {
            Route::Login
        };
        let route = self.navigate(target).await;
        let session = self.pos.session().current().await;
        render::welcome(&self.pos.config().store.name, route, &session)
    }

    /// Moves to `target` through the guard and runs the screen's entry work.
    pub async fn navigate(&mut self, target: Route) -> Route {
        let previous = self.nav.current();
        let route = self.nav.go(self.pos.session(), self.pos.client(), target).await;
        if route != previous || route == target {
            self.on_enter(route).await;
        }
        route
    }

    async fn on_enter(&mut self, route: Route) {
        if route == Route::Ventas {
            if let Err(e) = self.pos.caja().refresh().await {
                warn!(error = %e, "Caja status unavailable on entering sales");
                self.notify(Notice::warning(format!(
                    "No se pudo consultar la caja: {}",
                    e.user_message()
                )));
            }
        }
    }

    /// Runs one line. Errors become toasts.
    pub async fn execute(&mut self, line: &str) -> Reply {
        match self.run_line(line).await {
            Ok(reply) => reply,
            Err(err) => {
                debug!(code = ?err.code, message = %err.message, "Command failed");
                self.notify(err.notice());
                Reply::Nothing
            }
        }
    }

    async fn run_line(&mut self, line: &str) -> CommandResult {
        let mut tokens = tokenize(line)?;
        if tokens.is_empty() {
            return Ok(Reply::Nothing);
        }
        let name = tokens.remove(0).to_lowercase();
        let def = find_command(&name).ok_or_else(|| {
            ApiError::usage(format!("Comando desconocido: {name}. Probá `ayuda`."))
        })?;

        self.enter(def.scope).await?;
        debug!(command = def.name, args = tokens.len(), "Running command");

        let mut args = Args::new(tokens);
        match def.group {
            Group::Shell => self.run_shell(def.name, &mut args),
            Group::Session => session::run(self, def.name, &mut args).await,
            Group::Caja => caja::run(self, def.name, &mut args).await,
            Group::Sale => sale::run(self, def.name, &mut args).await,
            Group::Promo => promo::run(self, def.name, &mut args).await,
            Group::Stock => stock::run(self, def.name, &mut args).await,
            Group::Reports => reports::run(self, def.name, &mut args).await,
            Group::Ledger => ledger::run(self, def.name, &mut args).await,
        }
    }

    async fn enter(&mut self, scope: Scope) -> Result<(), ApiError> {
        let session = self.pos.session();
        let client = self.pos.client();
        match scope {
            Scope::Public => Ok(()),
            Scope::Authenticated => {
                if session.resolve(client).await.is_authenticated() {
                    Ok(())
                } else {
                    Err(ApiError::unauthorized("Iniciá sesión para continuar."))
                }
            }
            Scope::AdminAny => {
                self.nav
                    .authorize(session, client, Route::Admin(AdminSection::Home))
                    .await
            }
            Scope::Screen(route) => {
                self.nav.authorize(session, client, route).await?;
                if self.nav.current() != route {
                    debug!(from = %self.nav.current(), to = %route, "Screen changed");
                    self.nav.set(route);
                    self.on_enter(route).await;
                }
                Ok(())
            }
        }
    }

    fn run_shell(&self, name: &str, args: &mut Args) -> CommandResult {
        match name {
            "salir" => Ok(Reply::Quit),
            "ayuda" => match args.opt() {
                Some(topic) => {
                    let def = find_command(&topic.to_lowercase())
                        .ok_or_else(|| ApiError::usage(format!("Comando desconocido: {topic}")))?;
                    Ok(Reply::Text(format!("{}\n  {}", def.usage, def.summary)))
                }
                None => Ok(Reply::Text(self.help())),
            },
            other => Err(unknown(other)),
        }
    }

    /// Commands usable from the current screen, then the rest by screen.
    fn help(&self) -> String {
        let current = self.nav.current();
        let mut out = String::new();
        let _ = writeln!(out, "Pantalla {current}");
        for def in COMMANDS.iter().filter(|s| scope_matches(s.scope, current)) {
            let _ = writeln!(out, "  {:<28}{}", def.name, def.summary);
        }
        let others: Vec<&str> = COMMANDS
            .iter()
            .filter(|s| !scope_matches(s.scope, current))
            .map(|s| s.name)
            .collect();
        if !others.is_empty() {
            let _ = write!(out, "Otras pantallas: {}", others.join(", "));
        }
        out.trim_end().to_string()
    }

    // =========================================================================
    // Helpers shared by command groups
    // =========================================================================

    /// A product by id: cached, or looked up in the full catalog.
    pub async fn product(&mut self, id_producto: ProductId) -> Result<StockItem, ApiError> {
        if let Some(item) = self.workspace.item(id_producto) {
            return Ok(item.clone());
        }
        let all = self
            .pos
            .stock()
            .list(&StockListQuery {
                q: None,
                solo_activos: false,
                limit: CATALOG_LIMIT,
                offset: 0,
            })
            .await?;
        self.workspace.remember(&all);
        self.workspace
            .item(id_producto)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Producto", id_producto))
    }

    /// The logged-in user's id.
    pub async fn user_id(&self) -> Result<i64, ApiError> {
        self.pos
            .session()
            .current()
            .await
            .usuario_id
            .ok_or_else(|| ApiError::unauthorized("Iniciá sesión para continuar."))
    }
}

fn scope_matches(scope: Scope, current: Route) -> bool {
    match scope {
        Scope::Public | Scope::Authenticated => true,
        Scope::AdminAny => matches!(current, Route::Admin(_)),
        Scope::Screen(route) => route == current,
    }
}

/// Error for a name the group does not handle.
pub(crate) fn unknown(name: &str) -> ApiError {
    ApiError::usage(format!("Comando desconocido: {name}"))
}

/// Plain text reply.
pub(crate) fn text(body: impl Into<String>) -> CommandResult {
    Ok(Reply::Text(body.into()))
}
