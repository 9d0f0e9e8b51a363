//! # Session Module
//!
//! Who is logged in, with which role, and which screens they may open.
//!
//! ## Resolution Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Resolution                                 │
//! │                                                                         │
//! │  Resolution::Loading ──► guard() = Pending (render nothing)            │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  cached keys {usuarioId, rol}  ── both valid? ──► Resolved(session)    │
//! │        │ no                                                             │
//! │        ▼                                                                │
//! │  session_info (backend) ──► parse_session_info() ──► Resolved(session) │
//! │        │ error                                                          │
//! │        ▼                                                                │
//! │  Resolved(Session::empty())  (never stale data)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Route Guard
//! ```text
//!   no usuarioId                      → Redirect(/)
//!   route needs roles, role not in it → Redirect(/ventas)
//!   otherwise                         → Render
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::types::UserId;
use crate::validation::{validate_password, validate_required};
use crate::MIN_PASSWORD_LEN;

// =============================================================================
// Role
// =============================================================================

/// Operator role. Anything the backend sends that is not one of these two
/// normalizes to "no role".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Operador,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Operador => "operador",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalizes a raw role string: trimmed, case-insensitive.
///
/// ## Example
/// ```rust
/// use huevo_core::session::{normalize_role, Role};
///
/// assert_eq!(normalize_role(" ADMIN "), Some(Role::Admin));
/// assert_eq!(normalize_role("Operador"), Some(Role::Operador));
/// assert_eq!(normalize_role("supervisor"), None);
/// ```
pub fn normalize_role(raw: &str) -> Option<Role> {
    match raw.trim().to_lowercase().as_str() {
        "admin" => Some(Role::Admin),
        "operador" => Some(Role::Operador),
        _ => None,
    }
}

// =============================================================================
// Session
// =============================================================================

/// Keys the front end persists locally. All of them are cleared on logout.
pub const SESSION_KEYS: [&str; 4] = ["usuarioId", "rol", "session", "usuario"];

/// Local, non-authoritative copy of the logged-in user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "usuarioId")]
    pub usuario_id: Option<UserId>,
    pub rol: Option<Role>,
}

impl Session {
    /// No user.
    pub const fn empty() -> Self {
        Session {
            usuario_id: None,
            rol: None,
        }
    }

    pub const fn new(usuario_id: UserId, rol: Role) -> Self {
        Session {
            usuario_id: Some(usuario_id),
            rol: Some(rol),
        }
    }

    pub const fn is_authenticated(&self) -> bool {
        self.usuario_id.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.rol == Some(Role::Admin)
    }

    /// Reads the cached session from persisted key/value pairs.
    ///
    /// Only a positive numeric id together with a recognized role counts as
    /// a usable cache entry; anything else means "ask the backend".
    pub fn from_cache(entries: &BTreeMap<String, String>) -> Option<Session> {
        let id = entries
            .get("usuarioId")
            .and_then(|raw| raw.trim().parse::<UserId>().ok())
            .filter(|id| *id > 0)?;
        let rol = entries.get("rol").and_then(|raw| normalize_role(raw))?;
        Some(Session::new(id, rol))
    }

    /// Key/value pairs to persist. Missing fields produce no entry.
    pub fn to_cache(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::with_capacity(2);
        if let Some(id) = self.usuario_id {
            out.push(("usuarioId", id.to_string()));
        }
        if let Some(rol) = self.rol {
            out.push(("rol", rol.as_str().to_string()));
        }
        out
    }
}

/// Parses the `session_info` reply.
///
/// The backend may answer with an object (`usuarioId`/`id` and
/// `rol`/`rol_tipo`), a bare user id, or `null`.
///
/// ## Example
/// ```rust
/// use huevo_core::session::{parse_session_info, Role};
/// use serde_json::json;
///
/// let s = parse_session_info(&json!({"usuarioId": 3, "rol": "Admin"}));
/// assert_eq!(s.usuario_id, Some(3));
/// assert_eq!(s.rol, Some(Role::Admin));
///
/// assert!(!parse_session_info(&json!(null)).is_authenticated());
/// ```
pub fn parse_session_info(info: &Value) -> Session {
    match info {
        Value::Number(n) => Session {
            usuario_id: n.as_i64().filter(|id| *id > 0),
            rol: None,
        },
        Value::Object(map) => {
            let id = map
                .get("usuarioId")
                .filter(|v| !v.is_null())
                .or_else(|| map.get("id"))
                .and_then(value_as_id);
            let rol = map
                .get("rol")
                .filter(|v| !v.is_null())
                .or_else(|| map.get("rol_tipo"))
                .and_then(Value::as_str)
                .and_then(normalize_role);
            Session { usuario_id: id, rol }
        }
        _ => Session::empty(),
    }
}

fn value_as_id(value: &Value) -> Option<UserId> {
    let id = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    id.filter(|id| *id > 0)
}

// =============================================================================
// Login & Registration
// =============================================================================

/// `login` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginInput {
    pub nombre_usuario: String,
    pub password: String,
}

/// Both fields are required. The user name is trimmed, the password is sent
/// as typed.
pub fn plan_login(nombre_usuario: &str, password: &str) -> CoreResult<LoginInput> {
    let nombre_usuario = nombre_usuario.trim();
    if nombre_usuario.is_empty() || password.is_empty() {
        return Err(CoreError::MissingCredentials);
    }
    Ok(LoginInput {
        nombre_usuario: nombre_usuario.to_string(),
        password: password.to_string(),
    })
}

/// Raw registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub nombre: String,
    pub nombre_usuario: String,
    pub password: String,
    pub confirmacion: String,
}

/// `usuario_crear` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterInput {
    pub nombre: String,
    pub nombre_usuario: String,
    pub password: String,
}

pub fn plan_register(form: &RegisterForm) -> CoreResult<RegisterInput> {
    let nombre = validate_required("Nombre", &form.nombre)?;
    let nombre_usuario = validate_required("Usuario", &form.nombre_usuario)?;
    validate_password(&form.password, MIN_PASSWORD_LEN)?;
    if form.password != form.confirmacion {
        return Err(CoreError::PasswordMismatch);
    }
    Ok(RegisterInput {
        nombre,
        nombre_usuario,
        password: form.password.clone(),
    })
}

// =============================================================================
// Routes
// =============================================================================

/// Child screens of the admin area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminSection {
    Home,
    Stock,
    Compras,
    Promociones,
    Gastos,
    Pnl,
    Rentabilidad,
    RentabilidadNegocio,
    StockReporte,
    Reposicion,
    Historial,
}

impl AdminSection {
    pub const ALL: [AdminSection; 11] = [
        AdminSection::Home,
        AdminSection::Stock,
        AdminSection::Compras,
        AdminSection::Promociones,
        AdminSection::Gastos,
        AdminSection::Pnl,
        AdminSection::Rentabilidad,
        AdminSection::RentabilidadNegocio,
        AdminSection::StockReporte,
        AdminSection::Reposicion,
        AdminSection::Historial,
    ];

    /// Path segment under `/admin`. Empty for the admin home.
    pub const fn segment(&self) -> &'static str {
        match self {
            AdminSection::Home => "",
            AdminSection::Stock => "stock",
            AdminSection::Compras => "compras",
            AdminSection::Promociones => "promociones",
            AdminSection::Gastos => "gastos",
            AdminSection::Pnl => "pnl",
            AdminSection::Rentabilidad => "rentabilidad",
            AdminSection::RentabilidadNegocio => "rentabilidad-negocio",
            AdminSection::StockReporte => "stock-reporte",
            AdminSection::Reposicion => "reposicion",
            AdminSection::Historial => "historial",
        }
    }

    pub const fn title(&self) -> &'static str {
        match self {
            AdminSection::Home => "Inicio",
            AdminSection::Stock => "Stock",
            AdminSection::Compras => "Compras",
            AdminSection::Promociones => "Promociones",
            AdminSection::Gastos => "Gastos y sueldos",
            AdminSection::Pnl => "Estado de resultados",
            AdminSection::Rentabilidad => "Rentabilidad por producto",
            AdminSection::RentabilidadNegocio => "Rentabilidad del negocio",
            AdminSection::StockReporte => "Reporte de stock",
            AdminSection::Reposicion => "Reposición",
            AdminSection::Historial => "Historial de ventas",
        }
    }
}

/// Every screen of the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Registrar,
    Ventas,
    Admin(AdminSection),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/".to_string(),
            Route::Registrar => "/registrar".to_string(),
            Route::Ventas => "/ventas".to_string(),
            Route::Admin(AdminSection::Home) => "/admin".to_string(),
            Route::Admin(section) => format!("/admin/{}", section.segment()),
        }
    }

    /// Resolves a path. Unknown admin children fall back to the admin home.
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim().trim_end_matches('/');
        match trimmed {
            "" => Some(Route::Login),
            "/registrar" => Some(Route::Registrar),
            "/ventas" => Some(Route::Ventas),
            "/admin" => Some(Route::Admin(AdminSection::Home)),
            other => {
                let child = other.strip_prefix("/admin/")?;
                Some(Route::Admin(
                    AdminSection::ALL
                        .into_iter()
                        .find(|s| s.segment() == child)
                        .unwrap_or(AdminSection::Home),
                ))
            }
        }
    }

    /// Roles allowed on this route. `None` means any logged-in user (or
    /// anyone at all for the public screens).
    pub const fn required_roles(&self) -> Option<&'static [Role]> {
        match self {
            Route::Login | Route::Registrar | Route::Ventas => None,
            Route::Admin(_) => Some(&[Role::Admin]),
        }
    }

    const fn needs_login(&self) -> bool {
        !matches!(self, Route::Login | Route::Registrar)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Where a user lands right after logging in.
pub fn landing_route(rol: Option<Role>) -> Route {
    match rol {
        Some(Role::Admin) => Route::Admin(AdminSection::Home),
        _ => Route::Ventas,
    }
}

// =============================================================================
// Guard
// =============================================================================

/// State of the session lookup as seen by the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Loading,
    Resolved(Session),
}

/// What the router should do with a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session still resolving: render nothing.
    Pending,
    Render,
    Redirect(Route),
}

/// Decides whether `route` may be shown.
///
/// ## Example
/// ```rust
/// use huevo_core::session::*;
///
/// let operador = Resolution::Resolved(Session::new(5, Role::Operador));
/// assert_eq!(
///     guard(&operador, Route::Admin(AdminSection::Stock)),
///     RouteDecision::Redirect(Route::Ventas)
/// );
/// ```
pub fn guard(resolution: &Resolution, route: Route) -> RouteDecision {
    let session = match resolution {
        Resolution::Loading => return RouteDecision::Pending,
        Resolution::Resolved(session) => session,
    };

    if !route.needs_login() {
        return RouteDecision::Render;
    }

    if !session.is_authenticated() {
        return RouteDecision::Redirect(Route::Login);
    }

    match route.required_roles() {
        Some(roles) if !roles.is_empty() => match session.rol {
            Some(rol) if roles.contains(&rol) => RouteDecision::Render,
            _ => RouteDecision::Redirect(Route::Ventas),
        },
        _ => RouteDecision::Render,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plan_login_requires_both_fields() {
        assert!(matches!(plan_login("  ", "x"), Err(CoreError::MissingCredentials)));
        assert!(matches!(plan_login("caja1", ""), Err(CoreError::MissingCredentials)));
        let input = plan_login(" caja1 ", " secreto").unwrap();
        assert_eq!(input.nombre_usuario, "caja1");
        assert_eq!(input.password, " secreto");
    }

    #[test]
    fn test_plan_register_rules() {
        let mut form = RegisterForm {
            nombre: "Ana".into(),
            nombre_usuario: "ana".into(),
            password: "abc".into(),
            confirmacion: "abc".into(),
        };
        assert!(plan_register(&form).is_err());

        form.password = "abcd".into();
        form.confirmacion = "abce".into();
        assert!(matches!(plan_register(&form), Err(CoreError::PasswordMismatch)));

        form.confirmacion = "abcd".into();
        assert_eq!(plan_register(&form).unwrap().nombre_usuario, "ana");
    }

    #[test]
    fn test_normalize_role_variants() {
        assert_eq!(normalize_role("Admin"), Some(Role::Admin));
        assert_eq!(normalize_role(" ADMIN "), Some(Role::Admin));
        assert_eq!(normalize_role("admin"), Some(Role::Admin));
        assert_eq!(normalize_role("OPERADOR"), Some(Role::Operador));
        assert_eq!(normalize_role("root"), None);
        assert_eq!(normalize_role(""), None);
    }

    #[test]
    fn test_parse_session_info_shapes() {
        let s = parse_session_info(&json!({"id": 9, "rol_tipo": " operador"}));
        assert_eq!(s, Session::new(9, Role::Operador));

        let s = parse_session_info(&json!(4));
        assert_eq!(s.usuario_id, Some(4));
        assert_eq!(s.rol, None);

        let s = parse_session_info(&json!({"usuarioId": 0, "rol": "admin"}));
        assert_eq!(s.usuario_id, None);

        assert_eq!(parse_session_info(&json!("nope")), Session::empty());
    }

    #[test]
    fn test_unknown_role_denied_on_role_routes() {
        let s = parse_session_info(&json!({"usuarioId": 2, "rol": "gerente"}));
        let resolution = Resolution::Resolved(s);

        assert_eq!(
            guard(&resolution, Route::Admin(AdminSection::Home)),
            RouteDecision::Redirect(Route::Ventas)
        );
        assert_eq!(guard(&resolution, Route::Ventas), RouteDecision::Render);
    }

    #[test]
    fn test_guard_pending_and_login_redirect() {
        assert_eq!(
            guard(&Resolution::Loading, Route::Ventas),
            RouteDecision::Pending
        );
        assert_eq!(
            guard(&Resolution::Resolved(Session::empty()), Route::Ventas),
            RouteDecision::Redirect(Route::Login)
        );
        assert_eq!(
            guard(&Resolution::Resolved(Session::empty()), Route::Registrar),
            RouteDecision::Render
        );
    }

    #[test]
    fn test_guard_admin_allowed_everywhere() {
        let admin = Resolution::Resolved(Session::new(1, Role::Admin));
        for section in AdminSection::ALL {
            assert_eq!(guard(&admin, Route::Admin(section)), RouteDecision::Render);
        }
        assert_eq!(guard(&admin, Route::Ventas), RouteDecision::Render);
    }

    #[test]
    fn test_route_paths_round_trip() {
        for section in AdminSection::ALL {
            let route = Route::Admin(section);
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
        assert_eq!(Route::parse("/"), Some(Route::Login));
        assert_eq!(Route::parse("/ventas/"), Some(Route::Ventas));
        assert_eq!(
            Route::parse("/admin/desconocido"),
            Some(Route::Admin(AdminSection::Home))
        );
        assert_eq!(Route::parse("/otra"), None);
    }

    #[test]
    fn test_landing_route() {
        assert_eq!(landing_route(Some(Role::Admin)), Route::Admin(AdminSection::Home));
        assert_eq!(landing_route(Some(Role::Operador)), Route::Ventas);
        assert_eq!(landing_route(None), Route::Ventas);
    }

    #[test]
    fn test_cache_round_trip() {
        let session = Session::new(12, Role::Operador);
        let entries: BTreeMap<String, String> = session
            .to_cache()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(Session::from_cache(&entries), Some(session));

        let mut stale = entries.clone();
        stale.insert("rol".to_string(), "jefe".to_string());
        assert_eq!(Session::from_cache(&stale), None);
    }
}
