//! # Auth Service
//!
//! Login, logout, operator registration and the user pickers.
//!
//! ## User Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            Login                                        │
//! │                                                                         │
//! │  usuario + contraseña ── blank? ──► "Usuario y contraseña son …"        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  login {input} ── false ──► "Credenciales incorrectas."                 │
//! │        │ true                                                           │
//! │        ▼                                                                │
//! │  session_info ── no id or no role ──► cache cleared, InvalidSession     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  session persisted ──► /admin (admin) │ /ventas (everyone else)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logout is refused while the caja is open. Once past that check the local
//! session is cleared whether or not `auth_logout` succeeds.

use huevo_core::session::{landing_route, plan_login, plan_register, RegisterForm, Route};
use huevo_core::{CoreError, UserId, UserOption};
use tracing::{info, warn};

use crate::caja::CajaService;
use crate::error::ClientResult;
use crate::invoke::{BusyFlag, CommandClient, Input, NoArgs};
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AuthService {
    client: CommandClient,
    session: SessionStore,
    busy: BusyFlag,
}

impl AuthService {
    pub fn new(client: CommandClient, session: SessionStore) -> Self {
        AuthService {
            client,
            session,
            busy: BusyFlag::new(),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Logs in and returns where the user lands.
    pub async fn login(&self, nombre_usuario: &str, password: &str) -> ClientResult<Route> {
        let input = plan_login(nombre_usuario, password)?;
        let _busy = self.busy.acquire("Inicio de sesión")?;

        let ok: bool = self.client.call("login", &Input::new(&input)).await?;
        if !ok {
            warn!(usuario = %input.nombre_usuario, "Login rejected");
            return Err(CoreError::InvalidCredentials.into());
        }

        let session = self.session.refresh(&self.client).await;
        let (Some(id), Some(rol)) = (session.usuario_id, session.rol) else {
            self.session.clear().await?;
            return Err(CoreError::InvalidSession.into());
        };

        info!(usuario_id = id, rol = %rol, "Logged in");
        Ok(landing_route(Some(rol)))
    }

    /// Logs out. The caller must have the caja closed.
    pub async fn logout(&self, caja: &CajaService) -> ClientResult<()> {
        let state = match caja.refresh().await {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Caja status unavailable, using last known");
                caja.state().await
            }
        };
        state.ensure_can_logout()?;

        let usuario_id = self.session.current().await.usuario_id;
        if let Err(e) = self.client.call_unit("auth_logout", &NoArgs {}).await {
            warn!(error = %e, "auth_logout failed, clearing local session anyway");
        }
        self.session.clear().await?;

        info!(usuario_id = ?usuario_id, "Logged out");
        Ok(())
    }

    /// Creates an operator account and returns its id.
    pub async fn register(&self, form: &RegisterForm) -> ClientResult<UserId> {
        let input = plan_register(form)?;
        let _busy = self.busy.acquire("Registro de usuario")?;
        let id: UserId = self.client.call("usuario_crear", &Input::new(&input)).await?;
        info!(id_usuario = id, usuario = %input.nombre_usuario, "User registered");
        Ok(id)
    }

    /// Employees for the payroll selector.
    pub async fn employee_options(&self) -> ClientResult<Vec<UserOption>> {
        self.client.call("usuario_listar_opciones", &NoArgs {}).await
    }

    /// Operators for the sales-history user filter.
    pub async fn operators(&self) -> ClientResult<Vec<UserOption>> {
        self.client.call("usuarios_listar_operadores", &NoArgs {}).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::fake::FakeBackend;
    use crate::session::SessionEvent;
    use huevo_core::session::{AdminSection, Resolution, Role, Session};

    fn service(fake: &FakeBackend) -> AuthService {
        AuthService::new(fake.client(), SessionStore::in_memory())
    }

    #[tokio::test]
    async fn test_blank_fields_send_nothing() {
        let fake = FakeBackend::new();
        let auth = service(&fake);

        let err = auth.login("  ", "x").await.unwrap_err();
        assert_eq!(err.user_message(), "Usuario y contraseña son obligatorios.");
        assert_eq!(fake.call_count("login"), 0);
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let fake = FakeBackend::new();
        fake.add_user("ana", "1234", "operador");
        let auth = service(&fake);

        let err = auth.login("ana", "nope").await.unwrap_err();
        assert!(matches!(err, ClientError::Core(CoreError::InvalidCredentials)));
        assert_eq!(fake.call_count("session_info"), 0);
    }

    #[tokio::test]
    async fn test_login_lands_by_role() {
        let fake = FakeBackend::new();
        fake.add_user("ana", "1234", "operador");
        fake.add_user("jefe", "admin", " ADMIN ");
        let auth = service(&fake);

        assert_eq!(auth.login(" ana ", "1234").await.unwrap(), Route::Ventas);
        assert_eq!(auth.login("jefe", "admin").await.unwrap(), Route::Admin(AdminSection::Home));
        assert_eq!(auth.session().current().await.rol, Some(Role::Admin));
    }

    #[tokio::test]
    async fn test_login_without_role_is_invalid_session() {
        let fake = FakeBackend::new();
        fake.add_user("raro", "1234", "supervisor");
        let auth = service(&fake);

        let err = auth.login("raro", "1234").await.unwrap_err();
        assert!(matches!(err, ClientError::Core(CoreError::InvalidSession)));
        assert_eq!(auth.session().get().await, Resolution::Resolved(Session::empty()));
    }

    #[tokio::test]
    async fn test_logout_blocked_while_caja_open() {
        let fake = FakeBackend::new();
        fake.add_user("ana", "1234", "operador");
        let auth = service(&fake);
        auth.login("ana", "1234").await.unwrap();
        fake.open_caja();

        let caja = CajaService::new(fake.client());
        let err = auth.logout(&caja).await.unwrap_err();
        assert!(matches!(err, ClientError::Core(CoreError::CajaOpen)));
        assert_eq!(fake.call_count("auth_logout"), 0);
        assert!(auth.session().current().await.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_backend_fails() {
        let fake = FakeBackend::new();
        fake.add_user("ana", "1234", "operador");
        let auth = service(&fake);
        auth.login("ana", "1234").await.unwrap();
        let mut events = auth.session().subscribe();

        fake.fail_command("auth_logout", "db locked");
        auth.logout(&CajaService::new(fake.client())).await.unwrap();
        assert!(!auth.session().current().await.is_authenticated());
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Cleared);
    }

    #[tokio::test]
    async fn test_register_validates_then_creates() {
        let fake = FakeBackend::new();
        let auth = service(&fake);

        let mut form = RegisterForm {
            nombre: "Carla".into(),
            nombre_usuario: "carla".into(),
            password: "abcd".into(),
            confirmacion: "abce".into(),
        };
        let err = auth.register(&form).await.unwrap_err();
        assert_eq!(err.user_message(), "Las contraseñas no coinciden.");
        assert_eq!(fake.call_count("usuario_crear"), 0);

        form.confirmacion = "abcd".into();
        let id = auth.register(&form).await.unwrap();
        assert!(id > 0);
        assert_eq!(auth.employee_options().await.unwrap().len(), 1);

        let err = auth.register(&form).await.unwrap_err();
        assert!(err.is_backend());
    }
}
