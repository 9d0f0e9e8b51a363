//! Current screen and the route guard.

use huevo_client::{CommandClient, SessionStore};
use huevo_core::session::{guard, Resolution, Route, RouteDecision};
use tracing::debug;

use crate::error::ApiError;

/// Redirects followed before giving up on a navigation.
const MAX_REDIRECTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavState {
    current: Route,
}

impl Default for NavState {
    fn default() -> Self {
        NavState {
            current: Route::Login,
        }
    }
}

impl NavState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Route {
        self.current
    }

    pub fn set(&mut self, route: Route) {
        self.current = route;
    }

    /// Navigates to `target`, following guard redirects. Returns the route
    /// actually shown.
    pub async fn go(&mut self, session: &SessionStore, client: &CommandClient, target: Route) -> Route {
        session.resolve(client).await;
        let resolution = session.get().await;

        let mut route = target;
        for _ in 0..MAX_REDIRECTS {
            match guard(&resolution, route) {
                RouteDecision::Render => break,
                RouteDecision::Redirect(next) => {
                    debug!(from = %route, to = %next, "Route redirected");
                    route = next;
                }
                RouteDecision::Pending => return self.current,
            }
        }
        self.current = route;
        route
    }

    /// Checks that a command of `route` may run, without navigating.
    pub async fn authorize(
        &self,
        session: &SessionStore,
        client: &CommandClient,
        route: Route,
    ) -> Result<(), ApiError> {
        session.resolve(client).await;
        match guard(&session.get().await, route) {
            RouteDecision::Render => Ok(()),
            RouteDecision::Redirect(Route::Login) => {
                Err(ApiError::unauthorized("Iniciá sesión para continuar."))
            }
            RouteDecision::Redirect(_) => Err(ApiError::unauthorized(format!(
                "Sin permiso para {route}."
            ))),
            RouteDecision::Pending => Err(ApiError::unauthorized("Verificando sesión…")),
        }
    }

    /// True when the session store has an answer.
    pub async fn is_resolved(session: &SessionStore) -> bool {
        !matches!(session.get().await, Resolution::Loading)
    }
}
