//! Route Guard
//!
//! Maps a requested path to the view to render, given whether a session is
//! stored. Presence of a stored identity is the only gate; token expiry is
//! the backend's concern.

use std::fmt;

use crate::session::SessionStore;

/// Views of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Home,
    Profile,
    Appointments,
    Bot,
}

impl Route {
    /// Routes inside the admin area, in menu order
    pub const ADMIN: [Route; 4] = [Route::Home, Route::Profile, Route::Appointments, Route::Bot];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Home => "/admin/home",
            Route::Profile => "/admin/profile",
            Route::Appointments => "/admin/appointments",
            Route::Bot => "/admin/bot",
        }
    }

    pub fn requires_session(&self) -> bool {
        !matches!(self, Route::Login)
    }

    fn from_admin_segment(segment: &str) -> Option<Route> {
        match segment {
            "home" => Some(Route::Home),
            "profile" => Some(Route::Profile),
            "appointments" => Some(Route::Appointments),
            "bot" => Some(Route::Bot),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The requested path is allowed and names this route
    Render(Route),
    /// The path was replaced by this route
    Redirect(Route),
}

impl Navigation {
    /// Route that ends up on screen
    pub fn route(&self) -> Route {
        match self {
            Navigation::Render(route) | Navigation::Redirect(route) => *route,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Navigation::Redirect(_))
    }
}

/// Decides each navigation from the stored session
#[derive(Clone)]
pub struct RouteGuard {
    sessions: SessionStore,
}

impl RouteGuard {
    pub fn new(sessions: SessionStore) -> Self {
        Self { sessions }
    }

    /// Resolve `path` against the current stored session
    pub fn navigate(&self, path: &str) -> Navigation {
        let authenticated = self.sessions.is_authenticated();
        let navigation = resolve(path, authenticated);
        if navigation.is_redirect() {
            tracing::debug!(path, authenticated, to = %navigation.route(), "Navigation redirected");
        }
        navigation
    }
}

/// Pure routing decision
///
/// - `/` always renders the login view.
/// - `/admin/<view>` renders when authenticated, otherwise redirects to login.
/// - Unknown paths redirect to the dashboard when authenticated, login otherwise.
///
/// Matching ignores ASCII case.
pub fn resolve(path: &str, authenticated: bool) -> Navigation {
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let fallback = if authenticated {
        Route::Home
    } else {
        Route::Login
    };

    match segments.as_slice() {
        [] => Navigation::Render(Route::Login),
        ["admin", rest @ ..] => {
            if !authenticated {
                return Navigation::Redirect(Route::Login);
            }
            match rest {
                [segment] => match Route::from_admin_segment(segment) {
                    Some(route) => Navigation::Render(route),
                    None => Navigation::Redirect(Route::Home),
                },
                _ => Navigation::Redirect(Route::Home),
            }
        }
        _ => Navigation::Redirect(fallback),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AuthGrant;
    use crate::session::{Session, SessionContext};

    #[test]
    fn test_root_always_renders_login() {
        assert_eq!(resolve("/", false), Navigation::Render(Route::Login));
        assert_eq!(resolve("/", true), Navigation::Render(Route::Login));
        assert_eq!(resolve("", true), Navigation::Render(Route::Login));
    }

    #[test]
    fn test_unauthenticated_admin_paths_redirect_to_login() {
        for path in [
            "/admin",
            "/admin/",
            "/admin/home",
            "/admin/profile",
            "/admin/appointments",
            "/admin/bot",
            "/admin/unknown/deep",
        ] {
            assert_eq!(
                resolve(path, false),
                Navigation::Redirect(Route::Login),
                "path {path}"
            );
        }
    }

    #[test]
    fn test_authenticated_admin_paths_render() {
        for route in Route::ADMIN {
            assert_eq!(resolve(route.path(), true), Navigation::Render(route));
        }
        assert_eq!(
            resolve("//admin//bot/?tab=1#end", true),
            Navigation::Render(Route::Bot)
        );
    }

    #[test]
    fn test_paths_match_case_insensitively() {
        assert_eq!(resolve("/Admin/Profile", true), Navigation::Render(Route::Profile));
        assert_eq!(resolve("/ADMIN/BOT?Tab=1", true), Navigation::Render(Route::Bot));
        assert_eq!(resolve("/Admin/Home", false), Navigation::Redirect(Route::Login));
    }

    #[test]
    fn test_unknown_paths_collapse() {
        for path in ["/client", "/appointment", "/admin/settings", "/admin/bot/extra", "/x/y"] {
            assert_eq!(resolve(path, false).route(), Route::Login, "path {path}");
            assert_eq!(resolve(path, true).route(), Route::Home, "path {path}");
            assert!(resolve(path, true).is_redirect());
        }
    }

    #[test]
    fn test_guard_reads_stored_session() {
        let ctx = SessionContext::in_memory();
        let guard = RouteGuard::new(ctx.sessions().clone());
        assert_eq!(
            guard.navigate("/admin/profile"),
            Navigation::Redirect(Route::Login)
        );

        ctx.sessions()
            .save(&Session::from_grant(AuthGrant {
                admin: serde_json::from_str(r#"{"name":"A","adminId":"1"}"#).unwrap(),
                token: Some("tok".to_string()),
            }))
            .unwrap();
        assert_eq!(
            guard.navigate("/admin/profile"),
            Navigation::Render(Route::Profile)
        );

        ctx.sessions().clear().unwrap();
        assert_eq!(guard.navigate("/admin/bot"), Navigation::Redirect(Route::Login));
    }
}
