//! Navigation shell
//!
//! Menu shown on every admin view, plus the logout confirmation flow.

use std::fmt;

use crate::router::Route;
use crate::session::{SessionContext, SessionResult};

pub const BRAND: &str = "Appointment Scheduler";
pub const LOGOUT_TITLE: &str = "Confirm Logout";
pub const LOGOUT_QUESTION: &str = "Are you sure you want to logout?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub route: Route,
    pub label: &'static str,
    pub icon: &'static str,
}

pub const MENU: [MenuItem; 4] = [
    MenuItem {
        route: Route::Home,
        label: "Dashboard",
        icon: "🏠",
    },
    MenuItem {
        route: Route::Profile,
        label: "Profile",
        icon: "👤",
    },
    MenuItem {
        route: Route::Appointments,
        label: "Appointments",
        icon: "📅",
    },
    MenuItem {
        route: Route::Bot,
        label: "AI Bot",
        icon: "🤖",
    },
];

pub struct NavShell {
    session: SessionContext,
    current: Route,
    confirming_logout: bool,
}

impl NavShell {
    pub fn new(session: SessionContext, current: Route) -> Self {
        Self {
            session,
            current,
            confirming_logout: false,
        }
    }

    pub fn current(&self) -> Route {
        self.current
    }

    pub fn set_current(&mut self, route: Route) {
        self.current = route;
    }

    pub fn is_active(&self, route: Route) -> bool {
        self.current == route
    }

    /// "Welcome, <name>" when an identity is stored
    pub fn welcome(&self) -> Option<String> {
        self.session
            .sessions()
            .identity()
            .map(|admin| format!("Welcome, {}", admin.display_name()))
    }

    pub fn is_confirming_logout(&self) -> bool {
        self.confirming_logout
    }

    /// Open the confirmation overlay
    pub fn request_logout(&mut self) {
        self.confirming_logout = true;
    }

    /// Dismiss the overlay; nothing else changes
    pub fn cancel_logout(&mut self) {
        self.confirming_logout = false;
    }

    /// Clear the session and return the route to show next
    pub fn confirm_logout(&mut self) -> SessionResult<Route> {
        self.session.sessions().clear()?;
        self.confirming_logout = false;
        self.current = Route::Login;
        tracing::info!("Admin logged out");
        Ok(Route::Login)
    }
}

impl fmt::Display for NavShell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.welcome() {
            Some(welcome) => writeln!(f, "{}  ·  {}", BRAND, welcome)?,
            None => writeln!(f, "{}", BRAND)?,
        }

        let items: Vec<String> = MENU
            .iter()
            .map(|item| {
                if self.is_active(item.route) {
                    format!("[{} {}]", item.icon, item.label)
                } else {
                    format!(" {} {} ", item.icon, item.label)
                }
            })
            .collect();
        write!(f, "{}  🚪 Logout", items.join(" "))?;

        if self.confirming_logout {
            writeln!(f)?;
            writeln!(f)?;
            writeln!(f, "  {}", LOGOUT_TITLE)?;
            writeln!(f, "  {}", LOGOUT_QUESTION)?;
            write!(f, "  [Cancel] [Yes, Logout]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AuthGrant;
    use crate::session::Session;

    fn logged_in() -> SessionContext {
        let ctx = SessionContext::in_memory();
        ctx.sessions()
            .save(&Session::from_grant(AuthGrant {
                admin: serde_json::from_str(r#"{"name":"Asha","adminId":"1"}"#).unwrap(),
                token: Some("tok".to_string()),
            }))
            .unwrap();
        ctx
    }

    #[test]
    fn test_menu_highlights_current_route() {
        let nav = NavShell::new(logged_in(), Route::Appointments);
        assert!(nav.is_active(Route::Appointments));
        assert!(!nav.is_active(Route::Home));

        let rendered = nav.to_string();
        assert!(rendered.starts_with("Appointment Scheduler  ·  Welcome, Asha"));
        assert!(rendered.contains("[📅 Appointments]"));
        assert_eq!(MENU.map(|item| item.route), Route::ADMIN);
    }

    #[test]
    fn test_cancel_logout_keeps_session() {
        let ctx = logged_in();
        let mut nav = NavShell::new(ctx.clone(), Route::Home);

        nav.request_logout();
        assert!(nav.is_confirming_logout());
        assert!(nav.to_string().contains(LOGOUT_QUESTION));

        nav.cancel_logout();
        assert!(!nav.is_confirming_logout());
        assert!(ctx.is_authenticated());
        assert_eq!(nav.current(), Route::Home);
    }

    #[test]
    fn test_confirm_logout_clears_session() {
        let ctx = logged_in();
        let mut nav = NavShell::new(ctx.clone(), Route::Profile);

        nav.request_logout();
        assert_eq!(nav.confirm_logout().unwrap(), Route::Login);
        assert!(!ctx.is_authenticated());
        assert!(ctx.sessions().token().is_none());
        assert!(ctx.sessions().admin_id().is_none());
        assert!(nav.welcome().is_none());
        assert!(!nav.is_confirming_logout());
    }
}
