//! Application shell
//!
//! Owns the session context, the backend handle and the view on screen.
//! Every navigation goes through the route guard; entering a view builds it
//! fresh and loads its data.

use std::fmt;
use std::sync::Arc;

use crate::api::AdminApi;
use crate::config::UiConfig;
use crate::router::{Navigation, Route, RouteGuard};
use crate::session::{SessionContext, SessionResult};
use crate::views::{
    AppointmentsView, ChatView, HomeView, LoginView, NavShell, ProfileView,
};

/// The view currently shown
pub enum Screen {
    Login(LoginView),
    Home(HomeView),
    Profile(ProfileView),
    Appointments(AppointmentsView),
    Bot(ChatView),
}

impl Screen {
    pub fn route(&self) -> Route {
        match self {
            Screen::Login(_) => Route::Login,
            Screen::Home(_) => Route::Home,
            Screen::Profile(_) => Route::Profile,
            Screen::Appointments(_) => Route::Appointments,
            Screen::Bot(_) => Route::Bot,
        }
    }
}

pub struct App {
    session: SessionContext,
    api: Arc<dyn AdminApi>,
    ui: UiConfig,
    guard: RouteGuard,
    nav: NavShell,
    screen: Screen,
}

impl App {
    /// Start on the login view
    pub fn new(session: SessionContext, api: Arc<dyn AdminApi>, ui: UiConfig) -> Self {
        let guard = RouteGuard::new(session.sessions().clone());
        let nav = NavShell::new(session.clone(), Route::Login);
        let screen = Screen::Login(LoginView::new(session.clone(), ui.clone()));
        Self {
            session,
            api,
            ui,
            guard,
            nav,
            screen,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Shared backend handle, for calling into a view borrowed from `screen_mut`
    pub fn api(&self) -> Arc<dyn AdminApi> {
        Arc::clone(&self.api)
    }

    pub fn route(&self) -> Route {
        self.screen.route()
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    pub fn nav(&self) -> &NavShell {
        &self.nav
    }

    pub fn nav_mut(&mut self) -> &mut NavShell {
        &mut self.nav
    }

    /// Resolve `path` through the guard and show the resulting view
    pub async fn navigate(&mut self, path: &str) -> Navigation {
        let navigation = self.guard.navigate(path);
        let route = navigation.route();
        tracing::debug!(path, %route, "Navigating");

        self.screen = self.build(route).await;
        self.nav.set_current(route);
        self.nav.cancel_logout();
        navigation
    }

    pub async fn go(&mut self, route: Route) -> Navigation {
        self.navigate(route.path()).await
    }

    /// Confirm the pending logout and return to the entry view
    pub async fn logout(&mut self) -> SessionResult<Navigation> {
        let route = self.nav.confirm_logout()?;
        Ok(self.go(route).await)
    }

    async fn build(&self, route: Route) -> Screen {
        let api = self.api.as_ref();
        match route {
            Route::Login => Screen::Login(LoginView::new(self.session.clone(), self.ui.clone())),
            Route::Home => Screen::Home(HomeView::new(self.ui.carousel_interval())),
            Route::Profile => {
                let mut view = ProfileView::new(self.session.clone(), self.ui.clone());
                view.load(api).await;
                Screen::Profile(view)
            }
            Route::Appointments => {
                let mut view = AppointmentsView::new(self.session.clone());
                view.load(api).await;
                Screen::Appointments(view)
            }
            Route::Bot => Screen::Bot(ChatView::new(self.session.clone())),
        }
    }
}

impl fmt::Display for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.route().requires_session() {
            writeln!(f, "{}", self.nav)?;
            writeln!(f)?;
        }
        match &self.screen {
            Screen::Login(view) => write!(f, "{}", view),
            Screen::Home(view) => write!(f, "{}", view),
            Screen::Profile(view) => write!(f, "{}", view),
            Screen::Appointments(view) => write!(f, "{}", view),
            Screen::Bot(view) => write!(f, "{}", view),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeApi;
    use crate::api::AuthGrant;
    use crate::views::{FormField, LoginOutcome};

    fn app() -> (App, Arc<FakeApi>) {
        let api = Arc::new(FakeApi::new());
        let app = App::new(SessionContext::in_memory(), api.clone(), UiConfig::default());
        (app, api)
    }

    fn grant() -> AuthGrant {
        AuthGrant {
            admin: serde_json::from_str(r#"{"name":"A","adminId":"1"}"#).unwrap(),
            token: Some("tok".to_string()),
        }
    }

    #[tokio::test]
    async fn test_guarded_until_login() {
        let (mut app, api) = app();

        let nav = app.navigate("/admin/appointments").await;
        assert_eq!(nav, Navigation::Redirect(Route::Login));
        assert_eq!(app.route(), Route::Login);
        assert!(api.calls().is_empty());

        api.push_auth(Ok(grant()));
        let Screen::Login(login) = app.screen_mut() else {
            panic!("expected login screen");
        };
        login.set_field(FormField::Email, "a@b.com");
        login.set_field(FormField::Password, "secret1");
        let outcome = login.submit(api.as_ref()).await;
        let LoginOutcome::Authenticated(redirect) = outcome else {
            panic!("expected authenticated outcome");
        };

        app.go(redirect.route).await;
        assert_eq!(app.route(), Route::Home);
        assert!(app.to_string().contains("Welcome, A"));
    }

    #[tokio::test]
    async fn test_entering_views_loads_data() {
        let (mut app, api) = app();
        app.session()
            .sessions()
            .save(&crate::session::Session::from_grant(grant()))
            .unwrap();
        api.push_appointments(Ok(Vec::new()));

        app.navigate("/admin/appointments").await;
        assert_eq!(app.route(), Route::Appointments);
        assert!(app.nav().is_active(Route::Appointments));
        assert_eq!(api.endpoints(), vec!["list_appointments"]);

        app.navigate("/admin/nowhere").await;
        assert_eq!(app.route(), Route::Home);
    }

    #[tokio::test]
    async fn test_logout_returns_to_login() {
        let (mut app, _api) = app();
        app.session()
            .sessions()
            .save(&crate::session::Session::from_grant(grant()))
            .unwrap();
        app.go(Route::Bot).await;

        app.nav_mut().request_logout();
        let nav = app.logout().await.unwrap();
        assert_eq!(nav, Navigation::Render(Route::Login));
        assert!(!app.session().is_authenticated());

        let nav = app.navigate("/admin/bot").await;
        assert_eq!(nav, Navigation::Redirect(Route::Login));
    }
}
