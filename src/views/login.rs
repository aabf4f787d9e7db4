//! Login / Registration
//!
//! Form state machine for the entry view. Validation runs before any request
//! is built; a single submission is in flight at a time.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::api::{AdminApi, ApiError, LoginRequest, RegisterRequest};
use crate::config::UiConfig;
use crate::router::Route;
use crate::session::{Session, SessionContext};
use crate::views::notification::Notification;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Viewing,
    Submitting,
    Done,
}

/// Inputs on the form; `Name`, `Phone` and `ConfirmPassword` only in register mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Name,
    Phone,
    Email,
    Password,
    ConfirmPassword,
}

impl FormField {
    pub fn placeholder(&self) -> &'static str {
        match self {
            FormField::Name => "Full Name",
            FormField::Phone => "Phone",
            FormField::Email => "Enter Email",
            FormField::Password => "Enter Password",
            FormField::ConfirmPassword => "Confirm Password",
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, FormField::Password | FormField::ConfirmPassword)
    }

    /// Fields shown in `mode`, in display order
    pub fn for_mode(mode: AuthMode) -> &'static [FormField] {
        match mode {
            AuthMode::Login => &[FormField::Email, FormField::Password],
            AuthMode::Register => &[
                FormField::Name,
                FormField::Phone,
                FormField::Email,
                FormField::Password,
                FormField::ConfirmPassword,
            ],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl LoginForm {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Phone => &self.phone,
            FormField::Email => &self.email,
            FormField::Password => &self.password,
            FormField::ConfirmPassword => &self.confirm_password,
        }
    }

    fn slot(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Phone => &mut self.phone,
            FormField::Email => &mut self.email,
            FormField::Password => &mut self.password,
            FormField::ConfirmPassword => &mut self.confirm_password,
        }
    }
}

/// Navigation to perform once the success banner has been shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRedirect {
    pub route: Route,
    pub after: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Validation failed; see the field errors
    Invalid,
    /// A submission is already running or finished
    Busy,
    /// The backend refused or could not be reached
    Failed(String),
    /// Session stored; navigate after the delay
    Authenticated(PendingRedirect),
}

pub struct LoginView {
    session: SessionContext,
    ui: UiConfig,
    mode: AuthMode,
    phase: Phase,
    form: LoginForm,
    errors: BTreeMap<FormField, String>,
    notification: Option<Notification>,
}

impl LoginView {
    pub fn new(session: SessionContext, ui: UiConfig) -> Self {
        Self {
            session,
            ui,
            mode: AuthMode::Login,
            phase: Phase::Viewing,
            form: LoginForm::default(),
            errors: BTreeMap::new(),
            notification: None,
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn form(&self) -> &LoginForm {
        &self.form
    }

    pub fn errors(&self) -> &BTreeMap<FormField, String> {
        &self.errors
    }

    pub fn error(&self, field: FormField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Banner, if one is showing and has not expired
    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref().filter(|n| n.is_visible())
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            AuthMode::Login => "Admin Login",
            AuthMode::Register => "Create Admin Account",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match (self.phase, self.mode) {
            (Phase::Submitting, _) => "Processing...",
            (_, AuthMode::Login) => "Login",
            (_, AuthMode::Register) => "Sign Up",
        }
    }

    pub fn can_submit(&self) -> bool {
        self.phase == Phase::Viewing
    }

    /// Switch between login and register, resetting the whole form
    pub fn toggle_mode(&mut self) {
        if self.phase == Phase::Submitting {
            return;
        }
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.form = LoginForm::default();
        self.errors.clear();
        self.notification = None;
        self.phase = Phase::Viewing;
    }

    /// Update one input; clears that input's error
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        *self.form.slot(field) = value.into();
        self.errors.remove(&field);
    }

    /// Run client-side validation, replacing the field errors
    pub fn validate(&mut self) -> bool {
        self.errors = validate(&self.form, self.mode);
        self.errors.is_empty()
    }

    /// Validate, call the backend, and store the session on success
    pub async fn submit(&mut self, api: &dyn AdminApi) -> LoginOutcome {
        if !self.can_submit() {
            return LoginOutcome::Busy;
        }
        if !self.validate() {
            return LoginOutcome::Invalid;
        }

        self.phase = Phase::Submitting;
        let result = match self.mode {
            AuthMode::Login => {
                api.login(&LoginRequest {
                    email: self.form.email.clone(),
                    password: self.form.password.clone(),
                })
                .await
            }
            AuthMode::Register => {
                api.register(&RegisterRequest {
                    name: self.form.name.clone(),
                    email: self.form.email.clone(),
                    phone: self.form.phone.clone(),
                    password: self.form.password.clone(),
                })
                .await
            }
        };

        let grant = match result {
            Ok(grant) => grant,
            Err(e) => {
                let message = self.failure_message(&e);
                return self.fail(message);
            }
        };

        let session = Session::from_grant(grant);
        if let Err(e) = self.session.sessions().save(&session) {
            tracing::error!(error = %e, "Failed to persist session");
            return self.fail(format!("Could not save session: {}", e));
        }

        let message = match self.mode {
            AuthMode::Login => "Login successful!",
            AuthMode::Register => "Registration successful!",
        };
        self.notification = Some(Notification::success(message, self.ui.notification_ttl()));
        self.phase = Phase::Done;

        LoginOutcome::Authenticated(PendingRedirect {
            route: Route::Home,
            after: self.ui.redirect_delay(),
        })
    }

    fn failure_message(&self, err: &ApiError) -> String {
        match err {
            ApiError::Rejected { .. } => err.message_or(match self.mode {
                AuthMode::Login => "Login failed",
                AuthMode::Register => "Signup failed",
            }),
            other => {
                tracing::warn!(error = %other, "Authentication request failed");
                other.message_or("Server error")
            }
        }
    }

    fn fail(&mut self, message: String) -> LoginOutcome {
        self.notification = Some(Notification::error(
            message.clone(),
            self.ui.notification_ttl(),
        ));
        self.phase = Phase::Viewing;
        LoginOutcome::Failed(message)
    }
}

/// Field errors for `form` in `mode`
pub fn validate(form: &LoginForm, mode: AuthMode) -> BTreeMap<FormField, String> {
    let mut errors = BTreeMap::new();

    if form.email.is_empty() {
        errors.insert(FormField::Email, "Email is required".to_string());
    } else if !is_valid_email(&form.email) {
        errors.insert(FormField::Email, "Enter a valid email address".to_string());
    }

    if form.password.is_empty() {
        errors.insert(FormField::Password, "Password is required".to_string());
    } else if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(
            FormField::Password,
            "Password must be at least 6 characters".to_string(),
        );
    }

    if mode == AuthMode::Register {
        if form.name.is_empty() {
            errors.insert(FormField::Name, "Name is required".to_string());
        }
        if form.phone.is_empty() {
            errors.insert(FormField::Phone, "Phone is required".to_string());
        }
        if form.confirm_password.is_empty() {
            errors.insert(FormField::ConfirmPassword, "Confirm your password".to_string());
        } else if form.password != form.confirm_password {
            errors.insert(
                FormField::ConfirmPassword,
                "Passwords do not match".to_string(),
            );
        }
    }

    errors
}

pub fn is_valid_email(email: &str) -> bool {
    regex::Regex::new(EMAIL_PATTERN)
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

impl fmt::Display for LoginView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(note) = self.notification() {
            writeln!(f, "{}", note)?;
            writeln!(f)?;
        }

        writeln!(f, "== {} ==", self.title())?;
        for field in FormField::for_mode(self.mode) {
            let value = self.form.get(*field);
            let shown = if field.is_secret() {
                "*".repeat(value.chars().count())
            } else {
                value.to_string()
            };
            writeln!(f, "  {:<18} {}", format!("{}:", field.placeholder()), shown)?;
            if let Some(err) = self.error(*field) {
                writeln!(f, "    ! {}", err)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "  [{}]", self.submit_label())?;
        match self.mode {
            AuthMode::Login => write!(f, "  Don’t have an account? Sign Up"),
            AuthMode::Register => write!(f, "  Already have an account? Login"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeApi;
    use crate::api::AuthGrant;

    fn view() -> (LoginView, SessionContext) {
        let ctx = SessionContext::in_memory();
        (LoginView::new(ctx.clone(), UiConfig::default()), ctx)
    }

    fn grant() -> AuthGrant {
        AuthGrant {
            admin: serde_json::from_str(r#"{"name":"A","adminId":"1"}"#).unwrap(),
            token: Some("tok".to_string()),
        }
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("a@b.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("@b.com"));
    }

    #[test]
    fn test_login_validation_messages() {
        let errors = validate(&LoginForm::default(), AuthMode::Login);
        assert_eq!(errors[&FormField::Email], "Email is required");
        assert_eq!(errors[&FormField::Password], "Password is required");
        assert_eq!(errors.len(), 2);

        let form = LoginForm {
            email: "nope".to_string(),
            password: "12345".to_string(),
            ..Default::default()
        };
        let errors = validate(&form, AuthMode::Login);
        assert_eq!(errors[&FormField::Email], "Enter a valid email address");
        assert_eq!(
            errors[&FormField::Password],
            "Password must be at least 6 characters"
        );
    }

    #[tokio::test]
    async fn test_successful_login_persists_session() {
        let (mut view, ctx) = view();
        let api = FakeApi::new();
        api.push_auth(Ok(grant()));

        view.set_field(FormField::Email, "a@b.com");
        view.set_field(FormField::Password, "secret1");
        let outcome = view.submit(&api).await;

        assert_eq!(
            outcome,
            LoginOutcome::Authenticated(PendingRedirect {
                route: Route::Home,
                after: Duration::from_millis(1500),
            })
        );
        assert_eq!(view.phase(), Phase::Done);
        assert_eq!(view.notification().unwrap().message, "Login successful!");

        let session = ctx.sessions().read().unwrap();
        assert_eq!(session.admin_id.as_deref(), Some("1"));
        assert_eq!(session.token.as_deref(), Some("tok"));
        assert_eq!(session.admin, grant().admin);

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].body["email"], "a@b.com");
        assert_eq!(calls[0].body["password"], "secret1");
    }

    #[tokio::test]
    async fn test_mismatched_register_passwords_never_call_backend() {
        let (mut view, ctx) = view();
        let api = FakeApi::new();

        view.toggle_mode();
        view.set_field(FormField::Name, "A");
        view.set_field(FormField::Phone, "555");
        view.set_field(FormField::Email, "a@b.com");
        view.set_field(FormField::Password, "secret1");
        view.set_field(FormField::ConfirmPassword, "secret2");

        assert_eq!(view.submit(&api).await, LoginOutcome::Invalid);
        assert!(api.calls().is_empty());
        assert_eq!(view.errors().len(), 1);
        assert_eq!(
            view.error(FormField::ConfirmPassword),
            Some("Passwords do not match")
        );
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_register_sends_all_fields() {
        let (mut view, _ctx) = view();
        let api = FakeApi::new();
        api.push_auth(Ok(grant()));

        view.toggle_mode();
        view.set_field(FormField::Name, "A");
        view.set_field(FormField::Phone, "555");
        view.set_field(FormField::Email, "a@b.com");
        view.set_field(FormField::Password, "secret1");
        view.set_field(FormField::ConfirmPassword, "secret1");

        assert!(matches!(
            view.submit(&api).await,
            LoginOutcome::Authenticated(_)
        ));
        assert_eq!(view.notification().unwrap().message, "Registration successful!");

        let calls = api.calls();
        assert_eq!(calls[0].endpoint, "register");
        assert_eq!(calls[0].body["phone"], "555");
        assert!(calls[0].body.get("confirmPassword").is_none());
    }

    #[tokio::test]
    async fn test_rejected_login_returns_to_viewing() {
        let (mut view, ctx) = view();
        let api = FakeApi::new();
        api.push_auth(Err(ApiError::Rejected { message: None }));
        api.push_auth(Err(ApiError::Server {
            status: 500,
            message: Some("Database down".to_string()),
        }));
        api.push_auth(Err(ApiError::Network("refused".to_string())));

        view.set_field(FormField::Email, "a@b.com");
        view.set_field(FormField::Password, "secret1");

        assert_eq!(
            view.submit(&api).await,
            LoginOutcome::Failed("Login failed".to_string())
        );
        assert_eq!(view.phase(), Phase::Viewing);
        assert!(view.can_submit());

        assert_eq!(
            view.submit(&api).await,
            LoginOutcome::Failed("Database down".to_string())
        );
        assert_eq!(
            view.submit(&api).await,
            LoginOutcome::Failed("Server error".to_string())
        );
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_done_view_does_not_resubmit() {
        let (mut view, _ctx) = view();
        let api = FakeApi::new();
        api.push_auth(Ok(grant()));

        view.set_field(FormField::Email, "a@b.com");
        view.set_field(FormField::Password, "secret1");
        view.submit(&api).await;

        assert_eq!(view.submit(&api).await, LoginOutcome::Busy);
        assert_eq!(api.calls().len(), 1);
    }

    #[test]
    fn test_toggle_clears_form_and_errors() {
        let (mut view, _ctx) = view();
        view.set_field(FormField::Email, "bad");
        assert!(!view.validate());
        assert!(!view.errors().is_empty());

        view.toggle_mode();

        assert_eq!(view.mode(), AuthMode::Register);
        assert!(view.errors().is_empty());
        assert_eq!(view.form(), &LoginForm::default());
        assert_eq!(view.submit_label(), "Sign Up");
        assert_eq!(view.title(), "Create Admin Account");
    }

    #[test]
    fn test_editing_field_clears_its_error() {
        let (mut view, _ctx) = view();
        view.validate();
        assert!(view.error(FormField::Email).is_some());

        view.set_field(FormField::Email, "a@b.com");
        assert!(view.error(FormField::Email).is_none());
        assert!(view.error(FormField::Password).is_some());
    }

    #[test]
    fn test_render_masks_password() {
        let (mut view, _ctx) = view();
        view.set_field(FormField::Email, "a@b.com");
        view.set_field(FormField::Password, "secret1");

        let rendered = view.to_string();
        assert!(rendered.contains("a@b.com"));
        assert!(rendered.contains("*******"));
        assert!(!rendered.contains("secret1"));
    }
}
