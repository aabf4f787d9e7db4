//! Dashboard Views
//!
//! Each view owns its local state, is constructed with a
//! [`SessionContext`](crate::session::SessionContext), calls the backend
//! through [`AdminApi`](crate::api::AdminApi) and renders itself via
//! `Display`.
//!
//! ## Views
//!
//! - **login**: login/registration form and validation
//! - **home**: dashboard landing with the feature carousel
//! - **profile**: profile display and edit buffer
//! - **appointments**: appointment list with cancel/reschedule
//! - **chat**: assistant conversation
//! - **nav**: menu and logout confirmation

pub mod appointments;
pub mod chat;
pub mod home;
pub mod login;
pub mod nav;
pub mod notification;
pub mod profile;
pub mod prompt;

pub use appointments::{
    ActionOutcome, AppointmentCache, AppointmentDelta, AppointmentError, AppointmentStatus,
    AppointmentsView, ListState,
};
pub use chat::{ChatError, ChatView, QuickAction, ResetOutcome};
pub use home::{FeatureCarousel, HomeView};
pub use login::{AuthMode, FormField, LoginOutcome, LoginView, PendingRedirect};
pub use nav::NavShell;
pub use notification::{Notification, NotificationKind};
pub use profile::{ProfileError, ProfileField, ProfileState, ProfileView};
pub use prompt::{PresetPrompter, Prompter, ScriptedPrompter, TerminalPrompter};
