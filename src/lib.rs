//! # Timebot Admin
//!
//! Admin dashboard for the appointment-scheduler service. An admin logs in,
//! views and edits their profile, lists, cancels and reschedules
//! appointments, and talks to the backend's assistant. All scheduling logic
//! lives in the remote backend; this crate is its client.
//!
//! ## Modules
//!
//! - [`session`]: client-side persistence of identity, token and transcript
//! - [`api`]: typed REST client behind the [`AdminApi`] trait
//! - [`router`]: route guard for the admin area
//! - [`views`]: per-view state and rendering
//! - [`app`]: shell tying navigation and views together
//! - [`config`], [`logging`]: ambient setup for the binaries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use timebot_admin::{ApiClient, App, Config, FileStorage, SessionContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let storage = FileStorage::new(config.storage.resolved_path());
//!     let session = SessionContext::new(Arc::new(storage));
//!     let api = ApiClient::new(&config.api)?;
//!
//!     let mut app = App::new(session, Arc::new(api), config.ui.clone());
//!     app.navigate("/admin/appointments").await;
//!     println!("{}", app);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod logging;
pub mod router;
pub mod session;
pub mod views;

pub use api::{AdminApi, ApiClient, ApiError, ApiResult};
pub use app::{App, Screen};
pub use config::{Config, ConfigError, LoggingConfig};
pub use router::{Navigation, Route, RouteGuard};
pub use session::{FileStorage, MemoryStorage, SessionContext, SessionError, StoragePort};
