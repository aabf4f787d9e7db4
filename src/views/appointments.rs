//! Appointments
//!
//! Lists the admin's appointments and runs cancel/reschedule actions.
//!
//! The local list is an advisory cache of server-owned records. It changes
//! in exactly two ways: a full re-fetch replaces it, or a delta the server
//! has just confirmed is applied to one entry. A failed action leaves it
//! untouched.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use std::fmt;
use thiserror::Error;

use crate::api::{AdminApi, ApiError, Appointment, CancelRequest, RescheduleRequest};
use crate::session::SessionContext;
use crate::views::prompt::Prompter;

pub const CANCEL_REASON: &str = "Admin cancelled";
pub const CONFIRM_CANCEL: &str = "Are you sure you want to cancel this appointment?";
pub const PROMPT_DATE: &str = "Enter new date (YYYY-MM-DD):";
pub const PROMPT_TIME: &str = "Enter new time (HH:MM, 24-hour format):";

/// Status badge derived from the server's free-text status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentStatus {
    Upcoming,
    Completed,
    Cancelled,
    Rescheduled,
    Pending,
}

impl AppointmentStatus {
    /// Case-insensitive; anything unrecognized is pending
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "upcoming" => AppointmentStatus::Upcoming,
            "completed" => AppointmentStatus::Completed,
            "cancelled" => AppointmentStatus::Cancelled,
            "rescheduled" => AppointmentStatus::Rescheduled,
            _ => AppointmentStatus::Pending,
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            AppointmentStatus::Upcoming => "upcoming",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Rescheduled => "rescheduled",
            AppointmentStatus::Pending => "pending",
        }
    }

    /// Status text written into the cache after a confirmed action
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Upcoming => "Upcoming",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Rescheduled => "Rescheduled",
            AppointmentStatus::Pending => "Pending",
        }
    }

    /// Cancelled appointments can only be viewed
    pub fn allows_changes(&self) -> bool {
        *self != AppointmentStatus::Cancelled
    }
}

pub fn status_of(appointment: &Appointment) -> AppointmentStatus {
    AppointmentStatus::classify(&appointment.status)
}

/// Date and time strings shown on a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDisplay {
    pub date: String,
    pub time: String,
}

/// Format start/end in `tz`; the time is a range only when an end is known
pub fn format_schedule<Tz>(
    start: &DateTime<Utc>,
    end: Option<&DateTime<Utc>>,
    tz: &Tz,
) -> ScheduleDisplay
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let start = start.with_timezone(tz);
    let date = start.format("%Y-%m-%d").to_string();
    let time = match end {
        Some(end) => format!(
            "{} - {}",
            start.format("%H:%M"),
            end.with_timezone(tz).format("%H:%M")
        ),
        None => start.format("%H:%M").to_string(),
    };
    ScheduleDisplay { date, time }
}

/// A server-confirmed change to one cached appointment
#[derive(Debug, Clone, PartialEq)]
pub enum AppointmentDelta {
    Cancelled { id: String },
    Rescheduled { id: String, start_time: DateTime<Utc> },
}

/// Advisory local copy of the admin's appointments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentCache {
    items: Vec<Appointment>,
}

impl AppointmentCache {
    pub fn new(items: Vec<Appointment>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Appointment] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&Appointment> {
        self.items.iter().find(|a| a.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Patch the matching entry; returns false when `id` is not cached
    pub fn apply(&mut self, delta: &AppointmentDelta) -> bool {
        let id = match delta {
            AppointmentDelta::Cancelled { id } | AppointmentDelta::Rescheduled { id, .. } => id,
        };
        let Some(entry) = self.items.iter_mut().find(|a| &a.id == id) else {
            return false;
        };

        match delta {
            AppointmentDelta::Cancelled { .. } => {
                entry.status = AppointmentStatus::Cancelled.label().to_string();
            }
            AppointmentDelta::Rescheduled { start_time, .. } => {
                entry.start_time = *start_time;
                entry.status = AppointmentStatus::Rescheduled.label().to_string();
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListState {
    Loading,
    /// Terminal for this view instance; shown instead of the list
    Failed(String),
    Loaded(AppointmentCache),
}

/// Result of a cancel or reschedule that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The server confirmed and the cache was patched
    Applied,
    /// The admin declined the confirmation or left a prompt blank
    Declined,
}

/// Appointment action failures; the display text is the alert shown.
/// The cache is never changed when one of these is returned.
#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Admin ID not found. Please log in.")]
    MissingAdminId,

    #[error("Appointment {0} not found")]
    NotFound(String),

    #[error("Appointment is already cancelled")]
    AlreadyCancelled,

    #[error("Error rescheduling appointment: invalid date or time '{date} {time}'")]
    InvalidSlot { date: String, time: String },

    #[error("Error cancelling appointment: {}", describe(.0))]
    Cancel(ApiError),

    #[error("Error rescheduling appointment: {}", describe(.0))]
    Reschedule(ApiError),
}

pub struct AppointmentsView {
    session: SessionContext,
    state: ListState,
    selected: Option<String>,
}

impl AppointmentsView {
    pub fn new(session: SessionContext) -> Self {
        Self {
            session,
            state: ListState::Loading,
            selected: None,
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn appointments(&self) -> &[Appointment] {
        match &self.state {
            ListState::Loaded(cache) => cache.items(),
            _ => &[],
        }
    }

    /// Fetch the full list for the stored admin id, replacing the cache
    pub async fn load(&mut self, api: &dyn AdminApi) {
        let Some(admin_id) = self.session.sessions().admin_id() else {
            self.state = ListState::Failed(AppointmentError::MissingAdminId.to_string());
            return;
        };

        self.state = ListState::Loading;
        self.state = match api.list_appointments(&admin_id).await {
            Ok(items) => ListState::Loaded(AppointmentCache::new(items)),
            Err(e) if e.is_server_response() => {
                ListState::Failed(e.message_or("Failed to fetch appointments"))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Appointment fetch failed");
                ListState::Failed(format!("Error fetching appointments: {}", e))
            }
        };
    }

    /// Re-fetch; the server list is the source of truth
    pub async fn refresh(&mut self, api: &dyn AdminApi) {
        self.load(api).await;
    }

    pub fn open_details(&mut self, id: &str) -> bool {
        if self.cached(id).is_some() {
            self.selected = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn close_details(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&Appointment> {
        self.selected.as_deref().and_then(|id| self.cached(id))
    }

    /// Confirm, cancel on the server, then mark the entry cancelled
    pub async fn cancel(
        &mut self,
        api: &dyn AdminApi,
        prompter: &dyn Prompter,
        id: &str,
    ) -> Result<ActionOutcome, AppointmentError> {
        self.ensure_actionable(id)?;
        if !prompter.confirm(CONFIRM_CANCEL) {
            return Ok(ActionOutcome::Declined);
        }

        let request = CancelRequest {
            appointment_id: id.to_string(),
            reason: CANCEL_REASON.to_string(),
        };
        api.cancel_appointment(&request)
            .await
            .map_err(AppointmentError::Cancel)?;

        self.apply(AppointmentDelta::Cancelled { id: id.to_string() });
        tracing::info!(appointment_id = %id, "Appointment cancelled");
        Ok(ActionOutcome::Applied)
    }

    /// Ask for a new date and time, reschedule on the server, then patch
    pub async fn reschedule(
        &mut self,
        api: &dyn AdminApi,
        prompter: &dyn Prompter,
        id: &str,
    ) -> Result<ActionOutcome, AppointmentError> {
        self.ensure_actionable(id)?;

        let date = prompter.prompt(PROMPT_DATE).map(|d| d.trim().to_string());
        let time = prompter.prompt(PROMPT_TIME).map(|t| t.trim().to_string());
        let (date, time) = match (date, time) {
            (Some(d), Some(t)) if !d.is_empty() && !t.is_empty() => (d, t),
            _ => return Ok(ActionOutcome::Declined),
        };

        let Some(start_time) = parse_local_slot(&date, &time) else {
            return Err(AppointmentError::InvalidSlot { date, time });
        };

        let request = RescheduleRequest {
            appointment_id: id.to_string(),
            date,
            time,
        };
        api.reschedule_appointment(&request)
            .await
            .map_err(AppointmentError::Reschedule)?;

        self.apply(AppointmentDelta::Rescheduled {
            id: id.to_string(),
            start_time,
        });
        tracing::info!(appointment_id = %id, %start_time, "Appointment rescheduled");
        Ok(ActionOutcome::Applied)
    }

    fn cached(&self, id: &str) -> Option<&Appointment> {
        match &self.state {
            ListState::Loaded(cache) => cache.get(id),
            _ => None,
        }
    }

    fn ensure_actionable(&self, id: &str) -> Result<(), AppointmentError> {
        match self.cached(id) {
            None => Err(AppointmentError::NotFound(id.to_string())),
            Some(apt) if !status_of(apt).allows_changes() => Err(AppointmentError::AlreadyCancelled),
            Some(_) => Ok(()),
        }
    }

    fn apply(&mut self, delta: AppointmentDelta) {
        if let ListState::Loaded(cache) = &mut self.state {
            cache.apply(&delta);
        }
        self.selected = None;
    }
}

fn describe(err: &ApiError) -> String {
    err.server_message()
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string())
}

/// `YYYY-MM-DD` + `HH:MM` in local time, as UTC
pub fn parse_local_slot(date: &str, time: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time, "%H:%M").ok()?;
    let naive = NaiveDateTime::new(date, time);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Rows for the detail overlay
pub fn detail_rows(appointment: &Appointment) -> Vec<(String, String)> {
    let schedule = format_schedule(&appointment.start_time, appointment.end_time.as_ref(), &Local);

    let mut rows: Vec<(String, String)> = appointment
        .user
        .fields()
        .into_iter()
        .map(|(key, value)| (capitalize(&key), value))
        .collect();

    rows.push(("Appointment ID".to_string(), appointment.display_id().to_string()));
    rows.push(("Date".to_string(), schedule.date));
    rows.push(("Time".to_string(), schedule.time));
    rows.push(("Status".to_string(), appointment.status.clone()));
    rows.push((
        "Purpose".to_string(),
        appointment.purpose.clone().unwrap_or_default(),
    ));
    rows.push((
        "Payment ID".to_string(),
        appointment.payment_id.clone().unwrap_or_else(|| "-".to_string()),
    ));
    rows
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn write_card(f: &mut fmt::Formatter<'_>, apt: &Appointment) -> fmt::Result {
    let status = status_of(apt);
    let schedule = format_schedule(&apt.start_time, apt.end_time.as_ref(), &Local);
    let user = &apt.user;
    let dash = || "-".to_string();

    writeln!(
        f,
        "[{}] {}  ({})",
        status.badge(),
        user.name.clone().unwrap_or_else(dash),
        apt.status
    )?;
    writeln!(f, "  ID: {}", user.client_id.clone().unwrap_or_else(dash))?;
    writeln!(f, "  Appointment ID: {}", apt.display_id())?;
    writeln!(f, "  Email: {}", user.email.clone().unwrap_or_else(dash))?;
    writeln!(f, "  Phone: {}", user.phone.clone().unwrap_or_else(dash))?;
    writeln!(f, "  Date: {}", schedule.date)?;
    writeln!(f, "  Time: {}", schedule.time)?;
    writeln!(f, "  Purpose: {}", apt.purpose.clone().unwrap_or_default())?;
    writeln!(
        f,
        "  Payment ID: {}",
        apt.payment_id.clone().unwrap_or_else(dash)
    )?;
    if status.allows_changes() {
        writeln!(f, "  Actions: cancel {0} | reschedule {0} | view {0}", apt.id)
    } else {
        writeln!(f, "  Actions: view {}", apt.id)
    }
}

impl fmt::Display for AppointmentsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            ListState::Loading => return writeln!(f, "Loading appointments..."),
            ListState::Failed(msg) => return writeln!(f, "{}", msg),
            ListState::Loaded(_) => {}
        }

        writeln!(f, "== Admin Appointments ==")?;
        if let Some(apt) = self.selected() {
            writeln!(f, "-- Appointment Details --")?;
            for (label, value) in detail_rows(apt) {
                writeln!(f, "  {}: {}", label, value)?;
            }
            return Ok(());
        }

        if self.appointments().is_empty() {
            return writeln!(f, "No appointments available.");
        }
        for apt in self.appointments() {
            writeln!(f)?;
            write_card(f, apt)?;
        }
        Ok(())
    }
}
