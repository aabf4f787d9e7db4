//! Scheduler Backend API
//!
//! Typed access to the appointment-scheduler REST API.
//!
//! # Endpoints
//!
//! ## Admin
//! - `POST /admin/login` - Authenticate, returns identity and token
//! - `POST /admin/register` - Create an admin account
//! - `GET /admin/profile` - Read the profile (bearer token)
//! - `PUT /admin/profile` - Replace the profile (bearer token)
//!
//! ## Appointments
//! - `GET /appointments/byAdmin?adminId=` - List an admin's appointments
//! - `POST /appointments/cancel` - Cancel with a reason
//! - `POST /appointments/reschedule` - Move to a new date and time
//!
//! ## Assistant
//! - `POST /admin/chat` - Send a message, returns the reply
//! - `POST /admin/reset-session` - Start a fresh assistant session
//!
//! Views depend on the [`AdminApi`] trait, never on [`ApiClient`] directly.

pub mod client;
pub mod dto;
pub mod error;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{AdminApi, ApiClient};
pub use dto::{
    AdminIdentity, Appointment, AppointmentUser, AuthGrant, Availability, CancelRequest,
    ChatRequest, LoginRequest, NumericText, Profile, RegisterRequest, RescheduleRequest,
    ResetSessionRequest,
};
pub use error::{ApiError, ApiResult};
