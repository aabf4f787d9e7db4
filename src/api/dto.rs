//! Data Transfer Objects
//!
//! Request and response types for the scheduler backend.
//! Field names follow the backend's camelCase JSON; unknown fields on
//! server-owned records are kept in `extra` so they survive a round trip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::ops::Deref;

// ============================================
// AUTH DTOs
// ============================================

/// Login request
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Admin registration request
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// Login/register response body
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub admin: Option<AdminIdentity>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Successful authentication
#[derive(Debug, Clone, PartialEq)]
pub struct AuthGrant {
    pub admin: AdminIdentity,
    pub token: Option<String>,
}

/// The authenticated admin, as stored under `currentUser`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AdminIdentity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(
        rename = "adminId",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub admin_id: Option<String>,

    /// Database id, used when `adminId` is absent
    #[serde(
        rename = "_id",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub object_id: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AdminIdentity {
    /// Identifier used for appointment and chat calls
    pub fn id(&self) -> Option<&str> {
        self.admin_id
            .as_deref()
            .or(self.object_id.as_deref())
            .filter(|id| !id.is_empty())
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Admin")
    }
}

// ============================================
// PROFILE DTOs
// ============================================

/// Admin profile as returned by `GET /admin/profile`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<NumericText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<NumericText>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub famous_for: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Text field the backend may store as a number.
///
/// A value that arrived as a JSON number is written back as a number;
/// anything set locally is sent as a string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NumericText {
    text: String,
    number: bool,
}

impl NumericText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_number(&self) -> bool {
        self.number
    }
}

impl From<String> for NumericText {
    fn from(text: String) -> Self {
        Self { text, number: false }
    }
}

impl Deref for NumericText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.text
    }
}

impl Serialize for NumericText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.number {
            if let Ok(number) = self.text.parse::<Number>() {
                return number.serialize(serializer);
            }
        }
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for NumericText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => Self {
                text: n.to_string(),
                number: true,
            },
            Value::String(text) => Self::from(text),
            other => Self::from(other.to_string()),
        })
    }
}

/// Working schedule nested in the profile
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub working_days: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub break_time: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /admin/profile` response
#[derive(Debug, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub admin: Option<Profile>,
}

/// `PUT /admin/profile` response
#[derive(Debug, Deserialize)]
pub struct ProfileUpdateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub admin: Option<Profile>,
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================
// APPOINTMENT DTOs
// ============================================

/// Appointment as listed for an admin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    /// Database id, the key for cancel/reschedule
    #[serde(rename = "_id", deserialize_with = "required_string")]
    pub id: String,

    /// Human-facing reference, shown in place of `_id` when present
    #[serde(
        rename = "appointmentId",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub appointment_id: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub user: AppointmentUser,

    #[serde(rename = "startTime")]
    pub start_time: DateTime<Utc>,

    #[serde(rename = "endTime", default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,

    #[serde(
        rename = "paymentId",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub payment_id: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Appointment {
    /// Id shown to the admin
    pub fn display_id(&self) -> &str {
        self.appointment_id.as_deref().unwrap_or(&self.id)
    }
}

/// Client who booked the appointment
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentUser {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppointmentUser {
    /// Every populated field as (key, value), known fields first
    pub fn fields(&self) -> Vec<(String, String)> {
        let known = [
            ("name", &self.name),
            ("clientId", &self.client_id),
            ("email", &self.email),
            ("phone", &self.phone),
        ];

        let mut fields: Vec<(String, String)> = known
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.to_string(), v.clone())))
            .collect();

        for (key, value) in &self.extra {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Null => continue,
                other => other.to_string(),
            };
            fields.push((key.clone(), rendered));
        }

        fields
    }
}

/// `GET /appointments/byAdmin` response; records that fail to decode are
/// dropped individually
#[derive(Debug, Deserialize)]
pub struct AppointmentsResponse {
    #[serde(default, deserialize_with = "skip_malformed")]
    pub appointments: Vec<Appointment>,
}

/// Cancel request
#[derive(Debug, Clone, Serialize)]
pub struct CancelRequest {
    #[serde(rename = "appointmentId")]
    pub appointment_id: String,
    pub reason: String,
}

/// Reschedule request; date is `YYYY-MM-DD`, time is 24h `HH:MM`
#[derive(Debug, Clone, Serialize)]
pub struct RescheduleRequest {
    #[serde(rename = "appointmentId")]
    pub appointment_id: String,
    pub date: String,
    pub time: String,
}

// ============================================
// CHAT DTOs
// ============================================

/// Message for the admin assistant
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(rename = "adminId")]
    pub admin_id: String,
}

/// Assistant reply; `reply` is absent when the assistant has nothing to say
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub reply: Option<String>,
}

/// Assistant session reset request
#[derive(Debug, Clone, Serialize)]
pub struct ResetSessionRequest {
    #[serde(rename = "adminId")]
    pub admin_id: String,
}

// ============================================
// ERROR BODY
// ============================================

/// Error body the backend sends alongside non-2xx statuses
#[derive(Debug, Default, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================
// Helpers
// ============================================

/// Accepts strings, numbers and booleans; null becomes `None`
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn skip_malformed<'de, D>(deserializer: D) -> Result<Vec<Appointment>, D::Error>
where
    D: Deserializer<'de>,
{
    let records = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(records
        .into_iter()
        .filter_map(|record| {
            let id = record.get("_id").cloned().unwrap_or(Value::Null);
            match serde_json::from_value::<Appointment>(record) {
                Ok(appointment) => Some(appointment),
                Err(e) => {
                    tracing::warn!(%id, error = %e, "Skipping malformed appointment");
                    None
                }
            }
        })
        .collect())
}

fn required_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_string(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("expected a string or number id"))
}
