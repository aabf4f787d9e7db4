//! Profile
//!
//! Read-only profile display plus an edit mode over a detached copy.
//! Nested availability fields are addressed through [`ProfileField`] rather
//! than dotted keys; everything else in the profile, including fields this
//! client does not know about, is submitted back unchanged.

use chrono::{DateTime, Local};
use std::fmt;
use thiserror::Error;

use crate::api::{AdminApi, ApiError, Availability, NumericText, Profile};
use crate::config::UiConfig;
use crate::session::SessionContext;
use crate::views::notification::Notification;

/// Profile failures; the display text is what the admin sees
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("No profile found")]
    NotLoaded,

    #[error("Profile is not being edited")]
    NotEditing,

    #[error("{}", .0.message_or("Failed to update profile"))]
    Update(ApiError),
}

/// Editable profile fields, in form order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Name,
    Email,
    Phone,
    Specialty,
    Description,
    Fee,
    Experience,
    FamousFor,
    WorkingDays,
    WorkingHours,
    BreakTime,
}

impl ProfileField {
    pub const ALL: [ProfileField; 11] = [
        ProfileField::Name,
        ProfileField::Email,
        ProfileField::Phone,
        ProfileField::Specialty,
        ProfileField::Description,
        ProfileField::Fee,
        ProfileField::Experience,
        ProfileField::FamousFor,
        ProfileField::WorkingDays,
        ProfileField::WorkingHours,
        ProfileField::BreakTime,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProfileField::Name => "Full Name",
            ProfileField::Email => "Email",
            ProfileField::Phone => "Phone Number",
            ProfileField::Specialty => "Specialty",
            ProfileField::Description => "Description",
            ProfileField::Fee => "Fee",
            ProfileField::Experience => "Experience",
            ProfileField::FamousFor => "Famous For",
            ProfileField::WorkingDays => "Working Days",
            ProfileField::WorkingHours => "Working Hours",
            ProfileField::BreakTime => "Break Time",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            ProfileField::WorkingDays => "Mon–Fri",
            ProfileField::WorkingHours => "9:00 AM – 5:00 PM",
            ProfileField::BreakTime => "1:00 PM – 2:00 PM",
            _ => "",
        }
    }

    /// Parse a CLI-style key such as `famousFor` or `working-days`
    pub fn from_key(key: &str) -> Option<Self> {
        let normalized: String = key
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        Self::ALL.into_iter().find(|field| {
            let label: String = field
                .label()
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            label == normalized || field.key().to_lowercase() == normalized
        })
    }

    /// JSON key of the field, availability fields without their prefix
    pub fn key(&self) -> &'static str {
        match self {
            ProfileField::Name => "name",
            ProfileField::Email => "email",
            ProfileField::Phone => "phone",
            ProfileField::Specialty => "specialty",
            ProfileField::Description => "description",
            ProfileField::Fee => "fee",
            ProfileField::Experience => "experience",
            ProfileField::FamousFor => "famousFor",
            ProfileField::WorkingDays => "workingDays",
            ProfileField::WorkingHours => "workingHours",
            ProfileField::BreakTime => "breakTime",
        }
    }

    pub fn get<'a>(&self, profile: &'a Profile) -> Option<&'a str> {
        let availability = profile.availability.as_ref();
        let value = match self {
            ProfileField::Name => profile.name.as_ref(),
            ProfileField::Email => profile.email.as_ref(),
            ProfileField::Phone => profile.phone.as_ref(),
            ProfileField::Specialty => profile.specialty.as_ref(),
            ProfileField::Description => profile.description.as_ref(),
            ProfileField::Fee => return profile.fee.as_deref(),
            ProfileField::Experience => return profile.experience.as_deref(),
            ProfileField::FamousFor => profile.famous_for.as_ref(),
            ProfileField::WorkingDays => availability.and_then(|a| a.working_days.as_ref()),
            ProfileField::WorkingHours => availability.and_then(|a| a.working_hours.as_ref()),
            ProfileField::BreakTime => availability.and_then(|a| a.break_time.as_ref()),
        };
        value.map(String::as_str)
    }

    /// Set the field, creating the availability object when needed
    pub fn set(&self, profile: &mut Profile, value: String) {
        let slot = match self {
            ProfileField::Name => &mut profile.name,
            ProfileField::Email => &mut profile.email,
            ProfileField::Phone => &mut profile.phone,
            ProfileField::Specialty => &mut profile.specialty,
            ProfileField::Description => &mut profile.description,
            ProfileField::Fee => {
                profile.fee = Some(NumericText::from(value));
                return;
            }
            ProfileField::Experience => {
                profile.experience = Some(NumericText::from(value));
                return;
            }
            ProfileField::FamousFor => &mut profile.famous_for,
            ProfileField::WorkingDays => {
                &mut profile
                    .availability
                    .get_or_insert_with(Availability::default)
                    .working_days
            }
            ProfileField::WorkingHours => {
                &mut profile
                    .availability
                    .get_or_insert_with(Availability::default)
                    .working_hours
            }
            ProfileField::BreakTime => {
                &mut profile
                    .availability
                    .get_or_insert_with(Availability::default)
                    .break_time
            }
        };
        *slot = Some(value);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileState {
    Loading,
    /// Nothing to show; the view renders "No profile found"
    Missing,
    Loaded(Profile),
}

pub struct ProfileView {
    session: SessionContext,
    ui: UiConfig,
    state: ProfileState,
    draft: Option<Profile>,
    notification: Option<Notification>,
}

impl ProfileView {
    pub fn new(session: SessionContext, ui: UiConfig) -> Self {
        Self {
            session,
            ui,
            state: ProfileState::Loading,
            draft: None,
            notification: None,
        }
    }

    pub fn state(&self) -> &ProfileState {
        &self.state
    }

    pub fn profile(&self) -> Option<&Profile> {
        match &self.state {
            ProfileState::Loaded(profile) => Some(profile),
            _ => None,
        }
    }

    /// The edit buffer, present only in edit mode
    pub fn draft(&self) -> Option<&Profile> {
        self.draft.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref().filter(|n| n.is_visible())
    }

    pub async fn load(&mut self, api: &dyn AdminApi) {
        let token = self.session.sessions().token();
        self.state = match api.fetch_profile(token.as_deref()).await {
            Ok(profile) => ProfileState::Loaded(profile),
            Err(e) => {
                tracing::error!(error = %e, "Error fetching profile");
                ProfileState::Missing
            }
        };
        self.draft = None;
    }

    /// Enter edit mode with a copy of the displayed profile
    pub fn begin_edit(&mut self) -> Result<(), ProfileError> {
        let profile = self.profile().ok_or(ProfileError::NotLoaded)?;
        self.draft = Some(profile.clone());
        Ok(())
    }

    /// Leave edit mode, discarding the buffer
    pub fn cancel_edit(&mut self) {
        self.draft = None;
    }

    pub fn set_field(
        &mut self,
        field: ProfileField,
        value: impl Into<String>,
    ) -> Result<(), ProfileError> {
        let draft = self.draft.as_mut().ok_or(ProfileError::NotEditing)?;
        field.set(draft, value.into());
        Ok(())
    }

    /// Submit the whole buffer; edit mode is kept on failure
    pub async fn save(&mut self, api: &dyn AdminApi) -> Result<(), ProfileError> {
        let draft = self.draft.as_ref().ok_or(ProfileError::NotEditing)?;
        let token = self.session.sessions().token();

        match api.update_profile(token.as_deref(), draft).await {
            Ok(saved) => {
                self.state = ProfileState::Loaded(saved);
                self.draft = None;
                self.notification = Some(Notification::success(
                    "Profile updated successfully!",
                    self.ui.notification_ttl(),
                ));
                tracing::info!("Profile updated");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Error updating profile");
                let err = ProfileError::Update(e);
                self.notification = Some(Notification::error(
                    err.to_string(),
                    self.ui.notification_ttl(),
                ));
                Err(err)
            }
        }
    }
}

/// Initials of each word in the name
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect()
}

/// Read-only rows, in display order
pub fn info_rows(profile: &Profile) -> Vec<(&'static str, String)> {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    let availability = profile.availability.clone().unwrap_or_default();
    let part = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    vec![
        ("Full Name", text(&profile.name)),
        ("Email Address", text(&profile.email)),
        ("Phone Number", text(&profile.phone)),
        ("Role", text(&profile.role)),
        ("Admin ID", text(&profile.admin_id)),
        ("Permissions", profile.permissions.join(", ")),
        ("Specialty", text(&profile.specialty)),
        ("Description", text(&profile.description)),
        ("Fee", profile.fee.as_deref().unwrap_or_default().to_string()),
        ("Experience", profile.experience.as_deref().unwrap_or_default().to_string()),
        ("Famous For", text(&profile.famous_for)),
        (
            "Availability",
            format!(
                "{}, {}, Break: {}",
                part(availability.working_days),
                part(availability.working_hours),
                part(availability.break_time)
            ),
        ),
    ]
}

/// Member Since, Last Login and Status
pub fn stats(profile: &Profile) -> [(&'static str, String); 3] {
    let member_since = match profile.created_at.as_deref() {
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(created) => created.with_timezone(&Local).format("%Y-%m-%d").to_string(),
            Err(_) => raw.to_string(),
        },
        None => "N/A".to_string(),
    };
    let last_login = profile
        .last_login
        .clone()
        .unwrap_or_else(|| "N/A".to_string());

    [
        ("Member Since", member_since),
        ("Last Login", last_login),
        ("Status", "Active".to_string()),
    ]
}

impl fmt::Display for ProfileView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let profile = match &self.state {
            ProfileState::Loading => return writeln!(f, "Loading profile..."),
            ProfileState::Missing => return writeln!(f, "No profile found"),
            ProfileState::Loaded(profile) => profile,
        };

        if let Some(note) = self.notification() {
            writeln!(f, "{}", note)?;
            writeln!(f)?;
        }

        let name = profile.name.as_deref().unwrap_or_default();
        writeln!(f, "({})  {}", initials(name), name)?;
        writeln!(f, "      {}", profile.role.as_deref().unwrap_or_default())?;
        writeln!(f, "      {}", profile.email.as_deref().unwrap_or_default())?;
        writeln!(f)?;

        match &self.draft {
            Some(draft) => {
                writeln!(f, "== Edit Profile ==")?;
                for field in ProfileField::ALL {
                    let value = field.get(draft).unwrap_or_default();
                    let shown = if value.is_empty() && !field.placeholder().is_empty() {
                        format!("({})", field.placeholder())
                    } else {
                        value.to_string()
                    };
                    writeln!(f, "  {:<16} {}", format!("{}:", field.label()), shown)?;
                }
                writeln!(f, "  [Save] [Cancel]")?;
            }
            None => {
                writeln!(f, "== Admin Information ==")?;
                for (label, value) in info_rows(profile) {
                    writeln!(f, "  {:<16} {}", format!("{}:", label), value)?;
                }
                writeln!(f, "  [Edit Profile]")?;
            }
        }

        writeln!(f)?;
        for (label, value) in stats(profile) {
            writeln!(f, "  {:<14} {}", format!("{}:", label), value)?;
        }
        Ok(())
    }
}
