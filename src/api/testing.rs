//! Scripted [`AdminApi`] for view tests.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::client::AdminApi;
use super::dto::{
    Appointment, AuthGrant, CancelRequest, ChatRequest, LoginRequest, Profile, RegisterRequest,
    RescheduleRequest, ResetSessionRequest,
};
use super::error::{ApiError, ApiResult};

/// A request the fake received
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub endpoint: &'static str,
    pub body: Value,
}

/// Replays queued responses per endpoint and records every call
#[derive(Default)]
pub(crate) struct FakeApi {
    calls: Mutex<Vec<Call>>,
    pub auth: Mutex<VecDeque<ApiResult<AuthGrant>>>,
    pub profile: Mutex<VecDeque<ApiResult<Profile>>>,
    pub appointments: Mutex<VecDeque<ApiResult<Vec<Appointment>>>>,
    pub unit: Mutex<VecDeque<ApiResult<()>>>,
    pub chat: Mutex<VecDeque<ApiResult<Option<String>>>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_auth(&self, result: ApiResult<AuthGrant>) -> &Self {
        self.auth.lock().unwrap().push_back(result);
        self
    }

    pub fn push_profile(&self, result: ApiResult<Profile>) -> &Self {
        self.profile.lock().unwrap().push_back(result);
        self
    }

    pub fn push_appointments(&self, result: ApiResult<Vec<Appointment>>) -> &Self {
        self.appointments.lock().unwrap().push_back(result);
        self
    }

    pub fn push_unit(&self, result: ApiResult<()>) -> &Self {
        self.unit.lock().unwrap().push_back(result);
        self
    }

    pub fn push_chat(&self, result: ApiResult<Option<String>>) -> &Self {
        self.chat.lock().unwrap().push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn endpoints(&self) -> Vec<&'static str> {
        self.calls().iter().map(|c| c.endpoint).collect()
    }

    fn record<B: Serialize>(&self, endpoint: &'static str, body: &B) {
        let body = serde_json::to_value(body).unwrap_or(Value::Null);
        self.calls.lock().unwrap().push(Call { endpoint, body });
    }

    fn next<T>(queue: &Mutex<VecDeque<ApiResult<T>>>) -> ApiResult<T> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network("no scripted response".to_string())))
    }
}

#[async_trait]
impl AdminApi for FakeApi {
    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthGrant> {
        self.record("login", request);
        Self::next(&self.auth)
    }

    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthGrant> {
        self.record("register", request);
        Self::next(&self.auth)
    }

    async fn fetch_profile(&self, token: Option<&str>) -> ApiResult<Profile> {
        self.record("fetch_profile", &token);
        Self::next(&self.profile)
    }

    async fn update_profile(&self, token: Option<&str>, profile: &Profile) -> ApiResult<Profile> {
        let _ = token;
        self.record("update_profile", profile);
        Self::next(&self.profile)
    }

    async fn list_appointments(&self, admin_id: &str) -> ApiResult<Vec<Appointment>> {
        self.record("list_appointments", &admin_id);
        Self::next(&self.appointments)
    }

    async fn cancel_appointment(&self, request: &CancelRequest) -> ApiResult<()> {
        self.record("cancel_appointment", request);
        Self::next(&self.unit)
    }

    async fn reschedule_appointment(&self, request: &RescheduleRequest) -> ApiResult<()> {
        self.record("reschedule_appointment", request);
        Self::next(&self.unit)
    }

    async fn send_chat(&self, request: &ChatRequest) -> ApiResult<Option<String>> {
        self.record("send_chat", request);
        Self::next(&self.chat)
    }

    async fn reset_chat_session(&self, request: &ResetSessionRequest) -> ApiResult<()> {
        self.record("reset_chat_session", request);
        Self::next(&self.unit)
    }
}
