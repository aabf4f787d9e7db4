//! Scheduler REST API Client
//!
//! HTTP client for the appointment-scheduler backend. Every call is a single
//! request/response: no retries, and no timeout unless one is configured.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::dto::{
    AdminIdentity, Appointment, AppointmentsResponse, AuthGrant, AuthResponse, CancelRequest,
    ChatRequest, ChatResponse, LoginRequest, MessageBody, Profile, ProfileResponse,
    ProfileUpdateResponse, RegisterRequest, RescheduleRequest, ResetSessionRequest,
};
use super::error::{ApiError, ApiResult};
use crate::config::ApiConfig;

/// Operations the dashboard needs from the backend
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// `POST /admin/login`
    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthGrant>;

    /// `POST /admin/register`
    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthGrant>;

    /// `GET /admin/profile`
    async fn fetch_profile(&self, token: Option<&str>) -> ApiResult<Profile>;

    /// `PUT /admin/profile`, returning the stored profile
    async fn update_profile(&self, token: Option<&str>, profile: &Profile) -> ApiResult<Profile>;

    /// `GET /appointments/byAdmin?adminId=`
    async fn list_appointments(&self, admin_id: &str) -> ApiResult<Vec<Appointment>>;

    /// `POST /appointments/cancel`
    async fn cancel_appointment(&self, request: &CancelRequest) -> ApiResult<()>;

    /// `POST /appointments/reschedule`
    async fn reschedule_appointment(&self, request: &RescheduleRequest) -> ApiResult<()>;

    /// `POST /admin/chat`; `None` when the reply field is missing
    async fn send_chat(&self, request: &ChatRequest) -> ApiResult<Option<String>>;

    /// `POST /admin/reset-session`
    async fn reset_chat_session(&self, request: &ResetSessionRequest) -> ApiResult<()>;
}

/// reqwest-backed implementation of [`AdminApi`]
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client with the given configuration
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.normalized_base_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        request.send().await.map_err(ApiError::from)
    }

    /// Fail on non-2xx, carrying the body's `message` if it has one
    async fn check_status(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body: MessageBody = serde_json::from_str(&text).unwrap_or_default();

        tracing::debug!(status = status.as_u16(), body = %text, "Backend returned error status");

        Err(ApiError::Server {
            status: status.as_u16(),
            message: body.message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let response = Self::check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn with_bearer(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn authenticate<B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<AuthGrant> {
        let response = self.send(self.client.post(self.url(path)).json(body)).await?;
        let auth: AuthResponse = Self::decode(response).await?;
        grant_from(auth)
    }
}

fn grant_from(auth: AuthResponse) -> ApiResult<AuthGrant> {
    if !auth.success {
        return Err(ApiError::Rejected {
            message: auth.message,
        });
    }

    let admin: AdminIdentity = auth
        .admin
        .ok_or_else(|| ApiError::Decode("missing admin in auth response".to_string()))?;

    Ok(AuthGrant {
        admin,
        token: auth.token,
    })
}

#[async_trait]
impl AdminApi for ApiClient {
    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthGrant> {
        tracing::debug!(email = %request.email, "Logging in");
        self.authenticate("/admin/login", request).await
    }

    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthGrant> {
        tracing::debug!(email = %request.email, "Registering admin");
        self.authenticate("/admin/register", request).await
    }

    async fn fetch_profile(&self, token: Option<&str>) -> ApiResult<Profile> {
        let request = Self::with_bearer(self.client.get(self.url("/admin/profile")), token);
        let response = self.send(request).await?;
        let body: ProfileResponse = Self::decode(response).await?;
        body.admin
            .ok_or_else(|| ApiError::Decode("missing admin in profile response".to_string()))
    }

    async fn update_profile(&self, token: Option<&str>, profile: &Profile) -> ApiResult<Profile> {
        let request = Self::with_bearer(self.client.put(self.url("/admin/profile")), token)
            .json(profile);
        let response = self.send(request).await?;
        let body: ProfileUpdateResponse = Self::decode(response).await?;

        match (body.success, body.admin) {
            (true, Some(admin)) => Ok(admin),
            (true, None) => Err(ApiError::Decode(
                "missing admin in profile update response".to_string(),
            )),
            (false, _) => Err(ApiError::Rejected {
                message: body.message,
            }),
        }
    }

    async fn list_appointments(&self, admin_id: &str) -> ApiResult<Vec<Appointment>> {
        let url = format!(
            "{}?adminId={}",
            self.url("/appointments/byAdmin"),
            urlencoding::encode(admin_id)
        );
        let response = self.send(self.client.get(url)).await?;
        let body: AppointmentsResponse = Self::decode(response).await?;

        tracing::debug!(admin_id = %admin_id, count = body.appointments.len(), "Fetched appointments");
        Ok(body.appointments)
    }

    async fn cancel_appointment(&self, request: &CancelRequest) -> ApiResult<()> {
        let response = self
            .send(self.client.post(self.url("/appointments/cancel")).json(request))
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn reschedule_appointment(&self, request: &RescheduleRequest) -> ApiResult<()> {
        let response = self
            .send(
                self.client
                    .post(self.url("/appointments/reschedule"))
                    .json(request),
            )
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn send_chat(&self, request: &ChatRequest) -> ApiResult<Option<String>> {
        let response = self
            .send(self.client.post(self.url("/admin/chat")).json(request))
            .await?;
        let body: ChatResponse = Self::decode(response).await?;
        Ok(body.reply.filter(|r| !r.is_empty()))
    }

    async fn reset_chat_session(&self, request: &ResetSessionRequest) -> ApiResult<()> {
        let response = self
            .send(self.client.post(self.url("/admin/reset-session")).json(request))
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Query,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;

    /// Serve `router` on an ephemeral port and return a client pointed at it
    async fn stub_backend(router: Router) -> ApiClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        ApiClient::new(&ApiConfig {
            base_url: format!("http://{}/api/", addr),
            request_timeout_secs: Some(5),
        })
        .unwrap()
    }

    fn login_request() -> LoginRequest {
        LoginRequest {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        }
    }

    #[test]
    fn test_base_url_normalized() {
        let client = ApiClient::new(&ApiConfig {
            base_url: "http://localhost:5000/api///".to_string(),
            request_timeout_secs: None,
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000/api");
        assert_eq!(client.url("/admin/chat"), "http://localhost:5000/api/admin/chat");
    }

    #[tokio::test]
    async fn test_login_success() {
        let router = Router::new().route(
            "/api/admin/login",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["email"], "a@b.com");
                assert_eq!(body["password"], "secret1");
                Json(json!({
                    "success": true,
                    "admin": {"name": "A", "adminId": "1"},
                    "token": "tok"
                }))
            }),
        );
        let client = stub_backend(router).await;

        let grant = client.login(&login_request()).await.unwrap();
        assert_eq!(grant.admin.id(), Some("1"));
        assert_eq!(grant.token.as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let router = Router::new().route(
            "/api/admin/login",
            post(|| async { Json(json!({"success": false, "message": "Wrong password"})) }),
        );
        let client = stub_backend(router).await;

        let err = client.login(&login_request()).await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected { .. }));
        assert_eq!(err.message_or("Login failed"), "Wrong password");
    }

    #[tokio::test]
    async fn test_login_error_status_carries_message() {
        let router = Router::new().route(
            "/api/admin/login",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"success": false, "message": "Admin not found"})),
                )
            }),
        );
        let client = stub_backend(router).await;

        let err = client.login(&login_request()).await.unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 401, .. }));
        assert_eq!(err.message_or("Server error"), "Admin not found");
    }

    #[tokio::test]
    async fn test_profile_uses_bearer_token() {
        let router = Router::new().route(
            "/api/admin/profile",
            get(|headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                if auth == "Bearer tok" {
                    (StatusCode::OK, Json(json!({"admin": {"name": "A", "fee": 300}})))
                } else {
                    (StatusCode::UNAUTHORIZED, Json(json!({"message": "No token"})))
                }
            })
            .put(|Json(body): Json<Value>| async move {
                Json(json!({"success": true, "admin": body}))
            }),
        );
        let client = stub_backend(router).await;

        let profile = client.fetch_profile(Some("tok")).await.unwrap();
        assert_eq!(profile.fee.as_deref(), Some("300"));

        let err = client.fetch_profile(None).await.unwrap_err();
        assert_eq!(err.message_or("x"), "No token");

        let mut edited = profile.clone();
        edited.specialty = Some("Dermatology".to_string());
        let saved = client.update_profile(Some("tok"), &edited).await.unwrap();
        assert_eq!(saved.specialty.as_deref(), Some("Dermatology"));
    }

    #[tokio::test]
    async fn test_list_appointments_encodes_admin_id() {
        let router = Router::new().route(
            "/api/appointments/byAdmin",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("adminId").map(String::as_str), Some("a b&c"));
                Json(json!({"appointments": [{
                    "_id": "x1",
                    "user": {"name": "Ravi"},
                    "startTime": "2025-03-01T10:00:00Z",
                    "status": "upcoming"
                }]}))
            }),
        );
        let client = stub_backend(router).await;

        let appointments = client.list_appointments("a b&c").await.unwrap();
        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments[0].id, "x1");
    }

    #[tokio::test]
    async fn test_list_appointments_keeps_valid_records() {
        let router = Router::new().route(
            "/api/appointments/byAdmin",
            get(|| async {
                Json(json!({"appointments": [
                    {"_id": "ok", "user": null, "startTime": "2025-03-01T10:00:00Z", "status": "Upcoming"},
                    {"_id": "broken", "user": {"name": "Mira"}, "status": "Upcoming"}
                ]}))
            }),
        );
        let client = stub_backend(router).await;

        let appointments = client.list_appointments("1").await.unwrap();
        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments[0].id, "ok");
        assert!(appointments[0].user.fields().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_failure_message() {
        let router = Router::new().route(
            "/api/appointments/cancel",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"message": "Appointment already cancelled"})),
                )
            }),
        );
        let client = stub_backend(router).await;

        let err = client
            .cancel_appointment(&CancelRequest {
                appointment_id: "x1".to_string(),
                reason: "Admin cancelled".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.server_message(), Some("Appointment already cancelled"));
    }

    #[tokio::test]
    async fn test_chat_reply_and_missing_reply() {
        let router = Router::new()
            .route(
                "/api/admin/chat",
                post(|Json(body): Json<Value>| async move {
                    if body["message"] == "hello" {
                        Json(json!({"reply": "Hi admin"}))
                    } else {
                        Json(json!({}))
                    }
                }),
            )
            .route("/api/admin/reset-session", post(|| async { Json(json!({})) }));
        let client = stub_backend(router).await;

        let reply = client
            .send_chat(&ChatRequest {
                message: "hello".to_string(),
                admin_id: "1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some("Hi admin"));

        let reply = client
            .send_chat(&ChatRequest {
                message: "???".to_string(),
                admin_id: "1".to_string(),
            })
            .await
            .unwrap();
        assert!(reply.is_none());

        client
            .reset_chat_session(&ResetSessionRequest {
                admin_id: "1".to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(&ApiConfig {
            base_url: format!("http://{}/api", addr),
            request_timeout_secs: Some(5),
        })
        .unwrap();

        let err = client
            .reset_chat_session(&ResetSessionRequest {
                admin_id: "1".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }
}
