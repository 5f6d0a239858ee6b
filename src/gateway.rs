//! Stateless request/response wrapper around the backend services.
//!
//! Every call sends JSON and turns any non-success status into a
//! [`ClientError`]. Tokens are passed in by the caller; the gateway never
//! touches local storage.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::ClientConfig;
use crate::counselor::CounselorPayload;
use crate::error::ClientError;
use crate::models::{Role, StudentDashboardResponse, UserProfile};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub password: String,
}

impl SignInRequest {
    /// Identifiers containing `@` are sent as email, anything else as user id.
    pub fn new(identifier: &str, password: &str) -> Self {
        let identifier = identifier.trim().to_string();
        let (email, user_id) = if identifier.contains('@') {
            (Some(identifier), None)
        } else {
            (None, Some(identifier))
        };

        Self {
            email,
            user_id,
            password: password.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub user: UserProfile,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForgotPasswordResponse {
    pub message: Option<String>,
    pub reset_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Bodies that may arrive wrapped as `{ "data": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(inner) => inner,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProfileBody {
    Nested { user: UserProfile },
    Flat(UserProfile),
}

pub struct RemoteGateway {
    http: Client,
    api_base_url: String,
    chat_base_url: String,
}

impl RemoteGateway {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("dropout-risk-client/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            api_base_url: config.api_base_url.clone(),
            chat_base_url: config.chat_base_url.clone(),
        })
    }

    pub async fn sign_in(&self, request: &SignInRequest) -> Result<SignInResponse, ClientError> {
        let url = endpoint(&self.api_base_url, &["auth", "signin"])?;
        self.send(self.http.post(url).json(request)).await
    }

    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<Value, ClientError> {
        let url = endpoint(&self.api_base_url, &["auth", "signup"])?;
        self.send(self.http.post(url).json(request)).await
    }

    pub async fn logout(&self, token: &str) -> Result<(), ClientError> {
        let url = endpoint(&self.api_base_url, &["auth", "logout"])?;
        let _: Value = self.send(self.http.post(url).bearer_auth(token)).await?;
        Ok(())
    }

    pub async fn profile(&self, token: &str) -> Result<UserProfile, ClientError> {
        let url = endpoint(&self.api_base_url, &["auth", "profile"])?;
        let body: Envelope<ProfileBody> = self.send(self.http.get(url).bearer_auth(token)).await?;
        Ok(match body.into_inner() {
            ProfileBody::Nested { user } => user,
            ProfileBody::Flat(user) => user,
        })
    }

    pub async fn forgot_password(
        &self,
        email: &str,
    ) -> Result<ForgotPasswordResponse, ClientError> {
        let url = endpoint(&self.api_base_url, &["auth", "forgot-password"])?;
        let body: Option<ForgotPasswordResponse> = self
            .send(self.http.post(url).json(&json!({ "email": email })))
            .await?;
        Ok(body.unwrap_or_default())
    }

    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<Value, ClientError> {
        let url = endpoint(&self.api_base_url, &["auth", "reset-password"])?;
        self.send(
            self.http
                .post(url)
                .json(&json!({ "token": token, "newPassword": new_password })),
        )
        .await
    }

    pub async fn student_dashboard(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<StudentDashboardResponse, ClientError> {
        let url = endpoint(&self.api_base_url, &["api", "dashboard", "student", user_id])?;
        let body: Envelope<StudentDashboardResponse> =
            self.send(self.http.get(url).bearer_auth(token)).await?;
        Ok(body.into_inner())
    }

    pub async fn counselor_dashboard(&self, token: &str) -> Result<CounselorPayload, ClientError> {
        let url = endpoint(&self.api_base_url, &["api", "counselor", "dashboard"])?;
        self.send(self.http.get(url).bearer_auth(token)).await
    }

    pub async fn chat(&self, message: &str) -> Result<ChatReply, ClientError> {
        let url = endpoint(&self.chat_base_url, &["chat"])?;
        self.send(self.http.post(url).json(&json!({ "message": message })))
            .await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        debug!(url = %response.url(), %status, "Backend responded");

        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(rejection(status, &body));
        }

        let body: &[u8] = if body.is_empty() { b"null" } else { &body[..] };
        serde_json::from_slice(body).map_err(|err| ClientError::MalformedResponse(err.to_string()))
    }
}

fn endpoint(base: &str, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = Url::parse(base)
        .map_err(|err| ClientError::NetworkFailure(format!("invalid base url '{base}': {err}")))?;
    url.path_segments_mut()
        .map_err(|_| ClientError::NetworkFailure(format!("base url '{base}' cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Uses the body's `message` or `error` field when the server sent one.
fn rejection(status: StatusCode, body: &[u8]) -> ClientError {
    let message = serde_json::from_slice::<Value>(body).ok().and_then(|value| {
        ["message", "error"]
            .iter()
            .find_map(|field| value.get(*field).and_then(Value::as_str).map(str::to_string))
    });

    match message {
        Some(message) => ClientError::RemoteRejected {
            status: status.as_u16(),
            message,
        },
        None => ClientError::NetworkFailure(format!("request failed with status {status}")),
    }
}
