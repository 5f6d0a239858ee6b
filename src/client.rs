//! Session-aware front door over the gateway.

use serde_json::Value;
use tracing::{info, warn};

use crate::counselor::{self, CounselorPayload};
use crate::dashboard;
use crate::error::ClientError;
use crate::gateway::{
    ForgotPasswordResponse, RemoteGateway, SignInRequest, SignInResponse, SignUpRequest,
};
use crate::models::{CounselorDashboard, DashboardAnalytics, StudentDashboardResponse, UserProfile};
use crate::resilience::{Loaded, ResilienceShim};
use crate::session::SessionStore;

pub struct RiskClient {
    gateway: RemoteGateway,
    session: SessionStore,
}

impl RiskClient {
    pub fn new(gateway: RemoteGateway, session: SessionStore) -> Self {
        Self { gateway, session }
    }

    pub fn gateway(&self) -> &RemoteGateway {
        &self.gateway
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Signs in and, when the server hands out a token, keeps it with the profile.
    pub async fn sign_in(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<SignInResponse, ClientError> {
        let response = self
            .gateway
            .sign_in(&SignInRequest::new(identifier, password))
            .await?;

        if let Some(token) = &response.token {
            self.session.save(token, &response.user).await?;
            info!(user = %response.user.user_id, role = %response.user.role, "Signed in");
        }

        Ok(response)
    }

    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<Value, ClientError> {
        self.gateway.sign_up(request).await
    }

    pub async fn forgot_password(
        &self,
        email: &str,
    ) -> Result<ForgotPasswordResponse, ClientError> {
        self.gateway.forgot_password(email).await
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), ClientError> {
        self.gateway.reset_password(token, new_password).await?;
        Ok(())
    }

    /// Remote logout is best effort; the local session is always cleared.
    pub async fn logout(&self) {
        match self.session.load_token().await {
            Ok(Some(token)) => {
                if let Err(err) = self.gateway.logout(&token).await {
                    warn!(error = %err, "Remote logout failed");
                }
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "Could not read session before logout"),
        }

        self.session.clear().await;
    }

    pub async fn stored_profile(&self) -> Result<Option<UserProfile>, ClientError> {
        self.session.load_profile().await
    }

    pub async fn remote_profile(&self) -> Result<UserProfile, ClientError> {
        let token = self.require_token().await?;
        self.gateway.profile(&token).await
    }

    pub async fn fetch_student_dashboard(&self) -> Result<StudentDashboardResponse, ClientError> {
        let token = self.require_token().await?;
        let profile = self
            .session
            .load_profile()
            .await?
            .ok_or(ClientError::Unauthenticated)?;
        self.gateway.student_dashboard(&token, &profile.user_id).await
    }

    pub async fn fetch_counselor_dashboard(&self) -> Result<CounselorPayload, ClientError> {
        let token = self.require_token().await?;
        self.gateway.counselor_dashboard(&token).await
    }

    pub async fn load_student_dashboard(
        &self,
        shim: &ResilienceShim<DashboardAnalytics>,
    ) -> Loaded<DashboardAnalytics> {
        shim.load(
            || self.fetch_student_dashboard(),
            dashboard::transform_response,
        )
        .await
    }

    pub async fn load_counselor_dashboard(
        &self,
        shim: &ResilienceShim<CounselorDashboard>,
    ) -> Loaded<CounselorDashboard> {
        shim.load(
            || self.fetch_counselor_dashboard(),
            |payload| Ok(counselor::build_dashboard(payload)),
        )
        .await
    }

    /// Raised before any network call is made.
    async fn require_token(&self) -> Result<String, ClientError> {
        self.session
            .load_token()
            .await?
            .ok_or(ClientError::Unauthenticated)
    }
}
