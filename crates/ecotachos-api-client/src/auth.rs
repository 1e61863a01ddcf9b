//! Authentication endpoints.

use ecotachos_models::{
    AuthResponse, GoogleLoginRequest, LoginRequest, PasswordResetConfirm, PasswordResetRequest,
    ProfileUpdate, RegisterRequest, Usuario,
};
use tracing::{info, warn};
use validator::Validate;

use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};

pub mod endpoints {
    pub const LOGIN: &str = "/usuarios/auth/login/";
    pub const REGISTER: &str = "/usuarios/auth/register/";
    pub const GOOGLE: &str = "/usuarios/auth/google/";
    pub const PROFILE: &str = "/usuarios/auth/profile/";
    pub const LOGOUT: &str = "/usuarios/auth/logout/";
    pub const REQUEST_RESET: &str = "/usuarios/auth/request-reset-email/";
    pub const RESET_COMPLETE: &str = "/usuarios/auth/password-reset-complete/";
}

fn check<T: Validate>(payload: &T) -> ApiResult<()> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))
}

impl ApiClient {
    /// Email/password login. Stores the session on success.
    pub async fn login(&self, request: &LoginRequest) -> ApiResult<Usuario> {
        check(request)?;
        let auth: AuthResponse = self.post("login", endpoints::LOGIN, request).await?;
        self.start_session(auth)
    }

    /// Self-service registration; the backend logs the new user in.
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<Usuario> {
        check(request)?;
        let auth: AuthResponse = self.post("register", endpoints::REGISTER, request).await?;
        self.start_session(auth)
    }

    /// Exchange an identity-provider ID token for an application session.
    pub async fn google_login(&self, id_token: &str) -> ApiResult<Usuario> {
        let request = GoogleLoginRequest {
            token: id_token.to_string(),
        };
        let auth: AuthResponse = self.post("google_login", endpoints::GOOGLE, &request).await?;
        self.start_session(auth)
    }

    fn start_session(&self, auth: AuthResponse) -> ApiResult<Usuario> {
        let user = auth.user.clone();
        self.session().login(auth.user, auth.token)?;
        Ok(user)
    }

    /// Current user's profile.
    pub async fn profile(&self) -> ApiResult<Usuario> {
        let user: Usuario = self.get("profile", endpoints::PROFILE).await?;
        self.session().set_user(user.clone());
        Ok(user)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<Usuario> {
        let user: Usuario = self.put("update_profile", endpoints::PROFILE, update).await?;
        self.session().set_user(user.clone());
        Ok(user)
    }

    /// Log out on the backend, then clear the local session regardless.
    pub async fn logout(&self) -> ApiResult<()> {
        if self.session().is_authenticated() {
            let result: ApiResult<serde_json::Value> = self
                .post("logout", endpoints::LOGOUT, &serde_json::json!({}))
                .await;
            if let Err(e) = result {
                warn!(error = %e, "Backend logout failed, clearing local session anyway");
            }
        }
        self.session().logout()?;
        info!("Logged out");
        Ok(())
    }

    pub async fn request_password_reset(&self, email: &str) -> ApiResult<()> {
        let request = PasswordResetRequest {
            email: email.trim().to_string(),
        };
        check(&request)?;
        let _: serde_json::Value = self
            .post("request_password_reset", endpoints::REQUEST_RESET, &request)
            .await?;
        Ok(())
    }

    /// Complete a reset with the token and encoded user id from the emailed link.
    pub async fn reset_password_confirm(&self, password: &str, token: &str, uidb64: &str) -> ApiResult<()> {
        let request = PasswordResetConfirm {
            password: password.to_string(),
            token: token.to_string(),
            uidb64: uidb64.to_string(),
        };
        check(&request)?;
        let _: serde_json::Value = self
            .patch("reset_password_confirm", endpoints::RESET_COMPLETE, &request)
            .await?;
        Ok(())
    }

    /// Startup check: confirm a persisted token by fetching the profile.
    ///
    /// Returns the user when the token is still valid. Any failure clears
    /// the token.
    pub async fn restore_session(&self) -> Option<Usuario> {
        if !self.session().is_authenticated() {
            return None;
        }

        match self.profile().await {
            Ok(user) => {
                info!(user_id = user.id, "Session restored");
                Some(user)
            }
            Err(e) => {
                warn!(error = %e, "Persisted session rejected, clearing token");
                if let Err(e) = self.session().logout() {
                    warn!(error = %e, "Failed to clear session file");
                }
                None
            }
        }
    }
}
