//! Typed endpoint operations for the Todolist API.
//!
//! One async method per remote operation, each going through the
//! gateway pipeline. Methods return the envelope's data payload, or the
//! server's confirmation message where the endpoint carries no data.

use tracing::info;

use crate::auth::Session;
use crate::models::{
    LoginRequest, PasswordRequest, RegisterRequest, Todo, TodoAddRequest, TodoUpdateRequest,
    UpdateUserRequest, User,
};

use super::gateway::TokenGrant;
use super::{ApiError, Gateway};

/// High-level client for the Todolist API.
#[derive(Clone)]
pub struct ApiClient {
    gateway: Gateway,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Session) -> Result<Self, ApiError> {
        Ok(Self {
            gateway: Gateway::new(base_url, session)?,
        })
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn session(&self) -> &Session {
        self.gateway.session()
    }

    // ===== Auth =====

    /// Create a new account. Returns the server's confirmation message.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<String, ApiError> {
        let request = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.gateway
            .post::<(), _>("auth/register", Some(&request))
            .await?
            .into_message()
    }

    /// Log in and install the granted access token in the session. The
    /// refresh token arrives as an HTTP-only cookie and stays in the
    /// cookie store.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let grant = self
            .gateway
            .post::<TokenGrant, _>("auth/login", Some(&request))
            .await?
            .into_data()?;

        self.session().set_token(grant.access_token);
        info!(email, "logged in");
        Ok(())
    }

    /// Log out server-side, then drop the local credential. The token
    /// is kept if the server rejects the call, so the session stays
    /// usable after a transient failure.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.gateway.post::<(), ()>("auth/logout", None).await?;
        self.session().clear();
        info!("logged out");
        Ok(())
    }

    // ===== User =====

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.gateway.get("user/current").await?.into_data()
    }

    pub async fn update_user(&self, name: &str) -> Result<User, ApiError> {
        let request = UpdateUserRequest {
            name: name.to_string(),
        };
        self.gateway
            .patch::<User, _>("user/current", Some(&request))
            .await?
            .into_data()
    }

    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<String, ApiError> {
        let request = PasswordRequest {
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
            confirm_password: confirm_password.to_string(),
        };
        self.gateway
            .post::<(), _>("user/change-password", Some(&request))
            .await?
            .into_message()
    }

    // ===== Todolist =====

    pub async fn todos(&self) -> Result<Vec<Todo>, ApiError> {
        self.gateway.get("todolist/get").await?.into_data()
    }

    pub async fn todos_by_name(&self) -> Result<Vec<Todo>, ApiError> {
        self.gateway
            .get("todolist/get-order-by-name")
            .await?
            .into_data()
    }

    pub async fn todos_by_done(&self) -> Result<Vec<Todo>, ApiError> {
        self.gateway
            .get("todolist/get-order-by-done")
            .await?
            .into_data()
    }

    pub async fn add_todo(&self, text: &str) -> Result<Todo, ApiError> {
        let request = TodoAddRequest {
            todo: text.to_string(),
        };
        self.gateway
            .post::<Todo, _>("todolist/add", Some(&request))
            .await?
            .into_data()
    }

    pub async fn update_todo(&self, id: &str, text: &str, done: bool) -> Result<Todo, ApiError> {
        let request = TodoUpdateRequest {
            todo: text.to_string(),
            is_done: done,
        };
        self.gateway
            .put::<Todo, _>(&format!("todolist/update/{id}"), Some(&request))
            .await?
            .into_data()
    }

    pub async fn delete_todo(&self, id: &str) -> Result<String, ApiError> {
        self.gateway
            .delete::<()>(&format!("todolist/delete/{id}"))
            .await?
            .into_message()
    }

    pub async fn delete_all(&self) -> Result<String, ApiError> {
        self.gateway
            .delete::<()>("todolist/delete-all")
            .await?
            .into_message()
    }
}
