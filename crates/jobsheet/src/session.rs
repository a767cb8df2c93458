//! Signed-in user state.
//!
//! An [`AppContext`] only exists after a successful login and is consumed by
//! [`AppContext::logout`]. Anything that needs the bearer token or the role
//! takes the context as an argument instead of reading shared state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Wire value of the administrator position.
pub const ADMIN_POSITION: &str = "ADMIN";

/// Access level derived from the login response's `position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    /// `"ADMIN"` (exact match) is an admin; any other position is a user.
    #[must_use]
    pub fn from_position(position: &str) -> Self {
        if position == ADMIN_POSITION {
            Self::Admin
        } else {
            Self::User
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => f.write_str("admin"),
            Self::User => f.write_str("user"),
        }
    }
}

/// Credentials sent to the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// The login response.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub jwt_token: String,
    #[serde(deserialize_with = "crate::de::text")]
    pub user_id: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub user_name: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub name: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub position: String,
}

impl Session {
    #[must_use]
    pub fn role(&self) -> Role {
        Role::from_position(&self.position)
    }
}

// The token stays out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("jwt_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("user_name", &self.user_name)
            .field("name", &self.name)
            .field("position", &self.position)
            .finish()
    }
}

/// Body of the logout call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct LogoutRequest {
    #[serde(rename = "USERID")]
    pub user_id: String,
    #[serde(rename = "USERNAME")]
    pub user_name: String,
    pub position: String,
}

/// The authenticated application context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppContext {
    session: Session,
}

impl AppContext {
    /// Wraps the response of a successful login.
    #[must_use]
    pub fn from_login(session: Session) -> Self {
        tracing::info!(user = %session.user_name, role = %session.role(), "signed in");
        Self { session }
    }

    /// Bearer token for authenticated calls.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.session.jwt_token
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn user_name(&self) -> &str {
        &self.session.user_name
    }

    /// Display name, falling back to the user name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.session.name.is_empty() {
            &self.session.user_name
        } else {
            &self.session.name
        }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.session.role()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role().is_admin()
    }

    /// Fails with [`Error::Unauthorized`] unless the user is an admin.
    ///
    /// This only hides admin screens and actions; the backend enforces the
    /// real permission check.
    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            tracing::warn!(user = %self.session.user_name, "admin action refused");
            Err(Error::Unauthorized)
        }
    }

    /// Ends the context, returning the body to send to the logout endpoint.
    #[must_use]
    pub fn logout(self) -> LogoutRequest {
        tracing::info!(user = %self.session.user_name, "signed out");
        LogoutRequest {
            user_id: self.session.user_id,
            user_name: self.session.user_name,
            position: self.session.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session(position: &str) -> Session {
        serde_json::from_value(json!({
            "jwtToken": "tok",
            "userId": 12,
            "userName": "asha",
            "name": "Asha K",
            "position": position,
        }))
        .unwrap()
    }

    #[test]
    fn decodes_login_response_with_numeric_user_id() {
        let s = session("ADMIN");
        assert_eq!(s.user_id, "12");
        assert_eq!(s.jwt_token, "tok");
        assert_eq!(s.role(), Role::Admin);
    }

    #[test]
    fn only_exact_admin_position_is_admin() {
        assert_eq!(Role::from_position("ADMIN"), Role::Admin);
        assert_eq!(Role::from_position("admin"), Role::User);
        assert_eq!(Role::from_position("STAFF"), Role::User);
        assert_eq!(Role::from_position(""), Role::User);
    }

    #[test]
    fn require_admin_gates_users() {
        assert!(AppContext::from_login(session("ADMIN")).require_admin().is_ok());
        assert_eq!(
            AppContext::from_login(session("USER")).require_admin(),
            Err(Error::Unauthorized)
        );
    }

    #[test]
    fn logout_consumes_context() {
        let ctx = AppContext::from_login(session("ADMIN"));
        assert_eq!(ctx.token(), "tok");
        let body = serde_json::to_value(ctx.logout()).unwrap();
        assert_eq!(
            body,
            json!({"USERID": "12", "USERNAME": "asha", "POSITION": "ADMIN"})
        );
    }

    #[test]
    fn login_request_uses_uppercase_keys() {
        let body = serde_json::to_value(LoginRequest::new("asha", "pw")).unwrap();
        assert_eq!(body, json!({"USERNAME": "asha", "PASSWORD": "pw"}));
    }

    #[test]
    fn debug_hides_token() {
        let rendered = format!("{:?}", session("ADMIN"));
        assert!(!rendered.contains("tok\""));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn display_name_falls_back_to_user_name() {
        let mut s = session("USER");
        s.name.clear();
        assert_eq!(AppContext::from_login(s).display_name(), "asha");
    }
}
