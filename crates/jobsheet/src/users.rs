//! Operator accounts: listing, creation and password changes.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::AppContext;
use crate::validate::{self, ValidationErrors};

/// Shown instead of a last-login timestamp for accounts never used.
pub const NEVER_LOGGED_IN: &str = "Never";

/// Message the backend returns after a successful password change.
pub const PASSWORD_UPDATED: &str = "Password updated successfully";

/// One row of the user list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct UserSummary {
    #[serde(default, deserialize_with = "crate::de::text")]
    pub id: String,
    #[serde(deserialize_with = "crate::de::text")]
    pub username: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub name: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub last_login: String,
}

impl UserSummary {
    /// Last login for display; the backend's `NONE` becomes "Never".
    #[must_use]
    pub fn last_login_display(&self) -> &str {
        if self.last_login.is_empty() || self.last_login == "NONE" {
            NEVER_LOGGED_IN
        } else {
            &self.last_login
        }
    }
}

/// Body of the reset-password and delete-user calls.
///
/// `position` is the caller's, `user_name` the target account's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAction {
    pub user_name: String,
    pub position: String,
}

impl UserAction {
    pub fn new(ctx: &AppContext, target: impl Into<String>) -> Self {
        Self {
            user_name: target.into(),
            position: ctx.session().position.clone(),
        }
    }
}

/// The create-user form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub user_name: String,
    pub name: String,
    pub password: String,
    /// The admin's transaction password authorising the creation.
    pub admin_password: String,
}

impl NewUser {
    /// Checks the form, reporting only the first problem found.
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        validate::required("newUserName", "Username", &self.user_name, &mut errors);
        validate::required("newName", "Name", &self.name, &mut errors);
        validate::required("newPassword", "Password", &self.password, &mut errors);
        validate::required(
            "admintPassword",
            "Transaction password",
            &self.admin_password,
            &mut errors,
        );
        if errors.is_empty() {
            if let Some(problem) = validate::password_policy(&self.password) {
                errors.add("newPassword", problem);
            }
        }
        first_only(errors).into_result()
    }

    /// The request body, carrying the caller's identity.
    #[must_use]
    pub fn payload(&self, ctx: &AppContext) -> CreateUserRequest {
        let session = ctx.session();
        CreateUserRequest {
            new_user_name: self.user_name.trim().to_string(),
            new_name: self.name.trim().to_string(),
            new_password: self.password.clone(),
            admint_password: self.admin_password.clone(),
            position: session.position.clone(),
            user_name: session.user_name.clone(),
            user_id: session.user_id.clone(),
        }
    }
}

/// Body of the create-user call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub new_user_name: String,
    pub new_name: String,
    pub new_password: String,
    pub admint_password: String,
    pub position: String,
    pub user_name: String,
    pub user_id: String,
}

/// Which password a change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordKind {
    /// The login password.
    #[default]
    Login,
    /// The transaction password that authorises admin actions.
    Transaction,
}

/// The change-password form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordChange {
    pub kind: PasswordKind,
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordChange {
    /// Field errors: every field required, and the confirmation must match.
    #[must_use]
    pub fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        validate::required("oldPassword", "Old Password", &self.old_password, &mut errors);
        validate::required("newPassword", "New Password", &self.new_password, &mut errors);
        if self.new_password == self.confirm_password {
            validate::required(
                "confirmPassword",
                "Confirm Password",
                &self.confirm_password,
                &mut errors,
            );
        } else {
            errors.add("confirmPassword", "Passwords do not match");
        }
        errors
    }

    pub fn validate(&self) -> Result<()> {
        self.errors().into_result()
    }

    #[must_use]
    pub fn payload(&self, ctx: &AppContext) -> ChangePasswordRequest {
        let session = ctx.session();
        ChangePasswordRequest {
            old_password: self.old_password.clone(),
            new_password: self.new_password.clone(),
            user_name: session.user_name.clone(),
            user_id: session.user_id.clone(),
            position: session.position.clone(),
        }
    }
}

/// Body of the change-password calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub user_name: String,
    pub user_id: String,
    pub position: String,
}

fn first_only(errors: ValidationErrors) -> ValidationErrors {
    let mut first = ValidationErrors::new();
    if let Some(field) = errors.fields().next() {
        if let Some(message) = errors.get(field) {
            first.add(field, message);
        }
    }
    first
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::session::Session;
    use serde_json::json;

    fn ctx() -> AppContext {
        AppContext::from_login(Session {
            jwt_token: "tok".into(),
            user_id: "1".into(),
            user_name: "admin".into(),
            name: "Admin".into(),
            position: "ADMIN".into(),
        })
    }

    fn new_user() -> NewUser {
        NewUser {
            user_name: "ravi".into(),
            name: "Ravi".into(),
            password: "Secret1!".into(),
            admin_password: "tx".into(),
        }
    }

    #[test]
    fn never_logged_in_is_shown_as_never() {
        let user: UserSummary = serde_json::from_value(json!({
            "ID": 3, "USERNAME": "ravi", "NAME": "Ravi", "LAST_LOGIN": "NONE"
        }))
        .unwrap();
        assert_eq!(user.id, "3");
        assert_eq!(user.last_login_display(), "Never");

        let seen = UserSummary {
            last_login: "15/06/2024 10:00".into(),
            ..user
        };
        assert_eq!(seen.last_login_display(), "15/06/2024 10:00");
    }

    #[test]
    fn new_user_reports_first_missing_field() {
        let form = NewUser {
            name: String::new(),
            admin_password: String::new(),
            ..new_user()
        };
        assert_eq!(
            form.validate(),
            Err(Error::Validation(vec!["Name is required".into()]))
        );
    }

    #[test]
    fn new_user_applies_password_policy() {
        let form = NewUser {
            password: "secret".into(),
            ..new_user()
        };
        assert_eq!(
            form.validate(),
            Err(Error::Validation(vec![
                "Password must contain at least one uppercase letter".into()
            ]))
        );
        assert!(new_user().validate().is_ok());
    }

    #[test]
    fn create_user_payload_carries_caller() {
        let body = serde_json::to_value(new_user().payload(&ctx())).unwrap();
        assert_eq!(body["newUserName"], "ravi");
        assert_eq!(body["admintPassword"], "tx");
        assert_eq!(body["userName"], "admin");
        assert_eq!(body["position"], "ADMIN");
        assert_eq!(body["userId"], "1");
    }

    #[test]
    fn password_change_requires_match() {
        let change = PasswordChange {
            old_password: "old".into(),
            new_password: "New1!x".into(),
            confirm_password: "New1!y".into(),
            ..PasswordChange::default()
        };
        let errors = change.errors();
        assert_eq!(errors.get("confirmPassword"), Some("Passwords do not match"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn password_change_requires_every_field() {
        let errors = PasswordChange::default().errors();
        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(fields, vec!["oldPassword", "newPassword", "confirmPassword"]);
        assert_eq!(errors.get("oldPassword"), Some("Old Password is required"));
    }

    #[test]
    fn user_action_targets_other_account() {
        let body = serde_json::to_value(UserAction::new(&ctx(), "ravi")).unwrap();
        assert_eq!(body, json!({"userName": "ravi", "position": "ADMIN"}));
    }
}
