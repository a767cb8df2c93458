//! Remote fetch layer: the job-sheet backend's JSON-over-HTTP API.
//!
//! Every authenticated call sends `Authorization: Bearer <token>` and a JSON
//! content type. A non-2xx response becomes [`ApiError::Status`] carrying the
//! backend's own `message` text, so the operator sees exactly what the server
//! said. Nothing is retried.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use jobsheet::filter::JobQuery;
use jobsheet::insights::{InsightQuery, InsightRow};
use jobsheet::job::{JobDraft, JobRecord, LastJobId};
use jobsheet::notice::MessageResponse;
use jobsheet::picker::{PickerCategory, PickerList};
use jobsheet::session::{AppContext, LoginRequest, LogoutRequest, Session};
use jobsheet::users::{ChangePasswordRequest, CreateUserRequest, PasswordKind, UserAction, UserSummary};

/// Errors from talking to the backend.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// The backend's message, verbatim.
        message: String,
    },

    /// A lookup by job id returned no rows.
    #[error("no job sheet found for {0}")]
    NotFound(String),

    /// A 2xx body that is not the expected JSON.
    #[error("unexpected response from {path}: {reason}")]
    Decode {
        /// Endpoint path.
        path: String,
        /// Parser message.
        reason: String,
    },

    /// The configured base URL is unusable.
    #[error("invalid base URL '{0}', expected http:// or https://")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// HTTP status, when the backend answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the backend rejected the token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

/// A specialized [`Result`] type for API calls.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Backend endpoint paths.
pub mod endpoints {
    pub const LOGIN: &str = "/login";
    pub const LOGOUT: &str = "/logout";
    pub const CHANGE_PASSWORD: &str = "/changePassword";
    pub const CHANGE_TRANSACTION_PASSWORD: &str = "/changeTPassword";
    pub const CREATE_USER: &str = "/createUser";
    pub const USER_LIST: &str = "/userList";
    pub const RESET_PASSWORD: &str = "/resetPassword";
    pub const DELETE_USER: &str = "/deleteUser";
    pub const ALL_DATA: &str = "/allData";
    pub const PRINT_DATA: &str = "/printData";
    pub const LAST_JOB_ID: &str = "/jobID";
    pub const INSERT: &str = "/insert";
    pub const EDIT_JOB: &str = "/editJob";
    pub const DELETE_JOB: &str = "/deleteJob";
    pub const INSIGHT: &str = "/insight";
    pub const PICKERS: &str = "/jobSheetPickers";
    pub const PICKERS_LIST: &str = "/pickersList";
    pub const INSERT_PICKER: &str = "/insertPicker";
    pub const EDIT_PICKER: &str = "/editPicker";
    pub const DELETE_PICKER: &str = "/deletePicker";
}

/// Operations the panel performs against the backend.
///
/// [`HttpClient`] is the real implementation; tests and offline tooling can
/// provide their own.
pub trait JobsApi {
    /// Exchanges credentials for a session. Sends no token.
    fn login(&self, username: &str, password: &str) -> Result<Session>;

    /// Tells the backend the session is over. Consumes the context.
    fn logout(&self, ctx: AppContext) -> Result<MessageResponse>;

    /// Jobs whose intake date falls in the query range, filtered by status.
    fn list_jobs(&self, ctx: &AppContext, query: &JobQuery) -> Result<Vec<JobRecord>>;

    /// One job by id. An empty result is [`ApiError::NotFound`].
    fn get_job(&self, ctx: &AppContext, job_id: &str) -> Result<JobRecord>;

    fn create_job(&self, ctx: &AppContext, draft: &JobDraft) -> Result<MessageResponse>;

    fn update_job(&self, ctx: &AppContext, draft: &JobDraft) -> Result<MessageResponse>;

    fn delete_job(&self, ctx: &AppContext, job_id: &str) -> Result<MessageResponse>;

    /// Every picker list, fetched fresh.
    fn list_pickers(&self, ctx: &AppContext) -> Result<PickerList>;

    /// The most recently issued job id, empty when none exists.
    fn last_job_id(&self, ctx: &AppContext) -> Result<String>;

    fn insights(&self, ctx: &AppContext, query: &InsightQuery) -> Result<Vec<InsightRow>>;

    fn pickers_by_category(&self, ctx: &AppContext, category: PickerCategory)
    -> Result<Vec<String>>;

    fn insert_picker(
        &self,
        ctx: &AppContext,
        category: PickerCategory,
        name: &str,
    ) -> Result<MessageResponse>;

    fn update_picker(
        &self,
        ctx: &AppContext,
        category: PickerCategory,
        old_name: &str,
        new_name: &str,
    ) -> Result<MessageResponse>;

    fn delete_picker(
        &self,
        ctx: &AppContext,
        category: PickerCategory,
        name: &str,
    ) -> Result<MessageResponse>;

    fn list_users(&self, ctx: &AppContext) -> Result<Vec<UserSummary>>;

    fn create_user(&self, ctx: &AppContext, request: &CreateUserRequest) -> Result<MessageResponse>;

    fn reset_password(&self, ctx: &AppContext, action: &UserAction) -> Result<MessageResponse>;

    fn delete_user(&self, ctx: &AppContext, action: &UserAction) -> Result<MessageResponse>;

    fn change_password(
        &self,
        ctx: &AppContext,
        kind: PasswordKind,
        request: &ChangePasswordRequest,
    ) -> Result<MessageResponse>;
}

#[derive(Serialize)]
struct DeleteJobRequest<'a> {
    #[serde(rename = "JobID")]
    job_id: &'a str,
    position: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PickerRequest<'a> {
    menu_selected: PickerCategory,
    picker_name: &'a str,
    position: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenamePickerRequest<'a> {
    menu_selected: PickerCategory,
    old_picker: &'a str,
    new_picker: &'a str,
    position: &'a str,
}

/// Blocking HTTP implementation of [`JobsApi`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Creates a client for `base_url` with a per-request `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("jobdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        let builder = builder
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: Option<&str>,
    ) -> Result<T> {
        tracing::debug!(method = "GET", path, ?query, "request");
        let builder = self.request(self.client.get(self.url(path)).query(query), token);
        self.send(builder, path)
    }

    fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T> {
        tracing::debug!(method = "POST", path, "request");
        let builder = self.request(self.client.post(self.url(path)).json(body), token);
        self.send(builder, path)
    }

    fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, path: &str) -> Result<T> {
        let response = builder.send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            let message = error_message(&body, status.as_u16());
            tracing::debug!(path, status = status.as_u16(), %message, "backend error");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        decode(path, &body)
    }
}

/// The backend's `message` (or `error`) text, or a generic status line.
fn error_message(body: &str, status: u16) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"].iter().find_map(|key| {
                value
                    .get(key)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
                    .map(str::to_string)
            })
        })
        .unwrap_or_else(|| format!("HTTP error! status: {status}"))
}

fn decode<T: DeserializeOwned>(path: &str, body: &str) -> Result<T> {
    // Some mutations answer 200 with no body at all.
    let body = if body.trim().is_empty() { "{}" } else { body };
    serde_json::from_str(body).map_err(|e| ApiError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

impl JobsApi for HttpClient {
    fn login(&self, username: &str, password: &str) -> Result<Session> {
        let session: Session =
            self.post(endpoints::LOGIN, &LoginRequest::new(username, password), None)?;
        tracing::info!(user = %session.user_name, "login accepted");
        Ok(session)
    }

    fn logout(&self, ctx: AppContext) -> Result<MessageResponse> {
        let token = ctx.token().to_string();
        let body: LogoutRequest = ctx.logout();
        self.post(endpoints::LOGOUT, &body, Some(&token))
    }

    fn list_jobs(&self, ctx: &AppContext, query: &JobQuery) -> Result<Vec<JobRecord>> {
        let jobs: Vec<JobRecord> =
            self.get(endpoints::ALL_DATA, &query.to_query_pairs(), Some(ctx.token()))?;
        tracing::debug!(count = jobs.len(), "jobs fetched");
        Ok(jobs)
    }

    fn get_job(&self, ctx: &AppContext, job_id: &str) -> Result<JobRecord> {
        let rows: Vec<JobRecord> = self.get(
            endpoints::PRINT_DATA,
            &[("jobID", job_id.to_string())],
            Some(ctx.token()),
        )?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(job_id.to_string()))
    }

    fn create_job(&self, ctx: &AppContext, draft: &JobDraft) -> Result<MessageResponse> {
        self.post(endpoints::INSERT, draft, Some(ctx.token()))
    }

    fn update_job(&self, ctx: &AppContext, draft: &JobDraft) -> Result<MessageResponse> {
        self.post(endpoints::EDIT_JOB, draft, Some(ctx.token()))
    }

    fn delete_job(&self, ctx: &AppContext, job_id: &str) -> Result<MessageResponse> {
        let body = DeleteJobRequest {
            job_id,
            position: &ctx.session().position,
        };
        self.post(endpoints::DELETE_JOB, &body, Some(ctx.token()))
    }

    fn list_pickers(&self, ctx: &AppContext) -> Result<PickerList> {
        self.get(endpoints::PICKERS, &[], Some(ctx.token()))
    }

    fn last_job_id(&self, ctx: &AppContext) -> Result<String> {
        let last: LastJobId = self.get(endpoints::LAST_JOB_ID, &[], Some(ctx.token()))?;
        Ok(last.job_id)
    }

    fn insights(&self, ctx: &AppContext, query: &InsightQuery) -> Result<Vec<InsightRow>> {
        self.get(endpoints::INSIGHT, &query.to_query_pairs(), Some(ctx.token()))
    }

    fn pickers_by_category(
        &self,
        ctx: &AppContext,
        category: PickerCategory,
    ) -> Result<Vec<String>> {
        let values: Vec<Value> = self.get(
            endpoints::PICKERS_LIST,
            &[("menuSelected", category.as_str().to_string())],
            Some(ctx.token()),
        )?;
        Ok(values.into_iter().map(picker_name).collect())
    }

    fn insert_picker(
        &self,
        ctx: &AppContext,
        category: PickerCategory,
        name: &str,
    ) -> Result<MessageResponse> {
        let body = PickerRequest {
            menu_selected: category,
            picker_name: name,
            position: &ctx.session().position,
        };
        self.post(endpoints::INSERT_PICKER, &body, Some(ctx.token()))
    }

    fn update_picker(
        &self,
        ctx: &AppContext,
        category: PickerCategory,
        old_name: &str,
        new_name: &str,
    ) -> Result<MessageResponse> {
        let body = RenamePickerRequest {
            menu_selected: category,
            old_picker: old_name,
            new_picker: new_name,
            position: &ctx.session().position,
        };
        self.post(endpoints::EDIT_PICKER, &body, Some(ctx.token()))
    }

    fn delete_picker(
        &self,
        ctx: &AppContext,
        category: PickerCategory,
        name: &str,
    ) -> Result<MessageResponse> {
        let body = PickerRequest {
            menu_selected: category,
            picker_name: name,
            position: &ctx.session().position,
        };
        self.post(endpoints::DELETE_PICKER, &body, Some(ctx.token()))
    }

    fn list_users(&self, ctx: &AppContext) -> Result<Vec<UserSummary>> {
        // A non-array body means "no users".
        let value: Value = self.get(endpoints::USER_LIST, &[], Some(ctx.token()))?;
        if !value.is_array() {
            return Ok(Vec::new());
        }
        serde_json::from_value(value).map_err(|e| ApiError::Decode {
            path: endpoints::USER_LIST.to_string(),
            reason: e.to_string(),
        })
    }

    fn create_user(&self, ctx: &AppContext, request: &CreateUserRequest) -> Result<MessageResponse> {
        self.post(endpoints::CREATE_USER, request, Some(ctx.token()))
    }

    fn reset_password(&self, ctx: &AppContext, action: &UserAction) -> Result<MessageResponse> {
        self.post(endpoints::RESET_PASSWORD, action, Some(ctx.token()))
    }

    fn delete_user(&self, ctx: &AppContext, action: &UserAction) -> Result<MessageResponse> {
        self.post(endpoints::DELETE_USER, action, Some(ctx.token()))
    }

    fn change_password(
        &self,
        ctx: &AppContext,
        kind: PasswordKind,
        request: &ChangePasswordRequest,
    ) -> Result<MessageResponse> {
        let path = match kind {
            PasswordKind::Login => endpoints::CHANGE_PASSWORD,
            PasswordKind::Transaction => endpoints::CHANGE_TRANSACTION_PASSWORD,
        };
        self.post(path, request, Some(ctx.token()))
    }
}

/// Picker rows arrive as plain strings; tolerate scalars too.
fn picker_name(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
