//! REST collaborator for the timetable backend.
//!
//! [`TimetableApi`] is the seam the loader and the save reconciler talk to;
//! [`HttpTimetableApi`] implements it over HTTP using [`reqwest`].

use async_trait::async_trait;
use serde_json::Value;

use schoolgrid_core::normalize::{
    error_message_or_default, extract_record_id, try_normalize_list, DEFAULT_LIST_KEYS,
};
use schoolgrid_core::record::{AssignmentPayload, TimetableRecord};
use schoolgrid_core::types::{ClassInfo, ClassSubjectTeacher, DbId, GridContext, Period};

use crate::config::ClientConfig;
use crate::session::SessionHandle;

/// Errors from the timetable REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend reported a duplicate assignment (HTTP 409).
    #[error("Duplicate assignment: {message}")]
    Conflict { message: String },

    /// The backend returned any other non-2xx status.
    #[error("Backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// A 2xx body did not have the expected shape.
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl ApiError {
    /// Text suitable for showing to the person editing the timetable.
    pub fn user_message(&self) -> String {
        match self {
            Self::Conflict { message } | Self::Rejected { message, .. } => message.clone(),
            Self::Request(_) | Self::UnexpectedShape(_) => {
                schoolgrid_core::normalize::GENERIC_ERROR_MESSAGE.to_string()
            }
        }
    }
}

#[async_trait]
pub trait TimetableApi: Send + Sync {
    /// `GET /classes`
    async fn list_classes(&self) -> Result<Vec<ClassInfo>, ApiError>;

    /// `GET /periods`
    async fn list_periods(&self) -> Result<Vec<Period>, ApiError>;

    /// `GET /class-subject-teachers`
    async fn list_associations(&self) -> Result<Vec<ClassSubjectTeacher>, ApiError>;

    /// Existing rows for a class or teacher timetable.
    async fn list_records(&self, context: GridContext) -> Result<Vec<TimetableRecord>, ApiError>;

    /// `POST /period-class-teacher-subject`. Returns the record id when the
    /// backend reports one.
    async fn upsert_assignment(
        &self,
        payload: &AssignmentPayload,
    ) -> Result<Option<DbId>, ApiError>;

    /// `DELETE /period-class-teacher-subject/:id`
    async fn delete_assignment(&self, record_id: DbId) -> Result<(), ApiError>;
}

/// Path of the existing-records endpoint for a context.
pub fn records_path(context: GridContext) -> String {
    match context {
        GridContext::Class(class_id) => format!("/period-class-teacher-subject/class/{class_id}"),
        GridContext::Teacher(teacher_id) => format!("/timetable-teacher/{teacher_id}"),
    }
}

/// Path of a single assignment row.
pub fn assignment_path(record_id: DbId) -> String {
    format!("/period-class-teacher-subject/{record_id}")
}

/// HTTP client for one timetable backend.
pub struct HttpTimetableApi {
    client: reqwest::Client,
    api_url: String,
    session: SessionHandle,
}

impl HttpTimetableApi {
    /// Build a client with the configured request timeout.
    pub fn new(config: &ClientConfig, session: SessionHandle) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config.api_url.clone(), session))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String, session: SessionHandle) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_list<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        tracing::debug!(path, "GET");
        let request = self.authorized(self.client.get(self.url(path))).await;
        let response = self.ensure_success(request.send().await?).await?;
        let body: Value = response.json().await?;
        try_normalize_list(body, DEFAULT_LIST_KEYS)
            .map_err(|e| ApiError::UnexpectedShape(format!("{path}: {e}")))
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Non-2xx responses are
    /// turned into [`ApiError::Conflict`] (409) or [`ApiError::Rejected`]
    /// with the message extracted from the body. A 401 also invalidates the
    /// session so the stale token is not sent again.
    async fn ensure_success(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.session.invalidate().await;
        }
        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str::<Value>(&text).ok();
        let message = error_message_or_default(body.as_ref());
        if status == reqwest::StatusCode::CONFLICT {
            return Err(ApiError::Conflict { message });
        }
        Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl TimetableApi for HttpTimetableApi {
    async fn list_classes(&self) -> Result<Vec<ClassInfo>, ApiError> {
        self.get_list("/classes").await
    }

    async fn list_periods(&self) -> Result<Vec<Period>, ApiError> {
        self.get_list("/periods").await
    }

    async fn list_associations(&self) -> Result<Vec<ClassSubjectTeacher>, ApiError> {
        self.get_list("/class-subject-teachers").await
    }

    async fn list_records(&self, context: GridContext) -> Result<Vec<TimetableRecord>, ApiError> {
        self.get_list(&records_path(context)).await
    }

    async fn upsert_assignment(
        &self,
        payload: &AssignmentPayload,
    ) -> Result<Option<DbId>, ApiError> {
        tracing::debug!(
            day = %payload.day,
            period_id = payload.period_id,
            confirm_duplicate = payload.confirm_duplicate,
            "POST assignment",
        );
        let request = self
            .client
            .post(self.url("/period-class-teacher-subject"))
            .json(payload);
        let response = self.authorized(request).await.send().await?;
        let response = self.ensure_success(response).await?;

        // An empty or non-JSON success body simply carries no id.
        let text = response.text().await?;
        Ok(serde_json::from_str::<Value>(&text)
            .ok()
            .as_ref()
            .and_then(extract_record_id))
    }

    async fn delete_assignment(&self, record_id: DbId) -> Result<(), ApiError> {
        tracing::debug!(record_id, "DELETE assignment");
        let request = self.client.delete(self.url(&assignment_path(record_id)));
        let response = self.authorized(request).await.send().await?;
        self.ensure_success(response).await?;
        Ok(())
    }
}
