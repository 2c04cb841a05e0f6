use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, COOKIE};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{StatusEnvelope, SubmitReply};
use super::{JudgeApi, ProfileUpload, SubmissionId, SubmissionRequest, SubmissionStatus, UserProfile};
use crate::error::{ClientError, Result};

const RATE_LIMITED: u16 = 429;

/// HTTP client for the judge's `/api/v1` endpoints.
#[derive(Debug, Clone)]
pub struct HttpJudgeClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
    session_cookie: Option<String>,
}

impl HttpJudgeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(30),
            session_cookie: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Value of the `session` cookie issued by the judge's login flow.
    pub fn with_session(mut self, cookie: Option<String>) -> Self {
        self.session_cookie = cookie.filter(|c| !c.is_empty());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn prepare(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder
            .header(ACCEPT, "application/json")
            .timeout(self.timeout);
        match &self.session_cookie {
            Some(cookie) => builder.header(COOKIE, format!("session={cookie}")),
            None => builder,
        }
    }
}

/// Reads the body and maps non-2xx replies onto [`ClientError`].
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited(message));
        }
        tracing::error!(status = status.as_u16(), %message, "judge request failed");
        return Err(ClientError::Http {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

#[async_trait]
impl JudgeApi for HttpJudgeClient {
    async fn fetch_profile(&self) -> Result<UserProfile> {
        let response = self
            .prepare(self.client.get(self.url("/api/v1/user")))
            .send()
            .await?;
        let reply: Value = decode(response).await?;
        Ok(UserProfile::from_reply(reply)?)
    }

    async fn complete_profile(&self, upload: &ProfileUpload) -> Result<()> {
        let bytes = tokio::fs::read(&upload.photo).await?;
        let file_name = upload
            .photo
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        let form = Form::new()
            .text("student_id", upload.student_id.clone())
            .part("student_photo", Part::bytes(bytes).file_name(file_name));

        let response = self
            .prepare(
                self.client
                    .post(self.url("/api/v1/user/university-details"))
                    .multipart(form),
            )
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Http {
            status: status.as_u16(),
            message: error_message(&body).unwrap_or_else(|| "Could not save your profile.".into()),
        })
    }

    async fn create_submission(&self, request: &SubmissionRequest) -> Result<SubmissionId> {
        let response = self
            .prepare(self.client.post(self.url("/api/v1/submissions")).json(request))
            .send()
            .await?;
        let reply: SubmitReply = decode(response).await?;

        if reply.response_code.as_ref().and_then(|c| c.as_u16()) == Some(RATE_LIMITED) {
            return Err(ClientError::RateLimited(reply.message.unwrap_or_default()));
        }

        reply
            .submission_id
            .filter(|id| !id.is_empty())
            .map(SubmissionId)
            .ok_or(ClientError::MissingSubmissionId)
    }

    async fn fetch_status(&self, id: &SubmissionId) -> Result<SubmissionStatus> {
        let response = self
            .prepare(
                self.client
                    .get(self.url(&format!("/api/v1/submissions/{id}"))),
            )
            .send()
            .await?;
        let envelope: StatusEnvelope = decode(response).await?;
        Ok(envelope.data)
    }
}
