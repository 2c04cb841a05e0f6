//! The judge's HTTP surface as seen by the client.

mod http;
pub mod scripted;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;

pub use http::HttpJudgeClient;
pub use types::{
    ProfileUpload, SubmissionId, SubmissionRequest, SubmissionStatus, UserProfile,
};

/// Remote judge operations. Implemented over HTTP in production and by
/// scripted fakes in tests.
#[async_trait]
pub trait JudgeApi: Send + Sync {
    /// `GET /api/v1/user`
    async fn fetch_profile(&self) -> Result<UserProfile>;

    /// `POST /api/v1/user/university-details` (multipart)
    async fn complete_profile(&self, upload: &ProfileUpload) -> Result<()>;

    /// `POST /api/v1/submissions`
    async fn create_submission(&self, request: &SubmissionRequest) -> Result<SubmissionId>;

    /// `GET /api/v1/submissions/:id`
    async fn fetch_status(&self, id: &SubmissionId) -> Result<SubmissionStatus>;
}
