use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::types::StatusInfo;
use super::{JudgeApi, ProfileUpload, SubmissionId, SubmissionRequest, SubmissionStatus, UserProfile};
use crate::error::{ClientError, Result};

/// One canned reply.
#[derive(Debug, Clone)]
pub enum Scripted<T> {
    Reply(T),
    RateLimited(String),
    Fail(u16, String),
}

impl<T> Scripted<T> {
    fn into_result(self) -> Result<T> {
        match self {
            Scripted::Reply(v) => Ok(v),
            Scripted::RateLimited(message) => Err(ClientError::RateLimited(message)),
            Scripted::Fail(status, message) => Err(ClientError::Http { status, message }),
        }
    }
}

/// In-memory judge that replays queued replies and records what it was sent.
/// Used by headless runs and tests.
#[derive(Debug)]
pub struct ScriptedJudge {
    profile: Mutex<Scripted<UserProfile>>,
    upload: Mutex<Scripted<()>>,
    submissions: Mutex<VecDeque<Scripted<SubmissionId>>>,
    statuses: Mutex<VecDeque<Scripted<SubmissionStatus>>>,
    sent: Mutex<Vec<SubmissionRequest>>,
    uploads: Mutex<Vec<ProfileUpload>>,
    status_calls: AtomicUsize,
}

impl ScriptedJudge {
    pub fn new() -> Self {
        Self {
            profile: Mutex::new(Scripted::Reply(UserProfile::default())),
            upload: Mutex::new(Scripted::Reply(())),
            submissions: Mutex::new(VecDeque::new()),
            statuses: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            status_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_profile(self, reply: Scripted<UserProfile>) -> Self {
        *lock(&self.profile) = reply;
        self
    }

    pub fn with_upload(self, reply: Scripted<()>) -> Self {
        *lock(&self.upload) = reply;
        self
    }

    pub fn push_submission(&self, reply: Scripted<SubmissionId>) {
        lock(&self.submissions).push_back(reply);
    }

    pub fn push_status(&self, reply: Scripted<SubmissionStatus>) {
        lock(&self.statuses).push_back(reply);
    }

    pub fn sent(&self) -> Vec<SubmissionRequest> {
        lock(&self.sent).clone()
    }

    pub fn uploads(&self) -> Vec<ProfileUpload> {
        lock(&self.uploads).clone()
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedJudge {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A status with the given id and description and nothing else filled in.
pub fn status(id: u32, description: &str) -> SubmissionStatus {
    SubmissionStatus {
        status: StatusInfo {
            id,
            description: description.to_string(),
        },
        time: None,
        memory: None,
        stdout: None,
        stderr: None,
        compile_output: None,
        number_of_passed_test_cases: None,
    }
}

#[async_trait]
impl JudgeApi for ScriptedJudge {
    async fn fetch_profile(&self) -> Result<UserProfile> {
        lock(&self.profile).clone().into_result()
    }

    async fn complete_profile(&self, upload: &ProfileUpload) -> Result<()> {
        lock(&self.uploads).push(upload.clone());
        lock(&self.upload).clone().into_result()
    }

    async fn create_submission(&self, request: &SubmissionRequest) -> Result<SubmissionId> {
        lock(&self.sent).push(request.clone());
        lock(&self.submissions)
            .pop_front()
            .unwrap_or_else(|| Scripted::Fail(500, "no submission scripted".into()))
            .into_result()
    }

    /// Once the queue runs dry the judge reports "Processing" forever.
    async fn fetch_status(&self, _id: &SubmissionId) -> Result<SubmissionStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.statuses)
            .pop_front()
            .unwrap_or_else(|| Scripted::Reply(status(0, "Processing")))
            .into_result()
    }
}
