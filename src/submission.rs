use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::api::{JudgeApi, SubmissionId, SubmissionRequest};
use crate::editor::Language;
use crate::error::{ClientError, Result};
use crate::telemetry::TelemetrySnapshot;

/// Whether whitespace-only code is refused before any request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankCodePolicy {
    Reject,
    Allow,
}

impl From<bool> for BlankCodePolicy {
    fn from(reject: bool) -> Self {
        if reject {
            BlankCodePolicy::Reject
        } else {
            BlankCodePolicy::Allow
        }
    }
}

/// Text-safe transport encoding: base64 of the UTF-8 bytes.
pub fn encode_code(code: &str) -> String {
    STANDARD.encode(code.as_bytes())
}

/// Validates the code and packages it with the telemetry gathered so far.
pub fn prepare_submission(
    problem_id: &str,
    code: &str,
    language: Language,
    telemetry: TelemetrySnapshot,
    policy: BlankCodePolicy,
) -> Result<SubmissionRequest> {
    if policy == BlankCodePolicy::Reject && code.trim().is_empty() {
        return Err(ClientError::BlankCode);
    }

    Ok(SubmissionRequest {
        problem_id: problem_id.to_string(),
        code: encode_code(code),
        language,
        key_strokes: telemetry.key_strokes,
        focus_events: telemetry.focus_events,
    })
}

/// Sends a prepared submission and returns the id to poll.
pub async fn submit(api: &dyn JudgeApi, request: &SubmissionRequest) -> Result<SubmissionId> {
    tracing::info!(
        problem_id = %request.problem_id,
        language = %request.language,
        key_strokes = request.key_strokes.len(),
        focus_events = request.focus_events.len(),
        "submitting code"
    );
    let id = api.create_submission(request).await?;
    tracing::info!(submission_id = %id, "submission accepted");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn encodes_utf8_as_base64() {
        assert_eq!(encode_code("print(1)"), "cHJpbnQoMSk=");
        assert_eq!(encode_code("é"), "w6k=");
        assert_eq!(encode_code(""), "");
    }

    #[test]
    fn blank_code_is_rejected() {
        let result = prepare_submission(
            "p1",
            "  \n\t ",
            Language::Python,
            TelemetrySnapshot::default(),
            BlankCodePolicy::Reject,
        );
        assert_matches!(result, Err(ClientError::BlankCode));
    }

    #[test]
    fn blank_code_passes_when_allowed() {
        let req = prepare_submission(
            "p1",
            "   ",
            Language::C,
            TelemetrySnapshot::default(),
            BlankCodePolicy::Allow,
        )
        .unwrap();
        assert_eq!(req.code, "ICAg");
    }

    #[test]
    fn request_carries_telemetry_and_language() {
        use crate::telemetry::TelemetryRecorder;
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

        let mut rec = TelemetryRecorder::new();
        rec.record_key(&KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        let req = prepare_submission(
            "two-sum",
            "x",
            Language::Cpp,
            rec.snapshot(),
            BlankCodePolicy::Reject,
        )
        .unwrap();
        assert_eq!(req.problem_id, "two-sum");
        assert_eq!(req.language, Language::Cpp);
        assert_eq!(req.key_strokes.len(), 1);
        assert!(req.focus_events.is_empty());
    }
}
