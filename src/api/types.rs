use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::editor::Language;
use crate::telemetry::{FocusEvent, KeyStroke};

/// Body of `POST /api/v1/submissions`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionRequest {
    pub problem_id: String,
    /// Base64 of the UTF-8 source.
    pub code: String,
    pub language: Language,
    pub key_strokes: Vec<KeyStroke>,
    pub focus_events: Vec<FocusEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub String);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubmissionId {
    fn from(s: &str) -> Self {
        SubmissionId(s.to_string())
    }
}

/// The server reports `response_code` as a number, older builds as a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ResponseCode {
    Number(u16),
    Text(String),
}

impl ResponseCode {
    pub fn as_u16(&self) -> Option<u16> {
        match self {
            ResponseCode::Number(n) => Some(*n),
            ResponseCode::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Reply to a submission POST. Either carries an id or a coded message.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitReply {
    pub response_code: Option<ResponseCode>,
    pub message: Option<String>,
    pub submission_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusInfo {
    pub id: u32,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmissionStatus {
    pub status: StatusInfo,
    #[serde(default, deserialize_with = "lenient_number")]
    pub time: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub memory: Option<f64>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
    #[serde(default)]
    pub number_of_passed_test_cases: Option<u32>,
}

impl SubmissionStatus {
    /// Status id 0 is the judge's "still in queue" sentinel.
    pub fn is_pending(&self) -> bool {
        self.status.id == 0
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusEnvelope {
    pub data: SubmissionStatus,
}

/// Accepts `12`, `"0.012"` or null.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    Ok(
        match Option::<NumberOrText>::deserialize(deserializer)? {
            Some(NumberOrText::Number(n)) => Some(n),
            Some(NumberOrText::Text(s)) => s.trim().parse().ok(),
            None => None,
        },
    )
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UniversityDetails {
    #[serde(default, deserialize_with = "key_present")]
    pub student_id: Option<Value>,
    #[serde(default, deserialize_with = "key_present")]
    pub university_roll_number: Option<Value>,
}

impl UniversityDetails {
    /// A key counts once it is sent, whatever its value.
    pub fn has_identifier(&self) -> bool {
        self.student_id.is_some() || self.university_roll_number.is_some()
    }
}

/// Keeps a sent `null` apart from a missing key: only the latter stays `None`.
fn key_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "key_present")]
    pub university_details: Option<Option<UniversityDetails>>,
}

impl UserProfile {
    /// The user endpoint wraps the profile in `{response_code, data}`; bare
    /// profiles are accepted too.
    pub fn from_reply(reply: Value) -> serde_json::Result<Self> {
        match reply {
            Value::Object(mut map) if matches!(map.get("data"), Some(Value::Object(_))) => {
                serde_json::from_value(map.remove("data").unwrap_or_default())
            }
            other => serde_json::from_value(other),
        }
    }

    /// Incomplete only when `university_details` or both identifiers are
    /// missing outright. A `null` details object is not treated as missing.
    pub fn is_complete(&self) -> bool {
        match &self.university_details {
            None => false,
            Some(None) => true,
            Some(Some(details)) => details.has_identifier(),
        }
    }
}

/// Fields of the profile-completion form, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpload {
    pub student_id: String,
    pub photo: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_accepts_numeric_strings() {
        let status: SubmissionStatus = serde_json::from_value(json!({
            "status": {"id": 3, "description": "Accepted"},
            "time": "0.012",
            "memory": 1024,
            "stdout": null
        }))
        .unwrap();
        assert_eq!(status.time, Some(0.012));
        assert_eq!(status.memory, Some(1024.0));
        assert_eq!(status.stdout, None);
        assert!(!status.is_pending());
    }

    #[test]
    fn status_missing_fields_default_to_none() {
        let status: SubmissionStatus =
            serde_json::from_value(json!({"status": {"id": 0, "description": "In Queue"}}))
                .unwrap();
        assert!(status.is_pending());
        assert_eq!(status.time, None);
        assert_eq!(status.number_of_passed_test_cases, None);
    }

    #[test]
    fn response_code_reads_numbers_and_strings() {
        let a: SubmitReply =
            serde_json::from_value(json!({"response_code": 429, "message": "wait"})).unwrap();
        let b: SubmitReply =
            serde_json::from_value(json!({"response_code": "429", "message": "wait"})).unwrap();
        assert_eq!(a.response_code.unwrap().as_u16(), Some(429));
        assert_eq!(b.response_code.unwrap().as_u16(), Some(429));
    }

    #[test]
    fn profile_completeness() {
        let cases = [
            (json!({}), false),
            (json!({"university_details": null}), true),
            (json!({"university_details": {}}), false),
            (json!({"university_details": {"student_id": null}}), true),
            (json!({"university_details": {"student_id": ""}}), true),
            (json!({"university_details": {"university_roll_number": null}}), true),
            (json!({"university_details": {"student_id": "S-1"}}), true),
            (json!({"university_details": {"student_id": 1234}}), true),
            (json!({"university_details": {"university_roll_number": "R9"}}), true),
        ];
        for (body, complete) in cases {
            let profile = UserProfile::from_reply(body.clone()).unwrap();
            assert_eq!(profile.is_complete(), complete, "{body}");
        }
    }

    #[test]
    fn profile_is_read_from_data_envelope() {
        let reply = json!({
            "response_code": 200,
            "data": {"university_details": {"student_id": "S-1"}}
        });
        assert!(UserProfile::from_reply(reply).unwrap().is_complete());

        let reply = json!({"response_code": 200, "data": {"name": "x"}});
        assert!(!UserProfile::from_reply(reply).unwrap().is_complete());
    }

    #[test]
    fn request_serializes_snake_case() {
        let req = SubmissionRequest {
            problem_id: "p1".into(),
            code: "cHJpbnQoMSk=".into(),
            language: Language::Python,
            key_strokes: vec![],
            focus_events: vec![],
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(
            v,
            json!({
                "problem_id": "p1",
                "code": "cHJpbnQoMSk=",
                "language": "python",
                "key_strokes": [],
                "focus_events": []
            })
        );
    }
}
