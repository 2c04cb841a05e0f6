use itertools::Itertools;

use crate::api::SubmissionStatus;

pub const NOT_AVAILABLE: &str = "N/A";

/// Styling bucket for a terminal result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    /// stderr carried output; takes precedence over the description
    Error,
    Accepted,
    Other,
}

/// A terminal status flattened into display strings.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPanel {
    pub kind: PanelKind,
    pub status: String,
    pub time: String,
    pub memory: String,
    pub passed_test_cases: Option<String>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
}

fn non_empty(s: &Option<String>) -> Option<String> {
    s.as_ref().filter(|s| !s.trim().is_empty()).cloned()
}

fn format_number(v: Option<f64>) -> String {
    match v {
        Some(v) if v.fract() == 0.0 => format!("{}", v as i64),
        Some(v) => format!("{v}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn classify(status: &SubmissionStatus) -> PanelKind {
    if non_empty(&status.stderr).is_some() {
        PanelKind::Error
    } else if status.status.description == "Accepted" {
        PanelKind::Accepted
    } else {
        PanelKind::Other
    }
}

impl ResultPanel {
    pub fn from_status(status: &SubmissionStatus) -> Self {
        Self {
            kind: classify(status),
            status: status.status.description.clone(),
            time: format_number(status.time),
            memory: format_number(status.memory),
            passed_test_cases: status.number_of_passed_test_cases.map(|n| n.to_string()),
            stdout: non_empty(&status.stdout),
            stderr: non_empty(&status.stderr),
            compile_output: non_empty(&status.compile_output),
        }
    }

    /// `Status: Accepted | Time: 12s | Memory: 1024KB`
    pub fn summary(&self) -> String {
        let with_unit = |value: &str, unit: &str| {
            if value == NOT_AVAILABLE {
                value.to_string()
            } else {
                format!("{value}{unit}")
            }
        };
        [
            Some(format!("Status: {}", self.status)),
            Some(format!("Time: {}", with_unit(&self.time, "s"))),
            Some(format!("Memory: {}", with_unit(&self.memory, "KB"))),
            self.passed_test_cases
                .as_ref()
                .map(|passed| format!("Passed test cases: {passed}")),
        ]
        .into_iter()
        .flatten()
        .join(" | ")
    }
}
