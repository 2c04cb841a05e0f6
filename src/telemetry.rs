//! Typing telemetry attached to every submission.
//!
//! Keystrokes are recorded only while the terminal has focus. A focus loss
//! followed by a regain produces one [`FocusEvent`]. Both logs only grow;
//! they live as long as the session that owns the recorder.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde::{Serialize, Serializer};

fn serialize_instant<S: Serializer>(t: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&t.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyStroke {
    pub key: String,
    #[serde(serialize_with = "serialize_instant")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusEvent {
    #[serde(serialize_with = "serialize_instant")]
    pub focus_out: DateTime<Utc>,
    #[serde(serialize_with = "serialize_instant")]
    pub focus_in: DateTime<Utc>,
}

/// Copy of both logs taken at submission time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetrySnapshot {
    pub key_strokes: Vec<KeyStroke>,
    pub focus_events: Vec<FocusEvent>,
}

#[derive(Debug)]
pub struct TelemetryRecorder {
    key_strokes: Vec<KeyStroke>,
    focus_events: Vec<FocusEvent>,
    focus_lost_at: Option<DateTime<Utc>>,
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self {
            key_strokes: Vec::new(),
            focus_events: Vec::new(),
            focus_lost_at: None,
        }
    }

    pub fn has_focus(&self) -> bool {
        self.focus_lost_at.is_none()
    }

    pub fn record_key(&mut self, key: &KeyEvent) {
        self.record_key_at(key, Utc::now());
    }

    pub fn record_key_at(&mut self, key: &KeyEvent, at: DateTime<Utc>) {
        if key.kind != KeyEventKind::Press || !self.has_focus() {
            return;
        }
        if let Some(name) = key_name(key) {
            self.key_strokes.push(KeyStroke {
                key: name,
                timestamp: at,
            });
        }
    }

    pub fn focus_lost(&mut self) {
        self.focus_lost_at(Utc::now());
    }

    /// Only the first loss of a blur/focus cycle counts.
    pub fn focus_lost_at(&mut self, at: DateTime<Utc>) {
        if self.focus_lost_at.is_none() {
            self.focus_lost_at = Some(at);
        }
    }

    pub fn focus_gained(&mut self) {
        self.focus_gained_at(Utc::now());
    }

    pub fn focus_gained_at(&mut self, at: DateTime<Utc>) {
        if let Some(focus_out) = self.focus_lost_at.take() {
            // timestamps go out at millisecond precision; keep the pair ordered
            let focus_in = at.max(focus_out + Duration::milliseconds(1));
            self.focus_events.push(FocusEvent {
                focus_out,
                focus_in,
            });
        }
    }

    pub fn key_strokes(&self) -> &[KeyStroke] {
        &self.key_strokes
    }

    pub fn focus_events(&self) -> &[FocusEvent] {
        &self.focus_events
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            key_strokes: self.key_strokes.clone(),
            focus_events: self.focus_events.clone(),
        }
    }
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a terminal key to the name a browser would report for it, so the
/// server sees one vocabulary regardless of client.
pub fn key_name(key: &KeyEvent) -> Option<String> {
    let name = match key.code {
        KeyCode::Char(c) => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                c.to_uppercase().to_string()
            } else {
                c.to_string()
            }
        }
        KeyCode::Enter => "Enter".into(),
        KeyCode::Tab => "Tab".into(),
        KeyCode::BackTab => "Tab".into(),
        KeyCode::Backspace => "Backspace".into(),
        KeyCode::Delete => "Delete".into(),
        KeyCode::Esc => "Escape".into(),
        KeyCode::Left => "ArrowLeft".into(),
        KeyCode::Right => "ArrowRight".into(),
        KeyCode::Up => "ArrowUp".into(),
        KeyCode::Down => "ArrowDown".into(),
        KeyCode::Home => "Home".into(),
        KeyCode::End => "End".into(),
        KeyCode::PageUp => "PageUp".into(),
        KeyCode::PageDown => "PageDown".into(),
        KeyCode::Insert => "Insert".into(),
        KeyCode::F(n) => format!("F{n}"),
        _ => return None,
    };
    Some(name)
}
