//! Profile gate: a blocking form shown until the user's university details
//! are on file.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::{JudgeApi, ProfileUpload};
use crate::error::{ClientError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Complete,
    ShowForm,
    /// The check itself failed; the gate stays closed.
    Skipped,
}

pub async fn check_profile(api: &dyn JudgeApi) -> GateDecision {
    match api.fetch_profile().await {
        Ok(profile) if profile.is_complete() => GateDecision::Complete,
        Ok(_) => {
            tracing::info!("profile is missing university details");
            GateDecision::ShowForm
        }
        Err(err) => {
            tracing::warn!(error = %err, "profile check failed, not prompting");
            GateDecision::Skipped
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    StudentId,
    Photo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    None,
    Submit,
}

#[derive(Debug, Clone)]
pub struct ProfileForm {
    pub student_id: String,
    pub photo_path: String,
    pub focus: FormField,
    pub error: Option<String>,
    pub submitting: bool,
}

impl ProfileForm {
    pub fn new() -> Self {
        Self {
            student_id: String::new(),
            photo_path: String::new(),
            focus: FormField::StudentId,
            error: None,
            submitting: false,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::StudentId => &mut self.student_id,
            FormField::Photo => &mut self.photo_path,
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FormField::StudentId => FormField::Photo,
            FormField::Photo => FormField::StudentId,
        };
    }

    /// Keys are ignored while an upload is in flight.
    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        if self.submitting
            || key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return FormAction::None;
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => self.toggle_focus(),
            KeyCode::Enter => match self.focus {
                FormField::StudentId => self.focus = FormField::Photo,
                FormField::Photo => return FormAction::Submit,
            },
            KeyCode::Backspace => {
                self.focused_mut().pop();
            }
            KeyCode::Char(c) => self.focused_mut().push(c),
            _ => {}
        }
        FormAction::None
    }

    pub fn validate(&self) -> Result<ProfileUpload> {
        let student_id = self.student_id.trim();
        if student_id.is_empty() {
            return Err(ClientError::InvalidProfileForm(
                "Student ID is required.".into(),
            ));
        }

        let photo = self.photo_path.trim();
        if photo.is_empty() {
            return Err(ClientError::InvalidProfileForm(
                "A photo is required.".into(),
            ));
        }
        let photo = PathBuf::from(photo);
        if !photo.is_file() {
            return Err(ClientError::InvalidProfileForm(format!(
                "Photo not found: {}",
                photo.display()
            )));
        }

        Ok(ProfileUpload {
            student_id: student_id.to_string(),
            photo,
        })
    }

    pub fn begin_submit(&mut self) {
        self.submitting = true;
        self.error = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.submitting = false;
        self.error = Some(message.into());
    }
}

impl Default for ProfileForm {
    fn default() -> Self {
        Self::new()
    }
}
