//! Contact form: field validation and the simulated send.
//!
//! Nothing is transmitted. A valid submit shows a "sending" status, and after
//! `submit_delay_ms` the flow completes with a thank-you status and asks the
//! host to reset the form.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// Counted in UTF-16 code units, like a browser string's `length`.
pub const MIN_MESSAGE_CHARS: usize = 10;

pub const STATUS_SENDING: &str = "Sending...";
pub const STATUS_SENT: &str = "Thanks! Your message has been sent.";
pub const SENT_COLOR: &str = "var(--success)";

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Message];

    /// Element id of the field's input.
    pub fn id(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
        }
    }
}

/// Inline error shown under a field. `Display` is the user-facing text.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum FieldError {
    #[error("Please enter your name.")]
    MissingName,
    #[error("Enter a valid email.")]
    InvalidEmail,
    #[error("Message should be at least 10 characters.")]
    MessageTooShort,
}

impl FieldError {
    pub fn field(self) -> Field {
        match self {
            FieldError::MissingName => Field::Name,
            FieldError::InvalidEmail => Field::Email,
            FieldError::MessageTooShort => Field::Message,
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Submitted values, trimmed on construction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    pub fn new(name: &str, email: &str, message: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            message: message.trim().to_string(),
        }
    }

    pub fn validate(&self) -> FieldReport {
        let name = self.name.is_empty().then_some(FieldError::MissingName);
        let email = (!is_valid_email(&self.email)).then_some(FieldError::InvalidEmail);
        let message = (self.message.encode_utf16().count() < MIN_MESSAGE_CHARS)
            .then_some(FieldError::MessageTooShort);
        FieldReport {
            name,
            email,
            message,
        }
    }
}

/// Per-field outcome. Every field is reported so stale errors get cleared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldReport {
    pub name: Option<FieldError>,
    pub email: Option<FieldError>,
    pub message: Option<FieldError>,
}

impl FieldReport {
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn get(&self, field: Field) -> Option<FieldError> {
        match field {
            Field::Name => self.name,
            Field::Email => self.email,
            Field::Message => self.message,
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = FieldError> + '_ {
        Field::ALL.into_iter().filter_map(|f| self.get(f))
    }

    /// `(field, error text)` for every field; empty text clears the error.
    pub fn messages(&self) -> Vec<(Field, String)> {
        Field::ALL
            .into_iter()
            .map(|f| (f, self.get(f).map(|e| e.to_string()).unwrap_or_default()))
            .collect()
    }
}

/// Status line update for the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitStatus {
    pub text: &'static str,
    /// CSS colour; None restores the stylesheet colour.
    pub color: Option<&'static str>,
    /// Host should reset the form fields.
    pub reset_form: bool,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum FlowState {
    Idle,
    Sending { since_ms: f64 },
}

/// Drives the simulated send.
#[derive(Debug)]
pub struct SubmissionFlow {
    delay_ms: f64,
    state: FlowState,
}

impl SubmissionFlow {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms,
            state: FlowState::Idle,
        }
    }

    pub fn is_sending(&self) -> bool {
        matches!(self.state, FlowState::Sending { .. })
    }

    /// Validate and, when valid, start sending. Invalid forms are blocked and
    /// the report says which fields to flag.
    pub fn submit(&mut self, form: &ContactForm, now_ms: f64) -> Result<SubmitStatus, FieldReport> {
        let report = form.validate();
        if !report.is_valid() {
            log::debug!("contact form blocked: {} invalid field(s)", report.errors().count());
            return Err(report);
        }
        self.state = FlowState::Sending { since_ms: now_ms };
        Ok(SubmitStatus {
            text: STATUS_SENDING,
            color: None,
            reset_form: false,
        })
    }

    /// When the send delay has elapsed, completes the flow.
    pub fn poll(&mut self, now_ms: f64) -> Option<SubmitStatus> {
        match self.state {
            FlowState::Sending { since_ms } if now_ms - since_ms >= self.delay_ms => {
                self.state = FlowState::Idle;
                Some(SubmitStatus {
                    text: STATUS_SENT,
                    color: Some(SENT_COLOR),
                    reset_form: true,
                })
            }
            _ => None,
        }
    }
}
