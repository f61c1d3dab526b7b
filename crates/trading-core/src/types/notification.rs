//! Rendered notification payload.

use serde::{Deserialize, Serialize};

/// A message rendered for every channel: email channels use `subject` and
/// `html_body`, chat channels use `text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub subject: String,
    pub html_body: String,
    pub text: String,
}

impl Notification {
    pub fn new(
        subject: impl Into<String>,
        html_body: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            html_body: html_body.into(),
            text: text.into(),
        }
    }
}
