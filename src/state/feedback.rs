/// Feedback modal state

/// Modal severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// What the feedback modal is currently showing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Feedback {
    #[default]
    Hidden,
    Success(String),
    Error(String),
}

impl Feedback {
    /// Message and severity, if visible
    pub fn message(&self) -> Option<(&str, Severity)> {
        match self {
            Feedback::Hidden => None,
            Feedback::Success(text) => Some((text, Severity::Success)),
            Feedback::Error(text) => Some((text, Severity::Error)),
        }
    }

    pub fn dismiss(&mut self) {
        *self = Feedback::Hidden;
    }
}
