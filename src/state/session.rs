/// The open form
///
/// Owns everything the user has entered, the current photo and the feedback
/// modal. Submission goes through a request/result exchange: `request_submit`
/// hands out an `Attempt` to run, and every step result comes back through
/// `on_step`. The session never runs pipeline code itself.

use tracing::{info, warn};

use super::feedback::Feedback;
use super::image::{ImageFile, ImageSelection};
use super::record::{FieldValue, Record};
use super::schema::FieldName;
use crate::error::InvalidMediaType;
use crate::submission::{Attempt, Phase, SubmissionRequest};

pub const SUCCESS_MESSAGE: &str = "Form submitted successfully!";

#[derive(Debug, Default)]
pub struct FormSession {
    record: Record,
    image: ImageSelection,
    feedback: Feedback,
    phase: Phase,
}

impl FormSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn image(&self) -> Option<&ImageFile> {
        self.image.current()
    }

    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// An attempt is running; submit must stay disabled
    pub fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    pub fn set_field(&mut self, name: FieldName, value: FieldValue) {
        self.record.set_field(name, value);
    }

    /// Rejected files leave the current selection and phase untouched
    pub fn select_image(&mut self, file: ImageFile) -> Result<(), InvalidMediaType> {
        self.image.select(file)
    }

    /// Start a new attempt from a snapshot of the form.
    ///
    /// Returns `None` while another attempt is still running.
    pub fn request_submit(&mut self) -> Option<Attempt> {
        if self.is_busy() {
            warn!("Submit ignored, an attempt is already running");
            return None;
        }

        let request = SubmissionRequest {
            record: self.record.clone(),
            image: self.image.current().cloned(),
        };
        let attempt = Attempt::start(request);
        self.phase = attempt.phase();
        Some(attempt)
    }

    /// Record the result of a pipeline step.
    ///
    /// Returns the attempt to run next, or `None` once it has finished,
    /// at which point the feedback modal shows the outcome.
    pub fn on_step(&mut self, attempt: Attempt) -> Option<Attempt> {
        self.phase = attempt.phase();

        if !attempt.is_terminal() {
            return Some(attempt);
        }

        self.feedback = feedback_for(&attempt);
        if let Attempt::Succeeded(envelope) = &attempt {
            info!("Submission {} complete", envelope.id());
        }
        None
    }

    pub fn dismiss_feedback(&mut self) {
        self.feedback.dismiss();
    }
}

/// Feedback for a finished attempt; hidden while it is still running
pub fn feedback_for(attempt: &Attempt) -> Feedback {
    match attempt {
        Attempt::Succeeded(_) => Feedback::Success(SUCCESS_MESSAGE.to_string()),
        Attempt::Failed(failure) => Feedback::Error(failure.user_message().to_string()),
        _ => Feedback::Hidden,
    }
}
