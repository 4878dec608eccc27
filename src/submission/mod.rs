/// Submission pipeline
///
/// One submit produces one `Attempt`, which moves through
/// Validating -> (Uploading) -> Persisting -> Succeeded | Failed.
/// Each variant carries exactly the data its phase needs, so an attempt
/// cannot reach Persisting without a validated record, and the envelope
/// written to the document store cannot be built anywhere but here.

pub mod orchestrator;

use serde_json::Value;

use crate::error::SubmissionFailure;
use crate::state::image::ImageFile;
use crate::state::record::Record;
use crate::store::Document;

pub use orchestrator::{Orchestrator, SubmissionSettings};

/// Snapshot of the form taken when the user pressed submit
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub record: Record,
    pub image: Option<ImageFile>,
}

/// Validated record waiting for its photo to be uploaded
#[derive(Debug, Clone)]
pub struct PendingUpload {
    id: String,
    record: Record,
    image: ImageFile,
}

/// The finalized payload handed to the document store.
/// Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionEnvelope {
    id: String,
    record: Record,
    image_url: String,
}

impl SubmissionEnvelope {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Public locator of the uploaded photo, empty if none was attached
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Record fields plus `id` and `imageUrl`
    pub fn to_document(&self) -> Document {
        let mut document = self.record.to_document();
        document.insert("id".to_string(), Value::String(self.id.clone()));
        document.insert("imageUrl".to_string(), Value::String(self.image_url.clone()));
        document
    }
}

/// Coarse pipeline state, as shown by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    Uploading,
    Persisting,
    Succeeded,
    Failed,
}

impl Phase {
    /// Whether an attempt is still running
    pub fn is_busy(self) -> bool {
        matches!(self, Phase::Validating | Phase::Uploading | Phase::Persisting)
    }
}

/// One submission attempt
#[derive(Debug, Clone)]
pub enum Attempt {
    Validating(SubmissionRequest),
    Uploading(PendingUpload),
    Persisting(SubmissionEnvelope),
    Succeeded(SubmissionEnvelope),
    Failed(SubmissionFailure),
}

impl Attempt {
    pub fn start(request: SubmissionRequest) -> Self {
        Attempt::Validating(request)
    }

    pub fn phase(&self) -> Phase {
        match self {
            Attempt::Validating(_) => Phase::Validating,
            Attempt::Uploading(_) => Phase::Uploading,
            Attempt::Persisting(_) => Phase::Persisting,
            Attempt::Succeeded(_) => Phase::Succeeded,
            Attempt::Failed(_) => Phase::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Attempt::Succeeded(_) | Attempt::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::record::FieldValue;
    use crate::state::schema::FieldName;

    #[test]
    fn test_envelope_document() {
        let mut record = Record::default();
        record.set_field(FieldName::NameBangla, FieldValue::Text("জন".into()));
        record.set_field(FieldName::Option2, FieldValue::Bool(true));

        let envelope = SubmissionEnvelope {
            id: "abc".into(),
            record,
            image_url: String::new(),
        };
        let document = envelope.to_document();

        assert_eq!(document["id"], "abc");
        assert_eq!(document["imageUrl"], "");
        assert_eq!(document["nameBangla"], "জন");
        assert_eq!(document["option2"], true);
        assert_eq!(document.len(), 4);
    }

    #[test]
    fn test_busy_phases() {
        assert!(!Phase::Idle.is_busy());
        assert!(Phase::Validating.is_busy());
        assert!(Phase::Uploading.is_busy());
        assert!(Phase::Persisting.is_busy());
        assert!(!Phase::Succeeded.is_busy());
        assert!(!Phase::Failed.is_busy());
    }
}
