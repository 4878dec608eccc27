use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::{Attempt, PendingUpload, SubmissionEnvelope, SubmissionRequest};
use crate::error::{StoreError, SubmissionFailure};
use crate::imaging::{self, CompressionLimits};
use crate::state::image::ImageFile;
use crate::store::{BlobStore, DocumentStore, IdGenerator};

/// Where and how submissions are stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionSettings {
    /// Document store collection
    pub collection: String,
    /// Blob key prefix for photos
    pub blob_prefix: String,
    pub limits: CompressionLimits,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            collection: "forms".to_string(),
            blob_prefix: "images".to_string(),
            limits: CompressionLimits::default(),
        }
    }
}

/// Drives submission attempts through the pipeline.
///
/// Cheap to clone; clones share the same backends.
#[derive(Clone)]
pub struct Orchestrator {
    blobs: Arc<dyn BlobStore>,
    documents: Arc<dyn DocumentStore>,
    ids: Arc<dyn IdGenerator>,
    settings: SubmissionSettings,
}

impl Orchestrator {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        documents: Arc<dyn DocumentStore>,
        ids: Arc<dyn IdGenerator>,
        settings: SubmissionSettings,
    ) -> Self {
        Self {
            blobs,
            documents,
            ids,
            settings,
        }
    }

    /// Run one step of the pipeline.
    ///
    /// Terminal attempts are returned unchanged. Every backend error ends
    /// the attempt in `Attempt::Failed`; nothing is retried.
    pub async fn advance(&self, attempt: Attempt) -> Attempt {
        let from = attempt.phase();
        let next = match attempt {
            Attempt::Validating(request) => self.validate(request),
            Attempt::Uploading(pending) => self.upload(pending).await,
            Attempt::Persisting(envelope) => self.persist(envelope).await,
            terminal => terminal,
        };

        debug!("Submission step {:?} -> {:?}", from, next.phase());
        next
    }

    fn validate(&self, request: SubmissionRequest) -> Attempt {
        let SubmissionRequest { record, image } = request;

        if let Some(field) = record.first_missing_required() {
            warn!("Submission rejected, required field {} is empty", field);
            return Attempt::Failed(SubmissionFailure::MissingRequiredField(field));
        }

        // One id per attempt: submission id and photo key
        let id = self.ids.next_id();
        info!("Submission {} validated", id);

        match image {
            Some(image) => Attempt::Uploading(PendingUpload { id, record, image }),
            None => Attempt::Persisting(SubmissionEnvelope {
                id,
                record,
                image_url: String::new(),
            }),
        }
    }

    async fn upload(&self, pending: PendingUpload) -> Attempt {
        let PendingUpload { id, record, image } = pending;

        let image = imaging::compress(image, self.settings.limits).await;
        let key = blob_key(&self.settings.blob_prefix, &id, &image);

        let blobs = Arc::clone(&self.blobs);
        let task_key = key.clone();
        let result = run_blocking(move || {
            blobs.put(&task_key, &image.bytes)?;
            blobs.resolve_locator(&task_key)
        })
        .await;

        match result {
            Ok(image_url) => {
                info!("Submission {} photo stored at {}", id, key);
                Attempt::Persisting(SubmissionEnvelope {
                    id,
                    record,
                    image_url,
                })
            }
            Err(err) => {
                error!("Submission {} photo upload to {} failed: {}", id, key, err);
                Attempt::Failed(SubmissionFailure::ImageUploadFailed(err.to_string()))
            }
        }
    }

    async fn persist(&self, envelope: SubmissionEnvelope) -> Attempt {
        let documents = Arc::clone(&self.documents);
        let collection = self.settings.collection.clone();
        let document = envelope.to_document();

        match run_blocking(move || documents.insert(&collection, &document)).await {
            Ok(document_id) => {
                info!(
                    "Submission {} stored in {} as {}",
                    envelope.id, self.settings.collection, document_id
                );
                Attempt::Succeeded(envelope)
            }
            Err(err) => {
                error!("Submission {} could not be stored: {}", envelope.id, err);
                if !envelope.image_url().is_empty() {
                    // The blob is left in place
                    warn!(
                        "Submission {} left an orphaned photo at {}",
                        envelope.id(),
                        envelope.image_url()
                    );
                }
                Attempt::Failed(SubmissionFailure::PersistenceFailed(err.to_string()))
            }
        }
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("settings", &self.settings)
            .finish()
    }
}

/// Storage key for a submission's photo: `<prefix>/<id>.<ext>`
pub fn blob_key(prefix: &str, id: &str, image: &ImageFile) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{}.{}", id, image.extension())
    } else {
        format!("{}/{}.{}", prefix, id, image.extension())
    }
}

/// Run blocking store I/O on the worker pool
async fn run_blocking<T, F>(f: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Join(e.to_string()))?
}
