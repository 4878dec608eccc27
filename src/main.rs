use iced::widget::image as picture;
use iced::widget::{column, container, scrollable, text};
use iced::{Element, Length, Task, Theme};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod imaging;
mod state;
mod store;
mod submission;
mod ui;

use config::AppConfig;
use error::{InvalidMediaType, StoreError};
use state::image::{mime_for_path, ImageFile};
use state::record::FieldValue;
use state::schema::FieldName;
use state::session::FormSession;
use store::{LocalBlobStore, SqliteDocumentStore, UuidGenerator};
use submission::{Attempt, Orchestrator};

/// Extensions offered by the photo picker. Only some of them are accepted;
/// the rest are rejected with an alert after selection.
const PICKER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic", "gif", "webp", "bmp"];

/// Main application state
struct RegistrationForm {
    /// Everything the user has entered so far
    session: FormSession,
    /// Runs submission attempts against the configured backends
    orchestrator: Orchestrator,
    /// Decoded preview of the selected photo
    preview: Option<picture::Handle>,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// A text, date, number or select control changed
    TextChanged(FieldName, String),
    /// A checkbox was toggled
    Toggled(FieldName, bool),
    /// User clicked "Choose photo"
    PickImage,
    /// Background file read finished
    ImageLoaded(Result<ImageFile, String>),
    /// User clicked "Submit"
    Submit,
    /// A pipeline step finished
    Step(Attempt),
    /// User closed the feedback modal
    DismissFeedback,
}

impl RegistrationForm {
    /// Wire the backends described by `config`
    fn new(config: &AppConfig) -> Result<Self, StoreError> {
        let documents = SqliteDocumentStore::open(config.database_path())?;
        let blobs = LocalBlobStore::new(config.blob_dir(), config.public_base_url.clone());
        info!("Blob store at: {}", blobs.root().display());

        let stored = documents.count(&config.collection)?;
        info!("Registration form initialized with {} stored submissions", stored);

        let orchestrator = Orchestrator::new(
            Arc::new(blobs),
            Arc::new(documents),
            Arc::new(UuidGenerator),
            config.submission_settings(),
        );

        Ok(Self {
            session: FormSession::new(),
            orchestrator,
            preview: None,
            status: format!("Ready. {} submissions stored.", stored),
        })
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TextChanged(name, value) => {
                self.session.set_field(name, FieldValue::Text(value));
                Task::none()
            }
            Message::Toggled(name, checked) => {
                self.session.set_field(name, FieldValue::Bool(checked));
                Task::none()
            }
            Message::PickImage => {
                // Show the native file picker dialog
                let file = FileDialog::new()
                    .set_title("Select Photo")
                    .add_filter("Images", PICKER_EXTENSIONS)
                    .pick_file();

                match file {
                    Some(path) => Task::perform(read_image_file(path), Message::ImageLoaded),
                    None => Task::none(),
                }
            }
            Message::ImageLoaded(Ok(file)) => {
                let preview = picture::Handle::from_bytes(file.bytes.to_vec());
                let filename = file.filename.clone();

                match self.session.select_image(file) {
                    Ok(()) => {
                        info!("Selected photo {}", filename);
                        self.preview = Some(preview);
                    }
                    Err(err) => {
                        warn!("Photo rejected: {}", err);
                        MessageDialog::new()
                            .set_level(MessageLevel::Warning)
                            .set_title("Invalid photo")
                            .set_description(InvalidMediaType::ALERT)
                            .set_buttons(MessageButtons::Ok)
                            .show();
                    }
                }
                Task::none()
            }
            Message::ImageLoaded(Err(err)) => {
                error!("Could not read photo: {}", err);
                self.status = format!("Could not read photo: {}", err);
                Task::none()
            }
            Message::Submit => match self.session.request_submit() {
                Some(attempt) => self.run_step(attempt),
                None => Task::none(),
            },
            Message::Step(attempt) => match self.session.on_step(attempt) {
                Some(next) => self.run_step(next),
                None => Task::none(),
            },
            Message::DismissFeedback => {
                self.session.dismiss_feedback();
                Task::none()
            }
        }
    }

    /// Launch the next pipeline step in the background
    fn run_step(&self, attempt: Attempt) -> Task<Message> {
        let orchestrator = self.orchestrator.clone();
        Task::perform(
            async move { orchestrator.advance(attempt).await },
            Message::Step,
        )
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let content = column![
            text("Reunion Registration").size(32),
            text(&self.status).size(14),
            ui::form::view(&self.session, self.preview.as_ref()),
        ]
        .spacing(20)
        .padding(40)
        .max_width(800);

        let page = scrollable(container(content).center_x(Length::Fill)).height(Length::Fill);

        ui::modal::view(page.into(), self.session.feedback())
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reunion_form=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            error!("{}, falling back to defaults", err);
            AppConfig::default()
        }
    };
    info!("Data directory: {}", config.data_dir.display());

    let app = RegistrationForm::new(&config)?;

    iced::application(
        "Reunion Registration",
        RegistrationForm::update,
        RegistrationForm::view,
    )
    .theme(RegistrationForm::theme)
    .centered()
    .run_with(move || (app, Task::none()))?;

    Ok(())
}

/// Read a picked file off the UI thread
async fn read_image_file(path: PathBuf) -> Result<ImageFile, String> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| format!("{}: {}", path.display(), e))?;

    let filename = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    Ok(ImageFile::new(bytes, mime_for_path(&path), filename))
}
