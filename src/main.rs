use chrono::Local;
use clap::Parser;
use iced::widget::{button, column, container, text, text_input, Column};
use iced::{Alignment, Element, Length, Task, Theme};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod metadata;
mod raw;
mod state;
mod ui;

use metadata::{ExifTool, GatewayError, MetadataGateway};
use raw::preview::{self, Preview};
use state::{Advance, CatalogError, FileCatalog, SessionController, SessionError, SessionView};
use ui::PreviewState;

/// Step through a folder of photos and tag them
#[derive(Parser, Debug)]
#[command(name = "xp-tagger")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory whose files are tagged
    #[arg(long)]
    src: PathBuf,

    /// exiftool executable used to read and write keywords
    #[arg(long, default_value = "exiftool")]
    exiftool: PathBuf,

    /// Log level (trace, debug, info, warn, error), used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Failures that end the process
#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("exiftool: {0}")]
    ExifTool(#[from] GatewayError),
    #[error("window: {0}")]
    Window(#[from] iced::Error),
}

/// Main application state
struct XpTagger {
    /// The tagging session, shared with background tasks
    session: Arc<SessionController>,
    /// Last snapshot of the current file and its tags
    view: Option<SessionView>,
    /// Image shown for the current file
    preview: PreviewState,
    /// Contents of the "new tag name" input
    new_tag: String,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// Re-read the current file's tags
    Refresh,
    /// Background view_state finished
    ViewLoaded(Result<SessionView, String>),
    /// Background preview decoding finished for a file
    PreviewLoaded(PathBuf, Result<Preview, String>),
    /// User clicked "next"
    Next,
    /// Cursor moved
    Advanced(Advance),
    /// User clicked a tag checkbox
    ToggleTag(String),
    /// Background toggle finished with (tag, now checked)
    Toggled(Result<(String, bool), String>),
    /// User typed in the new tag input
    NewTagChanged(String),
    /// User pressed Enter in the new tag input
    RegisterTag,
    /// Background register finished
    Registered(Result<(String, bool), String>),
}

impl XpTagger {
    /// Create a new instance of the application
    fn new(session: Arc<SessionController>) -> (Self, Task<Message>) {
        let app = XpTagger {
            session,
            view: None,
            preview: PreviewState::Loading,
            new_tag: String::new(),
            status: "Loading...".to_string(),
        };
        let task = app.refresh();
        (app, task)
    }

    fn refresh(&self) -> Task<Message> {
        let session = self.session.clone();
        Task::perform(
            run_session(session, |session| session.view_state()),
            Message::ViewLoaded,
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Refresh => self.refresh(),
            Message::ViewLoaded(Ok(view)) => {
                let file_changed = self.view.as_ref().map(|old| &old.file) != Some(&view.file);
                let path = view.file.path.clone();
                self.view = Some(view);

                if !file_changed {
                    return Task::none();
                }

                self.preview = PreviewState::Loading;
                Task::perform(preview::load_preview(path.clone()), move |result| {
                    Message::PreviewLoaded(path.clone(), result)
                })
            }
            Message::ViewLoaded(Err(error)) => {
                tracing::warn!("Failed to read keywords: {error}");
                self.status = format!("⚠️  Could not read keywords: {error}");
                Task::none()
            }
            Message::PreviewLoaded(path, result) => {
                // Ignore previews for files we already moved past
                if self.view.as_ref().map(|view| &view.file.path) != Some(&path) {
                    return Task::none();
                }
                self.preview = match result {
                    Ok(preview) => PreviewState::Ready(preview),
                    Err(error) => {
                        tracing::debug!("No preview for {}: {error}", path.display());
                        PreviewState::Failed(error)
                    }
                };
                Task::none()
            }
            Message::Next => {
                let session = self.session.clone();
                Task::perform(
                    run_session(session, |session| Ok(session.advance())),
                    |result| match result {
                        Ok(advance) => Message::Advanced(advance),
                        Err(_) => Message::Refresh,
                    },
                )
            }
            Message::Advanced(advance) => {
                self.status = match advance {
                    Advance::Moved(position) => {
                        tracing::debug!("Moved to entry {}", position + 1);
                        String::new()
                    }
                    Advance::Wrapped => "↩️  Back at the first file".to_string(),
                };
                self.refresh()
            }
            Message::ToggleTag(name) => {
                let session = self.session.clone();
                Task::perform(
                    run_session(session, move |session| {
                        let checked = session.toggle_tag(&name)?;
                        Ok((name, checked))
                    }),
                    Message::Toggled,
                )
            }
            Message::Toggled(Ok((name, checked))) => {
                self.status = format!(
                    "✅ {} \"{}\" at {}",
                    if checked { "Added" } else { "Removed" },
                    name,
                    Local::now().format("%H:%M:%S")
                );
                self.refresh()
            }
            Message::Toggled(Err(error)) => {
                tracing::warn!("Failed to toggle tag: {error}");
                self.status = format!("⚠️  Could not save keywords: {error}");
                self.refresh()
            }
            Message::NewTagChanged(value) => {
                self.new_tag = value;
                Task::none()
            }
            Message::RegisterTag => {
                let name = self.new_tag.trim().to_string();
                if name.is_empty() {
                    return Task::none();
                }
                let session = self.session.clone();
                Task::perform(
                    run_session(session, move |session| {
                        let added = session.register_tag(&name)?;
                        Ok((name, added))
                    }),
                    Message::Registered,
                )
            }
            Message::Registered(Ok((name, added))) => {
                self.new_tag.clear();
                self.status = if added {
                    format!("🆕 New tag \"{name}\"")
                } else {
                    format!("\"{name}\" already exists")
                };
                self.refresh()
            }
            Message::Registered(Err(error)) => {
                self.status = format!("⚠️  {error}");
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let Some(view) = &self.view else {
            return container(text(&self.status).size(16))
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into();
        };

        let mut details = format!(
            "{} / {}  {}",
            view.file.index + 1,
            view.total,
            view.file.file_name()
        );
        if let Some(summary) = self.preview.summary() {
            details.push_str(&format!("  {summary}"));
        }

        let content: Column<Message> = column![
            ui::image_pane(&self.preview),
            text(details).size(14),
            button("next").on_press(Message::Next).padding(10),
            text_input("new tag name", &self.new_tag)
                .on_input(Message::NewTagChanged)
                .on_submit(Message::RegisterTag)
                .width(Length::Fixed(280.0))
                .padding(8),
            ui::tag_panel(&view.tags),
            text(&self.status).size(14),
        ]
        .spacing(16)
        .padding(24)
        .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Run a session operation on the blocking pool, since it may wait on exiftool
async fn run_session<T, F>(session: Arc<SessionController>, op: F) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce(&SessionController) -> Result<T, SessionError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&session).map_err(|e| e.to_string()))
        .await
        .map_err(|e| format!("Task join error: {}", e))?
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,xp_tagger={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn run(args: Args) -> Result<(), StartupError> {
    let catalog = FileCatalog::load(&args.src)?;
    let exiftool = Arc::new(ExifTool::spawn(&args.exiftool)?);

    let gateway: Arc<dyn MetadataGateway> = exiftool.clone();
    let session = Arc::new(SessionController::new(catalog, gateway));

    let result = iced::application("XP Tagger", XpTagger::update, XpTagger::view)
        .theme(XpTagger::theme)
        .centered()
        .run_with(move || XpTagger::new(session));

    // Close before reporting a window error so exiftool never outlives us
    let closed = exiftool.close();
    result?;
    closed?;

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_level);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("❌ {err}");
            ExitCode::FAILURE
        }
    }
}
