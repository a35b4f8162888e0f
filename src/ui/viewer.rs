use iced::widget::{container, image, text};
use iced::{ContentFit, Element, Length};

use crate::raw::preview::Preview;
use crate::Message;

/// What the image pane currently shows
#[derive(Debug, Clone)]
pub enum PreviewState {
    Loading,
    Ready(Preview),
    Failed(String),
}

impl PreviewState {
    /// Short description for the status line
    pub fn summary(&self) -> Option<String> {
        match self {
            PreviewState::Ready(preview) => Some(format!(
                "{}×{}{}",
                preview.width,
                preview.height,
                if preview.embedded { " (embedded preview)" } else { "" }
            )),
            _ => None,
        }
    }
}

/// The image pane at the top of the window
pub fn image_pane(state: &PreviewState) -> Element<'_, Message> {
    let content: Element<'_, Message> = match state {
        PreviewState::Loading => text("Loading preview...").size(16).into(),
        PreviewState::Ready(preview) => image(preview.handle.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        PreviewState::Failed(error) => text(format!("No preview: {error}")).size(16).into(),
    };

    container(content)
        .center_x(Length::Fill)
        .center_y(Length::FillPortion(4))
        .into()
}
