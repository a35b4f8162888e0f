use iced::widget::{checkbox, row, text};
use iced::{Alignment, Color, Element};
use iced_aw::Wrap;

use crate::state::vocabulary::Rgb;
use crate::state::TagState;
use crate::Message;

/// One checkbox per known tag, label drawn in the tag's palette color.
/// Clicking a checkbox toggles the tag on the current file.
pub fn tag_panel(tags: &[TagState]) -> Element<'_, Message> {
    let items: Vec<Element<'_, Message>> = tags
        .iter()
        .map(|tag| {
            let name = tag.name.clone();
            let Rgb(r, g, b) = tag.color;

            row![
                checkbox("", tag.checked).on_toggle(move |_| Message::ToggleTag(name.clone())),
                text(tag.name.as_str()).color(Color::from_rgb8(r, g, b)),
            ]
            .spacing(4)
            .align_y(Alignment::Center)
            .into()
        })
        .collect();

    Wrap::with_elements(items)
        .spacing(16.0)
        .line_spacing(8.0)
        .into()
}
