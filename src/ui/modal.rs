/// Feedback modal
///
/// A pure function of the feedback state: when it is visible the page is
/// dimmed and a message card is drawn on top. The OK button is the only way
/// to close it.
use iced::widget::{button, center, column, container, horizontal_space, opaque, row, stack, text};
use iced::{Color, Element, Theme};

use crate::state::feedback::{Feedback, Severity};
use crate::Message;

type ButtonStyle = fn(&Theme, button::Status) -> button::Style;

pub fn view<'a>(base: Element<'a, Message>, feedback: &'a Feedback) -> Element<'a, Message> {
    let Some((message, severity)) = feedback.message() else {
        return base;
    };

    let (tint, ok_style): (Color, ButtonStyle) = match severity {
        Severity::Success => (Color::from_rgb8(0x16, 0xa3, 0x4a), button::success),
        Severity::Error => (Color::from_rgb8(0xdc, 0x26, 0x26), button::danger),
    };

    let card = container(
        column![
            text(message).size(18).color(tint),
            row![
                horizontal_space(),
                button("OK")
                    .on_press(Message::DismissFeedback)
                    .style(ok_style)
                    .padding([8, 16]),
            ],
        ]
        .spacing(16),
    )
    .width(384)
    .padding(24)
    .style(container::rounded_box);

    // Dim the page and swallow clicks aimed at it
    let backdrop = center(opaque(card)).style(|_theme| container::Style {
        background: Some(
            Color {
                a: 0.5,
                ..Color::BLACK
            }
            .into(),
        ),
        ..container::Style::default()
    });

    stack![base, opaque(backdrop)].into()
}
