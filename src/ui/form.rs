/// Registration form widgets
///
/// Renders one input per schema field. Every input emits a message carrying
/// the field name; the session does the rest.
use iced::widget::image as picture;
use iced::widget::{button, checkbox, column, pick_list, row, text, text_input, Column};
use iced::{Alignment, Color, Element, Length};

use crate::state::record::{is_valid_mobile, Record};
use crate::state::schema::{Choice, Control, FieldName};
use crate::state::session::FormSession;
use crate::submission::Phase;
use crate::Message;

const HINT_COLOR: Color = Color {
    r: 0.86,
    g: 0.15,
    b: 0.15,
    a: 1.0,
};

/// The whole form: fields, photo picker and submit button
pub fn view<'a>(
    session: &'a FormSession,
    preview: Option<&'a picture::Handle>,
) -> Element<'a, Message> {
    let fields = FieldName::ALL
        .into_iter()
        .fold(Column::new().spacing(16), |col, name| {
            col.push(field(session.record(), name))
        });

    let submit = button(text(submit_label(session.phase())))
        .on_press_maybe((!session.is_busy()).then_some(Message::Submit))
        .width(Length::Fill)
        .padding(10);

    column![fields, photo_picker(session, preview), submit]
        .spacing(24)
        .into()
}

fn field(record: &Record, name: FieldName) -> Element<'_, Message> {
    let value = record.get(name);
    // Only flag fields the user has already been through
    let missing = name.is_required() && record.is_dirty(name) && value.is_empty();

    match name.control() {
        Control::Checkbox => checkbox(name.label(), value.as_bool())
            .on_toggle(move |checked| Message::Toggled(name, checked))
            .into(),
        Control::Select(choices) => {
            let selected = choices
                .iter()
                .copied()
                .find(|choice| choice.value == value.as_text());

            column![
                label(name, missing),
                pick_list(choices, selected, move |choice: Choice| {
                    Message::TextChanged(name, choice.value.to_string())
                })
                .placeholder("নির্বাচন করুন")
                .width(Length::Fill),
            ]
            .spacing(4)
            .into()
        }
        control => {
            let input = text_input(placeholder(control), value.as_text())
                .on_input(move |text| Message::TextChanged(name, name.constrain_input(text)))
                .padding(8);

            let mut col = column![label(name, missing), input].spacing(4);

            // Hint only, never blocks submission
            if name == FieldName::Mobile && !value.is_empty() && !is_valid_mobile(value.as_text()) {
                col = col.push(text("Invalid mobile number").size(12).color(HINT_COLOR));
            }
            col.into()
        }
    }
}

fn label(name: FieldName, missing: bool) -> Element<'static, Message> {
    let required = if name.is_required() { " *" } else { "" };
    let label = text(format!("{}{}", name.label(), required)).size(14);

    if missing {
        label.color(HINT_COLOR).into()
    } else {
        label.into()
    }
}

fn placeholder(control: Control) -> &'static str {
    match control {
        Control::Tel => "01XXXXXXXXX",
        Control::Email => "name@example.com",
        Control::Date => "YYYY-MM-DD",
        Control::Number => "0",
        _ => "",
    }
}

fn photo_picker<'a>(
    session: &'a FormSession,
    preview: Option<&'a picture::Handle>,
) -> Element<'a, Message> {
    let chosen: Element<'a, Message> = match (session.image(), preview) {
        (Some(file), Some(handle)) => row![
            picture(handle.clone()).width(96).height(96),
            text(&file.filename).size(14),
        ]
        .spacing(12)
        .align_y(Alignment::Center)
        .into(),
        (Some(file), None) => text(&file.filename).size(14).into(),
        (None, _) => text("No photo selected").size(14).into(),
    };

    column![
        text("Photo Upload").size(14),
        row![
            button("Choose photo").on_press(Message::PickImage).padding(8),
            chosen,
        ]
        .spacing(16)
        .align_y(Alignment::Center),
    ]
    .spacing(4)
    .into()
}

fn submit_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Validating => "Checking...",
        Phase::Uploading => "Uploading photo...",
        Phase::Persisting => "Saving...",
        _ => "Submit",
    }
}
