//! Inline keyboards emitted during the classification dialogue.
//!
//! Transport-agnostic: a keyboard is rows of labeled buttons carrying wire
//! payloads; the Telegram layer maps them onto `InlineKeyboardMarkup`.

use crate::callback::{AdminOp, CallbackAction};
use crate::record::{Category, FileRecord};

/// A single inline button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    /// Text shown on the button.
    pub label: String,
    /// Wire payload fired when pressed.
    pub payload: String,
}

impl InlineButton {
    /// Build a button from a label and a raw payload.
    #[must_use]
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }

    fn action(label: impl Into<String>, action: &CallbackAction) -> Self {
        Self::new(label, action.encode())
    }
}

/// Rows of buttons attached to one outbound message.
pub type InlineKeyboard = Vec<Vec<InlineButton>>;

/// Month labels in button order.
const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
/// Selectable year range for the upload date.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 2000..=2035;

fn chunked(buttons: Vec<InlineButton>, per_row: usize) -> InlineKeyboard {
    buttons.chunks(per_row).map(<[InlineButton]>::to_vec).collect()
}

/// Sermon / Prophecy selection.
#[must_use]
pub fn category_keyboard(file_id: i64) -> InlineKeyboard {
    vec![vec![
        InlineButton::action(
            "Sermon",
            &CallbackAction::SetCategory {
                file_id,
                category: Category::Sermon,
            },
        ),
        InlineButton::action(
            "Prophecy",
            &CallbackAction::SetCategory {
                file_id,
                category: Category::Prophecy,
            },
        ),
    ]]
}

/// Edited / Unedited selection.
#[must_use]
pub fn edited_keyboard(file_id: i64) -> InlineKeyboard {
    vec![vec![
        InlineButton::action(
            "Edited",
            &CallbackAction::SetEdited {
                file_id,
                edited: true,
            },
        ),
        InlineButton::action(
            "Unedited",
            &CallbackAction::SetEdited {
                file_id,
                edited: false,
            },
        ),
    ]]
}

/// Day selection, 1-31 in rows of 7.
#[must_use]
pub fn day_keyboard(file_id: i64) -> InlineKeyboard {
    let buttons = (1..=31)
        .map(|day| InlineButton::action(day.to_string(), &CallbackAction::SetDay { file_id, day }))
        .collect();
    chunked(buttons, 7)
}

/// Month selection in rows of 4.
#[must_use]
pub fn month_keyboard(file_id: i64) -> InlineKeyboard {
    let buttons = MONTH_LABELS
        .iter()
        .zip(1u32..)
        .map(|(label, month)| {
            InlineButton::action(*label, &CallbackAction::SetMonth { file_id, month })
        })
        .collect();
    chunked(buttons, 4)
}

/// Year selection in rows of 5.
#[must_use]
pub fn year_keyboard(file_id: i64) -> InlineKeyboard {
    let buttons = YEAR_RANGE
        .map(|year| {
            InlineButton::action(year.to_string(), &CallbackAction::SetYear { file_id, year })
        })
        .collect();
    chunked(buttons, 5)
}

/// Publish now / schedule selection.
#[must_use]
pub fn publish_keyboard(file_id: i64) -> InlineKeyboard {
    vec![vec![
        InlineButton::action("Publish now", &CallbackAction::PublishNow { file_id }),
        InlineButton::action(
            "Schedule (pick date)",
            &CallbackAction::PublishSchedule { file_id },
        ),
    ]]
}

/// Admin maintenance menu; labels reflect the record's current flags.
#[must_use]
pub fn admin_menu(record: &FileRecord) -> InlineKeyboard {
    let admin = |label: &str, op: AdminOp| {
        vec![InlineButton::action(
            label,
            &CallbackAction::Admin {
                file_id: record.id,
                op,
            },
        )]
    };
    let published_label = if record.edited {
        if record.published {
            "Mark Unpublished"
        } else {
            "Mark Published"
        }
    } else {
        "Mark Published (edited only)"
    };
    let visible_label = if record.visible {
        "Hide from users"
    } else {
        "Unhide (visible)"
    };
    vec![
        admin("Edit caption", AdminOp::EditName),
        admin(published_label, AdminOp::TogglePublished),
        admin(visible_label, AdminOp::ToggleVisible),
        admin("Set publish date", AdminOp::SetPublishDate),
        admin("Set upload date", AdminOp::SetUploadDate),
        admin("Delete (DB only)", AdminOp::Delete),
    ]
}

/// Single "Edit this file?" entry point shown with a record summary.
#[must_use]
pub fn open_edit_keyboard(file_id: i64) -> InlineKeyboard {
    vec![vec![InlineButton::action(
        "Edit this file?",
        &CallbackAction::Admin {
            file_id,
            op: AdminOp::OpenEdit,
        },
    )]]
}
