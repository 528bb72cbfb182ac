use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::core::config;
use crate::download::formats::FormatOption;
use crate::telegram::callback::CallbackData;

/// Number of rows and buttons, for log lines.
pub fn keyboard_stats(keyboard: &InlineKeyboardMarkup) -> (usize, usize) {
    let rows = keyboard.inline_keyboard.len();
    let buttons = keyboard.inline_keyboard.iter().map(|row| row.len()).sum();
    (rows, buttons)
}

/// Lays out the format options two per row, in option order.
///
/// Options whose callback data would exceed Telegram's limit are skipped.
pub fn format_keyboard(options: &[FormatOption], url_id: &str) -> InlineKeyboardMarkup {
    let buttons: Vec<InlineKeyboardButton> = options
        .iter()
        .filter_map(|option| {
            let data = CallbackData::new(option.kind, option.format_id.as_str(), url_id);
            match data.encode_checked() {
                Some(encoded) => Some(InlineKeyboardButton::callback(option.label.clone(), encoded)),
                None => {
                    log::warn!("Callback data too long for format {}, skipping", option.format_id);
                    None
                }
            }
        })
        .collect();

    let rows: Vec<Vec<InlineKeyboardButton>> = buttons
        .chunks(config::telegram::KEYBOARD_ROW_WIDTH)
        .map(|chunk| chunk.to_vec())
        .collect();

    InlineKeyboardMarkup::new(rows)
}
