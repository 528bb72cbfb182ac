//! Callback data of the format buttons: `{mode}|{format_id}|{url_id}`.

use std::str::FromStr;

use crate::core::config;
use crate::download::source::MediaKind;

const SEPARATOR: char = '|';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackData {
    pub kind: MediaKind,
    pub format_id: String,
    pub url_id: String,
}

impl CallbackData {
    pub fn new(kind: MediaKind, format_id: impl Into<String>, url_id: impl Into<String>) -> Self {
        Self {
            kind,
            format_id: format_id.into(),
            url_id: url_id.into(),
        }
    }

    pub fn encode(&self) -> String {
        format!("{}{sep}{}{sep}{}", self.kind, self.format_id, self.url_id, sep = SEPARATOR)
    }

    /// Encoded form, or `None` when it does not fit Telegram's 64-byte limit.
    pub fn encode_checked(&self) -> Option<String> {
        let data = self.encode();
        (data.len() <= config::telegram::CALLBACK_DATA_MAX_LEN).then_some(data)
    }

    /// Parses button data. Fewer than three fields, an empty field or an
    /// unknown mode yield `None`.
    pub fn parse(data: &str) -> Option<Self> {
        let mut parts = data.splitn(3, SEPARATOR);
        let kind = MediaKind::from_str(parts.next()?).ok()?;
        let format_id = parts.next().filter(|s| !s.is_empty())?;
        let url_id = parts.next().filter(|s| !s.is_empty())?;

        Some(Self::new(kind, format_id, url_id))
    }

    /// Acknowledgement shown when the button is pressed.
    pub fn ack_text(&self) -> &'static str {
        match self.kind {
            MediaKind::Audio => "Downloading audio...",
            MediaKind::Video => "Downloading video...",
        }
    }
}
