use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};

use crate::core::config;
use crate::core::escape_markdown_v2;
use crate::download::source::SourceProgress;
use crate::telegram::Bot;

/// `round(downloaded * 100 / max(1, total))`, missing values count as 0 and 1.
pub fn progress_percent(downloaded: Option<u64>, total: Option<u64>) -> u64 {
    let downloaded = downloaded.unwrap_or(0) as f64;
    let total = total.unwrap_or(1).max(1) as f64;
    (downloaded * 100.0 / total).round() as u64
}

/// Identifies one status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgressKey {
    pub chat_id: i64,
    pub message_id: i32,
}

impl ProgressKey {
    pub fn new(chat_id: ChatId, message_id: MessageId) -> Self {
        Self {
            chat_id: chat_id.0,
            message_id: message_id.0,
        }
    }
}

impl fmt::Display for ProgressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.chat_id, self.message_id)
    }
}

/// Rate limit for status message edits.
///
/// The first event of a key always passes; later ones pass once `interval`
/// has elapsed since the last accepted edit. Rejected events do not move the
/// window.
#[derive(Debug)]
pub struct ProgressThrottle {
    interval: Duration,
    last_edited: HashMap<ProgressKey, Instant>,
}

impl ProgressThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_edited: HashMap::new(),
        }
    }

    pub fn should_update(&mut self, key: ProgressKey, now: Instant) -> bool {
        let due = match self.last_edited.get(&key) {
            Some(last) => now.saturating_duration_since(*last) >= self.interval,
            None => true,
        };

        if due {
            self.last_edited.insert(key, now);
        }
        due
    }

    /// Drops the key once its download session is over.
    pub fn forget(&mut self, key: &ProgressKey) {
        self.last_edited.remove(key);
    }

    pub fn tracked(&self) -> usize {
        self.last_edited.len()
    }
}

/// Statuses shown in the status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    Starting,
    Downloading { title: String, percent: u64 },
    Sending,
    /// Generic failure notice with the size limit in MB
    Failed { limit_mb: u64 },
}

impl DownloadStatus {
    pub fn from_progress(progress: &SourceProgress) -> Self {
        DownloadStatus::Downloading {
            title: progress
                .title
                .clone()
                .unwrap_or_else(|| config::progress::FALLBACK_TITLE.to_string()),
            percent: progress.percent(),
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            DownloadStatus::Starting => "Downloading...".to_string(),
            DownloadStatus::Downloading { title, percent } => format!("Downloading {}\n\n{}%", title, percent),
            DownloadStatus::Sending => "Sending file to Telegram...".to_string(),
            DownloadStatus::Failed { limit_mb } => format!(
                "⚠️ {} *{}MB* {}",
                escape_markdown_v2("Error downloading or sending file. It may exceed"),
                limit_mb,
                escape_markdown_v2("or be unsupported.")
            ),
        }
    }

    pub fn parse_mode(&self) -> Option<ParseMode> {
        match self {
            DownloadStatus::Failed { .. } => Some(ParseMode::MarkdownV2),
            _ => None,
        }
    }
}

/// Applies the throttle to one extractor event.
pub fn throttle_event(
    throttle: &mut ProgressThrottle,
    key: ProgressKey,
    progress: &SourceProgress,
    now: Instant,
) -> Option<DownloadStatus> {
    if throttle.should_update(key, now) {
        Some(DownloadStatus::from_progress(progress))
    } else {
        None
    }
}

/// Status message bound to a chat.
#[derive(Debug, Clone, Copy)]
pub struct ProgressMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

impl ProgressMessage {
    pub fn new(chat_id: ChatId, message_id: MessageId) -> Self {
        Self { chat_id, message_id }
    }

    pub fn key(&self) -> ProgressKey {
        ProgressKey::new(self.chat_id, self.message_id)
    }

    /// Edits the status message. An unchanged text is not an error.
    pub async fn update(&self, bot: &Bot, status: &DownloadStatus) -> ResponseResult<()> {
        let mut request = bot.edit_message_text(self.chat_id, self.message_id, status.to_message());
        if let Some(mode) = status.parse_mode() {
            request = request.parse_mode(mode);
        }

        match request.await {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("message is not modified") => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn delete(&self, bot: &Bot) -> ResponseResult<()> {
        bot.delete_message(self.chat_id, self.message_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key() -> ProgressKey {
        ProgressKey {
            chat_id: 42,
            message_id: 7,
        }
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(Some(50), Some(200)), 25);
        assert_eq!(progress_percent(Some(1), Some(3)), 33);
        assert_eq!(progress_percent(Some(2), Some(3)), 67);
        assert_eq!(progress_percent(None, Some(100)), 0);
        // Unknown total divides by one
        assert_eq!(progress_percent(Some(3), None), 300);
        assert_eq!(progress_percent(Some(3), Some(0)), 300);
    }

    #[test]
    fn test_first_event_always_passes() {
        let mut throttle = ProgressThrottle::new(Duration::from_secs(5));
        assert!(throttle.should_update(key(), Instant::now()));
        assert_eq!(throttle.tracked(), 1);
    }

    #[test]
    fn test_events_inside_window_are_dropped() {
        let mut throttle = ProgressThrottle::new(Duration::from_secs(5));
        let start = Instant::now();

        assert!(throttle.should_update(key(), start));
        assert!(!throttle.should_update(key(), start + Duration::from_secs(1)));
        assert!(!throttle.should_update(key(), start + Duration::from_millis(4_999)));
        assert!(throttle.should_update(key(), start + Duration::from_secs(5)));
        // Window restarts from the accepted edit
        assert!(!throttle.should_update(key(), start + Duration::from_secs(9)));
        assert!(throttle.should_update(key(), start + Duration::from_secs(10)));
    }

    #[test]
    fn test_keys_are_independent() {
        let mut throttle = ProgressThrottle::new(Duration::from_secs(5));
        let now = Instant::now();
        let other = ProgressKey {
            chat_id: 42,
            message_id: 8,
        };

        assert!(throttle.should_update(key(), now));
        assert!(throttle.should_update(other, now));
        assert!(!throttle.should_update(key(), now));
    }

    #[test]
    fn test_forget_resets_key() {
        let mut throttle = ProgressThrottle::new(Duration::from_secs(5));
        let now = Instant::now();

        assert!(throttle.should_update(key(), now));
        throttle.forget(&key());
        assert_eq!(throttle.tracked(), 0);
        assert!(throttle.should_update(key(), now));
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(DownloadStatus::Starting.to_message(), "Downloading...");
        assert_eq!(DownloadStatus::Sending.to_message(), "Sending file to Telegram...");
        assert_eq!(
            DownloadStatus::Downloading {
                title: "Song".to_string(),
                percent: 42
            }
            .to_message(),
            "Downloading Song\n\n42%"
        );
        assert_eq!(
            DownloadStatus::Failed { limit_mb: 50 }.to_message(),
            "⚠️ Error downloading or sending file\\. It may exceed *50MB* or be unsupported\\."
        );
        assert_eq!(
            DownloadStatus::Failed { limit_mb: 50 }.parse_mode(),
            Some(ParseMode::MarkdownV2)
        );
        assert_eq!(DownloadStatus::Sending.parse_mode(), None);
    }

    #[test]
    fn test_throttle_event_uses_fallback_title() {
        let mut throttle = ProgressThrottle::new(Duration::from_secs(5));
        let progress = SourceProgress {
            downloaded_bytes: Some(10),
            total_bytes: Some(40),
            ..Default::default()
        };
        let now = Instant::now();

        assert_eq!(
            throttle_event(&mut throttle, key(), &progress, now),
            Some(DownloadStatus::Downloading {
                title: "video".to_string(),
                percent: 25
            })
        );
        assert_eq!(throttle_event(&mut throttle, key(), &progress, now), None);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(key().to_string(), "42-7");
    }
}
