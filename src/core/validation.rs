//! YouTube link validation
//!
//! Two checks guard the pipeline:
//! - `validate_youtube_url` decides whether a chat message is worth a format lookup
//! - `require_scheme` refuses to start a download for a link without a scheme

use lazy_regex::{lazy_regex, Lazy, Regex};
use thiserror::Error;
use url::Url;

/// Prefix match for YouTube / YouTube Music links.
///
/// Groups: scheme, `www.`/`music.` prefix, host, TLD, path form, 11-char video id.
pub static YOUTUBE_URL_REGEX: Lazy<Regex> = lazy_regex!(
    r"^(https?://)?(www\.|music\.)?(youtube|youtu|youtube-nocookie)\.(com|be)/(watch\?v=|embed/|v/|.+\?v=)?([^&=%\?]{11})"
);

const MUSIC_HOST: &str = "music.youtube.com";

/// Validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Message was empty after trimming
    #[error("empty message")]
    Empty,

    /// Text does not look like a YouTube link
    #[error("Invalid YouTube URL: {0}")]
    InvalidUrl(String),

    /// Link without `http://` or `https://`
    #[error("URL has no scheme: {0}")]
    MissingScheme(String),
}

/// A chat message that matched the YouTube link pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YoutubeLink {
    /// Trimmed message text, as sent by the user
    pub text: String,
    pub video_id: String,
    pub is_music: bool,
}

impl YoutubeLink {
    /// URL handed to yt-dlp. Scheme-less links get `https://` so the
    /// download step accepts them.
    pub fn normalized_url(&self) -> String {
        if self.text.starts_with("http://") || self.text.starts_with("https://") {
            self.text.clone()
        } else {
            format!("https://{}", self.text)
        }
    }
}

/// Matches `text` against the link pattern without trimming.
pub fn youtube_url_match(text: &str) -> Option<YoutubeLink> {
    let caps = YOUTUBE_URL_REGEX.captures(text)?;
    let video_id = caps.get(6)?.as_str().to_string();

    Some(YoutubeLink {
        text: text.to_string(),
        video_id,
        is_music: text.contains(MUSIC_HOST),
    })
}

/// Validates a chat message as a YouTube or YouTube Music link.
///
/// # Examples
/// ```
/// use yt_courier::core::validation::validate_youtube_url;
///
/// assert!(validate_youtube_url("https://youtube.com/watch?v=dQw4w9WgXcQ").is_ok());
/// assert!(validate_youtube_url("  youtu.be/dQw4w9WgXcQ ").is_ok());
/// assert!(validate_youtube_url("https://evil.com/watch?v=dQw4w9WgXcQ").is_err());
/// assert!(validate_youtube_url("").is_err());
/// ```
pub fn validate_youtube_url(text: &str) -> Result<YoutubeLink, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    youtube_url_match(trimmed).ok_or_else(|| ValidationError::InvalidUrl(trimmed.to_string()))
}

/// Parses `raw` and insists on an explicit scheme.
pub fn require_scheme(raw: &str) -> Result<Url, ValidationError> {
    match Url::parse(raw.trim()) {
        Ok(url) if !url.scheme().is_empty() && url.has_host() => Ok(url),
        _ => Err(ValidationError::MissingScheme(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_watch_url() {
        let link = validate_youtube_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(link.video_id, "dQw4w9WgXcQ");
        assert!(!link.is_music);
    }

    #[test]
    fn test_short_and_embed_forms() {
        assert_eq!(
            validate_youtube_url("youtu.be/dQw4w9WgXcQ").unwrap().video_id,
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            validate_youtube_url("https://www.youtube.com/embed/dQw4w9WgXcQ").unwrap().video_id,
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            validate_youtube_url("http://youtube-nocookie.com/v/dQw4w9WgXcQ").unwrap().video_id,
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_arbitrary_path_before_v() {
        let link = validate_youtube_url("https://www.youtube.com/attribution_link?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(link.video_id, "dQw4w9WgXcQ");
    }

    #[test]
    fn test_v_after_other_params_is_rejected() {
        assert!(validate_youtube_url("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ").is_err());
    }

    #[test]
    fn test_music_link_detected() {
        let link = validate_youtube_url("https://music.youtube.com/watch?v=dQw4w9WgXcQ&si=abc").unwrap();
        assert!(link.is_music);
        assert_eq!(link.video_id, "dQw4w9WgXcQ");
    }

    #[test]
    fn test_trailing_text_is_allowed() {
        assert!(validate_youtube_url("https://youtu.be/dQw4w9WgXcQ please").is_ok());
    }

    #[test]
    fn test_rejects_other_hosts_and_garbage() {
        assert!(matches!(
            validate_youtube_url("https://vimeo.com/123456789"),
            Err(ValidationError::InvalidUrl(_))
        ));
        assert!(validate_youtube_url("hello there").is_err());
        // Only www. and music. prefixes are recognised
        assert!(validate_youtube_url("https://m.youtube.com/watch?v=dQw4w9WgXcQ").is_err());
        // Leading text breaks the prefix match
        assert!(validate_youtube_url("look https://youtu.be/dQw4w9WgXcQ").is_err());
    }

    #[test]
    fn test_rejects_short_id() {
        assert!(validate_youtube_url("https://www.youtube.com/watch?v=short").is_err());
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(validate_youtube_url(""), Err(ValidationError::Empty));
        assert_eq!(validate_youtube_url("   \n"), Err(ValidationError::Empty));
    }

    #[test]
    fn test_validate_trims() {
        let link = validate_youtube_url("  https://youtu.be/dQw4w9WgXcQ\n").unwrap();
        assert_eq!(link.text, "https://youtu.be/dQw4w9WgXcQ");
    }

    #[test]
    fn test_normalized_url() {
        let bare = validate_youtube_url("youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(bare.normalized_url(), "https://youtu.be/dQw4w9WgXcQ");

        let full = validate_youtube_url("http://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(full.normalized_url(), "http://youtu.be/dQw4w9WgXcQ");
    }

    #[test]
    fn test_require_scheme() {
        assert!(require_scheme("https://youtu.be/dQw4w9WgXcQ").is_ok());
        assert_eq!(
            require_scheme("youtu.be/dQw4w9WgXcQ"),
            Err(ValidationError::MissingScheme("youtu.be/dQw4w9WgXcQ".to_string()))
        );
        assert!(require_scheme("").is_err());
    }
}
