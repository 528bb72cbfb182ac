use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static STEM_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Escapes special characters for Telegram MarkdownV2
///
/// All characters from the Bot API list are prefixed with a backslash,
/// the backslash itself included.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut result = String::with_capacity(text.len() * 2);

    for c in text.chars() {
        match c {
            '\\' | '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '=' | '|' | '{' | '}'
            | '.' | '!' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }

    result
}

/// Milliseconds since the Unix epoch.
pub fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// File stem of one download session: `{unix_millis}-{counter}`.
///
/// Every temporary file of the session is named `{stem}.*`. The counter keeps
/// stems distinct when two downloads start in the same millisecond.
pub fn download_stem() -> String {
    format!("{}-{}", unix_millis(), STEM_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Human-readable byte count for CLI output (`12.3 MB`).
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markdown_v2() {
        assert_eq!(escape_markdown_v2("50MB"), "50MB");
        assert_eq!(escape_markdown_v2("file.mp4"), "file\\.mp4");
        assert_eq!(escape_markdown_v2("a_b*c"), "a\\_b\\*c");
        assert_eq!(escape_markdown_v2("(1-2)!"), "\\(1\\-2\\)\\!");
    }

    #[test]
    fn test_unix_millis_is_monotonic_enough() {
        let a = unix_millis();
        let b = unix_millis();
        assert!(b >= a);
        assert!(a > 1_600_000_000_000);
    }

    #[test]
    fn test_download_stems_differ_within_one_millisecond() {
        let stems: Vec<String> = (0..100).map(|_| download_stem()).collect();
        let mut unique = stems.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), stems.len());

        let (millis, counter) = stems[0].split_once('-').unwrap();
        assert!(millis.parse::<u128>().unwrap() > 1_600_000_000_000);
        assert!(counter.parse::<u64>().is_ok());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1_500), "1.5 KB");
        assert_eq!(format_bytes(50_000_000), "50.0 MB");
        assert_eq!(format_bytes(2_300_000_000), "2.3 GB");
    }
}
