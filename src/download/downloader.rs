//! Parsing of yt-dlp output lines.
//!
//! yt-dlp is started with a machine-readable progress template and an
//! `after_move` print, so most lines are easy to split. The human progress
//! line is still understood for older binaries that ignore the template.

use std::path::PathBuf;

use crate::download::source::SourceProgress;

pub const PROGRESS_PREFIX: &str = "[progress] ";
pub const DONE_PREFIX: &str = "[done] ";

/// `--progress-template` argument. The title goes last since it may contain `|`.
pub fn progress_template() -> String {
    format!(
        "download:{}%(progress.downloaded_bytes)s|%(progress.total_bytes)s|%(progress.total_bytes_estimate)s|%(info.title)s",
        PROGRESS_PREFIX
    )
}

/// `--print` argument emitted once the final file is in place.
pub fn done_template() -> String {
    format!("after_move:{}%(width)s|%(height)s|%(filepath)s", DONE_PREFIX)
}

/// One classified line of yt-dlp output.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputLine {
    Progress(SourceProgress),
    Finished {
        file_path: PathBuf,
        width: Option<u32>,
        height: Option<u32>,
    },
    /// yt-dlp skipped the download because of `--max-filesize`
    TooLarge { size: Option<u64>, limit: Option<u64> },
    Other,
}

pub fn parse_output_line(line: &str) -> OutputLine {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(rest) = line.strip_prefix(PROGRESS_PREFIX) {
        return parse_template_progress(rest).map_or(OutputLine::Other, OutputLine::Progress);
    }

    if let Some(rest) = line.strip_prefix(DONE_PREFIX) {
        return parse_done(rest).unwrap_or(OutputLine::Other);
    }

    if line.contains("larger than max-filesize") {
        let (size, limit) = parse_size_limit(line);
        return OutputLine::TooLarge { size, limit };
    }

    parse_progress(line).map_or(OutputLine::Other, OutputLine::Progress)
}

fn parse_template_progress(rest: &str) -> Option<SourceProgress> {
    let mut fields = rest.splitn(4, '|');
    let downloaded = fields.next()?;
    let total = fields.next()?;
    let estimate = fields.next()?;
    let title = fields.next().map(str::trim).filter(|t| !t.is_empty() && *t != "NA");

    Some(SourceProgress {
        downloaded_bytes: parse_number(downloaded),
        total_bytes: parse_number(total),
        total_bytes_estimate: parse_number(estimate),
        title: title.map(str::to_string),
    })
}

fn parse_done(rest: &str) -> Option<OutputLine> {
    let mut fields = rest.splitn(3, '|');
    let width = fields.next()?;
    let height = fields.next()?;
    let path = fields.next()?.trim();
    if path.is_empty() || path == "NA" {
        return None;
    }

    Some(OutputLine::Finished {
        file_path: PathBuf::from(path),
        width: parse_number(width).and_then(|w| u32::try_from(w).ok()),
        height: parse_number(height).and_then(|h| u32::try_from(h).ok()),
    })
}

/// yt-dlp prints `NA` for missing fields and floats for estimates.
fn parse_number(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "NA" || raw == "None" {
        return None;
    }
    raw.parse::<u64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0).map(|v| v as u64))
}

/// Extracts `(60000000 bytes > 50000000 bytes)`.
fn parse_size_limit(line: &str) -> (Option<u64>, Option<u64>) {
    let inner = line
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(inner, _)| inner);

    match inner.and_then(|s| s.split_once('>')) {
        Some((size, limit)) => (
            parse_number(size.trim().trim_end_matches("bytes")),
            parse_number(limit.trim().trim_end_matches("bytes")),
        ),
        None => (None, None),
    }
}

/// Parses the human progress line:
/// `[download]  45.2% of ~10.00MiB at 500.00KiB/s ETA 00:10`
pub fn parse_progress(line: &str) -> Option<SourceProgress> {
    if !line.contains("[download]") || !line.contains('%') {
        return None;
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    let mut percent: Option<f64> = None;
    let mut total_size: Option<u64> = None;

    for (i, part) in parts.iter().enumerate() {
        if part.ends_with('%') && percent.is_none() {
            percent = part
                .trim_end_matches('%')
                .parse::<f64>()
                .ok()
                .map(|p| p.clamp(0.0, 100.0));
        }

        if *part == "of" && i + 1 < parts.len() {
            total_size = parse_size(parts[i + 1].trim_start_matches('~'));
        }
    }

    let percent = percent?;
    let total = total_size.unwrap_or(100);

    Some(SourceProgress {
        downloaded_bytes: Some((total as f64 * percent / 100.0) as u64),
        total_bytes: Some(total),
        total_bytes_estimate: None,
        title: None,
    })
}

/// Parses sizes like `10.00MiB`, `500.00KiB`, `1.2GB` into bytes.
pub fn parse_size(size_str: &str) -> Option<u64> {
    let size_str = size_str.trim().trim_end_matches("/s");
    let split_at = size_str.find(|c: char| c.is_ascii_alphabetic())?;
    let (number, unit) = size_str.split_at(split_at);
    let value: f64 = number.parse().ok()?;

    let multiplier: f64 = match unit {
        "B" => 1.0,
        "KiB" => 1024.0,
        "MiB" => 1024.0 * 1024.0,
        "GiB" => 1024.0 * 1024.0 * 1024.0,
        "KB" | "kB" => 1_000.0,
        "MB" => 1_000_000.0,
        "GB" => 1_000_000_000.0,
        _ => return None,
    };

    Some((value * multiplier) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_template_progress_line() {
        let line = "[progress] 1048576|4194304|NA|Never Gonna Give You Up";
        assert_eq!(
            parse_output_line(line),
            OutputLine::Progress(SourceProgress {
                downloaded_bytes: Some(1_048_576),
                total_bytes: Some(4_194_304),
                total_bytes_estimate: None,
                title: Some("Never Gonna Give You Up".to_string()),
            })
        );
    }

    #[test]
    fn test_template_progress_with_estimate_and_pipe_in_title() {
        let OutputLine::Progress(progress) = parse_output_line("[progress] 500|NA|2000.5|A | B") else {
            panic!("expected progress");
        };
        assert_eq!(progress.total_bytes, None);
        assert_eq!(progress.total_bytes_estimate, Some(2000));
        assert_eq!(progress.title.as_deref(), Some("A | B"));
        assert_eq!(progress.percent(), 25);
    }

    #[test]
    fn test_template_progress_missing_title() {
        let OutputLine::Progress(progress) = parse_output_line("[progress] NA|NA|NA|NA") else {
            panic!("expected progress");
        };
        assert_eq!(progress, SourceProgress::default());
    }

    #[test]
    fn test_done_line() {
        assert_eq!(
            parse_output_line("[done] 1280|720|/tmp/out/1700000000000.mp4"),
            OutputLine::Finished {
                file_path: PathBuf::from("/tmp/out/1700000000000.mp4"),
                width: Some(1280),
                height: Some(720),
            }
        );
        assert_eq!(
            parse_output_line("[done] NA|NA|/tmp/out/1700000000000.mp3"),
            OutputLine::Finished {
                file_path: PathBuf::from("/tmp/out/1700000000000.mp3"),
                width: None,
                height: None,
            }
        );
        assert_eq!(parse_output_line("[done] NA|NA|NA"), OutputLine::Other);
    }

    #[test]
    fn test_too_large_line() {
        let line = "[download] File is larger than max-filesize (60000000 bytes > 50000000 bytes). Aborting.";
        assert_eq!(
            parse_output_line(line),
            OutputLine::TooLarge {
                size: Some(60_000_000),
                limit: Some(50_000_000),
            }
        );
    }

    #[test]
    fn test_legacy_progress_line() {
        let progress = parse_progress("[download]  50.0% of ~10.00MiB at 500.00KiB/s ETA 00:10").unwrap();
        assert_eq!(progress.total_bytes, Some(10 * 1024 * 1024));
        assert_eq!(progress.percent(), 50);
    }

    #[test]
    fn test_non_progress_lines() {
        assert_eq!(parse_output_line("[youtube] dQw4w9WgXcQ: Downloading webpage"), OutputLine::Other);
        assert_eq!(parse_output_line("[download] Destination: /tmp/x.webm"), OutputLine::Other);
        assert!(parse_progress("[download] 100% of nothing").is_some());
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1.00KiB"), Some(1024));
        assert_eq!(parse_size("2MB"), Some(2_000_000));
        assert_eq!(parse_size("500.00KiB/s"), Some(512_000));
        assert_eq!(parse_size("12"), None);
        assert_eq!(parse_size("3.0XB"), None);
    }
}
